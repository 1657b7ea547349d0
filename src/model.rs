//! Uniform in-memory representation of the analysis inputs and outputs:
//! per-line hit counts, structural scopes, and the pairing of the two.

use std::path::PathBuf;

use serde::Serialize;

/// Compute a coverage rate, returning 0.0 when the total is zero.
#[must_use]
pub fn rate(covered: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        covered as f64 / total as f64
    }
}

/// A single instrumentable line and how often it was executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct LineHit {
    pub line: u32,
    pub hits: u64,
}

/// What kind of source construct a scope represents. Used only for
/// reporting; matching never looks at it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScopeKind {
    Function,
    Method,
    Impl,
    Trait,
    Module,
}

impl ScopeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScopeKind::Function => "fn",
            ScopeKind::Method => "fn",
            ScopeKind::Impl => "impl",
            ScopeKind::Trait => "trait",
            ScopeKind::Module => "mod",
        }
    }
}

/// One structural code unit: a contiguous line range in a source file.
///
/// Lines are 1-based and inclusive, `first_line <= last_line`. The name is
/// opaque identity for rendering.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Scope {
    pub path: PathBuf,
    pub first_line: u32,
    pub last_line: u32,
    pub kind: ScopeKind,
    pub name: String,
}

impl Scope {
    /// Whether `line` falls inside this scope's range.
    #[must_use]
    pub fn contains(&self, line: u32) -> bool {
        self.first_line <= line && line <= self.last_line
    }
}

/// A scope paired with the coverage records that fall inside its range.
///
/// Immutable once constructed. The coverage slice is empty when the file
/// had no entry in the coverage index at all.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ScopeResult {
    pub scope: Scope,
    /// Records restricted to `[first_line, last_line]`, insertion order.
    pub coverage: Vec<LineHit>,
    /// Repo-relative path this result is reported under.
    pub path: String,
}

impl ScopeResult {
    /// Restrict `records` to the scope's line range.
    pub fn new(scope: Scope, records: &[LineHit], path: String) -> Self {
        let coverage = records
            .iter()
            .filter(|r| scope.contains(r.line))
            .copied()
            .collect();
        Self {
            scope,
            coverage,
            path,
        }
    }

    #[must_use]
    pub fn first_line(&self) -> u32 {
        self.scope.first_line
    }

    #[must_use]
    pub fn last_line(&self) -> u32 {
        self.scope.last_line
    }

    /// A line is uncovered only when the report recorded it with zero hits.
    /// Lines without any record (blanks, comments) are not uncovered.
    #[must_use]
    pub fn uncovered(&self, line: u32) -> bool {
        self.coverage.iter().any(|r| r.line == line && r.hits == 0)
    }

    /// All zero-hit lines inside this scope, in record order.
    #[must_use]
    pub fn uncovered_lines(&self) -> Vec<u32> {
        self.coverage
            .iter()
            .filter(|r| r.hits == 0)
            .map(|r| r.line)
            .collect()
    }

    /// Fraction of this scope's instrumentable lines that were executed.
    #[must_use]
    pub fn coverage_rate(&self) -> f64 {
        let covered = self.coverage.iter().filter(|r| r.hits > 0).count();
        rate(covered as u64, self.coverage.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scope(first: u32, last: u32) -> Scope {
        Scope {
            path: PathBuf::from("/repo/src/lib.rs"),
            first_line: first,
            last_line: last,
            kind: ScopeKind::Function,
            name: "demo".to_string(),
        }
    }

    #[test]
    fn test_coverage_slice_restricted_to_range() {
        let records = vec![
            LineHit { line: 5, hits: 1 },
            LineHit { line: 12, hits: 0 },
            LineHit { line: 15, hits: 3 },
            LineHit { line: 25, hits: 0 },
        ];
        let res = ScopeResult::new(scope(10, 20), &records, "src/lib.rs".into());
        assert_eq!(
            res.coverage,
            vec![LineHit { line: 12, hits: 0 }, LineHit { line: 15, hits: 3 }]
        );
    }

    #[test]
    fn test_uncovered_predicate() {
        let records = vec![LineHit { line: 12, hits: 0 }, LineHit { line: 15, hits: 3 }];
        let res = ScopeResult::new(scope(10, 20), &records, "src/lib.rs".into());

        assert!(res.uncovered(12));
        assert!(!res.uncovered(15));
        // No record at all — a blank or comment line is not uncovered.
        assert!(!res.uncovered(18));
    }

    #[test]
    fn test_uncovered_with_empty_slice() {
        let res = ScopeResult::new(scope(10, 20), &[], "src/lib.rs".into());
        assert!(!res.uncovered(12));
        assert_eq!(res.coverage_rate(), 0.0);
    }

    #[test]
    fn test_coverage_rate() {
        let records = vec![
            LineHit { line: 10, hits: 2 },
            LineHit { line: 11, hits: 0 },
            LineHit { line: 12, hits: 1 },
            LineHit { line: 13, hits: 0 },
        ];
        let res = ScopeResult::new(scope(10, 20), &records, "src/lib.rs".into());
        assert_eq!(res.coverage_rate(), 0.5);
        assert_eq!(res.uncovered_lines(), vec![11, 13]);
    }
}
