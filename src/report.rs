//! The matching engine: pairs structural scopes with coverage data, then
//! flags the scopes that contain changed, untested lines.

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use crate::changeset::Changeset;
use crate::error::Result;
use crate::lcov::CoverageIndex;
use crate::model::ScopeResult;
use crate::structure::StructureProvider;

/// One `ScopeResult` list per changed file, keyed by repo-relative path
/// (leading `./` stripped). Per-file order is the structure provider's
/// traversal order; that order is the documented tie-break for scopes
/// with equal match distance.
#[derive(Debug, Default)]
pub struct Report {
    results: BTreeMap<String, Vec<ScopeResult>>,
}

impl Report {
    /// Build the report for one analysis run.
    ///
    /// Every changeset file the provider handles is resolved against
    /// `code_dir` and asked for its scopes. Files with no scopes (empty,
    /// unparsable, or gone) are skipped, not errors. Files absent from
    /// the coverage index get results with empty coverage slices.
    pub fn build(
        changeset: &Changeset,
        provider: &dyn StructureProvider,
        index: &CoverageIndex,
        code_dir: &Path,
    ) -> Result<Self> {
        let mut results: BTreeMap<String, Vec<ScopeResult>> = BTreeMap::new();

        for file_path in changeset.file_paths() {
            if !provider.handles(Path::new(file_path)) {
                continue;
            }

            let key = file_path.strip_prefix("./").unwrap_or(file_path);
            let resolved = code_dir.join(key);

            let scopes = provider.scopes(&resolved)?;
            if scopes.is_empty() {
                continue;
            }

            let records = index.records(&resolved).unwrap_or(&[]);
            let entry = results.entry(key.to_string()).or_default();
            for scope in scopes {
                entry.push(ScopeResult::new(scope, records, key.to_string()));
            }
        }

        Ok(Self { results })
    }

    /// Flag every scope that contains at least one changed, zero-hit line.
    ///
    /// For each changed line the single most specific enclosing scope is
    /// selected by distance from the scope's first line; nested scopes
    /// start later in the file, so the smallest distance favors the
    /// innermost one. A line outside every scope, in a file without
    /// results, or without a zero-hit record contributes nothing. The
    /// returned set is deduplicated, in encounter order.
    #[must_use]
    pub fn build_warnings(&self, changeset: &Changeset) -> Vec<ScopeResult> {
        let mut flagged: Vec<ScopeResult> = Vec::new();
        let mut seen: HashSet<ScopeResult> = HashSet::new();

        for (file_path, line_no) in changeset.each_changed_line() {
            let Some(results) = self.results.get(file_path) else {
                continue;
            };

            let Some(result) = nearest_enclosing(results, line_no) else {
                continue;
            };

            if result.uncovered(line_no) && !seen.contains(result) {
                seen.insert(result.clone());
                flagged.push(result.clone());
            }
        }

        flagged
    }

    /// Results for one file, in provider order.
    #[must_use]
    pub fn results(&self, file_path: &str) -> Option<&[ScopeResult]> {
        self.results.get(file_path).map(Vec::as_slice)
    }

    /// All results across all files.
    pub fn all_results(&self) -> impl Iterator<Item = &ScopeResult> {
        self.results.values().flatten()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    #[cfg(test)]
    pub(crate) fn from_results(results: BTreeMap<String, Vec<ScopeResult>>) -> Self {
        Self { results }
    }
}

/// Distance of a changed line from a result's scope: `None` when the line
/// is outside the range, else how far past the scope's first line it is.
fn distance(result: &ScopeResult, line_no: u32) -> Option<u32> {
    if line_no < result.first_line() || line_no > result.last_line() {
        return None;
    }
    Some(line_no - result.first_line())
}

/// The result with minimum distance. Strict `<` during the scan keeps the
/// first result on ties, preserving provider order as the tie-break.
fn nearest_enclosing(results: &[ScopeResult], line_no: u32) -> Option<&ScopeResult> {
    let mut best: Option<(u32, &ScopeResult)> = None;
    for result in results {
        if let Some(dist) = distance(result, line_no) {
            match best {
                Some((best_dist, _)) if dist >= best_dist => {}
                _ => best = Some((dist, result)),
            }
        }
    }
    best.map(|(_, r)| r)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{LineHit, Scope, ScopeKind};
    use std::path::PathBuf;

    fn result(first: u32, last: u32, name: &str, records: &[LineHit]) -> ScopeResult {
        let scope = Scope {
            path: PathBuf::from("/repo/src/lib.rs"),
            first_line: first,
            last_line: last,
            kind: ScopeKind::Function,
            name: name.to_string(),
        };
        ScopeResult::new(scope, records, "src/lib.rs".to_string())
    }

    fn report_with(results: Vec<ScopeResult>) -> Report {
        let mut map = BTreeMap::new();
        map.insert("src/lib.rs".to_string(), results);
        Report::from_results(map)
    }

    #[test]
    fn test_distance_selects_innermost_scope() {
        // A=[1,50] encloses B=[10,20]; line 15 is closer to B's start.
        let records = vec![LineHit { line: 15, hits: 0 }];
        let outer = result(1, 50, "outer", &records);
        let inner = result(10, 20, "inner", &records);
        let report = report_with(vec![outer, inner]);

        let changeset = Changeset::from_lines([("src/lib.rs".to_string(), vec![15])]);
        let flagged = report.build_warnings(&changeset);
        assert_eq!(flagged.len(), 1);
        assert_eq!(flagged[0].scope.name, "inner");
    }

    #[test]
    fn test_line_outside_inner_scope_selects_outer() {
        let records = vec![LineHit { line: 5, hits: 0 }];
        let outer = result(1, 50, "outer", &records);
        let inner = result(10, 20, "inner", &records);
        let report = report_with(vec![outer, inner]);

        let changeset = Changeset::from_lines([("src/lib.rs".to_string(), vec![5])]);
        let flagged = report.build_warnings(&changeset);
        assert_eq!(flagged.len(), 1);
        assert_eq!(flagged[0].scope.name, "outer");
    }

    #[test]
    fn test_tie_breaks_to_first_result() {
        // Two scopes starting on the same line: the first in provider
        // order wins.
        let records = vec![LineHit { line: 10, hits: 0 }];
        let a = result(10, 30, "first", &records);
        let b = result(10, 20, "second", &records);
        let report = report_with(vec![a, b]);

        let changeset = Changeset::from_lines([("src/lib.rs".to_string(), vec![10])]);
        let flagged = report.build_warnings(&changeset);
        assert_eq!(flagged.len(), 1);
        assert_eq!(flagged[0].scope.name, "first");
    }

    #[test]
    fn test_covered_line_is_not_flagged() {
        let records = vec![LineHit { line: 12, hits: 3 }];
        let report = report_with(vec![result(10, 20, "f", &records)]);

        let changeset = Changeset::from_lines([("src/lib.rs".to_string(), vec![12])]);
        assert!(report.build_warnings(&changeset).is_empty());
    }

    #[test]
    fn test_line_without_record_is_not_flagged() {
        let records = vec![LineHit { line: 12, hits: 0 }];
        let report = report_with(vec![result(10, 20, "f", &records)]);

        // Line 18 has no coverage record: blank or comment, not uncovered.
        let changeset = Changeset::from_lines([("src/lib.rs".to_string(), vec![18])]);
        assert!(report.build_warnings(&changeset).is_empty());
    }

    #[test]
    fn test_line_outside_every_scope_is_silent() {
        let records = vec![LineHit { line: 99, hits: 0 }];
        let report = report_with(vec![result(10, 20, "f", &records)]);

        let changeset = Changeset::from_lines([("src/lib.rs".to_string(), vec![99])]);
        assert!(report.build_warnings(&changeset).is_empty());
    }

    #[test]
    fn test_file_without_results_is_silent() {
        let report = report_with(vec![result(10, 20, "f", &[])]);
        let changeset = Changeset::from_lines([("src/other.rs".to_string(), vec![5])]);
        assert!(report.build_warnings(&changeset).is_empty());
    }

    #[test]
    fn test_flagging_is_idempotent() {
        let records = vec![LineHit { line: 11, hits: 0 }, LineHit { line: 14, hits: 0 }];
        let report = report_with(vec![result(10, 20, "f", &records)]);

        // Two changed uncovered lines in the same scope flag it once.
        let changeset = Changeset::from_lines([("src/lib.rs".to_string(), vec![11, 14])]);
        let flagged = report.build_warnings(&changeset);
        assert_eq!(flagged.len(), 1);
    }

    #[test]
    fn test_absent_coverage_slice_flags_nothing() {
        // File was never reported: the scope has an empty slice and can
        // never be uncovered.
        let report = report_with(vec![result(10, 20, "f", &[])]);
        let changeset = Changeset::from_lines([("src/lib.rs".to_string(), vec![12])]);
        assert!(report.build_warnings(&changeset).is_empty());
    }
}
