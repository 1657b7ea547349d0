//! The set of lines a revision changed, extracted from a unified diff.
//!
//! Also provides a [`DiffSource`] trait that abstracts over different
//! ways to obtain the diff (stdin, git).

use std::collections::BTreeMap;
use std::process::Command;

use anyhow::{Context, Result};

/// A source for obtaining a unified diff.
pub trait DiffSource {
    /// Fetch the diff text.
    fn fetch_diff(&self) -> Result<String>;
}

/// Diff from stdin.
pub struct StdinDiff;

impl DiffSource for StdinDiff {
    fn fetch_diff(&self) -> Result<String> {
        std::io::read_to_string(std::io::stdin()).context("Failed to read diff from stdin")
    }
}

/// Diff from a git command (e.g., `git diff HEAD~1`).
pub struct GitDiff {
    /// Arguments to pass to `git diff`.
    pub args: String,
}

impl DiffSource for GitDiff {
    fn fetch_diff(&self) -> Result<String> {
        let diff_args: Vec<&str> = self.args.split_whitespace().collect();
        let output = Command::new("git")
            .arg("diff")
            .args(&diff_args)
            .output()
            .context("Failed to run git diff")?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("git diff failed: {stderr}");
        }

        String::from_utf8(output.stdout).context("git diff output not valid UTF-8")
    }
}

/// Changed file paths and, per file, the added/modified line numbers in
/// the new revision. Ordered by path for deterministic reporting.
#[derive(Debug, Default)]
pub struct Changeset {
    files: BTreeMap<String, Vec<u32>>,
}

impl Changeset {
    /// Build a changeset by fetching and parsing a unified diff.
    pub fn from_source(source: &dyn DiffSource) -> Result<Self> {
        Ok(Self::from_diff(&source.fetch_diff()?))
    }

    /// Parse a unified diff (e.g., `git diff` output) into per-file added
    /// line numbers (in the new file).
    #[must_use]
    pub fn from_diff(diff_text: &str) -> Self {
        let mut files: BTreeMap<String, Vec<u32>> = BTreeMap::new();
        let mut current_file: Option<String> = None;
        let mut new_line_number: u32 = 0;

        for line in diff_text.lines() {
            if let Some(rest) = line.strip_prefix("+++ ") {
                if rest == "/dev/null" {
                    current_file = None; // File was deleted
                } else {
                    // Strip common VCS prefixes: "b/" (default git), "a/"
                    // (some tools). Also handles --no-prefix diffs.
                    let path = rest
                        .strip_prefix("b/")
                        .or_else(|| rest.strip_prefix("a/"))
                        .unwrap_or(rest);
                    current_file = Some(path.to_string());
                }
            } else if line.starts_with("@@ ") {
                // Hunk header: @@ -old_start[,old_count] +new_start[,new_count] @@
                if let Some(new_range) = parse_hunk_header(line) {
                    new_line_number = new_range;
                }
            } else if let Some(ref file) = current_file {
                if line.starts_with('\\') {
                    // "\ No newline at end of file" — diff metadata, not a real line
                } else if line.starts_with('+') && !line.starts_with("+++") {
                    // Added line
                    files.entry(file.clone()).or_default().push(new_line_number);
                    new_line_number += 1;
                } else if line.starts_with('-') && !line.starts_with("---") {
                    // Deleted line — doesn't advance new line counter
                } else {
                    // Context line or other
                    new_line_number += 1;
                }
            }
        }

        Self { files }
    }

    /// Build directly from per-file changed lines.
    #[must_use]
    pub fn from_lines(lines: impl IntoIterator<Item = (String, Vec<u32>)>) -> Self {
        Self {
            files: lines.into_iter().collect(),
        }
    }

    /// The changed file paths, repo-relative.
    pub fn file_paths(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(String::as_str)
    }

    /// All changed `(path, line)` coordinates, grouped by file.
    pub fn each_changed_line(&self) -> impl Iterator<Item = (&str, u32)> {
        self.files
            .iter()
            .flat_map(|(path, lines)| lines.iter().map(move |l| (path.as_str(), *l)))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Total number of changed lines across all files.
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.files.values().map(Vec::len).sum()
    }
}

/// Parse "new" start line from a hunk header like "@@ -10,5 +20,8 @@"
fn parse_hunk_header(line: &str) -> Option<u32> {
    let after_at = line.strip_prefix("@@ ")?;
    let parts: Vec<&str> = after_at.split(' ').collect();
    // parts[0] = "-old_start,old_count"
    // parts[1] = "+new_start,new_count" or "+new_start"
    if parts.len() < 2 {
        return None;
    }
    let new_part = parts[1].strip_prefix('+')?;
    let start_str = new_part.split(',').next()?;
    start_str.parse::<u32>().ok()
}
