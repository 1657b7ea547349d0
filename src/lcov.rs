//! Strict parser for the LCOV subset this tool consumes.
//!
//! Recognized records:
//!   SF:<path>        — begin a source file section
//!   DA:<line>,<hits> — one executable-line hit count
//!   end_of_record    — close the current section (a blank line also closes it)
//!
//! Anything else is a hard parse error. Full LCOV has more record kinds
//! (FN/FNDA/BRDA/LF/...), but reports produced for this workflow contain
//! only line data, and an unrecognized record means the report is not one
//! of ours — failing loudly beats silently dropping data.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

use crate::error::{Result, UncovError};
use crate::model::LineHit;

static SF_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^SF:(.+)").unwrap());
static DA_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^DA:(\d+),(\d+)").unwrap());

/// Per-line hit counts keyed by absolute source path. Immutable once
/// parsing completes.
#[derive(Debug, Default)]
pub struct CoverageIndex {
    files: HashMap<PathBuf, Vec<LineHit>>,
}

impl CoverageIndex {
    /// Records for one source file, in report order. `None` when the file
    /// never appeared in the report.
    #[must_use]
    pub fn records(&self, path: &Path) -> Option<&[LineHit]> {
        self.files.get(path).map(Vec::as_slice)
    }

    /// Number of source files in the index.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Iterate over all indexed paths.
    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.files.keys().map(PathBuf::as_path)
    }
}

/// Strict LCOV-subset parser.
pub struct LcovParser;

impl LcovParser {
    /// Parse raw report bytes. `base` is the directory that relative
    /// `SF:` paths are resolved against.
    pub fn parse(input: &[u8], base: &Path) -> Result<CoverageIndex> {
        parse_reader(&mut &*input, base)
    }

    /// Open `report_path`, parse it, and release the handle. The file is
    /// closed on failure as well.
    pub fn parse_file(report_path: &Path, base: &Path) -> Result<CoverageIndex> {
        let file = File::open(report_path)?;
        parse_reader(&mut BufReader::new(file), base)
    }
}

fn parse_reader(reader: &mut dyn BufRead, base: &Path) -> Result<CoverageIndex> {
    let mut index = CoverageIndex::default();
    let mut current: Option<PathBuf> = None;

    let mut raw_line = String::new();
    loop {
        raw_line.clear();
        let n = reader.read_line(&mut raw_line)?;
        if n == 0 {
            break; // EOF
        }

        // Only the line terminator is insignificant. Trimming other
        // whitespace would soften the grammar.
        let line = raw_line.trim_end_matches(['\n', '\r']);

        if line.is_empty() || line == "end_of_record" {
            current = None;
            continue;
        }

        if let Some(caps) = SF_RE.captures(line) {
            let key = resolve_source_path(&caps[1], base);
            // A repeated SF: entry for the same file resets its records.
            index.files.insert(key.clone(), Vec::new());
            current = Some(key);
            continue;
        }

        if let Some(caps) = DA_RE.captures(line) {
            let hit = LineHit {
                line: caps[1]
                    .parse()
                    .map_err(|_| UncovError::LcovParse(line.to_string()))?,
                hits: caps[2]
                    .parse()
                    .map_err(|_| UncovError::LcovParse(line.to_string()))?,
            };
            // A DA record outside any SF: section has no file to belong
            // to; it can never be looked up, so it is dropped.
            if let Some(key) = &current {
                if let Some(records) = index.files.get_mut(key) {
                    records.push(hit);
                }
            }
            continue;
        }

        return Err(UncovError::LcovParse(line.to_string()));
    }

    Ok(index)
}

/// Resolve an `SF:` path to the absolute index key: strip a leading `./`,
/// then join against `base` (an already-absolute path passes through).
fn resolve_source_path(raw: &str, base: &Path) -> PathBuf {
    let stripped = raw.strip_prefix("./").unwrap_or(raw);
    base.join(stripped)
}
