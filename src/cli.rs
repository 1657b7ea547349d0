//! The analysis pipeline behind the uncov CLI.
//!
//! `run` returns its rendered output and the number of flagged scopes,
//! making it easy to test without capturing stdout.

use std::path::Path;

use anyhow::{Context, Result};
use clap::ValueEnum;

use crate::changeset::{Changeset, DiffSource, GitDiff, StdinDiff};
use crate::formatter::{Formatter, JsonFormatter, TextFormatter};
use crate::lcov::LcovParser;
use crate::report::Report;
use crate::structure::RustStructure;

/// Output style for flagged results.
#[derive(Clone, Copy, ValueEnum)]
pub enum Output {
    Text,
    Json,
}

/// Run one full analysis: parse the report, fetch and parse the diff,
/// match scopes, and render whatever got flagged.
pub fn run(
    lcov_path: &Path,
    code_dir: &Path,
    git_diff: Option<&str>,
    output: Output,
) -> Result<(String, usize)> {
    // Canonicalize up front so LCOV keys and resolved source paths agree.
    let code_dir = std::fs::canonicalize(code_dir)
        .with_context(|| format!("Cannot resolve code directory {}", code_dir.display()))?;

    let index = LcovParser::parse_file(lcov_path, &code_dir)
        .with_context(|| format!("Failed to parse LCOV report {}", lcov_path.display()))?;

    let source: Box<dyn DiffSource> = match git_diff {
        Some(args) => Box::new(GitDiff {
            args: args.to_string(),
        }),
        None => Box::new(StdinDiff),
    };
    let changeset = Changeset::from_source(&*source)?;

    let report = Report::build(&changeset, &RustStructure, &index, &code_dir)?;
    let flagged = report.build_warnings(&changeset);

    let formatter: &dyn Formatter = match output {
        Output::Text => &TextFormatter,
        Output::Json => &JsonFormatter,
    };

    Ok((formatter.format(&flagged), flagged.len()))
}
