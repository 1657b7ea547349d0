//! Output formatting for flagged results.

use std::fmt::Write;

use serde::Serialize;

use crate::model::ScopeResult;

/// Trait for rendering the flagged set.
pub trait Formatter {
    /// Render the flagged results to a string.
    fn format(&self, flagged: &[ScopeResult]) -> String;
}

/// Plain text formatter.
pub struct TextFormatter;

impl Formatter for TextFormatter {
    fn format(&self, flagged: &[ScopeResult]) -> String {
        let mut out = String::new();

        if flagged.is_empty() {
            out.push_str("No untested changes detected.\n");
            return out;
        }

        let n = flagged.len();
        let noun = if n == 1 { "scope" } else { "scopes" };
        writeln!(out, "{n} untested {noun} detected:").unwrap();

        for result in flagged {
            let pct = result.coverage_rate() * 100.0;
            writeln!(
                out,
                "\n{}:{} {} {} ({:.1}% coverage)",
                result.path,
                result.first_line(),
                result.scope.kind.as_str(),
                result.scope.name,
                pct
            )
            .unwrap();
            let uncovered = result.uncovered_lines();
            if !uncovered.is_empty() {
                let lines: Vec<String> = uncovered.iter().map(u32::to_string).collect();
                writeln!(out, "  uncovered lines: {}", lines.join(", ")).unwrap();
            }
        }

        out
    }
}

#[derive(Serialize)]
struct FlaggedEntry<'a> {
    path: &'a str,
    kind: &'static str,
    name: &'a str,
    first_line: u32,
    last_line: u32,
    coverage_rate: f64,
    uncovered_lines: Vec<u32>,
}

/// Machine-readable JSON formatter.
pub struct JsonFormatter;

impl Formatter for JsonFormatter {
    fn format(&self, flagged: &[ScopeResult]) -> String {
        let entries: Vec<FlaggedEntry> = flagged
            .iter()
            .map(|r| FlaggedEntry {
                path: &r.path,
                kind: r.scope.kind.as_str(),
                name: &r.scope.name,
                first_line: r.first_line(),
                last_line: r.last_line(),
                coverage_rate: r.coverage_rate(),
                uncovered_lines: r.uncovered_lines(),
            })
            .collect();

        // Serializing plain owned data cannot fail.
        let mut out = serde_json::to_string_pretty(&entries).unwrap();
        out.push('\n');
        out
    }
}
