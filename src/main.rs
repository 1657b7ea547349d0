use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use uncov::cli::{self, Output};

/// uncov — Flag code changed in a revision that is not covered by tests.
#[derive(Parser)]
#[command(name = "uncov", version, about)]
struct Cli {
    /// Path to the LCOV coverage report.
    #[arg(long, short = 'l')]
    lcov: PathBuf,

    /// Project root directory the coverage and diff paths are relative to.
    #[arg(long, short = 'p', default_value = ".")]
    path: PathBuf,

    /// Git diff arguments, e.g. "HEAD~1" or "main...HEAD".
    /// If omitted, reads a unified diff from stdin.
    #[arg(long)]
    git_diff: Option<String>,

    /// Output style.
    #[arg(long, value_enum, default_value = "text")]
    output: Output,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let (rendered, flagged) = cli::run(&cli.lcov, &cli.path, cli.git_diff.as_deref(), cli.output)?;
    print!("{rendered}");

    if flagged > 0 {
        std::process::exit(1);
    }
    Ok(())
}
