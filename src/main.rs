//! Command-line entry point: converts the tables of an HWP document to HTML.

use anyhow::{Context, Result};
use clap::Parser;
use hwp_tables::hwp::{ExtractOptions, Package, SectionErrorPolicy};
use hwp_tables::render::{HtmlOptions, ToHtml};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "hwp-tables")]
#[command(version)]
#[command(about = "Extract the tables of an HWP 5.x document as HTML", long_about = None)]
#[command(after_help = "Examples:\n  \
  hwp-tables report.hwp report.html          write a standalone HTML page\n  \
  hwp-tables --fragment report.hwp           print bare <table> elements\n  \
  RUST_LOG=debug hwp-tables report.hwp -     show per-section progress")]
struct Cli {
    /// HWP document to read
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// HTML file to write (stdout when omitted or "-")
    #[arg(value_name = "OUTPUT")]
    output: Option<PathBuf>,

    /// Emit only the tables, without the surrounding HTML document
    #[arg(long)]
    fragment: bool,

    /// Log sections that fail to decode and continue with the rest
    #[arg(long)]
    skip_broken_sections: bool,

    /// Spaces per indentation level
    #[arg(long, value_name = "N", default_value_t = 2)]
    indent: usize,
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let mut package = Package::open(&cli.input)
        .with_context(|| format!("failed to open {}", cli.input.display()))?;

    let policy = if cli.skip_broken_sections {
        SectionErrorPolicy::Skip
    } else {
        SectionErrorPolicy::Abort
    };
    let options = ExtractOptions::new().with_section_errors(policy);
    let tables = package
        .tables_with_options(&options)
        .with_context(|| format!("failed to extract tables from {}", cli.input.display()))?;
    info!(
        sections = package.section_count(),
        tables = tables.len(),
        "extraction finished"
    );

    let html = tables.to_html_with_options(
        &HtmlOptions::new()
            .with_standalone(!cli.fragment)
            .with_indent(cli.indent),
    );
    write_output(cli.output.as_deref(), &html)
}

/// Write to `path`, or to stdout for `None` and `-`.
fn write_output(path: Option<&Path>, html: &str) -> Result<()> {
    match path {
        Some(path) if path != Path::new("-") => fs::write(path, html)
            .with_context(|| format!("failed to write {}", path.display())),
        _ => {
            let mut stdout = io::stdout().lock();
            stdout
                .write_all(html.as_bytes())
                .and_then(|()| stdout.flush())
                .context("failed to write to stdout")
        },
    }
}

/// Log to stderr, filtered by `RUST_LOG` (default `warn`).
fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(io::stderr)
        .try_init();
}
