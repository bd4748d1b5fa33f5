use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::fmt::writer::{BoxMakeWriter, MakeWriterExt};
use tracing_subscriber::EnvFilter;

use codeshift::core::{OutputFormat, OutputWriter};

mod commands;

#[derive(Parser)]
#[command(name = "codeshift")]
#[command(author, version)]
#[command(
    about = "Rule-based source migrations for JavaScript and TypeScript trees",
    long_about = "Walks a directory tree, rewrites imports, renames identifiers and inserts \
                  missing imports according to a versioned rule set, and writes back only \
                  the files that changed."
)]
struct Cli {
    /// Root directory to migrate (defaults to the current directory)
    path: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Output format (text, json, markdown)
    #[arg(short = 'f', long, default_value = "text")]
    format: OutputFormat,

    /// Config file to use instead of <root>/codeshift.toml
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Show what would change without writing any file
    #[arg(long)]
    dry_run: bool,

    /// Print the active rule set and exit
    #[arg(long)]
    list_rules: bool,
}

fn init_logging(verbose: bool, format: OutputFormat) {
    let default_filter = if verbose {
        "codeshift=debug"
    } else {
        "codeshift=info"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    // Keep stdout clean for machine-readable output
    let writer = match format {
        OutputFormat::Text => {
            BoxMakeWriter::new(std::io::stderr.with_max_level(Level::WARN).or_else(std::io::stdout))
        }
        OutputFormat::Json | OutputFormat::Markdown => BoxMakeWriter::new(std::io::stderr),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(writer)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose, cli.format);

    let root = match cli.path {
        Some(path) => path,
        None => std::env::current_dir().context("Failed to determine current directory")?,
    };

    let result = if cli.list_rules {
        commands::rules::run(root, cli.config, cli.format)
    } else {
        commands::migrate::run(root, cli.config, cli.dry_run, cli.format)
    };

    if let Err(e) = result {
        OutputWriter::new(cli.format).write_error(&format!("{:#}", e))?;
        std::process::exit(1);
    }

    Ok(())
}
