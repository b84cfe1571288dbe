//! trialaudit CLI
//!
//! Command-line interface for:
//! - Extracting drug candidates and their claims from a securities filing
//! - Locating passages for any term
//! - Comparing a candidate against its clinical-trial registry records
//! - Converting raw registry API JSON into structured records

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use trialaudit_compare::Auditor;
use trialaudit_filing::passages_for_term;
use trialaudit_registry::{load_directory, load_record, parse_partial_date};

mod input;
mod summary;

#[derive(Parser)]
#[command(name = "trialaudit")]
#[command(
    author,
    version,
    about = "Cross-check drug-candidate claims in securities filings against clinical-trial registries"
)]
struct Cli {
    /// JSON file overriding extraction, matching and comparison options
    #[arg(long, global = true)]
    options: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug); RUST_LOG takes precedence
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract candidates, sections and filing-level statements
    Candidates {
        /// Filing (.htm/.html or plain text)
        filing: PathBuf,
        /// Output JSON (default: stdout)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Locate passages mentioning a term, e.g. a trial identifier
    Passages {
        filing: PathBuf,
        #[arg(short, long)]
        term: String,
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Compare one candidate against a directory of registry records
    Compare {
        filing: PathBuf,
        /// Candidate name or alias as extracted from the filing
        #[arg(short, long)]
        candidate: String,
        /// Directory of `*.json` registry records (structured or raw API)
        #[arg(short, long)]
        registry_dir: PathBuf,
        /// Filing date (YYYY-MM-DD); enables post-filing suppression
        #[arg(long)]
        filing_date: Option<String>,
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Convert a raw registry API study into a structured record
    Convert {
        input: PathBuf,
        #[arg(short, long)]
        out: PathBuf,
    },
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let options = input::read_options(cli.options.as_deref())?;
    let auditor = Auditor::with_options(options)?;

    match cli.command {
        Commands::Candidates { filing, out } => cmd_candidates(&auditor, &filing, out.as_deref()),
        Commands::Passages { filing, term, out } => {
            cmd_passages(&auditor, &filing, &term, out.as_deref())
        }
        Commands::Compare {
            filing,
            candidate,
            registry_dir,
            filing_date,
            out,
        } => cmd_compare(
            &auditor,
            &filing,
            &candidate,
            &registry_dir,
            filing_date.as_deref(),
            out.as_deref(),
        ),
        Commands::Convert { input, out } => cmd_convert(&input, &out),
    }
}

/// Pretty JSON to `out`, or stdout when no path is given.
fn write_json<T: Serialize>(value: &T, out: Option<&Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    match out {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create {}", parent.display()))?;
            }
            fs::write(path, &json).with_context(|| format!("failed to write {}", path.display()))?;
            eprintln!("  {} {}", "→".cyan(), path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}

fn cmd_candidates(auditor: &Auditor, filing: &Path, out: Option<&Path>) -> Result<()> {
    let filing = input::read_filing(filing)?;
    let document = auditor.parse(&filing.text)?;
    let mut summary = auditor.extract(&document);
    summary.pipeline_is_image = filing.pipeline_is_image;
    summary::print_filing_summary(&summary);
    write_json(&summary, out)
}

fn cmd_passages(auditor: &Auditor, filing: &Path, term: &str, out: Option<&Path>) -> Result<()> {
    let filing = input::read_filing(filing)?;
    let document = auditor.parse(&filing.text)?;
    let passages = passages_for_term(&document, term, &auditor.options().extraction);
    eprintln!(
        "{} {} passages mentioning {}",
        "Found".green().bold(),
        passages.len(),
        term.bold()
    );
    write_json(&passages, out)
}

fn cmd_compare(
    auditor: &Auditor,
    filing: &Path,
    candidate: &str,
    registry_dir: &Path,
    filing_date: Option<&str>,
    out: Option<&Path>,
) -> Result<()> {
    if let Some(date) = filing_date {
        if parse_partial_date(date).is_none() {
            bail!("invalid --filing-date '{date}', expected YYYY-MM-DD");
        }
    }

    let filing = input::read_filing(filing)?;
    let document = auditor.parse(&filing.text)?;
    let records = load_directory(registry_dir)?;
    let report = auditor.audit(&document, candidate, &records, filing_date)?;

    summary::print_report_summary(&report);
    write_json(&report, out)
}

fn cmd_convert(input: &Path, out: &Path) -> Result<()> {
    let record = load_record(input)?;
    eprintln!(
        "{} {} ({})",
        "Converted".green().bold(),
        record.nct_id().bold(),
        record.identification.brief_title
    );
    write_json(&record, Some(out))
}
