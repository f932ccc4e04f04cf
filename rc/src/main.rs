//! rc - capacity record check CLI

use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use std::fs::File;
use std::io::BufWriter;
use tracing::debug;

use recordcheck::Pipeline;
use recordcheck::cli::{Cli, Command};
use recordcheck::io::{read_records, write_jsonl};

fn setup_logging(log_level: Option<&str>) -> Result<()> {
    // Priority: CLI --log-level > default (WARN)
    let level = match log_level.map(|s| s.to_uppercase()) {
        Some(s) => match s.as_str() {
            "TRACE" => tracing::Level::TRACE,
            "DEBUG" => tracing::Level::DEBUG,
            "INFO" => tracing::Level::INFO,
            "WARN" | "WARNING" => tracing::Level::WARN,
            "ERROR" => tracing::Level::ERROR,
            _ => {
                eprintln!("Warning: Unknown log-level '{}', defaulting to WARN", s);
                tracing::Level::WARN
            }
        },
        None => tracing::Level::WARN,
    };

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    debug!("Logging initialized (level: {:?})", level);
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.log_level.as_deref()).context("Failed to setup logging")?;

    debug!(command = ?cli.command, "main: dispatching command");
    match cli.command {
        Command::Check { file } => {
            let records = read_records(&file)?;
            let input = records.len();
            let checked = Pipeline::new().check(records).context("Validation failed")?;

            println!("{} {}", "✓".green(), "All checks passed".bold());
            println!(
                "{}",
                format!("{} records, {} duplicates, {} unique", input, input - checked.len(), checked.len()).dimmed()
            );
        }
        Command::Transform { file, output } => {
            let records = read_records(&file)?;
            let (normalized, report) = Pipeline::new().run(records).context("Validation failed")?;

            match output {
                Some(path) => {
                    let out = File::create(&path).with_context(|| format!("Failed to create {}", path.display()))?;
                    write_jsonl(&normalized, BufWriter::new(out))?;
                    eprintln!("{} Wrote {} records to {}", "✓".green(), report.output, path.display());
                }
                None => write_jsonl(&normalized, std::io::stdout().lock())?,
            }

            if report.null_timestamps > 0 {
                eprintln!(
                    "{} {} record(s) with unparseable timestamps",
                    "!".yellow(),
                    report.null_timestamps
                );
            }
            eprintln!(
                "{}",
                format!(
                    "{} records, {} duplicates, {} written",
                    report.input, report.duplicates, report.output
                )
                .dimmed()
            );
        }
    }

    Ok(())
}
