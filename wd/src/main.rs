//! wd - workspace deploy CLI
//!
//! Exits non-zero only when the run cannot start (configuration, credentials).
//! Individual artifact failures are printed and do not change the exit status.

use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use tracing::{debug, info};

use wsdeploy::cli::{Cli, Command, OutputFormat};
use wsdeploy::config::Config;
use wsdeploy::report::{ArtifactReport, DeploySummary, Target};
use wsdeploy::{ArtifactKind, Deployer, create_client};

fn setup_logging(cli_log_level: Option<&str>, config_log_level: Option<&str>) -> Result<()> {
    // Priority: CLI --log-level > config file > default (INFO)
    let level = match cli_log_level.or(config_log_level).map(|s| s.to_uppercase()) {
        Some(s) => match s.as_str() {
            "TRACE" => tracing::Level::TRACE,
            "DEBUG" => tracing::Level::DEBUG,
            "INFO" => tracing::Level::INFO,
            "WARN" | "WARNING" => tracing::Level::WARN,
            "ERROR" => tracing::Level::ERROR,
            _ => {
                eprintln!("Warning: Unknown log-level '{}', defaulting to INFO", s);
                tracing::Level::INFO
            }
        },
        None => tracing::Level::INFO,
    };

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    debug!("Logging initialized (level: {:?})", level);
    Ok(())
}

fn print_report(report: &ArtifactReport) {
    let marker = if report.outcome.is_failure() {
        "✗".red()
    } else if report.outcome.is_success() {
        "✓".green()
    } else {
        "!".yellow()
    };
    println!("{} {}", marker, report);
}

fn print_summary(summary: &DeploySummary, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => {
            for report in &summary.reports {
                print_report(report);
            }
            println!("{}", summary.tally().to_string().dimmed());
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(summary)?);
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_log_level = Config::load_log_level(cli.config.as_ref());
    setup_logging(cli.log_level.as_deref(), config_log_level.as_deref()).context("Failed to setup logging")?;

    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;

    // Credentials are required before any artifact is touched
    let credentials = config.workspace.credentials()?;
    info!(host = %credentials.host, "wd starting");
    let api = create_client(&config.workspace, credentials)?;

    debug!(command = ?cli.command, "main: dispatching command");
    match cli.command {
        Command::Deploy { only, dry_run, format } => {
            let targets: Vec<Target> = only.into_iter().map(Target::from).collect();
            let summary = Deployer::new(api, config)
                .only(&targets)
                .dry_run(dry_run)
                .run()
                .await?;
            print_summary(&summary, format)?;
        }
        Command::List { kind } => {
            let kind = ArtifactKind::from(kind);
            let remote = api.list(kind).await.context(format!("Failed to list {}s", kind))?;
            if remote.is_empty() {
                println!("No {}s found", kind);
            }
            for artifact in remote {
                println!(
                    "{} {}",
                    artifact.id.as_deref().unwrap_or("-").yellow(),
                    artifact.name.as_deref().unwrap_or("<unnamed>")
                );
            }
        }
    }

    Ok(())
}
