//! CLI argument parsing for wsdeploy

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::artifact::ArtifactKind;
use crate::report::Target;

#[derive(Parser, Debug)]
#[command(name = "wd")]
#[command(author, version, about = "Idempotent workspace deployment of notebooks, dashboards and jobs", long_about = None)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[arg(short = 'l', long = "log-level", global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create or update every local artifact in the remote workspace
    Deploy {
        /// Only deploy these kinds (repeatable; default: all)
        #[arg(short, long, value_enum)]
        only: Vec<DeployTarget>,

        /// List the remote state and print the plan without changing anything
        #[arg(short = 'n', long)]
        dry_run: bool,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// List remote artifacts of one kind
    List {
        /// Kind to list
        #[arg(value_enum)]
        kind: RemoteKind,
    },
}

/// Deployable target selected on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DeployTarget {
    Notebooks,
    Dashboards,
    Jobs,
}

impl From<DeployTarget> for Target {
    fn from(target: DeployTarget) -> Self {
        match target {
            DeployTarget::Notebooks => Target::Notebook,
            DeployTarget::Dashboards => Target::Dashboard,
            DeployTarget::Jobs => Target::Job,
        }
    }
}

/// Remote kind selected on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RemoteKind {
    Dashboards,
    Jobs,
}

impl From<RemoteKind> for ArtifactKind {
    fn from(kind: RemoteKind) -> Self {
        match kind {
            RemoteKind::Dashboards => ArtifactKind::Dashboard,
            RemoteKind::Jobs => ArtifactKind::Job,
        }
    }
}

/// Output format for the deploy summary
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}
