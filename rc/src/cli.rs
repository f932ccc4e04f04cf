//! CLI argument parsing for recordcheck

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "rc")]
#[command(author, version, about = "Deduplicate, validate and normalize capacity records", long_about = None)]
pub struct Cli {
    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[arg(short = 'l', long = "log-level", global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Deduplicate and validate; exits non-zero on the first failed check
    Check {
        /// Records as a JSON array or JSON Lines
        file: PathBuf,
    },

    /// Run the full pipeline and write normalized records as JSON Lines
    Transform {
        /// Records as a JSON array or JSON Lines
        file: PathBuf,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_check() {
        let cli = Cli::parse_from(["rc", "check", "data.json"]);
        assert!(matches!(cli.command, Command::Check { file } if file == PathBuf::from("data.json")));
    }

    #[test]
    fn test_parse_transform_with_output() {
        let cli = Cli::parse_from(["rc", "-l", "debug", "transform", "in.jsonl", "-o", "out.jsonl"]);
        assert_eq!(cli.log_level.as_deref(), Some("debug"));
        match cli.command {
            Command::Transform { file, output } => {
                assert_eq!(file, PathBuf::from("in.jsonl"));
                assert_eq!(output, Some(PathBuf::from("out.jsonl")));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_requires_file() {
        assert!(Cli::try_parse_from(["rc", "check"]).is_err());
    }
}
