//! Notebook import through the external workspace CLI
//!
//! Each `*.ipynb` is imported to `{parent}/{stem}{suffix}`, overwriting
//! whatever is there. No matching happens here; the CLI's exit status is the
//! only signal.

use eyre::Result;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use crate::artifact::{Discovered, discover};
use crate::config::DeployConfig;
use crate::report::{ArtifactReport, Outcome, Target};

/// File suffix for notebooks
pub const NOTEBOOK_SUFFIX: &str = ".ipynb";

/// Imports notebooks by shelling out to the workspace CLI
#[derive(Debug, Clone)]
pub struct NotebookImporter {
    cli_binary: String,
    parent_path: String,
    suffix: String,
    timeout: Duration,
    dry_run: bool,
}

impl NotebookImporter {
    pub fn new(config: &DeployConfig, timeout: Duration) -> Self {
        Self {
            cli_binary: config.cli_binary.clone(),
            parent_path: config.parent_path.trim_end_matches('/').to_string(),
            suffix: config.notebook_suffix.clone(),
            timeout,
            dry_run: false,
        }
    }

    /// Report target paths without running the CLI
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Remote path for a local notebook: `notebooks/etl.ipynb` -> `/Shared/etl_prod`
    pub fn target_path(&self, notebook: &Path) -> Option<String> {
        let stem = notebook.file_stem()?.to_str()?;
        Some(format!("{}/{}{}", self.parent_path, stem, self.suffix))
    }

    /// Arguments passed to the CLI for one import
    pub fn import_args(&self, notebook: &Path, target: &str) -> Vec<String> {
        vec![
            "workspace".to_string(),
            "import".to_string(),
            notebook.to_string_lossy().into_owned(),
            target.to_string(),
            "-f".to_string(),
            "SOURCE".to_string(),
            "-l".to_string(),
            "PYTHON".to_string(),
            "--overwrite".to_string(),
        ]
    }

    /// Import every notebook in `dir`, sorted by path
    pub async fn import_dir(&self, dir: &Path) -> Result<Vec<ArtifactReport>> {
        debug!(dir = %dir.display(), "import_dir: called");
        let entries = discover(dir, NOTEBOOK_SUFFIX)?;

        if entries.is_empty() {
            warn!(dir = %dir.display(), "import_dir: no notebooks found to deploy");
        }

        Ok(self.import_entries(entries).await)
    }

    /// Import discovered notebooks one at a time
    pub async fn import_entries(&self, entries: Vec<Discovered>) -> Vec<ArtifactReport> {
        let mut reports = Vec::new();
        for entry in entries {
            let report = match entry {
                Ok(notebook) => self.import_one(&notebook).await,
                Err((notebook, error)) => {
                    error!(notebook = %notebook.display(), %error, "import_entries: unreadable notebook");
                    ArtifactReport::new(Target::Notebook, notebook_name(&notebook), Outcome::Failed { error })
                }
            };
            reports.push(report);
        }
        reports
    }

    async fn import_one(&self, notebook: &Path) -> ArtifactReport {
        let name = notebook_name(notebook);

        let Some(target) = self.target_path(notebook) else {
            return ArtifactReport::new(
                Target::Notebook,
                name,
                Outcome::Failed {
                    error: "file name is not valid UTF-8".to_string(),
                },
            );
        };

        if self.dry_run {
            info!(notebook = %notebook.display(), %target, "import_one: would import");
            return ArtifactReport::new(Target::Notebook, name, Outcome::WouldImport { path: target });
        }

        info!(notebook = %notebook.display(), %target, "import_one: deploying notebook");
        let result = tokio::time::timeout(
            self.timeout,
            tokio::process::Command::new(&self.cli_binary)
                .args(self.import_args(notebook, &target))
                .kill_on_drop(true)
                .output(),
        )
        .await;

        let outcome = match result {
            Ok(Ok(output)) if output.status.success() => {
                info!(%name, %target, "import_one: notebook deployed");
                Outcome::Imported { path: target }
            }
            Ok(Ok(output)) => {
                let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
                error!(%name, exit_code = ?output.status.code(), %stderr, "import_one: import failed");
                Outcome::Failed {
                    error: format!("exit code {}: {}", output.status.code().unwrap_or(-1), stderr),
                }
            }
            Ok(Err(e)) => {
                error!(%name, error = %e, "import_one: failed to run {}", self.cli_binary);
                Outcome::Failed {
                    error: format!("failed to run {}: {}", self.cli_binary, e),
                }
            }
            Err(_) => {
                error!(%name, "import_one: import timed out");
                Outcome::Failed {
                    error: format!("timed out after {}ms", self.timeout.as_millis()),
                }
            }
        };

        ArtifactReport::new(Target::Notebook, name, outcome)
    }
}

fn notebook_name(notebook: &Path) -> String {
    notebook
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| notebook.display().to_string())
}
