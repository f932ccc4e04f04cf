//! Full deploy run: notebooks, then dashboards, then jobs

use eyre::Result;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use crate::api::WorkspaceApi;
use crate::artifact::{ArtifactKind, load_dir};
use crate::config::Config;
use crate::notebook::NotebookImporter;
use crate::reconcile::Reconciler;
use crate::report::{DeploySummary, Target};

/// Runs every selected target in a fixed order, sequentially
pub struct Deployer {
    api: Arc<dyn WorkspaceApi>,
    config: Config,
    targets: Vec<Target>,
    dry_run: bool,
}

impl Deployer {
    pub fn new(api: Arc<dyn WorkspaceApi>, config: Config) -> Self {
        Self {
            api,
            config,
            targets: vec![Target::Notebook, Target::Dashboard, Target::Job],
            dry_run: false,
        }
    }

    /// Restrict the run to `targets`; an empty list keeps all of them
    pub fn only(mut self, targets: &[Target]) -> Self {
        if !targets.is_empty() {
            self.targets = targets.to_vec();
        }
        self
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    fn selected(&self, target: Target) -> bool {
        self.targets.contains(&target)
    }

    /// Deploy everything selected
    ///
    /// Per-artifact failures land in the summary; only local setup problems
    /// (an unusable directory pattern) are returned as errors.
    pub async fn run(&self) -> Result<DeploySummary> {
        debug!(targets = ?self.targets, dry_run = self.dry_run, "Deployer::run: called");
        let deploy = &self.config.deploy;
        let mut summary = DeploySummary::default();

        if self.selected(Target::Notebook) && present(&deploy.notebooks_dir, Target::Notebook) {
            let importer = NotebookImporter::new(deploy, Duration::from_millis(self.config.workspace.timeout_ms))
                .dry_run(self.dry_run);
            summary.extend(importer.import_dir(&deploy.notebooks_dir).await?);
        }

        for (target, kind, dir) in [
            (Target::Dashboard, ArtifactKind::Dashboard, &deploy.dashboards_dir),
            (Target::Job, ArtifactKind::Job, &deploy.jobs_dir),
        ] {
            if !self.selected(target) || !present(dir, target) {
                continue;
            }

            let loaded = load_dir(kind, dir, &deploy.parent_path)?;
            if loaded.is_empty() {
                info!(%kind, dir = %dir.display(), "Deployer::run: no definitions found to deploy");
                continue;
            }

            let reconciler = Reconciler::new(self.api.clone(), kind).dry_run(self.dry_run);
            summary.extend(reconciler.reconcile(loaded).await);
        }

        info!(tally = %summary.tally(), "Deployer::run: done");
        Ok(summary)
    }
}

fn present(dir: &Path, target: Target) -> bool {
    if dir.is_dir() {
        true
    } else {
        info!(%target, dir = %dir.display(), "No {} directory found, skipping", target);
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::client::mock::{Call, MockWorkspaceApi};
    use crate::artifact::RemoteArtifact;
    use crate::report::Outcome;
    use std::fs;
    use tempfile::TempDir;

    fn config_for(root: &Path) -> Config {
        let mut config = Config::default();
        config.deploy.dashboards_dir = root.join("dashboards");
        config.deploy.jobs_dir = root.join("jobs");
        config.deploy.notebooks_dir = root.join("notebooks");
        config.deploy.cli_binary = "true".to_string();
        config
    }

    #[tokio::test]
    async fn test_run_all_targets_in_order() {
        let temp = TempDir::new().unwrap();
        for dir in ["dashboards", "jobs", "notebooks"] {
            fs::create_dir(temp.path().join(dir)).unwrap();
        }
        fs::write(temp.path().join("notebooks/etl.ipynb"), "{}").unwrap();
        fs::write(temp.path().join("dashboards/Sales.lvdash.json"), "{}").unwrap();
        fs::write(temp.path().join("jobs/etl.json"), r#"{"name": "etl"}"#).unwrap();

        let api = Arc::new(MockWorkspaceApi::new().with_remote(ArtifactKind::Job, vec![RemoteArtifact::new("etl", "9")]));
        let summary = Deployer::new(api.clone(), config_for(temp.path())).run().await.unwrap();

        let targets: Vec<_> = summary.reports.iter().map(|r| r.target).collect();
        assert_eq!(targets, vec![Target::Notebook, Target::Dashboard, Target::Job]);
        assert!(summary.reports.iter().all(|r| r.outcome.is_success()));
        assert_eq!(summary.reports[2].outcome, Outcome::Updated { id: "9".to_string() });
    }

    #[tokio::test]
    async fn test_missing_directories_are_skipped() {
        let temp = TempDir::new().unwrap();
        let api = Arc::new(MockWorkspaceApi::new());

        let summary = Deployer::new(api.clone(), config_for(temp.path())).run().await.unwrap();

        assert!(summary.reports.is_empty());
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn test_only_jobs() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join("dashboards")).unwrap();
        fs::create_dir(temp.path().join("jobs")).unwrap();
        fs::write(temp.path().join("dashboards/Sales.lvdash.json"), "{}").unwrap();
        fs::write(temp.path().join("jobs/etl.json"), r#"{"name": "etl"}"#).unwrap();

        let api = Arc::new(MockWorkspaceApi::new());
        let summary = Deployer::new(api.clone(), config_for(temp.path()))
            .only(&[Target::Job])
            .run()
            .await
            .unwrap();

        assert_eq!(summary.reports.len(), 1);
        assert_eq!(summary.reports[0].target, Target::Job);
        assert_eq!(api.count(|c| matches!(c, Call::List(ArtifactKind::Dashboard))), 0);
    }
}
