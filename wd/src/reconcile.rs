//! Create-or-update-by-name reconciliation
//!
//! One remote snapshot per kind is fetched up front, then every local
//! definition is matched against it by exact name:
//!
//! ```text
//! LOADED -> MATCHING -> { UPDATE_PENDING -> UPDATED | UPDATE_FAILED,
//!                         CREATE_PENDING -> CREATED | CREATE_FAILED }
//! ```
//!
//! A match without a usable id is skipped, never created. Remote artifacts
//! with no local counterpart are left alone. Every remote failure stays at the
//! artifact boundary; the remaining artifacts are still processed.

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::api::WorkspaceApi;
use crate::artifact::{ArtifactKind, LocalArtifact, Loaded, RemoteArtifact};
use crate::error::ApiError;
use crate::report::{ArtifactReport, Outcome};

/// Decision for one local definition, before any create/update call
#[derive(Debug, Clone, PartialEq)]
pub enum PlannedAction {
    Create(LocalArtifact),
    Update { artifact: LocalArtifact, id: String },
    Skip { name: String, reason: String },
    Fail { name: String, error: String },
}

impl PlannedAction {
    pub fn name(&self) -> &str {
        match self {
            Self::Create(a) | Self::Update { artifact: a, .. } => &a.name,
            Self::Skip { name, .. } | Self::Fail { name, .. } => name,
        }
    }
}

/// Match every loaded definition against the snapshot
///
/// First remote entry with an equal name wins.
pub fn plan(snapshot: &[RemoteArtifact], loaded: Vec<Loaded>) -> Vec<PlannedAction> {
    debug!(remote = snapshot.len(), local = loaded.len(), "plan: called");
    loaded
        .into_iter()
        .map(|item| {
            let label = file_label(item.source());
            match item {
                Loaded::Ready(artifact) => plan_one(snapshot, artifact),
                Loaded::Skipped { reason, .. } => PlannedAction::Skip { name: label, reason },
                Loaded::Unreadable { error, .. } => PlannedAction::Fail { name: label, error },
            }
        })
        .collect()
}

fn plan_one(snapshot: &[RemoteArtifact], artifact: LocalArtifact) -> PlannedAction {
    let existing = snapshot
        .iter()
        .find(|remote| remote.name.as_deref() == Some(artifact.name.as_str()));

    match existing {
        None => PlannedAction::Create(artifact),
        Some(remote) => match remote.usable_id() {
            Some(id) => PlannedAction::Update {
                id: id.to_string(),
                artifact,
            },
            None => PlannedAction::Skip {
                reason: format!("found remote {} '{}' but it has no id", artifact.kind, artifact.name),
                name: artifact.name,
            },
        },
    }
}

/// Report text for a failed call; timeouts are called out as such
fn failure_text(e: &ApiError) -> String {
    if e.is_timeout() {
        format!("request timed out: {}", e)
    } else {
        e.to_string()
    }
}

fn file_label(source: &Path) -> String {
    source
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| source.display().to_string())
}

/// Reconciles one artifact kind against the remote workspace
pub struct Reconciler {
    api: Arc<dyn WorkspaceApi>,
    kind: ArtifactKind,
    dry_run: bool,
}

impl Reconciler {
    pub fn new(api: Arc<dyn WorkspaceApi>, kind: ArtifactKind) -> Self {
        Self {
            api,
            kind,
            dry_run: false,
        }
    }

    /// Plan only; no create or update calls are issued
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Bring the remote in line with `loaded`, one artifact at a time
    pub async fn reconcile(&self, loaded: Vec<Loaded>) -> Vec<ArtifactReport> {
        debug!(kind = %self.kind, count = loaded.len(), dry_run = self.dry_run, "reconcile: called");

        let needs_snapshot = loaded.iter().any(|l| matches!(l, Loaded::Ready(_)));
        let snapshot = if needs_snapshot {
            match self.api.list(self.kind).await {
                Ok(snapshot) => {
                    info!(kind = %self.kind, remote = snapshot.len(), "reconcile: fetched remote snapshot");
                    snapshot
                }
                Err(e) => {
                    error!(kind = %self.kind, error = %e, "reconcile: failed to list remote artifacts");
                    return self.fail_all(loaded, &failure_text(&e));
                }
            }
        } else {
            debug!(kind = %self.kind, "reconcile: nothing to match, not listing");
            Vec::new()
        };

        let mut reports = Vec::new();
        for action in plan(&snapshot, loaded) {
            debug!(kind = %self.kind, name = action.name(), "reconcile: applying");
            reports.push(self.apply(action).await);
        }
        reports
    }

    /// Without a snapshot no artifact of this kind is created or updated
    fn fail_all(&self, loaded: Vec<Loaded>, cause: &str) -> Vec<ArtifactReport> {
        loaded
            .into_iter()
            .map(|item| {
                let label = file_label(item.source());
                let (name, outcome) = match item {
                    Loaded::Ready(a) => (
                        a.name,
                        Outcome::Failed {
                            error: format!("remote listing failed: {}", cause),
                        },
                    ),
                    Loaded::Skipped { reason, .. } => (label, Outcome::Skipped { reason }),
                    Loaded::Unreadable { error, .. } => (label, Outcome::Failed { error }),
                };
                ArtifactReport::new(self.kind, name, outcome)
            })
            .collect()
    }

    async fn apply(&self, action: PlannedAction) -> ArtifactReport {
        let kind = self.kind;
        match action {
            PlannedAction::Skip { name, reason } => {
                warn!(%kind, %name, %reason, "apply: skipping");
                ArtifactReport::new(kind, name, Outcome::Skipped { reason })
            }
            PlannedAction::Fail { name, error } => {
                error!(%kind, %name, %error, "apply: unusable local definition");
                ArtifactReport::new(kind, name, Outcome::Failed { error })
            }
            PlannedAction::Create(artifact) if self.dry_run => {
                info!(%kind, name = %artifact.name, "apply: would create");
                ArtifactReport::new(kind, artifact.name, Outcome::WouldCreate)
            }
            PlannedAction::Update { artifact, id } if self.dry_run => {
                info!(%kind, name = %artifact.name, %id, "apply: would update");
                ArtifactReport::new(kind, artifact.name, Outcome::WouldUpdate { id })
            }
            PlannedAction::Create(artifact) => {
                debug!(%kind, name = %artifact.name, "apply: creating");
                match self.api.create(kind, &artifact.payload()).await {
                    Ok(id) => {
                        info!(%kind, name = %artifact.name, ?id, "apply: created");
                        ArtifactReport::new(kind, artifact.name, Outcome::Created { id })
                    }
                    Err(e) => {
                        error!(%kind, name = %artifact.name, error = %e, "apply: create failed");
                        ArtifactReport::new(kind, artifact.name, Outcome::CreateFailed { error: failure_text(&e) })
                    }
                }
            }
            PlannedAction::Update { artifact, id } => {
                debug!(%kind, name = %artifact.name, %id, "apply: updating");
                match self.api.update(kind, &id, &artifact.payload()).await {
                    Ok(()) => {
                        info!(%kind, name = %artifact.name, %id, "apply: updated");
                        ArtifactReport::new(kind, artifact.name, Outcome::Updated { id })
                    }
                    Err(e) => {
                        error!(%kind, name = %artifact.name, %id, error = %e, "apply: update failed");
                        ArtifactReport::new(
                            kind,
                            artifact.name,
                            Outcome::UpdateFailed {
                                id,
                                error: failure_text(&e),
                            },
                        )
                    }
                }
            }
        }
    }
}
