//! Per-artifact outcomes and the run tally

use serde::Serialize;

/// What a report line is about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Target {
    Notebook,
    Dashboard,
    Job,
}

impl From<crate::artifact::ArtifactKind> for Target {
    fn from(kind: crate::artifact::ArtifactKind) -> Self {
        match kind {
            crate::artifact::ArtifactKind::Dashboard => Self::Dashboard,
            crate::artifact::ArtifactKind::Job => Self::Job,
        }
    }
}

impl std::fmt::Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Notebook => write!(f, "notebook"),
            Self::Dashboard => write!(f, "dashboard"),
            Self::Job => write!(f, "job"),
        }
    }
}

/// Terminal state of one artifact
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Outcome {
    Created { id: Option<String> },
    Updated { id: String },
    Imported { path: String },
    CreateFailed { error: String },
    UpdateFailed { id: String, error: String },
    /// Read/parse, listing or import failure
    Failed { error: String },
    Skipped { reason: String },
    WouldCreate,
    WouldUpdate { id: String },
    WouldImport { path: String },
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(
            self,
            Self::Created { .. }
                | Self::Updated { .. }
                | Self::Imported { .. }
                | Self::WouldCreate
                | Self::WouldUpdate { .. }
                | Self::WouldImport { .. }
        )
    }

    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            Self::CreateFailed { .. } | Self::UpdateFailed { .. } | Self::Failed { .. }
        )
    }
}

/// One printed line of the run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArtifactReport {
    pub target: Target,
    pub name: String,
    pub outcome: Outcome,
}

impl ArtifactReport {
    pub fn new(target: impl Into<Target>, name: impl Into<String>, outcome: Outcome) -> Self {
        Self {
            target: target.into(),
            name: name.into(),
            outcome,
        }
    }
}

impl std::fmt::Display for ArtifactReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (t, n) = (self.target, &self.name);
        match &self.outcome {
            Outcome::Created { id: Some(id) } => write!(f, "Created {t}: {n} (id={id})"),
            Outcome::Created { id: None } => write!(f, "Created {t}: {n}"),
            Outcome::Updated { id } => write!(f, "Updated {t}: {n} (id={id})"),
            Outcome::Imported { path } => write!(f, "Imported {t}: {n} -> {path}"),
            Outcome::CreateFailed { error } => write!(f, "Failed to create {t} {n}: {error}"),
            Outcome::UpdateFailed { id, error } => write!(f, "Failed to update {t} {n} (id={id}): {error}"),
            Outcome::Failed { error } => write!(f, "Failed {t} {n}: {error}"),
            Outcome::Skipped { reason } => write!(f, "Skipped {t} {n}: {reason}"),
            Outcome::WouldCreate => write!(f, "Would create {t}: {n}"),
            Outcome::WouldUpdate { id } => write!(f, "Would update {t}: {n} (id={id})"),
            Outcome::WouldImport { path } => write!(f, "Would import {t}: {n} -> {path}"),
        }
    }
}

/// Everything that happened in one run
#[derive(Debug, Clone, Default, Serialize)]
pub struct DeploySummary {
    pub reports: Vec<ArtifactReport>,
}

impl DeploySummary {
    pub fn extend(&mut self, reports: impl IntoIterator<Item = ArtifactReport>) {
        self.reports.extend(reports);
    }

    pub fn tally(&self) -> Tally {
        let mut tally = Tally::default();
        for report in &self.reports {
            match report.outcome {
                Outcome::Created { .. } | Outcome::WouldCreate => tally.created += 1,
                Outcome::Updated { .. } | Outcome::WouldUpdate { .. } => tally.updated += 1,
                Outcome::Imported { .. } | Outcome::WouldImport { .. } => tally.imported += 1,
                Outcome::Skipped { .. } => tally.skipped += 1,
                Outcome::CreateFailed { .. } | Outcome::UpdateFailed { .. } | Outcome::Failed { .. } => {
                    tally.failed += 1
                }
            }
        }
        tally
    }
}

/// Counts per terminal state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Tally {
    pub created: usize,
    pub updated: usize,
    pub imported: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl std::fmt::Display for Tally {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} created, {} updated, {} imported, {} skipped, {} failed",
            self.created, self.updated, self.imported, self.skipped, self.failed
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tally() {
        let mut summary = DeploySummary::default();
        summary.extend(vec![
            ArtifactReport::new(Target::Dashboard, "A", Outcome::Updated { id: "1".to_string() }),
            ArtifactReport::new(Target::Dashboard, "B", Outcome::Created { id: None }),
            ArtifactReport::new(
                Target::Job,
                "etl",
                Outcome::CreateFailed {
                    error: "API error 400: bad".to_string(),
                },
            ),
            ArtifactReport::new(
                Target::Job,
                "anon.json",
                Outcome::Skipped {
                    reason: "missing 'name'".to_string(),
                },
            ),
        ]);

        let tally = summary.tally();
        assert_eq!(tally.created, 1);
        assert_eq!(tally.updated, 1);
        assert_eq!(tally.failed, 1);
        assert_eq!(tally.skipped, 1);
        assert_eq!(tally.to_string(), "1 created, 1 updated, 0 imported, 1 skipped, 1 failed");
    }

    #[test]
    fn test_display_lines() {
        let report = ArtifactReport::new(Target::Dashboard, "Sales", Outcome::Updated { id: "42".to_string() });
        assert_eq!(report.to_string(), "Updated dashboard: Sales (id=42)");
        assert!(report.outcome.is_success());

        let report = ArtifactReport::new(
            Target::Job,
            "etl",
            Outcome::UpdateFailed {
                id: "9".to_string(),
                error: "timeout".to_string(),
            },
        );
        assert_eq!(report.to_string(), "Failed to update job etl (id=9): timeout");
        assert!(report.outcome.is_failure());
    }
}
