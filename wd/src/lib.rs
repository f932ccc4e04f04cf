//! wsdeploy - idempotent workspace deployment
//!
//! Makes a remote workspace match a directory of local definitions:
//!
//! ```text
//! notebooks/*.ipynb        -> imported via the workspace CLI (overwrite)
//! dashboards/*.lvdash.json -> created or updated by display name
//! jobs/*.json              -> created or updated by job name
//! ```
//!
//! Dashboards and jobs go through [`Reconciler`]: the remote listing is fetched
//! once per kind, each local definition is matched by exact name, then updated
//! in place or created. Nothing is ever deleted remotely. A failing artifact is
//! reported and the run moves on to the next one.
//!
//! # Example
//!
//! ```ignore
//! use wsdeploy::{Config, Deployer, api::create_client};
//!
//! let config = Config::load(None)?;
//! let credentials = config.workspace.credentials()?;
//! let api = create_client(&config.workspace, credentials)?;
//! let summary = Deployer::new(api, config).run().await?;
//! println!("{}", summary.tally());
//! ```

pub mod api;
pub mod artifact;
pub mod cli;
pub mod config;
pub mod deploy;
pub mod error;
pub mod notebook;
pub mod reconcile;
pub mod report;

pub use api::{DatabricksClient, WorkspaceApi, create_client};
pub use artifact::{ArtifactKind, LocalArtifact, Loaded, RemoteArtifact, load_dir};
pub use config::{Config, Credentials, DeployConfig, WorkspaceConfig};
pub use deploy::Deployer;
pub use error::{ApiError, ConfigError};
pub use notebook::NotebookImporter;
pub use reconcile::{PlannedAction, Reconciler, plan};
pub use report::{ArtifactReport, DeploySummary, Outcome, Tally, Target};
