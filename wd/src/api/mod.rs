//! Remote workspace API
//!
//! The reconciler only talks to [`WorkspaceApi`]; [`DatabricksClient`] is the
//! HTTP implementation used by the `wd` binary.

use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

pub mod client;
mod databricks;

pub use client::WorkspaceApi;
pub use databricks::DatabricksClient;

use crate::config::{Credentials, WorkspaceConfig};
use crate::error::ConfigError;

/// Create the HTTP client from config and resolved credentials
pub fn create_client(config: &WorkspaceConfig, credentials: Credentials) -> Result<Arc<dyn WorkspaceApi>, ConfigError> {
    debug!(host = %credentials.host, timeout_ms = config.timeout_ms, "create_client: called");
    let client = DatabricksClient::new(credentials, Duration::from_millis(config.timeout_ms))?;
    Ok(Arc::new(client))
}
