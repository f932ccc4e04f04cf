//! Databricks REST client
//!
//! Implements [`WorkspaceApi`] for Lakeview dashboards (`/api/2.0/lakeview`)
//! and jobs (`/api/2.1/jobs`). Every call is a single attempt bounded by the
//! client timeout. A listing whose page tokens come round again is rejected
//! rather than followed.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashSet;
use std::time::Duration;
use tracing::{debug, warn};

use super::WorkspaceApi;
use crate::artifact::{ArtifactKind, RemoteArtifact};
use crate::config::Credentials;
use crate::error::{ApiError, ConfigError};

const DASHBOARDS_PATH: &str = "/api/2.0/lakeview/dashboards";
const JOBS_LIST_PATH: &str = "/api/2.1/jobs/list";
const JOBS_CREATE_PATH: &str = "/api/2.1/jobs/create";
const JOBS_UPDATE_PATH: &str = "/api/2.1/jobs/update";

/// HTTP client for one workspace
pub struct DatabricksClient {
    host: String,
    token: String,
    http: Client,
}

impl DatabricksClient {
    pub fn new(credentials: Credentials, timeout: Duration) -> Result<Self, ConfigError> {
        debug!(?credentials, ?timeout, "DatabricksClient::new: called");
        let http = Client::builder().timeout(timeout).build().map_err(ConfigError::Client)?;

        Ok(Self {
            host: credentials.host,
            token: credentials.token,
            http,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.host, path)
    }

    /// Send with auth, map non-2xx to [`ApiError::Status`], return the raw body
    async fn send(&self, request: RequestBuilder) -> Result<String, ApiError> {
        let response = request.bearer_auth(&self.token).send().await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            debug!(status = status.as_u16(), "send: API error");
            return Err(ApiError::Status {
                status: status.as_u16(),
                message: text,
            });
        }

        Ok(text)
    }

    async fn list_page(&self, kind: ArtifactKind, page_token: Option<&str>) -> Result<Page, ApiError> {
        debug!(%kind, ?page_token, "list_page: called");
        let path = match kind {
            ArtifactKind::Dashboard => DASHBOARDS_PATH,
            ArtifactKind::Job => JOBS_LIST_PATH,
        };

        let mut request = self.http.get(self.url(path));
        if let Some(token) = page_token {
            request = request.query(&[("page_token", token)]);
        }

        let text = self.send(request).await?;
        parse_page(kind, &text)
    }
}

#[async_trait]
impl WorkspaceApi for DatabricksClient {
    async fn list(&self, kind: ArtifactKind) -> Result<Vec<RemoteArtifact>, ApiError> {
        debug!(%kind, "list: called");
        let mut artifacts = Vec::new();
        let mut seen = HashSet::new();
        let mut page_token: Option<String> = None;

        loop {
            let page = self.list_page(kind, page_token.as_deref()).await?;
            artifacts.extend(page.artifacts);

            match page.next_page_token {
                Some(next) if seen.insert(next.clone()) => page_token = Some(next),
                Some(next) => {
                    warn!(%kind, token = %next, "list: remote repeated a page token");
                    return Err(ApiError::InvalidResponse(format!(
                        "{} listing repeated page token '{}'",
                        kind, next
                    )));
                }
                None => break,
            }
        }

        debug!(%kind, count = artifacts.len(), "list: done");
        Ok(artifacts)
    }

    async fn create(&self, kind: ArtifactKind, definition: &Value) -> Result<Option<String>, ApiError> {
        debug!(%kind, "create: called");
        let path = match kind {
            ArtifactKind::Dashboard => DASHBOARDS_PATH,
            ArtifactKind::Job => JOBS_CREATE_PATH,
        };

        let text = self.send(self.http.post(self.url(path)).json(definition)).await?;
        Ok(created_id(kind, &text))
    }

    async fn update(&self, kind: ArtifactKind, id: &str, definition: &Value) -> Result<(), ApiError> {
        debug!(%kind, %id, "update: called");
        let request = match kind {
            ArtifactKind::Dashboard => self
                .http
                .patch(self.url(&format!("{}/{}", DASHBOARDS_PATH, id)))
                .json(definition),
            ArtifactKind::Job => self.http.post(self.url(JOBS_UPDATE_PATH)).json(&job_update_body(id, definition)),
        };

        self.send(request).await?;
        Ok(())
    }
}

/// One page of a remote listing
#[derive(Debug, Default)]
struct Page {
    artifacts: Vec<RemoteArtifact>,
    next_page_token: Option<String>,
}

fn parse_page(kind: ArtifactKind, text: &str) -> Result<Page, ApiError> {
    match kind {
        ArtifactKind::Dashboard => {
            let page: DashboardList = serde_json::from_str(text)?;
            Ok(Page {
                artifacts: page
                    .dashboards
                    .into_iter()
                    .map(|d| RemoteArtifact {
                        name: d.display_name,
                        id: d.dashboard_id,
                    })
                    .collect(),
                next_page_token: non_empty(page.next_page_token),
            })
        }
        ArtifactKind::Job => {
            let page: JobList = serde_json::from_str(text)?;
            Ok(Page {
                artifacts: page
                    .jobs
                    .into_iter()
                    .map(|j| RemoteArtifact {
                        name: j.settings.and_then(|s| s.name),
                        id: j.job_id.as_ref().and_then(id_string),
                    })
                    .collect(),
                next_page_token: non_empty(page.next_page_token),
            })
        }
    }
}

/// Extract the new id from a create response
fn created_id(kind: ArtifactKind, text: &str) -> Option<String> {
    let value: Value = serde_json::from_str(text).ok()?;
    let field = match kind {
        ArtifactKind::Dashboard => "dashboard_id",
        ArtifactKind::Job => "job_id",
    };
    value.get(field).and_then(id_string)
}

/// `/jobs/update` takes the id plus the complete new settings
fn job_update_body(id: &str, definition: &Value) -> Value {
    let job_id = id
        .parse::<i64>()
        .map(Value::from)
        .unwrap_or_else(|_| Value::String(id.to_string()));

    serde_json::json!({
        "job_id": job_id,
        "new_settings": definition,
    })
}

fn id_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn non_empty(token: Option<String>) -> Option<String> {
    token.filter(|t| !t.is_empty())
}

// Databricks API response types

#[derive(Debug, Deserialize)]
struct DashboardList {
    #[serde(default)]
    dashboards: Vec<DashboardEntry>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DashboardEntry {
    dashboard_id: Option<String>,
    display_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct JobList {
    #[serde(default)]
    jobs: Vec<JobEntry>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct JobEntry {
    job_id: Option<Value>,
    settings: Option<JobSettings>,
}

#[derive(Debug, Deserialize)]
struct JobSettings {
    name: Option<String>,
}
