//! WorkspaceApi trait definition

use async_trait::async_trait;
use serde_json::Value;

use crate::artifact::{ArtifactKind, RemoteArtifact};
use crate::error::ApiError;

/// Three logical operations per artifact kind
///
/// Endpoints are resource-scoped: a dashboard id is never valid for a job
/// call and vice versa.
#[async_trait]
pub trait WorkspaceApi: Send + Sync {
    /// List every remote artifact of `kind`, in remote order
    async fn list(&self, kind: ArtifactKind) -> Result<Vec<RemoteArtifact>, ApiError>;

    /// Create a new artifact, returning its remote id when the remote reports one
    async fn create(&self, kind: ArtifactKind, definition: &Value) -> Result<Option<String>, ApiError>;

    /// Replace the artifact addressed by `id` with `definition`
    async fn update(&self, kind: ArtifactKind, id: &str, definition: &Value) -> Result<(), ApiError>;
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use tracing::debug;

    /// A call observed by [`MockWorkspaceApi`]
    #[derive(Debug, Clone, PartialEq)]
    pub enum Call {
        List(ArtifactKind),
        Create(ArtifactKind, Value),
        Update(ArtifactKind, String, Value),
    }

    /// Mock workspace for unit tests
    ///
    /// Serves a fixed snapshot per kind and records every call. Names listed
    /// in `failing` make create/update for that artifact return a 500.
    #[derive(Default)]
    pub struct MockWorkspaceApi {
        snapshots: HashMap<ArtifactKind, Vec<RemoteArtifact>>,
        failing: Vec<String>,
        list_fails: bool,
        calls: Mutex<Vec<Call>>,
    }

    impl MockWorkspaceApi {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_remote(mut self, kind: ArtifactKind, remote: Vec<RemoteArtifact>) -> Self {
            debug!(%kind, count = remote.len(), "MockWorkspaceApi::with_remote: called");
            self.snapshots.insert(kind, remote);
            self
        }

        pub fn failing_for(mut self, name: &str) -> Self {
            self.failing.push(name.to_string());
            self
        }

        pub fn with_list_failure(mut self) -> Self {
            self.list_fails = true;
            self
        }

        pub fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }

        pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
            self.calls().iter().filter(|c| pred(c)).count()
        }

        fn name_of(kind: ArtifactKind, definition: &Value) -> Option<String> {
            let field = match kind {
                ArtifactKind::Dashboard => "display_name",
                ArtifactKind::Job => "name",
            };
            definition
                .get("new_settings")
                .unwrap_or(definition)
                .get(field)
                .and_then(Value::as_str)
                .map(str::to_string)
        }

        fn check(&self, kind: ArtifactKind, definition: &Value) -> Result<(), ApiError> {
            match Self::name_of(kind, definition) {
                Some(name) if self.failing.contains(&name) => Err(ApiError::Status {
                    status: 500,
                    message: format!("mock failure for {}", name),
                }),
                _ => Ok(()),
            }
        }
    }

    #[async_trait]
    impl WorkspaceApi for MockWorkspaceApi {
        async fn list(&self, kind: ArtifactKind) -> Result<Vec<RemoteArtifact>, ApiError> {
            debug!(%kind, "MockWorkspaceApi::list: called");
            self.calls.lock().unwrap().push(Call::List(kind));
            if self.list_fails {
                return Err(ApiError::Status {
                    status: 503,
                    message: "temporarily unavailable".to_string(),
                });
            }
            Ok(self.snapshots.get(&kind).cloned().unwrap_or_default())
        }

        async fn create(&self, kind: ArtifactKind, definition: &Value) -> Result<Option<String>, ApiError> {
            debug!(%kind, "MockWorkspaceApi::create: called");
            let idx = {
                let mut calls = self.calls.lock().unwrap();
                calls.push(Call::Create(kind, definition.clone()));
                calls.len()
            };
            self.check(kind, definition)?;
            Ok(Some(format!("new-{}", idx)))
        }

        async fn update(&self, kind: ArtifactKind, id: &str, definition: &Value) -> Result<(), ApiError> {
            debug!(%kind, %id, "MockWorkspaceApi::update: called");
            self.calls
                .lock()
                .unwrap()
                .push(Call::Update(kind, id.to_string(), definition.clone()));
            self.check(kind, definition)
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[tokio::test]
        async fn test_mock_serves_snapshot_and_records_calls() {
            let api = MockWorkspaceApi::new().with_remote(ArtifactKind::Job, vec![RemoteArtifact::new("etl", "7")]);

            let jobs = api.list(ArtifactKind::Job).await.unwrap();
            assert_eq!(jobs, vec![RemoteArtifact::new("etl", "7")]);
            assert!(api.list(ArtifactKind::Dashboard).await.unwrap().is_empty());

            api.update(ArtifactKind::Job, "7", &serde_json::json!({"name": "etl"}))
                .await
                .unwrap();

            assert_eq!(api.calls().len(), 3);
            assert_eq!(api.count(|c| matches!(c, Call::Update(_, id, _) if id == "7")), 1);
        }

        #[tokio::test]
        async fn test_mock_failing_name() {
            let api = MockWorkspaceApi::new().failing_for("B");
            let result = api
                .create(ArtifactKind::Dashboard, &serde_json::json!({"display_name": "B"}))
                .await;
            assert_eq!(result.unwrap_err().status(), Some(500));
        }
    }
}
