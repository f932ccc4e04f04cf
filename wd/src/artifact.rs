//! Local artifact definitions and the remote artifacts they are matched against

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// File suffix for dashboard definitions
pub const DASHBOARD_SUFFIX: &str = ".lvdash.json";

/// File suffix for job definitions
pub const JOB_SUFFIX: &str = ".json";

/// Kind of artifact reconciled against the remote API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    Dashboard,
    Job,
}

impl ArtifactKind {
    /// File suffix identifying definitions of this kind
    pub fn suffix(&self) -> &'static str {
        match self {
            Self::Dashboard => DASHBOARD_SUFFIX,
            Self::Job => JOB_SUFFIX,
        }
    }

    /// Whether a discovered file is a definition of this kind
    ///
    /// Dashboard files also end in `.json`, so they are never jobs.
    pub fn accepts(&self, path: &Path) -> bool {
        let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
            return false;
        };
        match self {
            Self::Dashboard => file_name.ends_with(DASHBOARD_SUFFIX),
            Self::Job => file_name.ends_with(JOB_SUFFIX) && !file_name.ends_with(DASHBOARD_SUFFIX),
        }
    }
}

impl std::fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Dashboard => write!(f, "dashboard"),
            Self::Job => write!(f, "job"),
        }
    }
}

/// A parsed local definition with its canonical name
#[derive(Debug, Clone, PartialEq)]
pub struct LocalArtifact {
    pub kind: ArtifactKind,
    /// Name matched against the remote snapshot
    pub name: String,
    /// File the definition was read from
    pub source: PathBuf,
    /// Body sent wholesale on create or update
    pub body: Map<String, Value>,
}

impl LocalArtifact {
    /// Build a dashboard definition
    ///
    /// The canonical name is the file name with both extensions stripped.
    /// `display_name` and `parent_path` are injected into the body.
    pub fn dashboard(source: &Path, content: &str, parent_path: &str) -> Result<Self, Loaded> {
        debug!(source = %source.display(), "LocalArtifact::dashboard: called");
        let name = dashboard_name(source).ok_or_else(|| Loaded::Unreadable {
            source: source.to_path_buf(),
            error: "file name is not valid UTF-8".to_string(),
        })?;

        let mut body = parse_object(source, content)?;
        body.insert("display_name".to_string(), Value::String(name.clone()));
        body.insert("parent_path".to_string(), Value::String(parent_path.to_string()));

        Ok(Self {
            kind: ArtifactKind::Dashboard,
            name,
            source: source.to_path_buf(),
            body,
        })
    }

    /// Build a job definition
    ///
    /// The canonical name is the `name` field; a job without one is skipped.
    pub fn job(source: &Path, content: &str) -> Result<Self, Loaded> {
        debug!(source = %source.display(), "LocalArtifact::job: called");
        let body = parse_object(source, content)?;

        let name = match body.get("name").and_then(Value::as_str) {
            Some(n) if !n.is_empty() => n.to_string(),
            _ => {
                return Err(Loaded::Skipped {
                    source: source.to_path_buf(),
                    reason: "missing 'name' in job definition".to_string(),
                });
            }
        };

        Ok(Self {
            kind: ArtifactKind::Job,
            name,
            source: source.to_path_buf(),
            body,
        })
    }

    /// Body as a JSON value
    pub fn payload(&self) -> Value {
        Value::Object(self.body.clone())
    }
}

/// Result of loading one file from local storage
#[derive(Debug, Clone, PartialEq)]
pub enum Loaded {
    Ready(LocalArtifact),
    /// Advisory: never sent to the remote
    Skipped { source: PathBuf, reason: String },
    /// Could not be read or parsed
    Unreadable { source: PathBuf, error: String },
}

impl Loaded {
    pub fn source(&self) -> &Path {
        match self {
            Self::Ready(a) => &a.source,
            Self::Skipped { source, .. } | Self::Unreadable { source, .. } => source,
        }
    }
}

/// Existing remote artifact, as seen in the snapshot
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemoteArtifact {
    pub name: Option<String>,
    pub id: Option<String>,
}

impl RemoteArtifact {
    pub fn new(name: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            id: Some(id.into()),
        }
    }

    /// Id that can address an update, if any
    pub fn usable_id(&self) -> Option<&str> {
        self.id.as_deref().filter(|id| !id.is_empty())
    }
}

/// Canonical dashboard name: `sales.lvdash.json` -> `sales`
pub fn dashboard_name(path: &Path) -> Option<String> {
    let first = path.file_stem()?;
    let second = Path::new(first).file_stem()?;
    second.to_str().map(str::to_string)
}

/// A file found in a local directory, or the path that could not be read
pub type Discovered = std::result::Result<PathBuf, (PathBuf, String)>;

/// Find the files in `dir` ending in `suffix`, sorted by path
///
/// Entries the directory walk cannot read come back as `Err` so the caller
/// can report them per file. Only an invalid pattern is an error.
pub fn discover(dir: &Path, suffix: &str) -> Result<Vec<Discovered>> {
    debug!(dir = %dir.display(), %suffix, "discover: called");
    let pattern = format!("{}/*{}", glob::Pattern::escape(&dir.to_string_lossy()), suffix);

    let mut found = Vec::new();
    for entry in glob::glob(&pattern).context(format!("Invalid glob pattern: {}", pattern))? {
        match entry {
            Ok(path) if path.is_file() => found.push(Ok(path)),
            Ok(_) => {}
            Err(e) => {
                warn!(path = %e.path().display(), error = %e.error(), "discover: unreadable entry");
                found.push(Err((e.path().to_path_buf(), e.error().to_string())));
            }
        }
    }

    found.sort_by(|a, b| discovered_path(a).cmp(discovered_path(b)));
    Ok(found)
}

fn discovered_path(entry: &Discovered) -> &Path {
    match entry {
        Ok(path) | Err((path, _)) => path.as_path(),
    }
}

/// Load every definition of `kind` in `dir`, sorted by path
///
/// Per-file problems are returned as [`Loaded::Skipped`] or
/// [`Loaded::Unreadable`]; only an invalid directory pattern is an error.
pub fn load_dir(kind: ArtifactKind, dir: &Path, parent_path: &str) -> Result<Vec<Loaded>> {
    debug!(%kind, dir = %dir.display(), "load_dir: called");
    let loaded = load_entries(kind, discover(dir, kind.suffix())?, parent_path);
    debug!(%kind, count = loaded.len(), "load_dir: done");
    Ok(loaded)
}

/// Load discovered entries, dropping files that belong to another kind
pub fn load_entries(kind: ArtifactKind, entries: Vec<Discovered>, parent_path: &str) -> Vec<Loaded> {
    entries
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(path) if kind.accepts(&path) => Some(load_file(kind, &path, parent_path)),
            Ok(_) => None,
            Err((source, error)) => Some(Loaded::Unreadable { source, error }),
        })
        .collect()
}

fn load_file(kind: ArtifactKind, path: &Path, parent_path: &str) -> Loaded {
    let content = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            warn!(source = %path.display(), error = %e, "load_file: failed to read");
            return Loaded::Unreadable {
                source: path.to_path_buf(),
                error: e.to_string(),
            };
        }
    };

    let result = match kind {
        ArtifactKind::Dashboard => LocalArtifact::dashboard(path, &content, parent_path),
        ArtifactKind::Job => LocalArtifact::job(path, &content),
    };

    match result {
        Ok(artifact) => Loaded::Ready(artifact),
        Err(other) => other,
    }
}

fn parse_object(source: &Path, content: &str) -> Result<Map<String, Value>, Loaded> {
    match serde_json::from_str::<Value>(content) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(Loaded::Unreadable {
            source: source.to_path_buf(),
            error: "definition is not a JSON object".to_string(),
        }),
        Err(e) => Err(Loaded::Unreadable {
            source: source.to_path_buf(),
            error: format!("invalid JSON: {}", e),
        }),
    }
}
