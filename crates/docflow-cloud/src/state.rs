//! Document status and invocation state persistence
//!
//! The core never stores anything between invocations. The invocation
//! harness keeps the last model and callback context in
//! `.docflow/state.json` and replays them on the next run.

use crate::error::StateError;
use crate::event::CallbackContext;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;
use tokio::fs;
use tokio::io::AsyncWriteExt;

const STATE_VERSION: u32 = 1;
const STATE_DIR: &str = ".docflow";
const STATE_FILE: &str = "state.json";
const STAGED_STATE_FILE: &str = "state.json.tmp";
const PREVIOUS_STATE_FILE: &str = "state.previous.json";
const LOCK_FILE: &str = "reconcile.lock";
const STALE_LOCK_MINUTES: i64 = 60;

type StateResult<T> = std::result::Result<T, StateError>;

/// Normalized remote status of a document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentStatus {
    /// Document is being created
    Creating,
    /// Document is ready for use
    Active,
    /// A new version is being applied
    Updating,
    /// Document is being deleted
    Deleting,
    /// Creation or update failed
    Failed,
}

/// Status string outside the provider's enumeration
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unrecognized document status: {0}")]
pub struct UnrecognizedStatus(pub String);

impl FromStr for DocumentStatus {
    type Err = UnrecognizedStatus;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "creating" => Ok(DocumentStatus::Creating),
            "active" => Ok(DocumentStatus::Active),
            "updating" => Ok(DocumentStatus::Updating),
            "deleting" => Ok(DocumentStatus::Deleting),
            "failed" => Ok(DocumentStatus::Failed),
            _ => Err(UnrecognizedStatus(s.to_string())),
        }
    }
}

impl std::fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DocumentStatus::Creating => write!(f, "Creating"),
            DocumentStatus::Active => write!(f, "Active"),
            DocumentStatus::Updating => write!(f, "Updating"),
            DocumentStatus::Deleting => write!(f, "Deleting"),
            DocumentStatus::Failed => write!(f, "Failed"),
        }
    }
}

/// What the harness remembers between two invocations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvocationState<M> {
    pub version: u32,
    pub saved_at: DateTime<Utc>,
    /// Model as returned by the last invocation (carries the synthesized name)
    pub resource_model: M,
    /// Token to replay; absent before the first invocation
    pub callback_context: Option<CallbackContext>,
    /// Idempotency token of the workflow; reused so a synthesized name stays stable
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_token: Option<String>,
}

impl<M> InvocationState<M> {
    pub fn new(resource_model: M, callback_context: Option<CallbackContext>) -> Self {
        Self {
            version: STATE_VERSION,
            saved_at: Utc::now(),
            resource_model,
            callback_context,
            request_token: None,
        }
    }

    pub fn with_request_token(mut self, request_token: impl Into<String>) -> Self {
        self.request_token = Some(request_token.into());
        self
    }

    /// Whether the create call has already been issued for this workflow
    pub fn create_started(&self) -> bool {
        self.callback_context
            .is_some_and(|context| context.create_document_started)
    }
}

/// Reads and writes `<root>/.docflow/state.json`
pub struct StateManager {
    dir: PathBuf,
}

impl StateManager {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            dir: root.as_ref().join(STATE_DIR),
        }
    }

    fn file(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }

    /// Load the persisted state; `None` when no workflow is pending
    pub async fn load<M: DeserializeOwned>(&self) -> StateResult<Option<InvocationState<M>>> {
        let raw = match fs::read_to_string(self.file(STATE_FILE)).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let state: InvocationState<M> = serde_json::from_str(&raw)?;
        if state.version != STATE_VERSION {
            return Err(StateError::Version(format!(
                "unsupported state version {} (expected {})",
                state.version, STATE_VERSION
            )));
        }

        tracing::debug!(
            create_started = state.create_started(),
            "Loaded invocation state"
        );
        Ok(Some(state))
    }

    /// Stage the new state next to the old one and swap it in with a rename,
    /// keeping the replaced file as `state.previous.json`
    pub async fn save<M: Serialize>(&self, state: &InvocationState<M>) -> StateResult<()> {
        fs::create_dir_all(&self.dir).await?;

        let current = self.file(STATE_FILE);
        let staged = self.file(STAGED_STATE_FILE);
        fs::write(&staged, serde_json::to_vec_pretty(state)?).await?;

        if fs::try_exists(&current).await? {
            fs::copy(&current, self.file(PREVIOUS_STATE_FILE)).await?;
        }
        fs::rename(&staged, &current).await?;

        tracing::debug!(path = %current.display(), "Saved invocation state");
        Ok(())
    }

    /// Forget the workflow once it reached a terminal outcome
    pub async fn clear(&self) -> StateResult<()> {
        match fs::remove_file(self.file(STATE_FILE)).await {
            Ok(()) => {
                tracing::debug!("Cleared invocation state");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Take the harness lock for this state directory
    ///
    /// The lock file is created exclusively. A lock older than an hour is
    /// treated as left behind by a crashed run and replaced.
    pub async fn acquire_lock(&self) -> StateResult<StateLock> {
        fs::create_dir_all(&self.dir).await?;

        let path = self.file(LOCK_FILE);
        let owner = LockOwner::current();

        match write_lock_file(&path, &owner).await {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                let holder: LockOwner = serde_json::from_str(&fs::read_to_string(&path).await?)?;
                let age = Utc::now().signed_duration_since(holder.since);
                if age.num_minutes() < STALE_LOCK_MINUTES {
                    return Err(StateError::Locked(format!(
                        "held by {} (pid {}) since {}",
                        holder.host, holder.pid, holder.since
                    )));
                }

                tracing::warn!(host = %holder.host, pid = holder.pid, "Replacing stale state lock");
                fs::remove_file(&path).await?;
                write_lock_file(&path, &owner).await?;
            }
            Err(e) => return Err(e.into()),
        }

        tracing::debug!(path = %path.display(), "Acquired state lock");
        Ok(StateLock { path: Some(path) })
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct LockOwner {
    host: String,
    pid: u32,
    since: DateTime<Utc>,
}

impl LockOwner {
    fn current() -> Self {
        Self {
            host: std::env::var("HOSTNAME")
                .or_else(|_| std::env::var("HOST"))
                .unwrap_or_else(|_| "localhost".to_string()),
            pid: std::process::id(),
            since: Utc::now(),
        }
    }
}

async fn write_lock_file(path: &Path, owner: &LockOwner) -> std::io::Result<()> {
    let mut file = fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .await?;
    file.write_all(&serde_json::to_vec(owner)?).await?;
    file.flush().await
}

/// Held for the duration of one harness run; removed on release or drop
pub struct StateLock {
    path: Option<PathBuf>,
}

impl StateLock {
    pub async fn release(mut self) -> StateResult<()> {
        if let Some(path) = self.path.take() {
            fs::remove_file(&path).await?;
            tracing::debug!("Released state lock");
        }
        Ok(())
    }
}

impl Drop for StateLock {
    fn drop(&mut self) {
        if let Some(path) = self.path.take() {
            let _ = std::fs::remove_file(path);
        }
    }
}
