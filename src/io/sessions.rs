use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{read_optional, write_atomic};
use crate::models::{InterviewSession, SessionId};

/// Lookup of interview metadata, injected into the assembler
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn read_session(&self, session_id: &SessionId) -> Result<Option<InterviewSession>>;

    async fn write_session(&self, session: &InterviewSession) -> Result<()>;

    /// Returns whether a session was removed
    async fn delete_session(&self, session_id: &SessionId) -> Result<bool>;
}

/// Process-local sessions, dropped with the store
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    sessions: RwLock<HashMap<SessionId, InterviewSession>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn read_session(&self, session_id: &SessionId) -> Result<Option<InterviewSession>> {
        Ok(self.sessions.read().await.get(session_id).cloned())
    }

    async fn write_session(&self, session: &InterviewSession) -> Result<()> {
        self.sessions
            .write()
            .await
            .insert(session.session_id.clone(), session.clone());
        Ok(())
    }

    async fn delete_session(&self, session_id: &SessionId) -> Result<bool> {
        Ok(self.sessions.write().await.remove(session_id).is_some())
    }
}

/// One JSON file per session under `<root>/sessions/`
#[derive(Debug, Clone)]
pub struct FsSessionStore {
    root: PathBuf,
}

impl FsSessionStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            root: data_dir.into().join("sessions"),
        }
    }

    fn path(&self, session_id: &SessionId) -> PathBuf {
        self.root.join(format!("{}.json", session_id))
    }
}

#[async_trait]
impl SessionStore for FsSessionStore {
    async fn read_session(&self, session_id: &SessionId) -> Result<Option<InterviewSession>> {
        let path = self.path(session_id);
        let Some(content) = read_optional(&path).await? else {
            return Ok(None);
        };
        let session = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse session file: {:?}", path))?;
        Ok(Some(session))
    }

    async fn write_session(&self, session: &InterviewSession) -> Result<()> {
        let json = serde_json::to_vec_pretty(session).context("Failed to serialize session")?;
        write_atomic(&self.path(&session.session_id), &json).await
    }

    async fn delete_session(&self, session_id: &SessionId) -> Result<bool> {
        let path = self.path(session_id);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e).with_context(|| format!("Failed to delete {:?}", path)),
        }
    }
}
