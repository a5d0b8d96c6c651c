use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::debug;

use super::{read_optional, write_atomic};
use crate::models::{CapturedMessage, DocumentationRecord, SessionId, render_captured};

const TRANSCRIPT_PREFIX: &str = "transcript-";
const TRANSCRIPT_SUFFIX: &str = ".txt";
const RECORD_PREFIX: &str = "interview-";
const RECORD_SUFFIX: &str = ".json";

/// Durable per-session transcript text and documentation records.
///
/// Reads return `Ok(None)` when nothing is stored. Writes replace the whole
/// artifact.
#[async_trait]
pub trait TranscriptStore: Send + Sync {
    async fn read_transcript(&self, session_id: &SessionId) -> Result<Option<String>>;

    async fn write_transcript(&self, session_id: &SessionId, text: &str) -> Result<()>;

    async fn read_record(&self, session_id: &SessionId) -> Result<Option<DocumentationRecord>>;

    async fn write_record(&self, session_id: &SessionId, record: &DocumentationRecord)
    -> Result<()>;

    /// Remove a stored record. Returns whether one existed.
    async fn delete_record(&self, session_id: &SessionId) -> Result<bool>;

    /// Session ids that have a stored record, sorted
    async fn list_record_ids(&self) -> Result<Vec<SessionId>>;
}

/// Directory-backed store: `transcript-<id>.txt` and `interview-<id>.json`
#[derive(Debug, Clone)]
pub struct FsTranscriptStore {
    root: PathBuf,
}

impl FsTranscriptStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn transcript_path(&self, session_id: &SessionId) -> PathBuf {
        self.root
            .join(format!("{}{}{}", TRANSCRIPT_PREFIX, session_id, TRANSCRIPT_SUFFIX))
    }

    pub fn record_path(&self, session_id: &SessionId) -> PathBuf {
        self.root
            .join(format!("{}{}{}", RECORD_PREFIX, session_id, RECORD_SUFFIX))
    }
}

#[async_trait]
impl TranscriptStore for FsTranscriptStore {
    async fn read_transcript(&self, session_id: &SessionId) -> Result<Option<String>> {
        read_optional(&self.transcript_path(session_id)).await
    }

    async fn write_transcript(&self, session_id: &SessionId, text: &str) -> Result<()> {
        let path = self.transcript_path(session_id);
        debug!("Writing transcript ({} bytes) to {:?}", text.len(), path);
        write_atomic(&path, text.as_bytes()).await
    }

    async fn read_record(&self, session_id: &SessionId) -> Result<Option<DocumentationRecord>> {
        let path = self.record_path(session_id);
        let Some(content) = read_optional(&path).await? else {
            return Ok(None);
        };
        let record = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse documentation record: {:?}", path))?;
        Ok(Some(record))
    }

    async fn write_record(
        &self,
        session_id: &SessionId,
        record: &DocumentationRecord,
    ) -> Result<()> {
        let path = self.record_path(session_id);
        let json = serde_json::to_vec_pretty(record).context("Failed to serialize record")?;
        debug!("Writing documentation record to {:?}", path);
        write_atomic(&path, &json).await
    }

    async fn delete_record(&self, session_id: &SessionId) -> Result<bool> {
        let path = self.record_path(session_id);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                debug!("Removed documentation record {:?}", path);
                Ok(true)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e).with_context(|| format!("Failed to remove {:?}", path)),
        }
    }

    async fn list_record_ids(&self) -> Result<Vec<SessionId>> {
        let mut entries = match tokio::fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(vec![]),
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to list {:?}", self.root));
            }
        };

        let mut ids = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .with_context(|| format!("Failed to list {:?}", self.root))?
        {
            let name = entry.file_name();
            let name = name.to_string_lossy();
            let id = name
                .strip_prefix(RECORD_PREFIX)
                .and_then(|rest| rest.strip_suffix(RECORD_SUFFIX));
            if let Some(id) = id.and_then(|id| SessionId::parse(id).ok()) {
                ids.push(id);
            }
        }
        ids.sort();
        Ok(ids)
    }
}

/// Store the messages produced by live capture as the session's transcript.
/// Returns the rendered text.
pub async fn save_captured_transcript(
    store: &dyn TranscriptStore,
    session_id: &SessionId,
    messages: &[CapturedMessage],
) -> Result<String> {
    if messages.is_empty() {
        anyhow::bail!("No captured messages for session {}", session_id);
    }
    let text = render_captured(messages);
    store
        .write_transcript(session_id, &text)
        .await
        .with_context(|| format!("Failed to save transcript for session {}", session_id))?;
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ConversationTurn, RecordSummary, Role};
    use chrono::Utc;

    fn sample_record() -> DocumentationRecord {
        DocumentationRecord {
            candidate_name: "Linus Pauling".to_string(),
            position: "Chemist".to_string(),
            interview_date: Utc::now(),
            summary: RecordSummary::unavailable(),
            full_responses: vec![ConversationTurn::new(Role::Candidate, "Vitamin C")],
            transcript: "Candidate: Vitamin C".to_string(),
        }
    }

    #[tokio::test]
    async fn test_missing_artifacts_read_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsTranscriptStore::new(dir.path().join("interviews"));
        let id = SessionId::parse("s1").unwrap();

        assert!(store.read_transcript(&id).await.unwrap().is_none());
        assert!(store.read_record(&id).await.unwrap().is_none());
        assert!(store.list_record_ids().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_write_creates_directory_lazily() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("interviews");
        let store = FsTranscriptStore::new(&root);
        let id = SessionId::parse("s1").unwrap();

        assert!(!root.exists());
        store.write_transcript(&id, "Candidate: hi").await.unwrap();

        assert!(root.join("transcript-s1.txt").exists());
        assert_eq!(
            store.read_transcript(&id).await.unwrap().as_deref(),
            Some("Candidate: hi")
        );
    }

    #[tokio::test]
    async fn test_record_round_trip_and_listing() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsTranscriptStore::new(dir.path());
        let record = sample_record();

        for raw in ["b2", "a1"] {
            let id = SessionId::parse(raw).unwrap();
            store.write_record(&id, &record).await.unwrap();
        }
        store
            .write_transcript(&SessionId::parse("c3").unwrap(), "x")
            .await
            .unwrap();

        let loaded = store
            .read_record(&SessionId::parse("a1").unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(loaded, record);

        let ids: Vec<String> = store
            .list_record_ids()
            .await
            .unwrap()
            .into_iter()
            .map(String::from)
            .collect();
        assert_eq!(ids, vec!["a1", "b2"]);
    }

    #[tokio::test]
    async fn test_delete_record() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsTranscriptStore::new(dir.path());
        let id = SessionId::parse("gone").unwrap();
        store.write_record(&id, &sample_record()).await.unwrap();

        assert!(store.delete_record(&id).await.unwrap());
        assert!(store.read_record(&id).await.unwrap().is_none());
        assert!(!store.delete_record(&id).await.unwrap());
    }

    #[tokio::test]
    async fn test_save_captured_transcript() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsTranscriptStore::new(dir.path());
        let id = SessionId::parse("s9").unwrap();
        let messages: Vec<CapturedMessage> = serde_json::from_str(
            r#"[{"role": "persona", "content": "Why are you leaving?"},
                {"role": "user", "content": "New adventure."}]"#,
        )
        .unwrap();

        save_captured_transcript(&store, &id, &messages).await.unwrap();

        assert_eq!(
            store.read_transcript(&id).await.unwrap().as_deref(),
            Some("Interviewer: Why are you leaving?\n\nCandidate: New adventure.")
        );
        assert!(save_captured_transcript(&store, &id, &[]).await.is_err());
    }

    #[tokio::test]
    async fn test_corrupt_record_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsTranscriptStore::new(dir.path());
        let id = SessionId::parse("bad").unwrap();
        std::fs::write(store.record_path(&id), "{not json").unwrap();

        assert!(store.read_record(&id).await.is_err());
    }
}
