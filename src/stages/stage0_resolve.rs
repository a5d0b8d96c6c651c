use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::error::{PipelineError, PipelineResult};
use crate::io::{TranscriptService, TranscriptStore};
use crate::models::{InterviewSession, SessionId, render_turns};

/// Where a resolved transcript came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranscriptSource {
    /// Transcript file already stored for the session
    Stored,
    /// External transcript service
    ExternalService,
    /// Rebuilt from the turn list of a stored documentation record
    RecordReconstruction,
    /// Nothing available
    Empty,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTranscript {
    pub text: String,
    pub source: TranscriptSource,
}

impl ResolvedTranscript {
    pub fn empty() -> Self {
        Self {
            text: String::new(),
            source: TranscriptSource::Empty,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// One step of the resolution cascade.
///
/// `Ok(None)` passes to the next strategy. Errors are logged and also pass.
#[async_trait]
pub trait ResolveStrategy: Send + Sync {
    fn source(&self) -> TranscriptSource;

    async fn attempt(
        &self,
        session_id: &SessionId,
        session: &InterviewSession,
    ) -> Result<Option<String>>;
}

/// A stored transcript wins even when blank, so a session never flips to a
/// lower-priority source once its transcript file exists.
pub struct StoredTranscript {
    store: Arc<dyn TranscriptStore>,
}

#[async_trait]
impl ResolveStrategy for StoredTranscript {
    fn source(&self) -> TranscriptSource {
        TranscriptSource::Stored
    }

    async fn attempt(
        &self,
        session_id: &SessionId,
        _session: &InterviewSession,
    ) -> Result<Option<String>> {
        self.store.read_transcript(session_id).await
    }
}

pub struct ExternalTranscript {
    service: Arc<dyn TranscriptService>,
}

#[async_trait]
impl ResolveStrategy for ExternalTranscript {
    fn source(&self) -> TranscriptSource {
        TranscriptSource::ExternalService
    }

    async fn attempt(
        &self,
        session_id: &SessionId,
        _session: &InterviewSession,
    ) -> Result<Option<String>> {
        let text = self.service.fetch(session_id).await?;
        Ok(text.filter(|t| !t.trim().is_empty()))
    }
}

pub struct RecordReconstruction {
    store: Arc<dyn TranscriptStore>,
}

#[async_trait]
impl ResolveStrategy for RecordReconstruction {
    fn source(&self) -> TranscriptSource {
        TranscriptSource::RecordReconstruction
    }

    async fn attempt(
        &self,
        session_id: &SessionId,
        session: &InterviewSession,
    ) -> Result<Option<String>> {
        let Some(record) = self.store.read_record(session_id).await? else {
            return Ok(None);
        };
        debug!(
            "Rebuilding transcript for {} ({}) from {} stored turns",
            session_id,
            session.candidate_name,
            record.full_responses.len()
        );
        let text = render_turns(&record.full_responses);
        Ok(Some(text).filter(|t| !t.trim().is_empty()))
    }
}

/// Counts from a transcript backfill run
#[derive(Debug, Default)]
pub struct BackfillReport {
    /// Records that end the run with a transcript, cached before or now.
    /// Records with nothing to build one from are not counted.
    pub processed: usize,
    /// Transcripts newly written
    pub generated: usize,
    /// Per-session failures; the run continues past them
    pub errors: Vec<(SessionId, String)>,
}

/// What backfill did for one record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BackfillOutcome {
    AlreadyCached,
    Generated,
    NothingToBuild,
}

/// Finds the best available transcript for a session.
///
/// Strategies run in order and the first one that yields text wins. Text that
/// did not come from the store is written back as the session's canonical
/// transcript before it is returned, so later resolutions are stable.
pub struct TranscriptResolver {
    store: Arc<dyn TranscriptStore>,
    strategies: Vec<Box<dyn ResolveStrategy>>,
}

impl TranscriptResolver {
    /// Stored transcript, then the external service, then record reconstruction
    pub fn new(store: Arc<dyn TranscriptStore>, service: Arc<dyn TranscriptService>) -> Self {
        let strategies: Vec<Box<dyn ResolveStrategy>> = vec![
            Box::new(StoredTranscript {
                store: store.clone(),
            }),
            Box::new(ExternalTranscript { service }),
            Box::new(RecordReconstruction {
                store: store.clone(),
            }),
        ];
        Self::with_strategies(store, strategies)
    }

    pub fn with_strategies(
        store: Arc<dyn TranscriptStore>,
        strategies: Vec<Box<dyn ResolveStrategy>>,
    ) -> Self {
        Self { store, strategies }
    }

    pub async fn resolve(
        &self,
        session_id: &SessionId,
        session: &InterviewSession,
    ) -> PipelineResult<ResolvedTranscript> {
        for strategy in &self.strategies {
            let source = strategy.source();
            let text = match strategy.attempt(session_id, session).await {
                Ok(Some(text)) => text,
                Ok(None) => {
                    debug!("Session {}: no transcript from {:?}", session_id, source);
                    continue;
                }
                Err(e) => {
                    warn!(
                        "Session {}: transcript source {:?} unavailable: {:#}",
                        session_id, source, e
                    );
                    continue;
                }
            };

            if source != TranscriptSource::Stored && !text.trim().is_empty() {
                self.store
                    .write_transcript(session_id, &text)
                    .await
                    .map_err(|e| {
                        PipelineError::persistence(
                            format!("caching transcript for session {}", session_id),
                            e,
                        )
                    })?;
            }

            info!(
                "Session {}: resolved transcript from {:?} ({} chars)",
                session_id,
                source,
                text.len()
            );
            return Ok(ResolvedTranscript { text, source });
        }

        info!("Session {}: no transcript available from any source", session_id);
        Ok(ResolvedTranscript::empty())
    }

    /// Cache a transcript for every stored record that lacks one
    pub async fn backfill_transcripts(&self) -> PipelineResult<BackfillReport> {
        let ids = self
            .store
            .list_record_ids()
            .await
            .map_err(|e| PipelineError::persistence("listing documentation records", e))?;

        let mut report = BackfillReport::default();

        for session_id in ids {
            match self.backfill_one(&session_id).await {
                Ok(BackfillOutcome::AlreadyCached) => report.processed += 1,
                Ok(BackfillOutcome::Generated) => {
                    report.processed += 1;
                    report.generated += 1;
                }
                Ok(BackfillOutcome::NothingToBuild) => {
                    debug!("Session {}: no transcript data to backfill", session_id);
                }
                Err(e) => {
                    warn!("Backfill of session {} failed: {:#}", session_id, e);
                    report.errors.push((session_id, format!("{:#}", e)));
                }
            }
        }

        info!(
            "Backfill: processed {} sessions, generated {} transcripts, {} errors",
            report.processed,
            report.generated,
            report.errors.len()
        );
        Ok(report)
    }

    async fn backfill_one(&self, session_id: &SessionId) -> Result<BackfillOutcome> {
        if self.store.read_transcript(session_id).await?.is_some() {
            return Ok(BackfillOutcome::AlreadyCached);
        }
        let Some(record) = self.store.read_record(session_id).await? else {
            return Ok(BackfillOutcome::NothingToBuild);
        };

        let session = record.to_session(session_id.clone());
        let resolved = self.resolve(session_id, &session).await?;
        Ok(if resolved.is_empty() {
            BackfillOutcome::NothingToBuild
        } else {
            BackfillOutcome::Generated
        })
    }
}
