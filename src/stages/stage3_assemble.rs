use std::path::PathBuf;
use std::sync::Arc;

use tracing::{info, warn};

use super::{
    ResolvedTranscript, Summarizer, SummarySource, TranscriptResolver, TranscriptSource,
    TurnParser,
};
use crate::error::{PipelineError, PipelineResult};
use crate::io::{ReportRenderer, SessionStore, TranscriptService, TranscriptStore};
use crate::models::{DocumentationRecord, InterviewSession, RecordSummary, SessionId};

/// Everything produced by one documentation request
#[derive(Debug)]
pub struct Documentation {
    pub record: DocumentationRecord,
    pub report_path: PathBuf,
    pub transcript_source: TranscriptSource,
    /// `None` when there was no transcript to summarize
    pub summary_source: Option<SummarySource>,
}

/// Turns a finished interview into a persisted documentation record and report
pub struct DocumentationAssembler {
    sessions: Arc<dyn SessionStore>,
    store: Arc<dyn TranscriptStore>,
    resolver: TranscriptResolver,
    parser: TurnParser,
    summarizer: Summarizer,
    renderer: Arc<dyn ReportRenderer>,
}

impl DocumentationAssembler {
    pub fn new(
        sessions: Arc<dyn SessionStore>,
        store: Arc<dyn TranscriptStore>,
        service: Arc<dyn TranscriptService>,
        summarizer: Summarizer,
        renderer: Arc<dyn ReportRenderer>,
    ) -> Self {
        Self {
            resolver: TranscriptResolver::new(store.clone(), service),
            parser: TurnParser::default(),
            sessions,
            store,
            summarizer,
            renderer,
        }
    }

    pub fn with_parser(mut self, parser: TurnParser) -> Self {
        self.parser = parser;
        self
    }

    /// Build, persist and render the documentation record for a session
    pub async fn assemble(&self, session_id: &SessionId) -> PipelineResult<DocumentationRecord> {
        Ok(self.generate(session_id).await?.record)
    }

    /// Like [`assemble`](Self::assemble), also reporting where the pieces came from
    pub async fn generate(&self, session_id: &SessionId) -> PipelineResult<Documentation> {
        let session = self.locate_session(session_id).await?;
        info!(
            "Generating documentation for {} ({}), session {}",
            session.candidate_name, session.position, session_id
        );

        let resolved = self.resolver.resolve(session_id, &session).await?;
        let transcript_source = resolved.source;
        let (record, summary_source) = self.build_record(&session, resolved).await;

        // Lay the report out before anything is written
        let report = self.renderer.format(session_id, &record);
        let prior = match self.store.read_record(session_id).await {
            Ok(prior) => prior,
            Err(e) => {
                warn!("Prior record for {} unreadable: {:#}", session_id, e);
                None
            }
        };

        self.store
            .write_record(session_id, &record)
            .await
            .map_err(|e| {
                PipelineError::persistence(
                    format!("writing documentation record for session {}", session_id),
                    e,
                )
            })?;

        if let Err(e) = self.renderer.write(&report).await {
            self.roll_back_record(session_id, prior).await;
            return Err(PipelineError::persistence(
                format!("writing report for session {}", session_id),
                e,
            ));
        }
        let report_path = report.path;

        info!(
            "Documentation for session {} complete: {} responses",
            session_id, record.summary.total_responses
        );

        Ok(Documentation {
            record,
            report_path,
            transcript_source,
            summary_source,
        })
    }

    /// Put the record store back the way it was before a failed generate
    async fn roll_back_record(&self, session_id: &SessionId, prior: Option<DocumentationRecord>) {
        let restored = match &prior {
            Some(record) => self.store.write_record(session_id, record).await,
            None => self.store.delete_record(session_id).await.map(|_| ()),
        };
        match restored {
            Ok(()) => info!("Rolled back documentation record for session {}", session_id),
            Err(e) => warn!(
                "Could not roll back documentation record for session {}: {:#}",
                session_id, e
            ),
        }
    }

    /// Live session metadata first, then a previously written record
    async fn locate_session(&self, session_id: &SessionId) -> PipelineResult<InterviewSession> {
        let live = self
            .sessions
            .read_session(session_id)
            .await
            .map_err(|e| {
                PipelineError::persistence(format!("reading session {}", session_id), e)
            })?;
        if let Some(session) = live {
            return Ok(session);
        }

        match self.store.read_record(session_id).await {
            Ok(Some(record)) => {
                info!("Session {} not live, using stored record metadata", session_id);
                Ok(record.to_session(session_id.clone()))
            }
            Ok(None) => Err(PipelineError::SessionNotFound(session_id.to_string())),
            Err(e) => {
                warn!("Stored record for {} unreadable: {:#}", session_id, e);
                Err(PipelineError::SessionNotFound(session_id.to_string()))
            }
        }
    }

    async fn build_record(
        &self,
        session: &InterviewSession,
        resolved: ResolvedTranscript,
    ) -> (DocumentationRecord, Option<SummarySource>) {
        let (turns, summary, summary_source) = if resolved.is_empty() {
            info!("No transcript content; analysis unavailable");
            (vec![], RecordSummary::unavailable(), None)
        } else {
            let turns = self.parser.parse(&resolved.text);
            let outcome = self
                .summarizer
                .summarize_detailed(&resolved.text, &session.candidate_name, &session.position)
                .await;
            let summary = RecordSummary::from_analysis(turns.len(), outcome.summary);
            (turns, summary, Some(outcome.source))
        };

        let record = DocumentationRecord {
            candidate_name: session.candidate_name.clone(),
            position: session.position.clone(),
            interview_date: session.start_time,
            summary,
            full_responses: turns,
            transcript: resolved.text,
        };
        (record, summary_source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::{
        FsTranscriptStore, MemorySessionStore, NoTranscriptService, RenderedReport, ReportConfig,
        TextReportRenderer,
    };
    use crate::llm::CompletionClient;
    use crate::models::{Role, SummaryResult};
    use crate::stages::SummarizerConfig;
    use anyhow::Result;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const MODEL_REPLY: &str = r#"Analysis follows: {"keyPoints": "Built the deploy pipeline", "knowledgeTransfer": "Pipeline config lives in infra repo", "documentationGaps": "Secrets rotation", "successorRecommendations": "Read the runbook", "organizationalValue": "Critical"}"#;

    struct CountingClient {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl CompletionClient for CountingClient {
        async fn complete(&self, _system: &str, _user: &str) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(MODEL_REPLY.to_string())
        }

        fn model_name(&self) -> &str {
            "counting"
        }
    }

    /// Fails every record write; everything else goes to the wrapped store
    struct ReadOnlyRecords(FsTranscriptStore);

    #[async_trait]
    impl TranscriptStore for ReadOnlyRecords {
        async fn read_transcript(&self, id: &SessionId) -> Result<Option<String>> {
            self.0.read_transcript(id).await
        }

        async fn write_transcript(&self, id: &SessionId, text: &str) -> Result<()> {
            self.0.write_transcript(id, text).await
        }

        async fn read_record(&self, id: &SessionId) -> Result<Option<DocumentationRecord>> {
            self.0.read_record(id).await
        }

        async fn write_record(&self, _id: &SessionId, _record: &DocumentationRecord) -> Result<()> {
            anyhow::bail!("read-only file system")
        }

        async fn delete_record(&self, id: &SessionId) -> Result<bool> {
            self.0.delete_record(id).await
        }

        async fn list_record_ids(&self) -> Result<Vec<SessionId>> {
            self.0.list_record_ids().await
        }
    }

    /// Lays reports out normally but cannot write them
    struct FullDiskRenderer(TextReportRenderer);

    #[async_trait]
    impl ReportRenderer for FullDiskRenderer {
        fn format(&self, id: &SessionId, record: &DocumentationRecord) -> RenderedReport {
            self.0.format(id, record)
        }

        async fn write(&self, _report: &RenderedReport) -> Result<()> {
            anyhow::bail!("disk full")
        }
    }

    struct Harness {
        dir: tempfile::TempDir,
        sessions: Arc<MemorySessionStore>,
        store: Arc<FsTranscriptStore>,
        client: Arc<CountingClient>,
    }

    impl Harness {
        fn new() -> Self {
            let dir = tempfile::tempdir().unwrap();
            let store = Arc::new(FsTranscriptStore::new(dir.path().join("interviews")));
            Self {
                dir,
                sessions: Arc::new(MemorySessionStore::new()),
                store,
                client: Arc::new(CountingClient {
                    calls: AtomicUsize::new(0),
                }),
            }
        }

        fn text_renderer(&self) -> TextReportRenderer {
            TextReportRenderer::new(self.dir.path().join("interviews"), ReportConfig::default())
        }

        fn assembler_with(
            &self,
            store: Arc<dyn TranscriptStore>,
            renderer: Arc<dyn ReportRenderer>,
        ) -> DocumentationAssembler {
            DocumentationAssembler::new(
                self.sessions.clone(),
                store,
                Arc::new(NoTranscriptService),
                Summarizer::new(self.client.clone(), SummarizerConfig::default()),
                renderer,
            )
        }

        fn assembler_with_store(&self, store: Arc<dyn TranscriptStore>) -> DocumentationAssembler {
            self.assembler_with(store, Arc::new(self.text_renderer()))
        }

        fn assembler_with_failing_report(&self) -> DocumentationAssembler {
            self.assembler_with(
                self.store.clone(),
                Arc::new(FullDiskRenderer(self.text_renderer())),
            )
        }

        fn assembler(&self) -> DocumentationAssembler {
            self.assembler_with_store(self.store.clone())
        }

        async fn start(&self) -> InterviewSession {
            let session = InterviewSession::start("Margaret Hamilton", "Flight Software Lead");
            self.sessions.write_session(&session).await.unwrap();
            session
        }

        fn model_calls(&self) -> usize {
            self.client.calls.load(Ordering::SeqCst)
        }
    }

    #[tokio::test]
    async fn test_end_to_end_with_stored_transcript() {
        let harness = Harness::new();
        let session = harness.start().await;
        let id = session.session_id.clone();
        let transcript =
            "Candidate: I built the deploy pipeline.\n\nInterviewer: What should a successor know?";
        harness.store.write_transcript(&id, transcript).await.unwrap();

        let docs = harness.assembler().generate(&id).await.unwrap();
        let record = &docs.record;

        assert_eq!(record.summary.total_responses, 2);
        assert_eq!(record.full_responses.len(), 2);
        assert_eq!(record.full_responses[0].role, Role::Candidate);
        assert_eq!(record.full_responses[1].role, Role::Interviewer);
        assert_eq!(record.summary.key_points, "Built the deploy pipeline");
        assert_eq!(record.interview_date, session.start_time);
        assert_eq!(docs.transcript_source, TranscriptSource::Stored);
        assert_eq!(docs.summary_source, Some(SummarySource::Model));
        assert_eq!(harness.model_calls(), 1);

        let persisted = harness.store.read_record(&id).await.unwrap().unwrap();
        assert_eq!(persisted.transcript, transcript);
        assert_eq!(&persisted, record);

        let report = std::fs::read_to_string(&docs.report_path).unwrap();
        assert!(docs.report_path.ends_with(format!("interview_Margaret_Hamilton_{}.txt", id)));
        assert!(report.contains("1. Candidate: I built the deploy pipeline."));
    }

    #[tokio::test]
    async fn test_no_transcript_anywhere_is_degraded_not_failed() {
        let harness = Harness::new();
        let session = harness.start().await;

        let record = harness.assembler().assemble(&session.session_id).await.unwrap();

        assert_eq!(record.summary.total_responses, 0);
        assert!(record.full_responses.is_empty());
        assert!(record.transcript.is_empty());
        assert_eq!(record.summary, RecordSummary::unavailable());
        assert_eq!(harness.model_calls(), 0);
        assert!(harness.store.read_record(&session.session_id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_unknown_session_writes_nothing() {
        let harness = Harness::new();
        let id = SessionId::parse("does-not-exist").unwrap();

        let err = harness.assembler().assemble(&id).await.unwrap_err();

        assert!(matches!(err, PipelineError::SessionNotFound(ref s) if s == "does-not-exist"));
        assert!(!harness.dir.path().join("interviews").exists());
        assert_eq!(harness.model_calls(), 0);
    }

    #[tokio::test]
    async fn test_regenerates_from_prior_record() {
        let harness = Harness::new();
        let session = harness.start().await;
        let id = session.session_id.clone();
        harness
            .store
            .write_transcript(&id, "Interviewer: Hi\nCandidate: Hello")
            .await
            .unwrap();
        let first = harness.assembler().assemble(&id).await.unwrap();

        // Orchestration state is gone, and so is the transcript file
        harness.sessions.delete_session(&id).await.unwrap();
        std::fs::remove_file(harness.store.transcript_path(&id)).unwrap();

        let docs = harness.assembler().generate(&id).await.unwrap();

        assert_eq!(docs.transcript_source, TranscriptSource::RecordReconstruction);
        assert_eq!(docs.record.candidate_name, first.candidate_name);
        assert_eq!(docs.record.interview_date, first.interview_date);
        assert_eq!(docs.record.full_responses, first.full_responses);
        assert_eq!(
            harness.store.read_transcript(&id).await.unwrap().as_deref(),
            Some("Interviewer: Hi\n\nCandidate: Hello")
        );
    }

    #[tokio::test]
    async fn test_unparseable_transcript_still_summarized() {
        let harness = Harness::new();
        let session = harness.start().await;
        let id = session.session_id.clone();
        harness
            .store
            .write_transcript(&id, "free-form notes without speaker labels")
            .await
            .unwrap();

        let record = harness.assembler().assemble(&id).await.unwrap();

        assert_eq!(record.summary.total_responses, 0);
        assert!(record.full_responses.is_empty());
        assert_eq!(harness.model_calls(), 1);
        assert_ne!(record.summary.key_points, SummaryResult::fallback().key_points);
    }

    #[tokio::test]
    async fn test_record_write_failure_is_fatal() {
        let harness = Harness::new();
        let session = harness.start().await;
        let id = session.session_id.clone();
        harness
            .store
            .write_transcript(&id, "Interviewer: Hi\nCandidate: Hello")
            .await
            .unwrap();
        let failing = Arc::new(ReadOnlyRecords(FsTranscriptStore::new(
            harness.dir.path().join("interviews"),
        )));

        let err = harness
            .assembler_with_store(failing)
            .assemble(&id)
            .await
            .unwrap_err();

        assert!(matches!(err, PipelineError::Persistence { .. }));
        let report = harness
            .dir
            .path()
            .join("interviews")
            .join(format!("interview_Margaret_Hamilton_{}.txt", id));
        assert!(!report.exists());
    }

    #[tokio::test]
    async fn test_report_write_failure_leaves_no_record() {
        let harness = Harness::new();
        let session = harness.start().await;
        let id = session.session_id.clone();
        harness
            .store
            .write_transcript(&id, "Interviewer: Hi\nCandidate: Hello")
            .await
            .unwrap();

        let err = harness
            .assembler_with_failing_report()
            .assemble(&id)
            .await
            .unwrap_err();

        assert!(matches!(err, PipelineError::Persistence { .. }));
        assert!(harness.store.read_record(&id).await.unwrap().is_none());
        assert!(!harness.store.record_path(&id).exists());
    }

    #[tokio::test]
    async fn test_report_write_failure_restores_prior_record() {
        let harness = Harness::new();
        let session = harness.start().await;
        let id = session.session_id.clone();
        harness
            .store
            .write_transcript(&id, "Interviewer: Hi\nCandidate: Hello")
            .await
            .unwrap();
        let first = harness.assembler().assemble(&id).await.unwrap();

        let longer = "Interviewer: One more?\nCandidate: The pager rota.\nInterviewer: Thanks";
        harness.store.write_transcript(&id, longer).await.unwrap();
        let err = harness
            .assembler_with_failing_report()
            .assemble(&id)
            .await
            .unwrap_err();

        assert!(matches!(err, PipelineError::Persistence { .. }));
        let persisted = harness.store.read_record(&id).await.unwrap().unwrap();
        assert_eq!(persisted, first);
        assert_eq!(persisted.summary.total_responses, 2);
    }
}
