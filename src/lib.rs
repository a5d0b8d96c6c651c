pub mod error;
pub mod io;
pub mod llm;
pub mod models;
pub mod stages;

pub use error::{PipelineError, PipelineResult};
pub use io::{
    FsSessionStore, FsTranscriptStore, HttpTranscriptService, MemorySessionStore,
    NoTranscriptService, RenderedReport, ReportConfig, ReportRenderer, SessionStore,
    TextReportRenderer, TranscriptService, TranscriptStore, save_captured_transcript,
};
pub use llm::{AnthropicClient, AnthropicConfig, CompletionClient};
pub use models::{
    CapturedMessage, ConversationTurn, DocumentationRecord, InterviewSession, Role, SessionId,
    SessionStatus, SummaryResult,
};
pub use stages::{
    DocumentationAssembler, Summarizer, SummarizerConfig, TranscriptResolver, TurnParser,
    parse_turns,
};
