use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::llm::{
    CompletionClient, ParseFailureKind, SYSTEM_PROMPT, SummaryParse, build_summary_prompt,
    parse_summary,
};
use crate::models::SummaryResult;

/// Configuration for the summarization stage
#[derive(Debug, Clone)]
pub struct SummarizerConfig {
    /// Upper bound on the model round trip; expiry falls back like any failure
    pub timeout: Duration,
}

impl Default for SummarizerConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(60),
        }
    }
}

/// Why the canned summary was used
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FallbackReason {
    EmptyTranscript,
    NotConfigured,
    Timeout,
    Transport(String),
    Unparseable(ParseFailureKind),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SummarySource {
    Model,
    Fallback(FallbackReason),
}

#[derive(Debug, Clone)]
pub struct SummaryOutcome {
    pub summary: SummaryResult,
    pub source: SummarySource,
}

impl SummaryOutcome {
    fn fallback(reason: FallbackReason) -> Self {
        Self {
            summary: SummaryResult::fallback(),
            source: SummarySource::Fallback(reason),
        }
    }
}

/// Pick the summary to use from an interpreted model reply
pub fn select_summary(parse: SummaryParse) -> SummaryOutcome {
    match parse {
        SummaryParse::Parsed(summary) => SummaryOutcome {
            summary,
            source: SummarySource::Model,
        },
        SummaryParse::Raw { text, reason } => {
            warn!("Model reply unusable ({}), using fallback summary", reason);
            debug!("Unusable model reply: {}", text);
            SummaryOutcome::fallback(FallbackReason::Unparseable(reason))
        }
    }
}

/// Knowledge transfer analysis backed by a language model.
///
/// Makes at most one model call per transcript. Every failure path returns
/// the fallback summary instead of an error.
pub struct Summarizer {
    client: Option<Arc<dyn CompletionClient>>,
    config: SummarizerConfig,
}

impl Summarizer {
    pub fn new(client: Arc<dyn CompletionClient>, config: SummarizerConfig) -> Self {
        Self {
            client: Some(client),
            config,
        }
    }

    /// A summarizer with no model; always returns the fallback
    pub fn unconfigured(config: SummarizerConfig) -> Self {
        Self {
            client: None,
            config,
        }
    }

    pub async fn summarize(
        &self,
        transcript: &str,
        candidate_name: &str,
        position: &str,
    ) -> SummaryResult {
        self.summarize_detailed(transcript, candidate_name, position)
            .await
            .summary
    }

    pub async fn summarize_detailed(
        &self,
        transcript: &str,
        candidate_name: &str,
        position: &str,
    ) -> SummaryOutcome {
        if transcript.trim().is_empty() {
            return SummaryOutcome::fallback(FallbackReason::EmptyTranscript);
        }
        let Some(client) = &self.client else {
            warn!("No language model configured, using fallback summary");
            return SummaryOutcome::fallback(FallbackReason::NotConfigured);
        };

        let prompt = build_summary_prompt(transcript, candidate_name, position);
        info!(
            "Requesting knowledge transfer analysis from {} ({} chars of transcript)",
            client.model_name(),
            transcript.len()
        );

        let reply = match tokio::time::timeout(
            self.config.timeout,
            client.complete(SYSTEM_PROMPT, &prompt),
        )
        .await
        {
            Ok(Ok(reply)) => reply,
            Ok(Err(e)) => {
                warn!("Model request failed: {:#}", e);
                return SummaryOutcome::fallback(FallbackReason::Transport(format!("{:#}", e)));
            }
            Err(_) => {
                warn!(
                    "Model request timed out after {:?}, using fallback summary",
                    self.config.timeout
                );
                return SummaryOutcome::fallback(FallbackReason::Timeout);
            }
        };

        select_summary(parse_summary(&reply))
    }
}
