use thiserror::Error;

/// Failures that terminate a documentation request.
///
/// Missing transcript sources and model failures never show up here; they are
/// absorbed by the resolver and summarizer.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("invalid session id {0:?}")]
    InvalidSessionId(String),

    #[error("interview session not found: {0}")]
    SessionNotFound(String),

    #[error("persistence failure: {context}")]
    Persistence {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },
}

impl PipelineError {
    pub fn persistence(context: impl Into<String>, source: anyhow::Error) -> Self {
        Self::Persistence {
            context: context.into(),
            source: source.into(),
        }
    }
}

pub type PipelineResult<T> = std::result::Result<T, PipelineError>;
