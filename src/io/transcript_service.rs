use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::debug;

use crate::models::SessionId;

/// Optional external source of transcripts.
///
/// `Ok(None)` means the service has nothing for this session, which is normal.
#[async_trait]
pub trait TranscriptService: Send + Sync {
    async fn fetch(&self, session_id: &SessionId) -> Result<Option<String>>;
}

/// Used when no external service is configured
#[derive(Debug, Clone, Copy, Default)]
pub struct NoTranscriptService;

#[async_trait]
impl TranscriptService for NoTranscriptService {
    async fn fetch(&self, _session_id: &SessionId) -> Result<Option<String>> {
        Ok(None)
    }
}

/// Fetches `GET <base_url>/sessions/<id>/transcript` as plain text.
/// 404 and empty bodies are reported as unavailable. Every request is bounded
/// by `timeout`, so a stalled service surfaces as an error.
pub struct HttpTranscriptService {
    client: Client,
    base_url: String,
}

impl HttpTranscriptService {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build transcript service client")?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, session_id: &SessionId) -> String {
        format!("{}/sessions/{}/transcript", self.base_url, session_id)
    }
}

#[async_trait]
impl TranscriptService for HttpTranscriptService {
    async fn fetch(&self, session_id: &SessionId) -> Result<Option<String>> {
        let url = self.url(session_id);
        debug!("Fetching transcript from {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .context("Failed to reach transcript service")?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            anyhow::bail!("Transcript service error: {}", response.status());
        }

        let body = response
            .text()
            .await
            .context("Failed to read transcript service response")?;
        Ok(Some(body).filter(|text| !text.trim().is_empty()))
    }
}
