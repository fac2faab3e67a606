//! HTTP client for the text-generation service.
//!
//! Endpoint and credentials come from [`EnrichmentConfig`]; nothing is
//! compiled in. Configuration is usually populated from environment
//! variables:
//! - `ROVER_ENDPOINT` - full URL of the generation endpoint
//! - `ROVER_API_TOKEN` - bearer token (optional)

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use thiserror::Error;

use super::retry::RetryPolicy;
use super::types::{build_messages, EnrichmentRequest, EnrichmentResponse, Message};
use super::Enricher;
use crate::config::EnrichmentConfig;
use crate::markdown::fence;

/// Enrichment errors.
#[derive(Debug, Error)]
pub enum EnrichError {
    #[error("Enrichment endpoint not configured: set ROVER_ENDPOINT or pass --no-enrich")]
    NotConfigured,

    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Service returned {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("Malformed response: {0}")]
    Json(#[from] serde_json::Error),
}

impl EnrichError {
    /// Whether a later attempt could succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Http(e) => e.is_timeout() || e.is_connect(),
            Self::Status { status, .. } => {
                *status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
            }
            Self::NotConfigured | Self::Read { .. } | Self::Write { .. } | Self::Json(_) => false,
        }
    }
}

/// Client for the enrichment service.
#[derive(Debug, Clone)]
pub struct EnrichmentClient {
    endpoint: String,
    api_token: Option<String>,
    system_prompt: String,
    diagram_tag: String,
    retry: RetryPolicy,
    client: Client,
}

impl EnrichmentClient {
    /// Create a client from configuration. Fails if no endpoint is set.
    pub fn from_config(config: &EnrichmentConfig) -> Result<Self, EnrichError> {
        let endpoint = config
            .endpoint
            .clone()
            .filter(|e| !e.trim().is_empty())
            .ok_or(EnrichError::NotConfigured)?;

        let client = Client::builder().timeout(config.timeout()).build()?;

        Ok(Self {
            endpoint,
            api_token: config.api_token.clone(),
            system_prompt: config.system_prompt.clone(),
            diagram_tag: config.diagram_tag.clone(),
            retry: RetryPolicy::from_config(config),
            client,
        })
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Send `messages` once and return the generated text.
    async fn request_once(&self, messages: &[Message]) -> Result<String, EnrichError> {
        let mut req = self
            .client
            .post(&self.endpoint)
            .json(&EnrichmentRequest { messages });
        if let Some(ref token) = self.api_token {
            req = req.bearer_auth(token);
        }

        let response = req.send().await?;
        let status = response.status();
        let body = response.text().await?;

        // Raw body, before any parsing.
        tracing::debug!("Enrichment response ({}): {}", status, body);

        if !status.is_success() {
            return Err(EnrichError::Status { status, body });
        }

        let parsed: EnrichmentResponse = serde_json::from_str(&body)?;
        Ok(parsed.result.response)
    }

    /// Send `messages`, retrying transient failures with backoff.
    pub async fn generate(&self, messages: &[Message]) -> Result<String, EnrichError> {
        let mut attempt = 0;
        loop {
            match self.request_once(messages).await {
                Ok(text) => return Ok(text),
                Err(e) if e.is_retryable() && attempt < self.retry.max_retries => {
                    let delay = self.retry.delay_for(attempt);
                    tracing::warn!(
                        "Enrichment attempt {} failed: {}; retrying in {:?}",
                        attempt + 1,
                        e,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[async_trait]
impl Enricher for EnrichmentClient {
    async fn enrich(&self, markdown_path: &Path, language: &str) -> Result<String, EnrichError> {
        let content = tokio::fs::read(markdown_path)
            .await
            .map_err(|source| EnrichError::Read {
                path: markdown_path.to_path_buf(),
                source,
            })?;

        let messages = build_messages(
            &self.system_prompt,
            language,
            &String::from_utf8_lossy(&content),
        );
        let diagram = self.generate(&messages).await?;
        tracing::info!("Generated diagram for {}", markdown_path.display());

        let mut updated = content;
        updated.push(b'\n');
        updated.extend_from_slice(&fence(&self.diagram_tag, diagram.as_bytes()));

        tokio::fs::write(markdown_path, updated)
            .await
            .map_err(|source| EnrichError::Write {
                path: markdown_path.to_path_buf(),
                source,
            })?;

        Ok(diagram)
    }
}
