//! Summarization service client.
//!
//! Sends one bounded chunk to the summarize endpoint per call, retrying on
//! rate limiting and timeouts according to the configured [`RetryPolicy`].

use crate::config::{Config, RetryPolicy, SummarizerConfig};
use crate::summary::{SummarizeError, SummaryResult};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::future::Future;
use tracing::{debug, warn};

/// Anything that can summarize a single chunk of bounded size.
pub trait ChunkSummarizer {
    fn summarize_chunk(&self, chunk: &str) -> impl Future<Output = SummaryResult>;
}

#[derive(Debug, Serialize)]
struct SummarizeRequest<'a> {
    text: &'a str,
    length: &'a str,
    format: &'a str,
    model: &'a str,
    extractiveness: &'a str,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct SummarizeResponse {
    summary: Option<String>,
}

enum Attempt {
    Done(Option<String>),
    RateLimited,
}

/// Client for the Cohere summarize endpoint
pub struct CohereClient {
    http: Client,
    api_key: String,
    settings: SummarizerConfig,
}

impl CohereClient {
    /// Build a client from configuration.
    ///
    /// Fails with [`SummarizeError::MissingApiKey`] when no credential is
    /// configured, before anything touches the network.
    pub fn new(config: &Config) -> Result<Self, SummarizeError> {
        let api_key = config
            .api
            .cohere_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .ok_or(SummarizeError::MissingApiKey)?;

        let http = Client::builder()
            .timeout(config.summarizer.retry.request_timeout())
            .build()
            .map_err(|e| SummarizeError::Request(e.to_string()))?;

        Ok(Self {
            http,
            api_key,
            settings: config.summarizer.clone(),
        })
    }

    fn retry(&self) -> &RetryPolicy {
        &self.settings.retry
    }

    async fn attempt(&self, chunk: &str) -> Result<Attempt, reqwest::Error> {
        let request = SummarizeRequest {
            text: chunk,
            length: &self.settings.length,
            format: &self.settings.format,
            model: &self.settings.model,
            extractiveness: &self.settings.extractiveness,
            temperature: self.settings.temperature,
        };

        let response = self
            .http
            .post(&self.settings.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        if response.status() == StatusCode::TOO_MANY_REQUESTS {
            return Ok(Attempt::RateLimited);
        }

        let body: SummarizeResponse = response.error_for_status()?.json().await?;
        Ok(Attempt::Done(body.summary))
    }
}

impl ChunkSummarizer for CohereClient {
    async fn summarize_chunk(&self, chunk: &str) -> SummaryResult {
        let attempts = self.retry().attempts.max(1);

        for attempt in 0..attempts {
            let last = attempt + 1 == attempts;
            match self.attempt(chunk).await {
                Ok(Attempt::Done(summary)) => {
                    return summary
                        .filter(|s| !s.is_empty())
                        .ok_or(SummarizeError::NoSummary);
                }
                Ok(Attempt::RateLimited) => {
                    if last {
                        break;
                    }
                    let wait = self.retry().backoff(attempt);
                    warn!(
                        attempt = attempt + 1,
                        ?wait,
                        "rate limited by API, backing off"
                    );
                    tokio::time::sleep(wait).await;
                }
                Err(e) if e.is_timeout() => {
                    if last {
                        return Err(SummarizeError::TimedOut);
                    }
                    warn!(attempt = attempt + 1, "request timed out, retrying");
                    tokio::time::sleep(self.retry().timeout_delay()).await;
                }
                Err(e) => {
                    debug!(error = %e, "summarize request failed");
                    return Err(SummarizeError::Request(e.to_string()));
                }
            }
        }

        Err(SummarizeError::RateLimited { attempts })
    }
}
