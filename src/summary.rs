//! Summary results - the outcome of every summarization call.
//!
//! A failure renders as a bracketed, human-readable marker through `Display`,
//! which is the form used when a failure is folded into text.

use thiserror::Error;

/// Outcome of summarizing a chunk or a whole document
pub type SummaryResult = Result<String, SummarizeError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SummarizeError {
    #[error("[Error: Missing COHERE_API_KEY]")]
    MissingApiKey,
    #[error("[Summarization error]: Exceeded retries due to rate limiting.")]
    RateLimited { attempts: u32 },
    #[error("[Summarization error]: Request timed out.")]
    TimedOut,
    #[error("[Summarization error]: {0}")]
    Request(String),
    #[error("[Error: No summary returned]")]
    NoSummary,
    #[error("[No text to summarize]")]
    NoText,
}

impl SummarizeError {
    /// Whether this failure aborts the whole summarize call.
    ///
    /// Non-fatal failures stay local to their chunk and are carried inline.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::MissingApiKey | Self::RateLimited { .. })
    }
}

/// Render a result as text, using the failure marker in place of a summary.
pub fn render(result: &SummaryResult) -> String {
    match result {
        Ok(summary) => summary.clone(),
        Err(e) => e.to_string(),
    }
}
