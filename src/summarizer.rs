//! Recursive summarization of arbitrarily long documents.
//!
//! A document is chunked, each chunk is summarized in order, and the chunk
//! summaries are joined and summarized again until a single summary remains
//! or the depth ceiling is reached.

use crate::chunker::{chunk_text, DEFAULT_MAX_LEN};
use crate::client::ChunkSummarizer;
use crate::config::SummarizerConfig;
use crate::summary::{render, SummarizeError, SummaryResult};
use tracing::{info, warn};

pub struct Summarizer<S> {
    client: S,
    max_chunk_len: usize,
    max_depth: usize,
}

impl<S: ChunkSummarizer> Summarizer<S> {
    /// Create a summarizer with the default chunk bound and a depth ceiling of 2
    pub fn new(client: S) -> Self {
        Self {
            client,
            max_chunk_len: DEFAULT_MAX_LEN,
            max_depth: 2,
        }
    }

    pub fn from_config(client: S, config: &SummarizerConfig) -> Self {
        Self::new(client)
            .with_max_chunk_len(config.max_chunk_len)
            .with_max_depth(config.max_depth)
    }

    pub fn with_max_chunk_len(mut self, max_chunk_len: usize) -> Self {
        self.max_chunk_len = max_chunk_len;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn client(&self) -> &S {
        &self.client
    }

    /// Summarize a whole document.
    ///
    /// Chunk-local failures are carried inline as their marker text and may be
    /// folded into the next pass. Fatal failures abort the call. At most
    /// `max_depth + 1` passes are made; past the ceiling the chunk summaries
    /// are returned newline-joined.
    pub async fn summarize(&self, text: &str) -> SummaryResult {
        let mut document = text.to_string();
        let mut depth = 0;

        loop {
            let chunks = chunk_text(&document, self.max_chunk_len);
            let total = chunks.len();
            let mut results: Vec<SummaryResult> = Vec::with_capacity(total);

            for (index, chunk) in chunks.iter().enumerate() {
                info!(depth, "summarizing chunk {}/{}", index + 1, total);
                let result = self.client.summarize_chunk(chunk).await;
                if let Err(e) = &result {
                    if e.is_fatal() {
                        return result;
                    }
                    warn!(depth, chunk = index + 1, error = %e, "chunk summary failed");
                }
                results.push(result);
            }

            match results.len() {
                0 => return Err(SummarizeError::NoText),
                1 => return results.remove(0),
                _ => {}
            }

            let combined = results.iter().map(render).collect::<Vec<_>>().join("\n");
            if depth >= self.max_depth {
                info!(depth, "recursion ceiling reached, returning combined chunk summaries");
                return Ok(combined);
            }

            depth += 1;
            info!(depth, "summarizing combined chunk summaries");
            document = combined;
        }
    }
}
