//! # Research Assistant
//!
//! Search the web for a topic, scrape the result pages, summarise each page
//! through a remote summarization service and synthesise a combined report.
//!
//! ## Features
//!
//! - **Bounded chunking**: long pages are split at word or line boundaries
//! - **Recursive summarization**: chunk summaries are re-summarized up to a depth ceiling
//! - **Retry policy**: exponential backoff on rate limiting, fixed delay on timeouts
//! - **Synthesis**: keyword tagging of pros, cons and contradictions across sources

pub mod chunker;
pub mod client;
pub mod config;
pub mod research;
pub mod scraper;
pub mod search;
pub mod summarizer;
pub mod summary;
pub mod synthesizer;

pub use client::{ChunkSummarizer, CohereClient};
pub use config::Config;
pub use summarizer::Summarizer;
pub use summary::{SummarizeError, SummaryResult};
pub use synthesizer::{Report, Synthesizer};

/// Install a stderr `tracing` subscriber filtered by `RUST_LOG` (default `info`).
///
/// Calling it more than once is harmless; later calls are ignored.
pub fn setup_logging() {
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();
}
