//! End-to-end research run: search, scrape, summarize each source, synthesize.

use crate::client::{ChunkSummarizer, CohereClient};
use crate::config::Config;
use crate::scraper::{Scraper, ScraperError, WebContent};
use crate::search::{GoogleSearch, SearchError};
use crate::summarizer::Summarizer;
use crate::summary::{render, SummarizeError, SummaryResult};
use crate::synthesizer::{Report, Synthesizer};
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum ResearchError {
    #[error("please enter a topic")]
    EmptyTopic,
    #[error(transparent)]
    Summarize(#[from] SummarizeError),
    #[error(transparent)]
    Search(#[from] SearchError),
    #[error(transparent)]
    Scraper(#[from] ScraperError),
    #[error("no URLs found for: {0}")]
    NoResults(String),
}

/// Summary of one source page
#[derive(Debug, Clone)]
pub struct SourceSummary {
    pub url: String,
    pub summary: SummaryResult,
}

/// Everything a research run produced
#[derive(Debug, Clone)]
pub struct ResearchOutcome {
    pub sources: Vec<SourceSummary>,
    /// `None` when no source yielded any text
    pub report: Option<Report>,
}

/// One page fetched and summarized on its own
#[derive(Debug, Clone)]
pub struct PageSummary {
    pub content: WebContent,
    pub summary: SummaryResult,
}

/// Fetch `url` and summarize its text.
///
/// The summarizer credential is validated before the page is requested.
pub async fn summarise_page(config: &Config, url: &str) -> Result<PageSummary, ResearchError> {
    let client = CohereClient::new(config)?;
    let content = Scraper::new(&config.scraper)?.fetch_content(url).await?;
    let summary = Summarizer::from_config(client, &config.summarizer)
        .summarize(&content.text)
        .await;
    Ok(PageSummary { content, summary })
}

/// Progress events reported while a run is under way
#[derive(Debug, Clone)]
pub enum Progress<'a> {
    Searching { topic: &'a str },
    Scraping { index: usize, total: usize, url: &'a str },
    Skipped { index: usize, url: &'a str, reason: String },
    Summarizing { index: usize, total: usize },
    Synthesizing { sources: usize },
}

pub struct Research<S> {
    search: GoogleSearch,
    scraper: Scraper,
    synthesizer: Synthesizer<S>,
    pace: Duration,
}

impl Research<CohereClient> {
    /// Build the pipeline from configuration, validating all credentials up front
    pub fn new(config: &Config) -> Result<Self, ResearchError> {
        let client = CohereClient::new(config)?;
        let summarizer = Summarizer::from_config(client, &config.summarizer);
        Ok(Self::with_parts(
            GoogleSearch::new(config)?,
            Scraper::new(&config.scraper)?,
            Synthesizer::new(summarizer),
            Duration::from_millis(config.pipeline.pace_ms),
        ))
    }
}

impl<S: ChunkSummarizer> Research<S> {
    pub fn with_parts(
        search: GoogleSearch,
        scraper: Scraper,
        synthesizer: Synthesizer<S>,
        pace: Duration,
    ) -> Self {
        Self {
            search,
            scraper,
            synthesizer,
            pace,
        }
    }

    pub async fn run(
        &self,
        topic: &str,
        num_results: usize,
        mut on_progress: impl FnMut(Progress<'_>),
    ) -> Result<ResearchOutcome, ResearchError> {
        let topic = topic.trim();
        if topic.is_empty() {
            return Err(ResearchError::EmptyTopic);
        }

        on_progress(Progress::Searching { topic });
        let urls = self.search.search(topic, num_results).await?;
        if urls.is_empty() {
            return Err(ResearchError::NoResults(topic.to_string()));
        }

        let total = urls.len();
        let mut sources = Vec::new();
        for (i, url) in urls.iter().enumerate() {
            let index = i + 1;
            on_progress(Progress::Scraping { index, total, url });

            let content = match self.scraper.fetch_content(url).await {
                Ok(content) => content,
                Err(e) => {
                    warn!(url = %url, error = %e, "skipping source");
                    on_progress(Progress::Skipped {
                        index,
                        url,
                        reason: e.to_string(),
                    });
                    continue;
                }
            };

            on_progress(Progress::Summarizing { index, total });
            let summary = self.synthesizer.summarizer().summarize(&content.text).await;
            if let Err(e) = &summary {
                warn!(url = %url, error = %e, "source summary failed");
            }
            sources.push(SourceSummary {
                url: url.clone(),
                summary,
            });

            if index < total {
                tokio::time::sleep(self.pace).await;
            }
        }

        if sources.is_empty() {
            info!(topic, "no source produced any text");
            return Ok(ResearchOutcome {
                sources,
                report: None,
            });
        }

        on_progress(Progress::Synthesizing {
            sources: sources.len(),
        });
        let texts: Vec<String> = sources.iter().map(|s| render(&s.summary)).collect();
        let report = self.synthesizer.synthesize(&texts).await;

        Ok(ResearchOutcome {
            sources,
            report: Some(report),
        })
    }
}
