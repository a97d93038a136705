//! Web scraping module for content extraction.
//!
//! Uses reqwest for fetching and scraper for HTML parsing.

use crate::config::ScraperConfig;
use reqwest::{Client, StatusCode};
use scraper::{ElementRef, Html, Node, Selector};
use std::time::Duration;
use thiserror::Error;
use tracing::warn;

/// Browser-like User-Agent; many sites refuse obvious bots outright
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64)";

#[derive(Error, Debug)]
pub enum ScraperError {
    #[error("failed to fetch URL: {0}")]
    FetchError(#[from] reqwest::Error),
    #[error("access forbidden (403); the site may block scraping")]
    Forbidden,
    #[error("HTTP error {0}")]
    Status(StatusCode),
    #[error("timed out after {0} attempts")]
    TimedOut(u32),
    #[error("no content found at URL")]
    NoContent,
}

/// Extracted content from a webpage
#[derive(Debug, Clone)]
pub struct WebContent {
    /// The original URL
    pub url: String,
    /// Page title
    pub title: Option<String>,
    /// Main text content
    pub text: String,
}

/// Page fetcher with retry on timeout
pub struct Scraper {
    client: Client,
    attempts: u32,
    retry_delay: Duration,
    max_chars: usize,
}

impl Scraper {
    pub fn new(config: &ScraperConfig) -> Result<Self, ScraperError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()?;

        Ok(Self {
            client,
            attempts: config.attempts.max(1),
            retry_delay: Duration::from_millis(config.retry_delay_ms),
            max_chars: config.max_chars,
        })
    }

    /// Fetch and extract content from a URL
    pub async fn fetch_content(&self, url: &str) -> Result<WebContent, ScraperError> {
        let html = self.fetch_html(url).await?;
        let document = Html::parse_document(&html);

        let title = extract_title(&document);
        let text = truncate_chars(&extract_text(&document), self.max_chars);

        if text.trim().is_empty() {
            return Err(ScraperError::NoContent);
        }

        Ok(WebContent {
            url: url.to_string(),
            title,
            text,
        })
    }

    async fn fetch_html(&self, url: &str) -> Result<String, ScraperError> {
        for attempt in 1..=self.attempts {
            match self.fetch_once(url).await {
                Err(ScraperError::FetchError(e)) if e.is_timeout() => {
                    warn!(url, attempt, "timeout while scraping, retrying");
                    if attempt < self.attempts {
                        tokio::time::sleep(self.retry_delay).await;
                    }
                }
                result => return result,
            }
        }
        Err(ScraperError::TimedOut(self.attempts))
    }

    /// One GET, body included; the request timeout covers both
    async fn fetch_once(&self, url: &str) -> Result<String, ScraperError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if status == StatusCode::FORBIDDEN {
            return Err(ScraperError::Forbidden);
        }
        if !status.is_success() {
            return Err(ScraperError::Status(status));
        }
        Ok(response.text().await?)
    }
}

/// Extract the page title from <title> or <h1>
fn extract_title(document: &Html) -> Option<String> {
    ["title", "h1"].into_iter().find_map(|tag| {
        let selector = Selector::parse(tag).ok()?;
        let element = document.select(&selector).next()?;
        let title = collapse_whitespace(&element.text().collect::<Vec<_>>().join(" "));
        (!title.is_empty()).then_some(title)
    })
}

/// Extract readable text, preferring the main content area over the whole body
fn extract_text(document: &Html) -> String {
    let main_selectors = ["article", "main", "[role='main']", ".content", "#content", "body"];

    for selector_str in main_selectors {
        if let Ok(selector) = Selector::parse(selector_str) {
            if let Some(element) = document.select(&selector).next() {
                let text = visible_text(element);
                if !text.is_empty() {
                    return text;
                }
            }
        }
    }

    visible_text(document.root_element())
}

/// All text under `element` outside script, style and noscript, whitespace-collapsed
fn visible_text(element: ElementRef<'_>) -> String {
    let mut parts = Vec::new();
    for node in element.descendants() {
        let Node::Text(text) = node.value() else {
            continue;
        };
        let hidden = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .is_some_and(|e| matches!(e.name(), "script" | "style" | "noscript"))
        });
        if !hidden {
            let piece = text.trim();
            if !piece.is_empty() {
                parts.push(piece);
            }
        }
    }
    collapse_whitespace(&parts.join(" "))
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => text[..byte_idx].to_string(),
        None => text.to_string(),
    }
}
