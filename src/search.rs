//! Keyword web search via the Google Custom Search JSON API.

use crate::config::Config;
use reqwest::{Client, Url};
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

/// The API returns at most this many results per request
const MAX_RESULTS: usize = 10;

#[derive(Error, Debug)]
pub enum SearchError {
    #[error("Google API key or search engine ID missing")]
    MissingCredentials,
    #[error("search request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),
    #[error("invalid search endpoint: {0}")]
    InvalidEndpoint(String),
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    link: Option<String>,
}

pub struct GoogleSearch {
    client: Client,
    endpoint: String,
    api_key: String,
    engine_id: String,
}

impl GoogleSearch {
    pub fn new(config: &Config) -> Result<Self, SearchError> {
        let (Some(api_key), Some(engine_id)) =
            (config.api.google_key.clone(), config.api.google_cse_id.clone())
        else {
            return Err(SearchError::MissingCredentials);
        };

        Ok(Self {
            client: Client::new(),
            endpoint: config.search.endpoint.clone(),
            api_key,
            engine_id,
        })
    }

    /// Search for `query`, returning up to `count` result URLs in rank order
    pub async fn search(&self, query: &str, count: usize) -> Result<Vec<String>, SearchError> {
        let num = count.clamp(1, MAX_RESULTS).to_string();
        let url = Url::parse_with_params(
            &self.endpoint,
            [
                ("key", self.api_key.as_str()),
                ("cx", self.engine_id.as_str()),
                ("q", query),
                ("num", num.as_str()),
            ],
        )
        .map_err(|e| SearchError::InvalidEndpoint(e.to_string()))?;

        let response: SearchResponse = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let links: Vec<String> = response.items.into_iter().filter_map(|i| i.link).collect();
        debug!(query, results = links.len(), "search completed");
        Ok(links)
    }
}
