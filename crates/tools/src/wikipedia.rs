//! Wikipedia lookup: intro extracts from the MediaWiki query API.
//!
//! One GET per lookup:
//!
//! ```text
//! {base_url}?format=json&action=query&prop=extracts&exintro&explaintext
//!           &redirects=1&titles={query}&origin=*
//! ```
//!
//! The first page in `query.pages` is taken as the match; no disambiguation
//! is attempted.

use async_trait::async_trait;
use std::time::Duration;
use stepwise_config::LookupConfig;
use stepwise_core::error::LookupError;
use stepwise_core::lookup::{KnowledgeLookup, SUMMARY_SENTENCES, leading_sentences};
use tracing::{debug, warn};

pub struct WikipediaLookup {
    base_url: String,
    client: reqwest::Client,
}

impl WikipediaLookup {
    pub fn new(base_url: impl Into<String>, timeout: Duration, user_agent: &str) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            base_url: base_url.into(),
            client,
        }
    }

    pub fn from_config(config: &LookupConfig) -> Self {
        Self::new(
            &config.base_url,
            Duration::from_secs(config.timeout_secs),
            &config.user_agent,
        )
    }

    fn query_params(query: &str) -> [(&'static str, &str); 8] {
        [
            ("format", "json"),
            ("action", "query"),
            ("prop", "extracts"),
            ("exintro", ""),
            ("explaintext", ""),
            ("redirects", "1"),
            ("titles", query),
            ("origin", "*"),
        ]
    }
}

#[async_trait]
impl KnowledgeLookup for WikipediaLookup {
    fn name(&self) -> &str {
        "wikipedia"
    }

    async fn lookup(&self, query: &str) -> Result<String, LookupError> {
        debug!(query, "Querying Wikipedia extracts");

        let response = self
            .client
            .get(&self.base_url)
            .query(&Self::query_params(query))
            .send()
            .await
            .map_err(|e| LookupError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "Wikipedia returned error");
            return Err(LookupError::Api {
                status_code: status.as_u16(),
                message,
            });
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| LookupError::Malformed(format!("response is not JSON: {e}")))?;

        parse_extract_response(query, &body)
    }
}

/// Pull the two-sentence summary out of a `prop=extracts` response.
pub fn parse_extract_response(
    query: &str,
    body: &serde_json::Value,
) -> Result<String, LookupError> {
    let pages = body
        .get("query")
        .and_then(|q| q.get("pages"))
        .and_then(|p| p.as_object())
        .ok_or_else(|| LookupError::Malformed("missing 'query.pages'".into()))?;

    let not_found = || LookupError::NotFound {
        query: query.to_string(),
    };

    let page = pages.values().next().ok_or_else(not_found)?;

    if page.get("missing").is_some() || page.get("invalid").is_some() {
        return Err(not_found());
    }

    let extract = page
        .get("extract")
        .and_then(|e| e.as_str())
        .ok_or_else(|| LookupError::Malformed("page has no 'extract' field".into()))?;

    if extract.trim().is_empty() {
        return Err(not_found());
    }

    Ok(leading_sentences(extract, SUMMARY_SENTENCES))
}
