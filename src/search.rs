//! SERP retrieval.
//!
//! The search provider is a capability trait so the batch loop can run
//! against a fake in tests. The production implementation scrapes the
//! DuckDuckGo HTML endpoint, which needs no API key.

use async_trait::async_trait;
use reqwest::Client;
use scraper::{Html, Selector};
use std::time::Duration;
use thiserror::Error;

use crate::config::SearchConfig;

/// User-Agent for SERP requests. A browser-like string avoids the bot
/// interstitial on the HTML endpoint.
const SERP_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

const SERP_TIMEOUT: Duration = Duration::from_secs(20);

#[derive(Error, Debug)]
pub enum SearchError {
    #[error("failed to query search engine: {0}")]
    FetchError(#[from] reqwest::Error),
}

/// One SERP request: the final query string plus locale and fan-out bounds.
#[derive(Debug, Clone)]
pub struct SearchRequest {
    pub query: String,
    pub country: String,
    pub language: String,
    /// Number of result URLs wanted (validated 1..=5 by the config layer).
    pub count: usize,
}

/// Capability of turning a query string into an ordered list of result URLs.
///
/// An empty vector is the failure signal for an empty SERP; `Err` is reserved
/// for transport problems.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    async fn search(&self, request: &SearchRequest) -> Result<Vec<String>, SearchError>;
}

/// Build the final search string for a query.
///
/// A `site:` restriction is appended when a custom search domain is
/// configured. PDFs are excluded by construction of the query rather than by
/// content-type inspection after fetch.
pub fn build_search_query(query_text: &str, search: &SearchConfig) -> String {
    let mut final_query = match &search.custom_domain {
        Some(domain) => format!("{} site:{}", query_text, domain),
        None => query_text.to_string(),
    };
    final_query.push_str(" -filetype:pdf");
    final_query
}

/// SERP provider backed by the DuckDuckGo HTML endpoint.
pub struct DuckDuckGoProvider {
    client: Client,
}

impl DuckDuckGoProvider {
    pub fn new() -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .user_agent(SERP_USER_AGENT)
            .timeout(SERP_TIMEOUT)
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl SearchProvider for DuckDuckGoProvider {
    async fn search(&self, request: &SearchRequest) -> Result<Vec<String>, SearchError> {
        let locale = format!(
            "{}-{}",
            request.country.to_lowercase(),
            request.language.to_lowercase()
        );
        let url = format!(
            "https://html.duckduckgo.com/html/?q={}&kl={}",
            urlencoding::encode(&request.query),
            locale
        );

        let response = self.client.get(&url).send().await?;
        let html = response.text().await?;

        Ok(parse_serp_urls(&html, request.count))
    }
}

/// Pull result links out of the SERP HTML, preserving rank order.
fn parse_serp_urls(html: &str, count: usize) -> Vec<String> {
    let document = Html::parse_document(html);
    let selector = Selector::parse("a.result__a").unwrap();

    let mut urls: Vec<String> = Vec::new();
    for element in document.select(&selector) {
        if let Some(href) = element.value().attr("href") {
            if let Some(clean) = clean_redirect_url(href) {
                if !urls.contains(&clean) {
                    urls.push(clean);
                }
            }
        }
        if urls.len() == count {
            break;
        }
    }
    urls
}

/// Unwrap DuckDuckGo redirect links to the destination URL.
fn clean_redirect_url(href: &str) -> Option<String> {
    if let Some(encoded) = href.strip_prefix("/l/?uddg=") {
        decode_uddg(encoded)
    } else if let Some(encoded) = href.strip_prefix("//duckduckgo.com/l/?uddg=") {
        decode_uddg(encoded)
    } else if href.starts_with("http") {
        Some(href.to_string())
    } else {
        None
    }
}

fn decode_uddg(encoded: &str) -> Option<String> {
    let encoded = encoded.split('&').next().unwrap_or(encoded);
    urlencoding::decode(encoded).ok().map(|s| s.into_owned())
}
