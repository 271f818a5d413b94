//! Page fetching and content extraction.
//!
//! Uses reqwest for fetching and scraper for HTML parsing. A failed fetch is
//! not an error: it becomes [`FetchOutcome::ConnectionError`], which the
//! pipeline turns into a sentinel record so the batch keeps going.

use async_trait::async_trait;
use reqwest::Client;
use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// User-Agent string identifying this scraper
const USER_AGENT: &str = concat!("serpsum/", env!("CARGO_PKG_VERSION"));

/// Default timeout for HTTP requests
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Marker preceding promoted (ad) content on Q&A pages.
const PROMOTED_MARKER: &str = ">Promoted<";

/// Characters of markup to drop immediately before the promoted marker.
const PROMOTED_TAG_LEAD: usize = 8;

/// Marker after which the remaining answers of a Q&A page begin.
const TOP_ANSWER_MARKER: &str = "upvotes\" tabindex";

/// Content-trimming rule for Q&A pages, tuned for Quora's markup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum QuoraMode {
    /// Keep only the top answer (observed production default).
    #[default]
    TopAnswer,
    /// Keep all answers, still dropping promoted content.
    AllAnswers,
    /// Not a Q&A source; skip trimming entirely.
    Disabled,
}

/// Result of fetching one URL. Connection failures are data, not errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Raw HTML body, already trimmed per the quora mode.
    Body(String),
    /// The page could not be retrieved.
    ConnectionError,
}

/// Capability of retrieving the raw HTML of a URL.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str, mode: QuoraMode) -> FetchOutcome;
}

/// HTTP fetcher with a fixed User-Agent and request timeout.
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str, mode: QuoraMode) -> FetchOutcome {
        // Tracking parameters confuse some origins; fetch the bare path.
        let url = strip_query_string(url);

        let response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(_) => return FetchOutcome::ConnectionError,
        };
        if !response.status().is_success() {
            return FetchOutcome::ConnectionError;
        }
        match response.text().await {
            Ok(body) => FetchOutcome::Body(trim_quora_content(&body, mode)),
            Err(_) => FetchOutcome::ConnectionError,
        }
    }
}

/// Drop everything from `?` onwards.
fn strip_query_string(url: &str) -> &str {
    match url.split_once('?') {
        Some((base, _)) => base,
        None => url,
    }
}

/// Apply the Q&A trimming rules to a raw HTML body.
///
/// Promoted content and everything after it is dropped, along with the tag
/// opening that precedes the marker. In top-answer mode the body is further
/// truncated at the first upvote widget, which sits between the first answer
/// and the rest.
pub fn trim_quora_content(body: &str, mode: QuoraMode) -> String {
    if mode == QuoraMode::Disabled {
        return body.to_string();
    }

    let mut body = body;
    if let Some(idx) = body.find(PROMOTED_MARKER) {
        let head = &body[..idx];
        let cut = head
            .char_indices()
            .rev()
            .nth(PROMOTED_TAG_LEAD - 1)
            .map(|(i, _)| i)
            .unwrap_or(0);
        body = &head[..cut];
    }

    if mode == QuoraMode::TopAnswer {
        if let Some(idx) = body.find(TOP_ANSWER_MARKER) {
            body = &body[..idx];
        }
    }

    body.to_string()
}

/// Extract readable text content from raw HTML.
///
/// Returns an empty string when nothing usable is found; the pipeline maps
/// that to the apology sentinel.
pub fn extract_text(html: &str) -> String {
    let document = Html::parse_document(html);

    // Try to find main content areas first
    let main_selectors = ["article", "main", "[role='main']", ".content", "#content"];

    for selector_str in main_selectors {
        if let Ok(selector) = Selector::parse(selector_str) {
            if let Some(element) = document.select(&selector).next() {
                let text = extract_text_from_element(&Html::parse_fragment(&element.html()));
                if !text.trim().is_empty() {
                    return text;
                }
            }
        }
    }

    // Fall back to extracting from body, excluding scripts/styles
    extract_text_from_element(&document)
}

/// Extract text from paragraphs and headings, excluding scripts and styles
fn extract_text_from_element(document: &Html) -> String {
    let content_selector = Selector::parse("p, h1, h2, h3, h4, h5, h6, li").unwrap();

    let mut paragraphs: Vec<String> = Vec::new();

    for element in document.select(&content_selector) {
        let text: String = element.text().collect::<Vec<_>>().join(" ");
        let cleaned = text.split_whitespace().collect::<Vec<_>>().join(" ");

        if !cleaned.is_empty() && cleaned.len() > 20 {
            paragraphs.push(cleaned);
        }
    }

    paragraphs.join("\n")
}
