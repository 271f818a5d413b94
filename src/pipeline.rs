//! The per-item pipeline: fetch, extract, filter, summarise, assemble.
//!
//! Failures at the URL level are absorbed into sentinel records so that a
//! batch always produces one inspectable row per attempted item. The only
//! short-circuit is a failed fetch; everything downstream of a successful
//! fetch degrades to the apology sentinel instead of erroring.

use crate::config::Config;
use crate::filter::evaluate_sentence_quality;
use crate::record::{ResultRecord, COMBINED_SERP_URLS, NO_ANSWER, UI_ENTRY};
use crate::scraper::{extract_text, FetchOutcome, PageFetcher};
use crate::search::{build_search_query, SearchProvider, SearchRequest};
use crate::summarizer::Summarizer;

/// Upstream scrapers sometimes return a retry notice instead of content.
/// When present, only what follows the last occurrence is real.
const TRANSIENT_FAILURE_MARKER: &str = "Something went wrong. Wait a moment and try again.";

/// Drives the fetch → extract → filter → summarise chain for one item.
pub struct PipelineOrchestrator<'a> {
    fetcher: &'a dyn PageFetcher,
    summarizer: &'a dyn Summarizer,
    config: &'a Config,
}

impl<'a> PipelineOrchestrator<'a> {
    pub fn new(
        fetcher: &'a dyn PageFetcher,
        summarizer: &'a dyn Summarizer,
        config: &'a Config,
    ) -> Self {
        Self {
            fetcher,
            summarizer,
            config,
        }
    }

    /// Fetch, clean and summarise a single URL.
    ///
    /// Returns the record plus the cleaned text, which the caller needs to
    /// build a combined summary across URLs. A failed fetch yields the
    /// connection-error sentinel record and empty cleaned text.
    pub async fn summarize_one_url(&self, query: &str, url: &str) -> (ResultRecord, String) {
        let pipeline = &self.config.pipeline;

        let body = match self.fetcher.fetch(url, pipeline.quora_mode).await {
            FetchOutcome::Body(body) => body,
            FetchOutcome::ConnectionError => {
                return (ResultRecord::connection_error(query, url), String::new());
            }
        };

        let cleaned = self.clean_body(&extract_text(&body));
        let summary = self.summarize_cleaned(&cleaned).await;

        let record = ResultRecord::new(query, &summary, url, &pipeline.model, &cleaned);
        (record, cleaned)
    }

    /// Search, then summarise every SERP URL plus a combined second pass.
    ///
    /// An empty SERP (or an unreachable provider) yields an empty vector;
    /// the batch reports it and moves on. With more than one URL, exactly
    /// one combined record is appended after the per-URL records.
    pub async fn summarize_query(
        &self,
        query_text: &str,
        provider: &dyn SearchProvider,
    ) -> Vec<ResultRecord> {
        let search = &self.config.search;
        let request = SearchRequest {
            query: build_search_query(query_text, search),
            country: search.country.clone(),
            language: search.language.clone(),
            count: search.result_count as usize,
        };

        let urls = provider.search(&request).await.unwrap_or_default();
        if urls.is_empty() {
            return Vec::new();
        }

        let mut records = Vec::new();
        let mut cleaned_texts = Vec::new();
        for url in &urls {
            let (record, cleaned) = self.summarize_one_url(query_text, url).await;
            records.push(record);
            cleaned_texts.push(cleaned);
        }

        if urls.len() > 1 {
            let combined = cleaned_texts.join(" ").trim().to_string();
            let summary = self.summarize_cleaned(&combined).await;
            records.push(ResultRecord::new(
                query_text,
                &summary,
                COMBINED_SERP_URLS,
                &self.config.pipeline.model,
                &combined,
            ));
        }

        records
    }

    /// Summarise raw text supplied directly by the user (no fetch).
    pub async fn summarize_text(&self, text: &str) -> ResultRecord {
        let cleaned = self.clean_body(text);
        let summary = self.summarize_cleaned(&cleaned).await;
        ResultRecord::new(UI_ENTRY, &summary, UI_ENTRY, &self.config.pipeline.model, &cleaned)
    }

    /// Scrub transient-failure noise, normalise newlines and apply the
    /// sentence filter, producing the text that will be summarised.
    fn clean_body(&self, extracted: &str) -> String {
        let scrubbed = scrub_transient_failures(extracted);
        let body = scrubbed.replace('\n', " ");

        let sentences = if self.config.pipeline.filter_sentences {
            evaluate_sentence_quality(&body)
        } else {
            vec![body]
        };

        sentences.join(" ").trim().to_string()
    }

    /// Summarise cleaned text, substituting the apology sentinel for empty
    /// input instead of wasting a model call.
    async fn summarize_cleaned(&self, cleaned: &str) -> String {
        if cleaned.is_empty() {
            return NO_ANSWER.to_string();
        }
        let pipeline = &self.config.pipeline;
        self.summarizer
            .summarize(
                cleaned,
                &pipeline.model,
                pipeline.min_summary_length,
                pipeline.max_summary_length,
            )
            .await
    }
}

/// Keep only what follows the last transient-failure notice, dropping the
/// stray separator character the notice leaves behind.
fn scrub_transient_failures(text: &str) -> String {
    match text.rfind(TRANSIENT_FAILURE_MARKER) {
        Some(idx) => {
            let rest = &text[idx + TRANSIENT_FAILURE_MARKER.len()..];
            let mut chars = rest.chars();
            chars.next();
            chars.as_str().to_string()
        }
        None => text.to_string(),
    }
}

#[cfg(test)]
pub(crate) mod testutil {
    //! Fakes shared by the pipeline and batch tests.

    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    use crate::scraper::QuoraMode;
    use crate::search::SearchError;

    /// Fetcher serving canned bodies per URL; unknown URLs fail to connect.
    #[derive(Default)]
    pub struct FakeFetcher {
        bodies: HashMap<String, String>,
    }

    impl FakeFetcher {
        pub fn with_page(mut self, url: &str, body: &str) -> Self {
            self.bodies.insert(url.to_string(), body.to_string());
            self
        }
    }

    #[async_trait]
    impl PageFetcher for FakeFetcher {
        async fn fetch(&self, url: &str, _mode: QuoraMode) -> FetchOutcome {
            match self.bodies.get(url) {
                Some(body) => FetchOutcome::Body(body.clone()),
                None => FetchOutcome::ConnectionError,
            }
        }
    }

    /// Summariser returning a fixed string and counting invocations.
    #[derive(Default)]
    pub struct CountingSummarizer {
        pub calls: Mutex<Vec<String>>,
    }

    impl CountingSummarizer {
        pub fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl Summarizer for CountingSummarizer {
        async fn summarize(&self, text: &str, _model: &str, _min: usize, _max: usize) -> String {
            self.calls.lock().unwrap().push(text.to_string());
            "a generated summary".to_string()
        }
    }

    /// Provider returning a fixed URL list for every query.
    pub struct FakeSearch {
        pub urls: Vec<String>,
    }

    impl FakeSearch {
        pub fn returning(urls: &[&str]) -> Self {
            Self {
                urls: urls.iter().map(|u| u.to_string()).collect(),
            }
        }
    }

    #[async_trait]
    impl SearchProvider for FakeSearch {
        async fn search(&self, _request: &SearchRequest) -> Result<Vec<String>, SearchError> {
            Ok(self.urls.clone())
        }
    }

    /// An article body that survives the readability filter.
    pub const ARTICLE: &str = "<html><body><article><p>The comprehensive \
        infrastructure modernization initiative demonstrated measurable \
        improvements across distributed computational environments.</p>\
        </article></body></html>";

    pub fn unfiltered_config() -> Config {
        let mut config = Config::default();
        config.pipeline.filter_sentences = false;
        config
    }
}
