//! Result records - the atomic unit of pipeline output.
//!
//! One `ResultRecord` per summarised item. The five columns of the output
//! table come from one ordered sequence of records, so the columns can never
//! drift out of step.

use serde::{Deserialize, Serialize};

/// Sentinel stored in place of real data when a page could not be fetched.
pub const CONNECTION_ERROR: &str = "Connection Error";

/// Sentinel summary used when no usable text survived extraction/filtering.
pub const NO_ANSWER: &str = "I am sorry. I am afraid I cannot answer it.";

/// Sentinel `source_url` for the second-pass summary over all SERP texts.
pub const COMBINED_SERP_URLS: &str = "Combined SERP URLs";

/// Query label for items entered as a bare URL rather than a search.
pub const URL_ENTRY: &str = "URL entry";

/// Query label for raw text pasted by the user.
pub const UI_ENTRY: &str = "UI entry";

/// Maximum number of characters kept from the summarised text for audit.
pub const EXCERPT_MAX_CHARS: usize = 800;

/// One row of the output table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultRecord {
    /// The originating query text, or an entry-mode label.
    pub query: String,
    /// Generated summary, or an error sentinel.
    pub summary: String,
    /// URL that was summarised, or [`COMBINED_SERP_URLS`].
    #[serde(rename = "summarized_url")]
    pub source_url: String,
    /// Summarisation backend used, mirrored to the error sentinel on failure.
    #[serde(rename = "model")]
    pub model_name: String,
    /// First [`EXCERPT_MAX_CHARS`] characters of the text that was summarised.
    #[serde(rename = "text_to_summarize")]
    pub source_text_excerpt: String,
}

impl ResultRecord {
    /// Build a record for a successfully processed item.
    ///
    /// The excerpt is truncated to [`EXCERPT_MAX_CHARS`] characters.
    pub fn new(query: &str, summary: &str, source_url: &str, model_name: &str, text: &str) -> Self {
        Self {
            query: query.to_string(),
            summary: summary.to_string(),
            source_url: source_url.to_string(),
            model_name: model_name.to_string(),
            source_text_excerpt: truncate_chars(text, EXCERPT_MAX_CHARS),
        }
    }

    /// Build the sentinel record for a URL whose fetch failed.
    pub fn connection_error(query: &str, source_url: &str) -> Self {
        Self {
            query: query.to_string(),
            summary: CONNECTION_ERROR.to_string(),
            source_url: source_url.to_string(),
            model_name: CONNECTION_ERROR.to_string(),
            source_text_excerpt: CONNECTION_ERROR.to_string(),
        }
    }

    /// True if this record encodes a fetch failure.
    pub fn is_connection_error(&self) -> bool {
        self.summary == CONNECTION_ERROR
    }
}

/// Keep at most `max` characters of `text`, respecting char boundaries.
fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}

/// The ordered sequence of records accumulated across one batch run.
///
/// Append-only; checkpoint writes snapshot the full current state without
/// clearing it.
#[derive(Debug, Clone, Default)]
pub struct BatchResult {
    records: Vec<ResultRecord>,
}

impl BatchResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one record. This is the only mutation.
    pub fn push(&mut self, record: ResultRecord) {
        self.records.push(record);
    }

    pub fn records(&self) -> &[ResultRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn excerpt_is_truncated_to_limit() {
        let long = "x".repeat(EXCERPT_MAX_CHARS * 2);
        let record = ResultRecord::new("q", "s", "http://a", "T5-base", &long);
        assert_eq!(record.source_text_excerpt.chars().count(), EXCERPT_MAX_CHARS);
    }

    #[test]
    fn excerpt_truncation_respects_multibyte_chars() {
        let long = "ü".repeat(EXCERPT_MAX_CHARS + 10);
        let record = ResultRecord::new("q", "s", "http://a", "T5-base", &long);
        assert_eq!(record.source_text_excerpt.chars().count(), EXCERPT_MAX_CHARS);
    }

    #[test]
    fn short_text_is_kept_whole() {
        let record = ResultRecord::new("q", "s", "http://a", "T5-base", "short text");
        assert_eq!(record.source_text_excerpt, "short text");
    }

    #[test]
    fn connection_error_fills_all_sentinel_fields() {
        let record = ResultRecord::connection_error("q", "http://down.example");
        assert_eq!(record.summary, CONNECTION_ERROR);
        assert_eq!(record.model_name, CONNECTION_ERROR);
        assert_eq!(record.source_text_excerpt, CONNECTION_ERROR);
        assert_eq!(record.source_url, "http://down.example");
        assert!(record.is_connection_error());
    }

    #[test]
    fn batch_result_preserves_append_order() {
        let mut result = BatchResult::new();
        result.push(ResultRecord::new("a", "s1", "u1", "m", "t"));
        result.push(ResultRecord::new("b", "s2", "u2", "m", "t"));
        assert_eq!(result.len(), 2);
        assert_eq!(result.records()[0].query, "a");
        assert_eq!(result.records()[1].query, "b");
    }
}
