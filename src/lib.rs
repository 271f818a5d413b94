//! # serpsum
//!
//! A batch pipeline for summarising search-engine results.
//!
//! Takes a search query, a URL, or raw text; retrieves candidate pages,
//! extracts readable text, optionally drops low-readability sentences, and
//! produces abstractive summaries with a named seq2seq backend. Results
//! accumulate into a five-column CSV table, optionally zipped and emailed.
//!
//! ## Design
//!
//! - **Failures are data**: per-URL and per-query failures become sentinel
//!   strings in the output table, never panics or early exits.
//! - **Capability traits**: search, fetch, summarise and pause are traits so
//!   the batch loop is testable without network access or real delays.
//! - **Sequential**: one batch, one query at a time, throttled to respect
//!   the search provider's rate limits.

pub mod batch;
pub mod config;
pub mod filter;
pub mod mailer;
pub mod pipeline;
pub mod record;
pub mod scraper;
pub mod search;
pub mod sink;
pub mod summarizer;

pub use batch::{BatchReport, BatchRunner, Workflow};
pub use config::Config;
pub use pipeline::PipelineOrchestrator;
pub use record::{BatchResult, ResultRecord};
pub use sink::CsvSink;
