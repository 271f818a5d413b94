//! The batch loop: iterate queries, throttle, accumulate, persist.
//!
//! Search providers ban unthrottled clients, so before every Nth search
//! request the runner snapshots all records to a checkpoint file and pauses.
//! The pause goes through the [`Pause`] trait so tests can drive the
//! 10-request boundary without real delays.

use async_trait::async_trait;
use std::time::Duration;

use crate::config::Config;
use crate::pipeline::PipelineOrchestrator;
use crate::record::{BatchResult, URL_ENTRY};
use crate::scraper::PageFetcher;
use crate::search::SearchProvider;
use crate::sink::RecordSink;
use crate::summarizer::Summarizer;

/// Status reported when the query workflow receives no queries at all.
pub const EMPTY_BATCH_STATUS: &str = "CSV file is empty.";

/// What a batch run processes.
#[derive(Debug, Clone)]
pub enum Workflow {
    /// A sequence of search queries, each fanned out over its SERP.
    Query(Vec<String>),
    /// A single user-supplied URL; no search, no combined summary.
    Url(String),
    /// Raw text pasted by the user; no search, no fetch.
    Text(String),
}

/// Suspend execution between throttled requests.
#[async_trait]
pub trait Pause: Send + Sync {
    async fn pause(&self, duration: Duration);
}

/// Production pause backed by the tokio timer.
pub struct TokioPause;

#[async_trait]
impl Pause for TokioPause {
    async fn pause(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// The outcome of one batch run.
#[derive(Debug)]
pub struct BatchReport {
    /// Every record produced, in processing order.
    pub result: BatchResult,
    /// Final persistence (or empty-input) status, human readable.
    pub status: String,
    /// Per-query notices: empty SERPs, checkpoint writes.
    pub warnings: Vec<String>,
}

/// Runs a [`Workflow`] to completion, absorbing per-item failures.
pub struct BatchRunner<'a> {
    orchestrator: PipelineOrchestrator<'a>,
    search: &'a dyn SearchProvider,
    sink: &'a dyn RecordSink,
    pause: &'a dyn Pause,
    config: &'a Config,
}

impl<'a> BatchRunner<'a> {
    pub fn new(
        fetcher: &'a dyn PageFetcher,
        summarizer: &'a dyn Summarizer,
        search: &'a dyn SearchProvider,
        sink: &'a dyn RecordSink,
        pause: &'a dyn Pause,
        config: &'a Config,
    ) -> Self {
        Self {
            orchestrator: PipelineOrchestrator::new(fetcher, summarizer, config),
            search,
            sink,
            pause,
            config,
        }
    }

    /// Run the workflow and return every record plus the final status.
    ///
    /// Persistence is best-effort: a failed write is reported in the status
    /// while the in-memory result is still returned to the caller.
    pub async fn run(&self, workflow: &Workflow) -> BatchReport {
        match workflow {
            Workflow::Query(queries) => self.run_queries(queries).await,
            Workflow::Url(url) => {
                let mut result = BatchResult::new();
                let (record, _) = self.orchestrator.summarize_one_url(URL_ENTRY, url).await;
                result.push(record);
                let status = self.sink.write(&result, None);
                BatchReport {
                    result,
                    status,
                    warnings: Vec::new(),
                }
            }
            Workflow::Text(text) => {
                let mut result = BatchResult::new();
                result.push(self.orchestrator.summarize_text(text).await);
                let status = self.sink.write(&result, None);
                BatchReport {
                    result,
                    status,
                    warnings: Vec::new(),
                }
            }
        }
    }

    async fn run_queries(&self, queries: &[String]) -> BatchReport {
        let mut result = BatchResult::new();
        let mut warnings = Vec::new();

        if queries.is_empty() {
            return BatchReport {
                result,
                status: EMPTY_BATCH_STATUS.to_string(),
                warnings,
            };
        }

        let throttle = &self.config.throttle;
        let mut search_request_count = 0usize;

        for query in queries {
            if search_request_count != 0 && search_request_count % throttle.checkpoint_every == 0 {
                let write_status = self.sink.write(&result, Some(search_request_count));
                warnings.push(format!(
                    "Checkpoint after {} search requests: {}",
                    search_request_count, write_status
                ));
                self.pause
                    .pause(Duration::from_secs(throttle.pause_secs))
                    .await;
            }

            let records = self.orchestrator.summarize_query(query, self.search).await;
            search_request_count += 1;

            if records.is_empty() {
                warnings.push(format!("SERP is empty for query \"{}\"", query));
            }
            for record in records {
                result.push(record);
            }
        }

        let status = self.sink.write(&result, None);
        BatchReport {
            result,
            status,
            warnings,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::testutil::{
        unfiltered_config, CountingSummarizer, FakeFetcher, FakeSearch, ARTICLE,
    };
    use crate::record::COMBINED_SERP_URLS;
    use std::sync::Mutex;

    /// Sink recording every write; reports success.
    #[derive(Default)]
    struct RecordingSink {
        writes: Mutex<Vec<(Option<usize>, usize)>>,
    }

    impl RecordSink for RecordingSink {
        fn write(&self, result: &BatchResult, checkpoint: Option<usize>) -> String {
            self.writes.lock().unwrap().push((checkpoint, result.len()));
            "Result file saved to disk.".to_string()
        }
    }

    /// Pause recording requested durations instead of sleeping.
    #[derive(Default)]
    struct RecordingPause {
        pauses: Mutex<Vec<Duration>>,
    }

    #[async_trait]
    impl Pause for RecordingPause {
        async fn pause(&self, duration: Duration) {
            self.pauses.lock().unwrap().push(duration);
        }
    }

    fn queries(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("query {}", i)).collect()
    }

    #[tokio::test]
    async fn twenty_three_queries_checkpoint_twice_and_finalize_once() {
        let fetcher = FakeFetcher::default().with_page("http://a.example", ARTICLE);
        let summarizer = CountingSummarizer::default();
        let search = FakeSearch::returning(&["http://a.example"]);
        let sink = RecordingSink::default();
        let pause = RecordingPause::default();
        let config = unfiltered_config();
        let runner = BatchRunner::new(&fetcher, &summarizer, &search, &sink, &pause, &config);

        let report = runner.run(&Workflow::Query(queries(23))).await;

        // one record per query, single-URL SERPs never combine
        assert_eq!(report.result.len(), 23);

        let writes = sink.writes.lock().unwrap();
        let checkpoints: Vec<_> = writes.iter().filter(|(c, _)| c.is_some()).collect();
        assert_eq!(checkpoints.len(), 2);
        assert_eq!(checkpoints[0].0, Some(10));
        assert_eq!(checkpoints[1].0, Some(20));
        // checkpoints snapshot the records accumulated so far
        assert_eq!(checkpoints[0].1, 10);
        assert_eq!(checkpoints[1].1, 20);

        let finals: Vec<_> = writes.iter().filter(|(c, _)| c.is_none()).collect();
        assert_eq!(finals.len(), 1);
        assert_eq!(finals[0].1, 23);

        assert_eq!(pause.pauses.lock().unwrap().len(), 2);
        assert_eq!(report.status, "Result file saved to disk.");
    }

    #[tokio::test]
    async fn short_batches_never_pause() {
        let fetcher = FakeFetcher::default().with_page("http://a.example", ARTICLE);
        let summarizer = CountingSummarizer::default();
        let search = FakeSearch::returning(&["http://a.example"]);
        let sink = RecordingSink::default();
        let pause = RecordingPause::default();
        let config = unfiltered_config();
        let runner = BatchRunner::new(&fetcher, &summarizer, &search, &sink, &pause, &config);

        runner.run(&Workflow::Query(queries(9))).await;

        assert!(pause.pauses.lock().unwrap().is_empty());
        assert_eq!(sink.writes.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn empty_query_list_reports_and_writes_nothing() {
        let fetcher = FakeFetcher::default();
        let summarizer = CountingSummarizer::default();
        let search = FakeSearch::returning(&[]);
        let sink = RecordingSink::default();
        let pause = RecordingPause::default();
        let config = unfiltered_config();
        let runner = BatchRunner::new(&fetcher, &summarizer, &search, &sink, &pause, &config);

        let report = runner.run(&Workflow::Query(Vec::new())).await;

        assert_eq!(report.status, EMPTY_BATCH_STATUS);
        assert!(report.result.is_empty());
        assert!(sink.writes.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn empty_serp_is_reported_and_batch_continues() {
        let fetcher = FakeFetcher::default();
        let summarizer = CountingSummarizer::default();
        let search = FakeSearch::returning(&[]);
        let sink = RecordingSink::default();
        let pause = RecordingPause::default();
        let config = unfiltered_config();
        let runner = BatchRunner::new(&fetcher, &summarizer, &search, &sink, &pause, &config);

        let report = runner.run(&Workflow::Query(queries(2))).await;

        assert!(report.result.is_empty());
        assert_eq!(report.warnings.len(), 2);
        assert!(report.warnings[0].contains("SERP is empty"));
        // the final write still happens, producing an empty table
        assert_eq!(sink.writes.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn query_with_failing_fetch_completes_with_sentinel_row() {
        let fetcher = FakeFetcher::default();
        let summarizer = CountingSummarizer::default();
        let search = FakeSearch::returning(&["http://down.example"]);
        let sink = RecordingSink::default();
        let pause = RecordingPause::default();
        let config = unfiltered_config();
        let runner = BatchRunner::new(&fetcher, &summarizer, &search, &sink, &pause, &config);

        let report = runner.run(&Workflow::Query(queries(1))).await;

        assert_eq!(report.result.len(), 1);
        assert!(report.result.records()[0].is_connection_error());
        // no combined record for a single-URL SERP
        assert!(report
            .result
            .records()
            .iter()
            .all(|r| r.source_url != COMBINED_SERP_URLS));
    }

    #[tokio::test]
    async fn url_workflow_is_a_single_item_without_throttling() {
        let fetcher = FakeFetcher::default().with_page("http://a.example", ARTICLE);
        let summarizer = CountingSummarizer::default();
        let search = FakeSearch::returning(&[]);
        let sink = RecordingSink::default();
        let pause = RecordingPause::default();
        let config = unfiltered_config();
        let runner = BatchRunner::new(&fetcher, &summarizer, &search, &sink, &pause, &config);

        let report = runner
            .run(&Workflow::Url("http://a.example".to_string()))
            .await;

        assert_eq!(report.result.len(), 1);
        let record = &report.result.records()[0];
        assert_eq!(record.query, URL_ENTRY);
        assert_eq!(record.source_url, "http://a.example");
        assert!(pause.pauses.lock().unwrap().is_empty());
        assert!(report
            .result
            .records()
            .iter()
            .all(|r| r.source_url != COMBINED_SERP_URLS));
    }

    #[tokio::test]
    async fn text_workflow_summarizes_without_fetching() {
        let fetcher = FakeFetcher::default(); // any fetch would fail
        let summarizer = CountingSummarizer::default();
        let search = FakeSearch::returning(&[]);
        let sink = RecordingSink::default();
        let pause = RecordingPause::default();
        let config = unfiltered_config();
        let runner = BatchRunner::new(&fetcher, &summarizer, &search, &sink, &pause, &config);

        let report = runner
            .run(&Workflow::Text("Pasted text to be summarised.".to_string()))
            .await;

        assert_eq!(report.result.len(), 1);
        assert_eq!(report.result.records()[0].summary, "a generated summary");
        assert_eq!(summarizer.call_count(), 1);
    }
}
