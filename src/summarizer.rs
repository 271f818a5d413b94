//! Abstractive summarisation backends.
//!
//! Model selection is an explicit registry lookup rather than a chain of
//! string comparisons: every recognised backend name maps to a [`ModelKind`]
//! with a hosted checkpoint id. The summariser capability never returns
//! `Err` - an unrecognised name or a transport failure produces an explicit
//! error string that flows into the output table like any other summary.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Returned in place of a summary when the model name is not recognised.
pub const NO_MODEL_SELECTED: &str = "[Error] No summarizer has been selected.";

/// Inference calls can take a while for long inputs on cold checkpoints.
const INFERENCE_TIMEOUT: Duration = Duration::from_secs(120);

const INFERENCE_API_BASE: &str = "https://api-inference.huggingface.co/models";

/// The recognised summarisation backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelKind {
    T5Base,
    RobertaMed,
    LongT5,
    PegasusXsum,
    German,
    Italian,
}

impl ModelKind {
    /// Look a backend up by its user-facing name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "T5-base" => Some(Self::T5Base),
            "Roberta-med" => Some(Self::RobertaMed),
            "Long-T5" => Some(Self::LongT5),
            "Pegasus-xsum" => Some(Self::PegasusXsum),
            "German" => Some(Self::German),
            "Italian" => Some(Self::Italian),
            _ => None,
        }
    }

    /// The hosted checkpoint backing this model.
    pub fn checkpoint(&self) -> &'static str {
        match self {
            Self::T5Base => "mrm8488/t5-base-finetuned-summarize-news",
            Self::RobertaMed => {
                "mrm8488/roberta-med-small2roberta-med-small-finetuned-cnn_daily_mail-summarization"
            }
            Self::LongT5 => "pszemraj/long-t5-tglobal-base-16384-book-summary",
            Self::PegasusXsum => "google/pegasus-xsum",
            Self::German => "mrm8488/bert2bert_shared-german-finetuned-summarization",
            Self::Italian => "ARTeLab/mbart-summarization-mlsum",
        }
    }

    /// All backend names, for CLI help and validation messages.
    pub fn names() -> [&'static str; 6] {
        [
            "T5-base",
            "Roberta-med",
            "Long-T5",
            "Pegasus-xsum",
            "German",
            "Italian",
        ]
    }
}

/// Capability of producing a summary for a text with a named backend.
///
/// Implementations must not fail: every outcome is a string, with errors
/// encoded as explicit bracketed messages.
#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(
        &self,
        text: &str,
        model_name: &str,
        min_length: usize,
        max_length: usize,
    ) -> String;
}

#[derive(Serialize)]
struct InferenceRequest<'a> {
    inputs: &'a str,
    parameters: InferenceParameters,
}

#[derive(Serialize)]
struct InferenceParameters {
    min_length: usize,
    max_length: usize,
}

#[derive(Deserialize)]
struct InferenceResponse {
    summary_text: String,
}

/// Summariser backed by the hosted inference API.
pub struct HostedSummarizer {
    client: Client,
    api_token: Option<String>,
}

impl HostedSummarizer {
    pub fn new(api_token: Option<String>) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(INFERENCE_TIMEOUT).build()?;
        Ok(Self { client, api_token })
    }

    async fn request_summary(
        &self,
        model: ModelKind,
        text: &str,
        min_length: usize,
        max_length: usize,
    ) -> Result<String, reqwest::Error> {
        let url = format!("{}/{}", INFERENCE_API_BASE, model.checkpoint());
        let payload = InferenceRequest {
            inputs: text,
            parameters: InferenceParameters {
                min_length,
                max_length,
            },
        };

        let mut request = self.client.post(&url).json(&payload);
        if let Some(token) = &self.api_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?.error_for_status()?;
        let outputs: Vec<InferenceResponse> = response.json().await?;
        Ok(outputs
            .into_iter()
            .next()
            .map(|o| o.summary_text)
            .unwrap_or_default())
    }
}

#[async_trait]
impl Summarizer for HostedSummarizer {
    async fn summarize(
        &self,
        text: &str,
        model_name: &str,
        min_length: usize,
        max_length: usize,
    ) -> String {
        let Some(model) = ModelKind::from_name(model_name) else {
            return NO_MODEL_SELECTED.to_string();
        };

        match self.request_summary(model, text, min_length, max_length).await {
            Ok(summary) => summary,
            Err(e) => format!("[Error] Summarization request failed: {}", e),
        }
    }
}
