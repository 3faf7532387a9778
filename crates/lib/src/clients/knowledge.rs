//! Knowledge-base query client (language query-knowledgebases REST API).
//!
//! Sends one question per call with a fixed result cap and confidence
//! threshold; the ranked candidate list comes back unmodified. Failures are
//! returned to the caller as-is, with no retry.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

const API_VERSION: &str = "2021-10-01";
const DEPLOYMENT_NAME: &str = "production";
const TOP_ANSWERS: u32 = 3;
const CONFIDENCE_THRESHOLD: f64 = 0.5;

pub(crate) const SUBSCRIPTION_KEY_HEADER: &str = "Ocp-Apim-Subscription-Key";

#[derive(Debug, thiserror::Error)]
pub enum KnowledgeError {
    #[error("question must not be empty")]
    EmptyQuestion,
    #[error("knowledge request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("knowledge api error: {0}")]
    Api(String),
}

/// Ranked candidate answers from the knowledge base. The first element is the
/// best match; the list may be empty.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KnowledgeResult {
    #[serde(default)]
    pub answers: Vec<KnowledgeAnswer>,
}

impl KnowledgeResult {
    /// Best (first) candidate answer, if any.
    pub fn best(&self) -> Option<&KnowledgeAnswer> {
        self.answers.first()
    }
}

/// One candidate answer with its confidence score and source passthrough.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KnowledgeAnswer {
    #[serde(default)]
    pub answer: String,
    #[serde(default)]
    pub confidence_score: Option<f64>,
    #[serde(default)]
    pub source: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryRequest<'a> {
    top: u32,
    question: &'a str,
    include_unstructured_sources: bool,
    confidence_score_threshold: f64,
}

/// Issues a question to the knowledge base and returns ranked candidate answers.
#[async_trait]
pub trait KnowledgeBackend: Send + Sync {
    async fn query(&self, question: &str) -> Result<KnowledgeResult, KnowledgeError>;
}

/// Client for the hosted knowledge-base query endpoint.
#[derive(Clone)]
pub struct KnowledgeClient {
    host: String,
    key: String,
    project: String,
    client: reqwest::Client,
}

impl KnowledgeClient {
    pub fn new(
        host: impl Into<String>,
        key: impl Into<String>,
        project: impl Into<String>,
    ) -> Self {
        let host = host.into();
        Self {
            host: host.trim_end_matches('/').to_string(),
            key: key.into(),
            project: project.into(),
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl KnowledgeBackend for KnowledgeClient {
    /// POST /language/:query-knowledgebases — top 3 answers above the fixed
    /// confidence threshold, unstructured sources included.
    async fn query(&self, question: &str) -> Result<KnowledgeResult, KnowledgeError> {
        if question.trim().is_empty() {
            return Err(KnowledgeError::EmptyQuestion);
        }
        let url = format!(
            "{}/language/:query-knowledgebases?projectName={}&api-version={}&deploymentName={}",
            self.host, self.project, API_VERSION, DEPLOYMENT_NAME
        );
        let body = QueryRequest {
            top: TOP_ANSWERS,
            question,
            include_unstructured_sources: true,
            confidence_score_threshold: CONFIDENCE_THRESHOLD,
        };
        log::debug!("knowledge: POST {} question={:?}", url, question);
        let res = self
            .client
            .post(&url)
            .header(SUBSCRIPTION_KEY_HEADER, &self.key)
            .json(&body)
            .send()
            .await?;
        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(KnowledgeError::Api(format!("{} {}", status, body)));
        }
        let data: KnowledgeResult = res.json().await?;
        log::debug!("knowledge: {} candidate answers", data.answers.len());
        Ok(data)
    }
}
