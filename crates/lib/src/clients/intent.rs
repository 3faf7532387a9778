//! Intent classification client (conversation-analysis REST API).
//!
//! The backend reports a top intent, per-intent confidence scores, and
//! extracted entities with their matched source text. The wire prediction is
//! converted to `IntentResult` without normalizing entity text.

use crate::clients::knowledge::SUBSCRIPTION_KEY_HEADER;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

const API_VERSION: &str = "2022-10-01-preview";

#[derive(Debug, thiserror::Error)]
pub enum IntentError {
    #[error("intent request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("intent api error: {0}")]
    Api(String),
}

/// Classification outcome: top intent label, per-intent confidence scores in
/// [0,1], and extracted entity spans grouped by category.
#[derive(Debug, Clone, Default)]
pub struct IntentResult {
    pub top_intent: String,
    pub scores: HashMap<String, f64>,
    pub entities: HashMap<String, Vec<EntitySpan>>,
}

impl IntentResult {
    /// Confidence score for an intent label (0.0 when the backend did not report one).
    pub fn score(&self, intent: &str) -> f64 {
        self.scores.get(intent).copied().unwrap_or(0.0)
    }

    /// First extracted span for an entity category, if any.
    pub fn first_entity(&self, category: &str) -> Option<&EntitySpan> {
        self.entities.get(category).and_then(|spans| spans.first())
    }
}

/// One extracted entity occurrence, carrying the matched source text.
#[derive(Debug, Clone)]
pub struct EntitySpan {
    pub text: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AnalyzeRequest<'a> {
    kind: &'a str,
    analysis_input: AnalysisInput<'a>,
    parameters: AnalysisParameters<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AnalysisInput<'a> {
    conversation_item: ConversationItem<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ConversationItem<'a> {
    id: &'a str,
    participant_id: &'a str,
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AnalysisParameters<'a> {
    project_name: &'a str,
    deployment_name: &'a str,
}

#[derive(Debug, Deserialize)]
struct AnalyzeResponse {
    result: AnalyzeResult,
}

#[derive(Debug, Deserialize)]
struct AnalyzeResult {
    prediction: Prediction,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Prediction {
    #[serde(default)]
    top_intent: String,
    #[serde(default)]
    intents: Vec<PredictedIntent>,
    #[serde(default)]
    entities: Vec<PredictedEntity>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PredictedIntent {
    category: String,
    #[serde(default)]
    confidence_score: f64,
}

#[derive(Debug, Deserialize)]
struct PredictedEntity {
    category: String,
    #[serde(default)]
    text: String,
}

impl From<Prediction> for IntentResult {
    fn from(prediction: Prediction) -> Self {
        let scores = prediction
            .intents
            .into_iter()
            .map(|i| (i.category, i.confidence_score))
            .collect();
        let mut entities: HashMap<String, Vec<EntitySpan>> = HashMap::new();
        for entity in prediction.entities {
            entities
                .entry(entity.category)
                .or_default()
                .push(EntitySpan { text: entity.text });
        }
        Self {
            top_intent: prediction.top_intent,
            scores,
            entities,
        }
    }
}

/// Issues the raw utterance to the classification backend and returns its prediction.
#[async_trait]
pub trait IntentBackend: Send + Sync {
    async fn classify(&self, utterance: &str) -> Result<IntentResult, IntentError>;
}

/// Client for the hosted intent classification endpoint.
#[derive(Clone)]
pub struct IntentClient {
    host: String,
    key: String,
    project: String,
    deployment: String,
    client: reqwest::Client,
}

impl IntentClient {
    pub fn new(
        host: impl Into<String>,
        key: impl Into<String>,
        project: impl Into<String>,
        deployment: impl Into<String>,
    ) -> Self {
        let host = host.into();
        Self {
            host: host.trim_end_matches('/').to_string(),
            key: key.into(),
            project: project.into(),
            deployment: deployment.into(),
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl IntentBackend for IntentClient {
    /// POST /language/:analyze-conversations — the utterance goes out as-is;
    /// the prediction comes back as-is.
    async fn classify(&self, utterance: &str) -> Result<IntentResult, IntentError> {
        let url = format!(
            "{}/language/:analyze-conversations?api-version={}",
            self.host, API_VERSION
        );
        let body = AnalyzeRequest {
            kind: "Conversation",
            analysis_input: AnalysisInput {
                conversation_item: ConversationItem {
                    id: "1",
                    participant_id: "user",
                    text: utterance,
                },
            },
            parameters: AnalysisParameters {
                project_name: &self.project,
                deployment_name: &self.deployment,
            },
        };
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
            return Err(IntentError::Api(format!("{} {}", status, body)));
        }
        let data: AnalyzeResponse = res.json().await?;
        let result = IntentResult::from(data.result.prediction);
        log::debug!(
            "intent: top {:?} ({} intents, {} entity categories)",
            result.top_intent,
            result.scores.len(),
            result.entities.len()
        );
        Ok(result)
    }
}
