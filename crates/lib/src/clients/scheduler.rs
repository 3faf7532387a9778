//! Appointment scheduler client: slot availability and booking.
//!
//! Both calls return the backend's response body as opaque text. The time
//! string passed to booking is the raw extracted entity text; parsing and
//! validation are entirely the backend's responsibility.

use async_trait::async_trait;
use serde::Serialize;

#[derive(Debug, thiserror::Error)]
pub enum SchedulerError {
    #[error("scheduler request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("scheduler api error: {0}")]
    Api(String),
}

#[derive(Serialize)]
struct ScheduleRequest<'a> {
    time: &'a str,
}

/// Availability lookup and appointment booking against the scheduling backend.
#[async_trait]
pub trait SchedulerBackend: Send + Sync {
    async fn get_availability(&self) -> Result<String, SchedulerError>;
    async fn schedule_appointment(&self, time_text: &str) -> Result<String, SchedulerError>;
}

/// Client for the practice scheduling backend.
#[derive(Clone)]
pub struct SchedulerClient {
    base_url: String,
    client: reqwest::Client,
}

impl SchedulerClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl SchedulerBackend for SchedulerClient {
    /// GET /availability — textual description of open slots.
    async fn get_availability(&self) -> Result<String, SchedulerError> {
        let url = format!("{}/availability", self.base_url);
        let res = self.client.get(&url).send().await?;
        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(SchedulerError::Api(format!("{} {}", status, body)));
        }
        Ok(res.text().await?)
    }

    /// POST /schedule — textual confirmation or rejection for the given time text.
    async fn schedule_appointment(&self, time_text: &str) -> Result<String, SchedulerError> {
        let url = format!("{}/schedule", self.base_url);
        let res = self
            .client
            .post(&url)
            .json(&ScheduleRequest { time: time_text })
            .send()
            .await?;
        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(SchedulerError::Api(format!("{} {}", status, body)));
        }
        Ok(res.text().await?)
    }
}
