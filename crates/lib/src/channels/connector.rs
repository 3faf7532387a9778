//! Outbound connector: deliver one text message back to the channel
//! conversation named in the inbound activity.

use serde::Serialize;

#[derive(Debug, thiserror::Error)]
pub enum ConnectorError {
    #[error("connector request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("connector api error: {0}")]
    Api(String),
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct OutgoingActivity<'a> {
    #[serde(rename = "type")]
    activity_type: &'a str,
    id: String,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_to_id: Option<&'a str>,
}

/// Sends message activities to a conversation on the channel's service host.
#[derive(Clone, Default)]
pub struct ConnectorClient {
    client: reqwest::Client,
}

impl ConnectorClient {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    /// POST /v3/conversations/{id}/activities with a plain text message.
    pub async fn send_text(
        &self,
        service_url: &str,
        conversation_id: &str,
        text: &str,
        reply_to_id: Option<&str>,
    ) -> Result<(), ConnectorError> {
        let url = format!(
            "{}/v3/conversations/{}/activities",
            service_url.trim_end_matches('/'),
            conversation_id
        );
        let body = OutgoingActivity {
            activity_type: "message",
            id: format!("act-{}", uuid::Uuid::new_v4()),
            text,
            reply_to_id,
        };
        let res = self.client.post(&url).json(&body).send().await?;
        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(ConnectorError::Api(format!("{} {}", status, body)));
        }
        Ok(())
    }
}
