//! Inbound activity payload: one message or conversation-update event from the
//! chat channel, with the identifiers needed to address the reply.

use serde::Deserialize;

/// Activity type for a user message.
pub const ACTIVITY_MESSAGE: &str = "message";
/// Activity type for membership changes (carries `membersAdded`).
pub const ACTIVITY_CONVERSATION_UPDATE: &str = "conversationUpdate";

/// One inbound channel activity. All fields beyond the type are optional on
/// the wire; accessors below tolerate anything missing.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    #[serde(rename = "type")]
    pub activity_type: String,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub from: Option<ChannelAccount>,
    #[serde(default)]
    pub recipient: Option<ChannelAccount>,
    #[serde(default)]
    pub members_added: Option<Vec<ChannelAccount>>,
    #[serde(default)]
    pub conversation: Option<Conversation>,
    #[serde(default)]
    pub service_url: Option<String>,
}

impl Activity {
    /// Trimmed utterance text, when present and non-empty.
    pub fn utterance(&self) -> Option<&str> {
        self.text.as_deref().map(str::trim).filter(|t| !t.is_empty())
    }

    pub fn conversation_id(&self) -> Option<&str> {
        self.conversation.as_ref()?.id.as_deref()
    }

    /// The bot's own id on this channel.
    pub fn recipient_id(&self) -> Option<&str> {
        self.recipient.as_ref()?.id.as_deref()
    }
}

/// A channel participant (user or bot).
#[derive(Debug, Clone, Deserialize)]
pub struct ChannelAccount {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Conversation {
    #[serde(default)]
    pub id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_message_activity() {
        let activity: Activity = serde_json::from_str(
            r#"{
                "type": "message",
                "id": "msg-1",
                "text": "  What are your hours?  ",
                "from": { "id": "user-1", "name": "Pat" },
                "recipient": { "id": "bot-1" },
                "conversation": { "id": "conv-1" },
                "serviceUrl": "https://channel.example.com"
            }"#,
        )
        .expect("parse activity");

        assert_eq!(activity.activity_type, ACTIVITY_MESSAGE);
        assert_eq!(activity.utterance(), Some("What are your hours?"));
        assert_eq!(activity.conversation_id(), Some("conv-1"));
        assert_eq!(activity.recipient_id(), Some("bot-1"));
        assert_eq!(activity.service_url.as_deref(), Some("https://channel.example.com"));
    }

    #[test]
    fn parses_conversation_update() {
        let activity: Activity = serde_json::from_str(
            r#"{
                "type": "conversationUpdate",
                "membersAdded": [ { "id": "user-1" }, { "id": "bot-1" } ],
                "recipient": { "id": "bot-1" },
                "conversation": { "id": "conv-1" },
                "serviceUrl": "https://channel.example.com"
            }"#,
        )
        .expect("parse activity");

        assert_eq!(activity.activity_type, ACTIVITY_CONVERSATION_UPDATE);
        let members = activity.members_added.as_deref().expect("members");
        assert_eq!(members.len(), 2);
        assert!(activity.utterance().is_none());
    }

    #[test]
    fn blank_text_is_not_an_utterance() {
        let activity: Activity =
            serde_json::from_str(r#"{ "type": "message", "text": "   " }"#).expect("parse");
        assert!(activity.utterance().is_none());
    }
}
