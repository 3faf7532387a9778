//! Chat channel contract.
//!
//! Inbound activities arrive on the gateway webhook; replies go back through
//! the connector to the conversation named in the activity.

mod activity;
mod connector;

pub use activity::{Activity, ChannelAccount, Conversation, ACTIVITY_CONVERSATION_UPDATE, ACTIVITY_MESSAGE};
pub use connector::{ConnectorClient, ConnectorError};
