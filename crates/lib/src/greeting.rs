//! Member-join greeting: welcome each newly joined participant except the bot
//! itself. Stateless; no memory of who was greeted before.

use crate::channels::ChannelAccount;

/// Welcome message sent once per newly joined member.
pub const WELCOME_TEXT: &str = "Hello! I am the dental practice virtual assistant. \
Ask me for available appointment slots, book an appointment, \
or ask a question about the practice.";

/// Newly joined members that should be greeted: everyone whose id differs from
/// the bot's own.
pub fn welcome_targets<'a>(
    members_added: &'a [ChannelAccount],
    recipient_id: Option<&str>,
) -> Vec<&'a ChannelAccount> {
    members_added
        .iter()
        .filter(|member| member.id.as_deref() != recipient_id)
        .collect()
}
