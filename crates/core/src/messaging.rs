//! Reply and quick-message rules for the inbox.

use crate::types::DbId;

pub const QUICK_MESSAGE_SUBJECT: &str = "Quick Message";

const REPLY_PREFIX: &str = "Re: ";

/// Prefix `Re: ` once; replying to a reply keeps a single prefix.
pub fn reply_subject(original: &str) -> String {
    if original.starts_with(REPLY_PREFIX) {
        original.to_string()
    } else {
        format!("{REPLY_PREFIX}{original}")
    }
}

/// A reply goes to whichever party of the original is not the replier.
pub fn reply_recipient(replier_id: DbId, sender_id: DbId, recipient_id: DbId) -> DbId {
    if replier_id == sender_id {
        recipient_id
    } else {
        sender_id
    }
}

/// The other participant of a message, from `user_id`'s point of view.
pub fn conversation_partner(user_id: DbId, sender_id: DbId, recipient_id: DbId) -> DbId {
    reply_recipient(user_id, sender_id, recipient_id)
}

/// Notification body for a newly received message.
pub fn new_message_notice(sender_name: &str, subject: &str) -> String {
    format!("You have received a new message from {sender_name}: {subject}")
}
