//! Message types: the units of an incident conversation.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::media::MediaUri;

/// A single message in an incident conversation.
///
/// Immutable once appended to a conversation. The image reference, when
/// present, is borrowed from the media picker — the conversation never
/// mutates or deletes the asset it names.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: Uuid,

    /// Who produced the message.
    pub origin: MessageOrigin,

    /// Body text. Empty only when an image is attached.
    pub text: String,

    /// Opaque URI of an attached image, if any.
    pub image: Option<MediaUri>,

    /// Local wall-clock label captured when the message was appended.
    pub timestamp: String,
}

/// Distinguishes the reporter's own messages from scripted ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageOrigin {
    User,
    System,
}

/// The current local time as a short display label, e.g. `14:32`.
pub fn now_label() -> String {
    jiff::Zoned::now().strftime("%H:%M").to_string()
}
