//! Report metadata: one archived incident conversation.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Metadata for an archived incident report.
///
/// The conversation itself is stored separately in `transcript.jsonl` and
/// linked by `id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub id: Uuid,

    /// When the composing session opened.
    pub opened_at: Timestamp,

    /// When the session was closed and archived.
    pub closed_at: Timestamp,

    /// Number of messages in the transcript, greeting included.
    pub message_count: usize,
}
