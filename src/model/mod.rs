//! Core data model for Aegis.
//!
//! These types represent the conceptual architecture:
//! incident reports and the conversation messages they are made of.

mod message;
mod report;

pub use message::{Message, MessageOrigin, now_label};
pub use report::Report;
