//! Event and batch formatting.
//!
//! - [`ConsoleFormatter`]    one ANSI-coloured line per event
//! - [`JsonBatchFormatter`]  chat-webhook JSON per batch (feature `json`)

mod console;
#[cfg(feature = "json")]
mod json;

pub use console::ConsoleFormatter;
#[cfg(feature = "json")]
pub use json::{Attachment, ChatMessage, Field, JsonBatchFormatter};
