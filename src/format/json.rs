//! # Chat-webhook JSON formatter.
//!
//! Renders a [`Batch`] into a Slack-style message: a headline for the most
//! severe entry plus one attachment per (collapsed) entry.
//!
//! ```text
//! {
//!   "username": "billing-prod",
//!   "text": "*ERROR* charge 42 failed [com.example.Billing] (+3 more)",
//!   "attachments": [
//!     { "color": "danger", "title": "ERROR charge 42 failed", "footer": "com.example.Billing",
//!       "ts": 1714572207, "repeats": 2, "fields": [{ "title": "user", "value": "alice", "short": true }] },
//!     ...
//!   ]
//! }
//! ```
//!
//! Transports post the result of [`JsonBatchFormatter::to_payload`].

use serde::Serialize;

use crate::batch::{Batch, BatchEntry};
use crate::error::DeliveryError;
use crate::event::Level;

/// Top-level webhook message.
#[derive(Clone, Debug, Serialize)]
pub struct ChatMessage {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon_emoji: Option<String>,
    pub text: String,
    pub attachments: Vec<Attachment>,
}

/// One collapsed batch entry.
#[derive(Clone, Debug, Serialize)]
pub struct Attachment {
    pub color: &'static str,
    pub title: String,
    pub level: Level,
    pub footer: String,
    pub ts: i64,
    #[serde(skip_serializing_if = "is_single")]
    pub repeats: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marker: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<Field>,
}

/// Key/value shown under an attachment.
#[derive(Clone, Debug, Serialize)]
pub struct Field {
    pub title: String,
    pub value: String,
    pub short: bool,
}

fn is_single(n: &usize) -> bool {
    *n == 1
}

/// Builds [`ChatMessage`]s from batches.
#[derive(Clone, Debug, Default)]
pub struct JsonBatchFormatter {
    username: Option<String>,
    channel: Option<String>,
    icon_emoji: Option<String>,
    included_mdc_keys: Option<Vec<String>>,
}

impl JsonBatchFormatter {
    /// Formatter with no username, channel or icon.
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    #[inline]
    pub fn with_channel(mut self, channel: impl Into<String>) -> Self {
        self.channel = Some(channel.into());
        self
    }

    #[inline]
    pub fn with_icon_emoji(mut self, emoji: impl Into<String>) -> Self {
        self.icon_emoji = Some(emoji.into());
        self
    }

    /// Only show these context keys as fields (all keys when unset).
    #[inline]
    pub fn with_included_mdc_keys<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.included_mdc_keys = Some(keys.into_iter().map(Into::into).collect());
        self
    }

    /// Builds the message for `batch`.
    pub fn message(&self, batch: &Batch) -> ChatMessage {
        let entries = batch.entries();
        let text = match batch.main_entry() {
            Some(main) => {
                let mut text = format!(
                    "*{}* {} [{}]",
                    main.event.level,
                    main.event.message(),
                    main.event.logger
                );
                let others = batch.len() - main.repeats;
                if others > 0 {
                    text.push_str(&format!(" (+{others} more)"));
                }
                text
            }
            None => String::new(),
        };

        ChatMessage {
            username: self.username.clone(),
            channel: self.channel.clone(),
            icon_emoji: self.icon_emoji.clone(),
            text,
            attachments: entries.iter().map(|e| self.attachment(e)).collect(),
        }
    }

    /// Serialized message, ready to post.
    pub fn to_payload(&self, batch: &Batch) -> Result<String, DeliveryError> {
        serde_json::to_string(&self.message(batch)).map_err(|e| DeliveryError::Format {
            reason: e.to_string(),
        })
    }

    fn attachment(&self, entry: &BatchEntry<'_>) -> Attachment {
        let ev = entry.event;
        let fields = ev
            .mdc
            .iter()
            .filter(|(k, _)| match &self.included_mdc_keys {
                Some(keys) => keys.iter().any(|inc| inc == *k),
                None => true,
            })
            .map(|(k, v)| Field {
                title: k.clone(),
                value: v.clone(),
                short: true,
            })
            .collect();

        Attachment {
            color: color(ev.level),
            title: format!("{} {}", ev.level, ev.message()),
            level: ev.level,
            footer: ev.logger.to_string(),
            ts: entry.last.timestamp.timestamp(),
            repeats: entry.repeats,
            marker: ev.marker.as_ref().map(|m| m.name().to_string()),
            error: ev.error.as_ref().map(|e| e.to_string()),
            fields,
        }
    }
}

fn color(level: Level) -> &'static str {
    match level {
        Level::Error => "danger",
        Level::Warn => "warning",
        Level::Info => "good",
        Level::Debug | Level::Trace => "#cccccc",
    }
}
