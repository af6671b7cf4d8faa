//! Inbound payload resolution.
//!
//! Payloads arrive either as a loosely-structured JSON object or as raw text.
//! No schema is enforced: every field is optional and resolution falls back
//! through a chain of legacy aliases, so malformed input can never fail a
//! request.

use regex::Regex;
use serde_json::{Map, Value};
use std::sync::LazyLock;

pub const DEFAULT_TITLE: &str = "PushMe通知";

const TITLE_ALIASES: [&str; 2] = ["title", "Title"];
const CONTENT_ALIASES: [&str; 5] = ["content", "Content", "message", "desp", "text"];

/// One or more blank lines; blank means empty or horizontal whitespace only.
static BLANK_LINE_GROUP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n[ \t]*\n(?:[ \t]*\n)*").unwrap());

#[derive(Debug, Clone)]
pub enum InboundPayload {
    Structured(Map<String, Value>),
    Text(String),
}

impl InboundPayload {
    /// Classify a raw request body.
    ///
    /// A body decoding to a JSON object is structured; a body decoding to a
    /// JSON string is treated as raw text (the decoded string). Anything else,
    /// including bodies that are not JSON at all, is raw text verbatim.
    pub fn from_body(body: &str) -> Self {
        match serde_json::from_str::<Value>(body) {
            Ok(Value::Object(map)) => Self::Structured(map),
            Ok(Value::String(text)) => Self::Text(text),
            _ => Self::Text(body.to_string()),
        }
    }

    /// First present title alias, else the default placeholder.
    pub fn title(&self) -> String {
        match self {
            Self::Structured(map) => TITLE_ALIASES
                .iter()
                .filter_map(|key| map.get(*key))
                .find_map(title_value)
                .unwrap_or_else(|| DEFAULT_TITLE.to_string()),
            Self::Text(text) => split_blank_line(text)
                .0
                .unwrap_or_else(|| DEFAULT_TITLE.to_string()),
        }
    }

    /// First present content alias, else empty. Structured values are
    /// serialized to their compact JSON text.
    pub fn content(&self) -> String {
        match self {
            Self::Structured(map) => CONTENT_ALIASES
                .iter()
                .filter_map(|key| map.get(*key))
                .find_map(content_value)
                .unwrap_or_default(),
            Self::Text(text) => split_blank_line(text).1,
        }
    }
}

// Present means a non-empty string; nulls and empty strings fall through to
// the next alias in the chain.
fn title_value(value: &Value) -> Option<String> {
    value
        .as_str()
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn content_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => (!s.is_empty()).then(|| s.clone()),
        other => Some(other.to_string()),
    }
}

/// Split raw text on the first blank-line group: the first segment becomes
/// the title, the remaining segments are re-joined with newlines as content.
/// With no blank-line separator the whole text is content and the title stays
/// default (`None`).
fn split_blank_line(text: &str) -> (Option<String>, String) {
    let segments: Vec<&str> = BLANK_LINE_GROUP.split(text).collect();
    if segments.len() < 2 {
        return (None, text.to_string());
    }

    let title = segments[0].trim();
    let content = segments[1..].join("\n");
    if title.is_empty() {
        (None, content)
    } else {
        (Some(title.to_string()), content)
    }
}
