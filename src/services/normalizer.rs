//! Message normalization pipeline.
//!
//! Converts an arbitrary, loosely-structured notification payload into a
//! bounded, human-readable message. Every malformed-input branch degrades to
//! a best-effort string: normalization must never fail the request.

use crate::models::InboundPayload;
use regex::Regex;
use std::sync::LazyLock;

const TITLE_MAX_CHARS: usize = 60;
const TITLE_CUT_CHARS: usize = 57;
const LINE_MAX_CHARS: usize = 120;
const MAX_CONTENT_LINES: usize = 3;
const MESSAGE_MAX_CHARS: usize = 1500;
const MESSAGE_CUT_CHARS: usize = 1497;

const ELLIPSIS: &str = "...";
const SEPARATOR: &str = "───────────────";
const WRAPPER_PREFIX: &str = "{\"content\":\"";
const SOURCE_LINK_MARKER: &str = "原文链接";

static WEIBO_LEAK_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"【微博线报[^】]*】").unwrap());
static WHITESPACE_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());
static FENCE_OPEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^```(?:json|text)?\s*").unwrap());
static FENCE_CLOSE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)```$").unwrap());
static URL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"https?://\S+").unwrap());

/// A normalized message: the cleaned title travels as the outbound `Title`
/// header, the assembled body as the push payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormattedMessage {
    pub title: String,
    pub body: String,
}

/// Normalize an inbound payload into a display message of at most 1500 chars.
pub fn normalize(payload: &InboundPayload) -> FormattedMessage {
    let title = clean_title(&payload.title());
    let content = unwrap_content(payload.content());

    // The link is taken from the unwrapped content, before un-escaping and
    // line filtering can disturb it.
    let link = URL.find(&content).map(|m| m.as_str().to_string());
    let lines = select_lines(&strip_fences(&unescape(&content)));

    let mut body = format!("📢 {title}\n{SEPARATOR}");
    if !lines.is_empty() {
        body.push('\n');
        body.push_str(&lines.join("\n"));
    }
    if let Some(link) = link {
        body.push_str("\n\n🔗 ");
        body.push_str(&link);
    }

    FormattedMessage {
        title,
        body: truncate_chars(&body, MESSAGE_MAX_CHARS, MESSAGE_CUT_CHARS),
    }
}

/// Strip boundary brackets and leak tags, collapse whitespace, cap at 60
/// chars. The leading `【` and trailing `】` are each stripped independently.
fn clean_title(raw: &str) -> String {
    let stripped = raw.strip_prefix('【').unwrap_or(raw);
    let stripped = stripped.strip_suffix('】').unwrap_or(stripped);
    let cleaned = WEIBO_LEAK_TAG.replace_all(stripped, "");
    let cleaned = WHITESPACE_RUN.replace_all(&cleaned, " ");
    truncate_chars(cleaned.trim(), TITLE_MAX_CHARS, TITLE_CUT_CHARS)
}

/// Unwrap a JSON-encoded `{"content":"..."}` wrapper. Tries a structured
/// parse first; on failure falls back to literal prefix/suffix stripping.
fn unwrap_content(content: String) -> String {
    if !content.starts_with(WRAPPER_PREFIX) {
        return content;
    }

    match serde_json::from_str::<serde_json::Value>(&content) {
        Ok(parsed) => match parsed.get("content").and_then(serde_json::Value::as_str) {
            Some(inner) if !inner.is_empty() => inner.to_string(),
            _ => content,
        },
        Err(_) => {
            let stripped = content.strip_prefix(WRAPPER_PREFIX).unwrap_or(&content);
            stripped.strip_suffix("\"}").unwrap_or(stripped).to_string()
        }
    }
}

fn unescape(text: &str) -> String {
    text.replace("\\n", "\n").replace("\\\"", "\"")
}

fn strip_fences(text: &str) -> String {
    let opened = FENCE_OPEN.replace_all(text, "");
    FENCE_CLOSE.replace_all(&opened, "").trim().to_string()
}

/// First 3 lines that are non-empty and not metadata (`---` rules, source
/// link markers), each trimmed and cut to 120 chars.
fn select_lines(content: &str) -> Vec<String> {
    content
        .split('\n')
        .map(str::trim)
        .filter(|line| {
            !line.is_empty() && !line.starts_with("---") && !line.starts_with(SOURCE_LINK_MARKER)
        })
        .take(MAX_CONTENT_LINES)
        .map(|line| line.chars().take(LINE_MAX_CHARS).collect())
        .collect()
}

fn truncate_chars(text: &str, max: usize, cut: usize) -> String {
    if text.chars().count() > max {
        let mut truncated: String = text.chars().take(cut).collect();
        truncated.push_str(ELLIPSIS);
        truncated
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DEFAULT_TITLE;
    use serde_json::{json, Value};

    fn normalize_json(value: Value) -> FormattedMessage {
        let map = match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        };
        normalize(&InboundPayload::Structured(map))
    }

    #[test]
    fn missing_content_yields_title_and_separator_only() {
        let message = normalize_json(json!({"title": "Ping"}));
        assert_eq!(message.body, format!("📢 Ping\n{SEPARATOR}"));
    }

    #[test]
    fn empty_payload_uses_default_title() {
        let message = normalize_json(json!({}));
        assert_eq!(message.title, DEFAULT_TITLE);
        assert_eq!(message.body, format!("📢 {DEFAULT_TITLE}\n{SEPARATOR}"));
    }

    #[test]
    fn long_title_truncates_to_57_chars_plus_ellipsis() {
        let title = "x".repeat(70);
        let message = normalize_json(json!({"title": title}));
        assert_eq!(message.title.chars().count(), 60);
        assert_eq!(message.title, format!("{}...", "x".repeat(57)));
    }

    #[test]
    fn title_at_limit_is_untouched() {
        let title = "y".repeat(60);
        let message = normalize_json(json!({"title": title.clone()}));
        assert_eq!(message.title, title);
    }

    #[test]
    fn boundary_brackets_are_stripped_independently() {
        assert_eq!(normalize_json(json!({"title": "【公告】"})).title, "公告");
        assert_eq!(normalize_json(json!({"title": "【公告"})).title, "公告");
        assert_eq!(normalize_json(json!({"title": "公告】"})).title, "公告");
        // Inner brackets survive.
        assert_eq!(
            normalize_json(json!({"title": "a【b】c"})).title,
            "a【b】c"
        );
    }

    #[test]
    fn weibo_leak_tag_is_removed_from_title() {
        let message = normalize_json(json!({"title": "每日推送【微博线报0806】重要更新"}));
        assert_eq!(message.title, "每日推送重要更新");
    }

    #[test]
    fn title_whitespace_runs_collapse() {
        let message = normalize_json(json!({"title": "  big \t\n news  "}));
        assert_eq!(message.title, "big news");
    }

    #[test]
    fn line_filter_drops_rules_and_source_links_then_caps_at_three() {
        let content = "line1\n---\n原文链接: x\nline2\nline3\nline4";
        let message = normalize_json(json!({"content": content}));
        assert_eq!(
            message.body,
            format!("📢 {DEFAULT_TITLE}\n{SEPARATOR}\nline1\nline2\nline3")
        );
    }

    #[test]
    fn long_lines_are_cut_to_120_chars() {
        let long = "z".repeat(200);
        let message = normalize_json(json!({"content": long}));
        let last = message.body.split('\n').last().unwrap();
        assert_eq!(last.chars().count(), 120);
    }

    #[test]
    fn link_line_is_appended_after_blank_line() {
        let message =
            normalize_json(json!({"content": "check this https://example.com/a today"}));
        assert!(message.body.ends_with("\n\n🔗 https://example.com/a"));
    }

    #[test]
    fn first_link_wins() {
        let content = "https://first.example.com/x\nhttps://second.example.com/y";
        let message = normalize_json(json!({"content": content}));
        assert!(message.body.ends_with("\n\n🔗 https://first.example.com/x"));
    }

    #[test]
    fn oversized_message_truncates_to_1497_chars_plus_ellipsis() {
        let link = format!("https://example.com/{}", "a".repeat(1600));
        let message = normalize_json(json!({"content": link}));
        assert_eq!(message.body.chars().count(), 1500);
        assert!(message.body.ends_with(ELLIPSIS));
    }

    #[test]
    fn wrapped_content_is_unwrapped_via_json_parse() {
        let message = normalize_json(json!({"content": "{\"content\":\"nested\"}"}));
        assert_eq!(
            message.body,
            format!("📢 {DEFAULT_TITLE}\n{SEPARATOR}\nnested")
        );
    }

    #[test]
    fn broken_wrapper_falls_back_to_prefix_stripping() {
        let message = normalize_json(json!({"content": "{\"content\":\"broken"}));
        assert_eq!(
            message.body,
            format!("📢 {DEFAULT_TITLE}\n{SEPARATOR}\nbroken")
        );
    }

    #[test]
    fn escaped_newlines_become_line_breaks() {
        let message = normalize_json(json!({"content": "one\\ntwo\\nthree\\nfour"}));
        assert_eq!(
            message.body,
            format!("📢 {DEFAULT_TITLE}\n{SEPARATOR}\none\ntwo\nthree")
        );
    }

    #[test]
    fn escaped_quotes_are_unescaped() {
        let message = normalize_json(json!({"content": "say \\\"hi\\\""}));
        assert!(message.body.ends_with("say \"hi\""));
    }

    #[test]
    fn code_fences_are_stripped() {
        let message = normalize_json(json!({"content": "```json\n{\"a\": 1}\n```"}));
        assert_eq!(
            message.body,
            format!("📢 {DEFAULT_TITLE}\n{SEPARATOR}\n{{\"a\": 1}}")
        );
    }

    #[test]
    fn structured_content_object_is_rendered_as_json_line() {
        let message = normalize_json(json!({"content": {"event": "deploy"}}));
        assert_eq!(
            message.body,
            format!("📢 {DEFAULT_TITLE}\n{SEPARATOR}\n{{\"event\":\"deploy\"}}")
        );
    }

    #[test]
    fn plain_text_payload_splits_title_and_body() {
        let payload =
            InboundPayload::from_body("My Title\n\nBody line one\nBody line two");
        let message = normalize(&payload);
        assert_eq!(message.title, "My Title");
        assert_eq!(
            message.body,
            format!("📢 My Title\n{SEPARATOR}\nBody line one\nBody line two")
        );
    }
}
