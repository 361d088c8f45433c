//! Formatting utilities (Telegram HTML escaping, JSON dumps).

use serde_json::Value;

/// Escape HTML special characters for Telegram HTML parse mode.
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Two-space indented JSON, non-ASCII kept as-is, keys in received order.
pub fn pretty_json(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

/// Pretty JSON wrapped in a `<pre>` block, safe for HTML parse mode.
pub fn json_pre_block(value: &Value) -> String {
    format!("<pre>{}</pre>", escape_html(&pretty_json(value)))
}
