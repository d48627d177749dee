//! Common helper functions for output formatting.

use serde_json::Value;

/// Number of id characters shown in text output.
const ID_DISPLAY_LEN: usize = 8;

/// Truncates an id for display.
pub fn truncate_id(id: &str) -> String {
    id.chars().take(ID_DISPLAY_LEN).collect()
}

/// Truncates a string to a maximum number of characters.
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() > max_len {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    } else {
        s.to_string()
    }
}

/// Formats a condition value as compact JSON, or an empty string when absent.
pub fn format_value(value: Option<&Value>, max_len: usize) -> String {
    match value {
        Some(value) => truncate_str(&value.to_string(), max_len),
        None => String::new(),
    }
}
