//! Validation result output formatting.

use filter_tree_rs::{GroupNode, ValidationResult};
use owo_colors::OwoColorize;

use super::helpers::truncate_id;

/// Formats a validation result as JSON (`{"valid", "errors": [{"id", "message"}]}`).
pub fn format_validation_json(result: &ValidationResult) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(result)
}

/// Formats a validation result as text, one error per line keyed by node path.
pub fn format_validation_table(
    result: &ValidationResult,
    tree: &GroupNode,
    use_colors: bool,
) -> String {
    if result.valid {
        let line = "Tree is valid.";
        return if use_colors {
            format!("{}\n", line.green())
        } else {
            format!("{}\n", line)
        };
    }

    let mut output = String::new();
    let header = format!("{:<10} {:<10} {}", "Path", "ID", "Problem");
    if use_colors {
        output.push_str(&format!("{}\n", header.dimmed()));
    } else {
        output.push_str(&header);
        output.push('\n');
    }

    for error in &result.errors {
        let path = tree
            .path_of(&error.id)
            .map(|p| p.to_string())
            .unwrap_or_else(|| "?".to_string());
        let message = if use_colors {
            error.message.red().to_string()
        } else {
            error.message.clone()
        };
        output.push_str(&format!(
            "{:<10} {:<10} {}\n",
            path,
            truncate_id(&error.id),
            message
        ));
    }

    output
}
