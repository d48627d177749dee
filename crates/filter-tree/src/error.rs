//! Error types for tree decoding and structural edits.

use thiserror::Error;

/// A specialized Result type for filter tree operations.
pub type FilterResult<T> = Result<T, FilterError>;

/// Errors that can occur while decoding or editing a filter tree.
///
/// Validation problems and evaluation anomalies are not errors: the validator
/// reports them as data and the evaluator fails open.
#[derive(Debug, Error)]
pub enum FilterError {
    /// The input was not well-formed JSON.
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// A condition was requested but the schema has no fields to seed it with.
    #[error("schema has no fields to build a condition from")]
    EmptySchema,

    /// A field name was not found in the schema.
    #[error("{}", format_unknown_field(.name, .suggestion.as_deref()))]
    UnknownField {
        /// The name that was looked up.
        name: String,
        /// The closest schema field name, if any is close enough.
        suggestion: Option<String>,
    },

    /// A child index was past the end of a group's children.
    #[error("child index {index} out of range (group has {len} children)")]
    IndexOutOfRange {
        /// The requested index.
        index: usize,
        /// The number of children in the group.
        len: usize,
    },

    /// A group edit was addressed to a condition.
    #[error("node at '{path}' is not a group")]
    NotAGroup {
        /// Path of the offending node.
        path: String,
    },

    /// A condition edit was addressed to a group.
    #[error("node at '{path}' is not a condition")]
    NotACondition {
        /// Path of the offending node.
        path: String,
    },

    /// A node path could not be parsed.
    #[error("invalid node path: {input}")]
    InvalidPath {
        /// The unparseable input.
        input: String,
    },
}

impl FilterError {
    /// Creates an unknown field error.
    pub fn unknown_field(name: impl Into<String>, suggestion: Option<String>) -> Self {
        FilterError::UnknownField {
            name: name.into(),
            suggestion,
        }
    }

    /// Creates a not-a-group error.
    pub fn not_a_group(path: impl ToString) -> Self {
        FilterError::NotAGroup {
            path: path.to_string(),
        }
    }

    /// Creates a not-a-condition error.
    pub fn not_a_condition(path: impl ToString) -> Self {
        FilterError::NotACondition {
            path: path.to_string(),
        }
    }

    /// Creates an invalid path error.
    pub fn invalid_path(input: impl Into<String>) -> Self {
        FilterError::InvalidPath {
            input: input.into(),
        }
    }
}

fn format_unknown_field(name: &str, suggestion: Option<&str>) -> String {
    let base = format!("unknown field '{}'", name);
    match suggestion {
        Some(s) => format!("{} Did you mean '{}'?", base, s),
        None => base,
    }
}
