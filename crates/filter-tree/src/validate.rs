//! Structural validation of canonical trees.
//!
//! Validation never fails and never fixes anything: it walks the whole tree
//! and reports every condition whose value does not fit its operator.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ast::{ConditionNode, ConditionOperator, GroupNode, Node};

/// A problem found on one condition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    /// Id of the offending condition.
    pub id: String,
    pub message: String,
}

/// Outcome of validating a tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    /// True exactly when `errors` is empty.
    pub valid: bool,
    /// Errors in pre-order, children in order.
    pub errors: Vec<ValidationError>,
}

/// Validates every condition in the tree against its operator's rule.
///
/// | operator | rule |
/// |---|---|
/// | `between` | value is an array of exactly two elements |
/// | `in` | value is a non-empty array |
/// | `is_null`, `is_not_null` | no value at all (`null`, `false`, `0` and `""` all count as a value) |
///
/// Groups never produce errors themselves.
pub fn validate_tree(tree: &GroupNode) -> ValidationResult {
    let mut errors = Vec::new();
    walk(tree, &mut errors);
    ValidationResult {
        valid: errors.is_empty(),
        errors,
    }
}

fn walk(group: &GroupNode, errors: &mut Vec<ValidationError>) {
    for child in &group.children {
        match child {
            Node::Group(group) => walk(group, errors),
            Node::Condition(condition) => {
                if let Some(message) = check_condition(condition) {
                    errors.push(ValidationError {
                        id: condition.id.clone(),
                        message,
                    });
                }
            }
        }
    }
}

/// Returns the error message for a condition, if it breaks its rule.
pub fn check_condition(condition: &ConditionNode) -> Option<String> {
    let value = condition.value.as_ref();
    match &condition.operator {
        ConditionOperator::Between => match value {
            Some(Value::Array(items)) if items.len() == 2 => None,
            _ => Some("'between' requires exactly two values".to_string()),
        },
        ConditionOperator::In => match value {
            Some(Value::Array(items)) if !items.is_empty() => None,
            _ => Some("'in' requires an array of values".to_string()),
        },
        op @ (ConditionOperator::IsNull | ConditionOperator::IsNotNull) => {
            value.map(|_| format!("{} should not have a value", op))
        }
        _ => None,
    }
}

impl GroupNode {
    /// Validates this tree.
    pub fn validate(&self) -> ValidationResult {
        validate_tree(self)
    }
}
