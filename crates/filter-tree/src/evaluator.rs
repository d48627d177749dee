//! Filter evaluation against in-memory records.
//!
//! This module provides the [`FilterEvaluator`] for applying a wire-format
//! tree to JSON records, plus the free functions it is built from. Trees
//! can be evaluated decoded ([`TreeNode`]) or as raw JSON; the two only
//! differ on malformed nodes, see [`evaluate_json_group`].
//!
//! Evaluation fails open: a condition with no field or no value, or with an
//! operator that is not recognized, matches every record. A half-edited
//! filter never hides data.
//!
//! # Example
//!
//! ```
//! use filter_tree_rs::{apply_filter, Record, TreeNode};
//! use serde_json::json;
//!
//! let tree = TreeNode::from_json(&json!({
//!     "and": [{"field": "age", "operator": "gt", "value": 30}]
//! }));
//!
//! let records: Vec<Record> = vec![
//!     json!({"age": 25}).as_object().unwrap().clone(),
//!     json!({"age": 45}).as_object().unwrap().clone(),
//! ];
//!
//! let matched = apply_filter(&records, Some(&tree));
//! assert_eq!(matched.len(), 1);
//! assert_eq!(matched[0]["age"], json!(45));
//! ```

use std::cmp::Ordering;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::{Map, Number, Value};
use tracing::{debug, trace};

use crate::ast::{ConditionOperator, GroupNode, LogicalOperator};
use crate::wire::{ConditionTreeNode, TreeNode};

/// A record filtered by the evaluator: a JSON object keyed by field name.
pub type Record = Map<String, Value>;

/// Naive date-time layouts accepted by `before`/`after`, read as UTC.
const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Tree an evaluator runs: decoded, or the raw wire JSON.
#[derive(Debug, Clone, Copy)]
enum Source<'a> {
    Decoded(&'a TreeNode),
    Json(&'a Value),
}

/// Evaluates a wire-format tree against records.
///
/// An evaluator built without a tree matches everything.
#[derive(Debug, Clone, Copy)]
pub struct FilterEvaluator<'a> {
    tree: Option<Source<'a>>,
}

impl<'a> FilterEvaluator<'a> {
    /// Creates an evaluator for `tree`.
    pub fn new(tree: &'a TreeNode) -> Self {
        Self {
            tree: Some(Source::Decoded(tree)),
        }
    }

    /// Creates an evaluator from an optional tree.
    pub fn from_optional(tree: Option<&'a TreeNode>) -> Self {
        Self {
            tree: tree.map(Source::Decoded),
        }
    }

    /// Creates an evaluator over undecoded wire JSON.
    ///
    /// See [`evaluate_json_group`] for how this differs from evaluating the
    /// decoded [`TreeNode`].
    pub fn from_json(tree: &'a Value) -> Self {
        Self {
            tree: Some(Source::Json(tree)),
        }
    }

    /// Returns true if the record matches the tree.
    pub fn matches(&self, record: &Record) -> bool {
        match self.tree {
            None => true,
            Some(Source::Decoded(tree)) => evaluate_group(record, tree),
            Some(Source::Json(tree)) => evaluate_json_group(record, tree),
        }
    }

    /// Filters a slice of records, returning only those that match, in order.
    pub fn filter_records<'b>(&self, records: &'b [Record]) -> Vec<&'b Record> {
        let matched: Vec<&Record> = records.iter().filter(|r| self.matches(r)).collect();
        debug!(
            total = records.len(),
            matched = matched.len(),
            "applied filter"
        );
        matched
    }
}

/// Keeps every record for which the tree evaluates to true.
///
/// An absent tree keeps everything. The input is never modified and the
/// output preserves input order.
pub fn apply_filter<'b>(records: &'b [Record], tree: Option<&TreeNode>) -> Vec<&'b Record> {
    FilterEvaluator::from_optional(tree).filter_records(records)
}

/// Like [`apply_filter`], over undecoded wire JSON.
pub fn apply_filter_json<'b>(records: &'b [Record], tree: Option<&Value>) -> Vec<&'b Record> {
    match tree {
        Some(tree) => FilterEvaluator::from_json(tree).filter_records(records),
        None => FilterEvaluator::from_optional(None).filter_records(records),
    }
}

/// Applies a canonical tree by serializing it first.
pub fn apply_filter_tree<'b>(records: &'b [Record], tree: &GroupNode) -> Vec<&'b Record> {
    let wire = tree.to_wire();
    apply_filter(records, Some(&wire))
}

/// Evaluates a logical node.
///
/// `and` needs every child to match (vacuously true when empty); `or` needs
/// at least one (false when empty). A node without either key, i.e. a bare
/// condition handed in as a group, matches.
pub fn evaluate_group(record: &Record, node: &TreeNode) -> bool {
    match node {
        TreeNode::Logical {
            operator: LogicalOperator::And,
            children,
        } => children.iter().all(|child| evaluate_node(record, child)),
        TreeNode::Logical {
            operator: LogicalOperator::Or,
            children,
        } => children.iter().any(|child| evaluate_node(record, child)),
        TreeNode::Condition(_) => true,
    }
}

fn evaluate_node(record: &Record, node: &TreeNode) -> bool {
    match node {
        TreeNode::Logical { .. } => evaluate_group(record, node),
        TreeNode::Condition(condition) => evaluate_condition(record, condition),
    }
}

/// Evaluates undecoded wire JSON as a group.
///
/// Decoding keeps only one logical key per node, so this works on the raw
/// value instead. An object holding both keys is read as `and`, and `or` is
/// only consulted when `and` is missing or falsy (`null`, `false`, `0`,
/// `""`). A child with a truthy `field` is a condition even if it also has a
/// logical key. A logical key that is not an array has no children.
/// Anything that is not an object matches.
pub fn evaluate_json_group(record: &Record, node: &Value) -> bool {
    let Some(map) = node.as_object() else {
        return true;
    };

    if let Some(children) = map.get("and").filter(|v| is_truthy(v)) {
        return json_children(children).all(|child| evaluate_json_node(record, child));
    }
    if let Some(children) = map.get("or").filter(|v| is_truthy(v)) {
        return json_children(children).any(|child| evaluate_json_node(record, child));
    }
    true
}

fn evaluate_json_node(record: &Record, node: &Value) -> bool {
    match node.get("field").filter(|v| is_truthy(v)) {
        Some(field) => {
            let mut condition = ConditionTreeNode::from_json(node);
            if !field.is_string() {
                condition.field = to_text(Some(field));
            }
            evaluate_condition(record, &condition)
        }
        None => evaluate_json_group(record, node),
    }
}

fn json_children(value: &Value) -> std::slice::Iter<'_, Value> {
    value.as_array().map(Vec::as_slice).unwrap_or_default().iter()
}

/// Truthiness: `null`, `false`, zero, NaN and `""` are falsy.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Evaluates one condition against a record.
///
/// Conditions without a field or without a value match everything.
pub fn evaluate_condition(record: &Record, condition: &ConditionTreeNode) -> bool {
    let Some(expected) = condition.value.as_ref() else {
        return true;
    };
    if condition.field.is_empty() {
        return true;
    }

    let actual = record.get(&condition.field);
    trace!(
        field = %condition.field,
        operator = %condition.operator,
        ?actual,
        ?expected,
        "evaluating condition"
    );

    match &condition.operator {
        ConditionOperator::Eq => strict_equals(actual, expected),
        ConditionOperator::Neq => !strict_equals(actual, expected),
        ConditionOperator::Gt => to_number(actual) > to_number(Some(expected)),
        ConditionOperator::Lt => to_number(actual) < to_number(Some(expected)),
        ConditionOperator::Contains => {
            lowercase_text(actual).contains(&lowercase_text(Some(expected)))
        }
        ConditionOperator::StartsWith => {
            lowercase_text(actual).starts_with(&lowercase_text(Some(expected)))
        }
        ConditionOperator::EndsWith => {
            lowercase_text(actual).ends_with(&lowercase_text(Some(expected)))
        }
        ConditionOperator::In => match expected {
            Value::Array(candidates) => candidates.iter().any(|c| strict_equals(actual, c)),
            _ => false,
        },
        ConditionOperator::Between => match expected {
            Value::Array(bounds) => {
                let n = to_number(actual);
                n >= to_number(bounds.first()) && n <= to_number(bounds.get(1))
            }
            _ => false,
        },
        ConditionOperator::Before => compare_dates(actual, expected) == Some(Ordering::Less),
        ConditionOperator::After => compare_dates(actual, expected) == Some(Ordering::Greater),
        ConditionOperator::IsNull => is_nullish(actual),
        ConditionOperator::IsNotNull => !is_nullish(actual),
        ConditionOperator::Unknown(_) => true,
    }
}

// ==================== Coercions ====================

/// Strict equality. A missing field never equals a present value, numbers
/// compare by value, and arrays or objects are never strictly equal.
fn strict_equals(actual: Option<&Value>, expected: &Value) -> bool {
    match (actual, expected) {
        (Some(Value::Null), Value::Null) => true,
        (Some(Value::Bool(a)), Value::Bool(b)) => a == b,
        (Some(Value::String(a)), Value::String(b)) => a == b,
        (Some(Value::Number(a)), Value::Number(b)) => numbers_equal(a, b),
        _ => false,
    }
}

fn numbers_equal(a: &Number, b: &Number) -> bool {
    if let (Some(a), Some(b)) = (a.as_i64(), b.as_i64()) {
        return a == b;
    }
    if let (Some(a), Some(b)) = (a.as_u64(), b.as_u64()) {
        return a == b;
    }
    a.as_f64() == b.as_f64()
}

/// True for a missing field, `null`, or the empty string.
fn is_nullish(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.is_empty(),
        Some(_) => false,
    }
}

/// Numeric coercion: `null` is 0, booleans are 0/1, strings are parsed
/// after trimming (empty is 0), everything unparseable is NaN.
pub(crate) fn to_number(value: Option<&Value>) -> f64 {
    match value {
        None => f64::NAN,
        Some(Value::Null) => 0.0,
        Some(Value::Bool(b)) => {
            if *b {
                1.0
            } else {
                0.0
            }
        }
        Some(Value::Number(n)) => n.as_f64().unwrap_or(f64::NAN),
        Some(Value::String(s)) => parse_number(s),
        Some(Value::Array(_)) => parse_number(&to_text(value)),
        Some(Value::Object(_)) => f64::NAN,
    }
}

fn parse_number(input: &str) -> f64 {
    let s = input.trim();
    if s.is_empty() {
        return 0.0;
    }

    let radix = match s.get(..2) {
        Some("0x" | "0X") => Some(16),
        Some("0o" | "0O") => Some(8),
        Some("0b" | "0B") => Some(2),
        _ => None,
    };
    if let Some(radix) = radix {
        return u64::from_str_radix(&s[2..], radix)
            .map(|n| n as f64)
            .unwrap_or(f64::NAN);
    }

    match s {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }

    // Rust also accepts "inf" and "nan"; those are not numbers here.
    let numeric = s
        .bytes()
        .all(|b| b.is_ascii_digit() || matches!(b, b'+' | b'-' | b'.' | b'e' | b'E'));
    if !numeric {
        return f64::NAN;
    }
    s.parse().unwrap_or(f64::NAN)
}

/// Text coercion: a missing field is `"undefined"`, `null` is `"null"`,
/// integral numbers print without a fraction, arrays join with commas.
pub(crate) fn to_text(value: Option<&Value>) -> String {
    match value {
        None => "undefined".to_string(),
        Some(Value::Null) => "null".to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(Value::Number(n)) => format_number(n),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| match item {
                Value::Null => String::new(),
                other => to_text(Some(other)),
            })
            .collect::<Vec<_>>()
            .join(","),
        Some(Value::Object(_)) => "[object Object]".to_string(),
    }
}

fn lowercase_text(value: Option<&Value>) -> String {
    to_text(value).to_lowercase()
}

/// Plain decimal notation only covers magnitudes in `[1e-6, 1e21)`;
/// anything outside prints in exponent form (`1.5e-7`, `1e+21`).
fn format_number(n: &Number) -> String {
    if n.is_i64() || n.is_u64() {
        return n.to_string();
    }
    match n.as_f64() {
        Some(f) if f == 0.0 => "0".to_string(),
        Some(f) if f.abs() < 1e-6 || f.abs() >= 1e21 => format_exponent(f),
        Some(f) if f.fract() == 0.0 => format!("{:.0}", f),
        Some(f) => f.to_string(),
        None => n.to_string(),
    }
}

fn format_exponent(f: f64) -> String {
    let text = format!("{:e}", f);
    match text.split_once('e') {
        Some((mantissa, exponent)) if !exponent.starts_with('-') => {
            format!("{}e+{}", mantissa, exponent)
        }
        _ => text,
    }
}

/// Compares two values as dates. `None` when either side is not a date.
fn compare_dates(actual: Option<&Value>, expected: &Value) -> Option<Ordering> {
    let actual = to_date(actual)?;
    let expected = to_date(Some(expected))?;
    Some(actual.cmp(&expected))
}

/// Date coercion: numbers are epoch milliseconds, `null` is the epoch,
/// strings are RFC 3339, naive date-times (read as UTC), `YYYY-MM-DD`,
/// `YYYY-MM` or `YYYY`.
pub(crate) fn to_date(value: Option<&Value>) -> Option<DateTime<Utc>> {
    match value? {
        Value::Null => DateTime::<Utc>::from_timestamp_millis(0),
        Value::Bool(b) => DateTime::<Utc>::from_timestamp_millis(i64::from(*b)),
        Value::Number(n) => n
            .as_f64()
            .filter(|ms| ms.is_finite())
            .and_then(|ms| DateTime::<Utc>::from_timestamp_millis(ms.trunc() as i64)),
        Value::String(s) => parse_date(s),
        Value::Array(_) => parse_date(&to_text(value)),
        Value::Object(_) => None,
    }
}

fn parse_date(input: &str) -> Option<DateTime<Utc>> {
    let s = input.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Some(dt.and_utc());
        }
    }

    let date = match s.len() {
        4 if s.bytes().all(|b| b.is_ascii_digit()) => {
            NaiveDate::from_ymd_opt(s.parse().ok()?, 1, 1)
        }
        7 => NaiveDate::parse_from_str(&format!("{}-01", s), "%Y-%m-%d").ok(),
        _ => NaiveDate::parse_from_str(s, "%Y-%m-%d").ok(),
    }?;

    date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc())
}

#[cfg(test)]
#[path = "evaluator_tests.rs"]
mod tests;
