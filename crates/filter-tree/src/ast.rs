//! Canonical (editor) tree for filter expressions.
//!
//! Every node carries an opaque `id` that stays stable across edits, and
//! groups are represented uniformly as `{id, operator, children}`. The
//! keyed-by-operator shape only exists at the wire boundary, see
//! [`crate::wire`].

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::schema::FieldType;

// ==================== Operators ====================

/// Logical operator combining the children of a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogicalOperator {
    /// Every child must match.
    And,
    /// At least one child must match.
    Or,
}

impl LogicalOperator {
    /// Returns the wire key for this operator.
    pub fn as_str(self) -> &'static str {
        match self {
            LogicalOperator::And => "and",
            LogicalOperator::Or => "or",
        }
    }

    /// Returns the other operator.
    pub fn toggle(self) -> Self {
        match self {
            LogicalOperator::And => LogicalOperator::Or,
            LogicalOperator::Or => LogicalOperator::And,
        }
    }

    /// Parses a wire key, returning `None` for anything but `and`/`or`.
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "and" => Some(LogicalOperator::And),
            "or" => Some(LogicalOperator::Or),
            _ => None,
        }
    }
}

impl fmt::Display for LogicalOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Operator of a leaf condition.
///
/// Operators that are not recognized are kept verbatim in
/// [`ConditionOperator::Unknown`] so that permissive decoding never loses
/// input; the evaluator treats them as always matching.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ConditionOperator {
    Eq,
    Neq,
    Gt,
    Lt,
    Contains,
    StartsWith,
    EndsWith,
    In,
    Between,
    Before,
    After,
    IsNull,
    IsNotNull,
    /// Any other operator string.
    Unknown(String),
}

/// Shape class of the value an operator expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperatorClass {
    /// No value at all (`is_null`, `is_not_null`).
    Nullary,
    /// A `[lo, hi]` pair (`between`).
    Range,
    /// A list of candidates (`in`).
    List,
    /// A single scalar (everything else).
    Single,
}

impl ConditionOperator {
    /// All recognized operators, in the order they are usually offered.
    pub const ALL: &'static [ConditionOperator] = &[
        ConditionOperator::Eq,
        ConditionOperator::Neq,
        ConditionOperator::Gt,
        ConditionOperator::Lt,
        ConditionOperator::Contains,
        ConditionOperator::StartsWith,
        ConditionOperator::EndsWith,
        ConditionOperator::In,
        ConditionOperator::Between,
        ConditionOperator::Before,
        ConditionOperator::After,
        ConditionOperator::IsNull,
        ConditionOperator::IsNotNull,
    ];

    /// Returns the wire string for this operator.
    pub fn as_str(&self) -> &str {
        match self {
            ConditionOperator::Eq => "eq",
            ConditionOperator::Neq => "neq",
            ConditionOperator::Gt => "gt",
            ConditionOperator::Lt => "lt",
            ConditionOperator::Contains => "contains",
            ConditionOperator::StartsWith => "starts_with",
            ConditionOperator::EndsWith => "ends_with",
            ConditionOperator::In => "in",
            ConditionOperator::Between => "between",
            ConditionOperator::Before => "before",
            ConditionOperator::After => "after",
            ConditionOperator::IsNull => "is_null",
            ConditionOperator::IsNotNull => "is_not_null",
            ConditionOperator::Unknown(raw) => raw,
        }
    }

    /// Returns the value shape class this operator expects.
    pub fn class(&self) -> OperatorClass {
        match self {
            ConditionOperator::IsNull | ConditionOperator::IsNotNull => OperatorClass::Nullary,
            ConditionOperator::Between => OperatorClass::Range,
            ConditionOperator::In => OperatorClass::List,
            _ => OperatorClass::Single,
        }
    }

    /// Returns true if this operator is one of the recognized operators.
    pub fn is_known(&self) -> bool {
        !matches!(self, ConditionOperator::Unknown(_))
    }
}

impl From<&str> for ConditionOperator {
    fn from(s: &str) -> Self {
        match s {
            "eq" => ConditionOperator::Eq,
            "neq" => ConditionOperator::Neq,
            "gt" => ConditionOperator::Gt,
            "lt" => ConditionOperator::Lt,
            "contains" => ConditionOperator::Contains,
            "starts_with" => ConditionOperator::StartsWith,
            "ends_with" => ConditionOperator::EndsWith,
            "in" => ConditionOperator::In,
            "between" => ConditionOperator::Between,
            "before" => ConditionOperator::Before,
            "after" => ConditionOperator::After,
            "is_null" => ConditionOperator::IsNull,
            "is_not_null" => ConditionOperator::IsNotNull,
            other => ConditionOperator::Unknown(other.to_string()),
        }
    }
}

impl From<String> for ConditionOperator {
    fn from(s: String) -> Self {
        match ConditionOperator::from(s.as_str()) {
            ConditionOperator::Unknown(_) => ConditionOperator::Unknown(s),
            known => known,
        }
    }
}

impl From<ConditionOperator> for String {
    fn from(op: ConditionOperator) -> Self {
        match op {
            ConditionOperator::Unknown(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for ConditionOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ==================== Nodes ====================

/// A node of the canonical tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Node {
    /// An internal node combining its children.
    Group(GroupNode),
    /// A leaf test of one field.
    Condition(ConditionNode),
}

impl Node {
    /// Returns the id of this node.
    pub fn id(&self) -> &str {
        match self {
            Node::Group(group) => &group.id,
            Node::Condition(condition) => &condition.id,
        }
    }

    /// Returns the group if this node is one.
    pub fn as_group(&self) -> Option<&GroupNode> {
        match self {
            Node::Group(group) => Some(group),
            Node::Condition(_) => None,
        }
    }

    /// Returns the condition if this node is one.
    pub fn as_condition(&self) -> Option<&ConditionNode> {
        match self {
            Node::Condition(condition) => Some(condition),
            Node::Group(_) => None,
        }
    }
}

impl From<GroupNode> for Node {
    fn from(group: GroupNode) -> Self {
        Node::Group(group)
    }
}

impl From<ConditionNode> for Node {
    fn from(condition: ConditionNode) -> Self {
        Node::Condition(condition)
    }
}

/// A logical group of the canonical tree.
///
/// The root of a canonical tree is always a group, even when it holds one or
/// zero children.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupNode {
    pub id: String,
    pub operator: LogicalOperator,
    /// Child nodes. Order is preserved through edits and serialization.
    pub children: Vec<Node>,
}

impl GroupNode {
    /// Creates an empty `and` group.
    pub fn new(id: impl Into<String>) -> Self {
        Self::with_operator(id, LogicalOperator::And)
    }

    /// Creates an empty group with the given operator.
    pub fn with_operator(id: impl Into<String>, operator: LogicalOperator) -> Self {
        Self {
            id: id.into(),
            operator,
            children: Vec::new(),
        }
    }

    /// Returns true if the group has no children.
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Counts every node in the subtree, this group included.
    pub fn node_count(&self) -> usize {
        1 + self
            .children
            .iter()
            .map(|child| match child {
                Node::Group(group) => group.node_count(),
                Node::Condition(_) => 1,
            })
            .sum::<usize>()
    }

    /// Returns the ids of every node in the subtree, in pre-order.
    pub fn ids(&self) -> Vec<&str> {
        let mut ids = Vec::with_capacity(self.node_count());
        self.collect_ids(&mut ids);
        ids
    }

    fn collect_ids<'a>(&'a self, ids: &mut Vec<&'a str>) {
        ids.push(&self.id);
        for child in &self.children {
            match child {
                Node::Group(group) => group.collect_ids(ids),
                Node::Condition(condition) => ids.push(&condition.id),
            }
        }
    }

    /// Finds a node anywhere in the subtree by id.
    pub fn find(&self, id: &str) -> Option<&Node> {
        self.children.iter().find_map(|child| {
            if child.id() == id {
                return Some(child);
            }
            child.as_group().and_then(|group| group.find(id))
        })
    }
}

/// A leaf condition of the canonical tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionNode {
    pub id: String,
    pub field: String,
    pub operator: ConditionOperator,

    /// The compared value. `None` means "no value", which is distinct from
    /// an explicit JSON `null`.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_present"
    )]
    pub value: Option<Value>,

    /// Field type picked through the schema, when known.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub field_type: Option<FieldType>,
}

impl ConditionNode {
    /// Creates a condition with no value and no field type.
    pub fn new(id: impl Into<String>, field: impl Into<String>, operator: ConditionOperator) -> Self {
        Self {
            id: id.into(),
            field: field.into(),
            operator,
            value: None,
            field_type: None,
        }
    }

    /// Sets the value, builder style.
    pub fn with_value(mut self, value: impl Into<Value>) -> Self {
        self.value = Some(value.into());
        self
    }
}

/// Deserializes a present key as `Some`, even when it holds `null`.
fn deserialize_present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}
