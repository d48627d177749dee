//! Compact wire format for filter trees.
//!
//! Groups are keyed by operator (`{"and": [...]}` / `{"or": [...]}`) and
//! conditions are `{"field", "operator", "value"?}`. Nodes carry no ids and
//! no type tag: a node is logical exactly when it has an `and` or `or` key.
//!
//! Decoding is permissive. Any JSON value decodes to some [`TreeNode`];
//! something that is not recognizably logical becomes a (likely invalid)
//! condition rather than an error.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use tracing::debug;

use crate::ast::{ConditionOperator, LogicalOperator};
use crate::error::FilterResult;

/// A node of the wire-format tree.
#[derive(Debug, Clone, PartialEq)]
pub enum TreeNode {
    /// `{"and": [...]}` or `{"or": [...]}`.
    Logical {
        operator: LogicalOperator,
        children: Vec<TreeNode>,
    },
    /// `{"field", "operator", "value"?}`.
    Condition(ConditionTreeNode),
}

/// A wire-format leaf condition.
#[derive(Debug, Clone, PartialEq)]
pub struct ConditionTreeNode {
    pub field: String,
    pub operator: ConditionOperator,
    /// Present only when explicitly set.
    pub value: Option<Value>,
}

impl TreeNode {
    /// Creates an `and` node.
    pub fn and(children: Vec<TreeNode>) -> Self {
        TreeNode::Logical {
            operator: LogicalOperator::And,
            children,
        }
    }

    /// Creates an `or` node.
    pub fn or(children: Vec<TreeNode>) -> Self {
        TreeNode::Logical {
            operator: LogicalOperator::Or,
            children,
        }
    }

    /// Returns true if this is a logical node.
    pub fn is_logical(&self) -> bool {
        matches!(self, TreeNode::Logical { .. })
    }

    /// Decodes a JSON value into a wire node.
    ///
    /// If an object holds both `and` and `or`, the key that comes first in
    /// the object wins and the other is ignored. A logical key whose value
    /// is not an array yields a group with no children.
    pub fn from_json(value: &Value) -> Self {
        let Some(map) = value.as_object() else {
            return TreeNode::Condition(ConditionTreeNode::from_json(value));
        };

        let mut logical = map
            .iter()
            .filter_map(|(key, v)| LogicalOperator::from_key(key).map(|op| (op, v)));

        let Some((operator, children)) = logical.next() else {
            return TreeNode::Condition(ConditionTreeNode::from_map(map));
        };

        if logical.next().is_some() {
            debug!(operator = %operator, "node has both 'and' and 'or'; keeping the first");
        }

        let children = children
            .as_array()
            .map(|items| items.iter().map(TreeNode::from_json).collect())
            .unwrap_or_default();

        TreeNode::Logical { operator, children }
    }

    /// Parses wire JSON text.
    ///
    /// # Errors
    ///
    /// Returns `FilterError::Json` if `input` is not well-formed JSON.
    pub fn from_json_str(input: &str) -> FilterResult<Self> {
        let value: Value = serde_json::from_str(input)?;
        Ok(TreeNode::from_json(&value))
    }

    /// Encodes this node as a JSON value.
    pub fn to_json(&self) -> Value {
        match self {
            TreeNode::Logical { operator, children } => {
                let mut map = Map::new();
                map.insert(
                    operator.as_str().to_string(),
                    Value::Array(children.iter().map(TreeNode::to_json).collect()),
                );
                Value::Object(map)
            }
            TreeNode::Condition(condition) => condition.to_json(),
        }
    }
}

impl From<ConditionTreeNode> for TreeNode {
    fn from(condition: ConditionTreeNode) -> Self {
        TreeNode::Condition(condition)
    }
}

impl ConditionTreeNode {
    /// Creates a condition without a value.
    pub fn new(field: impl Into<String>, operator: ConditionOperator) -> Self {
        Self {
            field: field.into(),
            operator,
            value: None,
        }
    }

    /// Sets the value, builder style.
    pub fn with_value(mut self, value: impl Into<Value>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// Decodes a condition from any JSON value.
    ///
    /// Non-objects decode to a condition with an empty field and operator.
    pub fn from_json(value: &Value) -> Self {
        match value.as_object() {
            Some(map) => Self::from_map(map),
            None => Self::new(String::new(), ConditionOperator::Unknown(String::new())),
        }
    }

    fn from_map(map: &Map<String, Value>) -> Self {
        let field = map
            .get("field")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        let operator = map
            .get("operator")
            .and_then(Value::as_str)
            .map(ConditionOperator::from)
            .unwrap_or_else(|| ConditionOperator::Unknown(String::new()));

        Self {
            field,
            operator,
            value: map.get("value").cloned(),
        }
    }

    /// Encodes this condition as a JSON object.
    pub fn to_json(&self) -> Value {
        let mut map = Map::new();
        map.insert("field".to_string(), Value::String(self.field.clone()));
        map.insert(
            "operator".to_string(),
            Value::String(self.operator.as_str().to_string()),
        );
        if let Some(value) = &self.value {
            map.insert("value".to_string(), value.clone());
        }
        Value::Object(map)
    }
}

impl Serialize for TreeNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for TreeNode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(TreeNode::from_json(&value))
    }
}

impl Serialize for ConditionTreeNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}
