//! Conversion from the canonical tree to the wire format.

use crate::ast::{GroupNode, Node};
use crate::wire::{ConditionTreeNode, TreeNode};

/// Converts a canonical group into a wire tree, dropping ids.
pub fn serialize(tree: &GroupNode) -> TreeNode {
    serialize_group(tree)
}

/// Converts any canonical node into its wire form.
///
/// A condition's `value` is emitted only when it is set; field types are
/// editor-only and never reach the wire.
pub fn serialize_node(node: &Node) -> TreeNode {
    match node {
        Node::Group(group) => serialize_group(group),
        Node::Condition(condition) => TreeNode::Condition(ConditionTreeNode {
            field: condition.field.clone(),
            operator: condition.operator.clone(),
            value: condition.value.clone(),
        }),
    }
}

fn serialize_group(group: &GroupNode) -> TreeNode {
    TreeNode::Logical {
        operator: group.operator,
        children: group.children.iter().map(serialize_node).collect(),
    }
}

impl GroupNode {
    /// Returns the wire form of this group.
    pub fn to_wire(&self) -> TreeNode {
        serialize(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{ConditionNode, ConditionOperator, LogicalOperator};
    use crate::schema::FieldType;
    use serde_json::json;

    #[test]
    fn test_serialize_empty_root() {
        let root = GroupNode::new("root");
        assert_eq!(serialize(&root).to_json(), json!({"and": []}));
    }

    #[test]
    fn test_serialize_drops_ids_and_types() {
        let mut condition = ConditionNode::new("c1", "age", ConditionOperator::Gt).with_value(30);
        condition.field_type = Some(FieldType::Number);

        let mut root = GroupNode::with_operator("g1", LogicalOperator::Or);
        root.children.push(condition.into());

        assert_eq!(
            serialize(&root).to_json(),
            json!({"or": [{"field": "age", "operator": "gt", "value": 30}]})
        );
    }

    #[test]
    fn test_serialize_omits_absent_value() {
        let node = Node::Condition(ConditionNode::new("c1", "email", ConditionOperator::IsNull));
        assert_eq!(
            serialize_node(&node).to_json(),
            json!({"field": "email", "operator": "is_null"})
        );
    }

    #[test]
    fn test_serialize_node_on_nested_group() {
        let mut inner = GroupNode::with_operator("g2", LogicalOperator::And);
        inner.children.push(
            ConditionNode::new("c1", "tags", ConditionOperator::In)
                .with_value(json!(["a", "b"]))
                .into(),
        );
        let mut root = GroupNode::new("g1");
        root.children.push(inner.into());

        assert_eq!(
            root.to_wire().to_json(),
            json!({"and": [{"and": [{"field": "tags", "operator": "in", "value": ["a", "b"]}]}]})
        );
    }
}
