//! Conversion from the wire format to the canonical tree.

use tracing::debug;

use crate::ast::{ConditionNode, GroupNode, LogicalOperator, Node};
use crate::id::IdGenerator;
use crate::wire::{ConditionTreeNode, TreeNode};

/// Converts a wire tree into a canonical group, assigning fresh ids.
///
/// A bare condition at the top level is wrapped as the only child of a new
/// `and` group, so the result is always a group. Ids never come from the
/// input; every node gets a new one from `ids`.
pub fn deserialize(tree: &TreeNode, ids: &mut dyn IdGenerator) -> GroupNode {
    let root = match tree {
        TreeNode::Condition(condition) => GroupNode {
            id: ids.next_id(),
            operator: LogicalOperator::And,
            children: vec![Node::Condition(deserialize_condition(condition, ids))],
        },
        TreeNode::Logical { operator, children } => deserialize_group(*operator, children, ids),
    };

    debug!(nodes = root.node_count(), "deserialized filter tree");
    root
}

fn deserialize_group(
    operator: LogicalOperator,
    children: &[TreeNode],
    ids: &mut dyn IdGenerator,
) -> GroupNode {
    let id = ids.next_id();
    let children = children
        .iter()
        .map(|child| match child {
            TreeNode::Condition(condition) => {
                Node::Condition(deserialize_condition(condition, ids))
            }
            TreeNode::Logical { operator, children } => {
                Node::Group(deserialize_group(*operator, children, ids))
            }
        })
        .collect();

    GroupNode {
        id,
        operator,
        children,
    }
}

fn deserialize_condition(condition: &ConditionTreeNode, ids: &mut dyn IdGenerator) -> ConditionNode {
    ConditionNode {
        id: ids.next_id(),
        field: condition.field.clone(),
        operator: condition.operator.clone(),
        value: condition.value.clone(),
        field_type: None,
    }
}
