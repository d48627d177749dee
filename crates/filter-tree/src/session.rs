//! An editing session over one canonical tree.

use tracing::debug;

use crate::ast::{GroupNode, Node};
use crate::deserialize::deserialize;
use crate::edit::{apply_edit, Edit, NodePath};
use crate::error::FilterResult;
use crate::id::{IdGenerator, UuidIdGenerator};
use crate::schema::Schema;
use crate::validate::{validate_tree, ValidationResult};
use crate::wire::TreeNode;

/// Owns a canonical tree together with the schema and id source used to
/// edit it.
///
/// Every applied edit returns the current wire tree, which is what a host
/// would persist or send on.
#[derive(Debug, Clone)]
pub struct FilterSession<G: IdGenerator = UuidIdGenerator> {
    tree: GroupNode,
    schema: Schema,
    ids: G,
}

impl FilterSession<UuidIdGenerator> {
    /// Starts an empty session with random ids.
    pub fn with_schema(schema: Schema) -> Self {
        Self::new(schema, UuidIdGenerator::new())
    }
}

impl<G: IdGenerator> FilterSession<G> {
    /// Starts a session with an empty `and` root.
    pub fn new(schema: Schema, mut ids: G) -> Self {
        let tree = GroupNode::new(ids.next_id());
        Self { tree, schema, ids }
    }

    /// Starts a session from a wire tree, or an empty root when absent.
    pub fn from_wire(wire: Option<&TreeNode>, schema: Schema, mut ids: G) -> Self {
        let tree = match wire {
            Some(wire) => deserialize(wire, &mut ids),
            None => GroupNode::new(ids.next_id()),
        };
        Self { tree, schema, ids }
    }

    /// Returns the canonical tree.
    pub fn tree(&self) -> &GroupNode {
        &self.tree
    }

    /// Returns the schema edits are checked against.
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Returns the current wire tree.
    pub fn to_wire(&self) -> TreeNode {
        self.tree.to_wire()
    }

    /// Validates the current tree.
    pub fn validate(&self) -> ValidationResult {
        validate_tree(&self.tree)
    }

    /// Returns the node with `id`, if any.
    pub fn find(&self, id: &str) -> Option<&Node> {
        self.tree.find(id)
    }

    /// Applies one edit and returns the resulting wire tree.
    ///
    /// A failed edit leaves the tree unchanged.
    pub fn apply(&mut self, path: &NodePath, edit: Edit) -> FilterResult<TreeNode> {
        apply_edit(&mut self.tree, path, edit, &self.schema, &mut self.ids)?;
        debug!(nodes = self.tree.node_count(), "tree changed");
        Ok(self.to_wire())
    }

    /// Consumes the session, returning the canonical tree.
    pub fn into_tree(self) -> GroupNode {
        self.tree
    }
}
