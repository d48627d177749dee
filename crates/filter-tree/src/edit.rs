//! Structural edits on the canonical tree.
//!
//! Edits mutate one group or condition in place and never touch sibling
//! branches. New nodes always get fresh ids; existing ids are never
//! reassigned.

use std::fmt;
use std::str::FromStr;

use serde_json::Value;
use tracing::debug;

use crate::ast::{ConditionNode, ConditionOperator, GroupNode, LogicalOperator, Node};
use crate::error::{FilterError, FilterResult};
use crate::id::IdGenerator;
use crate::schema::Schema;

// ==================== Node paths ====================

/// Location of a node as child indices from the root.
///
/// Written as dot-separated indices: `""` (or `"root"`) is the root group,
/// `"0.2"` is the third child of the root's first child.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct NodePath(Vec<usize>);

impl NodePath {
    /// The path of the root group.
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Returns true if this is the root path.
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the child indices.
    pub fn indices(&self) -> &[usize] {
        &self.0
    }

    /// Returns the path of the `index`-th child of this node.
    pub fn child(&self, index: usize) -> Self {
        let mut indices = self.0.clone();
        indices.push(index);
        Self(indices)
    }

    /// Splits into the parent path and the last index.
    pub fn split_last(&self) -> Option<(NodePath, usize)> {
        let (last, parent) = self.0.split_last()?;
        Some((NodePath(parent.to_vec()), *last))
    }
}

impl From<Vec<usize>> for NodePath {
    fn from(indices: Vec<usize>) -> Self {
        Self(indices)
    }
}

impl FromStr for NodePath {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() || trimmed == "root" {
            return Ok(Self::root());
        }

        trimmed
            .split('.')
            .map(|part| part.parse::<usize>())
            .collect::<Result<Vec<_>, _>>()
            .map(Self)
            .map_err(|_| FilterError::invalid_path(s))
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("root");
        }
        let parts: Vec<String> = self.0.iter().map(|i| i.to_string()).collect();
        f.write_str(&parts.join("."))
    }
}

// ==================== Edits ====================

/// One structural edit, addressed to a node by path.
#[derive(Debug, Clone, PartialEq)]
pub enum Edit {
    /// Append a condition seeded from the schema to a group.
    AddCondition,
    /// Append an empty `and` group to a group.
    AddGroup,
    /// Remove a group's child at the index.
    RemoveChild(usize),
    /// Flip a group between `and` and `or`.
    ToggleOperator,
    /// Change a condition's field, resetting operator and value.
    SetField(String),
    /// Change a condition's operator, clearing the value.
    SetOperator(ConditionOperator),
    /// Set or clear a condition's value.
    SetValue(Option<Value>),
}

impl GroupNode {
    /// Appends a condition seeded with the schema's first field and that
    /// field type's first operator, with no value. Returns the new id.
    ///
    /// # Errors
    ///
    /// Returns `FilterError::EmptySchema` if the schema has no fields.
    pub fn add_condition(&mut self, schema: &Schema, ids: &mut dyn IdGenerator) -> FilterResult<String> {
        let field = schema.first_field().ok_or(FilterError::EmptySchema)?;

        let condition = ConditionNode {
            id: ids.next_id(),
            field: field.name.clone(),
            operator: schema.default_operator(field.field_type),
            value: None,
            field_type: Some(field.field_type),
        };
        let id = condition.id.clone();

        debug!(group = %self.id, condition = %id, field = %condition.field, "added condition");
        self.children.push(Node::Condition(condition));
        Ok(id)
    }

    /// Appends an empty `and` group. Returns the new id.
    pub fn add_group(&mut self, ids: &mut dyn IdGenerator) -> String {
        let group = GroupNode::with_operator(ids.next_id(), LogicalOperator::And);
        let id = group.id.clone();

        debug!(group = %self.id, child = %id, "added group");
        self.children.push(Node::Group(group));
        id
    }

    /// Removes and returns the child at `index`. Later children shift down.
    ///
    /// # Errors
    ///
    /// Returns `FilterError::IndexOutOfRange` if there is no such child.
    pub fn remove_child(&mut self, index: usize) -> FilterResult<Node> {
        self.check_index(index)?;
        let removed = self.children.remove(index);
        debug!(group = %self.id, removed = %removed.id(), "removed child");
        Ok(removed)
    }

    /// Flips the operator between `and` and `or`. Children are untouched.
    pub fn toggle_operator(&mut self) {
        self.operator = self.operator.toggle();
    }

    /// Replaces the child at `index` wholesale and returns the old one.
    ///
    /// The caller is responsible for the new node's ids being unique within
    /// the tree.
    ///
    /// # Errors
    ///
    /// Returns `FilterError::IndexOutOfRange` if there is no such child.
    pub fn update_child(&mut self, index: usize, node: Node) -> FilterResult<Node> {
        self.check_index(index)?;
        Ok(std::mem::replace(&mut self.children[index], node))
    }

    fn check_index(&self, index: usize) -> FilterResult<()> {
        if index < self.children.len() {
            Ok(())
        } else {
            Err(FilterError::IndexOutOfRange {
                index,
                len: self.children.len(),
            })
        }
    }

    /// Returns the group at `path`.
    ///
    /// # Errors
    ///
    /// Returns `FilterError::IndexOutOfRange` for a missing child and
    /// `FilterError::NotAGroup` if the path runs through a condition.
    pub fn group_at_mut(&mut self, path: &NodePath) -> FilterResult<&mut GroupNode> {
        let mut group = self;
        for (depth, &index) in path.indices().iter().enumerate() {
            let len = group.children.len();
            group = match group.children.get_mut(index) {
                Some(Node::Group(child)) => child,
                Some(Node::Condition(_)) => {
                    return Err(FilterError::not_a_group(NodePath(
                        path.indices()[..=depth].to_vec(),
                    )))
                }
                None => return Err(FilterError::IndexOutOfRange { index, len }),
            };
        }
        Ok(group)
    }

    /// Returns the condition at `path`.
    ///
    /// # Errors
    ///
    /// Returns `FilterError::NotACondition` if the path names a group, and
    /// the errors of [`GroupNode::group_at_mut`] for the parent path.
    pub fn condition_at_mut(&mut self, path: &NodePath) -> FilterResult<&mut ConditionNode> {
        let Some((parent, index)) = path.split_last() else {
            return Err(FilterError::not_a_condition(path));
        };

        let group = self.group_at_mut(&parent)?;
        let len = group.children.len();
        match group.children.get_mut(index) {
            Some(Node::Condition(condition)) => Ok(condition),
            Some(Node::Group(_)) => Err(FilterError::not_a_condition(path)),
            None => Err(FilterError::IndexOutOfRange { index, len }),
        }
    }

    /// Returns the path of the node with `id`, if it is in this tree.
    pub fn path_of(&self, id: &str) -> Option<NodePath> {
        if self.id == id {
            return Some(NodePath::root());
        }
        self.children
            .iter()
            .enumerate()
            .find_map(|(index, child)| match child {
                Node::Condition(condition) if condition.id == id => {
                    Some(NodePath(vec![index]))
                }
                Node::Condition(_) => None,
                Node::Group(group) => group.path_of(id).map(|sub| {
                    let mut indices = vec![index];
                    indices.extend(sub.0);
                    NodePath(indices)
                }),
            })
    }
}

impl ConditionNode {
    /// Changes the field, resetting the operator to the first one offered
    /// for the new field's type and clearing the value.
    ///
    /// # Errors
    ///
    /// Returns `FilterError::UnknownField` if `name` is not in the schema,
    /// with the closest field name as a suggestion.
    pub fn set_field(&mut self, name: &str, schema: &Schema) -> FilterResult<()> {
        let field = schema
            .field(name)
            .ok_or_else(|| FilterError::unknown_field(name, schema.suggest_field(name)))?;

        self.field = field.name.clone();
        self.field_type = Some(field.field_type);
        self.operator = schema.default_operator(field.field_type);
        self.value = None;
        Ok(())
    }

    /// Changes the operator and clears the value.
    pub fn set_operator(&mut self, operator: ConditionOperator) {
        self.operator = operator;
        self.value = None;
    }

    /// Sets or clears the value.
    pub fn set_value(&mut self, value: Option<Value>) {
        self.value = value;
    }
}

/// Applies one edit to the node at `path` within `tree`.
///
/// # Errors
///
/// Returns `FilterError::NotAGroup` / `FilterError::NotACondition` when the
/// edit does not fit the addressed node, plus the errors of the individual
/// edit operations.
pub fn apply_edit(
    tree: &mut GroupNode,
    path: &NodePath,
    edit: Edit,
    schema: &Schema,
    ids: &mut dyn IdGenerator,
) -> FilterResult<()> {
    debug!(path = %path, edit = ?edit, "applying edit");

    match edit {
        Edit::AddCondition => {
            tree.group_at_mut(path)?.add_condition(schema, ids)?;
        }
        Edit::AddGroup => {
            tree.group_at_mut(path)?.add_group(ids);
        }
        Edit::RemoveChild(index) => {
            tree.group_at_mut(path)?.remove_child(index)?;
        }
        Edit::ToggleOperator => tree.group_at_mut(path)?.toggle_operator(),
        Edit::SetField(name) => tree.condition_at_mut(path)?.set_field(&name, schema)?,
        Edit::SetOperator(operator) => tree.condition_at_mut(path)?.set_operator(operator),
        Edit::SetValue(value) => tree.condition_at_mut(path)?.set_value(value),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::SequentialIdGenerator;
    use crate::schema::{FieldSchema, FieldType, OperatorsByType};
    use serde_json::json;

    fn schema() -> Schema {
        let mut ops = OperatorsByType::new();
        ops.insert(
            FieldType::Number,
            vec![ConditionOperator::Gt, ConditionOperator::Between],
        );
        ops.insert(FieldType::String, vec![ConditionOperator::Contains]);
        Schema::new(
            vec![
                FieldSchema::new("age", FieldType::Number),
                FieldSchema::new("name", FieldType::String),
                FieldSchema::new("active", FieldType::Boolean),
            ],
            ops,
        )
    }

    /// root(and) -> [c(age), g(or) -> [c(name)]]
    fn sample_tree(ids: &mut SequentialIdGenerator) -> GroupNode {
        let schema = schema();
        let mut root = GroupNode::new(ids.next_id());
        root.add_condition(&schema, ids).unwrap();
        root.add_group(ids);
        let inner = root.group_at_mut(&"1".parse().unwrap()).unwrap();
        inner.add_condition(&schema, ids).unwrap();
        inner.toggle_operator();
        root
    }

    // ==================== Node paths ====================

    #[test]
    fn test_parse_node_paths() {
        assert_eq!("".parse::<NodePath>().unwrap(), NodePath::root());
        assert_eq!("root".parse::<NodePath>().unwrap(), NodePath::root());
        assert_eq!("0.2".parse::<NodePath>().unwrap(), NodePath::from(vec![0, 2]));
        assert!(matches!(
            "0.x".parse::<NodePath>(),
            Err(FilterError::InvalidPath { .. })
        ));
        assert!("1..2".parse::<NodePath>().is_err());
    }

    #[test]
    fn test_display_node_paths() {
        assert_eq!(NodePath::root().to_string(), "root");
        assert_eq!(NodePath::from(vec![1, 0, 3]).to_string(), "1.0.3");
        assert_eq!(NodePath::root().child(2).child(0).to_string(), "2.0");
    }

    // ==================== Group edits ====================

    #[test]
    fn test_add_condition_uses_first_field_and_operator() {
        let mut ids = SequentialIdGenerator::new();
        let mut root = GroupNode::new(ids.next_id());

        let id = root.add_condition(&schema(), &mut ids).unwrap();

        let condition = root.children[0].as_condition().unwrap();
        assert_eq!(condition.id, id);
        assert_eq!(condition.field, "age");
        assert_eq!(condition.operator, ConditionOperator::Gt);
        assert_eq!(condition.value, None);
        assert_eq!(condition.field_type, Some(FieldType::Number));
    }

    #[test]
    fn test_add_condition_with_empty_schema_fails() {
        let mut ids = SequentialIdGenerator::new();
        let mut root = GroupNode::new(ids.next_id());

        let result = root.add_condition(&Schema::default(), &mut ids);
        assert!(matches!(result, Err(FilterError::EmptySchema)));
        assert!(root.is_empty());
    }

    #[test]
    fn test_add_condition_falls_back_to_eq() {
        let mut ids = SequentialIdGenerator::new();
        let schema = Schema::new(vec![FieldSchema::new("when", FieldType::Date)], OperatorsByType::new());
        let mut root = GroupNode::new(ids.next_id());

        root.add_condition(&schema, &mut ids).unwrap();
        assert_eq!(
            root.children[0].as_condition().unwrap().operator,
            ConditionOperator::Eq
        );
    }

    #[test]
    fn test_add_group_appends_empty_and() {
        let mut ids = SequentialIdGenerator::new();
        let mut root = GroupNode::with_operator(ids.next_id(), LogicalOperator::Or);

        let id = root.add_group(&mut ids);

        let group = root.children[0].as_group().unwrap();
        assert_eq!(group.id, id);
        assert_eq!(group.operator, LogicalOperator::And);
        assert!(group.is_empty());
    }

    #[test]
    fn test_remove_only_child_empties_group() {
        let mut ids = SequentialIdGenerator::new();
        let mut root = GroupNode::new(ids.next_id());
        root.add_condition(&schema(), &mut ids).unwrap();

        root.remove_child(0).unwrap();
        assert_eq!(root.children.len(), 0);
    }

    #[test]
    fn test_remove_child_shifts_later_children() {
        let mut ids = SequentialIdGenerator::new();
        let mut root = GroupNode::new(ids.next_id());
        let first = root.add_group(&mut ids);
        let second = root.add_group(&mut ids);
        let third = root.add_group(&mut ids);

        let removed = root.remove_child(1).unwrap();
        assert_eq!(removed.id(), second);
        let remaining: Vec<&str> = root.children.iter().map(Node::id).collect();
        assert_eq!(remaining, vec![first.as_str(), third.as_str()]);

        root.remove_child(1).unwrap();
        assert_eq!(root.children.len(), 1);
    }

    #[test]
    fn test_remove_child_out_of_range() {
        let mut root = GroupNode::new("root");
        assert!(matches!(
            root.remove_child(0),
            Err(FilterError::IndexOutOfRange { index: 0, len: 0 })
        ));
    }

    #[test]
    fn test_toggle_twice_restores_operator() {
        let mut ids = SequentialIdGenerator::new();
        let mut root = sample_tree(&mut ids);
        let before = root.clone();

        root.toggle_operator();
        assert_eq!(root.operator, LogicalOperator::Or);
        assert_eq!(root.children, before.children);

        root.toggle_operator();
        assert_eq!(root, before);
    }

    #[test]
    fn test_update_child_replaces_wholesale() {
        let mut ids = SequentialIdGenerator::new();
        let mut root = sample_tree(&mut ids);
        let replacement = Node::Condition(
            ConditionNode::new(ids.next_id(), "name", ConditionOperator::Eq).with_value("x"),
        );

        let old = root.update_child(1, replacement.clone()).unwrap();
        assert!(old.as_group().is_some());
        assert_eq!(root.children[1], replacement);
        assert!(matches!(
            root.update_child(5, replacement),
            Err(FilterError::IndexOutOfRange { index: 5, len: 2 })
        ));
    }

    // ==================== Navigation ====================

    #[test]
    fn test_group_at_mut_and_condition_at_mut() {
        let mut ids = SequentialIdGenerator::new();
        let mut root = sample_tree(&mut ids);

        let inner = root.group_at_mut(&"1".parse().unwrap()).unwrap();
        assert_eq!(inner.operator, LogicalOperator::Or);

        let condition = root.condition_at_mut(&"1.0".parse().unwrap()).unwrap();
        assert_eq!(condition.field, "age");
    }

    #[test]
    fn test_navigation_errors() {
        let mut ids = SequentialIdGenerator::new();
        let mut root = sample_tree(&mut ids);

        assert!(matches!(
            root.group_at_mut(&"0".parse().unwrap()),
            Err(FilterError::NotAGroup { path }) if path == "0"
        ));
        assert!(matches!(
            root.group_at_mut(&"7".parse().unwrap()),
            Err(FilterError::IndexOutOfRange { index: 7, len: 2 })
        ));
        assert!(matches!(
            root.condition_at_mut(&NodePath::root()),
            Err(FilterError::NotACondition { .. })
        ));
        assert!(matches!(
            root.condition_at_mut(&"1".parse().unwrap()),
            Err(FilterError::NotACondition { path }) if path == "1"
        ));
    }

    #[test]
    fn test_path_of() {
        let mut ids = SequentialIdGenerator::new();
        let root = sample_tree(&mut ids);
        // ids: n1 root, n2 condition, n3 group, n4 nested condition
        assert_eq!(root.path_of("n1"), Some(NodePath::root()));
        assert_eq!(root.path_of("n2"), Some(NodePath::from(vec![0])));
        assert_eq!(root.path_of("n3"), Some(NodePath::from(vec![1])));
        assert_eq!(root.path_of("n4"), Some(NodePath::from(vec![1, 0])));
        assert_eq!(root.path_of("nope"), None);
    }

    // ==================== Condition edits ====================

    #[test]
    fn test_set_field_resets_operator_and_value() {
        let mut condition = ConditionNode::new("c1", "age", ConditionOperator::Between)
            .with_value(json!([1, 2]));

        condition.set_field("name", &schema()).unwrap();
        assert_eq!(condition.field, "name");
        assert_eq!(condition.field_type, Some(FieldType::String));
        assert_eq!(condition.operator, ConditionOperator::Contains);
        assert_eq!(condition.value, None);
        assert_eq!(condition.id, "c1");
    }

    #[test]
    fn test_set_field_unknown_suggests() {
        let mut condition = ConditionNode::new("c1", "age", ConditionOperator::Gt).with_value(3);

        let err = condition.set_field("nme", &schema()).unwrap_err();
        assert!(matches!(
            &err,
            FilterError::UnknownField { name, suggestion: Some(s) } if name == "nme" && s == "name"
        ));
        assert_eq!(condition.field, "age");
        assert_eq!(condition.value, Some(json!(3)));
    }

    #[test]
    fn test_set_operator_clears_value() {
        let mut condition = ConditionNode::new("c1", "age", ConditionOperator::Gt).with_value(3);
        condition.set_operator(ConditionOperator::Between);
        assert_eq!(condition.operator, ConditionOperator::Between);
        assert_eq!(condition.value, None);
    }

    #[test]
    fn test_set_value() {
        let mut condition = ConditionNode::new("c1", "age", ConditionOperator::Gt);
        condition.set_value(Some(json!(30)));
        assert_eq!(condition.value, Some(json!(30)));
        condition.set_value(None);
        assert_eq!(condition.value, None);
    }

    // ==================== apply_edit ====================

    #[test]
    fn test_apply_edit_dispatches_by_target() {
        let mut ids = SequentialIdGenerator::new();
        let mut root = sample_tree(&mut ids);
        let schema = schema();

        apply_edit(&mut root, &"1".parse().unwrap(), Edit::AddGroup, &schema, &mut ids).unwrap();
        assert_eq!(root.group_at_mut(&"1".parse().unwrap()).unwrap().children.len(), 2);

        apply_edit(
            &mut root,
            &"0".parse().unwrap(),
            Edit::SetValue(Some(json!(30))),
            &schema,
            &mut ids,
        )
        .unwrap();
        assert_eq!(root.children[0].as_condition().unwrap().value, Some(json!(30)));
    }

    #[test]
    fn test_apply_edit_rejects_mismatched_target() {
        let mut ids = SequentialIdGenerator::new();
        let mut root = sample_tree(&mut ids);
        let schema = schema();

        let err = apply_edit(&mut root, &"0".parse().unwrap(), Edit::ToggleOperator, &schema, &mut ids)
            .unwrap_err();
        assert!(matches!(err, FilterError::NotAGroup { .. }));

        let err = apply_edit(
            &mut root,
            &NodePath::root(),
            Edit::SetOperator(ConditionOperator::Eq),
            &schema,
            &mut ids,
        )
        .unwrap_err();
        assert!(matches!(err, FilterError::NotACondition { .. }));
    }
    #[test]
    fn test_apply_edit_every_kind() {
        let mut ids = SequentialIdGenerator::new();
        let mut root = sample_tree(&mut ids);
        let schema = schema();
        let inner: NodePath = "1".parse().unwrap();
        let leaf: NodePath = "1.0".parse().unwrap();

        let mut apply = |root: &mut GroupNode, path: &NodePath, edit: Edit| {
            apply_edit(root, path, edit, &schema, &mut ids).unwrap();
        };

        apply(&mut root, &inner, Edit::AddCondition);
        apply(&mut root, &inner, Edit::AddGroup);
        apply(&mut root, &inner, Edit::RemoveChild(1));
        apply(&mut root, &inner, Edit::ToggleOperator);
        apply(&mut root, &leaf, Edit::SetField("name".to_string()));
        apply(&mut root, &leaf, Edit::SetOperator(ConditionOperator::StartsWith));
        apply(&mut root, &leaf, Edit::SetValue(Some(json!("an"))));

        let group = root.children[1].as_group().unwrap();
        assert_eq!(group.operator, LogicalOperator::And);
        assert_eq!(group.children.len(), 2);
        assert!(group.children[1].as_group().is_some());

        let condition = group.children[0].as_condition().unwrap();
        assert_eq!(condition.field, "name");
        assert_eq!(condition.operator, ConditionOperator::StartsWith);
        assert_eq!(condition.value, Some(json!("an")));
    }

    #[test]
    fn test_apply_edit_mismatch_leaves_tree_unchanged() {
        let mut ids = SequentialIdGenerator::new();
        let mut root = sample_tree(&mut ids);
        let before = root.clone();
        let schema = schema();

        for (path, edit) in [
            ("1.0", Edit::AddCondition),
            ("1.0", Edit::RemoveChild(0)),
            ("1", Edit::SetField("age".to_string())),
            ("1", Edit::SetValue(None)),
        ] {
            assert!(apply_edit(&mut root, &path.parse().unwrap(), edit, &schema, &mut ids).is_err());
        }
        assert_eq!(root, before);
    }
}
