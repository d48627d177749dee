//! Boolean filter trees: model, wire codec, validation and evaluation.
//!
//! A filter is a tree of logical groups (`and` / `or`) whose leaves are
//! field conditions. Two forms of the same tree exist:
//!
//! - The **wire** form ([`TreeNode`]) is the compact JSON that is stored and
//!   exchanged: `{"and": [...]}` / `{"or": [...]}` groups and
//!   `{"field", "operator", "value"}` conditions, with no ids.
//! - The **canonical** form ([`GroupNode`]) is what editors work on: every
//!   node carries a unique id and the root is always a group.
//!
//! [`deserialize`] and [`serialize`] convert between the two, [`validate_tree`]
//! checks value shapes, [`FilterSession`] applies structural [`Edit`]s, and
//! [`apply_filter`] evaluates a wire tree against JSON records.
//!
//! # Example
//!
//! ```
//! use filter_tree_rs::{
//!     deserialize, serialize, validate_tree, SequentialIdGenerator, TreeNode,
//! };
//!
//! let wire = TreeNode::from_json_str(
//!     r#"{"and": [{"field": "age", "operator": "between", "value": [18]}]}"#,
//! )
//! .unwrap();
//!
//! let mut ids = SequentialIdGenerator::new();
//! let tree = deserialize(&wire, &mut ids);
//! assert_eq!(tree.ids(), vec!["n1", "n2"]);
//!
//! let result = validate_tree(&tree);
//! assert!(!result.valid);
//! assert_eq!(result.errors[0].message, "'between' requires exactly two values");
//!
//! assert_eq!(serialize(&tree), wire);
//! ```

mod ast;
mod deserialize;
mod edit;
mod error;
mod evaluator;
mod id;
mod schema;
mod serialize;
mod session;
mod validate;
mod wire;

pub use ast::{ConditionNode, ConditionOperator, GroupNode, LogicalOperator, Node, OperatorClass};
pub use deserialize::deserialize;
pub use edit::{apply_edit, Edit, NodePath};
pub use error::{FilterError, FilterResult};
pub use evaluator::{
    apply_filter, apply_filter_json, apply_filter_tree, evaluate_condition, evaluate_group,
    evaluate_json_group, FilterEvaluator, Record,
};
pub use id::{IdGenerator, SequentialIdGenerator, UuidIdGenerator};
pub use schema::{
    value_shape, FieldSchema, FieldType, OperatorsByType, Schema, ValueKind, ValueShape,
};
pub use serialize::{serialize, serialize_node};
pub use session::FilterSession;
pub use validate::{check_condition, validate_tree, ValidationError, ValidationResult};
pub use wire::{ConditionTreeNode, TreeNode};
