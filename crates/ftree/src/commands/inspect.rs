//! Inspect command implementation.
//!
//! Shows the canonical tree: node ids, node paths and, when a schema is
//! known, each condition's field type.

use std::path::Path;

use filter_tree_rs::{deserialize, GroupNode, Node, Schema};

use super::{read_tree, CommandContext, Result};
use crate::output::{format_tree_json, format_tree_table};

/// Options for the inspect command.
pub struct InspectOptions<'a> {
    /// Wire tree source.
    pub tree: &'a str,
    /// Schema file overriding the configured one.
    pub schema: Option<&'a Path>,
}

/// Fills in each condition's field type from the schema where the field is known.
pub fn annotate_field_types(group: &mut GroupNode, schema: &Schema) {
    for child in &mut group.children {
        match child {
            Node::Group(inner) => annotate_field_types(inner, schema),
            Node::Condition(condition) => {
                condition.field_type = schema.field(&condition.field).map(|f| f.field_type);
            }
        }
    }
}

/// Executes the inspect command.
pub fn execute(ctx: &CommandContext, opts: &InspectOptions) -> Result<()> {
    let wire = read_tree(opts.tree)?;
    let mut ids = ctx.id_generator();
    let mut tree = deserialize(&wire, &mut ids);

    let schema = match (opts.schema, &ctx.schema_path) {
        (None, None) => None,
        _ => Some(ctx.load_schema(opts.schema)?),
    };
    if let Some(schema) = &schema {
        annotate_field_types(&mut tree, schema);
    }

    if ctx.json_output {
        println!("{}", format_tree_json(&tree)?);
    } else {
        print!("{}", format_tree_table(&tree, schema.as_ref(), ctx.use_colors));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use filter_tree_rs::{FieldSchema, FieldType, OperatorsByType, SequentialIdGenerator, TreeNode};
    use serde_json::json;

    #[test]
    fn test_annotate_field_types() {
        let wire = TreeNode::from_json(&json!({"and": [
            {"field": "age", "operator": "gt", "value": 3},
            {"or": [{"field": "nope", "operator": "eq", "value": 1}]}
        ]}));
        let mut tree = deserialize(&wire, &mut SequentialIdGenerator::new());
        let schema = Schema::new(
            vec![FieldSchema::new("age", FieldType::Number)],
            OperatorsByType::new(),
        );

        annotate_field_types(&mut tree, &schema);

        let age = tree.children[0].as_condition().unwrap();
        assert_eq!(age.field_type, Some(FieldType::Number));
        let nested = tree.children[1].as_group().unwrap().children[0]
            .as_condition()
            .unwrap();
        assert_eq!(nested.field_type, None);
    }
}
