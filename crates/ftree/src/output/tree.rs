//! Canonical tree output formatting.

use filter_tree_rs::{value_shape, ConditionNode, GroupNode, Node, NodePath, Schema};
use owo_colors::OwoColorize;

use super::helpers::{format_value, truncate_id};

/// Longest value rendered in text output.
const VALUE_DISPLAY_LEN: usize = 40;

/// Formats a canonical tree as JSON, ids included.
pub fn format_tree_json(tree: &GroupNode) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(tree)
}

/// Formats a canonical tree as an indented outline.
///
/// Each line shows the node path used by `ftree edit`, then the node and its
/// id. With a schema, conditions also show the field type and flag values
/// that do not fit the expected input shape.
pub fn format_tree_table(tree: &GroupNode, schema: Option<&Schema>, use_colors: bool) -> String {
    let mut output = String::new();
    write_group(&mut output, tree, &NodePath::root(), 0, schema, use_colors);
    output
}

fn write_group(
    output: &mut String,
    group: &GroupNode,
    path: &NodePath,
    depth: usize,
    schema: Option<&Schema>,
    use_colors: bool,
) {
    let operator = group.operator.as_str();
    let operator = if use_colors {
        operator.bold().to_string()
    } else {
        operator.to_string()
    };
    let suffix = if group.is_empty() { " (empty)" } else { "" };

    push_line(output, depth, path, &format!("{}{}", operator, suffix), &group.id, use_colors);

    for (index, child) in group.children.iter().enumerate() {
        let child_path = path.child(index);
        match child {
            Node::Group(inner) => write_group(output, inner, &child_path, depth + 1, schema, use_colors),
            Node::Condition(condition) => {
                let mut text = format_condition(condition, use_colors);
                if let Some(schema) = schema {
                    text.push_str(&format_hint(condition, schema, use_colors));
                }
                push_line(output, depth + 1, &child_path, &text, &condition.id, use_colors);
            }
        }
    }
}

fn push_line(
    output: &mut String,
    depth: usize,
    path: &NodePath,
    text: &str,
    id: &str,
    use_colors: bool,
) {
    let indent = "  ".repeat(depth);
    let id = format!("#{}", truncate_id(id));
    let (path, id) = if use_colors {
        (path.to_string().cyan().to_string(), id.dimmed().to_string())
    } else {
        (path.to_string(), id)
    };
    output.push_str(&format!("{}{}: {}  {}\n", indent, path, text, id));
}

fn format_condition(condition: &ConditionNode, use_colors: bool) -> String {
    let field = if condition.field.is_empty() {
        "(no field)"
    } else {
        condition.field.as_str()
    };
    let operator = condition.operator.as_str();
    let operator = if operator.is_empty() { "(no operator)" } else { operator };
    let operator = if use_colors {
        operator.yellow().to_string()
    } else {
        operator.to_string()
    };

    let value = format_value(condition.value.as_ref(), VALUE_DISPLAY_LEN);
    if value.is_empty() {
        format!("{} {}", field, operator)
    } else {
        format!("{} {} {}", field, operator, value)
    }
}

fn format_hint(condition: &ConditionNode, schema: &Schema, use_colors: bool) -> String {
    let Some(field) = schema.field(&condition.field) else {
        let hint = "  (unknown field)";
        return if use_colors {
            hint.red().to_string()
        } else {
            hint.to_string()
        };
    };

    let shape = value_shape(Some(field.field_type), &condition.operator);
    if shape.accepts(condition.value.as_ref()) {
        let hint = format!("  ({})", field.field_type);
        if use_colors {
            hint.dimmed().to_string()
        } else {
            hint
        }
    } else {
        let hint = format!("  ! {} expects {}", field.field_type, shape);
        if use_colors {
            hint.red().to_string()
        } else {
            hint
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use filter_tree_rs::{
        deserialize, ConditionOperator, FieldSchema, FieldType, OperatorsByType,
        SequentialIdGenerator, TreeNode,
    };
    use serde_json::json;

    fn sample_tree() -> GroupNode {
        let wire = TreeNode::from_json(&json!({"and": [
            {"field": "age", "operator": "between", "value": [18]},
            {"or": [
                {"field": "name", "operator": "contains", "value": "ann"},
                {"field": "email", "operator": "is_null"}
            ]},
            {"or": []}
        ]}));
        deserialize(&wire, &mut SequentialIdGenerator::new())
    }

    fn sample_schema() -> Schema {
        let mut ops = OperatorsByType::new();
        ops.insert(FieldType::Number, vec![ConditionOperator::Between]);
        Schema::new(
            vec![
                FieldSchema::new("age", FieldType::Number),
                FieldSchema::new("name", FieldType::String),
            ],
            ops,
        )
    }

    #[test]
    fn test_format_tree_table_outline() {
        let output = format_tree_table(&sample_tree(), None, false);
        let expected = "\
root: and  #n1
  0: age between [18]  #n2
  1: or  #n3
    1.0: name contains \"ann\"  #n4
    1.1: email is_null  #n5
  2: or (empty)  #n6
";
        assert_eq!(output, expected);
    }

    #[test]
    fn test_format_tree_table_with_schema_hints() {
        let output = format_tree_table(&sample_tree(), Some(&sample_schema()), false);
        assert!(output.contains("0: age between [18]  ! number expects [number, number]  #n2"));
        assert!(output.contains("1.0: name contains \"ann\"  (string)  #n4"));
        assert!(output.contains("1.1: email is_null  (unknown field)  #n5"));
    }

    #[test]
    fn test_format_tree_json_includes_ids() {
        let json: serde_json::Value =
            serde_json::from_str(&format_tree_json(&sample_tree()).unwrap()).unwrap();
        assert_eq!(json["id"], "n1");
        assert_eq!(json["operator"], "and");
        assert_eq!(json["children"][0]["id"], "n2");
        assert_eq!(json["children"][0]["value"], json!([18]));
        assert_eq!(json["children"][1]["children"][1].get("value"), None);
    }

    #[test]
    fn test_format_condition_placeholders() {
        let condition = ConditionNode::new("c1", "", ConditionOperator::Unknown(String::new()));
        assert_eq!(format_condition(&condition, false), "(no field) (no operator)");
    }
}
