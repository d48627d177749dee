//! Edit command implementation.
//!
//! Applies structural edits to a tree and prints the resulting wire tree.
//!
//! Edit syntax is `KIND@PATH` or `KIND@PATH=ARG`, where `PATH` is a dotted
//! node path (empty for the root):
//!
//! | edit | target | effect |
//! |---|---|---|
//! | `add-condition@PATH` | group | append a condition seeded from the schema |
//! | `add-group@PATH` | group | append an empty `and` group |
//! | `remove@PATH` | any non-root node | remove it from its parent |
//! | `toggle@PATH` | group | flip `and` / `or` |
//! | `field@PATH=NAME` | condition | change field (resets operator and value) |
//! | `operator@PATH=OP` | condition | change operator (clears value) |
//! | `value@PATH=JSON` | condition | set value; text that is not JSON is taken as a string |
//! | `clear-value@PATH` | condition | remove the value |

use std::path::Path;

use filter_tree_rs::{ConditionOperator, Edit, FilterSession, NodePath};
use serde_json::Value;
use tracing::debug;

use super::{read_tree, CommandContext, CommandError, Result};

/// Options for the edit command.
pub struct EditOptions<'a> {
    /// Wire tree source; starts from an empty tree when absent.
    pub tree: Option<&'a str>,
    /// Edit specs, applied in order.
    pub edits: &'a [String],
    /// Schema file overriding the configured one.
    pub schema: Option<&'a Path>,
}

/// Parses one edit spec into the path it targets and the edit.
pub fn parse_edit(spec: &str) -> Result<(NodePath, Edit)> {
    let (kind, rest) = spec.split_once('@').ok_or_else(|| {
        CommandError::InvalidInput(format!("edit '{}' is missing '@PATH'", spec))
    })?;
    let (path, arg) = match rest.split_once('=') {
        Some((path, arg)) => (path, Some(arg)),
        None => (rest, None),
    };
    let path: NodePath = path.parse()?;

    let require_arg = |what: &str| {
        arg.ok_or_else(|| CommandError::InvalidInput(format!("edit '{}' needs '={}'", spec, what)))
    };
    let reject_arg = || match arg {
        Some(_) => Err(CommandError::InvalidInput(format!(
            "edit '{}' takes no argument",
            spec
        ))),
        None => Ok(()),
    };

    let edit = match kind {
        "add-condition" => {
            reject_arg()?;
            Edit::AddCondition
        }
        "add-group" => {
            reject_arg()?;
            Edit::AddGroup
        }
        "toggle" => {
            reject_arg()?;
            Edit::ToggleOperator
        }
        "remove" => {
            reject_arg()?;
            let (parent, index) = path.split_last().ok_or_else(|| {
                CommandError::InvalidInput("the root group cannot be removed".to_string())
            })?;
            return Ok((parent, Edit::RemoveChild(index)));
        }
        "field" => Edit::SetField(require_arg("NAME")?.to_string()),
        "operator" => Edit::SetOperator(ConditionOperator::from(require_arg("OP")?)),
        "value" => Edit::SetValue(Some(parse_value(require_arg("JSON")?))),
        "clear-value" => {
            reject_arg()?;
            Edit::SetValue(None)
        }
        other => {
            return Err(CommandError::InvalidInput(format!(
                "unknown edit '{}'. Valid edits: add-condition, add-group, remove, toggle, field, operator, value, clear-value",
                other
            )));
        }
    };

    Ok((path, edit))
}

/// Parses an edit value as JSON, falling back to a plain string.
fn parse_value(arg: &str) -> Value {
    serde_json::from_str(arg).unwrap_or_else(|_| Value::String(arg.to_string()))
}

/// Executes the edit command.
pub fn execute(ctx: &CommandContext, opts: &EditOptions) -> Result<()> {
    let edits = opts
        .edits
        .iter()
        .map(|spec| parse_edit(spec))
        .collect::<Result<Vec<_>>>()?;

    let wire = opts.tree.map(read_tree).transpose()?;
    let schema = ctx.load_schema(opts.schema)?;
    let mut session = FilterSession::from_wire(wire.as_ref(), schema, ctx.id_generator());

    for (path, edit) in edits {
        debug!(path = %path, edit = ?edit, "edit");
        session.apply(&path, edit)?;
    }

    println!("{}", serde_json::to_string_pretty(&session.to_wire())?);

    if !ctx.quiet && !ctx.json_output {
        let result = session.validate();
        if !result.valid {
            eprintln!(
                "warning: edited tree has {} validation error(s); run 'ftree validate' for details",
                result.errors.len()
            );
        }
    }

    Ok(())
}
