//! Apply command implementation.
//!
//! Filters a JSON array of records with a wire tree. The tree is evaluated
//! as raw JSON, so a node carrying both `and` and `or` is read as `and`.

use filter_tree_rs::{FilterEvaluator, Record};
use serde_json::Value;
use tracing::debug;

use super::{read_source, read_tree_json, CommandContext, CommandError, Result};
use crate::output::{format_records_json, format_records_table};

/// Options for the apply command.
pub struct ApplyOptions<'a> {
    /// Wire tree source.
    pub tree: &'a str,
    /// Records source.
    pub data: &'a str,
}

/// Parses a JSON array of objects into records.
pub fn parse_records(text: &str) -> Result<Vec<Record>> {
    let value: Value = serde_json::from_str(text)?;
    let Value::Array(items) = value else {
        return Err(CommandError::InvalidInput(
            "records must be a JSON array".to_string(),
        ));
    };

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| match item {
            Value::Object(record) => Ok(record),
            _ => Err(CommandError::InvalidInput(format!(
                "record {} is not a JSON object",
                index
            ))),
        })
        .collect()
}

/// Executes the apply command.
pub fn execute(ctx: &CommandContext, opts: &ApplyOptions) -> Result<()> {
    if opts.tree == "-" && opts.data == "-" {
        return Err(CommandError::InvalidInput(
            "tree and records cannot both be read from stdin".to_string(),
        ));
    }

    let tree = read_tree_json(opts.tree)?;
    let records = parse_records(&read_source(opts.data)?)?;
    debug!(records = records.len(), "read records");

    let matched = FilterEvaluator::from_json(&tree).filter_records(&records);

    if ctx.json_output {
        println!("{}", format_records_json(&matched)?);
    } else if !ctx.quiet {
        print!(
            "{}",
            format_records_table(&matched, records.len(), ctx.use_colors)?
        );
    }

    Ok(())
}
