//! Validate command implementation.

use filter_tree_rs::{deserialize, validate_tree};

use super::{read_tree, CommandContext, CommandError, Result};
use crate::output::{format_validation_json, format_validation_table};

/// Executes the validate command.
///
/// Prints the result, then fails with `CommandError::InvalidTree` if any
/// condition broke its operator's rule.
pub fn execute(ctx: &CommandContext, source: &str) -> Result<()> {
    let wire = read_tree(source)?;
    let mut ids = ctx.id_generator();
    let tree = deserialize(&wire, &mut ids);
    let result = validate_tree(&tree);

    if ctx.json_output {
        println!("{}", format_validation_json(&result)?);
    } else if !ctx.quiet || !result.valid {
        print!("{}", format_validation_table(&result, &tree, ctx.use_colors));
    }

    if result.valid {
        Ok(())
    } else {
        Err(CommandError::InvalidTree {
            count: result.errors.len(),
        })
    }
}
