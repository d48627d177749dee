//! Normalize command implementation.
//!
//! Decodes a wire tree, builds the canonical tree and serializes it again.
//! The output always has a logical root, at most one operator key per group
//! and no `value` key on conditions without a value.

use filter_tree_rs::{deserialize, serialize, TreeNode};

use super::{read_tree, CommandContext, Result};

/// Returns the normalized form of a wire tree.
pub fn normalize(tree: &TreeNode, ctx: &CommandContext) -> TreeNode {
    let mut ids = ctx.id_generator();
    serialize(&deserialize(tree, &mut ids))
}

/// Executes the normalize command.
pub fn execute(ctx: &CommandContext, source: &str) -> Result<()> {
    let tree = read_tree(source)?;
    let normalized = normalize(&tree, ctx);
    println!("{}", serde_json::to_string_pretty(&normalized)?);
    Ok(())
}
