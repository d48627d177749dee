//! Output formatting utilities for the ftree CLI.
//!
//! This module provides functions for formatting data as text or JSON.
//! It is organized into submodules by what is printed:
//!
//! - [`tree`] - Canonical tree output (inspect)
//! - [`validation`] - Validation results (validate)
//! - [`records`] - Matched records (apply)
//! - [`helpers`] - Common formatting utilities (truncation, values)

pub mod helpers;
mod records;
mod tree;
mod validation;

pub use records::{format_records_json, format_records_table};
pub use tree::{format_tree_json, format_tree_table};
pub use validation::{format_validation_json, format_validation_table};
