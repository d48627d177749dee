//! Command implementations for the ftree CLI.
//!
//! This module contains the actual command handlers that are invoked by the CLI,
//! plus the input helpers they share.

pub mod apply;
pub mod completions;
pub mod config;
pub mod edit;
pub mod inspect;
pub mod normalize;
pub mod validate;

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use filter_tree_rs::{FilterError, IdGenerator, Schema, TreeNode};
use serde_json::Value;
use tracing::debug;

use crate::cli::Cli;
use config::{Config, IdStyle};

/// Error type for command execution.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    /// Tree decoding or edit error.
    #[error("filter error: {0}")]
    Filter(#[from] FilterError),

    /// The tree decoded but failed validation.
    #[error("tree is invalid ({count} validation error(s))")]
    InvalidTree { count: usize },

    /// Malformed command input (edit specs, records, schema files).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for command execution.
pub type Result<T> = std::result::Result<T, CommandError>;

/// Context for command execution, containing common dependencies.
pub struct CommandContext {
    /// Whether to output JSON.
    pub json_output: bool,
    /// Whether to use colors.
    pub use_colors: bool,
    /// Whether to be quiet (errors only).
    pub quiet: bool,
    /// Whether to be verbose.
    pub verbose: bool,
    /// Explicit config file path (`--config` / `FTREE_CONFIG`).
    pub config_path: Option<PathBuf>,
    /// Default schema file from the config.
    pub schema_path: Option<PathBuf>,
    /// How new node ids are generated.
    pub id_style: IdStyle,
}

impl CommandContext {
    /// Creates a new command context from CLI arguments and the loaded config.
    ///
    /// Flags win over config values; `NO_COLOR` disables colors.
    pub fn new(cli: &Cli, config: &Config) -> Self {
        let color_allowed = std::env::var_os("NO_COLOR").is_none();
        Self {
            json_output: cli.json || config.output.json.unwrap_or(false),
            use_colors: !cli.no_color && color_allowed && config.output.color.unwrap_or(true),
            quiet: cli.quiet,
            verbose: cli.verbose,
            config_path: cli.config.clone(),
            schema_path: config.schema.clone(),
            id_style: config.ids.style.unwrap_or_default(),
        }
    }

    /// Returns a fresh id generator of the configured style.
    pub fn id_generator(&self) -> Box<dyn IdGenerator> {
        self.id_style.generator()
    }

    /// Loads the schema named on the command line, else the configured one,
    /// else an empty schema.
    pub fn load_schema(&self, flag: Option<&Path>) -> Result<Schema> {
        match flag.or(self.schema_path.as_deref()) {
            Some(path) => load_schema(path),
            None => Ok(Schema::default()),
        }
    }
}

/// Reads a whole input source: a file path, or `-` for stdin.
pub fn read_source(source: &str) -> Result<String> {
    if source == "-" {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf)?;
        return Ok(buf);
    }
    Ok(fs::read_to_string(source)?)
}

/// Reads and decodes a wire tree.
pub fn read_tree(source: &str) -> Result<TreeNode> {
    let text = read_source(source)?;
    let tree = TreeNode::from_json_str(&text)?;
    debug!(source, logical = tree.is_logical(), "read filter tree");
    Ok(tree)
}

/// Reads a wire tree as raw JSON, without decoding it.
pub fn read_tree_json(source: &str) -> Result<Value> {
    let text = read_source(source)?;
    let tree: Value = serde_json::from_str(&text).map_err(FilterError::from)?;
    debug!(source, "read filter tree");
    Ok(tree)
}

/// Loads a field schema from a TOML or JSON file, picked by extension.
pub fn load_schema(path: &Path) -> Result<Schema> {
    let text = fs::read_to_string(path)?;
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    let schema: Schema = if is_json {
        serde_json::from_str(&text).map_err(|e| {
            CommandError::InvalidInput(format!("bad schema {}: {}", path.display(), e))
        })?
    } else {
        toml::from_str(&text).map_err(|e| {
            CommandError::InvalidInput(format!("bad schema {}: {}", path.display(), e))
        })?
    };

    debug!(path = %path.display(), fields = schema.fields.len(), "loaded schema");
    Ok(schema)
}
