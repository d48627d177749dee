//! CLI argument parsing using clap derive macros.
//!
//! This module defines the command-line interface for the ftree CLI.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// ftree - inspect, edit, validate and apply boolean filter trees
#[derive(Parser, Debug)]
#[command(name = "ftree")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbose output (show debug information)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Force JSON output
    #[arg(long, global = true)]
    pub json: bool,

    /// Disable colors in output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Config file to use instead of the default location
    #[arg(long, global = true, env = "FTREE_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Re-emit a wire tree in normalized form
    #[command(alias = "n")]
    Normalize {
        /// Wire tree JSON file ('-' for stdin)
        tree: String,
    },

    /// Show the canonical tree with node ids
    #[command(alias = "i")]
    Inspect {
        /// Wire tree JSON file ('-' for stdin)
        tree: String,

        /// Field schema file (TOML or JSON)
        #[arg(short, long)]
        schema: Option<PathBuf>,
    },

    /// Check every condition's value against its operator
    #[command(alias = "v")]
    Validate {
        /// Wire tree JSON file ('-' for stdin)
        tree: String,
    },

    /// Filter records with a tree
    #[command(alias = "a")]
    Apply {
        /// Wire tree JSON file ('-' for stdin)
        tree: String,

        /// JSON array of records ('-' for stdin)
        #[arg(short, long)]
        data: String,
    },

    /// Apply structural edits and print the resulting tree
    #[command(alias = "e")]
    Edit {
        /// Wire tree JSON file ('-' for stdin); starts empty when omitted
        tree: Option<String>,

        /// Edit to apply, in order (repeatable), e.g. "add-condition@" or "value@0=30"
        #[arg(short, long = "edit", action = clap::ArgAction::Append, required = true)]
        edits: Vec<String>,

        /// Field schema file (TOML or JSON)
        #[arg(short, long)]
        schema: Option<PathBuf>,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show current configuration
    Show,

    /// Write a commented default config file if none exists
    Init,

    /// Set a configuration value
    Set {
        /// Configuration key (schema, output.color, output.json, ids.style)
        key: String,

        /// Configuration value
        value: String,
    },

    /// Show config file path
    Path,
}

/// Shell types for completions
#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    Powershell,
}
