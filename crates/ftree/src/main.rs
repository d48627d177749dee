use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;
mod output;

use cli::{Cli, Commands, ConfigCommands};
use commands::config::{load_config, ConfigSetOptions};
use commands::{apply, completions, config, edit, inspect, normalize, validate};
use commands::{CommandContext, CommandError};

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(&cli);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if cli.json {
                let error_json = serde_json::json!({
                    "error": {
                        "code": error_code(&e),
                        "message": e.to_string(),
                    }
                });
                match serde_json::to_string_pretty(&error_json) {
                    Ok(text) => eprintln!("{text}"),
                    Err(_) => eprintln!("Error: {e}"),
                }
            } else if !matches!(e, CommandError::InvalidTree { .. }) || !cli.quiet {
                eprintln!("Error: {e}");
            }
            ExitCode::from(exit_status(&e))
        }
    }
}

/// Installs the stderr log writer. `RUST_LOG` wins over the verbosity flags.
fn init_tracing(cli: &Cli) {
    let default_level = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "warn"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .with_ansi(!cli.no_color)
        .init();
}

fn run(cli: &Cli) -> commands::Result<()> {
    let settings = load_config(cli.config.as_deref())?;
    let ctx = CommandContext::new(cli, &settings);

    match &cli.command {
        Commands::Normalize { tree } => normalize::execute(&ctx, tree),
        Commands::Inspect { tree, schema } => inspect::execute(
            &ctx,
            &inspect::InspectOptions {
                tree,
                schema: schema.as_deref(),
            },
        ),
        Commands::Validate { tree } => validate::execute(&ctx, tree),
        Commands::Apply { tree, data } => apply::execute(&ctx, &apply::ApplyOptions { tree, data }),
        Commands::Edit {
            tree,
            edits,
            schema,
        } => edit::execute(
            &ctx,
            &edit::EditOptions {
                tree: tree.as_deref(),
                edits,
                schema: schema.as_deref(),
            },
        ),
        Commands::Config { command } => match command {
            ConfigCommands::Show => config::execute_show(&ctx),
            ConfigCommands::Init => config::execute_init(&ctx),
            ConfigCommands::Set { key, value } => config::execute_set(
                &ctx,
                &ConfigSetOptions {
                    key: key.clone(),
                    value: value.clone(),
                },
            ),
            ConfigCommands::Path => config::execute_path(&ctx),
        },
        Commands::Completions { shell } => Ok(completions::execute(*shell)?),
    }
}

/// Returns the error code string for JSON output.
fn error_code(e: &CommandError) -> &'static str {
    match e {
        CommandError::Filter(_) => "FILTER_ERROR",
        CommandError::InvalidTree { .. } => "INVALID_TREE",
        CommandError::InvalidInput(_) => "INVALID_INPUT",
        CommandError::Config(_) => "CONFIG_ERROR",
        CommandError::Io(_) => "IO_ERROR",
        CommandError::Json(_) => "JSON_ERROR",
    }
}

/// Returns the process exit status for an error.
fn exit_status(e: &CommandError) -> u8 {
    match e {
        CommandError::Config(_) => 5,
        CommandError::Io(_) => 3,
        CommandError::Filter(_)
        | CommandError::InvalidTree { .. }
        | CommandError::InvalidInput(_)
        | CommandError::Json(_) => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use filter_tree_rs::FilterError;
    use std::io;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            error_code(&CommandError::Filter(FilterError::EmptySchema)),
            "FILTER_ERROR"
        );
        assert_eq!(
            error_code(&CommandError::InvalidTree { count: 2 }),
            "INVALID_TREE"
        );
        assert_eq!(
            error_code(&CommandError::Config("x".to_string())),
            "CONFIG_ERROR"
        );
        assert_eq!(
            error_code(&CommandError::Io(io::Error::new(io::ErrorKind::NotFound, "x"))),
            "IO_ERROR"
        );
    }

    #[test]
    fn test_exit_statuses() {
        assert_eq!(exit_status(&CommandError::Config("x".to_string())), 5);
        assert_eq!(
            exit_status(&CommandError::Io(io::Error::new(io::ErrorKind::NotFound, "x"))),
            3
        );
        assert_eq!(exit_status(&CommandError::InvalidTree { count: 1 }), 1);
        assert_eq!(exit_status(&CommandError::InvalidInput("x".to_string())), 1);
        assert_eq!(
            exit_status(&CommandError::Filter(FilterError::invalid_path("x"))),
            1
        );
    }

    #[test]
    fn test_invalid_tree_message() {
        let e = CommandError::InvalidTree { count: 3 };
        assert_eq!(e.to_string(), "tree is invalid (3 validation error(s))");
    }
}
