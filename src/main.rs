//! iacdeploy CLI
//!
//! Usage: iacdeploy <COMMAND>
//!
//! Commands:
//!   run             Replace tokens, validate, deploy, publish outputs, remove
//!   replace-tokens  Substitute tokens in a parameter file
//!   validate        Validate a template at its scope
//!   deploy          Validate and deploy without removing
//!   remove          Remove what a deployment created

mod cli;
mod commands;
mod ui;

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Commands};

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let json = cli.json;
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            ui::error::print_error(&e, json);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let ctx = ui::context::UiContext::new(cli.json, cli.verbose);
    let settings = commands::load_settings(&cli.global(), &ctx)?;

    match cli.command {
        Commands::Run(args) => commands::run::cmd_run(args, settings, &ctx),
        Commands::ReplaceTokens(args) => {
            commands::replace_tokens::cmd_replace_tokens(args, settings, &ctx)
        }
        Commands::Validate(args) => commands::validate::cmd_validate(args, settings, &ctx),
        Commands::Deploy(args) => commands::deploy::cmd_deploy(args, settings, &ctx),
        Commands::Remove(args) => commands::remove::cmd_remove(args, settings, &ctx),
    }
}

/// Logs go to stderr; `RUST_LOG` wins over `-v`
fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(verbose >= 2)
        .with_line_number(verbose >= 3)
        .try_init();
}
