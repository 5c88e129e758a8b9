//! caseprep CLI - Debate case preparation from the terminal
//!
//! Every edit goes through the field synchronizer: leaf edits are written
//! when editing ends, list changes are written straight away.

mod auth;
mod cli;
mod commands;
mod config_profiles;
mod error;
#[cfg(test)]
mod tests;

use clap::Parser;

use crate::cli::{Cli, Commands};
use crate::commands::auth_cmd::run_auth;
use crate::commands::common::CommandContext;
use crate::commands::config::run_config;
use crate::commands::contention::run_contention;
use crate::commands::definition::run_definition;
use crate::commands::framework::run_framework;
use crate::commands::list::run_list;
use crate::commands::new::run_new;
use crate::commands::resolved::run_resolved;
use crate::commands::round::run_round;
use crate::commands::show::run_show;
use crate::error::CliError;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), CliError> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("caseprep=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let ctx = CommandContext::new(cli.profile.clone(), cli.db_path);

    match cli.command {
        Commands::New { json } => run_new(json, &ctx).await,
        Commands::List { json } => run_list(json, &ctx).await,
        Commands::Show { id, side, json } => run_show(&id, side, json, &ctx).await,
        Commands::Resolved { id, text } => run_resolved(&id, &text, &ctx).await,
        Commands::Framework { target, text } => run_framework(&target, &text, &ctx).await,
        Commands::Definition { command } => run_definition(command, &ctx).await,
        Commands::Contention { command } => run_contention(command, &ctx).await,
        Commands::Round { command } => run_round(command, &ctx).await,
        Commands::Config { command } => run_config(command, cli.profile.as_deref()),
        Commands::Auth { command } => run_auth(command, cli.profile.as_deref()).await,
    }
}
