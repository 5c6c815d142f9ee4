//! Evidex CLI
//!
//! Parse forensic evidence into searchable cases.

use anyhow::Result;
use clap::Parser;
use evidex_core::error::exit_codes;
use evidex_core::{Config, EvidexError};

mod app;
mod commands;
mod progress;

use app::{Cli, Commands};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .init();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {:#}", e);
        let code = e
            .downcast_ref::<EvidexError>()
            .map(EvidexError::exit_code)
            .unwrap_or(exit_codes::GENERAL_ERROR);
        std::process::exit(code);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    tracing::debug!("Using cases directory {}", config.cases_dir.display());

    match cli.command {
        Commands::Case(args) => commands::case::run(args, &config, cli.format).await,
        Commands::Parse(args) => commands::parse::run(args, &config, cli.format).await,
        Commands::Search(args) => commands::search::run(args, &config, cli.format).await,
        Commands::Status(args) => commands::status::run(args, &config, cli.format).await,
        Commands::Bookmark(args) => commands::bookmark::run(args, &config, cli.format).await,
        Commands::Tag(args) => commands::tag::run(args, &config, cli.format).await,
        Commands::Parsers => commands::parsers::run(&config, cli.format).await,
    }
}
