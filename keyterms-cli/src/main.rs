mod api;
mod catalog;
mod cli;
mod config;
mod services;

use anyhow::{Context, Result};
use clap::Parser;
use colored::*;
use log::{LevelFilter, debug};
use std::sync::Arc;

use api::KeytermsClient;
use catalog::TransformCatalog;
use cli::commands::{
    catalog as catalog_commands, reference as reference_commands, transform as transform_commands,
};
use cli::{Cli, Commands, EmojiCommands};
use config::Config;
use services::{ReferenceService, TransformService};

fn init_logging(config: &Config, verbose: u8) {
    let level = match verbose {
        0 => config.log_level.filter(),
        1 => LevelFilter::Info.max(config.log_level.filter()),
        2 => LevelFilter::Debug.max(config.log_level.filter()),
        _ => LevelFilter::Trace,
    };

    // RUST_LOG still wins when set
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_timestamp(None)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(url) = cli.url {
        config.api.url = url;
    }

    init_logging(&config, cli.verbose);
    match Config::resolve_path(cli.config.as_deref()) {
        Some(path) => debug!("Loaded config from {}", path.display()),
        None => debug!("No config file found, using defaults"),
    }
    debug!("Using keyterms service at {}", config.api.url);

    let client = Arc::new(
        KeytermsClient::new(config.client_config()).context("Failed to initialize API client")?,
    );
    let catalog = TransformCatalog::new(client.clone())
        .with_single_flight(config.catalog.single_flight);
    let service = TransformService::new(&catalog, client.clone());
    let reference = ReferenceService::new(client);

    match cli.command {
        Commands::Keys { custom } => catalog_commands::handle_keys(&catalog, custom).await,
        Commands::Sources { all } => catalog_commands::handle_sources(&catalog, all).await,
        Commands::Targets { source, all } => {
            catalog_commands::handle_targets(&catalog, &source, all).await
        }
        Commands::Schemes {
            source,
            target,
            all,
        } => catalog_commands::handle_schemes(&catalog, &source, &target, all).await,
        Commands::Resolve {
            source,
            target,
            scheme,
        } => catalog_commands::handle_resolve(&catalog, &source, &target, scheme.as_deref()).await,
        Commands::Describe { key } => catalog_commands::handle_describe(&catalog, &key).await,
        Commands::Transform(args) => {
            transform_commands::handle_transform_command(args, &catalog, &service).await
        }
        Commands::Profile(input) => {
            transform_commands::handle_profile_command(input, &service).await
        }
        Commands::Iso { kind, query } => {
            reference_commands::handle_iso(&reference, kind, &query).await
        }
        Commands::Emoji { command } => match command {
            EmojiCommands::Tokenize(input) => {
                reference_commands::handle_emoji_tokenize(&reference, input).await
            }
            EmojiCommands::Define { text } => {
                reference_commands::handle_emoji_define(&reference, &text).await
            }
        },
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }

    if let Err(e) = run(cli).await {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}
