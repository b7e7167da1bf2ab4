//! # scene-browser CLI
//!
//! Command-line interface for scene-browser - find scene backgrounds across
//! local data directories, S3 buckets and a cloud asset host.
//!
//! ## Usage
//!
//! - `scene-browser select "ancient temple"` - Search and pick an asset interactively
//! - `scene-browser search tavern` - Print keyword-grouped matches
//! - `scene-browser scan` - Stream every asset below the search paths
//! - `scene-browser cache` - Rebuild the asset cache and show statistics
//! - `scene-browser paths list` - Show configured search paths
//! - `scene-browser settings show` - Show current settings

use anyhow::Result;
use clap::{Parser, Subcommand};
use scene_browser_core::config::Permissions;
use scene_browser_core::init_tracing_with_debug;
use std::path::PathBuf;

mod commands;
mod config;

use commands::{
    cache_command, paths_command, scan_command, search_command, select_command, settings_command,
    search::SearchOptions, PathsAction, Session, SettingsAction,
};
use config::{expand_path, CliConfigLoader};

/// scene-browser - find scene backgrounds by name
#[derive(Parser)]
#[command(name = "scene-browser")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Search local, S3 and cloud storage for scene background assets")]
#[command(long_about = None)]
struct Cli {
    /// Settings file or directory path
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Directory local search paths are resolved against
    #[arg(long, global = true, env = "SCENE_BROWSER_DATA_ROOT")]
    data_root: Option<String>,

    /// Authenticated cloud host user id
    #[arg(long, global = true)]
    user: Option<String>,

    /// Never write settings or remembered cloud paths
    #[arg(long, global = true)]
    read_only: bool,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search and pick an asset interactively
    Select {
        /// Search query
        #[arg(required = true)]
        query: Vec<String>,
    },

    /// Search and print matches grouped by search term
    Search {
        /// Search query
        #[arg(required = true)]
        query: Vec<String>,

        /// Only search the full query, not its keywords
        #[arg(long)]
        no_keywords: bool,

        /// Walk every search path instead of building the cache first
        #[arg(long)]
        no_cache: bool,

        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print matching assets as they are found
    Scan {
        /// Search query; every asset is printed when omitted
        query: Option<String>,
    },

    /// Rebuild the asset cache and show statistics
    Cache,

    /// Manage search paths
    Paths {
        #[command(subcommand)]
        action: PathsAction,
    },

    /// Inspect or change settings
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },
}

/// Build a configuration loader from CLI arguments
fn build_config_loader(cli: &Cli) -> Result<CliConfigLoader> {
    let mut loader = CliConfigLoader::new();

    if let Some(config_path) = &cli.config {
        loader = loader.with_config_override(expand_path(config_path)?);
    }

    if let Some(data_root) = &cli.data_root {
        loader = loader.with_data_root_override(PathBuf::from(data_root));
    }

    if let Some(user) = &cli.user {
        loader = loader.with_user_override(user.clone());
    }

    Ok(loader)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Configuration decides whether debug logging is on
    let config = build_config_loader(&cli)?.load().await?;

    // Initialize tracing
    init_tracing_with_debug(cli.verbose || config.settings.debug);

    let permissions = if cli.read_only {
        Permissions::read_only()
    } else {
        Permissions::all()
    };
    let session = Session::open(config, permissions).await?;

    match cli.command {
        Commands::Select { query } => select_command(session, query.join(" ")).await,
        Commands::Search {
            query,
            no_keywords,
            no_cache,
            json,
        } => {
            let options = SearchOptions {
                no_keywords,
                no_cache,
                json,
            };
            search_command(session, query.join(" "), options).await
        }
        Commands::Scan { query } => scan_command(session, query).await,
        Commands::Cache => cache_command(session).await,
        Commands::Paths { action } => paths_command(session, action).await,
        Commands::Settings { action } => settings_command(session, action).await,
    }
}
