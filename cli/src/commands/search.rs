//! One-shot search command

use super::Session;
use anyhow::{Context, Result};
use colored::Colorize;
use scene_browser_core::select::AssetSelection;
use tracing::info;

/// Options for the search command
#[derive(Debug, Clone, Default)]
pub struct SearchOptions {
    /// Search the full query only
    pub no_keywords: bool,
    /// Walk every root instead of building the cache first
    pub no_cache: bool,
    /// Print results as JSON
    pub json: bool,
}

/// Run a keyword search and print the grouped results
pub async fn search_command(session: Session, query: String, options: SearchOptions) -> Result<()> {
    info!("Searching for: {}", query);

    if !options.no_cache {
        session.warm_cache().await;
    }

    let results = session
        .engine
        .search_with_keywords(&query, options.no_keywords)
        .await?;
    let selection = AssetSelection::from_results("Search results", &query, &results);

    if options.json {
        let json = serde_json::to_string_pretty(&selection).context("Failed to encode results")?;
        println!("{}", json);
        return Ok(());
    }

    let Some(groups) = &selection.groups else {
        println!("{}", format!("No assets found for '{}'", query).yellow());
        return Ok(());
    };

    for group in groups.iter().filter(|g| !g.assets.is_empty()) {
        println!("{} ({})", group.term.bold(), group.assets.len());
        for asset in &group.assets {
            let kind = if asset.is_video {
                "video".magenta()
            } else if asset.is_image {
                "image".cyan()
            } else {
                "file".dimmed()
            };
            println!("  {:<32} {:<6} {}", asset.label, kind, asset.path.dimmed());
        }
    }

    println!(
        "\n{} assets across {} search terms",
        results.total().to_string().green(),
        groups.len()
    );
    Ok(())
}
