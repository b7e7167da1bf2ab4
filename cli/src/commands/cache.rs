//! Cache rebuild command

use super::{spinner, Session};
use anyhow::Result;
use colored::Colorize;
use scene_browser_core::search::RebuildOutcome;
use std::time::Instant;
use tracing::info;

/// Rebuild the asset cache and print its statistics
pub async fn cache_command(session: Session) -> Result<()> {
    let started = Instant::now();
    let progress = spinner("Rebuilding asset cache...");
    let outcome = session.engine.rebuild_cache().await;
    progress.finish_and_clear();

    match outcome {
        RebuildOutcome::Disabled => {
            println!("{}", "Caching is disabled, nothing was cached".yellow());
            return Ok(());
        }
        RebuildOutcome::Coalesced => info!("Rebuild coalesced with one already running"),
        RebuildOutcome::Rebuilt { assets } => info!("Cache rebuilt with {} assets", assets),
    }

    let stats = session.engine.cache_stats().await;
    println!("{}", "Asset cache".bold());
    println!("  State:    {}", stats.state.as_str().green());
    println!("  Assets:   {}", stats.assets);
    println!("  Images:   {}", stats.images);
    println!("  Videos:   {}", stats.videos);
    println!("  Rebuilds: {}", stats.rebuilds);
    println!("  Took:     {:.2?}", started.elapsed());
    Ok(())
}
