//! Streaming scan command

use super::{spinner, Session};
use anyhow::{Context, Result};
use tracing::info;

/// Walk every root and print matching assets as they are found
pub async fn scan_command(session: Session, query: Option<String>) -> Result<()> {
    let query = query.unwrap_or_default();
    info!("Scanning search paths for: {:?}", query);

    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    let engine = session.engine.clone();
    let walk = tokio::spawn({
        let query = query.clone();
        async move { engine.stream_assets(&query, false, tx).await }
    });

    let progress = spinner("Scanning...");
    let mut found = 0usize;
    while let Some(asset) = rx.recv().await {
        found += 1;
        progress.set_message(format!("Scanning... {} found", found));
        progress.suspend(|| println!("{}", asset));
    }
    progress.finish_and_clear();

    let sent = walk.await.context("Scan task failed")??;
    info!("Scan finished with {} assets", sent);
    eprintln!("{} assets found", sent);
    Ok(())
}
