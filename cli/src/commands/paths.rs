//! Search path management command

use super::Session;
use anyhow::{anyhow, Result};
use clap::Subcommand;
use colored::Colorize;
use dialoguer::Editor;
use scene_browser_core::search::{PathClassifier, SearchPathEntry};
use scene_browser_core::BrowserSettings;
use tracing::info;

#[derive(Subcommand, Debug, Clone)]
pub enum PathsAction {
    /// Show configured search paths and how they are classified
    List,

    /// Resolve search paths, walking cloud drives, and show the result
    Resolve,

    /// Add search paths
    Add {
        #[arg(required = true)]
        paths: Vec<String>,
    },

    /// Remove search paths
    Remove {
        #[arg(required = true)]
        paths: Vec<String>,
    },

    /// Edit the search paths in $EDITOR, one per line
    Edit,
}

fn describe(entry: &SearchPathEntry) -> String {
    match entry {
        SearchPathEntry::Local(_) => "local".to_string(),
        SearchPathEntry::S3 { bucket, path } => format!("s3 bucket '{}' at '{}'", bucket, path),
        SearchPathEntry::Cloud { user_id, path, .. } => {
            format!("cloud drive of '{}' at '{}'", user_id, path)
        }
    }
}

/// Search paths after adding `added`, keeping the first occurrence of each
fn with_added(settings: &BrowserSettings, added: &[String]) -> Vec<String> {
    let mut paths = settings.search_paths.clone();
    for path in added {
        if !paths.contains(path) {
            paths.push(path.clone());
        }
    }
    paths
}

pub async fn paths_command(session: Session, action: PathsAction) -> Result<()> {
    let engine = &session.engine;
    let mut settings = engine.settings().await;

    match action {
        PathsAction::List => {
            let classifier = PathClassifier::new(&session.config.backends.cloud.asset_host);
            if settings.search_paths.is_empty() {
                println!("{}", "No search paths configured".yellow());
            }
            for raw in &settings.search_paths {
                println!("{}  {}", raw.bold(), describe(&classifier.classify(raw)).dimmed());
            }
            if !settings.cloud_paths.is_empty() {
                println!("\n{}", "Remembered cloud paths".bold());
                for path in &settings.cloud_paths {
                    println!("  {}", path);
                }
            }
            return Ok(());
        }
        PathsAction::Resolve => {
            let resolved = engine.resolve_search_paths().await;
            for root in resolved.roots() {
                println!("{}", root);
            }
            return Ok(());
        }
        PathsAction::Add { paths } => {
            settings.search_paths = with_added(&settings, &paths);
        }
        PathsAction::Remove { paths } => {
            let before = settings.search_paths.len();
            settings.search_paths.retain(|p| !paths.contains(p));
            if settings.search_paths.len() == before {
                return Err(anyhow!("None of the given paths are configured"));
            }
        }
        PathsAction::Edit => {
            let edited = Editor::new()
                .extension(".txt")
                .edit(&settings.search_paths_text())?;
            match edited {
                Some(text) => settings.set_search_paths_from_text(&text),
                None => {
                    println!("{}", "Search paths unchanged".yellow());
                    return Ok(());
                }
            }
        }
    }

    info!("Saving {} search paths", settings.search_paths.len());
    if let Some(outcome) = engine.update_settings(settings).await? {
        info!("Cache rebuild after path change: {:?}", outcome);
    }
    println!(
        "{} {}",
        "Saved search paths to".green(),
        session.config.settings_path.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_added_skips_duplicates() {
        let settings = BrowserSettings {
            search_paths: vec!["maps/".to_string()],
            ..BrowserSettings::default()
        };
        let paths = with_added(
            &settings,
            &["s3:bucket:maps".to_string(), "maps/".to_string()],
        );
        assert_eq!(paths, vec!["maps/", "s3:bucket:maps"]);
    }

    #[test]
    fn test_describe() {
        let classifier = PathClassifier::default();
        assert_eq!(
            describe(&classifier.classify("s3:bucket:maps")),
            "s3 bucket 'bucket' at 'maps'"
        );
        assert_eq!(describe(&classifier.classify("maps/")), "local");
    }
}
