//! Interactive asset selection command

use super::Session;
use anyhow::Result;
use async_trait::async_trait;
use console::style;
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Input, Select};
use scene_browser_core::select::{AssetSelection, SelectionAction, SelectionView};
use scene_browser_core::{AssetSelector, Error};
use tracing::info;

/// Selection screen drawn with terminal prompts
#[derive(Debug, Default)]
pub struct TerminalView;

/// One line of the selection menu
enum MenuEntry {
    Asset(String),
    SearchAgain,
    Cancel,
}

/// Flatten grouped results into menu lines and their meaning
fn menu_entries(selection: &AssetSelection) -> (Vec<String>, Vec<MenuEntry>) {
    let mut labels = Vec::new();
    let mut entries = Vec::new();

    for group in selection.groups.iter().flatten() {
        for asset in &group.assets {
            let kind = if asset.is_video {
                "video"
            } else if asset.is_image {
                "image"
            } else {
                "file"
            };
            labels.push(format!(
                "[{}] {} {} {}",
                group.term,
                asset.label,
                style(kind).dim(),
                style(&asset.path).dim()
            ));
            entries.push(MenuEntry::Asset(asset.path.clone()));
        }
    }

    labels.push("Search again...".to_string());
    entries.push(MenuEntry::SearchAgain);
    labels.push("Cancel".to_string());
    entries.push(MenuEntry::Cancel);

    (labels, entries)
}

fn prompt(theme: &ColorfulTheme, selection: &AssetSelection) -> dialoguer::Result<SelectionAction> {
    println!("{}", style(&selection.title).bold());
    if selection.groups.is_none() {
        println!(
            "{}",
            style(format!("No assets found for '{}'", selection.query)).yellow()
        );
    }

    let (labels, mut entries) = menu_entries(selection);
    let choice = Select::with_theme(theme)
        .with_prompt(format!("Results for '{}'", selection.query))
        .items(&labels)
        .default(0)
        .interact_opt()?;

    let Some(index) = choice else {
        return Ok(SelectionAction::Cancelled);
    };

    match entries.swap_remove(index) {
        MenuEntry::Asset(path) => Ok(SelectionAction::Selected(path)),
        MenuEntry::Cancel => Ok(SelectionAction::Cancelled),
        MenuEntry::SearchAgain => {
            let query: String = Input::with_theme(theme)
                .with_prompt("Search for")
                .with_initial_text(selection.query.clone())
                .interact_text()?;
            Ok(SelectionAction::Search(query))
        }
    }
}

#[async_trait]
impl SelectionView for TerminalView {
    async fn render(&self, selection: AssetSelection) -> scene_browser_core::Result<SelectionAction> {
        tokio::task::spawn_blocking(move || prompt(&ColorfulTheme::default(), &selection))
            .await
            .map_err(|e| Error::Generic(format!("Selection prompt failed: {}", e)))?
            .map_err(|e| Error::Generic(format!("Selection prompt failed: {}", e)))
    }
}

/// Search for `query` and let the user pick an asset
pub async fn select_command(session: Session, query: String) -> Result<()> {
    info!("Selecting asset for: {}", query);
    session.warm_cache().await;

    let title = format!("Select background ({})", session.config.settings_path.display());
    let selector = AssetSelector::new(session.engine.clone(), TerminalView).with_title(title);

    let chosen = selector
        .display_asset_select(&query, |path| info!("Selected asset: {}", path))
        .await?;

    match chosen {
        Some(path) => println!("{}", path),
        None => eprintln!("{}", style("Selection cancelled").yellow()),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use scene_browser_core::select::{AssetDescriptor, AssetGroup};

    #[test]
    fn test_menu_entries() {
        let selection = AssetSelection {
            title: "Select".to_string(),
            query: "cave".to_string(),
            groups: Some(vec![AssetGroup {
                term: "cave".to_string(),
                assets: vec![AssetDescriptor {
                    path: "maps/Cave.webm".to_string(),
                    is_image: false,
                    is_video: true,
                    is_media: true,
                    label: "Cave".to_string(),
                }],
            }]),
        };

        let (labels, entries) = menu_entries(&selection);
        assert_eq!(labels.len(), 3);
        assert!(labels[0].contains("maps/Cave.webm"));
        assert!(matches!(&entries[0], MenuEntry::Asset(path) if path == "maps/Cave.webm"));
        assert!(matches!(entries[2], MenuEntry::Cancel));
    }

    #[test]
    fn test_menu_without_results() {
        let selection = AssetSelection {
            title: "Select".to_string(),
            query: "dragon".to_string(),
            groups: None,
        };

        let (labels, entries) = menu_entries(&selection);
        assert_eq!(labels, vec!["Search again...", "Cancel"]);
        assert!(matches!(entries[0], MenuEntry::SearchAgain));
    }
}
