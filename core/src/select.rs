// Asset selection interface for UI collaborators
//
// The selector runs searches and hands grouped results to a view. The view
// decides how to present them and reports back what the user did.

use crate::error::Result;
use crate::search::{AssetRecord, AssetSearchEngine, KeywordSearchResults};
use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

/// Title shown above the selection list
pub const DEFAULT_SELECT_TITLE: &str = "Select Background";

/// One selectable asset with display information
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssetDescriptor {
    /// Path to hand back when selected
    pub path: String,
    pub is_image: bool,
    pub is_video: bool,
    /// Whether the asset can be previewed at all
    pub is_media: bool,
    /// File name without extension
    pub label: String,
}

impl From<&AssetRecord> for AssetDescriptor {
    fn from(asset: &AssetRecord) -> Self {
        let is_image = asset.is_image();
        let is_video = asset.is_video();
        Self {
            path: asset.path().to_string(),
            is_image,
            is_video,
            is_media: is_image || is_video,
            label: asset.label(),
        }
    }
}

/// Assets found for one search term
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssetGroup {
    pub term: String,
    pub assets: Vec<AssetDescriptor>,
}

/// Everything a view needs to render one selection screen
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssetSelection {
    pub title: String,
    pub query: String,
    /// Groups in search-term order, `None` when nothing was found
    pub groups: Option<Vec<AssetGroup>>,
}

impl AssetSelection {
    pub fn from_results(title: &str, query: &str, results: &KeywordSearchResults) -> Self {
        let groups = if results.is_empty() {
            None
        } else {
            Some(
                results
                    .iter()
                    .map(|(term, assets)| AssetGroup {
                        term: term.to_string(),
                        assets: assets.iter().map(AssetDescriptor::from).collect(),
                    })
                    .collect(),
            )
        };

        Self {
            title: title.to_string(),
            query: query.to_string(),
            groups,
        }
    }
}

/// What the user did with a selection screen
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionAction {
    /// An asset path was picked
    Selected(String),
    /// Search again with a new query
    Search(String),
    Cancelled,
}

/// Presents selection screens to the user
#[async_trait]
pub trait SelectionView: Send + Sync {
    async fn render(&self, selection: AssetSelection) -> Result<SelectionAction>;
}

/// Drives search, render and re-search until the user picks or cancels
pub struct AssetSelector<V> {
    engine: Arc<AssetSearchEngine>,
    view: V,
    title: String,
}

impl<V: SelectionView> AssetSelector<V> {
    pub fn new(engine: Arc<AssetSearchEngine>, view: V) -> Self {
        Self {
            engine,
            view,
            title: DEFAULT_SELECT_TITLE.to_string(),
        }
    }

    pub fn with_title<S: Into<String>>(mut self, title: S) -> Self {
        self.title = title.into();
        self
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    /// Run a keyword search for `query` and show the results.
    ///
    /// `on_select` receives the chosen path. Returns the chosen path, or
    /// `None` when the user cancelled.
    pub async fn display_asset_select<F>(&self, query: &str, on_select: F) -> Result<Option<String>>
    where
        F: FnOnce(&str) + Send,
    {
        let mut query = query.to_string();
        loop {
            debug!(query = %query, "Displaying asset selection");
            let results = self.engine.search_with_keywords(&query, false).await?;
            let selection = AssetSelection::from_results(&self.title, &query, &results);

            match self.view.render(selection).await? {
                SelectionAction::Selected(path) => {
                    on_select(&path);
                    return Ok(Some(path));
                }
                SelectionAction::Search(next) => query = next,
                SelectionAction::Cancelled => return Ok(None),
            }
        }
    }

    /// Rebuild the engine's asset cache
    pub async fn cache_backgrounds(&self) -> crate::search::RebuildOutcome {
        self.engine.rebuild_cache().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MemoryBrowser;
    use crate::config::BrowserSettings;
    use std::sync::Mutex;

    /// Replays scripted actions and records what it was shown
    struct ScriptedView {
        actions: Mutex<Vec<SelectionAction>>,
        shown: Mutex<Vec<AssetSelection>>,
    }

    impl ScriptedView {
        fn new(mut actions: Vec<SelectionAction>) -> Self {
            actions.reverse();
            Self {
                actions: Mutex::new(actions),
                shown: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl SelectionView for ScriptedView {
        async fn render(&self, selection: AssetSelection) -> Result<SelectionAction> {
            self.shown.lock().unwrap().push(selection);
            Ok(self
                .actions
                .lock()
                .unwrap()
                .pop()
                .unwrap_or(SelectionAction::Cancelled))
        }
    }

    fn engine() -> Arc<AssetSearchEngine> {
        let browser = Arc::new(
            MemoryBrowser::new()
                .with_local_file("maps/Tavern_Night.webp")
                .with_local_file("maps/Forest_Path.mp4")
                .with_local_file("maps/forest_notes.txt"),
        );
        let settings = BrowserSettings {
            search_paths: vec!["maps".to_string()],
            ..BrowserSettings::default()
        };
        Arc::new(
            AssetSearchEngine::builder(browser)
                .with_settings(settings)
                .build(),
        )
    }

    #[tokio::test]
    async fn test_select_after_research() {
        let view = ScriptedView::new(vec![
            SelectionAction::Search("forest".to_string()),
            SelectionAction::Selected("maps/Forest_Path.mp4".to_string()),
        ]);
        let selector = AssetSelector::new(engine(), view);

        let mut chosen = None;
        let result = selector
            .display_asset_select("dragon", |path| chosen = Some(path.to_string()))
            .await
            .unwrap();

        assert_eq!(result.as_deref(), Some("maps/Forest_Path.mp4"));
        assert_eq!(chosen.as_deref(), Some("maps/Forest_Path.mp4"));

        let shown = selector.view().shown.lock().unwrap();
        assert_eq!(shown.len(), 2);
        assert_eq!(shown[0].query, "dragon");
        assert!(shown[0].groups.is_none());

        let groups = shown[1].groups.as_ref().unwrap();
        assert_eq!(groups[0].term, "forest");
        let video = &groups[0].assets[0];
        assert_eq!(video.label, "Forest_Path");
        assert!(video.is_video && video.is_media && !video.is_image);
        let notes = &groups[0].assets[1];
        assert!(!notes.is_media);
    }

    #[tokio::test]
    async fn test_cancel() {
        let selector = AssetSelector::new(engine(), ScriptedView::new(Vec::new()))
            .with_title("Pick a map");

        let result = selector
            .display_asset_select("tavern", |_| panic!("nothing selected"))
            .await
            .unwrap();
        assert!(result.is_none());

        let shown = selector.view().shown.lock().unwrap();
        assert_eq!(shown[0].title, "Pick a map");
        assert_eq!(shown[0].groups.as_ref().unwrap()[0].assets.len(), 1);
    }

    #[tokio::test]
    async fn test_cache_backgrounds() {
        let selector = AssetSelector::new(engine(), ScriptedView::new(Vec::new()));
        assert_eq!(
            selector.cache_backgrounds().await,
            crate::search::RebuildOutcome::Rebuilt { assets: 3 }
        );
    }
}
