//! Discovered assets

use super::normalize::{file_name, is_image, is_video};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use tokio::sync::mpsc::UnboundedSender;
use tracing::debug;

/// Media type of an asset, derived from its extension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetKind {
    Image,
    Video,
    Other,
}

/// A discovered file path. Identity is the path string alone.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetRecord(String);

impl AssetRecord {
    pub fn new<S: Into<String>>(path: S) -> Self {
        Self(path.into())
    }

    pub fn path(&self) -> &str {
        &self.0
    }

    pub fn into_path(self) -> String {
        self.0
    }

    pub fn kind(&self) -> AssetKind {
        if is_image(&self.0) {
            AssetKind::Image
        } else if is_video(&self.0) {
            AssetKind::Video
        } else {
            AssetKind::Other
        }
    }

    pub fn is_image(&self) -> bool {
        self.kind() == AssetKind::Image
    }

    pub fn is_video(&self) -> bool {
        self.kind() == AssetKind::Video
    }

    /// Short display label: the decoded file name without extension
    pub fn label(&self) -> String {
        file_name(&self.0)
    }
}

impl std::fmt::Display for AssetRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Destination for assets discovered during a walk.
///
/// Walks emit incrementally, so consumers can act on the first results
/// before the whole tree has been listed.
pub trait AssetSink: Send {
    fn emit(&mut self, asset: AssetRecord);

    /// A closed sink accepts nothing more, so walks into it can stop
    fn is_closed(&self) -> bool {
        false
    }
}

impl AssetSink for BTreeSet<AssetRecord> {
    fn emit(&mut self, asset: AssetRecord) {
        self.insert(asset);
    }
}

/// Forwards each distinct asset to a channel as soon as it is found
pub struct ChannelSink {
    sender: UnboundedSender<AssetRecord>,
    seen: HashSet<AssetRecord>,
    closed: bool,
}

impl ChannelSink {
    pub fn new(sender: UnboundedSender<AssetRecord>) -> Self {
        Self {
            sender,
            seen: HashSet::new(),
            closed: false,
        }
    }

    /// Number of distinct assets forwarded
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

impl AssetSink for ChannelSink {
    fn emit(&mut self, asset: AssetRecord) {
        if self.closed || self.seen.contains(&asset) {
            return;
        }
        match self.sender.send(asset.clone()) {
            Ok(()) => {
                self.seen.insert(asset);
            }
            Err(_) => {
                debug!("Asset receiver dropped, stopping the walk");
                self.closed = true;
            }
        }
    }

    fn is_closed(&self) -> bool {
        self.closed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_asset_record() {
        let asset = AssetRecord::new("assets/maps/Tavern%20Night.webp");
        assert_eq!(asset.kind(), AssetKind::Image);
        assert!(asset.is_image());
        assert!(!asset.is_video());
        assert_eq!(asset.label(), "Tavern Night");

        assert_eq!(AssetRecord::new("maps/intro.webm").kind(), AssetKind::Video);
        assert_eq!(AssetRecord::new("maps/notes.txt").kind(), AssetKind::Other);
    }

    #[test]
    fn test_set_sink_collapses_duplicates() {
        let mut found = BTreeSet::new();
        found.emit(AssetRecord::new("a.png"));
        found.emit(AssetRecord::new("a.png"));
        found.emit(AssetRecord::new("b.png"));
        assert_eq!(found.len(), 2);
    }

    #[tokio::test]
    async fn test_channel_sink_forwards_distinct_assets() {
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let mut sink = ChannelSink::new(tx);
        sink.emit(AssetRecord::new("a.png"));
        sink.emit(AssetRecord::new("a.png"));
        sink.emit(AssetRecord::new("b.png"));
        assert_eq!(sink.len(), 2);
        drop(sink);

        let mut received = Vec::new();
        while let Some(asset) = rx.recv().await {
            received.push(asset.into_path());
        }
        assert_eq!(received, vec!["a.png", "b.png"]);
    }

    #[test]
    fn test_channel_sink_closes_without_receiver() {
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
        let mut sink = ChannelSink::new(tx);
        sink.emit(AssetRecord::new("a.png"));
        assert!(!sink.is_closed());

        drop(rx);
        sink.emit(AssetRecord::new("b.png"));
        assert!(sink.is_closed());
        assert_eq!(sink.len(), 1);
    }
}
