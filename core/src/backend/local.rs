//! Local data directory backend

use super::{Listing, ROOT_TARGET};
use crate::error::ListingError;
use std::path::PathBuf;
use tokio::fs;

/// Lists directories below a data root.
///
/// Paths in and out are relative to the root and use `/` separators.
#[derive(Debug, Clone)]
pub struct LocalBrowser {
    data_root: PathBuf,
}

impl LocalBrowser {
    pub fn new<P: Into<PathBuf>>(data_root: P) -> Self {
        Self {
            data_root: data_root.into(),
        }
    }

    pub fn data_root(&self) -> &std::path::Path {
        &self.data_root
    }

    /// Turn a requested path into root-relative components.
    ///
    /// Returns `None` when the path would climb out of the data root.
    fn relative_components(path: &str) -> Option<Vec<&str>> {
        let mut components = Vec::new();
        for part in path.split(['/', '\\']) {
            match part {
                "" | "." => continue,
                ".." => return None,
                other => components.push(other),
            }
        }
        Some(components)
    }

    /// List the immediate children of `path`
    pub async fn browse(&self, path: &str) -> Result<Listing, ListingError> {
        let components =
            Self::relative_components(path).ok_or_else(|| ListingError::PermissionDenied {
                path: path.to_string(),
            })?;
        let relative = components.join("/");

        let mut dir = self.data_root.clone();
        dir.extend(&components);

        let mut entries = fs::read_dir(&dir)
            .await
            .map_err(|e| ListingError::from_io(path, &e))?;

        let mut listing = Listing {
            target: if relative.is_empty() {
                ROOT_TARGET.to_string()
            } else {
                relative.clone()
            },
            ..Listing::default()
        };

        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| ListingError::from_io(path, &e))?
        {
            let name = entry.file_name().to_string_lossy().to_string();
            let child = if relative.is_empty() {
                name
            } else {
                format!("{}/{}", relative, name)
            };

            // Follow symlinks; entries that cannot be stat'ed are skipped
            let Ok(metadata) = fs::metadata(entry.path()).await else {
                continue;
            };

            if metadata.is_dir() {
                listing.dirs.push(child);
            } else if metadata.is_file() {
                listing.files.push(child);
            }
        }

        listing.files.sort();
        listing.dirs.sort();
        Ok(listing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs as stdfs;
    use tempfile::TempDir;

    fn create_data_root() -> TempDir {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        stdfs::create_dir_all(root.join("assets/maps/city")).unwrap();
        stdfs::write(root.join("assets/maps/Tavern_Night.webp"), b"webp").unwrap();
        stdfs::write(root.join("assets/maps/Forest.png"), b"png").unwrap();
        stdfs::write(root.join("assets/maps/city/Market.jpg"), b"jpg").unwrap();
        stdfs::write(root.join("readme.txt"), b"txt").unwrap();
        temp_dir
    }

    #[tokio::test]
    async fn test_browse_lists_files_and_dirs() {
        let temp_dir = create_data_root();
        let browser = LocalBrowser::new(temp_dir.path());

        let listing = browser.browse("assets/maps/").await.unwrap();
        assert_eq!(listing.target, "assets/maps");
        assert_eq!(
            listing.files,
            vec!["assets/maps/Forest.png", "assets/maps/Tavern_Night.webp"]
        );
        assert_eq!(listing.dirs, vec!["assets/maps/city"]);
    }

    #[tokio::test]
    async fn test_browse_root_reports_root_target() {
        let temp_dir = create_data_root();
        let browser = LocalBrowser::new(temp_dir.path());

        for path in ["", ".", "./", "/"] {
            let listing = browser.browse(path).await.unwrap();
            assert!(listing.is_root(), "{:?} should resolve to the root", path);
        }
    }

    #[tokio::test]
    async fn test_browse_missing_directory() {
        let temp_dir = create_data_root();
        let browser = LocalBrowser::new(temp_dir.path());

        let err = browser.browse("assets/missing").await.unwrap_err();
        assert!(matches!(err, ListingError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_browse_rejects_parent_traversal() {
        let temp_dir = create_data_root();
        let browser = LocalBrowser::new(temp_dir.path().join("assets"));

        let err = browser.browse("../").await.unwrap_err();
        assert!(matches!(err, ListingError::PermissionDenied { .. }));
    }
}
