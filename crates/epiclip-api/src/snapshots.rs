//! Precomputed frame storage.
//!
//! Frames are generated ahead of time by an external pipeline and laid
//! out on disk as `{root}/{season}/{episode}/{ms}.png`, with a small
//! preview variant at `{ms}.tiny.jpg`. The store is read-only from the
//! server's point of view.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::warn;

use crate::error::{ApiError, ApiResult};

/// Read access to the precomputed frame store.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Full-size PNG frame for an instant.
    async fn frame(&self, season: &str, episode: &str, ms: u64) -> ApiResult<Vec<u8>>;

    /// Reduced-size JPEG preview for an instant.
    async fn tiny_frame(&self, season: &str, episode: &str, ms: u64) -> ApiResult<Vec<u8>>;

    /// All instants with a stored full-size frame for an episode.
    async fn list_instants(&self, season: &str, episode: &str) -> ApiResult<BTreeSet<u64>>;
}

/// [`SnapshotStore`] backed by a local directory tree.
#[derive(Debug, Clone)]
pub struct FsSnapshotStore {
    root: PathBuf,
}

impl FsSnapshotStore {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    fn episode_dir(&self, season: &str, episode: &str) -> PathBuf {
        self.root.join(season).join(episode)
    }

    async fn read(&self, path: PathBuf) -> ApiResult<Vec<u8>> {
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(bytes),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Err(ApiError::FrameNotFound),
            Err(err) => Err(ApiError::internal(format!(
                "reading {}: {}",
                path.display(),
                err
            ))),
        }
    }
}

#[async_trait]
impl SnapshotStore for FsSnapshotStore {
    async fn frame(&self, season: &str, episode: &str, ms: u64) -> ApiResult<Vec<u8>> {
        self.read(self.episode_dir(season, episode).join(format!("{ms}.png")))
            .await
    }

    async fn tiny_frame(&self, season: &str, episode: &str, ms: u64) -> ApiResult<Vec<u8>> {
        self.read(
            self.episode_dir(season, episode)
                .join(format!("{ms}.tiny.jpg")),
        )
        .await
    }

    async fn list_instants(&self, season: &str, episode: &str) -> ApiResult<BTreeSet<u64>> {
        let dir = self.episode_dir(season, episode);
        let mut instants = BTreeSet::new();

        let mut entries = match tokio::fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(instants),
            Err(err) => {
                return Err(ApiError::internal(format!(
                    "listing {}: {}",
                    dir.display(),
                    err
                )))
            }
        };

        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|err| ApiError::internal(format!("listing {}: {}", dir.display(), err)))?
        {
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            let Some(stem) = name.strip_suffix(".png") else {
                continue;
            };
            match stem.parse::<u64>() {
                Ok(ms) => {
                    instants.insert(ms);
                }
                Err(_) => warn!(file = name, "Ignoring unrecognized file in frame store"),
            }
        }

        Ok(instants)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_frame_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let episode_dir = dir.path().join("s1").join("e1");
        std::fs::create_dir_all(&episode_dir).unwrap();
        std::fs::write(episode_dir.join("1000.png"), b"png bytes").unwrap();
        std::fs::write(episode_dir.join("1000.tiny.jpg"), b"jpg bytes").unwrap();

        let store = FsSnapshotStore::new(dir.path());
        assert_eq!(store.frame("s1", "e1", 1000).await.unwrap(), b"png bytes");
        assert_eq!(
            store.tiny_frame("s1", "e1", 1000).await.unwrap(),
            b"jpg bytes"
        );
    }

    #[tokio::test]
    async fn test_missing_frame_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsSnapshotStore::new(dir.path());
        assert!(matches!(
            store.frame("s1", "e1", 1000).await,
            Err(ApiError::FrameNotFound)
        ));
    }

    #[tokio::test]
    async fn test_list_instants() {
        let dir = tempfile::tempdir().unwrap();
        let episode_dir = dir.path().join("s1").join("e1");
        std::fs::create_dir_all(&episode_dir).unwrap();
        for ms in [0u64, 1000, 2000] {
            std::fs::write(episode_dir.join(format!("{ms}.png")), b"x").unwrap();
            std::fs::write(episode_dir.join(format!("{ms}.tiny.jpg")), b"x").unwrap();
        }
        std::fs::write(episode_dir.join("notes.txt"), b"x").unwrap();

        let store = FsSnapshotStore::new(dir.path());
        let instants = store.list_instants("s1", "e1").await.unwrap();
        assert_eq!(instants, BTreeSet::from([0, 1000, 2000]));
    }

    #[tokio::test]
    async fn test_list_instants_missing_dir_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsSnapshotStore::new(dir.path());
        assert!(store.list_instants("s1", "e1").await.unwrap().is_empty());
    }
}
