use crate::model::{COVER_IMAGE_BASE_PATH, CoverImage, StoredCover};
use anyhow::Context;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;
use uuid::Uuid;

#[async_trait]
pub trait CoverStorage: Send + Sync + 'static {
    async fn store(&self, cover: CoverImage) -> anyhow::Result<StoredCover>;

    /// Drops the backing data of a cover that never made it onto a record.
    async fn discard(&self, cover: &StoredCover) -> anyhow::Result<()>;
}

#[derive(Debug, Clone, Default)]
pub struct InlineCoverStorage;

#[async_trait]
impl CoverStorage for InlineCoverStorage {
    async fn store(&self, cover: CoverImage) -> anyhow::Result<StoredCover> {
        let mime = cover.mime();
        Ok(StoredCover::Inline {
            mime,
            bytes: cover.into_bytes(),
        })
    }

    async fn discard(&self, _cover: &StoredCover) -> anyhow::Result<()> {
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct DiskCoverStorage {
    root: PathBuf,
}

impl DiskCoverStorage {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn cover_dir(&self) -> PathBuf {
        self.root.join(COVER_IMAGE_BASE_PATH)
    }

    pub async fn initialize(&self) -> anyhow::Result<()> {
        let dir = self.cover_dir();
        fs::create_dir_all(&dir)
            .await
            .with_context(|| format!("Failed to create cover directory {}", dir.display()))
    }

    fn path_of(&self, filename: &str) -> PathBuf {
        self.cover_dir().join(Path::new(filename))
    }
}

#[async_trait]
impl CoverStorage for DiskCoverStorage {
    async fn store(&self, cover: CoverImage) -> anyhow::Result<StoredCover> {
        let filename = format!("{}.{}", Uuid::new_v4(), cover.mime().extension());
        let path = self.path_of(&filename);

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&path, cover.bytes())
            .await
            .with_context(|| format!("Failed to write cover {}", path.display()))?;

        Ok(StoredCover::File { filename })
    }

    async fn discard(&self, cover: &StoredCover) -> anyhow::Result<()> {
        let StoredCover::File { filename } = cover else {
            return Ok(());
        };
        let path = self.path_of(filename);
        fs::remove_file(&path)
            .await
            .with_context(|| format!("Failed to remove cover {}", path.display()))
    }
}
