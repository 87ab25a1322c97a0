use anyhow::Context;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

const DEFAULT_UPLOAD_ROOT: &str = "public";

/// Which cover storage strategy a deployment uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CoverStorageKind {
    /// Cover bytes live on the book record.
    #[default]
    Inline,
    /// Cover bytes live in files under the upload root.
    File,
}

#[derive(Error, Debug)]
#[error("\"{0}\" is not a cover storage kind, expected \"inline\" or \"file\"")]
pub struct CoverStorageKindError(String);

impl FromStr for CoverStorageKind {
    type Err = CoverStorageKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "inline" => Ok(Self::Inline),
            "file" => Ok(Self::File),
            _ => Err(CoverStorageKindError(s.into())),
        }
    }
}

#[derive(Debug)]
pub struct Config {
    database_url: String,
    server_port: u16,
    cover_storage: CoverStorageKind,
    upload_root: PathBuf,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = load_env("DATABASE_URL")?;
        let server_port = load_env("SERVER_PORT")?;
        let cover_storage = load_env_or("COVER_STORAGE", CoverStorageKind::default())?;
        let upload_root = load_env_or("UPLOAD_ROOT", PathBuf::from(DEFAULT_UPLOAD_ROOT))?;
        Ok(Self {
            database_url,
            server_port,
            cover_storage,
            upload_root,
        })
    }

    #[must_use]
    pub fn database_url(&self) -> &str {
        &self.database_url
    }

    #[must_use]
    pub const fn server_port(&self) -> u16 {
        self.server_port
    }

    #[must_use]
    pub const fn cover_storage(&self) -> CoverStorageKind {
        self.cover_storage
    }

    #[must_use]
    pub fn upload_root(&self) -> &Path {
        &self.upload_root
    }
}

fn load_env<T>(key: &str) -> anyhow::Result<T>
where
    T: FromStr,
    <T as FromStr>::Err: std::error::Error + Send + Sync + 'static,
{
    let val =
        std::env::var(key).with_context(|| format!("Failed to load environment variable {key}"))?;
    val.parse::<T>()
        .with_context(|| format!("Failed to parse environment variable {key}"))
}

fn load_env_or<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    <T as FromStr>::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(val) if !val.is_empty() => val
            .parse::<T>()
            .with_context(|| format!("Failed to parse environment variable {key}")),
        _ => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_cover_storage_kind() {
        assert_eq!("inline".parse::<CoverStorageKind>().unwrap(), CoverStorageKind::Inline);
        assert_eq!(" FILE ".parse::<CoverStorageKind>().unwrap(), CoverStorageKind::File);
        assert!("s3".parse::<CoverStorageKind>().is_err());
    }
}
