use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use tracing::{debug, info, warn};

use liverelay_core::error::{RelayError, Result};

use crate::obs::BridgeMetrics;

/// Remote profile API: uid -> avatar URL.
#[async_trait]
pub trait ProfileLookup: Send + Sync {
    async fn avatar_url(&self, uid: i64) -> Result<String>;
}

/// Remote image host: URL -> image bytes.
#[async_trait]
pub trait ImageFetch: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Bytes>;
}

/// How a path was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// File already on disk.
    Hit,
    /// Downloaded and written during this call.
    Fill,
    /// Lookup, download or write failed; the fallback image was returned.
    Fallback,
}

impl Resolution {
    pub fn as_str(self) -> &'static str {
        match self {
            Resolution::Hit => "hit",
            Resolution::Fill => "fill",
            Resolution::Fallback => "fallback",
        }
    }
}

/// Resolves users to avatar files under `dir`, named `<uid>.jpg`.
///
/// Cached files are never refreshed.
pub struct AvatarResolver {
    dir: PathBuf,
    fallback: PathBuf,
    profiles: Arc<dyn ProfileLookup>,
    images: Arc<dyn ImageFetch>,
    metrics: Arc<BridgeMetrics>,
    tmp_seq: AtomicU64,
}

impl AvatarResolver {
    pub fn new(
        dir: impl Into<PathBuf>,
        fallback_file: &str,
        profiles: Arc<dyn ProfileLookup>,
        images: Arc<dyn ImageFetch>,
        metrics: Arc<BridgeMetrics>,
    ) -> Self {
        let dir = dir.into();
        let fallback = dir.join(fallback_file);
        Self {
            dir,
            fallback,
            profiles,
            images,
            metrics,
            tmp_seq: AtomicU64::new(0),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, uid: i64) -> PathBuf {
        self.dir.join(format!("{uid}.jpg"))
    }

    pub fn fallback_path(&self) -> &Path {
        &self.fallback
    }

    /// Create the cache directory. A missing fallback image is reported but
    /// does not stop startup.
    pub async fn prepare(&self) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir).await.map_err(|e| {
            RelayError::BadConfig(format!(
                "cannot create avatar dir {}: {e}",
                self.dir.display()
            ))
        })?;

        if !exists(&self.fallback).await {
            warn!(path = %self.fallback.display(), "fallback avatar is missing");
        }
        info!(dir = %self.dir.display(), "avatar cache ready");
        Ok(())
    }

    /// Local path for `uid`'s avatar. Never fails; degrades to the fallback.
    pub async fn resolve(&self, uid: i64) -> PathBuf {
        self.resolve_traced(uid).await.0
    }

    pub async fn resolve_traced(&self, uid: i64) -> (PathBuf, Resolution) {
        let path = self.path_for(uid);

        let (path, how) = if exists(&path).await {
            (path, Resolution::Hit)
        } else {
            match self.fill(uid, &path).await {
                Ok(()) => (path, Resolution::Fill),
                Err(e) => {
                    match e {
                        RelayError::ProfileLookup(_) | RelayError::ImageFetch(_) => {
                            debug!(uid, error = %e, "avatar unavailable, using fallback");
                        }
                        _ => warn!(uid, error = %e, "avatar cache write failed, using fallback"),
                    }
                    (self.fallback.clone(), Resolution::Fallback)
                }
            }
        };

        self.metrics
            .avatar_resolutions
            .inc(&[("outcome", how.as_str())]);
        (path, how)
    }

    async fn fill(&self, uid: i64, path: &Path) -> Result<()> {
        let url = self.profiles.avatar_url(uid).await?;
        let bytes = self.images.fetch(&url).await?;

        // Write then rename so a half-written file is never seen as a hit.
        let seq = self.tmp_seq.fetch_add(1, Ordering::Relaxed);
        let tmp = self.dir.join(format!(".{uid}.jpg.{seq}.part"));
        let written = async {
            tokio::fs::write(&tmp, &bytes).await?;
            tokio::fs::rename(&tmp, path).await
        }
        .await;

        if let Err(e) = written {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(RelayError::Internal(format!(
                "persist {} failed: {e}",
                path.display()
            )));
        }

        debug!(uid, bytes = bytes.len(), path = %path.display(), "avatar cached");
        Ok(())
    }
}

async fn exists(path: &Path) -> bool {
    tokio::fs::try_exists(path).await.unwrap_or(false)
}
