//! Acquisition collaborator.

use std::path::Path;

use async_trait::async_trait;
use tracing::debug;

use clipflow_media::{fetch_video, probe_video};
use clipflow_models::MediaAsset;

use crate::error::PipelineResult;

/// Fetches source media to a destination path and hands back a handle with
/// the probed duration.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Acquirer: Send + Sync {
    async fn fetch(&self, url: &str, dest: &Path) -> PipelineResult<MediaAsset>;
}

/// Real acquisition via yt-dlp + ffprobe.
pub struct YtDlpAcquirer;

#[async_trait]
impl Acquirer for YtDlpAcquirer {
    async fn fetch(&self, url: &str, dest: &Path) -> PipelineResult<MediaAsset> {
        fetch_video(url, dest).await?;

        let info = probe_video(dest).await?;
        debug!(
            source = %dest.display(),
            duration = info.duration,
            "Probed source media"
        );

        Ok(MediaAsset {
            source_path: dest.to_path_buf(),
            duration_seconds: info.duration.floor() as u32,
        })
    }
}
