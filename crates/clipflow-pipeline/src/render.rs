//! Render collaborator.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::warn;

use clipflow_media::caption::CaptionOutcome;
use clipflow_media::thumbnail::generate_thumbnail;
use clipflow_media::{cut_clip, overlay_caption};
use clipflow_models::{ClipSpec, EncodingConfig, MediaAsset};

use crate::error::PipelineResult;

/// Produces clip files: window cuts and caption composites.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ClipRenderer: Send + Sync {
    /// Cut the spec's window out of the asset into `output`.
    async fn cut(&self, asset: &MediaAsset, spec: &ClipSpec, output: &Path) -> PipelineResult<()>;

    /// Composite `caption_text` over `clip` into `output`. Implementations
    /// degrade to an uncaptioned copy rather than failing the stage.
    async fn caption(
        &self,
        clip: &Path,
        caption_text: &str,
        output: &Path,
    ) -> PipelineResult<CaptionOutcome>;
}

/// Real rendering via ffmpeg.
pub struct FfmpegRenderer {
    encoding: EncodingConfig,
    font_file: Option<PathBuf>,
}

impl FfmpegRenderer {
    pub fn new(encoding: EncodingConfig, font_file: Option<PathBuf>) -> Self {
        Self {
            encoding,
            font_file,
        }
    }
}

#[async_trait]
impl ClipRenderer for FfmpegRenderer {
    async fn cut(&self, asset: &MediaAsset, spec: &ClipSpec, output: &Path) -> PipelineResult<()> {
        cut_clip(&asset.source_path, output, spec, &self.encoding).await?;

        // Poster frame for the clip; not worth failing the candidate over.
        let thumb_path = output.with_extension("jpg");
        if let Err(e) = generate_thumbnail(output, &thumb_path).await {
            warn!(
                clip = %output.display(),
                error = %e,
                "Failed to generate thumbnail"
            );
        }

        Ok(())
    }

    async fn caption(
        &self,
        clip: &Path,
        caption_text: &str,
        output: &Path,
    ) -> PipelineResult<CaptionOutcome> {
        let outcome = overlay_caption(
            clip,
            caption_text,
            output,
            &self.encoding,
            self.font_file.as_deref(),
        )
        .await?;
        Ok(outcome)
    }
}
