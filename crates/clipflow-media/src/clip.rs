//! Segment cutting.

use std::path::Path;
use tracing::info;

use clipflow_models::{ClipSpec, EncodingConfig};

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::MediaResult;

/// Cut the window described by `spec` out of `input` into `output`.
///
/// Uses fast seek plus an output duration cap. When the window extends past
/// the end of the source, ffmpeg simply stops at end-of-stream, so a
/// degenerate spec (start 0, length >= source duration) yields a truncated
/// clip rather than an error.
pub async fn cut_clip(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    spec: &ClipSpec,
    encoding: &EncodingConfig,
) -> MediaResult<()> {
    let input = input.as_ref();
    let output = output.as_ref();

    info!(
        "Cutting clip: {} -> {} (start: {}s, length: {}s)",
        input.display(),
        output.display(),
        spec.start_seconds,
        spec.length_seconds
    );

    let cmd = FfmpegCommand::new(input, output)
        .seek(f64::from(spec.start_seconds))
        .duration(f64::from(spec.length_seconds))
        .output_args(encoding.to_ffmpeg_args())
        .output_args(["-movflags", "+faststart"]);

    FfmpegRunner::new().run(&cmd).await?;

    info!("Clip written: {}", output.display());
    Ok(())
}
