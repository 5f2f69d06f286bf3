//! Poster frame generation.

use std::path::Path;

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::MediaResult;

/// Thumbnail width; height follows the source aspect ratio.
const THUMBNAIL_WIDTH: u32 = 480;

/// Timestamp to sample the poster frame from.
const THUMBNAIL_SEEK_SECS: f64 = 1.0;

/// Write a single poster frame for `video` to `output` (JPEG).
pub async fn generate_thumbnail(
    video: impl AsRef<Path>,
    output: impl AsRef<Path>,
) -> MediaResult<()> {
    let cmd = FfmpegCommand::new(video.as_ref(), output.as_ref())
        .seek(THUMBNAIL_SEEK_SECS)
        .single_frame()
        .video_filter(format!("scale={}:-1", THUMBNAIL_WIDTH));

    FfmpegRunner::new().run(&cmd).await
}
