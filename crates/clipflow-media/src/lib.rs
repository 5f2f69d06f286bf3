//! Subprocess wrappers around ffmpeg, ffprobe and yt-dlp.
//!
//! Everything here is a thin shell over external tools: the pipeline makes
//! the decisions, these modules carry them out. No module holds a handle to
//! a media file across an `.await`; each tool invocation opens and closes
//! its own.

pub mod caption;
pub mod clip;
pub mod command;
pub mod download;
pub mod error;
pub mod probe;
pub mod thumbnail;

pub use caption::{overlay_caption, CaptionOutcome};
pub use clip::cut_clip;
pub use command::{check_ffmpeg, check_ffprobe, check_ytdlp, FfmpegCommand, FfmpegRunner};
pub use download::fetch_video;
pub use error::{MediaError, MediaResult};
pub use probe::{probe_video, VideoInfo};
