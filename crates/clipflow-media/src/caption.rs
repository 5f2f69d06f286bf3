//! Caption overlay with best-effort degradation.
//!
//! The primary path draws the caption as a text layer across the top of the
//! frame. Rendering text can fail for reasons outside our control (no font
//! on the host, a drawtext-less ffmpeg build), and a missing caption is not
//! worth losing the clip over: every failure falls back to producing the
//! uncaptioned clip at the same output path, so this stage always ends with
//! a usable artifact.

use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use clipflow_models::EncodingConfig;

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::MediaResult;
use crate::probe::probe_video;

/// Fallback font locations checked when no font is configured.
const DEFAULT_FONT_PATHS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Bold.ttf",
    "/usr/share/fonts/TTF/DejaVuSans-Bold.ttf",
    "/System/Library/Fonts/Supplemental/Arial Bold.ttf",
];

/// Fraction of the frame width the caption should span.
const CAPTION_WIDTH_FRAC: f64 = 0.9;

/// Approximate glyph width as a fraction of the font size.
const GLYPH_WIDTH_RATIO: f64 = 0.55;

/// Font size clamp range.
const MIN_FONT_SIZE: u32 = 16;
const MAX_FONT_SIZE: u32 = 120;

/// Result of the caption stage.
///
/// The distinction matters to callers: an uncaptioned clip is publishable,
/// but the degradation should be visible in reports rather than swallowed.
#[derive(Debug, Clone)]
pub enum CaptionOutcome {
    /// Caption layer rendered and composited.
    Captioned(PathBuf),
    /// Text rendering failed; the clip was passed through unmodified.
    Uncaptioned { path: PathBuf, reason: String },
}

impl CaptionOutcome {
    /// Path of the produced artifact, captioned or not.
    pub fn path(&self) -> &Path {
        match self {
            CaptionOutcome::Captioned(path) => path,
            CaptionOutcome::Uncaptioned { path, .. } => path,
        }
    }

    pub fn is_captioned(&self) -> bool {
        matches!(self, CaptionOutcome::Captioned(_))
    }
}

/// Pick a usable font file: the configured one if it exists, otherwise the
/// first present fallback location.
pub fn resolve_font_file(configured: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = configured {
        if path.exists() {
            return Some(path.to_path_buf());
        }
        warn!(
            font = %path.display(),
            "Configured caption font not found, trying fallbacks"
        );
    }

    for candidate in DEFAULT_FONT_PATHS {
        let path = Path::new(candidate);
        if path.exists() {
            debug!(font = candidate, "Found caption font at fallback path");
            return Some(path.to_path_buf());
        }
    }

    None
}

/// Derive a font size that makes the caption span roughly
/// `CAPTION_WIDTH_FRAC` of the frame. drawtext cannot fit text to a target
/// width on its own, so this estimates from the average glyph aspect.
fn compute_font_size(frame_width: u32, caption_len: usize) -> u32 {
    let target_width = f64::from(frame_width) * CAPTION_WIDTH_FRAC;
    let glyphs = caption_len.max(1) as f64;
    let size = (target_width / (glyphs * GLYPH_WIDTH_RATIO)).round() as u32;
    size.clamp(MIN_FONT_SIZE, MAX_FONT_SIZE)
}

/// Escape text for use inside a drawtext filter argument.
fn escape_drawtext(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '\'' => escaped.push_str("\\'"),
            ':' => escaped.push_str("\\:"),
            '%' => escaped.push_str("\\%"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Build the drawtext filter: white bordered text, top-center, spanning the
/// whole clip duration.
fn build_drawtext_filter(font_file: &Path, text: &str, frame_width: u32) -> String {
    let font_size = compute_font_size(frame_width, text.chars().count());
    format!(
        "drawtext=fontfile='{}':text='{}':fontsize={}:fontcolor=white:borderw=3:bordercolor=black:x=(w-text_w)/2:y=h*0.05",
        escape_drawtext(&font_file.to_string_lossy()),
        escape_drawtext(text),
        font_size
    )
}

/// Composite `caption_text` over `source`, writing the result to `output`.
///
/// Never fails the stage for rendering reasons: if the text layer cannot be
/// produced the source clip is re-encoded (or, as a last resort, copied)
/// to `output` and the failure is reported in the returned
/// [`CaptionOutcome::Uncaptioned`]. Only filesystem errors on the final
/// copy fallback propagate as `Err`.
pub async fn overlay_caption(
    source: impl AsRef<Path>,
    caption_text: &str,
    output: impl AsRef<Path>,
    encoding: &EncodingConfig,
    font_file: Option<&Path>,
) -> MediaResult<CaptionOutcome> {
    let source = source.as_ref();
    let output = output.as_ref();

    let render_failure = match try_render_caption(source, caption_text, output, encoding, font_file)
        .await
    {
        Ok(()) => {
            info!(
                output = %output.display(),
                "Caption rendered"
            );
            return Ok(CaptionOutcome::Captioned(output.to_path_buf()));
        }
        Err(e) => e,
    };

    warn!(
        source = %source.display(),
        error = %render_failure,
        "Caption rendering failed, producing uncaptioned clip"
    );

    // Plain re-encode keeps the output uniform with captioned siblings.
    let passthrough = FfmpegCommand::new(source, output)
        .output_args(encoding.to_ffmpeg_args())
        .output_args(["-movflags", "+faststart"]);

    if let Err(e) = FfmpegRunner::new().run(&passthrough).await {
        warn!(
            source = %source.display(),
            error = %e,
            "Passthrough re-encode failed, copying source clip"
        );
        tokio::fs::copy(source, output).await?;
    }

    Ok(CaptionOutcome::Uncaptioned {
        path: output.to_path_buf(),
        reason: render_failure,
    })
}

/// Attempt the captioned render. Returns the failure reason on any miss so
/// the caller can degrade.
async fn try_render_caption(
    source: &Path,
    caption_text: &str,
    output: &Path,
    encoding: &EncodingConfig,
    font_file: Option<&Path>,
) -> Result<(), String> {
    let font = resolve_font_file(font_file).ok_or_else(|| "no usable caption font found".to_string())?;

    let info = probe_video(source)
        .await
        .map_err(|e| format!("probe failed: {}", e))?;
    if info.width == 0 {
        return Err("source frame width unknown".to_string());
    }

    let filter = build_drawtext_filter(&font, caption_text, info.width);
    let cmd = FfmpegCommand::new(source, output)
        .video_filter(filter)
        .output_args(encoding.to_ffmpeg_args())
        .output_args(["-movflags", "+faststart"]);

    FfmpegRunner::new()
        .run(&cmd)
        .await
        .map_err(|e| format!("drawtext render failed: {}", e))
}
