//! Pipeline configuration.
//!
//! Everything comes from environment variables (a `.env` file is honored).
//! Required settings missing or malformed are precondition failures: the
//! run aborts before any network activity.

use std::path::PathBuf;

use crate::error::{PipelineError, PipelineResult};

/// Raw search results fetched per accepted candidate wanted. The accept
/// rate of the filter is unknown up front, so discovery over-fetches.
pub const OVERFETCH_FACTOR: usize = 3;

/// Pipeline configuration.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Search keyword
    pub keyword: String,
    /// Number of accepted candidates to process
    pub result_count: usize,
    /// Minimum view count for acceptance
    pub min_views: u64,
    /// Maximum age in days for acceptance
    pub max_age_days: u32,
    /// Directory all artifacts are written to
    pub output_dir: PathBuf,
    /// Sub-clips to cut per source video
    pub clips_per_video: usize,
    /// Length of each sub-clip in seconds
    pub clip_seconds: u32,
    /// Caption font file override
    pub font_file: Option<PathBuf>,
    /// Publish service base URL
    pub publish_url: String,
    /// Publish account username
    pub publish_user: String,
    /// Publish account password
    pub publish_pass: String,
}

impl PipelineConfig {
    /// Load configuration from process environment variables.
    pub fn from_env() -> PipelineResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary lookup. Separated from
    /// [`Self::from_env`] so tests can inject values without touching the
    /// process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> PipelineResult<Self> {
        let require = |key: &str| -> PipelineResult<String> {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| PipelineError::config(format!("{} is not set", key)))
        };

        let keyword = require("CLIPFLOW_KEYWORD")?;
        let result_count = parse_required(&require("CLIPFLOW_RESULT_COUNT")?, "CLIPFLOW_RESULT_COUNT")?;
        let min_views = parse_required(&require("CLIPFLOW_MIN_VIEWS")?, "CLIPFLOW_MIN_VIEWS")?;
        let max_age_days = parse_required(&require("CLIPFLOW_MAX_AGE_DAYS")?, "CLIPFLOW_MAX_AGE_DAYS")?;
        let publish_url = require("CLIPFLOW_PUBLISH_URL")?;
        let publish_user = require("CLIPFLOW_PUBLISH_USER")?;
        let publish_pass = require("CLIPFLOW_PUBLISH_PASS")?;

        let output_dir = lookup("CLIPFLOW_OUTPUT_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("reels"));
        let clips_per_video = parse_optional(lookup("CLIPFLOW_CLIPS_PER_VIDEO"), "CLIPFLOW_CLIPS_PER_VIDEO", 3)?;
        let clip_seconds = parse_optional(lookup("CLIPFLOW_CLIP_SECONDS"), "CLIPFLOW_CLIP_SECONDS", 15)?;
        let font_file = lookup("CLIPFLOW_FONT_FILE").map(PathBuf::from);

        if result_count == 0 {
            return Err(PipelineError::config("CLIPFLOW_RESULT_COUNT must be positive"));
        }
        if clip_seconds == 0 {
            return Err(PipelineError::config("CLIPFLOW_CLIP_SECONDS must be positive"));
        }

        Ok(Self {
            keyword,
            result_count,
            min_views,
            max_age_days,
            output_dir,
            clips_per_video,
            clip_seconds,
            font_file,
            publish_url,
            publish_user,
            publish_pass,
        })
    }

    /// Raw results to request from discovery.
    pub fn search_limit(&self) -> usize {
        self.result_count.saturating_mul(OVERFETCH_FACTOR)
    }
}

fn parse_required<T: std::str::FromStr>(value: &str, key: &str) -> PipelineResult<T> {
    value
        .trim()
        .parse()
        .map_err(|_| PipelineError::config(format!("{} is not a valid number: {:?}", key, value)))
}

fn parse_optional<T: std::str::FromStr>(
    value: Option<String>,
    key: &str,
    default: T,
) -> PipelineResult<T> {
    match value {
        Some(v) => parse_required(&v, key),
        None => Ok(default),
    }
}
