//! Clip specifications and media handles.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::search::Candidate;

/// Handle to a downloaded source video on disk.
///
/// The file itself is the durable representation; this handle becomes stale
/// if the file is removed externally.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaAsset {
    pub source_path: PathBuf,
    pub duration_seconds: u32,
}

/// Description of one sub-clip to cut from a source video.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClipSpec {
    pub start_seconds: u32,
    pub length_seconds: u32,
    pub caption_text: String,
}

impl ClipSpec {
    /// Exclusive end of the clip window.
    pub fn end_seconds(&self) -> u32 {
        self.start_seconds.saturating_add(self.length_seconds)
    }
}

/// A rendered clip on disk, tied back to the candidate and spec that
/// produced it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClipArtifact {
    pub path: PathBuf,
    pub source_candidate: Candidate,
    pub spec: ClipSpec,
}
