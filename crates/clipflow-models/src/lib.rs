//! Shared data models for the Clipflow pipeline.
//!
//! This crate provides the types that flow between pipeline stages and the
//! pure parsing heuristics that turn free-text search metadata into
//! comparable numbers:
//! - Search results and filtered candidates
//! - Clip specifications and artifacts
//! - View-count and relative-age parsing
//! - Encoding configuration

pub mod clip;
pub mod encoding;
pub mod metrics;
pub mod search;
pub mod utils;

// Re-export common types
pub use clip::{ClipArtifact, ClipSpec, MediaAsset};
pub use encoding::EncodingConfig;
pub use metrics::{parse_age_days, parse_view_count};
pub use search::{Candidate, SearchResult};
pub use utils::sanitize_title;
