//! Search results and filtered candidates.

use serde::{Deserialize, Serialize};

/// One raw entry from the discovery collaborator.
///
/// View count and age arrive as the human-readable strings the search page
/// shows ("1.2M views", "3 hours ago"); conversion to numbers is the
/// filter's job, not discovery's.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    /// Video title as displayed
    pub title: String,
    /// Watch URL
    pub url: String,
    /// Channel name as displayed
    pub channel_name: String,
    /// Free-text view count ("500K views"), possibly empty
    pub raw_view_text: String,
    /// Free-text relative age ("2 days ago"), possibly empty
    pub raw_age_text: String,
}

/// A search result that passed popularity/recency filtering and is eligible
/// for acquisition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub title: String,
    pub url: String,
    pub channel_name: String,
    /// Parsed view count
    pub views: u64,
    /// Parsed age in days
    pub age_days: u32,
}
