//! Keyword discovery against the YouTube results page.
//!
//! The search page embeds its result data as a `ytInitialData` JSON blob.
//! Fetching is a single GET; everything interesting happens in
//! [`parse_search_page`], which is pure so fixtures can exercise it. The
//! raw view-count and age strings are passed through untouched: turning
//! them into numbers is the filter's job.

use async_trait::async_trait;
use regex::Regex;
use serde_json::Value;
use tracing::{debug, warn};

use clipflow_models::SearchResult;

use crate::error::{PipelineError, PipelineResult};

const RESULTS_URL: &str = "https://www.youtube.com/results";

/// Desktop user agent; the mobile page embeds a different data layout.
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Discovery collaborator: keyword in, ordered raw results out.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SearchProvider: Send + Sync {
    async fn search(&self, keyword: &str, limit: usize) -> PipelineResult<Vec<SearchResult>>;
}

/// Scrapes the public results page.
pub struct YoutubeSearchProvider {
    client: reqwest::Client,
}

impl YoutubeSearchProvider {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SearchProvider for YoutubeSearchProvider {
    async fn search(&self, keyword: &str, limit: usize) -> PipelineResult<Vec<SearchResult>> {
        let url = format!(
            "{}?search_query={}",
            RESULTS_URL,
            urlencoding::encode(keyword)
        );
        debug!(url = %url, "Fetching search results page");

        let html = self
            .client
            .get(&url)
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        parse_search_page(&html, limit)
    }
}

/// Extract up to `limit` results from a search page.
pub fn parse_search_page(html: &str, limit: usize) -> PipelineResult<Vec<SearchResult>> {
    let data = extract_initial_data(html)?;

    let sections = data
        .pointer("/contents/twoColumnSearchResultsRenderer/primaryContents/sectionListRenderer/contents")
        .and_then(Value::as_array)
        .ok_or_else(|| PipelineError::search("unexpected search page layout"))?;

    let mut results = Vec::new();
    for section in sections {
        let items = match section
            .pointer("/itemSectionRenderer/contents")
            .and_then(Value::as_array)
        {
            Some(items) => items,
            None => continue,
        };

        for item in items {
            let renderer = match item.get("videoRenderer") {
                Some(r) => r,
                // Ads, shelves, channel results
                None => continue,
            };

            match parse_video_renderer(renderer) {
                Some(result) => results.push(result),
                None => warn!("Skipping video entry with missing fields"),
            }

            if results.len() >= limit {
                return Ok(results);
            }
        }
    }

    Ok(results)
}

/// Pull the `ytInitialData` JSON out of the page source.
fn extract_initial_data(html: &str) -> PipelineResult<Value> {
    // The blob sits on one line, terminated by `;</script>`.
    let re = Regex::new(r"var ytInitialData = (.*?);</script>")
        .expect("static regex must compile");

    let blob = re
        .captures(html)
        .and_then(|caps| caps.get(1))
        .ok_or_else(|| PipelineError::search("ytInitialData not found in page"))?;

    serde_json::from_str(blob.as_str())
        .map_err(|e| PipelineError::search(format!("ytInitialData is not valid JSON: {}", e)))
}

fn parse_video_renderer(renderer: &Value) -> Option<SearchResult> {
    let video_id = renderer.get("videoId")?.as_str()?;
    let title = renderer
        .pointer("/title/runs/0/text")?
        .as_str()?
        .to_string();
    let channel_name = renderer
        .pointer("/ownerText/runs/0/text")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    // Missing view/age text is normal for live streams and premieres; the
    // empty string parses to a fail-safe value downstream.
    let raw_view_text = renderer
        .pointer("/viewCountText/simpleText")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    let raw_age_text = renderer
        .pointer("/publishedTimeText/simpleText")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    Some(SearchResult {
        title,
        url: format!("https://www.youtube.com/watch?v={}", video_id),
        channel_name,
        raw_view_text,
        raw_age_text,
    })
}
