//! Popularity and recency filtering.

use tracing::debug;

use clipflow_models::{parse_age_days, parse_view_count, Candidate, SearchResult};

/// Filter raw results down to at most `limit` candidates.
///
/// Order-preserving over the input. Rejection is an expected branch, not an
/// error: each one is logged with its reason and skipped. Scanning stops as
/// soon as `limit` candidates have been accepted.
pub fn filter_candidates(
    results: &[SearchResult],
    min_views: u64,
    max_age_days: u32,
    limit: usize,
) -> Vec<Candidate> {
    let mut accepted = Vec::new();

    for result in results {
        if accepted.len() >= limit {
            break;
        }

        let views = parse_view_count(&result.raw_view_text);
        let age_days = parse_age_days(&result.raw_age_text, max_age_days);

        if views < min_views {
            debug!(
                title = %result.title,
                views = views,
                min_views = min_views,
                "Rejected: below view threshold"
            );
            continue;
        }

        if age_days > max_age_days {
            debug!(
                title = %result.title,
                age_days = age_days,
                max_age_days = max_age_days,
                "Rejected: older than age threshold"
            );
            continue;
        }

        accepted.push(Candidate {
            title: result.title.clone(),
            url: result.url.clone(),
            channel_name: result.channel_name.clone(),
            views,
            age_days,
        });
    }

    accepted
}
