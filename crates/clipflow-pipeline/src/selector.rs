//! Randomized sub-clip selection.

use rand::Rng;

use clipflow_models::ClipSpec;

/// Choose `count` clip windows within a source of `duration_seconds`.
///
/// Starts are drawn uniformly from `[0, duration - clip_length]`; when the
/// source is no longer than a clip the range collapses to zero and every
/// window starts at the beginning (the cut stage truncates at end of
/// stream). Draws are independent, so overlap between windows is allowed —
/// cheap variety is preferred over strict non-overlap. Captions come from
/// the caller-supplied chooser, keyed by clip index.
pub fn select_clips<R, F>(
    duration_seconds: u32,
    count: usize,
    clip_length_seconds: u32,
    rng: &mut R,
    caption: F,
) -> Vec<ClipSpec>
where
    R: Rng,
    F: Fn(usize) -> String,
{
    let max_start = duration_seconds.saturating_sub(clip_length_seconds);

    (0..count)
        .map(|i| {
            let start_seconds = if max_start == 0 {
                0
            } else {
                rng.random_range(0..=max_start)
            };
            ClipSpec {
                start_seconds,
                length_seconds: clip_length_seconds,
                caption_text: caption(i),
            }
        })
        .collect()
}
