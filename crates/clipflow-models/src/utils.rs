//! Filename utilities.

/// Maximum length for a sanitized title stem. Keeps full artifact names
/// (stem + purpose suffix + extension) well under common filesystem limits.
const MAX_STEM_LEN: usize = 80;

/// Turn a video title into a safe filename stem.
///
/// ASCII alphanumerics, `-` and `_` pass through; every other character
/// (spaces, punctuation, non-ASCII) becomes `_`. The result is truncated to
/// a bounded length so derived artifact names stay valid.
pub fn sanitize_title(title: &str) -> String {
    let mut stem: String = title
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    stem.truncate(MAX_STEM_LEN);
    stem
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_keeps_allowed_chars() {
        assert_eq!(sanitize_title("cat_video-01"), "cat_video-01");
    }

    #[test]
    fn test_sanitize_replaces_everything_else() {
        assert_eq!(sanitize_title("Cats & Dogs!"), "Cats___Dogs_");
        assert_eq!(sanitize_title("a/b\\c:d"), "a_b_c_d");
        assert_eq!(sanitize_title("日本語 title"), "____title");
    }

    #[test]
    fn test_sanitize_truncates() {
        let long = "x".repeat(200);
        assert_eq!(sanitize_title(&long).len(), MAX_STEM_LEN);
    }
}
