//! Line-aware truncation of a single body.
//!
//! Lengths are UTF-8 byte lengths. Every cut lands on a char boundary, so
//! the result is valid text and never longer than the byte limit.

use log::debug;

/// Cut `text` to fit within `limit`, appending `marker` when anything was
/// removed.
///
/// Room for the marker is reserved before the cut point is chosen. The cut
/// prefers the last line break inside the kept prefix and falls back to a
/// hard cut. When `limit` cannot even hold the marker, the marker alone is
/// returned.
pub fn truncate_body(text: &str, limit: usize, marker: &str) -> String {
    if text.len() <= limit {
        return text.to_string();
    }
    let budget = limit.saturating_sub(marker.len());
    if budget == 0 {
        return marker.to_string();
    }
    let budget = floor_char_boundary(text, budget);
    let cut = match text[..budget].rfind('\n') {
        Some(idx) if idx > 0 => idx,
        _ => budget,
    };
    debug!("truncated body from {} to {} bytes", text.len(), cut + marker.len());

    let mut out = String::with_capacity(cut + marker.len());
    out.push_str(&text[..cut]);
    out.push_str(marker);
    out
}

/// Largest char boundary in `text` that is `<= index`.
pub(crate) fn floor_char_boundary(text: &str, index: usize) -> usize {
    if index >= text.len() {
        return text.len();
    }
    let mut idx = index;
    while !text.is_char_boundary(idx) {
        idx -= 1;
    }
    idx
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_TRUNCATION_MARKER as MARKER;
    use proptest::prelude::*;

    #[test]
    fn test_short_text_unchanged() {
        assert_eq!(truncate_body("Hello world", 100, MARKER), "Hello world");
    }

    #[test]
    fn test_exact_limit_unchanged() {
        assert_eq!(truncate_body("12345", 5, MARKER), "12345");
    }

    #[test]
    fn test_truncates_at_newline_boundary() {
        let got = truncate_body(
            "Line one\nLine two\nLine three\nLine four\nLine five\nLine six",
            50,
            MARKER,
        );
        assert!(got.contains("Line one"));
        assert!(!got.contains("Line four"));
        assert!(got.ends_with(MARKER));
        assert!(got.len() <= 50);
        assert_eq!(got, format!("Line one\nLine two{MARKER}"));
    }

    #[test]
    fn test_very_small_limit_returns_marker() {
        let got = truncate_body("This is a longer text that cannot fit", 5, MARKER);
        assert_eq!(got, MARKER);
    }

    #[test]
    fn test_limit_equal_to_marker_returns_marker() {
        let got = truncate_body(&"x".repeat(100), MARKER.len(), MARKER);
        assert_eq!(got, MARKER);
    }

    #[test]
    fn test_hard_cut_without_newlines() {
        let got = truncate_body(&"x".repeat(200), 100, MARKER);
        assert_eq!(got.len(), 100);
        assert!(got.starts_with(&"x".repeat(100 - MARKER.len())));
        assert!(got.ends_with(MARKER));
    }

    #[test]
    fn test_leading_newline_only_is_hard_cut() {
        let text = format!("\n{}", "y".repeat(100));
        let got = truncate_body(&text, 60, MARKER);
        assert_eq!(got.len(), 60);
        assert!(got.starts_with("\ny"));
    }

    #[test]
    fn test_multibyte_cut_stays_on_char_boundary() {
        let text = "ä".repeat(100);
        let got = truncate_body(&text, 41, "[cut]");
        assert!(got.len() <= 41);
        assert!(got.ends_with("[cut]"));
        assert!(got.trim_end_matches("[cut]").chars().all(|c| c == 'ä'));
    }

    #[test]
    fn test_floor_char_boundary() {
        let text = "aä";
        assert_eq!(floor_char_boundary(text, 2), 1);
        assert_eq!(floor_char_boundary(text, 3), 3);
        assert_eq!(floor_char_boundary(text, 99), 3);
    }

    proptest! {
        #[test]
        fn prop_never_exceeds_limit(text in "(?s).{0,400}", limit in 0usize..500) {
            let got = truncate_body(&text, limit, MARKER);
            if limit >= MARKER.len() {
                prop_assert!(got.len() <= limit);
            } else {
                prop_assert!(got.len() <= limit.max(MARKER.len()));
            }
        }

        #[test]
        fn prop_noop_when_it_fits(text in "(?s).{0,200}", extra in 0usize..50) {
            let limit = text.len() + extra;
            prop_assert_eq!(truncate_body(&text, limit, MARKER), text);
        }

        #[test]
        fn prop_shortened_output_ends_with_marker(text in "[a-z\n]{50,300}", limit in 0usize..50) {
            let got = truncate_body(&text, limit, MARKER);
            prop_assert!(got.ends_with(MARKER));
            prop_assert!(got.len() < text.len());
        }
    }
}
