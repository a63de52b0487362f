//! HTML to plain text conversion.

use kuchiki::traits::*;

use crate::html::{remove_elements, serialize};

/// Elements that never contribute readable text.
const NON_TEXT_TAGS: &[&str] = &[
    "script", "style", "head", "noscript", "template", "img", "svg", "iframe", "object",
];

/// Convert HTML content to readable plain text.
///
/// Block elements become line breaks, entities are decoded and non-text
/// elements are dropped. Always returns a string, possibly empty.
pub fn html_to_text(html: &str, width: usize) -> String {
    let document = kuchiki::parse_html().one(html);
    remove_elements(&document, &|tag| NON_TEXT_TAGS.contains(&tag));
    let pruned = serialize(&document);
    let source = pruned.as_deref().unwrap_or(html);
    normalize_text(&html2text::from_read(source.as_bytes(), width))
}

/// Tidy rendered text: LF line endings, no trailing spaces, at most one
/// blank line in a row, no leading or trailing blank lines.
pub fn normalize_text(text: &str) -> String {
    let text = text.replace("\r\n", "\n");
    let mut out = String::with_capacity(text.len());
    let mut blank_run = 0;
    for line in text.lines() {
        let line = line.trim_end();
        if line.is_empty() {
            blank_run += 1;
            continue;
        }
        if !out.is_empty() {
            out.push('\n');
            if blank_run > 0 {
                out.push('\n');
            }
        }
        blank_run = 0;
        out.push_str(line);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paragraphs_become_lines() {
        let text = html_to_text("<p>First paragraph</p><p>Second paragraph</p>", 80);
        let first = text.find("First paragraph").unwrap();
        let second = text.find("Second paragraph").unwrap();
        assert!(first < second);
        assert!(text[first..second].contains('\n'));
        assert!(!text.contains("<p>"));
    }

    #[test]
    fn test_entities_decoded() {
        let text = html_to_text("<p>Fish &amp; chips &lt;3</p>", 80);
        assert!(text.contains("Fish & chips <3"), "got {text:?}");
    }

    #[test]
    fn test_non_text_elements_dropped() {
        let text = html_to_text(
            "<html><head><title>Title</title><style>p { color: red; }</style></head>\
             <body><p>Visible</p><script>alert('x')</script><img src=\"a.png\" alt=\"logo\"></body></html>",
            80,
        );
        assert!(text.contains("Visible"));
        assert!(!text.contains("color"));
        assert!(!text.contains("alert"));
        assert!(!text.contains("logo"));
        assert!(!text.contains("Title"));
    }

    #[test]
    fn test_empty_markup() {
        assert_eq!(html_to_text("", 80), "");
    }

    #[test]
    fn test_normalize_text() {
        assert_eq!(normalize_text("a  \r\n\r\n\r\n\r\nb\n\n"), "a\n\nb");
        assert_eq!(normalize_text("\n\n  \nonly\n"), "only");
        assert_eq!(normalize_text("x\ny"), "x\ny");
    }
}
