//! Structural HTML surgery on email markup.
//!
//! Quoted replies in HTML mail are wrapped in `<blockquote>` elements.
//! Removing them from the parsed tree before flattening to text drops the
//! quoted history without guessing at line prefixes.

use kuchiki::NodeRef;
use kuchiki::traits::*;
use log::debug;

/// Element that holds text quoted from an earlier message.
pub const QUOTE_CONTAINER_TAG: &str = "blockquote";

/// Parse `markup`, remove every quoted-reply container with its subtree,
/// and serialize the remaining document.
///
/// Fails open: if the document cannot be serialized back, the original
/// markup is returned untouched.
pub fn strip_blockquotes(markup: &str) -> String {
    let document = kuchiki::parse_html().one(markup);
    remove_elements(&document, &|tag| tag == QUOTE_CONTAINER_TAG);
    serialize(&document).unwrap_or_else(|| {
        debug!("returning unfiltered markup, serialization failed");
        markup.to_string()
    })
}

/// Detach every element whose local name matches `is_target`.
///
/// The next sibling is captured before the current node is inspected, so
/// detaching it does not disturb iteration. Children are only visited when
/// their parent was kept.
pub fn remove_elements(node: &NodeRef, is_target: &dyn Fn(&str) -> bool) {
    let mut child = node.first_child();
    while let Some(current) = child {
        child = current.next_sibling();
        let matched = current
            .as_element()
            .is_some_and(|el| is_target(el.name.local.as_ref()));
        if matched {
            current.detach();
            continue;
        }
        remove_elements(&current, is_target);
    }
}

/// Serialize a node tree to a UTF-8 string.
pub(crate) fn serialize(node: &NodeRef) -> Option<String> {
    let mut buf = Vec::new();
    if let Err(err) = node.serialize(&mut buf) {
        debug!("html serialization failed: {err}");
        return None;
    }
    String::from_utf8(buf).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_strip(input: &str, want_in: &str, want_out: &str) {
        let got = strip_blockquotes(input);
        if !want_in.is_empty() {
            assert!(got.contains(want_in), "expected {want_in:?} in:\n{got}");
        }
        if !want_out.is_empty() {
            assert!(!got.contains(want_out), "expected {want_out:?} gone from:\n{got}");
        }
    }

    #[test]
    fn test_removes_blockquote_content() {
        assert_strip(
            "<html><body><p>Hello</p><blockquote><p>Quoted reply</p></blockquote><p>Goodbye</p></body></html>",
            "Hello",
            "Quoted reply",
        );
    }

    #[test]
    fn test_fragment_without_document_wrapper() {
        let got =
            strip_blockquotes("<p>Hello</p><blockquote><p>Quoted reply</p></blockquote><p>Goodbye</p>");
        assert!(got.contains("Hello"));
        assert!(got.contains("Goodbye"));
        assert!(!got.contains("Quoted reply"));
        assert!(got.find("Hello") < got.find("Goodbye"));
    }

    #[test]
    fn test_removes_nested_blockquotes() {
        assert_strip(
            "<html><body><p>Original</p><blockquote><p>Level 1</p><blockquote><p>Level 2</p></blockquote></blockquote></body></html>",
            "Original",
            "Level 2",
        );
    }

    #[test]
    fn test_adjacent_blockquotes_are_all_removed() {
        let got = strip_blockquotes(
            "<div>Keep</div><blockquote>one</blockquote><blockquote>two</blockquote><blockquote>three</blockquote><div>Tail</div>",
        );
        for quoted in ["one", "two", "three"] {
            assert!(!got.contains(quoted), "{quoted} survived: {got}");
        }
        assert!(got.contains("Keep"));
        assert!(got.contains("Tail"));
    }

    #[test]
    fn test_blockquote_deep_in_tree() {
        assert_strip(
            "<table><tr><td><div><span>Top</span><blockquote type=\"cite\">Deep quote</blockquote></div></td></tr></table>",
            "Top",
            "Deep quote",
        );
    }

    #[test]
    fn test_preserves_html_without_blockquotes() {
        assert_strip(
            "<html><body><p>Just a paragraph</p><div>And a div</div></body></html>",
            "Just a paragraph",
            "",
        );
        assert_strip("<p>a</p><div>And a div</div>", "And a div", "");
    }

    #[test]
    fn test_handles_empty_input() {
        assert_strip("", "", "");
    }

    #[test]
    fn test_handles_plain_text() {
        assert_strip(
            "Just plain text, no tags here.",
            "Just plain text, no tags here.",
            "",
        );
    }

    #[test]
    fn test_remove_elements_with_custom_predicate() {
        let document = kuchiki::parse_html().one("<p>text</p><img src=\"x.png\"><script>var a;</script>");
        remove_elements(&document, &|tag| matches!(tag, "img" | "script"));
        let out = serialize(&document).unwrap();
        assert!(out.contains("text"));
        assert!(!out.contains("<img"));
        assert!(!out.contains("var a"));
    }
}
