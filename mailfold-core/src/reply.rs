//! Removal of quoted replies and signatures from plain-text bodies.
//!
//! Where a quoted reply ends and a forwarded message begins depends on the
//! mail client that produced the text, so this is a pluggable policy. The
//! one hard rule is that a forwarded block is never touched.

use std::sync::LazyLock;

use regex::Regex;

/// Strips trailing quoted-reply and signature content from plain text.
pub trait ReplyStripper {
    /// Return `text` without trailing quoted replies or signature.
    ///
    /// Text that contains no quote markers must come back unchanged apart
    /// from trailing whitespace.
    fn strip(&self, text: &str) -> String;
}

impl<F> ReplyStripper for F
where
    F: Fn(&str) -> String,
{
    fn strip(&self, text: &str) -> String {
        self(text)
    }
}

/// Signatures longer than this are treated as body text.
const MAX_SIGNATURE_LINES: usize = 10;

/// How far below a `From:` line an Outlook header block may carry `Sent:`.
const OUTLOOK_HEADER_SPAN: usize = 3;

/// How far below a `From:` line an Outlook header block may carry `Subject:`.
const OUTLOOK_SUBJECT_SPAN: usize = 6;

static FORWARD_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(-{3,}\s*forwarded message\s*-{3,}|begin forwarded message:)\s*$")
        .expect("valid forward marker regex")
});

static REPLY_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(on\s.+\swrote:|-{3,}\s*original message\s*-{3,})\s*$")
        .expect("valid reply header regex")
});

static REPLY_HEADER_START: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*on\s.+").expect("valid reply header start regex"));

static REPLY_HEADER_END: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^.*\swrote:\s*$").expect("valid reply header end regex"));

static OUTLOOK_FROM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*\*?from:\*?\s+\S").expect("valid outlook from regex"));

static OUTLOOK_SENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*\*?(sent|date):\*?\s+\S").expect("valid outlook sent regex")
});

static OUTLOOK_FORWARD_SUBJECT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*\*?subject:\*?\s*(fw|fwd):").expect("valid forward subject regex")
});

/// Horizontal rule Outlook draws above a quoted header block.
static OUTLOOK_RULE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*_{10,}\s*$").expect("valid outlook rule regex"));

static SIGNATURE_DELIMITER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(--|__)\s?$").expect("valid signature regex"));

static MOBILE_FOOTER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(sent from my |get outlook for )").expect("valid mobile footer regex")
});

/// Line-oriented heuristics tuned for the common Gmail, Apple Mail and
/// Outlook reply layouts.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicReplyStripper;

impl ReplyStripper for HeuristicReplyStripper {
    fn strip(&self, text: &str) -> String {
        let normalized = text.replace("\r\n", "\n");
        let lines: Vec<&str> = normalized.lines().collect();

        let (own, forwarded) = match find_forward_start(&lines) {
            Some(idx) => lines.split_at(idx),
            None => (lines.as_slice(), &[][..]),
        };

        let own = strip_own_text(own);

        let mut out = own.join("\n");
        if !forwarded.is_empty() {
            if !out.is_empty() {
                out.push_str("\n\n");
            }
            out.push_str(&forwarded.join("\n"));
        }
        out.truncate(out.trim_end().len());
        out
    }
}

/// Index of the first line of a forwarded block.
///
/// Besides explicit marker lines, Outlook forwards inline: a `From:`/`Sent:`
/// header block whose subject starts with `FW:`, usually under a rule line
/// that then belongs to the forwarded block.
fn find_forward_start(lines: &[&str]) -> Option<usize> {
    (0..lines.len()).find_map(|idx| {
        if FORWARD_MARKER.is_match(lines[idx]) {
            return Some(idx);
        }
        let forwarded_header = is_outlook_header(lines, idx)
            && lines
                .iter()
                .skip(idx + 1)
                .take(OUTLOOK_SUBJECT_SPAN)
                .any(|l| OUTLOOK_FORWARD_SUBJECT.is_match(l));
        if !forwarded_header {
            return None;
        }
        match idx.checked_sub(1) {
            Some(prev) if OUTLOOK_RULE.is_match(lines[prev]) => Some(prev),
            _ => Some(idx),
        }
    })
}

/// Apply reply and signature removal to the author's own text.
fn strip_own_text<'a>(lines: &[&'a str]) -> Vec<&'a str> {
    let mut end = find_reply_header(lines).unwrap_or(lines.len());

    end = trim_trailing(lines, end, |l| {
        l.trim().is_empty() || is_quoted(l) || OUTLOOK_RULE.is_match(l)
    });

    if let Some(sig) = find_signature(&lines[..end]) {
        end = sig;
    }
    end = trim_trailing(lines, end, |l| l.trim().is_empty());

    lines[..end].to_vec()
}

/// Index of the first line that introduces quoted history.
fn find_reply_header(lines: &[&str]) -> Option<usize> {
    for (idx, line) in lines.iter().enumerate() {
        if REPLY_HEADER.is_match(line) {
            return Some(idx);
        }
        // Gmail wraps long attributions: "On Mon, ... <x@y.z>\nwrote:"
        if REPLY_HEADER_START.is_match(line)
            && lines
                .get(idx + 1)
                .is_some_and(|next| REPLY_HEADER_END.is_match(&format!(" {next}")))
        {
            return Some(idx);
        }
        if is_outlook_header(lines, idx) {
            return Some(idx);
        }
    }
    None
}

/// Whether `lines[idx]` opens an Outlook `From:` ... `Sent:` header block.
fn is_outlook_header(lines: &[&str], idx: usize) -> bool {
    OUTLOOK_FROM.is_match(lines[idx])
        && lines
            .iter()
            .skip(idx + 1)
            .take(OUTLOOK_HEADER_SPAN)
            .any(|l| OUTLOOK_SENT.is_match(l))
}

/// Start of a trailing signature block, if one exists.
fn find_signature(lines: &[&str]) -> Option<usize> {
    let last = lines.iter().rposition(|l| !l.trim().is_empty())?;
    if MOBILE_FOOTER.is_match(lines[last]) {
        return Some(last);
    }
    let delimiter = lines.iter().rposition(|l| SIGNATURE_DELIMITER.is_match(l))?;
    if delimiter > 0 && last - delimiter <= MAX_SIGNATURE_LINES {
        Some(delimiter)
    } else {
        None
    }
}

fn trim_trailing(lines: &[&str], mut end: usize, drop: impl Fn(&str) -> bool) -> usize {
    while end > 0 && drop(lines[end - 1]) {
        end -= 1;
    }
    end
}

fn is_quoted(line: &str) -> bool {
    line.trim_start().starts_with('>')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strip(text: &str) -> String {
        HeuristicReplyStripper.strip(text)
    }

    #[test]
    fn test_strips_gmail_reply() {
        let got = strip(
            "Hey, this is the original message.\n\nOn Mon, Jan 1, 2024 at 10:00 AM Someone <someone@example.com> wrote:\n> This is the quoted reply.\n> It should be removed.",
        );
        assert_eq!(got, "Hey, this is the original message.");
    }

    #[test]
    fn test_strips_wrapped_attribution() {
        let got = strip(
            "Sounds good.\n\nOn Tue, Feb 6, 2024 at 9:12 AM A Very Long Sender Name <long@example.com>\nwrote:\n> earlier",
        );
        assert_eq!(got, "Sounds good.");
    }

    #[test]
    fn test_strips_outlook_header() {
        let got = strip(
            "Approved.\n\n-----Original Message-----\nFrom: Bob\nSent: Monday\nSubject: budget\n\nplease approve",
        );
        assert_eq!(got, "Approved.");

        let got = strip(
            "See below.\n\nFrom: Bob <bob@example.com>\nSent: Monday, January 1, 2024 10:00 AM\nTo: me\n\nold text",
        );
        assert_eq!(got, "See below.");
    }

    #[test]
    fn test_strips_outlook_reply_under_rule() {
        let got = strip(
            "Works for me.\n\n________________________________\nFrom: Bob <bob@example.com>\nSent: Monday, January 1, 2024 10:00 AM\nTo: me\nSubject: RE: lunch\n\nold text",
        );
        assert_eq!(got, "Works for me.");
    }

    #[test]
    fn test_preserves_outlook_inline_forward() {
        let text = "FYI, see below.\n\n________________________________\nFrom: Bob <bob@example.com>\nSent: Monday, January 1, 2024 10:00 AM\nTo: Team\nSubject: FW: budget numbers\n\nThe numbers are attached.";
        assert_eq!(strip(text), text);

        let bare = "Passing this on.\n\nFrom: Carol <carol@example.com>\nSent: Tuesday\nSubject: Fwd: offsite\n\nAgenda inside.";
        assert_eq!(strip(bare), bare);
    }

    #[test]
    fn test_reply_above_outlook_forward_is_stripped() {
        let text = "Thanks!\n\nOn Mon, Jan 1, 2024 Bob wrote:\n> hi\n\n________________________________\nFrom: x@example.com\nSent: Monday\nSubject: FW: report\n\nforwarded body";
        let got = strip(text);
        assert!(got.starts_with("Thanks!\n\n____"));
        assert!(!got.contains("> hi"));
        assert!(got.ends_with("forwarded body"));
    }

    #[test]
    fn test_strips_trailing_quote_without_header() {
        let got = strip("My answer\n\n> their question\n> more\n");
        assert_eq!(got, "My answer");
    }

    #[test]
    fn test_keeps_interleaved_replies() {
        let text = "> question one\nanswer one\n> question two\nanswer two";
        assert_eq!(strip(text), text);
    }

    #[test]
    fn test_strips_signature() {
        let got = strip("Body text\nmore body\n\n-- \nJane Doe\nACME Corp\n");
        assert_eq!(got, "Body text\nmore body");
    }

    #[test]
    fn test_long_trailer_after_delimiter_is_kept() {
        let mut text = String::from("intro\n--\n");
        for i in 0..(MAX_SIGNATURE_LINES + 2) {
            text.push_str(&format!("line {i}\n"));
        }
        let got = strip(&text);
        assert!(got.contains("line 0"));
        assert!(got.contains("--"));
    }

    #[test]
    fn test_strips_mobile_footer() {
        assert_eq!(strip("On my way.\n\nSent from my iPhone"), "On my way.");
    }

    #[test]
    fn test_preserves_forwarded_message() {
        let text = "Check out this forwarded message:\n\n---------- Forwarded message ---------\nFrom: Someone <someone@example.com>\nSubject: Important thing\n\nThe forwarded content here.";
        assert_eq!(strip(text), text);
    }

    #[test]
    fn test_forwarded_block_with_quotes_is_verbatim() {
        let text = "FYI\n\nBegin forwarded message:\n\nFrom: a@example.com\n\nOn Mon, Jan 1 X wrote:\n> quoted inside forward";
        let got = strip(text);
        assert!(got.contains("quoted inside forward"));
        assert!(got.starts_with("FYI"));
    }

    #[test]
    fn test_reply_above_forward_is_stripped() {
        let text = "Thanks!\n\nOn Mon, Jan 1, 2024 Bob wrote:\n> hi\n\n---------- Forwarded message ----------\nFrom: x\n\nforwarded body";
        let got = strip(text);
        assert!(got.starts_with("Thanks!"));
        assert!(!got.contains("> hi"));
        assert!(got.contains("forwarded body"));
    }

    #[test]
    fn test_idempotent_on_clean_text() {
        let text = "Line one\n\nLine two";
        assert_eq!(strip(text), text);
        assert_eq!(strip(&strip(text)), text);
        assert_eq!(strip(""), "");
    }

    #[test]
    fn test_closure_stripper() {
        let upper = |t: &str| t.to_uppercase();
        assert_eq!(upper.strip("abc"), "ABC");
    }
}
