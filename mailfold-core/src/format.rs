//! Header blocks and summary rows for email listings.

use std::fmt::Write as _;

use chrono::{DateTime, SecondsFormat, Utc};

use crate::types::{Email, EmailAddress};

/// Separator written between consecutive emails of one response.
pub const EMAIL_SEPARATOR: &str = "\n---\n\n";

/// `Name <email>` when a display name is known, else the bare address.
pub fn format_address(addr: &EmailAddress) -> String {
    match addr.name.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
        Some(name) => format!("{name} <{}>", addr.email),
        None => addr.email.clone(),
    }
}

pub fn format_addresses(addrs: &[EmailAddress]) -> String {
    addrs
        .iter()
        .map(format_address)
        .collect::<Vec<_>>()
        .join(", ")
}

fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Arrival time, or the sender's timestamp when the server gave none.
fn email_date(email: &Email) -> Option<DateTime<Utc>> {
    email
        .received_at
        .as_deref()
        .and_then(parse_timestamp)
        .or_else(|| email.sent_at.as_deref().and_then(parse_timestamp))
}

/// Render the fixed header block for one email.
///
/// With `full_headers` and raw headers present, every header is dumped as
/// `Name: value`. Otherwise a summary block is written. Either way the
/// block ends with a blank line.
pub fn render_header(email: &Email, full_headers: bool) -> String {
    let mut hdr = String::new();
    if full_headers && !email.headers.is_empty() {
        for h in &email.headers {
            let _ = writeln!(hdr, "{}: {}", h.name, h.value.trim());
        }
    } else {
        let _ = writeln!(hdr, "ID: {}", email.id);
        let _ = writeln!(hdr, "Subject: {}", email.subject.as_deref().unwrap_or(""));
        let address_fields = [("From", &email.from), ("To", &email.to), ("CC", &email.cc)];
        for (label, addrs) in address_fields {
            if let Some(addrs) = addrs.as_deref().filter(|a| !a.is_empty()) {
                let _ = writeln!(hdr, "{label}: {}", format_addresses(addrs));
            }
        }
        if let Some(date) = email_date(email) {
            let _ = writeln!(
                hdr,
                "Date: {}",
                date.to_rfc3339_opts(SecondsFormat::Secs, true)
            );
        }
    }
    hdr.push('\n');
    hdr
}

/// Render query results: a total line followed by one row per email.
///
/// Rows are `id  date  from  [size bytes]  subject`. Headers named in
/// `extra_headers` (case-insensitive) are listed indented below the row.
pub fn render_query_summary(total: u64, emails: &[Email], extra_headers: &[String]) -> String {
    let mut sb = String::new();
    let _ = write!(sb, "Total: {total} (returning {})\n\n", emails.len());
    for e in emails {
        let from = e.from.as_deref().map(format_addresses).unwrap_or_default();
        let date = email_date(e)
            .map(|d| d.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_default();
        let _ = writeln!(
            sb,
            "{}  {}  {}  [{} bytes]  {}",
            e.id,
            date,
            from,
            e.size,
            e.subject.as_deref().unwrap_or("")
        );
        for h in &e.headers {
            if extra_headers.iter().any(|want| h.name.eq_ignore_ascii_case(want)) {
                let _ = writeln!(sb, "  {}: {}", h.name, h.value.trim());
            }
        }
    }
    sb
}
