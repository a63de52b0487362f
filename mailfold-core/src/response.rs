//! Assembling a bounded text response from an `Email/get` result.

use log::warn;
use serde::{Deserialize, Serialize};

use crate::body::BodyPipeline;
use crate::budget::{Allocation, ResponseBudgetAllocator};
use crate::config::{AppConfig, DEFAULT_MAX_RESPONSE_CHARS, clamp_limit};
use crate::error::{Error, Result};
use crate::format::{EMAIL_SEPARATOR, render_header};
use crate::reply::ReplyStripper;
use crate::types::{Email, EmailGetResponse, Item};

/// Options for one email response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseOptions {
    /// Total response budget. Non-positive selects the default.
    pub max_chars: i64,
    /// Dump raw headers instead of the summary block.
    pub full_headers: bool,
}

impl Default for ResponseOptions {
    fn default() -> Self {
        Self {
            max_chars: DEFAULT_MAX_RESPONSE_CHARS as i64,
            full_headers: false,
        }
    }
}

impl ResponseOptions {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            max_chars: config.body.effective_max_response_chars() as i64,
            full_headers: config.render.full_headers,
        }
    }

    pub fn effective_max_chars(&self) -> usize {
        clamp_limit(self.max_chars, DEFAULT_MAX_RESPONSE_CHARS)
    }
}

/// Build the per-email items: header (with separator after the first) and bodies.
pub fn email_items(emails: &[Email], full_headers: bool) -> Vec<Item> {
    emails
        .iter()
        .enumerate()
        .map(|(i, email)| {
            let mut header = String::new();
            if i > 0 {
                header.push_str(EMAIL_SEPARATOR);
            }
            header.push_str(&render_header(email, full_headers));
            Item::new(header, email.raw_bodies())
        })
        .collect()
}

/// Render `emails` into one response under the configured budget.
pub fn build_email_response<S: ReplyStripper>(
    emails: &[Email],
    options: &ResponseOptions,
    pipeline: &BodyPipeline<S>,
) -> Allocation {
    let items = email_items(emails, options.full_headers);
    ResponseBudgetAllocator::new(pipeline, options.effective_max_chars())
        .unit("emails")
        .allocate(&items)
}

/// Decode an `Email/get` payload.
///
/// Accepts the response arguments object (with a `list` array), a bare
/// array of emails, or a single email object.
pub fn parse_emails(json: &str) -> Result<Vec<Email>> {
    let value: serde_json::Value = serde_json::from_str(json)?;
    if value.is_array() {
        return Ok(serde_json::from_value(value)?);
    }
    if value.get("list").is_some() {
        let response: EmailGetResponse = serde_json::from_value(value)?;
        if !response.not_found.is_empty() {
            warn!("emails not found: {}", response.not_found.join(", "));
        }
        return Ok(response.list);
    }
    if value.get("id").is_some() {
        return Ok(vec![serde_json::from_value(value)?]);
    }
    Err(Error::Input(
        "expected an Email/get response, an array of emails, or an email object".into(),
    ))
}
