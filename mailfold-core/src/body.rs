//! Body normalization: pick a representation, strip quotes, render, cut.

use log::debug;

use crate::config::{AppConfig, BodyConfig, DEFAULT_WRAP_WIDTH};
use crate::html::strip_blockquotes;
use crate::render::html_to_text;
use crate::reply::{HeuristicReplyStripper, ReplyStripper};
use crate::truncate::truncate_body;
use crate::types::{RawBodies, RawBody};

/// Turns raw email bodies into bounded plain text.
///
/// Holds only configuration, so one pipeline can serve any number of
/// independent calls.
#[derive(Debug, Clone)]
pub struct BodyPipeline<S = HeuristicReplyStripper> {
    stripper: S,
    max_body_chars: usize,
    truncation_marker: String,
    no_content_placeholder: String,
    wrap_width: usize,
}

impl Default for BodyPipeline {
    fn default() -> Self {
        Self::from_body_config(&BodyConfig::default(), DEFAULT_WRAP_WIDTH)
    }
}

impl BodyPipeline {
    /// Pipeline using the default heuristic reply stripper.
    pub fn new(config: &AppConfig) -> Self {
        Self::from_body_config(&config.body, config.render.effective_wrap_width())
    }

    fn from_body_config(body: &BodyConfig, wrap_width: usize) -> Self {
        Self {
            stripper: HeuristicReplyStripper,
            max_body_chars: body.effective_max_body_chars(),
            truncation_marker: body.truncation_marker.clone(),
            no_content_placeholder: body.no_content_placeholder.clone(),
            wrap_width,
        }
    }
}

impl<S: ReplyStripper> BodyPipeline<S> {
    /// Swap in a different reply stripper, keeping the limits.
    pub fn with_stripper<T: ReplyStripper>(self, stripper: T) -> BodyPipeline<T> {
        BodyPipeline {
            stripper,
            max_body_chars: self.max_body_chars,
            truncation_marker: self.truncation_marker,
            no_content_placeholder: self.no_content_placeholder,
            wrap_width: self.wrap_width,
        }
    }

    pub fn truncation_marker(&self) -> &str {
        &self.truncation_marker
    }

    /// Normalize the preferred representation of `bodies`.
    ///
    /// Plain text goes straight to the reply stripper. HTML first loses its
    /// blockquotes, then is rendered to text.
    pub fn normalize(&self, bodies: &RawBodies) -> String {
        match bodies.preferred() {
            Some(RawBody::PlainText(text)) => self.prepare_body(&text, 0),
            Some(RawBody::Html(markup)) => {
                let text = html_to_text(&strip_blockquotes(&markup), self.wrap_width);
                self.prepare_body(&text, 0)
            }
            None => self.prepare_body("", 0),
        }
    }

    /// Strip quoted replies and signature from `text`, then truncate it to
    /// `max_chars`. Zero selects the pipeline's per-body limit.
    ///
    /// When nothing readable is left (an empty body, or one that was
    /// entirely quoted) the placeholder takes its place. It still passes
    /// through the truncator.
    pub fn prepare_body(&self, text: &str, max_chars: usize) -> String {
        let limit = if max_chars == 0 {
            self.max_body_chars
        } else {
            max_chars
        };
        let stripped = self.stripper.strip(text);
        if stripped.trim().is_empty() {
            debug!("no readable body content, using placeholder");
            return self.truncate(&self.no_content_placeholder, limit);
        }
        self.truncate(&stripped, limit)
    }

    /// Truncate with this pipeline's marker.
    pub fn truncate(&self, text: &str, limit: usize) -> String {
        truncate_body(text, limit, &self.truncation_marker)
    }
}
