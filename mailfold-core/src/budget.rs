//! Sharing one character budget across the items of a response.
//!
//! Items are written in order. Each accepted item spends its header plus
//! its (possibly truncated) body from the running budget, so short bodies
//! leave more room for the ones that follow. The first item whose header
//! no longer fits ends the response: it and everything after it are
//! reported as omitted.

use log::{debug, info};
use serde::Serialize;

use crate::body::BodyPipeline;
use crate::reply::ReplyStripper;
use crate::truncate::floor_char_boundary;
use crate::types::Item;

/// Result of one allocation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Allocation {
    pub output: String,
    pub included: usize,
    pub omitted: usize,
    pub total: usize,
}

impl Allocation {
    pub fn is_complete(&self) -> bool {
        self.omitted == 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Accepting,
    Omitting,
}

/// Drives items through a [`BodyPipeline`] under a shared budget.
#[derive(Debug)]
pub struct ResponseBudgetAllocator<'a, S> {
    pipeline: &'a BodyPipeline<S>,
    total_budget: usize,
    unit: &'a str,
}

impl<'a, S: ReplyStripper> ResponseBudgetAllocator<'a, S> {
    pub fn new(pipeline: &'a BodyPipeline<S>, total_budget: usize) -> Self {
        Self {
            pipeline,
            total_budget,
            unit: "items",
        }
    }

    /// Plural noun used in the omission advisory, e.g. `"emails"`.
    pub fn unit(mut self, unit: &'a str) -> Self {
        self.unit = unit;
        self
    }

    /// Render `items` into one response bounded by the budget.
    ///
    /// The output never exceeds the budget plus the length of the
    /// truncation marker, advisory included.
    pub fn allocate(&self, items: &[Item]) -> Allocation {
        let mut remaining = self.total_budget;
        let mut output = String::new();
        let mut included = 0;
        let mut state = State::Accepting;

        for item in items {
            let header_cost = item.header.len();
            if remaining <= header_cost {
                state = State::Omitting;
                break;
            }
            let body_limit = remaining - header_cost;
            let body = self
                .pipeline
                .truncate(&self.pipeline.normalize(&item.bodies), body_limit);

            output.push_str(&item.header);
            output.push_str(&body);
            remaining = remaining.saturating_sub(header_cost + body.len());
            included += 1;
        }

        let total = items.len();
        let omitted = total - included;
        if state == State::Omitting {
            info!("response budget exhausted: {omitted} of {total} {} omitted", self.unit);
            let room = (self.total_budget + self.pipeline.truncation_marker().len())
                .saturating_sub(output.len());
            output.push_str(&self.advisory(omitted, total, room));
        } else {
            debug!("response fit budget: {included} {}, {remaining} chars spare", self.unit);
        }

        Allocation {
            output,
            included,
            omitted,
            total,
        }
    }

    /// Advisory sized to `room`: the full sentence when it fits, a compact
    /// form otherwise, clipped as a last resort.
    fn advisory(&self, omitted: usize, total: usize, room: usize) -> String {
        let full = format!(
            "\n\n--- TRUNCATED: {omitted} of {total} {unit} omitted (response would exceed {budget} chars). Fetch fewer {unit} per call. ---\n",
            unit = self.unit,
            budget = self.total_budget,
        );
        if full.len() <= room {
            return full;
        }
        let mut compact = format!("\n[{omitted} of {total} omitted]");
        if compact.len() > room {
            debug!("clipping omission advisory to {room} chars");
            compact.truncate(floor_char_boundary(&compact, room));
        }
        compact
    }
}
