//! mailfold-core: turn raw email bodies into bounded plain text.
//!
//! This crate provides:
//! - Structural removal of quoted replies from HTML mail
//! - HTML to plain text rendering
//! - Pluggable plain-text reply and signature stripping
//! - Line-aware truncation of single bodies
//! - A shared character budget across the emails of one response
//! - Layered configuration of the limits involved

pub mod body;
pub mod budget;
pub mod config;
pub mod error;
pub mod format;
pub mod html;
pub mod paths;
pub mod render;
pub mod reply;
pub mod response;
pub mod truncate;
pub mod types;

pub use body::BodyPipeline;
pub use budget::{Allocation, ResponseBudgetAllocator};
pub use config::{AppConfig, BodyConfig, RenderConfig};
pub use error::{Error, Result};
pub use html::strip_blockquotes;
pub use paths::AppPaths;
pub use render::html_to_text;
pub use reply::{HeuristicReplyStripper, ReplyStripper};
pub use response::{ResponseOptions, build_email_response, parse_emails};
pub use truncate::truncate_body;
pub use types::{Email, Item, RawBodies, RawBody};
