//! Configuration management for mailfold.

use std::fs;
use std::path::Path;

use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::paths::AppPaths;

const APP_NAME: &str = "mailfold";

/// Per-email body size cap applied when the configured value is unset or non-positive.
pub const DEFAULT_MAX_BODY_CHARS: usize = 4000;

/// Whole-response size cap applied when the configured value is unset or non-positive.
pub const DEFAULT_MAX_RESPONSE_CHARS: usize = 50_000;

/// Appended to a body whenever it had to be cut.
pub const DEFAULT_TRUNCATION_MARKER: &str = "\n\n[... body truncated ...]";

/// Stands in for an email that has neither a plain nor an HTML body.
pub const DEFAULT_NO_CONTENT_PLACEHOLDER: &str = "(no body content)";

/// Default line width handed to the HTML renderer.
pub const DEFAULT_WRAP_WIDTH: usize = 1000;

/// The renderer refuses to wrap narrower than this.
pub const MIN_WRAP_WIDTH: usize = 20;

/// Application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Body normalization and budget limits.
    pub body: BodyConfig,
    /// Rendering options.
    pub render: RenderConfig,
}

/// Body size limits and advisory strings.
///
/// Limits are signed so that a zero or negative value coming from a file
/// or the environment can be recognized and replaced by the default.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BodyConfig {
    /// Maximum characters kept per email body.
    pub max_body_chars: i64,
    /// Maximum characters for a whole multi-email response.
    pub max_response_chars: i64,
    /// Marker appended to truncated bodies.
    pub truncation_marker: String,
    /// Text used when an email has no body at all.
    pub no_content_placeholder: String,
}

impl Default for BodyConfig {
    fn default() -> Self {
        Self {
            max_body_chars: DEFAULT_MAX_BODY_CHARS as i64,
            max_response_chars: DEFAULT_MAX_RESPONSE_CHARS as i64,
            truncation_marker: DEFAULT_TRUNCATION_MARKER.to_string(),
            no_content_placeholder: DEFAULT_NO_CONTENT_PLACEHOLDER.to_string(),
        }
    }
}

impl BodyConfig {
    /// Per-body limit with non-positive values clamped to the default.
    pub fn effective_max_body_chars(&self) -> usize {
        clamp_limit(self.max_body_chars, DEFAULT_MAX_BODY_CHARS)
    }

    /// Response budget with non-positive values clamped to the default.
    pub fn effective_max_response_chars(&self) -> usize {
        clamp_limit(self.max_response_chars, DEFAULT_MAX_RESPONSE_CHARS)
    }
}

/// Plain-text rendering options.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Line width for HTML-to-text conversion.
    pub wrap_width: usize,
    /// Dump all raw headers instead of the summary block.
    pub full_headers: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            wrap_width: DEFAULT_WRAP_WIDTH,
            full_headers: false,
        }
    }
}

impl RenderConfig {
    /// Wrap width, never below [`MIN_WRAP_WIDTH`].
    pub fn effective_wrap_width(&self) -> usize {
        self.wrap_width.max(MIN_WRAP_WIDTH)
    }
}

/// Map a possibly non-positive limit onto a usable one.
pub fn clamp_limit(value: i64, default: usize) -> usize {
    if value <= 0 {
        default
    } else {
        usize::try_from(value).unwrap_or(usize::MAX)
    }
}

impl AppConfig {
    /// Load configuration from paths with environment overlay.
    pub fn load(paths: &AppPaths) -> Result<Self> {
        let env_prefix = env_prefix();
        let defaults = AppConfig::default();
        let mut builder = Config::builder()
            .add_source(
                File::from(paths.global_config.as_path())
                    .format(FileFormat::Toml)
                    .required(false),
            )
            .add_source(
                File::from(paths.local_config.as_path())
                    .format(FileFormat::Toml)
                    .required(false),
            )
            .add_source(
                Environment::with_prefix(&env_prefix)
                    .separator("__")
                    .try_parsing(true),
            );

        if let Some(cli_cfg) = &paths.cli_config {
            builder = builder.add_source(
                File::from(cli_cfg.as_path())
                    .format(FileFormat::Toml)
                    .required(true),
            );
        }

        builder = builder
            .set_default("body.max_body_chars", defaults.body.max_body_chars)?
            .set_default("body.max_response_chars", defaults.body.max_response_chars)?
            .set_default("body.truncation_marker", defaults.body.truncation_marker)?
            .set_default(
                "body.no_content_placeholder",
                defaults.body.no_content_placeholder,
            )?
            .set_default("render.wrap_width", defaults.render.wrap_width as u64)?
            .set_default("render.full_headers", defaults.render.full_headers)?;

        let config: AppConfig = builder.build()?.try_deserialize()?;
        Ok(config)
    }

    /// Write default config to a path.
    pub fn write_default(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| Error::Config(format!("creating config directory {parent:?}: {e}")))?;
        }
        let cfg = AppConfig::default();
        let toml = toml::to_string_pretty(&cfg)
            .map_err(|e| Error::Config(format!("serializing default config: {e}")))?;
        let mut content = String::new();
        content.push_str("# mailfold configuration\n");
        content.push_str(
            "# Place this file at $XDG_CONFIG_HOME/mailfold/config.toml (or ~/.config/mailfold/config.toml)\n",
        );
        content.push_str("# Non-positive limits fall back to the built-in defaults.\n\n");
        content.push_str(&toml);
        content.push('\n');
        fs::write(path, content)
            .map_err(|e| Error::Config(format!("writing config file to {}: {e}", path.display())))
    }

    /// Write the default config only if no file exists at `path`.
    pub fn ensure_default(path: &Path) -> Result<()> {
        if path.exists() {
            return Ok(());
        }
        Self::write_default(path)
    }
}

/// Generate environment variable prefix from app name.
fn env_prefix() -> String {
    APP_NAME
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect()
}
