//! CLI-owned settings: an optional TOML file plus `POECTL_*` environment
//! overrides, translated into the core's `VerifyPolicy` and timeout.

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

use poectl_core::VerifyPolicy;

use crate::error::CliError;

/// Tuning knobs that rarely change between runs.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Settings {
    /// Wait before the first post-apply re-read.
    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,

    /// Total re-reads while acted-on ports still disagree.
    #[serde(default = "default_verify_attempts")]
    pub verify_attempts: u32,

    /// Delay multiplier between re-reads.
    #[serde(default = "default_verify_backoff")]
    pub verify_backoff: u32,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            settle_delay_ms: default_settle_delay_ms(),
            verify_attempts: default_verify_attempts(),
            verify_backoff: default_verify_backoff(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_settle_delay_ms() -> u64 {
    2000
}
fn default_verify_attempts() -> u32 {
    3
}
fn default_verify_backoff() -> u32 {
    2
}
fn default_timeout_secs() -> u64 {
    30
}

impl Settings {
    pub fn verify_policy(&self) -> VerifyPolicy {
        VerifyPolicy {
            settle_delay: Duration::from_millis(self.settle_delay_ms),
            attempts: self.verify_attempts,
            backoff_factor: self.verify_backoff,
        }
    }

    /// Request timeout, with `--timeout` taking precedence.
    pub fn timeout(&self, flag: Option<u64>) -> Duration {
        Duration::from_secs(flag.unwrap_or(self.timeout_secs))
    }
}

// ── Config file path ─────────────────────────────────────────────────

/// Platform config location, e.g. `~/.config/poectl/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    ProjectDirs::from("com", "poectl", "poectl").map(|dirs| dirs.config_dir().join("config.toml"))
}

// ── Loading ──────────────────────────────────────────────────────────

/// Load settings: defaults, then the file (explicit path or the platform
/// default), then `POECTL_*` env vars. A missing file is not an error.
pub fn load_settings(explicit: Option<&Path>) -> Result<Settings, CliError> {
    let path = explicit.map(Path::to_path_buf).or_else(config_path);
    tracing::debug!(path = ?path, "loading settings");
    Ok(figment(path.as_deref()).extract()?)
}

fn figment(path: Option<&Path>) -> Figment {
    let mut figment = Figment::new().merge(Serialized::defaults(Settings::default()));
    if let Some(path) = path {
        figment = figment.merge(Toml::file(path));
    }
    // POECTL_PORT, POECTL_SITE and friends belong to clap.
    figment.merge(Env::prefixed("POECTL_").only(&[
        "settle_delay_ms",
        "verify_attempts",
        "verify_backoff",
        "timeout_secs",
    ]))
}
