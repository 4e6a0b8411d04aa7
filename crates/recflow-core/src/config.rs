//! Pipeline configuration: optional TOML file under the XDG config dir.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::FailureKind;
use crate::retry::RetryPolicy;

/// Retry policy parameters (optional `[retry]` section in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Maximum number of attempts per read (including the first).
    pub max_attempts: u32,
    /// Fixed delay between attempts, in milliseconds.
    pub delay_ms: u64,
    /// Failure kinds eligible for retry; omitted = every kind.
    pub retryable_kinds: Option<Vec<FailureKind>>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            delay_ms: 250,
            retryable_kinds: None,
        }
    }
}

impl RetryConfig {
    /// Convert into the runtime policy.
    pub fn into_policy(self) -> RetryPolicy {
        let policy = RetryPolicy::new(self.max_attempts, Duration::from_millis(self.delay_ms));
        match self.retryable_kinds {
            Some(kinds) => policy.retry_on(kinds),
            None => policy,
        }
    }
}

/// Pipeline configuration loaded from `~/.config/recflow/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Records per batch handed to batch listeners.
    pub batch_size: usize,
    /// Upper bound on concurrent target sends during fan-out (1 = sequential).
    pub max_concurrent_sends: usize,
    /// Optional retry policy; built-in defaults are used when missing.
    pub retry: Option<RetryConfig>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            batch_size: 100,
            max_concurrent_sends: 1,
            retry: None,
        }
    }
}

impl PipelineConfig {
    /// The configured retry policy, or the built-in default.
    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry.clone().map(RetryConfig::into_policy).unwrap_or_default()
    }
}

/// Default config path via XDG (`~/.config/recflow/config.toml`).
pub fn default_config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("recflow")?;
    Ok(xdg_dirs.get_config_home().join("config.toml"))
}

/// Load configuration from `path`; a missing file yields built-in defaults.
pub fn load_config(path: &Path) -> Result<PipelineConfig> {
    if !path.exists() {
        return Ok(PipelineConfig::default());
    }
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    let cfg: PipelineConfig = toml::from_str(&text)
        .with_context(|| format!("parsing config {}", path.display()))?;
    Ok(cfg)
}
