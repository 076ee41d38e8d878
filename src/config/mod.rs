//! Configuration management for scorepipe
//!
//! Settings are layered with figment, lowest priority first:
//!
//! 1. Embedded `default-config.toml`
//! 2. User config `~/.config/scorepipe/config.toml`
//! 3. Directory config `./scorepipe.toml`
//! 4. Custom config passed with `--config` (TOML, JSON or YAML)
//! 5. Environment variables (`SCOREPIPE_PIPELINE__THRESHOLD=5`)
//! 6. CLI overrides

use anyhow::{Context, Result};
use figment::Figment;
use figment::providers::{Env, Format, Json, Serialized, Toml, Yaml};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::driver::QueueKind;
use crate::driver::report::ReportFormat;
use crate::pipeline::QueueOrder;
use crate::scoring::ScoringKind;

// Embed the default config at compile time
const DEFAULT_CONFIG: &str = include_str!("../../default-config.toml");

const ENV_PREFIX: &str = "SCOREPIPE_";

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScorepipeConfig {
    pub pipeline: PipelineSettings,
    pub output: OutputSettings,
}

/// Pipeline sizing, scoring and queue settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineSettings {
    /// Results must score strictly above this to be kept
    pub threshold: f64,
    pub strategy: ScoringKind,
    pub queue: QueueKind,
    pub order: QueueOrder,
    /// Lower bound on the worker count
    pub min_workers: usize,
    /// Upper bound on the worker count (0 = CPU cores)
    pub max_threads: usize,
    /// Abort the run after this many seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline_secs: Option<u64>,
}

/// Report rendering settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputSettings {
    pub format: ReportFormat,
    pub progress: bool,
}

/// CLI-supplied values; `None` leaves the lower layers untouched
#[derive(Debug, Clone, Default, Serialize)]
pub struct CliOverrides {
    pub pipeline: PipelineOverrides,
    pub output: OutputOverrides,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct PipelineOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub threshold: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strategy: Option<ScoringKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub queue: Option<QueueKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<QueueOrder>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_threads: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deadline_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct OutputOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<ReportFormat>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<bool>,
}

impl ScorepipeConfig {
    /// Load the merged configuration and validate it
    pub fn load(custom_config: Option<&str>, cli_overrides: Option<&CliOverrides>) -> Result<Self> {
        tracing::trace!("CONFIG LOAD: Starting");

        let mut figment = Figment::new()
            .merge(Toml::string(DEFAULT_CONFIG))
            .merge(Toml::file(Self::user_config_path()))
            .merge(Toml::file("scorepipe.toml"));

        if let Some(path) = custom_config {
            figment = Self::merge_custom(figment, path)?;
        }

        figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));

        if let Some(overrides) = cli_overrides {
            tracing::trace!("CONFIG LOAD: Applying CLI overrides");
            figment = figment.merge(Serialized::defaults(overrides));
        }

        let config: ScorepipeConfig = figment
            .extract()
            .context("Failed to parse configuration")?;
        config.validate()?;

        tracing::trace!("CONFIG LOAD: Final pipeline = {:?}", config.pipeline);
        Ok(config)
    }

    fn merge_custom(figment: Figment, path: &str) -> Result<Figment> {
        let file = Path::new(path);
        if !file.exists() {
            anyhow::bail!("Config file not found: {}", file.display());
        }

        let extension = file
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);
        Ok(match extension.as_deref() {
            Some("json") => figment.merge(Json::file(file)),
            Some("yaml" | "yml") => figment.merge(Yaml::file(file)),
            _ => figment.merge(Toml::file(file)),
        })
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if !self.pipeline.threshold.is_finite() {
            anyhow::bail!("pipeline.threshold must be a finite number");
        }
        if self.pipeline.min_workers == 0 {
            anyhow::bail!("pipeline.min_workers must be at least 1");
        }
        if self.pipeline.deadline_secs == Some(0) {
            anyhow::bail!("pipeline.deadline_secs must be positive when set");
        }
        Ok(())
    }

    fn user_config_path() -> String {
        match std::env::var("HOME") {
            Ok(home) => format!("{}/.config/scorepipe/config.toml", home),
            Err(_) => "~/.config/scorepipe/config.toml".to_string(),
        }
    }
}
