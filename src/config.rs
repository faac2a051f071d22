//! Configuration management for perspective-split

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::curve::Curve;
use crate::perspective::SplitOptions;
use crate::strategy::{FallbackStrategy, SplitStrategy, StrategyKind};

/// Strategy selection and execution settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SplitConfig {
    /// Strategy used for every region
    #[serde(default)]
    pub strategy: StrategyKind,

    /// Strategy used instead when a region has an invalid perspective shape
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback: Option<StrategyKind>,

    /// Assemble regions in parallel
    #[serde(default = "default_parallel")]
    pub parallel: bool,
}

fn default_parallel() -> bool {
    true
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            strategy: StrategyKind::default(),
            fallback: None,
            parallel: default_parallel(),
        }
    }
}

impl SplitConfig {
    pub fn options(&self) -> SplitOptions {
        SplitOptions {
            parallel: self.parallel,
        }
    }

    /// Build the configured strategy, wrapped with the fallback if any
    pub fn build<C: Curve + Sync + 'static>(&self) -> Box<dyn SplitStrategy<C>> {
        let primary = self.strategy.build(self.options());
        match self.fallback {
            Some(fallback) if fallback != self.strategy => {
                let secondary = fallback.build(self.options());
                Box::new(FallbackStrategy::new(primary, secondary)) as Box<dyn SplitStrategy<C>>
            }
            _ => primary,
        }
    }
}

/// Output formatting
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Pretty-print the JSON result
    #[serde(default = "default_pretty")]
    pub pretty: bool,
}

fn default_pretty() -> bool {
    true
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            pretty: default_pretty(),
        }
    }
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub split: SplitConfig,

    #[serde(default)]
    pub output: OutputConfig,
}

impl Config {
    /// Load configuration from a file, or use defaults if it doesn't exist
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {:?}", path))?;
            let config: Config = toml::from_str(&content)
                .with_context(|| format!("Failed to parse config from {:?}", path))?;
            tracing::info!("Loaded configuration from {:?}", path);
            Ok(config)
        } else {
            tracing::debug!("No configuration at {:?}, using defaults", path);
            Ok(Config::default())
        }
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .context("Failed to serialize configuration")?;

        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory {:?}", parent))?;
        }

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config to {:?}", path))?;

        tracing::info!("Saved configuration to {:?}", path);
        Ok(())
    }
}
