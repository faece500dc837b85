//! # Balancer settings
//!
//! Persistent defaults for the balancer front-ends, stored as JSON (`balancer_config.json`
//! in the working directory unless another path is given):
//! ```json
//! {
//!   "fractional": false,
//!   "return_steps": false,
//!   "ambiguity": "reject",
//!   "log_level": "info"
//! }
//! ```
//! A missing file means default settings. A file that exists but cannot be parsed is an error,
//! so a typo in the settings never silently turns into defaults.
use super::balance_api::BalanceOptions;
use super::coefficients::CoefficientMode;
use super::null_space::AmbiguityPolicy;
use log::{LevelFilter, info};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const DEFAULT_CONFIG_FILE: &str = "balancer_config.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BalancerConfig {
    /// fractional coefficients instead of integers
    pub fractional: bool,
    /// attach the step trace to every result
    pub return_steps: bool,
    pub ambiguity: AmbiguityPolicy,
    /// "off", "error", "warn", "info", "debug" or "trace"
    pub log_level: String,
}

impl Default for BalancerConfig {
    fn default() -> Self {
        Self {
            fractional: false,
            return_steps: false,
            ambiguity: AmbiguityPolicy::Reject,
            log_level: "info".to_string(),
        }
    }
}

impl BalancerConfig {
    /// per-request options for `balance_equation`
    pub fn options(&self) -> BalanceOptions {
        BalanceOptions {
            mode: if self.fractional {
                CoefficientMode::Fractional
            } else {
                CoefficientMode::Integer
            },
            return_steps: self.return_steps,
            ambiguity: self.ambiguity,
        }
    }

    /// unknown level names fall back to `Info`
    pub fn level_filter(&self) -> LevelFilter {
        self.log_level.parse().unwrap_or(LevelFilter::Info)
    }
}

/// Holds the settings together with the file they are persisted to.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config: BalancerConfig,
    config_file: String,
}

impl ConfigManager {
    /// settings from `balancer_config.json` in the working directory
    pub fn new() -> Result<Self, Box<dyn std::error::Error>> {
        Self::with_config_file(DEFAULT_CONFIG_FILE)
    }

    pub fn with_config_file(config_file: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let config = Self::load_config(config_file)?;
        Ok(Self {
            config,
            config_file: config_file.to_string(),
        })
    }

    fn load_config(config_file: &str) -> Result<BalancerConfig, Box<dyn std::error::Error>> {
        if Path::new(config_file).exists() {
            let content = fs::read_to_string(config_file)?;
            let config: BalancerConfig = serde_json::from_str(&content)
                .map_err(|e| format!("cannot parse settings file {}: {}", config_file, e))?;
            Ok(config)
        } else {
            Ok(BalancerConfig::default())
        }
    }

    pub fn save(&self) -> Result<(), Box<dyn std::error::Error>> {
        let content = serde_json::to_string_pretty(&self.config)?;
        fs::write(&self.config_file, content)?;
        info!("settings saved to {}", self.config_file);
        Ok(())
    }

    pub fn config(&self) -> &BalancerConfig {
        &self.config
    }

    pub fn config_file(&self) -> &str {
        &self.config_file
    }

    pub fn options(&self) -> BalanceOptions {
        self.config.options()
    }

    pub fn set_fractional(&mut self, fractional: bool) -> Result<(), Box<dyn std::error::Error>> {
        self.config.fractional = fractional;
        self.save()
    }

    pub fn set_return_steps(&mut self, return_steps: bool) -> Result<(), Box<dyn std::error::Error>> {
        self.config.return_steps = return_steps;
        self.save()
    }

    pub fn set_ambiguity(
        &mut self,
        ambiguity: AmbiguityPolicy,
    ) -> Result<(), Box<dyn std::error::Error>> {
        self.config.ambiguity = ambiguity;
        self.save()
    }

    /// Rejects names that `log` does not know, the stored value stays unchanged then.
    pub fn set_log_level(&mut self, level: &str) -> Result<(), Box<dyn std::error::Error>> {
        level
            .parse::<LevelFilter>()
            .map_err(|_| format!("unknown log level: {}", level))?;
        self.config.log_level = level.to_lowercase();
        self.save()
    }

    pub fn reset_to_defaults(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        self.config = BalancerConfig::default();
        self.save()
    }
}
