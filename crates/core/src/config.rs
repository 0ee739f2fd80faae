// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Runtime configuration
//!
//! Every field has a default, so an empty TOML document is a valid config.

use crate::error::ReactiveError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default type matched by every dispatch
pub const WILDCARD: &str = "*";
/// Default type of events published when a computed getter fails
pub const ERROR_EVENT: &str = "__error__";
/// Default bound for `TaskQueue::run_until_idle`
pub const TICK_LIMIT: usize = 1000;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub bus: BusConfig,
    pub scheduler: SchedulerConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BusConfig {
    /// Listeners subscribed to this type receive every event
    pub wildcard: String,
    pub error_event: String,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            wildcard: WILDCARD.to_string(),
            error_event: ERROR_EVENT.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    pub tick_limit: usize,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            tick_limit: TICK_LIMIT,
        }
    }
}

impl Config {
    /// Parse a config from TOML text
    pub fn from_toml_str(text: &str) -> Result<Self, ReactiveError> {
        let config: Config =
            toml::from_str(text).map_err(|e| ReactiveError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config file
    pub fn load(path: &Path) -> Result<Self, ReactiveError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| ReactiveError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&text)
    }

    fn validate(&self) -> Result<(), ReactiveError> {
        if self.bus.wildcard.is_empty() {
            return Err(ReactiveError::Config("bus.wildcard must not be empty".into()));
        }
        if self.bus.error_event.is_empty() {
            return Err(ReactiveError::Config(
                "bus.error_event must not be empty".into(),
            ));
        }
        if self.scheduler.tick_limit == 0 {
            return Err(ReactiveError::Config(
                "scheduler.tick_limit must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
