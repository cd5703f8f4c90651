//! # Engine Configuration
//!
//! Loaded once at startup from TOML. Every field has a default, so an empty
//! file is a valid configuration.
//!
//! ```toml
//! ticks_per_second = 60
//! max_entities = 100000
//! prune_messages = true
//! external_subsystems = ["audio", "render"]
//! ```

use crate::commands::COMMAND_SUBSYSTEM;
use crate::error::{ConfigError, ConfigResult};
use crate::router::ROUTER_SUBSYSTEM;
use crate::spawner::SPAWNER_SUBSYSTEM;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Engine settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Simulation rate used by [`TickLoop`](crate::TickLoop).
    pub ticks_per_second: u32,
    /// Exclusive upper bound on entity ids.
    pub max_entities: u64,
    /// Discard stale timed messages at the end of every tick.
    pub prune_messages: bool,
    /// Subsystems drained into outboxes each tick.
    pub external_subsystems: Vec<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            ticks_per_second: crate::DEFAULT_TICK_RATE,
            max_entities: u64::from(u32::MAX),
            prune_messages: true,
            external_subsystems: vec!["audio".to_owned(), "render".to_owned()],
        }
    }
}

impl EngineConfig {
    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// Fails on malformed TOML or out-of-range values.
    pub fn from_toml_str(source: &str) -> ConfigResult<Self> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be read, or as [`from_toml_str`](Self::from_toml_str).
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&source)?;
        tracing::info!(path = %path.display(), "engine config loaded");
        Ok(config)
    }

    /// Serializes the configuration as TOML.
    ///
    /// # Errors
    ///
    /// Fails only if serialization fails.
    pub fn to_toml_string(&self) -> ConfigResult<String> {
        toml::to_string(self).map_err(|e| ConfigError::Invalid(e.to_string()))
    }

    /// Checks value ranges.
    ///
    /// # Errors
    ///
    /// Rejects a zero tick rate, a zero entity limit, and external subsystem
    /// names that are empty, duplicated, or owned by the engine.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.ticks_per_second == 0 {
            return Err(ConfigError::Invalid("ticks_per_second must be positive".into()));
        }
        if self.max_entities == 0 {
            return Err(ConfigError::Invalid("max_entities must be positive".into()));
        }

        let reserved = [ROUTER_SUBSYSTEM, SPAWNER_SUBSYSTEM, COMMAND_SUBSYSTEM];
        let mut seen = HashSet::new();
        for name in &self.external_subsystems {
            if name.is_empty() {
                return Err(ConfigError::Invalid("empty external subsystem name".into()));
            }
            if reserved.contains(&name.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "external subsystem '{name}' is reserved"
                )));
            }
            if !seen.insert(name.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "external subsystem '{name}' listed twice"
                )));
            }
        }
        Ok(())
    }
}
