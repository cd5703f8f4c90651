//! # Runtime Error Types
//!
//! Configuration mistakes are errors. Lookup misses at runtime are not:
//! they return `None`, `false` or a zero count and are logged.

use thiserror::Error;
use tickwork_core::MessageFileError;

/// Errors from registering systems with the [`Scheduler`](crate::Scheduler).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchedulerError {
    /// The registry was finalized when the session started.
    #[error("cannot add system '{name}': scheduler is finalized")]
    Finalized {
        /// The rejected system.
        name: String,
    },

    /// A system with this name is already registered.
    #[error("system '{name}' is already registered")]
    DuplicateName {
        /// The duplicated name.
        name: String,
    },

    /// The name is used by the dispatch router.
    #[error("system name '{name}' is reserved")]
    ReservedName {
        /// The reserved name.
        name: String,
    },
}

/// Errors from the spawner and command registries.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// A handler with this key is already registered.
    #[error("{kind} '{name}' is already registered")]
    Duplicate {
        /// Which registry rejected it.
        kind: &'static str,
        /// The duplicated key.
        name: String,
    },
}

/// Errors from loading an engine configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    /// The config file is not valid TOML for [`EngineConfig`](crate::EngineConfig).
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value is out of range.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Errors from driving an [`Engine`](crate::Engine) session.
#[derive(Error, Debug)]
pub enum EngineError {
    /// System registration failed.
    #[error(transparent)]
    Scheduler(#[from] SchedulerError),

    /// Spawner or command registration failed.
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// The configuration was rejected.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A message file could not be loaded or saved.
    #[error(transparent)]
    MessageFile(#[from] MessageFileError),

    /// A session needs at least one system.
    #[error("no systems registered")]
    NoSystems,

    /// `start_session` was called while a session is running.
    #[error("a session is already running")]
    SessionActive,
}

/// Result type for scheduler registration.
pub type SchedulerResult<T> = Result<T, SchedulerError>;

/// Result type for spawner and command registration.
pub type RegistryResult<T> = Result<T, RegistryError>;

/// Result type for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;
