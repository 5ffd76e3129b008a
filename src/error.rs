//! Typed error surface (§10.3). Only two things in this crate fail in a way
//! that deserves a `Result` rather than a logged warning and a graceful
//! fallback: resolving a schedule by name, and loading a persisted
//! configuration file that is malformed. Everything else described in the
//! error handling design (§7) is non-fatal and flows through the logger.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("unknown integrator schedule: {name:?}")]
    UnknownSchedule { name: String },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load integrator configuration from {path:?}: {source}")]
    Load {
        path: String,
        #[source]
        source: config::ConfigError,
    },

    #[error("failed to parse integrator configuration: {0}")]
    Deserialize(#[source] config::ConfigError),

    #[error("unknown schedule name in configuration")]
    Schedule(#[from] ScheduleError),

    #[error("failed to serialize integrator configuration: {0}")]
    Serialize(#[source] toml::ser::Error),

    #[error("failed to write integrator configuration to {path:?}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
