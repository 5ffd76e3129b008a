//! Driver-facing configuration (§6, §10.2): a versioned, serializable
//! settings record, loaded/saved the same way the teacher application loads
//! its own simulation configuration — defaults as a base source, an
//! optional file layered on top, an outdated version falling back to
//! defaults with a logged warning rather than failing.
//!
//! This is a *settings* object only. It never carries body state, and
//! loading or saving it never implicitly synchronizes a live integrator.

use crate::error::ConfigError;
use crate::math::Scalar;
use crate::schedule::ScheduleName;
use crate::switching::{SmoothStep, SwitchingFunction};
use config::{Config, File};
use serde::{Deserialize, Serialize};
use std::rc::Rc;
use tracing::{info, warn};

/// Current configuration schema version. Bumping this invalidates
/// configuration files saved by older builds (they fall back to defaults
/// with a logged warning rather than being partially applied).
pub const CURRENT_VERSION: u32 = 1;

/// Recognized options from §6, plus the schema version.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct IntegratorConfig {
    pub version: u32,

    /// Schedule used at shell 0.
    pub phi_outer: ScheduleName,

    /// Schedule used at shells >= 1.
    pub phi_inner: ScheduleName,

    /// Inner subdivision per outer drift sub-step (> 0, typically 10).
    pub n: usize,

    /// If set, shell 0 acts only as a router that copies all bodies into
    /// shell 1, letting the inner schedule handle the dominant Kepler drift.
    pub whsplitting: bool,

    /// Synchronize after every macro-step.
    pub safe_mode: bool,

    /// Ratio of the macro-step to the local dynamical time at the dcrit
    /// boundary; smaller means tighter shells.
    pub dt_frac: Scalar,

    /// Hard upper bound on recursion depth.
    pub s_max: usize,

    /// If set, passive (test-particle) bodies exert as well as feel forces
    /// in pairwise interactions and jerk back-reactions.
    pub symmetric_test_particles: bool,
}

impl Default for IntegratorConfig {
    fn default() -> Self {
        Self {
            version: CURRENT_VERSION,
            phi_outer: ScheduleName::LF,
            phi_inner: ScheduleName::LF,
            n: 10,
            whsplitting: true,
            safe_mode: true,
            dt_frac: 0.1,
            s_max: 10,
            symmetric_test_particles: false,
        }
    }
}

impl IntegratorConfig {
    fn load_config_with_source(
        source: File<config::FileSourceFile, config::FileFormat>,
    ) -> Result<Self, ConfigError> {
        let built = Config::builder()
            .add_source(config::File::from_str(
                &toml::to_string(&Self::default()).map_err(ConfigError::Serialize)?,
                config::FileFormat::Toml,
            ))
            .add_source(source)
            .build()
            .map_err(ConfigError::Deserialize)?;

        let loaded: Self = built.try_deserialize().map_err(ConfigError::Deserialize)?;

        if loaded.version < Self::default().version {
            warn!(
                found = loaded.version,
                current = Self::default().version,
                "integrator configuration version is outdated, using defaults"
            );
            Ok(Self::default())
        } else {
            info!("integrator configuration loaded successfully");
            Ok(loaded)
        }
    }

    /// Load from `path`, falling back to defaults (with a logged warning)
    /// if the file is absent. A malformed-but-present file is a hard error
    /// (§10.3) rather than a silent fallback.
    pub fn load_or_default(path: &str) -> Result<Self, ConfigError> {
        if !std::path::Path::new(path).exists() {
            warn!(path, "integrator configuration file not found, using defaults");
            return Ok(Self::default());
        }

        Self::load_config_with_source(File::with_name(path).required(false)).map_err(|source| {
            ConfigError::Load {
                path: path.to_string(),
                source: match source {
                    ConfigError::Deserialize(e) => e,
                    other => return other,
                },
            }
        })
    }

    pub fn save(&self, path: &str) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self).map_err(ConfigError::Serialize)?;
        std::fs::write(path, content).map_err(|source| ConfigError::Write {
            path: path.to_string(),
            source,
        })
    }
}

/// The process-wide default switching function, installed by `part1` when
/// the caller hasn't supplied one (§4.1, §9). Kept as a `LazyLock` rather
/// than the reference derivation's global pointer; ownership still flows
/// through [`IntegratorConfig::switching_function`] or the integrator's own
/// field, never through a static the integrator mutates.
thread_local! {
    static DEFAULT_SWITCHING_FUNCTION: Rc<dyn SwitchingFunction> = Rc::new(SmoothStep);
}

pub fn default_switching_function() -> Rc<dyn SwitchingFunction> {
    DEFAULT_SWITCHING_FUNCTION.with(Rc::clone)
}
