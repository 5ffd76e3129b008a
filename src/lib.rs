//! `shellstep`: a hierarchical multi-shell symplectic N-body integrator.
//!
//! The crate advances a set of gravitationally interacting bodies across one
//! macroscopic time step, recursively subdividing into finer, nested shells
//! around any pair of bodies whose predicted closest approach would
//! otherwise lose accuracy at the outer step. The gravitational interaction
//! between a pair is handed off smoothly between shells by a differentiable
//! switching function, preserving the symplectic/time-symmetric structure of
//! the underlying operator-splitting schemes.
//!
//! [`integrator::Integrator`] is the entry point: build an
//! [`integrator::Simulation`] from a [`body::BodySet`], then drive it with
//! `part1`/`part2`/`synchronize` exactly as described in the component
//! design's outer driver.

pub mod body;
pub mod config;
pub mod dcrit;
pub mod drift;
pub mod error;
pub mod integrator;
pub mod interaction;
pub mod math;
pub mod predictor;
pub mod schedule;
pub mod shell;
pub mod switching;

pub use body::{Body, BodySet};
pub use config::IntegratorConfig;
pub use error::{ConfigError, ScheduleError};
pub use integrator::{Integrator, Simulation};
pub use schedule::ScheduleName;
