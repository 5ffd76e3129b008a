//! The outer driver (§4.8, §6): `part1`/`part2`/`synchronize`/`reset` over a
//! [`Simulation`] the caller owns, wired to the schedule, shell, interaction
//! and drift machinery.

use crate::body::BodySet;
use crate::config::{self, IntegratorConfig};
use crate::dcrit::CriticalDistances;
use crate::drift::{StepContext, apply_ops};
use crate::interaction::InterruptFlag;
use crate::math::Scalar;
use crate::shell::ShellSet;
use crate::switching::SwitchingFunction;
use std::rc::Rc;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use tracing::warn;

/// The body state and collaborator-contract flags the integrator consumes
/// (§6): an external driver owns this, not the integrator.
#[derive(Debug, Clone)]
pub struct Simulation {
    pub bodies: BodySet,
    pub g: Scalar,
    pub time: Scalar,
    pub dt: Scalar,
    pub dt_last_done: Scalar,
    pub sigint: InterruptFlag,

    /// Set by the driver if variational equations are in use; the
    /// integrator only warns (§7) and proceeds with its own settings.
    pub variational_equations_present: bool,
    /// Set by the driver if the collision mode isn't DIRECT.
    pub non_direct_collision_mode: bool,
    /// Set by the driver if an external gravity routine overrides this one.
    pub external_gravity_override_present: bool,
}

impl Simulation {
    pub fn new(bodies: BodySet, g: Scalar, dt: Scalar) -> Self {
        Self {
            bodies,
            g,
            time: 0.0,
            dt,
            dt_last_done: 0.0,
            sigint: Arc::new(AtomicBool::new(false)),
            variational_equations_present: false,
            non_direct_collision_mode: false,
            external_gravity_override_present: false,
        }
    }
}

/// Owns the shell/dcrit/switching-function state and drives one macro-step
/// at a time over a caller-owned [`Simulation`] (§6).
#[derive(Debug)]
pub struct Integrator {
    config: IntegratorConfig,
    shells: ShellSet,
    dcrit: CriticalDistances,
    switching: Option<Rc<dyn SwitchingFunction>>,
    allocated_body_count: usize,
    recalculate_dcrit_this_timestep: bool,
    preprocessor_pending: bool,
    synchronized: bool,
    max_depth_used: usize,
}

impl Integrator {
    pub fn new(config: IntegratorConfig) -> Self {
        let dcrit = CriticalDistances::compute(&[], 0.0, 1.0, config.dt_frac, config.s_max, config.n);
        let shells = ShellSet::new(config.s_max, 0);
        Self {
            config,
            shells,
            dcrit,
            switching: None,
            allocated_body_count: 0,
            recalculate_dcrit_this_timestep: true,
            preprocessor_pending: true,
            synchronized: true,
            max_depth_used: 0,
        }
    }

    pub fn config(&self) -> &IntegratorConfig {
        &self.config
    }

    pub fn max_depth_used(&self) -> usize {
        self.max_depth_used
    }

    pub fn set_switching_function(&mut self, switching: Rc<dyn SwitchingFunction>) {
        self.switching = Some(switching);
    }

    /// One-shot trigger: recompute dcrit the next time `part1` runs.
    pub fn request_dcrit_recalculation(&mut self) {
        self.recalculate_dcrit_this_timestep = true;
    }

    /// Pre-step bookkeeping (§6): collaborator-contract warnings,
    /// (re)allocation on body-count growth, dcrit recomputation, and
    /// installing the default switching function if none is set.
    pub fn part1(&mut self, sim: &mut Simulation) {
        if sim.variational_equations_present {
            warn!("variational equations are present but unsupported by this integrator");
        }
        if sim.non_direct_collision_mode {
            warn!("collision mode is not DIRECT; this integrator only supports direct search");
        }
        if sim.external_gravity_override_present {
            warn!("an external gravity routine overrides this integrator's own force evaluation");
        }

        if self.switching.is_none() {
            self.switching = Some(config::default_switching_function());
        }

        let body_count = sim.bodies.len();
        if self.shells.s_max() != self.config.s_max || self.allocated_body_count != body_count {
            self.shells.resize(self.config.s_max, body_count);
            self.allocated_body_count = body_count;
            self.recalculate_dcrit_this_timestep = true;
            self.preprocessor_pending = true;
        }

        if self.recalculate_dcrit_this_timestep {
            if !self.synchronized {
                warn!("recomputing dcrit while unsynchronized; forcing synchronization first");
                self.synchronize(sim);
            }
            let masses: Vec<Scalar> = sim.bodies.as_slice().iter().map(|b| b.mass).collect();
            self.dcrit = CriticalDistances::compute(
                &masses,
                sim.dt,
                sim.g,
                self.config.dt_frac,
                self.config.s_max,
                self.config.n,
            );
            self.recalculate_dcrit_this_timestep = false;
        }
    }

    /// One macro-step (§4.8).
    pub fn part2(&mut self, sim: &mut Simulation) -> bool {
        let outer = self.config.phi_outer.build();
        self.shells.reset_shell0(sim.bodies.len(), sim.bodies.active_count());

        let switching = self
            .switching
            .clone()
            .unwrap_or_else(config::default_switching_function);

        let mut complete = true;

        if self.preprocessor_pending {
            if !outer.preprocessor.is_empty() {
                let mut ctx = StepContext {
                    bodies: &mut sim.bodies,
                    shells: &mut self.shells,
                    dcrit: &self.dcrit,
                    switching: switching.as_ref(),
                    g: sim.g,
                    config: &self.config,
                    interrupt: &sim.sigint,
                    max_depth_used: &mut self.max_depth_used,
                };
                complete &= apply_ops(&mut ctx, &outer.preprocessor, 0, sim.dt);
            }
            self.preprocessor_pending = false;
            self.synchronized = false;
        }

        {
            let mut ctx = StepContext {
                bodies: &mut sim.bodies,
                shells: &mut self.shells,
                dcrit: &self.dcrit,
                switching: switching.as_ref(),
                g: sim.g,
                config: &self.config,
                interrupt: &sim.sigint,
                max_depth_used: &mut self.max_depth_used,
            };
            complete &= apply_ops(&mut ctx, &outer.step, 0, sim.dt);
        }

        sim.time += sim.dt;
        sim.dt_last_done = sim.dt;

        if self.config.safe_mode {
            self.synchronized = false;
            self.synchronize(sim);
        } else {
            self.synchronized = false;
        }

        complete
    }

    /// Idempotent: runs the outer postprocessor if the synchronized flag is
    /// clear, then sets it.
    pub fn synchronize(&mut self, sim: &mut Simulation) {
        if self.synchronized {
            return;
        }

        let outer = self.config.phi_outer.build();
        if !outer.postprocessor.is_empty() {
            let switching = self
                .switching
                .clone()
                .unwrap_or_else(config::default_switching_function);
            let mut ctx = StepContext {
                bodies: &mut sim.bodies,
                shells: &mut self.shells,
                dcrit: &self.dcrit,
                switching: switching.as_ref(),
                g: sim.g,
                config: &self.config,
                interrupt: &sim.sigint,
                max_depth_used: &mut self.max_depth_used,
            };
            apply_ops(&mut ctx, &outer.postprocessor, 0, sim.dt_last_done);
        }

        self.synchronized = true;
    }

    /// Frees owned buffers and restores the documented defaults (§6).
    pub fn reset(&mut self) {
        self.config = IntegratorConfig::default();
        self.shells = ShellSet::new(self.config.s_max, 0);
        self.dcrit = CriticalDistances::compute(&[], 0.0, 1.0, self.config.dt_frac, self.config.s_max, self.config.n);
        self.switching = None;
        self.allocated_body_count = 0;
        self.recalculate_dcrit_this_timestep = true;
        self.preprocessor_pending = true;
        self.synchronized = true;
        self.max_depth_used = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::Body;
    use crate::math::Vector;
    use crate::schedule::ScheduleName;
    use std::f64::consts::TAU;

    fn circular_kepler(star_mass: Scalar, planet_mass: Scalar, radius: Scalar, g: Scalar) -> BodySet {
        let speed = libm::sqrt(g * (star_mass + planet_mass) / radius);
        BodySet::new(
            vec![
                Body::new(star_mass, Vector::ZERO, Vector::ZERO),
                Body::new(planet_mass, Vector::new(radius, 0.0, 0.0), Vector::new(0.0, speed, 0.0)),
            ],
            2,
        )
    }

    #[test]
    fn part2_advances_time_by_dt() {
        let bodies = circular_kepler(1.0, 1e-3, 1.0, 1.0);
        let dt = TAU / 100.0;
        let mut sim = Simulation::new(bodies, 1.0, dt);

        let mut config = IntegratorConfig::default();
        config.whsplitting = false;
        let mut integrator = Integrator::new(config);

        integrator.part1(&mut sim);
        assert!(integrator.part2(&mut sim));
        assert!((sim.time - dt).abs() < 1e-15);
        assert_eq!(sim.dt_last_done, dt);
    }

    #[test]
    fn synchronize_is_idempotent() {
        let bodies = circular_kepler(1.0, 1e-3, 1.0, 1.0);
        let mut sim = Simulation::new(bodies, 1.0, TAU / 100.0);
        let mut integrator = Integrator::new(IntegratorConfig {
            phi_outer: ScheduleName::PLF7_6_4,
            whsplitting: false,
            safe_mode: false,
            ..IntegratorConfig::default()
        });

        integrator.part1(&mut sim);
        integrator.part2(&mut sim);
        integrator.synchronize(&mut sim);
        let once = sim.bodies.as_slice().to_vec();
        integrator.synchronize(&mut sim);
        let twice = sim.bodies.as_slice().to_vec();
        assert_eq!(once, twice);
    }

    #[test]
    fn reset_restores_documented_defaults() {
        let mut integrator = Integrator::new(IntegratorConfig {
            n: 99,
            s_max: 2,
            ..IntegratorConfig::default()
        });
        integrator.reset();
        assert_eq!(*integrator.config(), IntegratorConfig::default());
    }

    #[test]
    fn kepler_two_body_preserves_semimajor_axis() {
        let g = 1.0;
        let star_mass = 1.0;
        let planet_mass = 1e-3;
        let radius = 1.0;
        let bodies = circular_kepler(star_mass, planet_mass, radius, g);
        let dt = TAU / 100.0;
        let mut sim = Simulation::new(bodies, g, dt);
        let mut integrator = Integrator::new(IntegratorConfig {
            whsplitting: false,
            ..IntegratorConfig::default()
        });

        integrator.part1(&mut sim);
        for _ in 0..1000 {
            integrator.part2(&mut sim);
        }
        integrator.synchronize(&mut sim);

        let planet = sim.bodies.get(1);
        let r = planet.position.length();
        assert!((r - radius).abs() / radius < 1e-3);
    }
}
