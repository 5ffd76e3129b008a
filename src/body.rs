//! The body array the integrator advances.

use crate::math::{Scalar, Vector};

/// A single gravitating (or massless test) body.
///
/// Mass, position and velocity are the state the driver owns; acceleration
/// is scratch space the interaction evaluator refreshes every sub-step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Body {
    pub mass: Scalar,
    pub position: Vector,
    pub velocity: Vector,
    pub acceleration: Vector,
}

impl Body {
    pub fn new(mass: Scalar, position: Vector, velocity: Vector) -> Self {
        Self {
            mass,
            position,
            velocity,
            acceleration: Vector::ZERO,
        }
    }

    /// A massless test particle: feels forces but does not (by default) exert them.
    pub fn test_particle(position: Vector, velocity: Vector) -> Self {
        Self::new(0.0, position, velocity)
    }

    #[inline]
    pub fn is_massless(&self) -> bool {
        self.mass == 0.0
    }
}

/// The body array plus the active/passive partition described in the data model:
/// indices `[0, active_count)` feel and exert forces, indices
/// `[active_count, bodies.len())` feel forces but (unless `symmetric_test_particles`
/// is requested at the call site) do not exert them.
#[derive(Debug, Clone)]
pub struct BodySet {
    bodies: Vec<Body>,
    active_count: usize,
}

impl BodySet {
    /// Build a body set. `active_count` must not exceed `bodies.len()`; bodies
    /// at index `>= active_count` are treated as passive test particles regardless
    /// of their mass field (the convention described in the data model is that
    /// test particles also carry `mass == 0`, but only the index partition is
    /// load-bearing for the integrator).
    pub fn new(bodies: Vec<Body>, active_count: usize) -> Self {
        assert!(
            active_count <= bodies.len(),
            "active_count {active_count} exceeds body count {}",
            bodies.len()
        );
        Self {
            bodies,
            active_count,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    #[inline]
    pub fn active_count(&self) -> usize {
        self.active_count
    }

    #[inline]
    pub fn passive_count(&self) -> usize {
        self.bodies.len() - self.active_count
    }

    #[inline]
    pub fn is_active(&self, index: usize) -> bool {
        index < self.active_count
    }

    #[inline]
    pub fn as_slice(&self) -> &[Body] {
        &self.bodies
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [Body] {
        &mut self.bodies
    }

    #[inline]
    pub fn get(&self, index: usize) -> &Body {
        &self.bodies[index]
    }

    #[inline]
    pub fn get_mut(&mut self, index: usize) -> &mut Body {
        &mut self.bodies[index]
    }

    /// Grow or shrink the set to a new body list. Callers are responsible
    /// for re-synchronizing before doing this (see `Integrator::reset`/`part1`).
    pub fn set_bodies(&mut self, bodies: Vec<Body>, active_count: usize) {
        assert!(active_count <= bodies.len());
        self.bodies = bodies;
        self.active_count = active_count;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn active_passive_partition() {
        let set = BodySet::new(
            vec![
                Body::new(1.0, Vector::ZERO, Vector::ZERO),
                Body::new(1.0, Vector::ZERO, Vector::ZERO),
                Body::test_particle(Vector::ZERO, Vector::ZERO),
            ],
            2,
        );
        assert_eq!(set.active_count(), 2);
        assert_eq!(set.passive_count(), 1);
        assert!(set.is_active(0));
        assert!(set.is_active(1));
        assert!(!set.is_active(2));
    }

    #[test]
    #[should_panic]
    fn active_count_cannot_exceed_body_count() {
        BodySet::new(vec![Body::new(1.0, Vector::ZERO, Vector::ZERO)], 2);
    }
}
