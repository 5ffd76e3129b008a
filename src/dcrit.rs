//! Per-body, per-shell critical distance.

use crate::math::{Scalar, sqrt3};
use std::f64::consts::TAU;

/// The longest-drift-substep coefficient used to size `dcrit` at every depth.
///
/// The reference derivation carries a commented-out override that would make
/// this depend on schedule order at depth 0; this port takes the strict
/// reading and keeps it fixed at one half everywhere (see DESIGN.md).
pub const LONGEST_DRIFT_COEFFICIENT: Scalar = 0.5;

/// Critical-distance table: `dcrit[s][i]` is the critical radius of body `i`
/// at shell depth `s`. Sized `[s_max][body_count]`.
#[derive(Debug, Clone)]
pub struct CriticalDistances {
    table: Vec<Vec<Scalar>>,
}

impl CriticalDistances {
    /// Recompute the full table for the given outer `dt`, masses, gravitational
    /// constant and shell parameters.
    ///
    /// `dt_s` starts at the outer (user) step and shrinks geometrically by
    /// `LONGEST_DRIFT_COEFFICIENT / n` per depth, matching the drift
    /// sub-stepping the schedules actually perform.
    pub fn compute(
        masses: &[Scalar],
        outer_dt: Scalar,
        g: Scalar,
        dt_frac: Scalar,
        s_max: usize,
        n: usize,
    ) -> Self {
        let mut table = Vec::with_capacity(s_max);
        let mut dt_s = outer_dt.abs();

        for _ in 0..s_max {
            let t = dt_s / (dt_frac * TAU);
            let row = masses
                .iter()
                .map(|&m| sqrt3(t * t * g * m))
                .collect::<Vec<_>>();
            table.push(row);
            dt_s = dt_s * LONGEST_DRIFT_COEFFICIENT / n as Scalar;
        }

        Self { table }
    }

    #[inline]
    pub fn shell_count(&self) -> usize {
        self.table.len()
    }

    /// `dcrit[s][i]`, or `None` if `s` is out of range.
    #[inline]
    pub fn get(&self, shell: usize, body: usize) -> Option<Scalar> {
        self.table.get(shell).map(|row| row[body])
    }

    /// Sum of `dcrit[s][i] + dcrit[s][j]`, or `None` if `s` is out of range
    /// (the caller treats that as "this pair has no inner/outer boundary
    /// here", per the interaction evaluator's rules).
    #[inline]
    pub fn sum(&self, shell: usize, i: usize, j: usize) -> Option<Scalar> {
        self.table
            .get(shell)
            .map(|row| row[i] + row[j])
    }

    pub fn resize_bodies(&mut self, masses: &[Scalar], outer_dt: Scalar, g: Scalar, dt_frac: Scalar, n: usize) {
        let s_max = self.table.len();
        *self = Self::compute(masses, outer_dt, g, dt_frac, s_max, n);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dcrit_is_non_increasing_with_depth() {
        let masses = [1.0, 1e-3];
        let table = CriticalDistances::compute(&masses, TAU / 100.0, 1.0, 0.1, 5, 10);
        for body in 0..masses.len() {
            let mut previous = Scalar::MAX;
            for shell in 0..table.shell_count() {
                let value = table.get(shell, body).unwrap();
                assert!(
                    value <= previous + 1e-15,
                    "dcrit grew at shell {shell} for body {body}: {value} > {previous}"
                );
                previous = value;
            }
        }
    }

    #[test]
    fn zero_mass_body_has_zero_dcrit() {
        let masses = [1.0, 0.0];
        let table = CriticalDistances::compute(&masses, TAU / 100.0, 1.0, 0.1, 3, 10);
        assert_eq!(table.get(0, 1).unwrap(), 0.0);
    }

    #[test]
    fn out_of_range_shell_is_none() {
        let masses = [1.0];
        let table = CriticalDistances::compute(&masses, 1.0, 1.0, 0.1, 2, 10);
        assert!(table.get(2, 0).is_none());
        assert!(table.sum(2, 0, 0).is_none());
    }
}
