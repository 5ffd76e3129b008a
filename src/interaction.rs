//! Force/jerk evaluation for one shell (§4.5).
//!
//! Each pair's contribution is weighted by `Lsum = L(inner) - L(outer)` so
//! that a given pair's full `1/d^3` force is partitioned exactly across the
//! shells it straddles (§8.5). Jerk terms are only accumulated when the
//! calling schedule carries a non-zero force-gradient coefficient.

use crate::body::BodySet;
use crate::dcrit::CriticalDistances;
use crate::math::{Scalar, Vector};
use crate::shell::ShellSet;
use crate::switching::SwitchingFunction;
use std::sync::atomic::{AtomicBool, Ordering};

/// Cooperative cancellation flag (§5): the driver sets this (e.g. from a
/// signal handler) and the evaluator polls it between active bodies,
/// returning early with a partial result rather than completing.
pub type InterruptFlag = std::sync::Arc<AtomicBool>;

/// Result of one shell's force evaluation.
#[derive(Debug, Clone)]
pub struct InteractionResult {
    /// `da/dt` per body, populated only for bodies in this shell and only
    /// when the caller requested jerk terms.
    pub jerk: Vec<Vector>,
    /// False if the cooperative interrupt flag was observed set partway
    /// through the evaluation.
    pub complete: bool,
}

/// Evaluate accelerations (and optionally jerks) for every body in
/// `shells.level(depth)`, writing accelerations directly into `bodies` and
/// returning the jerk buffer (empty unless `want_jerk`).
///
/// `wh_splitting` and the body occupying `shells.level(0).map[0]` together
/// resolve the open question in §9: the star-planet exemption at shell 1
/// is keyed to whichever body holds that position, not to a hardcoded
/// index, so it stays correct under body reordering.
pub fn evaluate(
    shells: &ShellSet,
    depth: usize,
    bodies: &mut BodySet,
    dcrit: &CriticalDistances,
    switching: &dyn SwitchingFunction,
    g: Scalar,
    wh_splitting: bool,
    symmetric_test_particles: bool,
    want_jerk: bool,
    interrupt: &InterruptFlag,
) -> InteractionResult {
    let level = shells.level(depth);
    let map = level.map.clone();
    let active_count = level.active_count;
    let total = map.len();

    for &i in &map {
        bodies.get_mut(i).acceleration = Vector::ZERO;
    }
    let mut jerk = vec![Vector::ZERO; bodies.len()];

    let innermost = depth + 1 >= shells.s_max();
    let star_body = shells.level(0).map.first().copied();

    let mut complete = true;
    for i_idx in 0..active_count {
        if interrupt.load(Ordering::Relaxed) {
            complete = false;
            break;
        }

        let i = map[i_idx];
        for j_idx in (i_idx + 1)..total {
            let j = map[j_idx];
            let pair_active = j_idx < active_count;

            let omit_outer_term = wh_splitting
                && depth == 1
                && star_body.is_some_and(|star| star == i || star == j);

            let (pos_i, pos_j, mass_i, mass_j) = {
                let bi = bodies.get(i);
                let bj = bodies.get(j);
                (bi.position, bj.position, bi.mass, bj.mass)
            };

            let dr = pos_j - pos_i;
            let d2 = dr.length_squared();
            let d = d2.sqrt();
            let d3 = d2 * d;

            let dc_curr = dcrit.sum(depth, i, j).unwrap_or(0.0);
            let dc_outer = if depth > 0 {
                dcrit.sum(depth - 1, i, j)
            } else {
                None
            };
            let dc_inner = if innermost { None } else { dcrit.sum(depth + 1, i, j) };

            let mut lsum = 0.0;
            let mut dlsum = 0.0;
            if depth > 0 && !omit_outer_term {
                if let Some(r_outer) = dc_outer {
                    lsum -= switching.l(d, dc_curr, r_outer);
                    dlsum -= switching.dl(d, dc_curr, r_outer);
                }
            }
            match dc_inner {
                Some(r_inner) => {
                    lsum += switching.l(d, r_inner, dc_curr);
                    dlsum += switching.dl(d, r_inner, dc_curr);
                }
                None => lsum += 1.0,
            }

            let prefactor = g * lsum / d3;
            let a_i_pair = dr * (prefactor * mass_j);
            let a_j_pair = dr * (-prefactor * mass_i);

            if pair_active || symmetric_test_particles {
                bodies.get_mut(i).acceleration += a_i_pair;
            }
            bodies.get_mut(j).acceleration += a_j_pair;

            if want_jerk {
                let delta_a = a_j_pair - a_i_pair;
                let alpha = delta_a.dot(dr);
                let bracket = alpha * (3.0 * lsum / d - dlsum * d) / (d3 * d);

                if pair_active || symmetric_test_particles {
                    let ji = delta_a * (2.0 * g * lsum * mass_j / d3) - dr * (2.0 * g * mass_j * bracket);
                    jerk[i] += ji;
                }

                let jj_unsigned =
                    delta_a * (2.0 * g * lsum * mass_i / d3) - dr * (2.0 * g * mass_i * bracket);
                jerk[j] -= jj_unsigned;
            }
        }
    }

    InteractionResult { jerk, complete }
}
