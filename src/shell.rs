//! Shell state (§3) and the shell membership resolver (§4.4).
//!
//! `map[s]` lists the bodies assigned to depth `s`, active bodies first;
//! `inshell[i]` records, for the drift currently executing at some depth,
//! whether body `i` should be advanced at that layer or has been promoted
//! to the next one in. Both are owned by the integrator and sized to the
//! current body count / `S_max`, exactly as §5 describes.

use crate::body::BodySet;
use crate::dcrit::CriticalDistances;
use crate::math::Scalar;
use crate::predictor::predicted_min_distance_squared;
use tracing::debug;

/// The bodies assigned to one shell depth, active ones first.
#[derive(Debug, Clone, Default)]
pub struct ShellLevel {
    pub map: Vec<usize>,
    pub active_count: usize,
}

impl ShellLevel {
    #[inline]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    #[inline]
    pub fn active(&self) -> &[usize] {
        &self.map[..self.active_count]
    }

    #[inline]
    pub fn passive(&self) -> &[usize] {
        &self.map[self.active_count..]
    }
}

/// All shell levels plus the per-body `inshell` scratch, sized to
/// `max(current N, current S_max)` per the resource model.
#[derive(Debug, Clone)]
pub struct ShellSet {
    levels: Vec<ShellLevel>,
    inshell: Vec<bool>,
}

impl ShellSet {
    pub fn new(s_max: usize, body_count: usize) -> Self {
        Self {
            levels: vec![ShellLevel::default(); s_max],
            inshell: vec![false; body_count],
        }
    }

    pub fn s_max(&self) -> usize {
        self.levels.len()
    }

    pub fn resize(&mut self, s_max: usize, body_count: usize) {
        self.levels.resize(s_max, ShellLevel::default());
        self.inshell.resize(body_count, false);
    }

    /// Reset shell 0 to the identity permutation over all bodies, active
    /// ones first — "map[0] is the identity permutation at the start of
    /// every macro-step" (§3).
    pub fn reset_shell0(&mut self, body_count: usize, active_count: usize) {
        self.levels[0] = ShellLevel {
            map: (0..body_count).collect(),
            active_count,
        };
    }

    #[inline]
    pub fn level(&self, depth: usize) -> &ShellLevel {
        &self.levels[depth]
    }

    #[inline]
    pub fn inshell(&self, body: usize) -> bool {
        self.inshell[body]
    }
}

/// Rebuild `map[depth+1]` from `map[depth]` for the drift about to run over
/// signed interval `dt` (§4.4). Bodies found to be in mutual encounter are
/// promoted into the next shell and cleared from `inshell`; everyone else
/// in `map[depth]` is marked `inshell = true` for this drift.
///
/// `wh_splitting` short-circuits the whole procedure at depth 0: every body
/// is copied unconditionally into shell 1 so the dominant central-body
/// Keplerian drift is handled entirely by the inner schedule.
pub fn resolve_shell(
    shells: &mut ShellSet,
    depth: usize,
    dt: Scalar,
    bodies: &BodySet,
    dcrit: &CriticalDistances,
    wh_splitting: bool,
) {
    let current = shells.levels[depth].map.clone();
    for &i in &current {
        shells.inshell[i] = true;
    }

    if depth + 1 >= shells.levels.len() {
        debug!(depth, "reached S_max, no further shell subdivision");
        return;
    }

    if depth == 0 && wh_splitting {
        for &i in &current {
            shells.inshell[i] = false;
        }
        shells.levels[1] = ShellLevel {
            map: current,
            active_count: shells.levels[0].active_count,
        };
        return;
    }

    let active_count = shells.levels[depth].active_count;
    let total = current.len();

    let mut next_map = Vec::new();
    let mut next_active = 0usize;

    // First pass: active x all.
    for i_idx in 0..active_count {
        let i = current[i_idx];
        for j_idx in 0..total {
            if j_idx == i_idx {
                continue;
            }
            let j = current[j_idx];
            if in_encounter(bodies, dcrit, depth + 1, i, j, dt) {
                next_map.push(i);
                shells.inshell[i] = false;
                next_active += 1;
                break;
            }
        }
    }

    // Second pass: passive x active.
    for i_idx in active_count..total {
        let i = current[i_idx];
        for j_idx in 0..active_count {
            let j = current[j_idx];
            if in_encounter(bodies, dcrit, depth + 1, i, j, dt) {
                next_map.push(i);
                shells.inshell[i] = false;
                break;
            }
        }
    }

    shells.levels[depth + 1] = ShellLevel {
        map: next_map,
        active_count: next_active,
    };
}

#[inline]
fn in_encounter(
    bodies: &BodySet,
    dcrit: &CriticalDistances,
    inner_depth: usize,
    i: usize,
    j: usize,
    dt: Scalar,
) -> bool {
    let Some(dc) = dcrit.sum(inner_depth, i, j) else {
        return false;
    };
    let rmin_sq = predicted_min_distance_squared(bodies.get(i), bodies.get(j), dt);
    rmin_sq < dc * dc
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::Body;
    use crate::math::Vector;

    fn two_body_set(separation: Scalar, mass: Scalar) -> BodySet {
        BodySet::new(
            vec![
                Body::new(mass, Vector::new(0.0, 0.0, 0.0), Vector::ZERO),
                Body::new(mass, Vector::new(separation, 0.0, 0.0), Vector::ZERO),
            ],
            2,
        )
    }

    #[test]
    fn shell_nesting_active_precedes_passive() {
        let bodies = BodySet::new(
            vec![
                Body::new(1.0, Vector::ZERO, Vector::ZERO),
                Body::new(1e-9, Vector::new(1e-9, 0.0, 0.0), Vector::ZERO),
                Body::test_particle(Vector::new(5.0, 0.0, 0.0), Vector::ZERO),
            ],
            2,
        );
        let dcrit = CriticalDistances::compute(&[1.0, 1e-9, 0.0], 1.0, 1.0, 0.1, 3, 10);

        let mut shells = ShellSet::new(3, bodies.len());
        shells.reset_shell0(bodies.len(), bodies.active_count());
        resolve_shell(&mut shells, 0, 1.0, &bodies, &dcrit, false);

        let level = shells.level(1);
        assert!(
            level.map[..level.active_count]
                .iter()
                .all(|&i| bodies.is_active(i))
        );
        assert!(
            level.map[level.active_count..]
                .iter()
                .all(|&i| !bodies.is_active(i))
        );
    }

    #[test]
    fn close_pair_is_promoted() {
        let bodies = two_body_set(1e-6, 1.0);
        let dcrit = CriticalDistances::compute(&[1.0, 1.0], 1.0, 1.0, 0.1, 2, 10);

        let mut shells = ShellSet::new(2, bodies.len());
        shells.reset_shell0(bodies.len(), bodies.active_count());
        resolve_shell(&mut shells, 0, 1.0, &bodies, &dcrit, false);

        assert_eq!(shells.level(1).len(), 2);
        assert!(!shells.inshell(0));
        assert!(!shells.inshell(1));
    }

    #[test]
    fn distant_pair_stays_in_outer_shell() {
        let bodies = two_body_set(1e6, 1.0);
        let dcrit = CriticalDistances::compute(&[1.0, 1.0], 1.0, 1.0, 0.1, 2, 10);

        let mut shells = ShellSet::new(2, bodies.len());
        shells.reset_shell0(bodies.len(), bodies.active_count());
        resolve_shell(&mut shells, 0, 1.0, &bodies, &dcrit, false);

        assert!(shells.level(1).is_empty());
        assert!(shells.inshell(0));
        assert!(shells.inshell(1));
    }

    #[test]
    fn wh_splitting_copies_everything_unconditionally() {
        let bodies = two_body_set(1e6, 1.0);
        let dcrit = CriticalDistances::compute(&[1.0, 1.0], 1.0, 1.0, 0.1, 2, 10);

        let mut shells = ShellSet::new(2, bodies.len());
        shells.reset_shell0(bodies.len(), bodies.active_count());
        resolve_shell(&mut shells, 0, 1.0, &bodies, &dcrit, true);

        assert_eq!(shells.level(1).len(), 2);
        assert!(!shells.inshell(0));
        assert!(!shells.inshell(1));
    }

    #[test]
    fn depth_at_s_max_does_not_subdivide() {
        let bodies = two_body_set(1e-9, 1.0);
        let dcrit = CriticalDistances::compute(&[1.0, 1.0], 1.0, 1.0, 0.1, 1, 10);

        let mut shells = ShellSet::new(1, bodies.len());
        shells.reset_shell0(bodies.len(), bodies.active_count());
        resolve_shell(&mut shells, 0, 1.0, &bodies, &dcrit, false);

        assert!(shells.inshell(0));
        assert!(shells.inshell(1));
    }
}
