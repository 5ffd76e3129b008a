//! Drift and kick sub-steps, and the recursion that makes the integrator
//! multi-rate (§4.6). Kicks apply to every body the current shell owns and
//! never recurse; drifts advance only the bodies that haven't been
//! promoted to a finer shell, and invoke the inner schedule on whichever
//! bodies have been.

use crate::body::BodySet;
use crate::config::IntegratorConfig;
use crate::dcrit::CriticalDistances;
use crate::interaction::{self, InterruptFlag};
use crate::math::Scalar;
use crate::schedule::StepOp;
use crate::shell::{ShellSet, resolve_shell};
use crate::switching::SwitchingFunction;

/// Everything a drift/kick sub-step needs, threaded through the recursion
/// by mutable reference rather than bundled into the integrator itself, so
/// the recursive calls don't have to fight the borrow checker over `self`.
pub struct StepContext<'a> {
    pub bodies: &'a mut BodySet,
    pub shells: &'a mut ShellSet,
    pub dcrit: &'a CriticalDistances,
    pub switching: &'a dyn SwitchingFunction,
    pub g: Scalar,
    pub config: &'a IntegratorConfig,
    pub interrupt: &'a InterruptFlag,
    pub max_depth_used: &'a mut usize,
}

/// Apply a schedule's sub-step sequence at `depth` over interval `dt`.
/// Returns `false` as soon as a kick's interaction evaluation is reported
/// incomplete (cooperative cancellation), leaving the remaining ops unrun.
pub fn apply_ops(ctx: &mut StepContext, ops: &[StepOp], depth: usize, dt: Scalar) -> bool {
    for op in ops {
        let completed = match *op {
            StepOp::Drift(c) => drift_step(ctx, depth, c * dt),
            StepOp::Kick { y, v } => kick_step(ctx, depth, y * dt, v * dt * dt * dt),
        };
        if !completed {
            return false;
        }
    }
    true
}

/// Advance in-shell bodies by `dt_local * velocity`, then recurse into the
/// inner schedule for whichever bodies the resolver promotes (§4.6).
fn drift_step(ctx: &mut StepContext, depth: usize, dt_local: Scalar) -> bool {
    resolve_shell(
        ctx.shells,
        depth,
        dt_local,
        ctx.bodies,
        ctx.dcrit,
        ctx.config.whsplitting,
    );

    let map = ctx.shells.level(depth).map.clone();
    for &i in &map {
        if ctx.shells.inshell(i) {
            let velocity = ctx.bodies.get(i).velocity;
            ctx.bodies.get_mut(i).position += velocity * dt_local;
        }
    }

    let s_max = ctx.shells.s_max();
    if depth + 1 >= s_max {
        return true;
    }

    if ctx.shells.level(depth + 1).is_empty() {
        return true;
    }

    *ctx.max_depth_used = (*ctx.max_depth_used).max(depth + 1);

    let inner = ctx.config.phi_inner.build();
    let n = ctx.config.n.max(1);
    let sub_dt = dt_local / n as Scalar;

    if !inner.preprocessor.is_empty() && !apply_ops(ctx, &inner.preprocessor, depth + 1, dt_local) {
        return false;
    }

    for _ in 0..n {
        if !apply_ops(ctx, &inner.step, depth + 1, sub_dt) {
            return false;
        }
    }

    if !inner.postprocessor.is_empty() && !apply_ops(ctx, &inner.postprocessor, depth + 1, dt_local) {
        return false;
    }

    true
}

/// Evaluate the shell's interactions and update every body's velocity by
/// `y_dt * a + v_dt3 * j`. Kicks never recurse: they act on the whole of
/// `map[depth]`, promoted bodies included, since Lsum weighting is what
/// keeps each shell's contribution to its own band of distances.
fn kick_step(ctx: &mut StepContext, depth: usize, y_dt: Scalar, v_dt3: Scalar) -> bool {
    let want_jerk = v_dt3 != 0.0;

    let result = interaction::evaluate(
        ctx.shells,
        depth,
        ctx.bodies,
        ctx.dcrit,
        ctx.switching,
        ctx.g,
        ctx.config.whsplitting,
        ctx.config.symmetric_test_particles,
        want_jerk,
        ctx.interrupt,
    );

    let map = ctx.shells.level(depth).map.clone();
    for &i in &map {
        let acceleration = ctx.bodies.get(i).acceleration;
        let body = ctx.bodies.get_mut(i);
        body.velocity += acceleration * y_dt;
        if want_jerk {
            body.velocity += result.jerk[i] * v_dt3;
        }
    }

    result.complete
}
