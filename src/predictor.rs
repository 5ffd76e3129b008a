//! Pairwise closest-approach prediction under straight-line motion.

use crate::body::Body;
use crate::math::Scalar;

/// Predicted squared minimum separation of two bodies over a signed drift
/// interval `dt`, assuming both move in straight lines at their current
/// velocities for the duration of the interval.
///
/// `dt` may be negative (post-processors run sub-steps in reverse); the sign
/// is folded into the relative velocity so the prediction stays correct.
pub fn predicted_min_distance_squared(p1: &Body, p2: &Body, dt: Scalar) -> Scalar {
    let sign = if dt < 0.0 { -1.0 } else { 1.0 };
    let dr = p1.position - p2.position;
    let dv = sign * (p1.velocity - p2.velocity);
    let abs_dt = dt.abs();

    let r1_sq = dr.length_squared();
    let r2_sq = (dr + abs_dt * dv).length_squared();
    let rmin_ab_sq = r1_sq.min(r2_sq);

    let dv_sq = dv.length_squared();
    if dv_sq == 0.0 {
        return rmin_ab_sq;
    }

    let t_star = dr.dot(dv) / dv_sq;
    let fraction = t_star / abs_dt;

    if (0.0..=1.0).contains(&fraction) {
        let r3_sq = (dr + t_star * dv).length_squared();
        rmin_ab_sq.min(r3_sq)
    } else {
        rmin_ab_sq
    }
}
