//! Scalar/vector types and small numeric helpers shared across the integrator.

/// Scalar type used throughout the integrator (double precision is required
/// for the long-term energy conservation the symplectic schedules promise).
pub type Scalar = f64;

/// 3D vector type for positions, velocities, accelerations and jerks.
pub type Vector = glam::DVec3;

/// Extension trait for vector operations the integrator needs that
/// aren't part of glam's own API.
pub trait VectorExt {
    /// Component-wise minimum of two vectors.
    fn component_min(self, other: Self) -> Self;

    /// Component-wise maximum of two vectors.
    fn component_max(self, other: Self) -> Self;
}

impl VectorExt for Vector {
    #[inline]
    fn component_min(self, other: Self) -> Self {
        Vector::new(
            self.x.min(other.x),
            self.y.min(other.y),
            self.z.min(other.z),
        )
    }

    #[inline]
    fn component_max(self, other: Self) -> Self {
        Vector::new(
            self.x.max(other.x),
            self.y.max(other.y),
            self.z.max(other.z),
        )
    }
}

/// Cube root computed by Newton iteration rather than a platform `pow`, so
/// that critical-distance sizing is bit-reproducible across targets.
///
/// A handful of iterations of `x <- x - (x - a/x^2) / 3` converge to full
/// double precision for any `a` in the range the integrator cares about
/// (roughly `1e-30 ..= 1e30`); the seed below is the platform `cbrt`-free
/// bit-twiddling trick used by most libm implementations, refined until the
/// residual is negligible.
pub fn sqrt3(a: Scalar) -> Scalar {
    if a == 0.0 {
        return 0.0;
    }

    let sign = if a < 0.0 { -1.0 } else { 1.0 };
    let a = a.abs();

    let mut x = cbrt_seed(a);

    for _ in 0..8 {
        x -= (x - a / (x * x)) / 3.0;
    }

    sign * x
}

/// Order-of-magnitude seed for the Newton iteration: the IEEE-754 exponent
/// of `a` divided by three, as a power of two. This is exact bit shifting
/// (no transcendental call), and puts the iteration within Newton's basin
/// of attraction for any normal double, however large or small.
#[inline]
fn cbrt_seed(a: Scalar) -> Scalar {
    let exponent = ((a.to_bits() >> 52) & 0x7ff) as i64 - 1023;
    Scalar::powi(2.0, (exponent / 3) as i32)
}
