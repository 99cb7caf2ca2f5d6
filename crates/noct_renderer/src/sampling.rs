//! Random sampling helpers.
//!
//! Everything takes `&mut dyn RngCore` so the generator is owned by the
//! caller and threaded down the recursion, never shared between rows.

use std::f64::consts::TAU;

use noct_math::{orthonormal_basis, DVec3};
use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};

/// Uniform f64 in [0, 1).
#[inline]
pub(crate) fn gen_f64(rng: &mut dyn RngCore) -> f64 {
    rng.gen::<f64>()
}

/// Offset in [-1, 1) drawn from a triangular distribution peaked at zero.
pub fn tent(rng: &mut dyn RngCore) -> f64 {
    let r = 2.0 * gen_f64(rng);
    if r < 1.0 {
        r.sqrt() - 1.0
    } else {
        1.0 - (2.0 - r).sqrt()
    }
}

/// Cosine-weighted direction on the hemisphere around a unit `normal`.
pub fn cosine_hemisphere(normal: DVec3, rng: &mut dyn RngCore) -> DVec3 {
    let (u, v, w) = orthonormal_basis(normal);
    let r1 = TAU * gen_f64(rng);
    let r2 = gen_f64(rng);
    let r2s = r2.sqrt();

    (u * r1.cos() * r2s + v * r1.sin() * r2s + w * (1.0 - r2).sqrt()).normalize()
}

/// Deterministic generator for one image row.
///
/// Rows get independent streams, so the image does not depend on which
/// worker renders which row or in what order.
pub fn row_rng(seed: u64, row: u32) -> StdRng {
    StdRng::seed_from_u64(seed.wrapping_mul(0x9E37_79B9_7F4A_7C15) ^ u64::from(row))
}
