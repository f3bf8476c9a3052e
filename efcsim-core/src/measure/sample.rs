//! Uniform draws from the run's random source.

use rand_core::Rng;

/// Draw a uniform value in `[0, 1)`.
///
/// Only the 53 high bits of the draw are kept so that every value is
/// exactly representable and `1.0` is never returned.
pub(crate) fn unit<R: Rng>(rng: &mut R) -> f64 {
    (rng.next_u64() >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
}

/// Draw a uniform integer in `[0, span)`, `0` if `span` is `0`.
pub(crate) fn below<R: Rng>(rng: &mut R, span: u64) -> u64 {
    ((rng.next_u64() as u128 * span as u128) >> 64) as u64
}
