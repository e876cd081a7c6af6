use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha12Rng;

/// Random source owned by a simulation.
pub type SimRng = ChaCha12Rng;

/// Deterministic when a seed is given, entropy-seeded otherwise.
pub fn create_rng(seed: Option<u64>) -> SimRng {
    match seed {
        Some(seed) => ChaCha12Rng::seed_from_u64(seed),
        None => ChaCha12Rng::from_entropy(),
    }
}

/// Uniform sample in `[min, max)`; collapses to `min` on an empty range.
#[inline]
pub fn rand_range<R: Rng + ?Sized>(rng: &mut R, min: f32, max: f32) -> f32 {
    if max > min {
        rng.gen_range(min..max)
    } else {
        min
    }
}

/// `true` with probability `p`, tolerant of values outside `[0, 1]`.
#[inline]
pub fn chance<R: Rng + ?Sized>(rng: &mut R, p: f32) -> bool {
    rng.gen::<f32>() < p
}
