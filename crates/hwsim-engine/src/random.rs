//! Random draws used by the simulations

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Create the simulation RNG, seeded for reproducibility when requested
pub fn rng_from_seed(seed: Option<u64>) -> SmallRng {
    match seed {
        Some(seed) => SmallRng::seed_from_u64(seed),
        None => SmallRng::from_entropy(),
    }
}

/// Uniform draw from the closed interval `[min, max]`
pub fn uniform<R: Rng + ?Sized>(rng: &mut R, min: f64, max: f64) -> f64 {
    rng.gen_range(min..=max)
}
