//! Utility functions
use crate::PixelFloat;
use ndarray::Array3;
use rand::rngs::StdRng;
use rand::SeedableRng;

/// The one generator an evaluation run draws from; shuffling and patch
/// placement share it so a seed reproduces the whole run.
pub fn seeded_rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// Fraction of pixels a binary mask covers.
pub fn coverage(mask: &Array3<PixelFloat>) -> f64 {
    if mask.is_empty() {
        return 0.;
    }
    mask.iter().filter(|&&m| m != 0.).count() as f64 / mask.len() as f64
}
