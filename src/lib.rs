#![allow(clippy::must_use_candidate)]
//! Apply pre-optimized adversarial patches to image batches and measure the
//! accuracy drop they cause on a classifier.
extern crate flate2;
extern crate image;
extern crate ndarray;
extern crate ndarray_stats;
extern crate rand;

pub mod affine;
pub mod archive;
pub mod classifier;
pub mod config;
pub mod dataset;
pub mod error;
pub mod evaluate;
pub mod labels;
pub mod mask;
pub mod normalize;
pub mod patch;
pub mod tensorshape;
pub mod transform;
pub mod util;

#[cfg(test)]
mod test_util;

pub use error::{PatchError, Result};

/// Pixel element type used for every image, patch and mask tensor.
pub type PixelFloat = f32;
