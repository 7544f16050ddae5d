//! Binary masks marking the active square of a patch.
use crate::error::{PatchError, Result};
use crate::PixelFloat;
use ndarray::{s, Array3};

/// Build a `(channels, height, width)` mask that is one inside a centered
/// square of side `patch_size` and zero elsewhere.
///
/// Edges are `h / 2 - p / 2` (inclusive) and `h / 2 + p / 2` (exclusive), all
/// with integer division, so an odd `patch_size` yields a square of side
/// `patch_size - 1`.
///
/// # Errors
/// `InvalidShape` if `patch_size` exceeds either spatial dimension.
pub fn generate_mask(
    shape: (usize, usize, usize),
    patch_size: usize,
) -> Result<Array3<PixelFloat>> {
    let (channels, height, width) = shape;
    if patch_size > height || patch_size > width {
        return Err(PatchError::InvalidShape(format!(
            "patch size {} does not fit in a {}x{} patch",
            patch_size, height, width
        )));
    }
    let (top, bottom) = square_edges(height, patch_size);
    let (left, right) = square_edges(width, patch_size);

    let mut mask = Array3::ones((channels, height, width));
    mask.slice_mut(s![.., ..top, ..]).fill(0.);
    mask.slice_mut(s![.., bottom.., ..]).fill(0.);
    mask.slice_mut(s![.., .., ..left]).fill(0.);
    mask.slice_mut(s![.., .., right..]).fill(0.);
    Ok(mask)
}

/// `[start, end)` of the centered run along one axis.
pub fn square_edges(len: usize, patch_size: usize) -> (usize, usize) {
    let center = len / 2;
    let half = patch_size / 2;
    (center - half, center + half)
}

/// Exact complement of a binary mask: one where `mask == 0`, zero elsewhere.
pub fn inverse_mask(mask: &Array3<PixelFloat>) -> Array3<PixelFloat> {
    mask.mapv(|m| if m == 0. { 1. } else { 0. })
}
