//! Compositing of an adversarial patch onto image batches.
use crate::error::Result;
use crate::mask::generate_mask;
use crate::tensorshape::TensorShape;
use crate::transform::RandomAffine;
use crate::PixelFloat;
use log::debug;
use ndarray::{Array3, Array4, ArrayView4, Zip};
use rand::Rng;
use std::fmt;

/// Holds a patch, its target label, its mask and the perturbation ranges.
///
/// The stored patch and mask are never modified; reconfiguring returns a new
/// applier.
#[derive(Clone, Debug)]
pub struct ApplyPatch {
    patch: Array3<PixelFloat>,
    target: usize,
    mask: Array3<PixelFloat>,
    patch_size: usize,
    transforms: RandomAffine,
}

impl ApplyPatch {
    /// # Errors
    /// `InvalidShape` if `patch_size` does not fit in the patch.
    pub fn new(
        patch: Array3<PixelFloat>,
        target: usize,
        transforms: RandomAffine,
        patch_size: usize,
    ) -> Result<Self> {
        let mask = generate_mask(patch.dim(), patch_size)?;
        debug!(
            "patch {:?} for target {} with a {}px square",
            patch.shape(),
            target,
            patch_size
        );
        Ok(Self {
            patch,
            target,
            mask,
            patch_size,
            transforms,
        })
    }

    /// Swap in another patch, regenerating the mask for its shape.
    ///
    /// # Errors
    /// `InvalidShape` if the configured patch size does not fit the new patch.
    pub fn with_patch(self, patch: Array3<PixelFloat>, target: usize) -> Result<Self> {
        Self::new(patch, target, self.transforms, self.patch_size)
    }

    pub fn with_transforms(self, transforms: RandomAffine) -> Self {
        Self { transforms, ..self }
    }

    pub fn patch(&self) -> &Array3<PixelFloat> {
        &self.patch
    }

    pub fn target(&self) -> usize {
        self.target
    }

    pub fn mask(&self) -> &Array3<PixelFloat> {
        &self.mask
    }

    pub fn patch_size(&self) -> usize {
        self.patch_size
    }

    pub fn transforms(&self) -> &RandomAffine {
        &self.transforms
    }

    /// Shape every batch passed to [`Self::apply`] must match.
    pub fn input_shape(&self) -> TensorShape {
        let (c, h, w) = self.patch.dim();
        TensorShape::image_batch(c, h, w)
    }

    /// Perturb patch and mask with one draw from `rng`, then paste the patch
    /// onto every image of `batch`.
    ///
    /// # Errors
    /// `ShapeMismatch` if `batch` is not `(N, C, H, W)` with the patch's
    /// `(C, H, W)`.
    pub fn apply<R: Rng>(&self, batch: ArrayView4<PixelFloat>, rng: &mut R) -> Result<Array4<PixelFloat>> {
        self.input_shape().check(batch.shape())?;
        let (patch, mask) = self.transforms.apply_pair(&self.patch, &self.mask, rng);
        composite(batch, &patch, &mask)
    }
}

impl fmt::Display for ApplyPatch {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let (c, h, w) = self.patch.dim();
        write!(
            f,
            "ApplyPatch {}x{}x{}, target {}, size {}",
            c, h, w, self.target, self.patch_size
        )
    }
}

/// `batch * (1 - mask) + patch * mask` for a binary `mask`, broadcast over the
/// batch axis.
///
/// Each output pixel is copied bit for bit from the patch where the mask is set
/// and from the image elsewhere.
///
/// # Errors
/// `ShapeMismatch` if the images of `batch` do not share the patch's shape.
pub fn composite(
    batch: ArrayView4<PixelFloat>,
    patch: &Array3<PixelFloat>,
    mask: &Array3<PixelFloat>,
) -> Result<Array4<PixelFloat>> {
    let (c, h, w) = patch.dim();
    let expected = TensorShape::image_batch(c, h, w);
    expected.check(batch.shape())?;
    let mut mask_shape = vec![1];
    mask_shape.extend_from_slice(mask.shape());
    expected.check(&mask_shape)?;

    let mut out = batch.to_owned();
    for mut image in out.outer_iter_mut() {
        Zip::from(&mut image)
            .and(patch)
            .and(mask)
            .for_each(|x, &p, &m| {
                if m != 0. {
                    *x = p;
                }
            });
    }
    Ok(out)
}
