//! Random affine perturbation of a patch together with its mask.
use crate::affine::Affine2;
use crate::error::{PatchError, Result};
use crate::PixelFloat;
use itertools::Itertools;
use log::trace;
use ndarray::{Array3, ArrayView3};
use rand::distributions::{Distribution, Uniform};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Parameters of a single sampled perturbation.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize, Serialize)]
pub struct AffineParams {
    /// Degrees, counter-clockwise on screen
    pub angle: PixelFloat,
    /// Pixels along x and y
    pub translate: (PixelFloat, PixelFloat),
    pub scale: PixelFloat,
}

impl AffineParams {
    pub fn identity() -> Self {
        Self {
            angle: 0.,
            translate: (0., 0.),
            scale: 1.,
        }
    }

    /// Forward map from source to destination pixel coordinates, rotating and
    /// scaling about the image center before translating.
    pub fn matrix(&self, height: usize, width: usize) -> Affine2 {
        let cx = (width as PixelFloat - 1.) * 0.5;
        let cy = (height as PixelFloat - 1.) * 0.5;
        let to_origin = Affine2::translation(-cx, -cy);
        let back = Affine2::translation(cx + self.translate.0, cy + self.translate.1);
        let rs = Affine2::rotation_scale(self.angle, self.scale);
        back * &(rs * &to_origin)
    }
}

/// Ranges from which [`AffineParams`] are drawn uniformly.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct RandomAffine {
    /// Maximum absolute shift as a fraction of width and height
    translate: (PixelFloat, PixelFloat),
    /// (min, max) rotation in degrees
    degrees: (PixelFloat, PixelFloat),
    /// (min, max) scale ratio
    scale: (PixelFloat, PixelFloat),
}

impl Default for RandomAffine {
    fn default() -> Self {
        Self {
            translate: (0.2, 0.2),
            degrees: (-45., 45.),
            scale: (0.5, 1.),
        }
    }
}

impl RandomAffine {
    /// # Errors
    /// `InvalidTransform` if a translation fraction lies outside `[0, 1]`, a
    /// range has `min > max` or a non-finite end or width, or the scale range
    /// is not strictly positive.
    pub fn new(
        translate: (PixelFloat, PixelFloat),
        degrees: (PixelFloat, PixelFloat),
        scale: (PixelFloat, PixelFloat),
    ) -> Result<Self> {
        let in_unit = |f: PixelFloat| (0. ..=1.).contains(&f);
        if !in_unit(translate.0) || !in_unit(translate.1) {
            return Err(PatchError::InvalidTransform(format!(
                "translation fractions must be in [0, 1], got {:?}",
                translate
            )));
        }
        if !(degrees.0 <= degrees.1) || !finite_span(degrees) {
            return Err(PatchError::InvalidTransform(format!(
                "rotation range must be finite and ordered, got {:?}",
                degrees
            )));
        }
        if !(scale.0 > 0. && scale.0 <= scale.1) || !finite_span(scale) {
            return Err(PatchError::InvalidTransform(format!(
                "scale range must be finite, positive and ordered, got {:?}",
                scale
            )));
        }
        Ok(Self {
            translate,
            degrees,
            scale,
        })
    }

    /// A transform that never moves anything.
    pub fn identity() -> Self {
        Self {
            translate: (0., 0.),
            degrees: (0., 0.),
            scale: (1., 1.),
        }
    }

    pub fn translate(&self) -> (PixelFloat, PixelFloat) {
        self.translate
    }

    pub fn degrees(&self) -> (PixelFloat, PixelFloat) {
        self.degrees
    }

    pub fn scale(&self) -> (PixelFloat, PixelFloat) {
        self.scale
    }

    /// Translations are bounded by `translate * side`, which stays finite since
    /// the fractions are at most one.
    pub fn sample_params<R: Rng>(&self, rng: &mut R, height: usize, width: usize) -> AffineParams {
        let angle = Uniform::new_inclusive(self.degrees.0, self.degrees.1).sample(rng);
        let max_dx = self.translate.0 * width as PixelFloat;
        let max_dy = self.translate.1 * height as PixelFloat;
        let tx = Uniform::new_inclusive(-max_dx, max_dx).sample(rng).round();
        let ty = Uniform::new_inclusive(-max_dy, max_dy).sample(rng).round();
        let scale = Uniform::new_inclusive(self.scale.0, self.scale.1).sample(rng);
        AffineParams {
            angle,
            translate: (tx, ty),
            scale,
        }
    }

    /// Draw one set of parameters and warp `patch` and `mask` identically.
    ///
    /// # Panics
    /// If `patch` and `mask` differ in shape
    pub fn apply_pair<R: Rng>(
        &self,
        patch: &Array3<PixelFloat>,
        mask: &Array3<PixelFloat>,
        rng: &mut R,
    ) -> (Array3<PixelFloat>, Array3<PixelFloat>) {
        assert_eq!(patch.shape(), mask.shape());
        let (_, height, width) = patch.dim();
        let params = self.sample_params(rng, height, width);
        let affine = params.matrix(height, width);
        trace!("sampled patch transform {:?}: {}", params, affine);
        (warp(patch.view(), &affine), warp(mask.view(), &affine))
    }
}

/// `Uniform` needs both ends and the width of a range to be finite.
fn finite_span((min, max): (PixelFloat, PixelFloat)) -> bool {
    min.is_finite() && max.is_finite() && (max - min).is_finite()
}

/// Warp a `(C, H, W)` image by the forward map `affine`.
///
/// Every destination pixel is pulled from the nearest source pixel; pixels that
/// map outside the source are zero. Nearest sampling keeps binary masks binary.
pub fn warp(image: ArrayView3<PixelFloat>, affine: &Affine2) -> Array3<PixelFloat> {
    let (channels, height, width) = image.dim();
    let mut output = Array3::zeros((channels, height, width));
    let inverse = match affine.inverse() {
        Some(inv) => inv,
        None => return output,
    };
    for (y, x) in (0..height).cartesian_product(0..width) {
        let (sx, sy) = inverse.apply_point(x as PixelFloat, y as PixelFloat);
        let (sx, sy) = (sx.round(), sy.round());
        if sx < 0. || sy < 0. || sx >= width as PixelFloat || sy >= height as PixelFloat {
            continue;
        }
        let (sx, sy) = (sx as usize, sy as usize);
        for c in 0..channels {
            output[[c, y, x]] = image[[c, sy, sx]];
        }
    }
    output
}
