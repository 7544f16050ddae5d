#![allow(clippy::module_name_repetitions)]
//! Representation of planar affine transformations
use crate::PixelFloat;
use ndarray::{arr1, arr2, Array1, Array2, ArrayView1};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::ops::Mul;

/// Affine map on image coordinates `(x, y)`, i.e. f(p) = Ap + b
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Affine2 {
    basis: Array2<PixelFloat>,
    shift: Array1<PixelFloat>,
}

impl Display for Affine2 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::result::Result<(), std::fmt::Error> {
        write!(
            f,
            "[[{:.3}, {:.3}, {:.3}], [{:.3}, {:.3}, {:.3}]]",
            self.basis[[0, 0]],
            self.basis[[0, 1]],
            self.shift[0],
            self.basis[[1, 0]],
            self.basis[[1, 1]],
            self.shift[1]
        )
    }
}

impl Affine2 {
    pub fn identity() -> Self {
        Self {
            basis: Array2::eye(2),
            shift: Array1::zeros(2),
        }
    }

    pub fn translation(tx: PixelFloat, ty: PixelFloat) -> Self {
        Self {
            basis: Array2::eye(2),
            shift: arr1(&[tx, ty]),
        }
    }

    /// Rotation by `angle` degrees combined with a uniform `scale`.
    ///
    /// With the y axis pointing down, a positive angle turns the image
    /// counter-clockwise on screen.
    pub fn rotation_scale(angle: PixelFloat, scale: PixelFloat) -> Self {
        let (sin, cos) = angle.to_radians().sin_cos();
        Self {
            basis: arr2(&[[scale * cos, scale * sin], [-scale * sin, scale * cos]]),
            shift: Array1::zeros(2),
        }
    }

    pub fn determinant(&self) -> PixelFloat {
        self.basis[[0, 0]] * self.basis[[1, 1]] - self.basis[[0, 1]] * self.basis[[1, 0]]
    }

    pub fn apply(&self, x: &ArrayView1<PixelFloat>) -> Array1<PixelFloat> {
        self.basis.dot(x) + &self.shift
    }

    pub fn apply_point(&self, x: PixelFloat, y: PixelFloat) -> (PixelFloat, PixelFloat) {
        let b = &self.basis;
        (
            b[[0, 0]] * x + b[[0, 1]] * y + self.shift[0],
            b[[1, 0]] * x + b[[1, 1]] * y + self.shift[1],
        )
    }

    /// Returns `None` for a (numerically) singular basis.
    pub fn inverse(&self) -> Option<Self> {
        let det = self.determinant();
        if det.abs() < 1e-10 {
            return None;
        }
        let b = &self.basis;
        let basis = arr2(&[[b[[1, 1]], -b[[0, 1]]], [-b[[1, 0]], b[[0, 0]]]]) / det;
        let shift = -basis.dot(&self.shift);
        Some(Self { basis, shift })
    }
}

impl<'a, 'b> Mul<&'b Affine2> for &'a Affine2 {
    type Output = Affine2;

    #[allow(clippy::suspicious_arithmetic_impl)]
    fn mul(self, rhs: &'b Affine2) -> Affine2 {
        let basis = self.basis.dot(&rhs.basis);
        let shift = self.basis.dot(&rhs.shift) + &self.shift;
        Affine2 { basis, shift }
    }
}

/// Apply Affine to Affine
impl Mul<&Self> for Affine2 {
    type Output = Self;

    #[allow(clippy::suspicious_arithmetic_impl)]
    fn mul(self, rhs: &Self) -> Self {
        let basis = self.basis.dot(&rhs.basis);
        let shift = self.basis.dot(&rhs.shift) + self.shift;
        Self { basis, shift }
    }
}
