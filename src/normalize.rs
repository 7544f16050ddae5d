use crate::error::{PatchError, Result};
use crate::PixelFloat;
use ndarray::{Array1, Array4, ArrayView4, Axis};
use serde::{Deserialize, Serialize};

pub const IMAGENET_MEAN: [PixelFloat; 3] = [0.485, 0.456, 0.406];
pub const IMAGENET_STD: [PixelFloat; 3] = [0.229, 0.224, 0.225];

/// Per-channel `(x - mean) / std` over `(N, C, H, W)` batches.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Normalize {
    mean: Array1<PixelFloat>,
    std: Array1<PixelFloat>,
}

impl Normalize {
    /// # Errors
    /// `Config` if the vectors are empty, differ in length, or a std is not
    /// strictly positive.
    pub fn new(mean: Vec<PixelFloat>, std: Vec<PixelFloat>) -> Result<Self> {
        if mean.is_empty() || mean.len() != std.len() {
            return Err(PatchError::Config(format!(
                "normalization needs one mean and std per channel, got {} and {}",
                mean.len(),
                std.len()
            )));
        }
        if std.iter().any(|&s| !(s > 0.)) {
            return Err(PatchError::Config(format!(
                "normalization std must be positive, got {:?}",
                std
            )));
        }
        Ok(Self {
            mean: Array1::from(mean),
            std: Array1::from(std),
        })
    }

    pub fn imagenet() -> Self {
        Self {
            mean: Array1::from(IMAGENET_MEAN.to_vec()),
            std: Array1::from(IMAGENET_STD.to_vec()),
        }
    }

    pub fn channels(&self) -> usize {
        self.mean.len()
    }

    /// # Errors
    /// `ShapeMismatch` if the batch's channel count differs.
    pub fn apply(&self, batch: ArrayView4<PixelFloat>) -> Result<Array4<PixelFloat>> {
        if batch.len_of(Axis(1)) != self.channels() {
            return Err(PatchError::ShapeMismatch {
                expected: vec![None, Some(self.channels()), None, None],
                given: batch.shape().to_vec(),
            });
        }
        let c = self.channels();
        let mean = self.mean.view().into_shape((1, c, 1, 1)).map_err(shape_err)?;
        let std = self.std.view().into_shape((1, c, 1, 1)).map_err(shape_err)?;
        Ok((&batch - &mean) / &std)
    }
}

fn shape_err(err: ndarray::ShapeError) -> PatchError {
    PatchError::InvalidShape(err.to_string())
}
