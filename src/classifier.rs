//! Models under evaluation.
use crate::error::{PatchError, Result};
use crate::PixelFloat;
use ndarray::{Array1, Array2, ArrayView4, Axis};
use ndarray_stats::QuantileExt;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::fs;
use std::path::Path;

/// Anything that scores a batch of normalized `(N, C, H, W)` images.
pub trait Classifier: Debug {
    /// One row of class scores per image.
    ///
    /// # Errors
    /// If the batch does not have the shape the model expects.
    fn logits(&self, batch: ArrayView4<PixelFloat>) -> Result<Array2<PixelFloat>>;

    /// Highest-scoring class per image.
    ///
    /// # Errors
    /// If `logits` fails or a row holds NaN.
    fn predict(&self, batch: ArrayView4<PixelFloat>) -> Result<Vec<usize>> {
        argmax_rows(&self.logits(batch)?)
    }
}

/// # Errors
/// `InvalidShape` if a row is empty or contains NaN.
pub fn argmax_rows(logits: &Array2<PixelFloat>) -> Result<Vec<usize>> {
    logits
        .outer_iter()
        .map(|row| {
            row.argmax()
                .map_err(|e| PatchError::InvalidShape(format!("cannot take argmax: {}", e)))
        })
        .collect()
}

/// A single dense layer over the flattened image, f(x) = Wx + b
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct LinearClassifier {
    /// (classes, C * H * W)
    weights: Array2<PixelFloat>,
    bias: Array1<PixelFloat>,
}

impl LinearClassifier {
    /// # Errors
    /// `InvalidShape` if `bias` does not have one entry per weight row.
    pub fn new(weights: Array2<PixelFloat>, bias: Array1<PixelFloat>) -> Result<Self> {
        if weights.nrows() != bias.len() {
            return Err(PatchError::InvalidShape(format!(
                "{} weight rows but {} biases",
                weights.nrows(),
                bias.len()
            )));
        }
        Ok(Self { weights, bias })
    }

    /// # Errors
    /// On a missing file, malformed JSON or inconsistent shapes.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let model: Self = serde_json::from_str(&fs::read_to_string(path)?)?;
        Self::new(model.weights, model.bias)
    }

    pub fn num_classes(&self) -> usize {
        self.bias.len()
    }

    pub fn input_dim(&self) -> usize {
        self.weights.ncols()
    }
}

impl Classifier for LinearClassifier {
    fn logits(&self, batch: ArrayView4<PixelFloat>) -> Result<Array2<PixelFloat>> {
        let n = batch.len_of(Axis(0));
        let features = batch.len() / n.max(1);
        if features != self.input_dim() {
            return Err(PatchError::ShapeMismatch {
                expected: vec![None, Some(self.input_dim())],
                given: batch.shape().to_vec(),
            });
        }
        let flat = Array2::from_shape_vec((n, features), batch.iter().copied().collect())
            .map_err(|e| PatchError::InvalidShape(e.to_string()))?;
        Ok(flat.dot(&self.weights.t()) + &self.bias)
    }
}
