use crate::error::{PatchError, Result};
use std::fmt;

/// A tensor shape where `None` marks a dimension of any size (e.g. batch).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TensorShape {
    dims: Vec<Option<usize>>,
}

impl TensorShape {
    pub fn new(dims: Vec<Option<usize>>) -> Self {
        Self { dims }
    }

    /// Shape of an image batch `(N, C, H, W)` with unconstrained `N`.
    pub fn image_batch(channels: usize, height: usize, width: usize) -> Self {
        Self::new(vec![None, Some(channels), Some(height), Some(width)])
    }

    pub fn is_fully_defined(&self) -> bool {
        self.dims.iter().all(Option::is_some)
    }

    pub fn is_compatible_with(&self, other: &Self) -> bool {
        if self.dims.len() != other.dims.len() {
            return false;
        }
        self.dims
            .iter()
            .zip(other.dims.iter())
            .all(|(x, y)| match (x, y) {
                (Some(a), Some(b)) => a == b,
                _ => true,
            })
    }

    /// # Errors
    /// `ShapeMismatch` if `shape` is not compatible with `self`.
    pub fn check(&self, shape: &[usize]) -> Result<()> {
        if self.is_compatible_with(&Self::from(shape.to_vec())) {
            Ok(())
        } else {
            Err(PatchError::ShapeMismatch {
                expected: self.dims.clone(),
                given: shape.to_vec(),
            })
        }
    }
}

impl From<Vec<usize>> for TensorShape {
    fn from(v: Vec<usize>) -> Self {
        Self {
            dims: v.into_iter().map(Some).collect(),
        }
    }
}

impl fmt::Display for TensorShape {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let dims: Vec<String> = self
            .dims
            .iter()
            .map(|d| d.map_or_else(|| "?".to_string(), |x| x.to_string()))
            .collect();
        write!(f, "({})", dims.join(", "))
    }
}
