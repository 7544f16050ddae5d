//! Mapping of dataset-local class indices into a shared label space.
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// ImageNet labels of the five dataset classes shipped with the demo data.
pub const IMAGENET_SUBSET: [usize; 5] = [0, 217, 482, 491, 497];

/// Lookup table for labels `0..table.len()`; every other label passes through.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct LabelMap {
    table: Vec<usize>,
}

impl Default for LabelMap {
    fn default() -> Self {
        Self::new(IMAGENET_SUBSET.to_vec())
    }
}

impl LabelMap {
    pub fn new(table: Vec<usize>) -> Self {
        Self { table }
    }

    /// Leaves every label unchanged.
    pub fn identity() -> Self {
        Self::new(Vec::new())
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    pub fn remap(&self, label: usize) -> usize {
        self.table.get(label).copied().unwrap_or(label)
    }
}

/// Read a JSON object mapping label to class name, e.g. `{"0": "airplane"}`.
///
/// # Errors
/// On a missing file or malformed JSON.
pub fn load_class_names<P: AsRef<Path>>(path: P) -> Result<BTreeMap<usize, String>> {
    let text = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}
