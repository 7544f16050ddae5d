//! Evaluation settings read from a JSON file.
use crate::dataset::Preprocess;
use crate::error::{PatchError, Result};
use crate::normalize::{Normalize, IMAGENET_MEAN, IMAGENET_STD};
use crate::transform::RandomAffine;
use crate::PixelFloat;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Every field has a default, so a config file only lists what it changes.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct EvalConfig {
    pub archive_path: PathBuf,
    pub dataset_path: PathBuf,
    pub class_names_path: Option<PathBuf>,
    pub model_path: PathBuf,
    /// Index of the patch inside the archive
    pub patch_id: usize,
    /// Overrides the archive's `patch_size` when set
    pub patch_size: Option<usize>,
    pub translation: (PixelFloat, PixelFloat),
    pub rotation: (PixelFloat, PixelFloat),
    pub scale: (PixelFloat, PixelFloat),
    pub batch_size: usize,
    pub shuffle: bool,
    pub seed: u64,
    pub mean: Vec<PixelFloat>,
    pub std: Vec<PixelFloat>,
    pub preprocess: Preprocess,
    /// Dataset class index to shared label; empty leaves labels unchanged
    pub label_table: Vec<usize>,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            archive_path: PathBuf::from("assets/imagenet_patch.gz"),
            dataset_path: PathBuf::from("assets/data"),
            class_names_path: None,
            model_path: PathBuf::from("assets/model.json"),
            patch_id: 1,
            patch_size: None,
            translation: (0.2, 0.2),
            rotation: (-45., 45.),
            scale: (0.7, 1.),
            batch_size: 10,
            shuffle: true,
            seed: 42,
            mean: IMAGENET_MEAN.to_vec(),
            std: IMAGENET_STD.to_vec(),
            preprocess: Preprocess::default(),
            label_table: crate::labels::IMAGENET_SUBSET.to_vec(),
        }
    }
}

impl EvalConfig {
    /// Read and validate a config. Relative paths inside it resolve against
    /// the config file's directory.
    ///
    /// # Errors
    /// On a missing file, malformed JSON or invalid values.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let mut config: Self = serde_json::from_str(&fs::read_to_string(path)?)?;
        if let Some(base) = path.parent() {
            config.resolve_paths(base);
        }
        config.validate()?;
        Ok(config)
    }

    fn resolve_paths(&mut self, base: &Path) {
        let resolve = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = base.join(&*p);
            }
        };
        resolve(&mut self.archive_path);
        resolve(&mut self.dataset_path);
        resolve(&mut self.model_path);
        if let Some(p) = self.class_names_path.as_mut() {
            resolve(p);
        }
    }

    /// # Errors
    /// `Config` for a zero batch size, a crop larger than the resize, or
    /// invalid transform or normalization settings.
    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(PatchError::Config("batch_size must be positive".to_string()));
        }
        if self.preprocess.crop == 0 || self.preprocess.crop > self.preprocess.resize {
            return Err(PatchError::Config(format!(
                "crop {} must be positive and no larger than resize {}",
                self.preprocess.crop, self.preprocess.resize
            )));
        }
        self.transforms()?;
        self.normalizer()?;
        Ok(())
    }

    /// # Errors
    /// `InvalidTransform` for out-of-range, unbounded or unordered ranges.
    pub fn transforms(&self) -> Result<RandomAffine> {
        RandomAffine::new(self.translation, self.rotation, self.scale)
    }

    /// # Errors
    /// `Config` for mismatched or non-positive statistics.
    pub fn normalizer(&self) -> Result<Normalize> {
        Normalize::new(self.mean.clone(), self.std.clone())
    }
}
