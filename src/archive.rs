//! Gzip-compressed JSON archive holding a set of pre-optimized patches.
use crate::error::{PatchError, Result};
use crate::PixelFloat;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use log::info;
use ndarray::{Array3, Array4, Axis};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

/// Settings the patches were optimized under.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct PatchInfo {
    /// Side of the active square, in pixels
    pub patch_size: usize,
    pub patch_type: String,
    /// `(C, H, W)` of the images used during optimization
    pub input_shape: (usize, usize, usize),
    pub target_to_classname: BTreeMap<usize, String>,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct PatchArchive {
    patches: Array4<PixelFloat>,
    targets: Vec<usize>,
    info: PatchInfo,
}

impl PatchArchive {
    /// # Errors
    /// `Archive` if the parts disagree in length or shape.
    pub fn new(patches: Array4<PixelFloat>, targets: Vec<usize>, info: PatchInfo) -> Result<Self> {
        let archive = Self {
            patches,
            targets,
            info,
        };
        archive.validate()?;
        Ok(archive)
    }

    /// # Errors
    /// On IO failure, corrupt compression, malformed JSON or inconsistent
    /// contents.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let reader = BufReader::new(GzDecoder::new(File::open(path)?));
        let archive: Self = serde_json::from_reader(reader)?;
        archive.validate()?;
        info!(
            "loaded {} patches of shape {:?} from {}",
            archive.len(),
            archive.info.input_shape,
            path.display()
        );
        Ok(archive)
    }

    /// # Errors
    /// On IO or serialization failure.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let writer = BufWriter::new(File::create(path)?);
        let mut encoder = GzEncoder::new(writer, Compression::default());
        serde_json::to_writer(&mut encoder, self)?;
        encoder.finish()?.flush()?;
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        let n = self.patches.len_of(Axis(0));
        if n != self.targets.len() {
            return Err(PatchError::Archive(format!(
                "{} patches but {} targets",
                n,
                self.targets.len()
            )));
        }
        let (c, h, w) = self.info.input_shape;
        if self.patches.shape()[1..] != [c, h, w] {
            return Err(PatchError::Archive(format!(
                "patches have shape {:?}, info declares {:?}",
                &self.patches.shape()[1..],
                self.info.input_shape
            )));
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn info(&self) -> &PatchInfo {
        &self.info
    }

    pub fn targets(&self) -> &[usize] {
        &self.targets
    }

    /// Copy out one patch and its target label.
    ///
    /// # Errors
    /// `PatchIndexOutOfRange` if `patch_id >= self.len()`.
    pub fn select(&self, patch_id: usize) -> Result<(Array3<PixelFloat>, usize)> {
        if patch_id >= self.len() {
            return Err(PatchError::PatchIndexOutOfRange {
                index: patch_id,
                len: self.len(),
            });
        }
        Ok((
            self.patches.index_axis(Axis(0), patch_id).to_owned(),
            self.targets[patch_id],
        ))
    }

    pub fn class_name(&self, target: usize) -> Option<&str> {
        self.info.target_to_classname.get(&target).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array;

    fn small_archive() -> PatchArchive {
        let patches = Array::from_shape_fn((2, 3, 4, 4), |(n, c, y, x)| {
            (n * 1000 + c * 100 + y * 10 + x) as PixelFloat / 2000.
        });
        let info = PatchInfo {
            patch_size: 2,
            patch_type: "square".to_string(),
            input_shape: (3, 4, 4),
            target_to_classname: [(804, "soap dispenser".to_string()), (513, "cornet".to_string())]
                .into_iter()
                .collect(),
        };
        PatchArchive::new(patches, vec![804, 513], info).unwrap()
    }

    #[test]
    fn save_then_load_preserves_selection() {
        let archive = small_archive();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("patches.gz");
        archive.save(&path).unwrap();

        let loaded = PatchArchive::load(&path).unwrap();
        let (patch, target) = loaded.select(1).unwrap();
        assert_eq!(target, 513);
        assert_eq!(patch, archive.select(1).unwrap().0);
        assert_eq!(loaded.class_name(target), Some("cornet"));
        assert_eq!(loaded.info().patch_size, 2);
    }

    #[test]
    fn select_out_of_range() {
        assert!(matches!(
            small_archive().select(2),
            Err(PatchError::PatchIndexOutOfRange { index: 2, len: 2 })
        ));
    }

    #[test]
    fn inconsistent_parts_are_rejected() {
        let archive = small_archive();
        let info = archive.info().clone();
        let patches = Array4::zeros((2, 3, 4, 4));
        assert!(matches!(
            PatchArchive::new(patches.clone(), vec![1], info.clone()),
            Err(PatchError::Archive(_))
        ));
        let wrong_shape = PatchInfo {
            input_shape: (3, 5, 5),
            ..info
        };
        assert!(PatchArchive::new(patches, vec![1, 2], wrong_shape).is_err());
    }

    #[test]
    fn uncompressed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plain.json");
        std::fs::write(&path, b"{\"patches\": []}").unwrap();
        assert!(PatchArchive::load(&path).is_err());
        assert!(PatchArchive::load(dir.path().join("missing.gz")).is_err());
    }
}
