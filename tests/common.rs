use image::{Rgb, RgbImage};
use ndarray::{Array1, Array2, Array4};
use patch_eval::archive::{PatchArchive, PatchInfo};
use patch_eval::classifier::LinearClassifier;
use std::fs;
use std::path::Path;

pub const SIDE: usize = 16;

/// Two classes of flat images: dark "airplane", bright "beach".
pub fn write_dataset(root: &Path, per_class: usize) {
    for (class, value) in [("airplane", 10u8), ("beach", 245u8)] {
        let dir = root.join(class);
        fs::create_dir_all(&dir).unwrap();
        for i in 0..per_class {
            RgbImage::from_pixel(24, 20, Rgb([value, value, value]))
                .save(dir.join(format!("{:03}.png", i)))
                .unwrap();
        }
    }
}

/// Patch 0 is black, patch 1 is white; both target label 1.
pub fn write_archive(path: &Path, patch_size: usize) -> PatchArchive {
    let mut patches = Array4::zeros((2, 3, SIDE, SIDE));
    patches.index_axis_mut(ndarray::Axis(0), 1).fill(1.);
    let info = PatchInfo {
        patch_size,
        patch_type: "square".to_string(),
        input_shape: (3, SIDE, SIDE),
        target_to_classname: [(1, "beach".to_string())].into_iter().collect(),
    };
    let archive = PatchArchive::new(patches, vec![1, 1], info).unwrap();
    archive.save(path).unwrap();
    archive
}

/// Scores class 1 by the mean normalized pixel and class 0 by its negation.
pub fn brightness_model() -> LinearClassifier {
    let features = 3 * SIDE * SIDE;
    let mut weights = Array2::zeros((2, features));
    weights.row_mut(0).fill(-1. / features as f32);
    weights.row_mut(1).fill(1. / features as f32);
    LinearClassifier::new(weights, Array1::zeros(2)).unwrap()
}
