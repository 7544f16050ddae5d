//! Directory-per-class image dataset with the ImageNet evaluation preprocessing.
use crate::error::{PatchError, Result};
use crate::labels::LabelMap;
use crate::PixelFloat;
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView};
use log::{debug, info};
use ndarray::{Array3, Array4, Axis};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const IMAGE_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "bmp", "gif"];

/// Shorter edge resized to `resize`, then a centered `crop x crop` window,
/// converted to CHW floats in `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Preprocess {
    pub resize: u32,
    pub crop: u32,
}

impl Default for Preprocess {
    fn default() -> Self {
        Self {
            resize: 256,
            crop: 224,
        }
    }
}

impl Preprocess {
    /// # Errors
    /// `Dataset` if the resized image is smaller than the crop.
    pub fn apply(&self, img: &DynamicImage) -> Result<Array3<PixelFloat>> {
        let (width, height) = img.dimensions();
        let (new_w, new_h) = resize_shorter_edge(width, height, self.resize);
        if new_w < self.crop || new_h < self.crop {
            return Err(PatchError::Dataset(format!(
                "image of {}x{} resized to {}x{} cannot be cropped to {}",
                width, height, new_w, new_h, self.crop
            )));
        }
        let resized = img.resize_exact(new_w, new_h, FilterType::Triangle);
        let left = crop_offset(new_w, self.crop);
        let top = crop_offset(new_h, self.crop);
        let cropped = resized.crop_imm(left, top, self.crop, self.crop);
        Ok(to_tensor(&cropped))
    }
}

/// The longer edge is truncated, as torchvision's `Resize` does.
fn resize_shorter_edge(width: u32, height: u32, target: u32) -> (u32, u32) {
    let scaled = |long: u32, short: u32| (u64::from(long) * u64::from(target) / u64::from(short)) as u32;
    if width <= height {
        (target, scaled(height, width))
    } else {
        (scaled(width, height), target)
    }
}

/// Half the margin, with ties rounded to even like torchvision's `CenterCrop`.
fn crop_offset(len: u32, crop: u32) -> u32 {
    let margin = len - crop;
    let half = margin / 2;
    if margin % 2 == 1 && half % 2 == 1 {
        half + 1
    } else {
        half
    }
}

/// RGB pixels to a `(3, H, W)` tensor scaled to `[0, 1]`.
pub fn to_tensor(img: &DynamicImage) -> Array3<PixelFloat> {
    let rgb = img.to_rgb8();
    let (width, height) = rgb.dimensions();
    Array3::from_shape_fn((3, height as usize, width as usize), |(c, y, x)| {
        PixelFloat::from(rgb.get_pixel(x as u32, y as u32)[c]) / 255.
    })
}

#[derive(Clone, Debug)]
pub struct ImageFolder {
    classes: Vec<String>,
    samples: Vec<(PathBuf, usize)>,
    preprocess: Preprocess,
    label_map: LabelMap,
}

impl ImageFolder {
    /// Index every image under `root/<class>/`. Classes are numbered in
    /// sorted directory-name order.
    ///
    /// # Errors
    /// `Dataset` if `root` is not a directory or holds no images.
    pub fn open<P: AsRef<Path>>(root: P, preprocess: Preprocess, label_map: LabelMap) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        if !root.is_dir() {
            return Err(PatchError::Dataset(format!(
                "dataset root {} is not a directory",
                root.display()
            )));
        }
        let mut class_dirs: Vec<PathBuf> = fs::read_dir(&root)?
            .map(|entry| entry.map(|e| e.path()))
            .collect::<std::io::Result<_>>()?;
        class_dirs.retain(|p| p.is_dir());
        class_dirs.sort();

        let mut classes = Vec::with_capacity(class_dirs.len());
        let mut samples = Vec::new();
        for (class_idx, dir) in class_dirs.iter().enumerate() {
            let mut files = scan_images(dir)?;
            files.sort();
            debug!("class {} ({}): {} images", class_idx, dir.display(), files.len());
            samples.extend(files.into_iter().map(|f| (f, class_idx)));
            classes.push(
                dir.file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default(),
            );
        }
        if samples.is_empty() {
            return Err(PatchError::Dataset(format!(
                "no images found under {}",
                root.display()
            )));
        }
        info!(
            "found {} images in {} classes under {}",
            samples.len(),
            classes.len(),
            root.display()
        );
        Ok(Self {
            classes,
            samples,
            preprocess,
            label_map,
        })
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Preprocessed image and remapped label of sample `index`.
    ///
    /// # Errors
    /// If the file cannot be decoded or is too small to crop.
    ///
    /// # Panics
    /// If `index >= self.len()`
    pub fn load(&self, index: usize) -> Result<(Array3<PixelFloat>, usize)> {
        let (path, class_idx) = &self.samples[index];
        let img = image::open(path)?;
        Ok((self.preprocess.apply(&img)?, self.label_map.remap(*class_idx)))
    }

    /// Iterate over batches of up to `batch_size` samples, shuffled with `rng`
    /// when one is given.
    ///
    /// # Panics
    /// If `batch_size` is zero
    pub fn batches<R: Rng>(&self, batch_size: usize, rng: Option<&mut R>) -> Batches<'_> {
        assert!(batch_size > 0);
        let mut order: Vec<usize> = (0..self.len()).collect();
        if let Some(rng) = rng {
            order.shuffle(rng);
        }
        Batches {
            dataset: self,
            order,
            batch_size,
            cursor: 0,
        }
    }
}

fn scan_images(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut images = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let is_image = path
            .extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
            .map_or(false, |ext| IMAGE_EXTENSIONS.contains(&ext.as_str()));
        if path.is_file() && is_image {
            images.push(path);
        }
    }
    Ok(images)
}

pub struct Batches<'a> {
    dataset: &'a ImageFolder,
    order: Vec<usize>,
    batch_size: usize,
    cursor: usize,
}

impl<'a> Iterator for Batches<'a> {
    type Item = Result<(Array4<PixelFloat>, Vec<usize>)>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.cursor >= self.order.len() {
            return None;
        }
        let end = (self.cursor + self.batch_size).min(self.order.len());
        let indices = &self.order[self.cursor..end];
        self.cursor = end;
        Some(collate(self.dataset, indices))
    }
}

fn collate(dataset: &ImageFolder, indices: &[usize]) -> Result<(Array4<PixelFloat>, Vec<usize>)> {
    let mut images = Vec::with_capacity(indices.len());
    let mut labels = Vec::with_capacity(indices.len());
    for &idx in indices {
        let (image, label) = dataset.load(idx)?;
        images.push(image);
        labels.push(label);
    }
    let views: Vec<_> = images.iter().map(|x| x.view()).collect();
    let batch = ndarray::stack(Axis(0), &views).map_err(|e| {
        PatchError::Dataset(format!("images in a batch differ in shape: {}", e))
    })?;
    Ok((batch, labels))
}
