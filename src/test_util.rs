#![cfg(test)]
use crate::affine::Affine2;
use crate::PixelFloat;
use ndarray::{arr1, Array1, Array3, Array4};
use proptest::arbitrary::functor::ArbitraryF1;
use proptest::prelude::*;
use proptest::sample::SizeRange;

prop_compose! {
    pub fn array3(channels: usize, height: usize, width: usize)(v in Vec::lift1_with(0f32..1., SizeRange::new(channels * height * width..=channels * height * width))) -> Array3<PixelFloat> {
        Array3::from_shape_vec((channels, height, width), v).unwrap()
    }
}

prop_compose! {
    pub fn array4(batch: usize, channels: usize, height: usize, width: usize)(v in Vec::lift1_with(0f32..1., SizeRange::new(batch * channels * height * width..=batch * channels * height * width))) -> Array4<PixelFloat> {
        Array4::from_shape_vec((batch, channels, height, width), v).unwrap()
    }
}

prop_compose! {
    pub fn binary_mask(channels: usize, height: usize, width: usize)(v in Vec::lift1_with(any::<bool>(), SizeRange::new(channels * height * width..=channels * height * width))) -> Array3<PixelFloat> {
        Array3::from_shape_vec((channels, height, width), v.into_iter().map(|b| if b { 1. } else { 0. }).collect()).unwrap()
    }
}

prop_compose! {
    /// A `(C, H, W)` shape together with a patch size that fits in it
    pub fn mask_inputs(max_channels: usize, max_side: usize)(channels in 1..=max_channels, height in 1..=max_side, width in 1..=max_side)(shape in Just((channels, height, width)), patch_size in 0..=height.min(width)) -> ((usize, usize, usize), usize) {
        (shape, patch_size)
    }
}

prop_compose! {
    pub fn point()(x in -50f32..50., y in -50f32..50.) -> Array1<PixelFloat> {
        arr1(&[x, y])
    }
}

prop_compose! {
    pub fn affine2()(angle in -180f32..180., scale in 0.25f32..4., tx in -50f32..50., ty in -50f32..50.) -> Affine2 {
        &Affine2::translation(tx, ty) * &Affine2::rotation_scale(angle, scale)
    }
}
