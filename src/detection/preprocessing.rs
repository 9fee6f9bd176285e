use image::{GrayImage, ImageBuffer, Luma, Rgb, RgbImage};
use imageproc::distance_transform::Norm;
use imageproc::edges::canny;
use imageproc::filter::gaussian_blur_f32;
use imageproc::morphology::{close, erode};

use crate::models::{Mask, BACKGROUND, FOREGROUND};

/// Apply Gaussian blur to reduce noise. A non-positive sigma returns a copy.
pub fn apply_blur(img: &RgbImage, sigma: f32) -> RgbImage {
    if sigma > 0.0 {
        gaussian_blur_f32(img, sigma)
    } else {
        img.clone()
    }
}

pub fn blur_mask(mask: &GrayImage, sigma: f32) -> GrayImage {
    if sigma > 0.0 {
        gaussian_blur_f32(mask, sigma)
    } else {
        mask.clone()
    }
}

/// Detect edges using Canny edge detector
pub fn detect_edges(img: &GrayImage, low_threshold: f32, high_threshold: f32) -> GrayImage {
    canny(img, low_threshold, high_threshold)
}

/// Black out every pixel outside the mask.
pub fn apply_mask(img: &RgbImage, mask: &Mask) -> RgbImage {
    ImageBuffer::from_fn(img.width(), img.height(), |x, y| {
        if mask.get_pixel(x, y)[0] == BACKGROUND {
            Rgb([0, 0, 0])
        } else {
            *img.get_pixel(x, y)
        }
    })
}

/// Erode with a diamond of half the given structuring-element size.
pub fn shrink(mask: &Mask, size: u32) -> Mask {
    let radius = (size / 2).min(u8::MAX as u32) as u8;
    if radius == 0 {
        return mask.clone();
    }
    erode(mask, Norm::L1, radius)
}

/// Pixels within `depth` structuring-element size of the field boundary, or outside it.
pub fn boundary_band(field: &Mask, depth: u32) -> Mask {
    invert(&shrink(field, depth))
}

pub fn close_gaps(mask: &Mask, radius: u8) -> Mask {
    if radius == 0 {
        return mask.clone();
    }
    close(mask, Norm::LInf, radius)
}

pub fn invert(mask: &Mask) -> Mask {
    map_binary(mask, mask, |a, _| !a)
}

pub fn intersect(a: &Mask, b: &Mask) -> Mask {
    map_binary(a, b, |p, q| p && q)
}

pub fn union(a: &Mask, b: &Mask) -> Mask {
    map_binary(a, b, |p, q| p || q)
}

pub fn union_in_place(target: &mut Mask, other: &Mask) {
    for (t, o) in target.pixels_mut().zip(other.pixels()) {
        if o[0] != BACKGROUND {
            t[0] = FOREGROUND;
        }
    }
}

pub fn count_foreground(mask: &Mask) -> usize {
    mask.pixels().filter(|p| p[0] != BACKGROUND).count()
}

fn map_binary(a: &Mask, b: &Mask, op: impl Fn(bool, bool) -> bool) -> Mask {
    ImageBuffer::from_fn(a.width(), a.height(), |x, y| {
        let p = a.get_pixel(x, y)[0] != BACKGROUND;
        let q = b.get_pixel(x, y)[0] != BACKGROUND;
        Luma([if op(p, q) { FOREGROUND } else { BACKGROUND }])
    })
}
