use image::{ImageBuffer, Luma, Rgb, RgbImage};
use serde::{Deserialize, Serialize};

use crate::models::{HsvImage, Mask, BACKGROUND, FOREGROUND};

/// Hue wraps at this value in the 8-bit HSV encoding.
pub const HUE_RANGE: u8 = 180;

/// Convert one RGB pixel to 8-bit HSV (H in 0..180, S and V in 0..=255).
pub fn rgb_to_hsv([r, g, b]: [u8; 3]) -> [u8; 3] {
    let (rf, gf, bf) = (r as f32, g as f32, b as f32);
    let max = rf.max(gf).max(bf);
    let min = rf.min(gf).min(bf);
    let delta = max - min;

    let s = if max > 0.0 { delta * 255.0 / max } else { 0.0 };

    let mut h = if delta == 0.0 {
        0.0
    } else if max == rf {
        60.0 * (gf - bf) / delta
    } else if max == gf {
        120.0 + 60.0 * (bf - rf) / delta
    } else {
        240.0 + 60.0 * (rf - gf) / delta
    };
    if h < 0.0 {
        h += 360.0;
    }

    let h = ((h / 2.0).round() as u32 % HUE_RANGE as u32) as u8;
    [h, s.round() as u8, max as u8]
}

pub fn to_hsv(frame: &RgbImage) -> HsvImage {
    ImageBuffer::from_fn(frame.width(), frame.height(), |x, y| {
        Rgb(rgb_to_hsv(frame.get_pixel(x, y).0))
    })
}

/// Shortest distance between two hues on the 0..180 circle.
pub fn hue_distance(a: u8, b: u8) -> u8 {
    let d = a.abs_diff(b);
    d.min(HUE_RANGE.saturating_sub(d))
}

/// Inclusive per-channel HSV bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HsvRange {
    pub lower: [u8; 3],
    pub upper: [u8; 3],
}

impl HsvRange {
    pub const fn new(lower: [u8; 3], upper: [u8; 3]) -> Self {
        Self { lower, upper }
    }

    /// `lower_ref - below ..= upper_ref + above`, saturating per channel.
    pub fn between(lower_ref: [u8; 3], below: [u8; 3], upper_ref: [u8; 3], above: [u8; 3]) -> Self {
        let mut lower = [0u8; 3];
        let mut upper = [0u8; 3];
        for c in 0..3 {
            lower[c] = lower_ref[c].saturating_sub(below[c]);
            upper[c] = upper_ref[c].saturating_add(above[c]);
        }
        Self { lower, upper }
    }

    /// Asymmetric range around a single reference color.
    pub fn around(center: [u8; 3], below: [u8; 3], above: [u8; 3]) -> Self {
        Self::between(center, below, center, above)
    }

    pub fn contains(&self, hsv: [u8; 3]) -> bool {
        (0..3).all(|c| hsv[c] >= self.lower[c] && hsv[c] <= self.upper[c])
    }

    /// 255 wherever the pixel falls inside the range.
    pub fn threshold(&self, hsv: &HsvImage) -> Mask {
        ImageBuffer::from_fn(hsv.width(), hsv.height(), |x, y| {
            if self.contains(hsv.get_pixel(x, y).0) {
                Luma([FOREGROUND])
            } else {
                Luma([BACKGROUND])
            }
        })
    }
}
