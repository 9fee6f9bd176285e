use crate::config::CandidateConfig;
use crate::detection::color::HsvRange;
use crate::detection::preprocessing::{boundary_band, intersect, union};
use crate::models::{HsvImage, Mask};

/// Threshold masks built from the felt color.
pub struct CandidateMasks {
    pub felt_color: [u8; 3],
    pub shadow_color: [u8; 3],
    pub felt: Mask,
    pub shadows: Mask,
    pub colors: Mask,
    /// Union of the three masks above.
    pub combined: Mask,
}

/// Median (by vector norm) of the pixels inside a disk at the frame center.
///
/// Robust against a ball or cue lying exactly at the center. An empty disk
/// yields black.
pub fn sample_felt_color(hsv: &HsvImage, radius: u32) -> [u8; 3] {
    let (width, height) = hsv.dimensions();
    let cx = (width / 2) as i64;
    let cy = (height / 2) as i64;
    let r = radius as i64;

    let mut samples: Vec<[u8; 3]> = Vec::new();
    for dy in -r..=r {
        for dx in -r..=r {
            if dx * dx + dy * dy > r * r {
                continue;
            }
            let x = cx + dx;
            let y = cy + dy;
            if x >= 0 && y >= 0 && x < width as i64 && y < height as i64 {
                samples.push(hsv.get_pixel(x as u32, y as u32).0);
            }
        }
    }

    if samples.is_empty() {
        return [0, 0, 0];
    }

    let norm2 = |p: &[u8; 3]| p.iter().map(|&c| (c as u32) * (c as u32)).sum::<u32>();
    samples.sort_by_key(norm2);
    samples[samples.len() / 2]
}

/// Felt, shadow and rail-color masks of a masked HSV frame.
///
/// The shadow and color masks only count within their configured depth of
/// the field boundary.
pub fn build_candidate_masks(hsv: &HsvImage, field_mask: &Mask, config: &CandidateConfig) -> CandidateMasks {
    let felt_color = sample_felt_color(hsv, config.felt_sample_radius);
    let mut shadow_color = felt_color;
    shadow_color[2] = shadow_color[2].saturating_sub(config.shadow_value_offset);

    let felt_range = HsvRange::around(felt_color, config.felt_band.below, config.felt_band.above);
    let shadow_range = HsvRange::around(shadow_color, config.shadow_band.below, config.shadow_band.above);
    let color_range = HsvRange::between(
        felt_color,
        config.color_band.below,
        shadow_color,
        config.color_band.above,
    );

    let felt = felt_range.threshold(hsv);
    let shadows = intersect(
        &shadow_range.threshold(hsv),
        &boundary_band(field_mask, config.shadow_depth),
    );
    let colors = intersect(
        &color_range.threshold(hsv),
        &boundary_band(field_mask, config.color_depth),
    );
    let combined = union(&union(&felt, &shadows), &colors);

    log::debug!(
        "felt color {:?}, shadow color {:?}",
        felt_color,
        shadow_color
    );

    CandidateMasks {
        felt_color,
        shadow_color,
        felt,
        shadows,
        colors,
        combined,
    }
}
