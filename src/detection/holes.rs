use image::Luma;
use imageproc::region_labelling::Connectivity;

use crate::config::HoleRepairConfig;
use crate::detection::preprocessing::union_in_place;
use crate::detection::region_growing::{flood_background, Neighborhood};
use crate::detection::regions::background_regions;
use crate::models::{Mask, Point, FOREGROUND};

/// Fill enclosed background regions smaller than `area_threshold` pixels.
///
/// Background regions touching the frame border are never holes. Returns the
/// number of holes filled.
pub fn fill_small_holes(mask: &mut Mask, area_threshold: u32) -> usize {
    let (width, height) = mask.dimensions();
    let found = background_regions(mask, Connectivity::Four);

    let max_label = found.regions.iter().map(|r| r.label).max().unwrap_or(0);
    let mut fill = vec![false; max_label as usize + 1];
    let mut filled = 0;
    for region in &found.regions {
        if !region.touches_border(width, height) && region.pixel_count < area_threshold {
            if let Some(slot) = fill.get_mut(region.label as usize) {
                *slot = true;
                filled += 1;
            }
        }
    }
    if filled == 0 {
        return 0;
    }

    for (x, y, label) in found.labels.enumerate_pixels() {
        if fill.get(label[0] as usize).copied().unwrap_or(false) {
            mask.put_pixel(x, y, Luma([FOREGROUND]));
        }
    }
    filled
}

/// Fill every enclosed background region regardless of size.
pub fn fill_all_holes(mask: &mut Mask) -> usize {
    fill_small_holes(mask, u32::MAX)
}

/// Claim the background reachable from a known exterior pixel.
pub fn mark_exterior(mask: &mut Mask, seed: Point) {
    let exterior = flood_background(mask, &[seed], Neighborhood::Four);
    union_in_place(mask, &exterior);
}

/// Small-hole closing followed by exterior marking.
pub fn repair(mask: &mut Mask, config: &HoleRepairConfig) {
    let filled = fill_small_holes(mask, config.small_hole_area);
    let (sx, sy) = config.exterior_seed;
    mark_exterior(mask, Point::new(sx as i32, sy as i32));
    log::debug!("hole repair: {} small holes filled", filled);
}
