use std::collections::VecDeque;

use image::Luma;
use serde::{Deserialize, Serialize};

use crate::config::RegionGrowingConfig;
use crate::detection::color::hue_distance;
use crate::models::{HsvImage, Mask, Point, BACKGROUND, FOREGROUND};

/// Pixel adjacency used by the flood fills.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Neighborhood {
    Four,
    Eight,
}

impl Neighborhood {
    pub fn offsets(self) -> &'static [(i32, i32)] {
        const FOUR: [(i32, i32); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];
        const EIGHT: [(i32, i32); 8] = [
            (1, 0),
            (-1, 0),
            (0, 1),
            (0, -1),
            (1, 1),
            (1, -1),
            (-1, 1),
            (-1, -1),
        ];
        match self {
            Neighborhood::Four => &FOUR,
            Neighborhood::Eight => &EIGHT,
        }
    }
}

/// Every foreground pixel of the mask, in row-major order.
pub fn seed_points(mask: &Mask) -> Vec<Point> {
    mask.enumerate_pixels()
        .filter(|(_, _, p)| p[0] != BACKGROUND)
        .map(|(x, y, _)| Point::new(x as i32, y as i32))
        .collect()
}

/// Visited bitmap sized to the frame.
pub(crate) struct Visited {
    width: u32,
    height: u32,
    bits: Vec<bool>,
}

impl Visited {
    pub(crate) fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            bits: vec![false; width as usize * height as usize],
        }
    }

    pub(crate) fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as u32) < self.width && (y as u32) < self.height
    }

    /// Marks the pixel, returning false if it was already marked.
    pub(crate) fn mark(&mut self, x: u32, y: u32) -> bool {
        let idx = y as usize * self.width as usize + x as usize;
        !std::mem::replace(&mut self.bits[idx], true)
    }
}

struct Pending {
    x: u32,
    y: u32,
    reference: [u8; 3],
    depth: u32,
}

fn within_tolerance(pixel: [u8; 3], reference: [u8; 3], tolerance: [u8; 3]) -> bool {
    hue_distance(pixel[0], reference[0]) <= tolerance[0]
        && pixel[1].abs_diff(reference[1]) <= tolerance[1]
        && pixel[2].abs_diff(reference[2]) <= tolerance[2]
}

/// Grow the mask outward from the seeds by color similarity.
///
/// Seeds are processed in the given order. A neighbor joins when each HSV
/// channel lies within `tolerance` of the color of the seed its region
/// started from. With a `max_depth`, it must also be at most that many steps
/// away from the seed; without one, a uniform region fills completely.
pub fn grow_regions(hsv: &HsvImage, mask: &mut Mask, seeds: &[Point], config: &RegionGrowingConfig) {
    if seeds.is_empty() {
        return;
    }

    let (width, height) = hsv.dimensions();
    let mut visited = Visited::new(width, height);
    let mut queue: VecDeque<Pending> = VecDeque::new();
    let offsets = config.connectivity.offsets();
    let mut grown = 0usize;

    for seed in seeds {
        if !visited.in_bounds(seed.x, seed.y) {
            continue;
        }
        let (sx, sy) = (seed.x as u32, seed.y as u32);
        if !visited.mark(sx, sy) {
            continue;
        }
        mask.put_pixel(sx, sy, Luma([FOREGROUND]));
        queue.push_back(Pending {
            x: sx,
            y: sy,
            reference: hsv.get_pixel(sx, sy).0,
            depth: 0,
        });

        while let Some(current) = queue.pop_front() {
            if config.max_depth.is_some_and(|max| current.depth >= max) {
                continue;
            }
            for (dx, dy) in offsets {
                let nx = current.x as i32 + dx;
                let ny = current.y as i32 + dy;
                if !visited.in_bounds(nx, ny) {
                    continue;
                }
                let (nx, ny) = (nx as u32, ny as u32);
                let color = hsv.get_pixel(nx, ny).0;
                if !within_tolerance(color, current.reference, config.tolerance) {
                    continue;
                }
                if !visited.mark(nx, ny) {
                    continue;
                }
                if mask.get_pixel(nx, ny)[0] == BACKGROUND {
                    grown += 1;
                }
                mask.put_pixel(nx, ny, Luma([FOREGROUND]));
                queue.push_back(Pending {
                    x: nx,
                    y: ny,
                    reference: current.reference,
                    depth: current.depth + 1,
                });
            }
        }
    }

    log::debug!("region growing: {} seeds, {} pixels added", seeds.len(), grown);
}

/// Background pixels reachable from the seeds through background, as a mask.
///
/// Seeds lying on foreground or outside the frame reach nothing.
pub fn flood_background(mask: &Mask, seeds: &[Point], connectivity: Neighborhood) -> Mask {
    let (width, height) = mask.dimensions();
    let mut reached = Mask::new(width, height);
    let mut visited = Visited::new(width, height);
    let mut queue: VecDeque<(u32, u32)> = VecDeque::new();

    for seed in seeds {
        if !visited.in_bounds(seed.x, seed.y) {
            continue;
        }
        let (sx, sy) = (seed.x as u32, seed.y as u32);
        if mask.get_pixel(sx, sy)[0] != BACKGROUND || !visited.mark(sx, sy) {
            continue;
        }
        reached.put_pixel(sx, sy, Luma([FOREGROUND]));
        queue.push_back((sx, sy));

        while let Some((x, y)) = queue.pop_front() {
            for (dx, dy) in connectivity.offsets() {
                let nx = x as i32 + dx;
                let ny = y as i32 + dy;
                if !visited.in_bounds(nx, ny) {
                    continue;
                }
                let (nx, ny) = (nx as u32, ny as u32);
                if mask.get_pixel(nx, ny)[0] != BACKGROUND || !visited.mark(nx, ny) {
                    continue;
                }
                reached.put_pixel(nx, ny, Luma([FOREGROUND]));
                queue.push_back((nx, ny));
            }
        }
    }

    reached
}
