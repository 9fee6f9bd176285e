use image::{ImageBuffer, Luma};
use imageproc::region_labelling::{connected_components, Connectivity};
use std::collections::{BTreeMap, HashMap};

use crate::models::{Mask, BACKGROUND, FOREGROUND};

/// Connected pixel region with its bounding box and extreme points.
#[derive(Debug, Clone)]
pub struct Region {
    pub label: u32,
    pub min_x: u32,
    pub min_y: u32,
    pub max_x: u32,
    pub max_y: u32,
    pub pixel_count: u32,
    /// Extreme pixels along the diagonals: min/max of x + y and of x - y.
    pub diagonal_extremes: [(u32, u32); 4],
    /// Leftmost and rightmost pixel column of every row.
    pub row_spans: BTreeMap<u32, (u32, u32)>,
}

impl Region {
    fn seeded(label: u32, x: u32, y: u32) -> Self {
        Self {
            label,
            min_x: x,
            min_y: y,
            max_x: x,
            max_y: y,
            pixel_count: 1,
            diagonal_extremes: [(x, y); 4],
            row_spans: BTreeMap::from([(y, (x, x))]),
        }
    }

    fn extend(&mut self, x: u32, y: u32) {
        self.min_x = self.min_x.min(x);
        self.min_y = self.min_y.min(y);
        self.max_x = self.max_x.max(x);
        self.max_y = self.max_y.max(y);
        self.pixel_count += 1;
        self.row_spans
            .entry(y)
            .and_modify(|(left, right)| {
                *left = (*left).min(x);
                *right = (*right).max(x);
            })
            .or_insert((x, x));

        let sum = |p: (u32, u32)| p.0 as i64 + p.1 as i64;
        let diff = |p: (u32, u32)| p.0 as i64 - p.1 as i64;
        let e = &mut self.diagonal_extremes;
        if sum((x, y)) < sum(e[0]) {
            e[0] = (x, y);
        }
        if sum((x, y)) > sum(e[1]) {
            e[1] = (x, y);
        }
        if diff((x, y)) < diff(e[2]) {
            e[2] = (x, y);
        }
        if diff((x, y)) > diff(e[3]) {
            e[3] = (x, y);
        }
    }

    pub fn width(&self) -> u32 {
        self.max_x - self.min_x + 1
    }

    pub fn height(&self) -> u32 {
        self.max_y - self.min_y + 1
    }

    pub fn touches_border(&self, width: u32, height: u32) -> bool {
        self.min_x == 0 || self.min_y == 0 || self.max_x + 1 >= width || self.max_y + 1 >= height
    }

    /// Diameter of the smallest circle enclosing the region's pixel centers.
    ///
    /// A single pixel measures 0.
    pub fn diameter(&self) -> f32 {
        // Hull vertices are always row-span endpoints.
        let points: Vec<(f64, f64)> = self
            .row_spans
            .iter()
            .flat_map(|(&y, &(left, right))| [(left as f64, y as f64), (right as f64, y as f64)])
            .collect();
        enclosing_circle(&points).map_or(0.0, |(_, radius)| (2.0 * radius) as f32)
    }
}

type Disk = ((f64, f64), f64);

fn covers(disk: &Disk, p: (f64, f64)) -> bool {
    let ((cx, cy), r) = *disk;
    (p.0 - cx).hypot(p.1 - cy) <= r + 1e-7
}

fn disk_through_two(a: (f64, f64), b: (f64, f64)) -> Disk {
    let center = ((a.0 + b.0) / 2.0, (a.1 + b.1) / 2.0);
    (center, (a.0 - b.0).hypot(a.1 - b.1) / 2.0)
}

fn disk_through_three(a: (f64, f64), b: (f64, f64), c: (f64, f64)) -> Disk {
    let (bx, by) = (b.0 - a.0, b.1 - a.1);
    let (cx, cy) = (c.0 - a.0, c.1 - a.1);
    let d = 2.0 * (bx * cy - by * cx);
    if d.abs() < 1e-12 {
        // Collinear: the widest pair spans the other point.
        return [disk_through_two(a, b), disk_through_two(a, c), disk_through_two(b, c)]
            .into_iter()
            .max_by(|x, y| x.1.total_cmp(&y.1))
            .unwrap_or(disk_through_two(a, b));
    }
    let b2 = bx * bx + by * by;
    let c2 = cx * cx + cy * cy;
    let ux = (cy * b2 - by * c2) / d;
    let uy = (bx * c2 - cx * b2) / d;
    ((a.0 + ux, a.1 + uy), ux.hypot(uy))
}

/// Minimum enclosing circle by incremental construction.
fn enclosing_circle(points: &[(f64, f64)]) -> Option<Disk> {
    let first = *points.first()?;
    let mut disk = (first, 0.0);
    for i in 1..points.len() {
        if covers(&disk, points[i]) {
            continue;
        }
        disk = (points[i], 0.0);
        for j in 0..i {
            if covers(&disk, points[j]) {
                continue;
            }
            disk = disk_through_two(points[i], points[j]);
            for k in 0..j {
                if !covers(&disk, points[k]) {
                    disk = disk_through_three(points[i], points[j], points[k]);
                }
            }
        }
    }
    Some(disk)
}

/// Labelled regions of one mask.
pub struct Regions {
    pub labels: ImageBuffer<Luma<u32>, Vec<u32>>,
    pub regions: Vec<Region>,
}

impl Regions {
    pub fn label_at(&self, x: u32, y: u32) -> u32 {
        self.labels.get_pixel(x, y)[0]
    }

    pub fn largest(&self) -> Option<&Region> {
        self.regions
            .iter()
            .max_by(|a, b| a.pixel_count.cmp(&b.pixel_count).then(b.label.cmp(&a.label)))
    }
}

/// Label connected foreground (255) regions.
pub fn foreground_regions(mask: &Mask, connectivity: Connectivity) -> Regions {
    label_regions(mask, connectivity, Luma([BACKGROUND]))
}

/// Label connected background (0) regions.
pub fn background_regions(mask: &Mask, connectivity: Connectivity) -> Regions {
    label_regions(mask, connectivity, Luma([FOREGROUND]))
}

fn label_regions(mask: &Mask, connectivity: Connectivity, ignored: Luma<u8>) -> Regions {
    let labels = connected_components(mask, connectivity, ignored);

    let mut by_label: HashMap<u32, Region> = HashMap::new();
    for (x, y, label) in labels.enumerate_pixels() {
        let label_val = label[0];
        if label_val == 0 {
            continue;
        }

        by_label
            .entry(label_val)
            .and_modify(|region| region.extend(x, y))
            .or_insert_with(|| Region::seeded(label_val, x, y));
    }

    let mut regions: Vec<Region> = by_label.into_values().collect();
    regions.sort_by_key(|r| r.label);

    Regions { labels, regions }
}
