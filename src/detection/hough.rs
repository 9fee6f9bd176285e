use imageproc::gradients::{horizontal_sobel, vertical_sobel};

use crate::config::HoughConfig;
use crate::detection::preprocessing::{blur_mask, detect_edges};
use crate::models::{Circle, Mask};

struct EdgePoint {
    x: f32,
    y: f32,
}

struct Peak {
    x: u32,
    y: u32,
    votes: u32,
}

/// Detect ball-sized circles along the boundaries of a binary mask.
///
/// Every edge pixel votes for centers at each radius of the band along both
/// directions of its gradient. Circles come out strongest first.
pub fn detect_circles(mask: &Mask, config: &HoughConfig) -> Vec<Circle> {
    let (width, height) = mask.dimensions();
    if width == 0 || height == 0 || config.min_radius > config.max_radius {
        return Vec::new();
    }

    let edges = detect_edges(mask, config.canny_low, config.canny_high);
    let smooth = blur_mask(mask, config.gradient_sigma);
    let gx = horizontal_sobel(&smooth);
    let gy = vertical_sobel(&smooth);

    let w = width as usize;
    let mut accumulator = vec![0u32; w * height as usize];
    let mut edge_points = Vec::new();

    for (x, y, edge) in edges.enumerate_pixels() {
        if edge[0] == 0 {
            continue;
        }
        let dx = gx.get_pixel(x, y)[0] as f32;
        let dy = gy.get_pixel(x, y)[0] as f32;
        let magnitude = (dx * dx + dy * dy).sqrt();
        edge_points.push(EdgePoint {
            x: x as f32,
            y: y as f32,
        });
        if magnitude < f32::EPSILON {
            continue;
        }
        let (ux, uy) = (dx / magnitude, dy / magnitude);

        for r in config.min_radius..=config.max_radius {
            for sign in [1.0f32, -1.0] {
                let cx = (x as f32 + sign * r as f32 * ux).round();
                let cy = (y as f32 + sign * r as f32 * uy).round();
                if cx >= 0.0 && cy >= 0.0 && cx < width as f32 && cy < height as f32 {
                    accumulator[cy as usize * w + cx as usize] += 1;
                }
            }
        }
    }

    let summed = box_sum(&accumulator, width, height);
    let mut peaks = local_maxima(&summed, width, height, config.min_votes);
    peaks.sort_by(|a, b| b.votes.cmp(&a.votes).then(a.y.cmp(&b.y)).then(a.x.cmp(&b.x)));

    let mut circles: Vec<Circle> = Vec::new();
    for peak in peaks {
        let (cx, cy) = refine_center(&accumulator, width, height, &peak);
        let too_close = circles.iter().any(|c| {
            let dx = c.x - cx;
            let dy = c.y - cy;
            (dx * dx + dy * dy).sqrt() < config.min_center_distance
        });
        if too_close {
            continue;
        }
        if let Some(radius) = estimate_radius(&edge_points, cx, cy, config) {
            circles.push(Circle::new(cx, cy, radius));
        }
    }

    log::debug!(
        "hough: {} edge pixels, {} circles",
        edge_points.len(),
        circles.len()
    );
    circles
}

/// 3x3 box sum of the accumulator.
fn box_sum(acc: &[u32], width: u32, height: u32) -> Vec<u32> {
    let (w, h) = (width as i64, height as i64);
    let mut out = vec![0u32; acc.len()];
    for y in 0..h {
        for x in 0..w {
            let mut total = 0;
            for ny in (y - 1).max(0)..=(y + 1).min(h - 1) {
                for nx in (x - 1).max(0)..=(x + 1).min(w - 1) {
                    total += acc[(ny * w + nx) as usize];
                }
            }
            out[(y * w + x) as usize] = total;
        }
    }
    out
}

/// Cells at or above `min_votes` that dominate their 3x3 neighborhood.
///
/// On plateaus the first cell in scan order wins.
fn local_maxima(summed: &[u32], width: u32, height: u32, min_votes: u32) -> Vec<Peak> {
    let (w, h) = (width as i64, height as i64);
    let mut peaks = Vec::new();
    for y in 0..h {
        for x in 0..w {
            let idx = (y * w + x) as usize;
            let votes = summed[idx];
            if votes < min_votes.max(1) {
                continue;
            }
            let mut is_peak = true;
            'scan: for ny in (y - 1).max(0)..=(y + 1).min(h - 1) {
                for nx in (x - 1).max(0)..=(x + 1).min(w - 1) {
                    let nidx = (ny * w + nx) as usize;
                    if nidx == idx {
                        continue;
                    }
                    let other = summed[nidx];
                    let earlier = nidx < idx;
                    if other > votes || (earlier && other == votes) {
                        is_peak = false;
                        break 'scan;
                    }
                }
            }
            if is_peak {
                peaks.push(Peak {
                    x: x as u32,
                    y: y as u32,
                    votes,
                });
            }
        }
    }
    peaks
}

/// Vote-weighted centroid of the raw accumulator around a peak.
fn refine_center(acc: &[u32], width: u32, height: u32, peak: &Peak) -> (f32, f32) {
    let (w, h) = (width as i64, height as i64);
    let (px, py) = (peak.x as i64, peak.y as i64);
    let (mut sx, mut sy, mut total) = (0.0f32, 0.0f32, 0.0f32);
    for ny in (py - 1).max(0)..=(py + 1).min(h - 1) {
        for nx in (px - 1).max(0)..=(px + 1).min(w - 1) {
            let v = acc[(ny * w + nx) as usize] as f32;
            sx += v * nx as f32;
            sy += v * ny as f32;
            total += v;
        }
    }
    if total > 0.0 {
        (sx / total, sy / total)
    } else {
        (peak.x as f32, peak.y as f32)
    }
}

/// Radius in the band with the most edge support around the center.
fn estimate_radius(edges: &[EdgePoint], cx: f32, cy: f32, config: &HoughConfig) -> Option<f32> {
    let reach = config.max_radius as f32 + 1.0;
    let distances: Vec<f32> = edges
        .iter()
        .filter(|e| (e.x - cx).abs() <= reach && (e.y - cy).abs() <= reach)
        .map(|e| ((e.x - cx).powi(2) + (e.y - cy).powi(2)).sqrt())
        .filter(|d| *d <= reach)
        .collect();

    let mut best: Option<(u32, usize)> = None;
    for r in config.min_radius..=config.max_radius {
        let support = distances.iter().filter(|d| (**d - r as f32).abs() < 1.0).count();
        if best.is_none_or(|(_, s)| support > s) {
            best = Some((r, support));
        }
    }

    let (r, support) = best?;
    let circumference = 2.0 * std::f32::consts::PI * r as f32;
    if (support as f32) < config.min_edge_coverage * circumference || support == 0 {
        return None;
    }

    let near: Vec<f32> = distances
        .into_iter()
        .filter(|d| (*d - r as f32).abs() < 1.0)
        .collect();
    Some(near.iter().sum::<f32>() / near.len() as f32)
}
