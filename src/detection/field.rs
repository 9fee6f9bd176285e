use image::{ImageBuffer, Luma, RgbImage};
use imageproc::distance_transform::Norm;
use imageproc::hough::{detect_lines, LineDetectionOptions};
use imageproc::morphology::{close, open};
use imageproc::region_labelling::Connectivity;

use crate::config::FieldConfig;
use crate::detection::color::to_hsv;
use crate::detection::holes::fill_all_holes;
use crate::detection::kmeans::{kmeans, KMeansParams};
use crate::detection::preprocessing::{apply_blur, detect_edges};
use crate::detection::regions::{foreground_regions, Region};
use crate::error::{LocalizeError, Result};
use crate::models::{FieldLocalization, HsvImage, Line, Mask, Point, BACKGROUND, FOREGROUND};
use crate::pipeline::DebugSink;

/// Locate the playing surface, its rail lines and its pockets.
pub fn localize_field(frame: &RgbImage, config: &FieldConfig, sink: &dyn DebugSink) -> Result<FieldLocalization> {
    let (width, height) = frame.dimensions();
    if width == 0 || height == 0 {
        return Err(LocalizeError::EmptyFrame);
    }

    let blurred = apply_blur(frame, config.blur_sigma);
    let hsv = to_hsv(&blurred);

    let felt = felt_cluster_mask(&hsv, config);
    sink.mask("field_clusters", &felt);

    let mut mask = felt;
    if config.open_radius > 0 {
        mask = open(&mask, Norm::L1, config.open_radius);
    }
    if config.close_radius > 0 {
        mask = close(&mask, Norm::LInf, config.close_radius);
    }

    let (mask, surface) = keep_largest_region(&mask);
    sink.mask("field_mask", &mask);

    let edges = detect_edges(&mask, config.canny_low, config.canny_high);
    sink.mask("field_edges", &edges);

    let raw: Vec<Line> = detect_lines(
        &edges,
        LineDetectionOptions {
            vote_threshold: config.line_votes,
            suppression_radius: config.line_suppression,
        },
    )
    .into_iter()
    .map(|l| Line::new(l.r, (l.angle_in_degrees as f32).to_radians()))
    .collect();
    let raw_count = raw.len();
    let lines = merge_lines(raw, config.merge_rho, config.merge_theta);

    let holes = match &surface {
        Some(region) => pocket_points(&lines, region, width, height, config.side_pockets),
        None => Vec::new(),
    };

    log::debug!(
        "field: {} raw lines, {} merged, {} pockets",
        raw_count,
        lines.len(),
        holes.len()
    );

    Ok(FieldLocalization { mask, holes, lines })
}

/// Cluster the frame colors and mask the cluster of the frame-center pixel.
fn felt_cluster_mask(hsv: &HsvImage, config: &FieldConfig) -> Mask {
    let (width, height) = hsv.dimensions();
    let stride = config.sample_stride.max(1);
    let as_vector = |p: [u8; 3]| [p[0] as f32, p[1] as f32, p[2] as f32];

    let mut samples = Vec::new();
    for y in (0..height).step_by(stride as usize) {
        for x in (0..width).step_by(stride as usize) {
            samples.push(as_vector(hsv.get_pixel(x, y).0));
        }
    }

    let params = KMeansParams {
        k: config.clusters,
        max_iterations: config.max_iterations,
        attempts: config.attempts,
        epsilon: config.epsilon,
        seed: config.seed,
    };
    let Some(clustering) = kmeans(&samples, &params) else {
        return Mask::new(width, height);
    };

    let felt = clustering.nearest(as_vector(hsv.get_pixel(width / 2, height / 2).0));
    ImageBuffer::from_fn(width, height, |x, y| {
        if clustering.nearest(as_vector(hsv.get_pixel(x, y).0)) == felt {
            Luma([FOREGROUND])
        } else {
            Luma([BACKGROUND])
        }
    })
}

/// Keep only the largest 8-connected region, with its interior holes filled.
fn keep_largest_region(mask: &Mask) -> (Mask, Option<Region>) {
    let found = foreground_regions(mask, Connectivity::Eight);
    let Some(largest) = found.largest().cloned() else {
        return (Mask::new(mask.width(), mask.height()), None);
    };

    let mut kept = ImageBuffer::from_fn(mask.width(), mask.height(), |x, y| {
        if found.label_at(x, y) == largest.label {
            Luma([FOREGROUND])
        } else {
            Luma([BACKGROUND])
        }
    });
    fill_all_holes(&mut kept);
    (kept, Some(largest))
}

/// Merge near-duplicate lines into their component-wise mean.
///
/// Repeatedly takes the last line, gathers every remaining line within
/// `rho_tolerance` and `theta_tolerance` of it, and emits their mean.
pub fn merge_lines(mut lines: Vec<Line>, rho_tolerance: f32, theta_tolerance: f32) -> Vec<Line> {
    let mut merged = Vec::new();
    while let Some(reference) = lines.pop() {
        let mut group = vec![reference];
        let mut i = 0;
        while i < lines.len() {
            let line = lines[i];
            if (line.rho - reference.rho).abs() < rho_tolerance
                && (line.theta - reference.theta).abs() < theta_tolerance
            {
                group.push(lines.remove(i));
            } else {
                i += 1;
            }
        }

        let n = group.len() as f32;
        let rho = group.iter().map(|l| l.rho).sum::<f32>() / n;
        let theta = group.iter().map(|l| l.theta).sum::<f32>() / n;
        merged.push(Line::new(rho, theta));
    }
    merged
}

/// Table corners as top-left, top-right, bottom-right, bottom-left.
type Corners = [(f32, f32); 4];

/// Corners from the outermost near-horizontal and near-vertical rail lines.
fn rail_corners(lines: &[Line], width: u32, height: u32) -> Option<Corners> {
    let (mid_x, mid_y) = (width as f32 / 2.0, height as f32 / 2.0);
    let mut horizontal: Vec<(f32, Line)> = Vec::new();
    let mut vertical: Vec<(f32, Line)> = Vec::new();
    for line in lines {
        let (c, s) = (line.theta.cos(), line.theta.sin());
        if s.abs() >= std::f32::consts::FRAC_1_SQRT_2 {
            horizontal.push(((line.rho - mid_x * c) / s, *line));
        } else {
            vertical.push(((line.rho - mid_y * s) / c, *line));
        }
    }
    if horizontal.len() < 2 || vertical.len() < 2 {
        return None;
    }

    let by_offset = |a: &(f32, Line), b: &(f32, Line)| a.0.total_cmp(&b.0);
    let top = horizontal.iter().min_by(|a, b| by_offset(a, b))?;
    let bottom = horizontal.iter().max_by(|a, b| by_offset(a, b))?;
    let left = vertical.iter().min_by(|a, b| by_offset(a, b))?;
    let right = vertical.iter().max_by(|a, b| by_offset(a, b))?;
    if bottom.0 - top.0 < 1.0 || right.0 - left.0 < 1.0 {
        return None;
    }

    let corners = [
        top.1.intersection(&left.1)?,
        top.1.intersection(&right.1)?,
        bottom.1.intersection(&right.1)?,
        bottom.1.intersection(&left.1)?,
    ];
    let (w, h) = (width as f32, height as f32);
    let plausible = corners
        .iter()
        .all(|(x, y)| *x >= -w && *x <= 2.0 * w && *y >= -h && *y <= 2.0 * h);
    plausible.then_some(corners)
}

/// Corners from the region's diagonal extreme pixels.
fn extreme_corners(region: &Region) -> Corners {
    let [min_sum, max_sum, min_diff, max_diff] = region.diagonal_extremes;
    let f = |p: (u32, u32)| (p.0 as f32, p.1 as f32);
    [f(min_sum), f(max_diff), f(max_sum), f(min_diff)]
}

fn midpoint(a: (f32, f32), b: (f32, f32)) -> (f32, f32) {
    ((a.0 + b.0) / 2.0, (a.1 + b.1) / 2.0)
}

fn length(a: (f32, f32), b: (f32, f32)) -> f32 {
    ((a.0 - b.0).powi(2) + (a.1 - b.1).powi(2)).sqrt()
}

/// Pockets at the four table corners and, optionally, the middle of the long rails.
pub fn pocket_points(lines: &[Line], surface: &Region, width: u32, height: u32, side_pockets: bool) -> Vec<Point> {
    let [tl, tr, br, bl] = rail_corners(lines, width, height).unwrap_or_else(|| extreme_corners(surface));

    let mut pockets = vec![tl, tr, br, bl];
    if side_pockets {
        let horizontal_rails = length(tl, tr) + length(bl, br);
        let vertical_rails = length(tl, bl) + length(tr, br);
        if horizontal_rails >= vertical_rails {
            pockets.push(midpoint(tl, tr));
            pockets.push(midpoint(bl, br));
        } else {
            pockets.push(midpoint(tl, bl));
            pockets.push(midpoint(tr, br));
        }
    }

    pockets
        .into_iter()
        .map(|(x, y)| Point::new(x.round() as i32, y.round() as i32))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn rail_corners_from_rectangle_lines() {
        let lines = vec![
            Line::new(40.0, FRAC_PI_2),
            Line::new(260.0, FRAC_PI_2),
            Line::new(30.0, 0.0),
            Line::new(370.0, 0.0),
        ];
        let corners = rail_corners(&lines, 400, 300).unwrap();
        let expected = [(30.0, 40.0), (370.0, 40.0), (370.0, 260.0), (30.0, 260.0)];
        for (got, want) in corners.iter().zip(expected) {
            assert_abs_diff_eq!(got.0, want.0, epsilon = 1e-2);
            assert_abs_diff_eq!(got.1, want.1, epsilon = 1e-2);
        }
    }

    #[test]
    fn too_few_lines_have_no_rail_corners() {
        let lines = vec![Line::new(40.0, FRAC_PI_2), Line::new(30.0, 0.0)];
        assert!(rail_corners(&lines, 400, 300).is_none());
    }
}
