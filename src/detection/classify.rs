use std::cmp::Ordering;

use image::{GrayImage, Luma, RgbImage};
use imageproc::region_labelling::Connectivity;

use crate::config::ClassifierConfig;
use crate::detection::color::HsvRange;
use crate::detection::regions::foreground_regions;
use crate::error::{LocalizeError, Result};
use crate::models::{
    BallLocalization, BallsLocalization, Circle, HsvImage, Mask, BACKGROUND, FOREGROUND,
};

/// Disk pixels of a circle not claimed by the surface mask.
pub fn ball_pixels(circle: &Circle, surface: &Mask) -> Vec<(u32, u32)> {
    circle
        .disk_pixels(surface.width(), surface.height())
        .into_iter()
        .filter(|(x, y)| surface.get_pixel(*x, *y)[0] == BACKGROUND)
        .collect()
}

/// Share of the ball's pixels inside the HSV range; 0 for an empty ball.
pub fn color_ratio(hsv: &HsvImage, surface: &Mask, circle: &Circle, range: &HsvRange) -> f32 {
    let pixels = ball_pixels(circle, surface);
    if pixels.is_empty() {
        return 0.0;
    }
    let hits = pixels
        .iter()
        .filter(|(x, y)| range.contains(hsv.get_pixel(*x, *y).0))
        .count();
    hits as f32 / pixels.len() as f32
}

/// White share of the ball after discarding white blobs narrower than
/// `min_glint_diameter`.
pub fn stripe_ratio(
    hsv: &HsvImage,
    surface: &Mask,
    circle: &Circle,
    range: &HsvRange,
    min_glint_diameter: f32,
) -> f32 {
    let pixels = ball_pixels(circle, surface);
    if pixels.is_empty() {
        return 0.0;
    }

    let min_x = pixels.iter().map(|p| p.0).min().unwrap_or(0);
    let min_y = pixels.iter().map(|p| p.1).min().unwrap_or(0);
    let max_x = pixels.iter().map(|p| p.0).max().unwrap_or(0);
    let max_y = pixels.iter().map(|p| p.1).max().unwrap_or(0);

    let mut white = GrayImage::new(max_x - min_x + 1, max_y - min_y + 1);
    for (x, y) in &pixels {
        if range.contains(hsv.get_pixel(*x, *y).0) {
            white.put_pixel(x - min_x, y - min_y, Luma([FOREGROUND]));
        }
    }

    let found = foreground_regions(&white, Connectivity::Eight);
    let kept: u32 = found
        .regions
        .iter()
        .filter(|r| r.diameter() >= min_glint_diameter)
        .map(|r| r.pixel_count)
        .sum();
    kept as f32 / pixels.len() as f32
}

/// Mean over the ball of the squared RGB distance from pure white.
pub fn white_distance(frame: &RgbImage, surface: &Mask, circle: &Circle) -> f64 {
    let pixels = ball_pixels(circle, surface);
    if pixels.is_empty() {
        return f64::INFINITY;
    }
    let total: f64 = pixels
        .iter()
        .map(|(x, y)| {
            frame
                .get_pixel(*x, *y)
                .0
                .iter()
                .map(|&c| (255.0 - c as f64).powi(2))
                .sum::<f64>()
        })
        .sum();
    total / pixels.len() as f64
}

/// Per-circle statistics used to pick the cue ball.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CueScore {
    pub circle: Circle,
    pub white_ratio: f32,
    pub white_distance: f64,
}

fn position_order(a: &Circle, b: &Circle) -> Ordering {
    a.y.total_cmp(&b.y)
        .then(a.x.total_cmp(&b.x))
        .then(a.radius.total_cmp(&b.radius))
}

/// Index of the cue ball among the scores.
///
/// The whitest circle wins outright when it leads the runner-up by more than
/// `margin`; otherwise the one of the two closer to pure white wins. The
/// result does not depend on the order of `scores`.
pub fn select_cue(scores: &[CueScore], margin: f32) -> Option<usize> {
    let mut ranked: Vec<usize> = (0..scores.len()).collect();
    ranked.sort_by(|&a, &b| {
        scores[b]
            .white_ratio
            .total_cmp(&scores[a].white_ratio)
            .then_with(|| position_order(&scores[a].circle, &scores[b].circle))
    });

    let first = *ranked.first()?;
    let Some(&second) = ranked.get(1) else {
        return Some(first);
    };

    if scores[first].white_ratio - scores[second].white_ratio > margin {
        return Some(first);
    }
    if scores[second].white_distance < scores[first].white_distance {
        Some(second)
    } else {
        Some(first)
    }
}

/// Index of the highest-scoring circle if its score exceeds `min_ratio`.
pub fn select_black(circles: &[Circle], ratios: &[f32], min_ratio: f32) -> Option<usize> {
    (0..ratios.len())
        .max_by(|&a, &b| {
            ratios[a]
                .total_cmp(&ratios[b])
                .then_with(|| position_order(&circles[b], &circles[a]))
        })
        .filter(|&i| ratios[i] > min_ratio)
}

/// Assign the filtered circles to cue, eight-ball, stripes and solids.
///
/// `frame` is the masked RGB frame and `hsv` its HSV conversion; `surface`
/// is the refined mask in which balls are unclaimed.
pub fn classify_balls(
    frame: &RgbImage,
    hsv: &HsvImage,
    surface: &Mask,
    circles: &[Circle],
    config: &ClassifierConfig,
) -> Result<BallsLocalization> {
    let scores: Vec<CueScore> = circles
        .iter()
        .map(|c| CueScore {
            circle: *c,
            white_ratio: color_ratio(hsv, surface, c, &config.cue_white),
            white_distance: white_distance(frame, surface, c),
        })
        .collect();
    let cue_index = select_cue(&scores, config.cue_margin).ok_or(LocalizeError::NoBallsDetected)?;

    let others: Vec<usize> = (0..circles.len()).filter(|&i| i != cue_index).collect();
    let other_circles: Vec<Circle> = others.iter().map(|&i| circles[i]).collect();
    let black_ratios: Vec<f32> = other_circles
        .iter()
        .map(|c| color_ratio(hsv, surface, c, &config.black))
        .collect();
    let black_index =
        select_black(&other_circles, &black_ratios, config.black_min_ratio).map(|i| others[i]);

    let mut solids = Vec::new();
    let mut stripes = Vec::new();
    for (i, circle) in circles.iter().enumerate() {
        if i == cue_index || Some(i) == black_index {
            continue;
        }
        let ratio = stripe_ratio(
            hsv,
            surface,
            circle,
            &config.stripe_white,
            config.min_glint_diameter,
        );
        if ratio >= config.stripe_min_ratio && ratio <= config.stripe_max_ratio {
            stripes.push(BallLocalization::from(*circle));
        } else {
            solids.push(BallLocalization::from(*circle));
        }
    }

    log::debug!(
        "classifier: cue {:?}, black {}, {} stripes, {} solids",
        circles[cue_index],
        if black_index.is_some() { "found" } else { "absent" },
        stripes.len(),
        solids.len()
    );

    Ok(BallsLocalization {
        cue: BallLocalization::from(circles[cue_index]),
        black: black_index.map(|i| BallLocalization::from(circles[i])),
        solids,
        stripes,
    })
}
