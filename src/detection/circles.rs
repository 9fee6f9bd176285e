use crate::config::CircleFilterConfig;
use crate::detection::preprocessing::shrink;
use crate::models::{Circle, FieldLocalization, Mask, Point, BACKGROUND};

/// Share of the circle's disk not claimed by the surface mask.
///
/// Zero for disks lying entirely outside the frame.
pub fn ball_coverage(circle: &Circle, surface: &Mask) -> f32 {
    let pixels = circle.disk_pixels(surface.width(), surface.height());
    if pixels.is_empty() {
        return 0.0;
    }
    let unclaimed = pixels
        .iter()
        .filter(|(x, y)| surface.get_pixel(*x, *y)[0] == BACKGROUND)
        .count();
    unclaimed as f32 / pixels.len() as f32
}

/// Drop circles sitting mostly on claimed surface.
pub fn filter_empty_circles(circles: Vec<Circle>, surface: &Mask, min_coverage: f32) -> Vec<Circle> {
    circles
        .into_iter()
        .filter(|c| ball_coverage(c, surface) >= min_coverage)
        .collect()
}

/// Drop circles whose center is not inside the field shrunk by `margin`.
pub fn filter_out_of_bound_circles(circles: Vec<Circle>, field_mask: &Mask, margin: u32) -> Vec<Circle> {
    let shrunk = shrink(field_mask, margin);
    circles
        .into_iter()
        .filter(|c| {
            let center = c.center();
            center.x >= 0
                && center.y >= 0
                && (center.x as u32) < shrunk.width()
                && (center.y as u32) < shrunk.height()
                && shrunk.get_pixel(center.x as u32, center.y as u32)[0] != BACKGROUND
        })
        .collect()
}

/// Drop circles whose center is closer than `distance` to a pocket.
pub fn filter_near_holes_circles(circles: Vec<Circle>, holes: &[Point], distance: f32) -> Vec<Circle> {
    circles
        .into_iter()
        .filter(|c| {
            let center = c.center();
            holes.iter().all(|hole| hole.distance(center) >= distance)
        })
        .collect()
}

/// Drop the smaller, lower circle of near-duplicate pairs.
///
/// For every ordered pair (i, j) closer than `neighborhood` in (x, y, r),
/// j is removed when it lies below i by less than `vertical_distance` and
/// its radius is more than `radius_gap` smaller.
pub fn filter_close_dissimilar_circles(
    circles: Vec<Circle>,
    neighborhood: f32,
    vertical_distance: f32,
    radius_gap: f32,
) -> Vec<Circle> {
    let mut remove = vec![false; circles.len()];

    for (i, upper) in circles.iter().enumerate() {
        for (j, lower) in circles.iter().enumerate() {
            if i == j || upper.vector_distance(lower) >= neighborhood {
                continue;
            }
            if lower.y > upper.y
                && (lower.y - upper.y).abs() < vertical_distance
                && upper.radius - lower.radius > radius_gap
            {
                remove[j] = true;
            }
        }
    }

    circles
        .into_iter()
        .enumerate()
        .filter_map(|(index, circle)| (!remove[index]).then_some(circle))
        .collect()
}

/// Run the four filters in order.
pub fn filter_candidates(
    circles: Vec<Circle>,
    surface: &Mask,
    field: &FieldLocalization,
    config: &CircleFilterConfig,
) -> Vec<Circle> {
    let detected = circles.len();
    let circles = filter_empty_circles(circles, surface, config.min_ball_coverage);
    let after_empty = circles.len();
    let circles = filter_out_of_bound_circles(circles, &field.mask, config.field_margin);
    let after_bounds = circles.len();
    let circles = filter_near_holes_circles(circles, &field.holes, config.hole_distance);
    let after_holes = circles.len();
    let circles = filter_close_dissimilar_circles(
        circles,
        config.neighborhood,
        config.vertical_distance,
        config.radius_gap,
    );

    log::debug!(
        "circle filters: {} detected, {} filled, {} in bounds, {} away from pockets, {} after dedup",
        detected,
        after_empty,
        after_bounds,
        after_holes,
        circles.len()
    );
    circles
}
