mod common;

use billiards_vision::config::RegionGrowingConfig;
use billiards_vision::detection::preprocessing::count_foreground;
use billiards_vision::detection::region_growing::{grow_regions, seed_points, Neighborhood};
use common::*;
use image::{Luma, Rgb};

fn single_seed(width: u32, height: u32, x: u32, y: u32) -> Mask {
    let mut mask = blank_mask(width, height);
    mask.put_pixel(x, y, Luma([FOREGROUND]));
    mask
}

#[test]
fn test_uniform_image_fills_from_one_seed() {
    let hsv = HsvImage::from_pixel(24, 24, Rgb([60, 180, 140]));
    let mut mask = single_seed(24, 24, 0, 0);
    let seeds = seed_points(&mask);
    assert_eq!(seeds, vec![Point::new(0, 0)]);

    grow_regions(&hsv, &mut mask, &seeds, &RegionGrowingConfig::default());
    assert_eq!(count_foreground(&mask), 24 * 24);
}

#[test]
fn test_uniform_large_image_fills_from_a_corner() {
    // Far more steps from the corner than any small fixed budget allows.
    let hsv = HsvImage::from_pixel(200, 200, Rgb([60, 180, 140]));
    let mut mask = single_seed(200, 200, 0, 0);
    let seeds = seed_points(&mask);

    grow_regions(&hsv, &mut mask, &seeds, &RegionGrowingConfig::default());
    assert_eq!(count_foreground(&mask), 200 * 200);
}

#[test]
fn test_growth_stops_at_color_boundary() {
    let hsv = HsvImage::from_fn(40, 20, |x, _| {
        if x < 20 {
            Rgb([60, 180, 140])
        } else {
            Rgb([0, 200, 200])
        }
    });
    let mut mask = single_seed(40, 20, 5, 10);
    let seeds = seed_points(&mask);

    grow_regions(&hsv, &mut mask, &seeds, &RegionGrowingConfig::default());
    assert_eq!(count_foreground(&mask), 20 * 20);
    assert_eq!(mask.get_pixel(19, 0)[0], FOREGROUND);
    assert_eq!(mask.get_pixel(20, 0)[0], BACKGROUND);
}

#[test]
fn test_tolerance_is_relative_to_the_seed() {
    // A gradient of one value step per column: neighbors always match each
    // other, but only four columns match the seed.
    let hsv = HsvImage::from_fn(20, 5, |x, _| Rgb([60, 180, 100 + x as u8]));
    let mut mask = single_seed(20, 5, 0, 2);
    let seeds = seed_points(&mask);

    grow_regions(&hsv, &mut mask, &seeds, &RegionGrowingConfig::default());
    assert_eq!(mask.get_pixel(4, 2)[0], FOREGROUND);
    assert_eq!(mask.get_pixel(5, 2)[0], BACKGROUND);
}

#[test]
fn test_depth_limit() {
    let hsv = HsvImage::from_pixel(21, 21, Rgb([60, 180, 140]));
    let config = RegionGrowingConfig {
        max_depth: Some(3),
        ..RegionGrowingConfig::default()
    };

    let mut mask = single_seed(21, 21, 10, 10);
    let seeds = seed_points(&mask);
    grow_regions(&hsv, &mut mask, &seeds, &config);
    // Diamond of L1 radius 3.
    assert_eq!(count_foreground(&mask), 25);

    let config = RegionGrowingConfig {
        connectivity: Neighborhood::Eight,
        ..config
    };
    let mut mask = single_seed(21, 21, 10, 10);
    let seeds = seed_points(&mask);
    grow_regions(&hsv, &mut mask, &seeds, &config);
    // Square of Chebyshev radius 3.
    assert_eq!(count_foreground(&mask), 49);
}

#[test]
fn test_empty_seed_list_is_a_no_op() {
    let hsv = HsvImage::from_pixel(10, 10, Rgb([60, 180, 140]));
    let mut mask = blank_mask(10, 10);

    grow_regions(&hsv, &mut mask, &[], &RegionGrowingConfig::default());
    assert_eq!(mask, blank_mask(10, 10));
}

#[test]
fn test_hue_tolerance_wraps_around() {
    let hsv = HsvImage::from_fn(10, 1, |x, _| {
        if x < 5 {
            Rgb([178, 200, 200])
        } else {
            Rgb([1, 200, 200])
        }
    });
    let mut mask = single_seed(10, 1, 0, 0);
    let seeds = seed_points(&mask);
    grow_regions(&hsv, &mut mask, &seeds, &RegionGrowingConfig::default());
    assert_eq!(count_foreground(&mask), 10);
}
