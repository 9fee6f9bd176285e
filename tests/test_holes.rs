mod common;

use billiards_vision::config::HoleRepairConfig;
use billiards_vision::detection::holes::{fill_all_holes, fill_small_holes, mark_exterior, repair};
use common::*;

/// Foreground frame with a small, a large and a border-touching hole.
fn holey_mask() -> Mask {
    let mut mask = full_mask(80, 60);
    paint_rect(&mut mask, 10, 10, 5, 5, BACKGROUND);
    paint_rect(&mut mask, 40, 20, 15, 15, BACKGROUND);
    paint_rect(&mut mask, 0, 50, 6, 6, BACKGROUND);
    mask
}

#[test]
fn test_small_holes_filled_large_kept() {
    let mut mask = holey_mask();

    let filled = fill_small_holes(&mut mask, 90);
    assert_eq!(filled, 1);
    assert_eq!(mask.get_pixel(12, 12)[0], FOREGROUND);
    assert_eq!(mask.get_pixel(47, 27)[0], BACKGROUND);
    assert_eq!(mask.get_pixel(2, 52)[0], BACKGROUND);
}

#[test]
fn test_fill_all_holes_keeps_border_regions() {
    let mut mask = holey_mask();

    assert_eq!(fill_all_holes(&mut mask), 2);
    assert_eq!(mask.get_pixel(47, 27)[0], FOREGROUND);
    assert_eq!(mask.get_pixel(2, 52)[0], BACKGROUND);
}

#[test]
fn test_exterior_claimed_interior_left() {
    // A closed ring: outside touches the seed, inside is a large hole.
    let mut mask = blank_mask(50, 50);
    paint_rect(&mut mask, 10, 10, 30, 30, FOREGROUND);
    paint_rect(&mut mask, 12, 12, 26, 26, BACKGROUND);

    mark_exterior(&mut mask, Point::new(0, 0));
    assert_eq!(mask.get_pixel(0, 0)[0], FOREGROUND);
    assert_eq!(mask.get_pixel(49, 49)[0], FOREGROUND);
    assert_eq!(mask.get_pixel(25, 25)[0], BACKGROUND);
}

#[test]
fn test_exterior_seed_on_foreground_reaches_nothing() {
    let mut mask = blank_mask(30, 30);
    paint_rect(&mut mask, 0, 0, 5, 5, FOREGROUND);
    let before = mask.clone();

    mark_exterior(&mut mask, Point::new(0, 0));
    assert_eq!(mask, before);

    mark_exterior(&mut mask, Point::new(-3, 100));
    assert_eq!(mask, before);
}

#[test]
fn test_repair_is_idempotent() {
    let config = HoleRepairConfig::default();
    let mut mask = blank_mask(80, 60);
    paint_rect(&mut mask, 5, 5, 70, 50, FOREGROUND);
    paint_rect(&mut mask, 10, 10, 4, 4, BACKGROUND);
    paint_rect(&mut mask, 30, 20, 20, 20, BACKGROUND);

    repair(&mut mask, &config);
    let once = mask.clone();
    repair(&mut mask, &config);
    assert_eq!(mask, once);

    // The ball-sized hole survives, the rest is claimed.
    assert_eq!(once.get_pixel(40, 30)[0], BACKGROUND);
    assert_eq!(once.get_pixel(11, 11)[0], FOREGROUND);
    assert_eq!(once.get_pixel(0, 0)[0], FOREGROUND);
}
