mod common;

use billiards_vision::config::CircleFilterConfig;
use billiards_vision::detection::circles::{
    ball_coverage, filter_candidates, filter_close_dissimilar_circles, filter_empty_circles,
    filter_near_holes_circles, filter_out_of_bound_circles,
};
use common::*;

#[test]
fn test_out_of_bound_circle_removed() {
    let field = disk_mask(300, 300, (150, 150), 100);
    let circles = vec![Circle::new(5.0, 5.0, 10.0), Circle::new(150.0, 150.0, 10.0)];

    let kept = filter_out_of_bound_circles(circles, &field, 20);
    assert_eq!(kept, vec![Circle::new(150.0, 150.0, 10.0)]);
}

#[test]
fn test_circle_on_the_field_edge_removed() {
    let field = disk_mask(300, 300, (150, 150), 100);
    // Inside the field but within the margin of its boundary.
    let kept = filter_out_of_bound_circles(vec![Circle::new(245.0, 150.0, 10.0)], &field, 20);
    assert!(kept.is_empty());
}

#[test]
fn test_circle_near_pocket_removed() {
    let holes = vec![Point::new(40, 40)];
    let circles = vec![Circle::new(45.0, 45.0, 10.0), Circle::new(100.0, 100.0, 10.0)];

    let kept = filter_near_holes_circles(circles, &holes, 27.0);
    assert_eq!(kept, vec![Circle::new(100.0, 100.0, 10.0)]);
}

#[test]
fn test_no_pockets_keeps_everything() {
    let circles = vec![Circle::new(45.0, 45.0, 10.0)];
    assert_eq!(filter_near_holes_circles(circles.clone(), &[], 27.0), circles);
}

#[test]
fn test_smaller_lower_duplicate_removed() {
    let circles = vec![Circle::new(50.0, 50.0, 12.0), Circle::new(50.0, 58.0, 6.0)];

    let kept = filter_close_dissimilar_circles(circles, 25.0, 25.0, 2.0);
    assert_eq!(kept, vec![Circle::new(50.0, 50.0, 12.0)]);
}

#[test]
fn test_smaller_upper_neighbor_kept() {
    // The smaller circle lies above the larger one, so neither is dropped.
    let circles = vec![Circle::new(50.0, 58.0, 12.0), Circle::new(50.0, 50.0, 6.0)];

    let kept = filter_close_dissimilar_circles(circles.clone(), 25.0, 25.0, 2.0);
    assert_eq!(kept, circles);
}

#[test]
fn test_similar_neighbors_kept() {
    let circles = vec![Circle::new(50.0, 50.0, 12.0), Circle::new(60.0, 55.0, 11.0)];

    let kept = filter_close_dissimilar_circles(circles.clone(), 25.0, 25.0, 2.0);
    assert_eq!(kept, circles);
}

#[test]
fn test_circle_on_claimed_surface_removed() {
    let surface = surface_with_holes(150, 150, &[((50, 50), 12)]);
    let circles = vec![Circle::new(50.0, 50.0, 12.0), Circle::new(100.0, 100.0, 12.0)];

    assert!(ball_coverage(&circles[0], &surface) > 0.95);
    assert_eq!(ball_coverage(&circles[1], &surface), 0.0);

    let kept = filter_empty_circles(circles, &surface, 0.6);
    assert_eq!(kept, vec![Circle::new(50.0, 50.0, 12.0)]);
}

#[test]
fn test_circle_outside_frame_has_no_coverage() {
    let surface = blank_mask(50, 50);
    assert_eq!(ball_coverage(&Circle::new(-40.0, -40.0, 5.0), &surface), 0.0);
}

#[test]
fn test_filters_run_in_order() {
    let surface = surface_with_holes(
        300,
        300,
        &[((150, 150), 12), ((35, 150), 12), ((150, 60), 12)],
    );
    let field = FieldLocalization {
        mask: disk_mask(300, 300, (150, 150), 120),
        holes: vec![Point::new(150, 45)],
        lines: Vec::new(),
    };
    let circles = vec![
        Circle::new(150.0, 150.0, 12.0),
        // on claimed felt
        Circle::new(200.0, 200.0, 12.0),
        // a real hole, but too close to the field edge
        Circle::new(35.0, 150.0, 12.0),
        // a real hole next to a pocket
        Circle::new(150.0, 60.0, 12.0),
    ];

    let kept = filter_candidates(circles, &surface, &field, &CircleFilterConfig::default());
    assert_eq!(kept, vec![Circle::new(150.0, 150.0, 12.0)]);
}
