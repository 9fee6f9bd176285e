use billiards_vision::models::{Mask, BACKGROUND, FOREGROUND};
use image::{Luma, Rgb, RgbImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_filled_rect_mut};
use imageproc::rect::Rect;

pub const SCENE_WIDTH: u32 = 400;
pub const SCENE_HEIGHT: u32 = 300;
pub const BALL_RADIUS: i32 = 12;

/// Felt area of the synthetic table, inclusive.
pub const FELT_MIN: (i32, i32) = (40, 40);
pub const FELT_MAX: (i32, i32) = (359, 259);

pub const RAIL: Rgb<u8> = Rgb([100, 60, 30]);
pub const FELT: Rgb<u8> = Rgb([40, 140, 70]);
pub const CUE_WHITE: Rgb<u8> = Rgb([230, 240, 245]);
pub const EIGHT_BALL: Rgb<u8> = Rgb([20, 20, 25]);
pub const RED: Rgb<u8> = Rgb([200, 30, 30]);

pub const CUE_AT: (i32, i32) = (120, 110);
pub const BLACK_AT: (i32, i32) = (280, 110);
pub const STRIPE_AT: (i32, i32) = (120, 190);
pub const SOLID_AT: (i32, i32) = (280, 190);

/// Red ball with a white band across its middle rows.
pub fn draw_stripe_ball(frame: &mut RgbImage, center: (i32, i32), radius: i32) {
    draw_filled_circle_mut(frame, center, radius, RED);
    let r2 = radius * radius;
    for dy in -4..=4 {
        for dx in -radius..=radius {
            if dx * dx + dy * dy <= r2 {
                frame.put_pixel((center.0 + dx) as u32, (center.1 + dy) as u32, CUE_WHITE);
            }
        }
    }
}

/// Top-down table: brown rails around a green felt with one ball of each class.
///
/// The frame center stays clear of balls.
pub fn table_scene() -> RgbImage {
    let mut frame = RgbImage::from_pixel(SCENE_WIDTH, SCENE_HEIGHT, RAIL);
    let (w, h) = (
        (FELT_MAX.0 - FELT_MIN.0 + 1) as u32,
        (FELT_MAX.1 - FELT_MIN.1 + 1) as u32,
    );
    draw_filled_rect_mut(&mut frame, Rect::at(FELT_MIN.0, FELT_MIN.1).of_size(w, h), FELT);

    draw_filled_circle_mut(&mut frame, CUE_AT, BALL_RADIUS, CUE_WHITE);
    draw_filled_circle_mut(&mut frame, BLACK_AT, BALL_RADIUS, EIGHT_BALL);
    draw_stripe_ball(&mut frame, STRIPE_AT, BALL_RADIUS);
    draw_filled_circle_mut(&mut frame, SOLID_AT, BALL_RADIUS, RED);
    frame
}

/// Mask of the felt rectangle of `table_scene`.
pub fn table_field_mask() -> Mask {
    Mask::from_fn(SCENE_WIDTH, SCENE_HEIGHT, |x, y| {
        let (x, y) = (x as i32, y as i32);
        if x >= FELT_MIN.0 && x <= FELT_MAX.0 && y >= FELT_MIN.1 && y <= FELT_MAX.1 {
            Luma([FOREGROUND])
        } else {
            Luma([BACKGROUND])
        }
    })
}

pub fn blank_mask(width: u32, height: u32) -> Mask {
    Mask::new(width, height)
}

pub fn full_mask(width: u32, height: u32) -> Mask {
    Mask::from_pixel(width, height, Luma([FOREGROUND]))
}

/// Background mask with a filled foreground disk.
pub fn disk_mask(width: u32, height: u32, center: (i32, i32), radius: i32) -> Mask {
    let mut mask = blank_mask(width, height);
    draw_filled_circle_mut(&mut mask, center, radius, Luma([FOREGROUND]));
    mask
}

/// Foreground mask with a background hole for each disk.
pub fn surface_with_holes(width: u32, height: u32, holes: &[((i32, i32), i32)]) -> Mask {
    let mut mask = full_mask(width, height);
    for (center, radius) in holes {
        draw_filled_circle_mut(&mut mask, *center, *radius, Luma([BACKGROUND]));
    }
    mask
}

/// Set a rectangle of the mask to `value`.
pub fn paint_rect(mask: &mut Mask, x: i32, y: i32, width: u32, height: u32, value: u8) {
    draw_filled_rect_mut(mask, Rect::at(x, y).of_size(width, height), Luma([value]));
}
