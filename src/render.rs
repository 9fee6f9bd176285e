use image::{Luma, Rgb, RgbImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_hollow_circle_mut};

use crate::models::{BallsLocalization, FieldLocalization, Label, Mask, BACKGROUND};

/// Per-pixel class map: the field is painted first, balls on top of it.
pub fn label_mask(field: &FieldLocalization, balls: &BallsLocalization) -> Mask {
    let mut labels = Mask::from_fn(field.mask.width(), field.mask.height(), |x, y| {
        if field.mask.get_pixel(x, y)[0] == BACKGROUND {
            Luma([Label::Background.value()])
        } else {
            Luma([Label::PlayingField.value()])
        }
    });

    for (label, ball) in balls.labeled() {
        let circle = ball.circle;
        draw_filled_circle_mut(
            &mut labels,
            (circle.x.round() as i32, circle.y.round() as i32),
            circle.radius.round() as i32,
            Luma([label.value()]),
        );
    }
    labels
}

fn label_color(label: Label) -> Rgb<u8> {
    match label {
        Label::Background => Rgb([0, 0, 0]),
        Label::PlayingField => Rgb([0, 255, 0]),
        Label::Cue => Rgb([255, 255, 255]),
        Label::Black => Rgb([255, 0, 255]),
        Label::Solids => Rgb([255, 128, 0]),
        Label::Stripes => Rgb([0, 160, 255]),
    }
}

/// Copy of the frame with pockets marked and each ball outlined in its class color.
pub fn draw_detections(frame: &RgbImage, field: &FieldLocalization, balls: &BallsLocalization) -> RgbImage {
    let mut overlay = frame.clone();

    for hole in &field.holes {
        draw_hollow_circle_mut(&mut overlay, (hole.x, hole.y), 6, Rgb([255, 0, 0]));
    }

    for (label, ball) in balls.labeled() {
        let circle = ball.circle;
        let center = (circle.x.round() as i32, circle.y.round() as i32);
        let radius = circle.radius.round() as i32;
        let color = label_color(label);
        draw_hollow_circle_mut(&mut overlay, center, radius, color);
        draw_hollow_circle_mut(&mut overlay, center, radius + 1, color);
    }
    overlay
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BallLocalization, Circle, FOREGROUND};

    #[test]
    fn balls_are_painted_over_the_field() {
        let field = FieldLocalization {
            mask: Mask::from_pixel(60, 40, Luma([FOREGROUND])),
            holes: Vec::new(),
            lines: Vec::new(),
        };
        let balls = BallsLocalization {
            cue: BallLocalization::from(Circle::new(15.0, 20.0, 5.0)),
            black: None,
            solids: Vec::new(),
            stripes: vec![BallLocalization::from(Circle::new(45.0, 20.0, 5.0))],
        };

        let labels = label_mask(&field, &balls);
        assert_eq!(labels.get_pixel(15, 20)[0], Label::Cue.value());
        assert_eq!(labels.get_pixel(45, 20)[0], Label::Stripes.value());
        assert_eq!(labels.get_pixel(30, 5)[0], Label::PlayingField.value());
    }
}
