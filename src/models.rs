use image::{GrayImage, ImageBuffer, Rgb};
use serde::Serialize;

/// Three-channel image holding (H, S, V) per pixel.
///
/// Hue is stored halved (0..180) and saturation/value span 0..255, the usual
/// 8-bit convention, so HSV bounds can be written as plain byte triplets.
pub type HsvImage = ImageBuffer<Rgb<u8>, Vec<u8>>;

/// Binary mask: 0 is background, 255 is foreground.
pub type Mask = GrayImage;

pub const FOREGROUND: u8 = 255;
pub const BACKGROUND: u8 = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: Point) -> f32 {
        let dx = (self.x - other.x) as f32;
        let dy = (self.y - other.y) as f32;
        (dx * dx + dy * dy).sqrt()
    }
}

/// A detected ball candidate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Circle {
    pub x: f32,
    pub y: f32,
    pub radius: f32,
}

impl Circle {
    pub fn new(x: f32, y: f32, radius: f32) -> Self {
        Self { x, y, radius }
    }

    /// Center truncated to integer pixel coordinates.
    pub fn center(&self) -> Point {
        Point::new(self.x as i32, self.y as i32)
    }

    /// Euclidean distance between the (x, y, r) vectors of two circles.
    pub fn vector_distance(&self, other: &Circle) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dr = self.radius - other.radius;
        (dx * dx + dy * dy + dr * dr).sqrt()
    }

    /// The 2r x 2r square centered on the circle.
    pub fn bounding_box(&self) -> BoundingBox {
        let cx = self.x as i32;
        let cy = self.y as i32;
        let r = self.radius as i32;
        BoundingBox {
            x: cx - r,
            y: cy - r,
            width: 2 * r,
            height: 2 * r,
        }
    }

    /// Pixels of the filled disk (rounded center and radius) clipped to the
    /// given frame size, in row-major order.
    pub fn disk_pixels(&self, width: u32, height: u32) -> Vec<(u32, u32)> {
        let cx = self.x.round() as i64;
        let cy = self.y.round() as i64;
        let r = self.radius.round().max(0.0) as i64;
        let r2 = r * r;

        let min_y = (cy - r).max(0);
        let max_y = (cy + r).min(height as i64 - 1);
        let min_x = (cx - r).max(0);
        let max_x = (cx + r).min(width as i64 - 1);

        let mut pixels = Vec::new();
        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let dx = x - cx;
                let dy = y - cy;
                if dx * dx + dy * dy <= r2 {
                    pixels.push((x as u32, y as u32));
                }
            }
        }
        pixels
    }
}

/// Axis-aligned rectangle in frame coordinates. May extend past the frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BoundingBox {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BallLocalization {
    pub circle: Circle,
    pub bounding_box: BoundingBox,
}

impl From<Circle> for BallLocalization {
    fn from(circle: Circle) -> Self {
        Self {
            circle,
            bounding_box: circle.bounding_box(),
        }
    }
}

/// Classified balls of one frame. `black` is `None` when no eight-ball was found.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BallsLocalization {
    pub cue: BallLocalization,
    pub black: Option<BallLocalization>,
    pub solids: Vec<BallLocalization>,
    pub stripes: Vec<BallLocalization>,
}

impl BallsLocalization {
    /// Total number of localized balls.
    pub fn ball_count(&self) -> usize {
        1 + usize::from(self.black.is_some()) + self.solids.len() + self.stripes.len()
    }

    /// Every localized ball together with its label.
    pub fn labeled(&self) -> Vec<(Label, BallLocalization)> {
        let mut balls = vec![(Label::Cue, self.cue)];
        if let Some(black) = self.black {
            balls.push((Label::Black, black));
        }
        balls.extend(self.solids.iter().map(|b| (Label::Solids, *b)));
        balls.extend(self.stripes.iter().map(|b| (Label::Stripes, *b)));
        balls
    }
}

/// A line in Hesse normal form: `x cos(theta) + y sin(theta) = rho`, theta in radians.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Line {
    pub rho: f32,
    pub theta: f32,
}

impl Line {
    pub fn new(rho: f32, theta: f32) -> Self {
        Self { rho, theta }
    }

    /// Intersection with another line, `None` for (near) parallel lines.
    pub fn intersection(&self, other: &Line) -> Option<(f32, f32)> {
        let (a1, b1) = (self.theta.cos(), self.theta.sin());
        let (a2, b2) = (other.theta.cos(), other.theta.sin());
        let det = a1 * b2 - a2 * b1;
        if det.abs() < 1e-3 {
            return None;
        }
        let x = (self.rho * b2 - other.rho * b1) / det;
        let y = (a1 * other.rho - a2 * self.rho) / det;
        Some((x, y))
    }
}

/// Playing surface of one frame.
#[derive(Debug, Clone)]
pub struct FieldLocalization {
    /// 255 on the table surface.
    pub mask: Mask,
    /// Pocket centers.
    pub holes: Vec<Point>,
    /// Merged rail lines.
    pub lines: Vec<Line>,
}

/// Field and balls of one frame.
#[derive(Debug, Clone)]
pub struct FrameLocalization {
    pub field: FieldLocalization,
    pub balls: BallsLocalization,
}

/// Class labels painted by the segmentation renderer.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Label {
    Background = 0,
    PlayingField = 1,
    Cue = 2,
    Black = 3,
    Solids = 4,
    Stripes = 5,
}

impl Label {
    pub fn value(self) -> u8 {
        self as u8
    }
}
