// SPDX-License-Identifier: GPL-3.0-only

//! Coordinate spaces and shape geometry for annotation
//!
//! Pointer positions arrive in display space (the size the layers are drawn
//! at on screen) and are mapped into buffer space (backing-store pixels)
//! before any drawing happens. All shape outlines here are in buffer space.

use crate::constants::annotation::{ARROW_HEAD_ANGLE, ARROW_HEAD_LENGTH, MIN_ELLIPSE_RADIUS};
use crate::constants::crop::MIN_CROP_SIZE;
use serde::{Deserialize, Serialize};

/// A point in display or buffer space
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance(self, other: Point) -> f32 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    /// Linear interpolation towards `other` (`t` in 0..=1)
    pub fn lerp(self, other: Point, t: f32) -> Point {
        Point::new(
            self.x + (other.x - self.x) * t,
            self.y + (other.y - self.y) * t,
        )
    }
}

/// Width and height of a surface in display or buffer space
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn from_pixels((width, height): (u32, u32)) -> Self {
        Self::new(width as f32, height as f32)
    }
}

/// Map a display-space point into buffer space
///
/// The ratio is taken per axis because layout may stretch the displayed
/// surface differently from its backing resolution. A zero-sized display axis
/// maps 1:1.
pub fn display_to_buffer(point: Point, display: Size, buffer: Size) -> Point {
    let sx = if display.width > 0.0 {
        buffer.width / display.width
    } else {
        1.0
    };
    let sy = if display.height > 0.0 {
        buffer.height / display.height
    } else {
        1.0
    };
    Point::new(point.x * sx, point.y * sy)
}

/// A straight stroke between two points
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub from: Point,
    pub to: Point,
}

impl Segment {
    pub const fn new(from: Point, to: Point) -> Self {
        Self { from, to }
    }

    pub fn length(&self) -> f32 {
        self.from.distance(self.to)
    }

    /// Distance from `p` to the closest point on the segment
    pub fn distance_to(&self, p: Point) -> f32 {
        let dx = self.to.x - self.from.x;
        let dy = self.to.y - self.from.y;
        let len_sq = dx * dx + dy * dy;
        if len_sq == 0.0 {
            return self.from.distance(p);
        }
        let t = (((p.x - self.from.x) * dx + (p.y - self.from.y) * dy) / len_sq).clamp(0.0, 1.0);
        self.from.lerp(self.to, t).distance(p)
    }
}

/// Shaft plus two head strokes, all ending at `tip`
///
/// Each head stroke leaves the tip at ±30° from the reversed shaft direction.
pub fn arrow_segments(start: Point, tip: Point) -> [Segment; 3] {
    let angle = (tip.y - start.y).atan2(tip.x - start.x);
    let head = |offset: f32| {
        Point::new(
            tip.x - ARROW_HEAD_LENGTH * (angle - offset).cos(),
            tip.y - ARROW_HEAD_LENGTH * (angle - offset).sin(),
        )
    };

    [
        Segment::new(start, tip),
        Segment::new(head(ARROW_HEAD_ANGLE), tip),
        Segment::new(head(-ARROW_HEAD_ANGLE), tip),
    ]
}

/// Four edges of the axis-aligned rectangle spanning two corners
pub fn rect_segments(a: Point, b: Point) -> [Segment; 4] {
    let tr = Point::new(b.x, a.y);
    let bl = Point::new(a.x, b.y);
    [
        Segment::new(a, tr),
        Segment::new(tr, b),
        Segment::new(b, bl),
        Segment::new(bl, a),
    ]
}

/// Ellipse inscribed in the box spanning two corners
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ellipse {
    pub center: Point,
    pub rx: f32,
    pub ry: f32,
}

impl Ellipse {
    /// Radii are clamped to at least one pixel per axis
    pub fn inscribed(a: Point, b: Point) -> Self {
        Self {
            center: a.lerp(b, 0.5),
            rx: ((b.x - a.x).abs() / 2.0).max(MIN_ELLIPSE_RADIUS),
            ry: ((b.y - a.y).abs() / 2.0).max(MIN_ELLIPSE_RADIUS),
        }
    }

    /// Closed polyline approximating the outline, about one vertex every 2px
    pub fn outline(&self) -> Vec<Point> {
        // Ramanujan's approximation is plenty for choosing a vertex count
        let h = ((self.rx - self.ry) / (self.rx + self.ry)).powi(2);
        let perimeter = std::f32::consts::PI
            * (self.rx + self.ry)
            * (1.0 + 3.0 * h / (10.0 + (4.0 - 3.0 * h).sqrt()));
        let steps = ((perimeter / 2.0).ceil() as usize).clamp(16, 1440);

        (0..=steps)
            .map(|i| {
                let theta = i as f32 / steps as f32 * std::f32::consts::TAU;
                Point::new(
                    self.center.x + self.rx * theta.cos(),
                    self.center.y + self.ry * theta.sin(),
                )
            })
            .collect()
    }
}

/// In-progress crop selection
///
/// The extent keeps its sign while dragging so the rectangle can be pulled out
/// in any direction; it is normalized only when applied.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CropSelection {
    pub anchor: Point,
    pub extent: Size,
}

impl CropSelection {
    /// Zero-extent selection at `anchor`
    pub fn at(anchor: Point) -> Self {
        Self {
            anchor,
            extent: Size::default(),
        }
    }

    /// Stretch the selection so its far corner is `current`
    pub fn drag_to(&mut self, current: Point) {
        self.extent = Size::new(current.x - self.anchor.x, current.y - self.anchor.y);
    }

    /// Positive pixel rectangle, or `None` if either side is under the
    /// minimum crop size
    pub fn normalized(&self) -> Option<CropRect> {
        let w = self.extent.width.abs();
        let h = self.extent.height.abs();
        if w < MIN_CROP_SIZE || h < MIN_CROP_SIZE {
            return None;
        }

        let x = self.anchor.x.min(self.anchor.x + self.extent.width);
        let y = self.anchor.y.min(self.anchor.y + self.extent.height);
        Some(CropRect {
            x: x.round() as i64,
            y: y.round() as i64,
            width: w.round() as u32,
            height: h.round() as u32,
        })
    }
}

/// Normalized crop rectangle in buffer pixels
///
/// Straight from a selection the rectangle may reach past the layers.
/// [`clip_to`](Self::clip_to) bounds it before any buffer is sized from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRect {
    pub x: i64,
    pub y: i64,
    pub width: u32,
    pub height: u32,
}

impl CropRect {
    /// The part lying on a `width`×`height` layer, or `None` if that part is
    /// under the minimum crop size on either side
    pub fn clip_to(&self, width: u32, height: u32) -> Option<CropRect> {
        let left = self.x.max(0);
        let top = self.y.max(0);
        let right = self.x.saturating_add(self.width as i64).min(width as i64);
        let bottom = self.y.saturating_add(self.height as i64).min(height as i64);

        let min = MIN_CROP_SIZE as i64;
        if right - left < min || bottom - top < min {
            return None;
        }
        Some(CropRect {
            x: left,
            y: top,
            width: (right - left) as u32,
            height: (bottom - top) as u32,
        })
    }
}
