// SPDX-License-Identifier: GPL-3.0-only

//! Stroke rasterization onto RGBA layers
//!
//! Strokes are rasterized as capsules (segments with round caps), so joining
//! consecutive segments gives round joins for free. A pixel is covered when
//! its center lies within half the stroke width of the segment.

use super::geometry::{Point, Segment};
use image::{Rgba, RgbaImage};

/// How covered pixels are modified
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Paint {
    /// Source-over with this color
    Color(Rgba<u8>),
    /// Destination clear: covered pixels become fully transparent
    Clear,
}

/// Stroke one segment
pub fn stroke_segment(layer: &mut RgbaImage, segment: Segment, width: f32, paint: Paint) {
    let radius = width / 2.0;
    if radius <= 0.0 || layer.width() == 0 || layer.height() == 0 {
        return;
    }

    let min_x = (segment.from.x.min(segment.to.x) - radius).floor().max(0.0);
    let min_y = (segment.from.y.min(segment.to.y) - radius).floor().max(0.0);
    let max_x = (segment.from.x.max(segment.to.x) + radius)
        .ceil()
        .min(layer.width() as f32 - 1.0);
    let max_y = (segment.from.y.max(segment.to.y) + radius)
        .ceil()
        .min(layer.height() as f32 - 1.0);
    if min_x > max_x || min_y > max_y {
        return;
    }

    for y in min_y as u32..=max_y as u32 {
        for x in min_x as u32..=max_x as u32 {
            let center = Point::new(x as f32 + 0.5, y as f32 + 0.5);
            if segment.distance_to(center) <= radius {
                apply(layer.get_pixel_mut(x, y), paint);
            }
        }
    }
}

/// Stroke consecutive points as one path
pub fn stroke_polyline(layer: &mut RgbaImage, points: &[Point], width: f32, paint: Paint) {
    match points {
        [] => {}
        [single] => stroke_segment(layer, Segment::new(*single, *single), width, paint),
        _ => {
            for pair in points.windows(2) {
                stroke_segment(layer, Segment::new(pair[0], pair[1]), width, paint);
            }
        }
    }
}

/// Filled disc, the shape of a single brush dab
pub fn dab(layer: &mut RgbaImage, center: Point, radius: f32, paint: Paint) {
    stroke_segment(layer, Segment::new(center, center), radius * 2.0, paint);
}

fn apply(pixel: &mut Rgba<u8>, paint: Paint) {
    match paint {
        Paint::Clear => *pixel = Rgba([0, 0, 0, 0]),
        Paint::Color(src) => *pixel = source_over(src, *pixel),
    }
}

/// Porter-Duff source-over on straight (non-premultiplied) alpha
fn source_over(src: Rgba<u8>, dst: Rgba<u8>) -> Rgba<u8> {
    let sa = src.0[3] as f32 / 255.0;
    if sa >= 1.0 {
        return src;
    }
    let da = dst.0[3] as f32 / 255.0;
    let out_a = sa + da * (1.0 - sa);
    if out_a <= 0.0 {
        return Rgba([0, 0, 0, 0]);
    }

    let mut out = [0u8; 4];
    for c in 0..3 {
        let v = (src.0[c] as f32 * sa + dst.0[c] as f32 * da * (1.0 - sa)) / out_a;
        out[c] = v.round().clamp(0.0, 255.0) as u8;
    }
    out[3] = (out_a * 255.0).round() as u8;
    Rgba(out)
}
