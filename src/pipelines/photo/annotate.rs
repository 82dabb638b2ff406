// SPDX-License-Identifier: GPL-3.0-only

//! Annotation tools and pointer gestures
//!
//! A gesture is pointer-down, any number of pointer-moves, then pointer-up.
//! All positions here are already in buffer space.
//!
//! Shape tools (circle, rectangle, arrow) preview speculatively: the
//! annotation layer is snapshotted at pointer-down and every move restores
//! the snapshot before drawing the shape again, so the dragged shape never
//! leaves trails. Whatever is on the layer at pointer-up is final.

use super::geometry::{CropSelection, Ellipse, Point, Segment, arrow_segments, rect_segments};
use super::layers::{AnnotationSnapshot, LayerStack};
use super::raster::{Paint, dab, stroke_polyline, stroke_segment};
use crate::constants::annotation::{ERASER_RADIUS, STROKE_COLOR, STROKE_WIDTH};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Annotation tools
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnnotationTool {
    Crop,
    Circle,
    Rect,
    Arrow,
    Eraser,
}

/// One drag in progress
#[derive(Debug)]
struct Gesture {
    start: Point,
    last: Point,
    snapshot: Option<AnnotationSnapshot>,
}

/// Tool selection, crop selection and the active gesture
#[derive(Debug, Default)]
pub struct AnnotationEngine {
    active: Option<AnnotationTool>,
    crop: Option<CropSelection>,
    gesture: Option<Gesture>,
}

impl AnnotationEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active_tool(&self) -> Option<AnnotationTool> {
        self.active
    }

    pub fn crop_selection(&self) -> Option<&CropSelection> {
        self.crop.as_ref()
    }

    pub fn is_dragging(&self) -> bool {
        self.gesture.is_some()
    }

    /// Select `tool`, or deselect it if it is already active
    ///
    /// Any crop selection and unfinished gesture are dropped.
    pub fn select_tool(&mut self, tool: AnnotationTool) -> Option<AnnotationTool> {
        self.active = if self.active == Some(tool) {
            None
        } else {
            Some(tool)
        };
        self.crop = None;
        self.gesture = None;
        debug!(tool = ?self.active, "Annotation tool selected");
        self.active
    }

    /// Drop the tool, crop selection and gesture
    pub fn reset(&mut self) {
        self.active = None;
        self.crop = None;
        self.gesture = None;
    }

    pub fn pointer_down(&mut self, layers: &mut LayerStack, at: Point) {
        let Some(tool) = self.active else {
            return;
        };

        if tool == AnnotationTool::Crop {
            self.crop = Some(CropSelection::at(at));
            self.gesture = Some(Gesture {
                start: at,
                last: at,
                snapshot: None,
            });
            return;
        }

        self.gesture = Some(Gesture {
            start: at,
            last: at,
            snapshot: Some(layers.snapshot()),
        });

        if tool == AnnotationTool::Eraser {
            dab(layers.annotation_mut(), at, ERASER_RADIUS, Paint::Clear);
        }
    }

    pub fn pointer_move(&mut self, layers: &mut LayerStack, at: Point) {
        let (Some(tool), Some(gesture)) = (self.active, self.gesture.as_mut()) else {
            return;
        };

        match tool {
            AnnotationTool::Crop => {
                if let Some(crop) = self.crop.as_mut() {
                    crop.drag_to(at);
                }
            }
            AnnotationTool::Eraser => {
                stroke_segment(
                    layers.annotation_mut(),
                    Segment::new(gesture.last, at),
                    ERASER_RADIUS * 2.0,
                    Paint::Clear,
                );
            }
            AnnotationTool::Circle | AnnotationTool::Rect | AnnotationTool::Arrow => {
                if let Some(snapshot) = &gesture.snapshot {
                    layers.restore(snapshot);
                }
                draw_shape(layers, tool, gesture.start, at);
            }
        }

        gesture.last = at;
    }

    pub fn pointer_up(&mut self) {
        self.gesture = None;
    }

    /// Crop both layers to the current selection
    ///
    /// The selection is clipped to the layers first. Returns `false` without
    /// touching anything when there is no selection or what remains of it is
    /// smaller than the minimum crop size.
    pub fn apply_crop(&mut self, layers: &mut LayerStack) -> bool {
        let (width, height) = layers.size();
        let rect = self
            .crop
            .as_ref()
            .and_then(CropSelection::normalized)
            .and_then(|rect| rect.clip_to(width, height));
        let Some(rect) = rect else {
            debug!("Crop selection too small, ignoring");
            return false;
        };

        layers.crop(rect);
        self.crop = None;
        self.active = None;
        self.gesture = None;
        info!(width = rect.width, height = rect.height, "Crop applied");
        true
    }
}

fn draw_shape(layers: &mut LayerStack, tool: AnnotationTool, start: Point, end: Point) {
    let paint = Paint::Color(STROKE_COLOR);
    let layer = layers.annotation_mut();

    match tool {
        AnnotationTool::Circle => {
            let outline = Ellipse::inscribed(start, end).outline();
            stroke_polyline(layer, &outline, STROKE_WIDTH, paint);
        }
        AnnotationTool::Rect => {
            for edge in rect_segments(start, end) {
                stroke_segment(layer, edge, STROKE_WIDTH, paint);
            }
        }
        AnnotationTool::Arrow => {
            for stroke in arrow_segments(start, end) {
                stroke_segment(layer, stroke, STROKE_WIDTH, paint);
            }
        }
        AnnotationTool::Crop | AnnotationTool::Eraser => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn stack() -> LayerStack {
        LayerStack::from_photo(RgbaImage::from_pixel(200, 150, Rgba([0, 128, 0, 255])))
    }

    fn drag(engine: &mut AnnotationEngine, layers: &mut LayerStack, from: Point, to: Point) {
        engine.pointer_down(layers, from);
        engine.pointer_move(layers, from.lerp(to, 0.5));
        engine.pointer_move(layers, to);
        engine.pointer_up();
    }

    fn painted(layers: &LayerStack) -> usize {
        layers.annotation().pixels().filter(|p| p.0[3] != 0).count()
    }

    #[test]
    fn test_toggle_selection() {
        let mut engine = AnnotationEngine::new();
        assert_eq!(engine.select_tool(AnnotationTool::Rect), Some(AnnotationTool::Rect));
        assert_eq!(engine.select_tool(AnnotationTool::Arrow), Some(AnnotationTool::Arrow));
        assert_eq!(engine.select_tool(AnnotationTool::Arrow), None);
    }

    #[test]
    fn test_switching_tool_clears_crop() {
        let mut engine = AnnotationEngine::new();
        let mut layers = stack();
        engine.select_tool(AnnotationTool::Crop);
        drag(&mut engine, &mut layers, Point::new(10.0, 10.0), Point::new(80.0, 60.0));
        assert!(engine.crop_selection().is_some());

        engine.select_tool(AnnotationTool::Circle);
        assert!(engine.crop_selection().is_none());
    }

    #[test]
    fn test_no_tool_draws_nothing() {
        let mut engine = AnnotationEngine::new();
        let mut layers = stack();
        drag(&mut engine, &mut layers, Point::new(10.0, 10.0), Point::new(80.0, 60.0));
        assert_eq!(painted(&layers), 0);
        assert!(!engine.is_dragging());
    }

    #[test]
    fn test_preview_leaves_no_trail() {
        let mut engine = AnnotationEngine::new();
        let mut direct = stack();
        engine.select_tool(AnnotationTool::Rect);
        engine.pointer_down(&mut direct, Point::new(10.0, 10.0));
        engine.pointer_move(&mut direct, Point::new(100.0, 100.0));
        engine.pointer_up();

        let mut wandering = stack();
        engine.pointer_down(&mut wandering, Point::new(10.0, 10.0));
        engine.pointer_move(&mut wandering, Point::new(180.0, 20.0));
        engine.pointer_move(&mut wandering, Point::new(30.0, 140.0));
        engine.pointer_move(&mut wandering, Point::new(100.0, 100.0));
        engine.pointer_up();

        assert_eq!(direct.annotation(), wandering.annotation());
    }

    #[test]
    fn test_shapes_accumulate_across_gestures() {
        let mut engine = AnnotationEngine::new();
        let mut layers = stack();
        engine.select_tool(AnnotationTool::Rect);
        drag(&mut engine, &mut layers, Point::new(10.0, 10.0), Point::new(50.0, 50.0));
        let first = painted(&layers);

        drag(&mut engine, &mut layers, Point::new(120.0, 60.0), Point::new(180.0, 120.0));
        assert!(painted(&layers) > first);
        assert_eq!(layers.annotation().get_pixel(10, 30).0, STROKE_COLOR.0);
    }

    #[test]
    fn test_circle_inscribed_in_drag_box() {
        let mut engine = AnnotationEngine::new();
        let mut layers = stack();
        engine.select_tool(AnnotationTool::Circle);
        drag(&mut engine, &mut layers, Point::new(20.0, 20.0), Point::new(120.0, 80.0));

        // Leftmost and topmost points of the ellipse
        assert_eq!(layers.annotation().get_pixel(20, 50).0, STROKE_COLOR.0);
        assert_eq!(layers.annotation().get_pixel(70, 20).0, STROKE_COLOR.0);
        // Center stays clear
        assert_eq!(layers.annotation().get_pixel(70, 50).0[3], 0);
    }

    #[test]
    fn test_arrow_reaches_tip() {
        let mut engine = AnnotationEngine::new();
        let mut layers = stack();
        engine.select_tool(AnnotationTool::Arrow);
        drag(&mut engine, &mut layers, Point::new(20.0, 75.0), Point::new(120.0, 75.0));

        assert_eq!(layers.annotation().get_pixel(119, 75).0, STROKE_COLOR.0);
        // Head strokes reach 11px above and below the shaft near x ≈ 101
        assert_eq!(layers.annotation().get_pixel(101, 64).0, STROKE_COLOR.0);
        assert_eq!(layers.annotation().get_pixel(101, 85).0, STROKE_COLOR.0);
    }

    #[test]
    fn test_eraser_dab_on_down() {
        let mut engine = AnnotationEngine::new();
        let mut layers = stack();
        layers.annotation_mut().fill(255);

        engine.select_tool(AnnotationTool::Eraser);
        engine.pointer_down(&mut layers, Point::new(100.0, 75.0));
        assert_eq!(layers.annotation().get_pixel(100, 75).0, [0, 0, 0, 0]);
        assert_eq!(layers.annotation().get_pixel(100, 75 + 30).0[3], 255);

        engine.pointer_move(&mut layers, Point::new(160.0, 75.0));
        engine.pointer_up();
        assert_eq!(layers.annotation().get_pixel(130, 95).0, [0, 0, 0, 0]);
        assert_eq!(layers.photo().get_pixel(130, 95).0, [0, 128, 0, 255]);
    }

    #[test]
    fn test_crop_drag_tracks_extent() {
        let mut engine = AnnotationEngine::new();
        let mut layers = stack();
        engine.select_tool(AnnotationTool::Crop);
        engine.pointer_down(&mut layers, Point::new(50.0, 50.0));
        engine.pointer_move(&mut layers, Point::new(20.0, 90.0));

        let crop = engine.crop_selection().expect("selection");
        assert_eq!(crop.anchor, Point::new(50.0, 50.0));
        assert_eq!((crop.extent.width, crop.extent.height), (-30.0, 40.0));
    }

    #[test]
    fn test_apply_crop_below_threshold_is_noop() {
        let mut engine = AnnotationEngine::new();
        let mut layers = stack();
        engine.select_tool(AnnotationTool::Crop);
        drag(&mut engine, &mut layers, Point::new(50.0, 50.0), Point::new(58.0, 120.0));

        let before = layers.clone();
        assert!(!engine.apply_crop(&mut layers));
        assert_eq!(layers, before);
        assert_eq!(engine.active_tool(), Some(AnnotationTool::Crop));
    }

    #[test]
    fn test_apply_crop_far_past_layers() {
        let mut engine = AnnotationEngine::new();
        let mut layers = stack();
        engine.select_tool(AnnotationTool::Crop);
        drag(&mut engine, &mut layers, Point::new(120.0, 90.0), Point::new(1e6, 1e6));

        assert!(engine.apply_crop(&mut layers));
        assert_eq!(layers.size(), (80, 60));
        assert_eq!(layers.photo().get_pixel(79, 59).0, [0, 128, 0, 255]);
        assert_eq!(layers.annotation().dimensions(), (80, 60));
    }

    #[test]
    fn test_apply_crop_off_layer_is_noop() {
        let mut engine = AnnotationEngine::new();
        let mut layers = stack();
        engine.select_tool(AnnotationTool::Crop);
        drag(&mut engine, &mut layers, Point::new(-400.0, 20.0), Point::new(-50.0, 120.0));

        let before = layers.clone();
        assert!(!engine.apply_crop(&mut layers));
        assert_eq!(layers, before);
    }

    #[test]
    fn test_apply_crop_resizes_and_deselects() {
        let mut engine = AnnotationEngine::new();
        let mut layers = stack();
        engine.select_tool(AnnotationTool::Crop);
        drag(&mut engine, &mut layers, Point::new(150.0, 100.0), Point::new(50.0, 40.0));

        assert!(engine.apply_crop(&mut layers));
        assert_eq!(layers.size(), (100, 60));
        assert_eq!(layers.annotation().dimensions(), (100, 60));
        assert_eq!(engine.active_tool(), None);
        assert!(engine.crop_selection().is_none());
    }
}
