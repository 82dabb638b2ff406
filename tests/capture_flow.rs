// SPDX-License-Identifier: GPL-3.0-only

//! End-to-end capture, annotation and export through the public API

use fieldcam::app::{CapturePayload, CaptureSurface, CollectedOutput, SurfacePhase};
use fieldcam::backends::camera::PermissionState;
use fieldcam::backends::virtual_camera::VirtualCamera;
use fieldcam::errors::{AppError, CameraError};
use fieldcam::pipelines::photo::{AnnotationTool, EditSession, Point, Size, Viewport};
use image::{Rgba, RgbaImage};
use std::sync::Arc;

const BACKGROUND: [u8; 4] = [40, 40, 40, 255];

fn camera(width: u32, height: u32) -> Arc<VirtualCamera> {
    Arc::new(VirtualCamera::from_images(vec![RgbaImage::from_pixel(
        width,
        height,
        Rgba(BACKGROUND),
    )]))
}

fn new_surface(cam: &Arc<VirtualCamera>, viewport: Viewport) -> CaptureSurface<CollectedOutput> {
    CaptureSurface::new(cam.clone(), viewport, CollectedOutput::new())
}

fn drag(editor: &mut EditSession, from: Point, to: Point, display: Size) {
    editor.pointer_down(from, display);
    for i in 1..=4 {
        editor.pointer_move(from.lerp(to, i as f32 / 4.0), display);
    }
    editor.pointer_up();
}

fn assert_layers_aligned(editor: &EditSession) {
    let layers = editor.layers();
    assert_eq!(layers.photo().dimensions(), layers.annotation().dimensions());
}

#[tokio::test]
async fn test_capture_rectangle_export() {
    let cam = camera(1920, 1080);
    let mut surface = new_surface(&cam, Viewport::new(960, 640));

    assert_eq!(surface.open().await, SurfacePhase::Live);
    assert!(surface.capture().expect("capture"));
    assert_eq!(surface.editor().expect("editing").layers().size(), (960, 540));

    let display = Size::new(960.0, 540.0);
    let editor = surface.editor_mut().expect("editing");
    editor.select_tool(AnnotationTool::Rect);
    drag(editor, Point::new(100.0, 100.0), Point::new(400.0, 300.0), display);

    surface.use_photo().expect("use photo");
    assert_eq!(surface.phase(), SurfacePhase::Closed);
    assert_eq!(cam.stats().active(), 0);

    let out = surface.into_sink();
    assert_eq!(out.closes, 1);
    let Some(CapturePayload::Image(encoded)) = out.payload() else {
        panic!("expected one image payload, got {:?}", out.payloads);
    };

    let decoded = image::load_from_memory(&encoded.data)
        .expect("decode export")
        .to_rgba8();
    assert_eq!(decoded.dimensions(), (960, 540));

    // Top edge of the rectangle is red, the far corner is untouched photo
    let stroke = decoded.get_pixel(250, 100).0;
    assert!(stroke[0] > 120 && stroke[0] > stroke[1] + 60, "stroke pixel {stroke:?}");
    let photo = decoded.get_pixel(800, 450).0;
    for c in 0..3 {
        assert!(photo[c].abs_diff(BACKGROUND[c]) < 12, "photo pixel {photo:?}");
    }
}

#[tokio::test]
async fn test_scale_never_upscales() {
    for ((w, h), expected) in [((4000, 3000), (1067, 800)), ((100, 80), (100, 80))] {
        let mut surface = new_surface(&camera(w, h), Viewport::new(1200, 800));
        surface.open().await;
        surface.capture().expect("capture");
        assert_eq!(surface.editor().expect("editing").layers().size(), expected);
    }
}

#[tokio::test]
async fn test_layers_stay_aligned() {
    let mut surface = new_surface(&camera(640, 480), Viewport::new(640, 480));
    surface.open().await;
    surface.capture().expect("capture");

    let editor = surface.editor_mut().expect("editing");
    assert_layers_aligned(editor);

    let full = Size::new(640.0, 480.0);
    editor.select_tool(AnnotationTool::Circle);
    drag(editor, Point::new(50.0, 50.0), Point::new(300.0, 200.0), full);
    assert_layers_aligned(editor);

    editor.select_tool(AnnotationTool::Crop);
    drag(editor, Point::new(400.0, 300.0), Point::new(20.0, 30.0), full);
    assert!(editor.apply_crop());
    assert_eq!(editor.layers().size(), (380, 270));
    assert_layers_aligned(editor);

    // Shown at a different size after the crop; mapping follows the new buffer
    let shown = Size::new(190.0, 135.0);
    editor.select_tool(AnnotationTool::Arrow);
    drag(editor, Point::new(10.0, 10.0), Point::new(150.0, 100.0), shown);
    assert_layers_aligned(editor);

    editor.select_tool(AnnotationTool::Crop);
    drag(editor, Point::new(0.0, 0.0), Point::new(4.0, 100.0), shown);
    assert!(!editor.apply_crop(), "8px wide crop is below the threshold");
    assert_eq!(editor.layers().size(), (380, 270));

    editor.select_tool(AnnotationTool::Eraser);
    drag(editor, Point::new(0.0, 0.0), Point::new(190.0, 135.0), shown);
    assert_layers_aligned(editor);
}

#[tokio::test]
async fn test_eraser_reveals_photo() {
    let mut surface = new_surface(&camera(200, 200), Viewport::new(200, 200));
    surface.open().await;
    surface.capture().expect("capture");

    let display = Size::new(200.0, 200.0);
    let editor = surface.editor_mut().expect("editing");
    editor.select_tool(AnnotationTool::Rect);
    drag(editor, Point::new(20.0, 100.0), Point::new(180.0, 150.0), display);
    assert_eq!(editor.layers().annotation().get_pixel(100, 100).0[3], 255);

    editor.select_tool(AnnotationTool::Eraser);
    drag(editor, Point::new(60.0, 100.0), Point::new(140.0, 100.0), display);

    let layers = editor.layers();
    assert_eq!(layers.annotation().get_pixel(100, 100).0, [0, 0, 0, 0]);
    assert_eq!(layers.composite().get_pixel(100, 100).0, BACKGROUND);
    // Outside the eraser path the stroke survives
    assert_eq!(layers.annotation().get_pixel(100, 150).0[3], 255);
}

#[tokio::test]
async fn test_release_on_every_exit() {
    // close from live
    let cam = camera(64, 48);
    let mut surface = new_surface(&cam, Viewport::new(64, 48));
    surface.open().await;
    surface.close();
    assert_eq!(cam.stats().releases(), 1);
    assert_ne!(surface.session().permission_state(), PermissionState::Granted);

    // capture, then retake, then close
    let cam = camera(64, 48);
    let mut surface = new_surface(&cam, Viewport::new(64, 48));
    surface.open().await;
    surface.capture().expect("capture");
    assert_eq!(cam.stats().releases(), 1);
    assert_ne!(surface.session().permission_state(), PermissionState::Granted);

    surface.retake().await.expect("retake");
    assert_eq!(cam.stats().active(), 1);
    surface.close();
    assert_eq!(cam.stats().acquisitions(), 2);
    assert_eq!(cam.stats().releases(), 2);

    // surface dropped without closing
    let cam = camera(64, 48);
    {
        let mut surface = new_surface(&cam, Viewport::new(64, 48));
        surface.open().await;
    }
    assert_eq!(cam.stats().releases(), 1);
}

#[tokio::test]
async fn test_unplug_during_preview() {
    let cam = camera(320, 240);
    let mut surface = new_surface(&cam, Viewport::new(320, 240));
    assert_eq!(surface.open().await, SurfacePhase::Live);

    cam.unplug();
    let err = surface.capture().expect_err("device is gone");
    assert!(matches!(err, AppError::Camera(CameraError::DeviceLost(_))));
    assert_eq!(surface.phase(), SurfacePhase::Denied);
    assert_eq!(cam.stats().active(), 0);

    // Nothing to reconnect to
    assert_eq!(surface.retry().await, SurfacePhase::Denied);
    assert!(surface.sink().payloads.is_empty());
}

#[test]
fn test_edit_in_place_reentry() {
    let mut bytes = Vec::new();
    RgbaImage::from_pixel(120, 90, Rgba(BACKGROUND))
        .write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
        .expect("encode");

    let cam = camera(64, 48);
    let mut surface = new_surface(&cam, Viewport::new(64, 48));
    surface.open_with_image(&bytes).expect("open");
    surface.use_photo().expect("use photo");

    assert_eq!(cam.stats().acquisitions(), 0);
    let out = surface.into_sink();
    match out.payload() {
        Some(CapturePayload::Image(img)) => assert_eq!((img.width, img.height), (120, 90)),
        other => panic!("unexpected payload {other:?}"),
    }
}
