// SPDX-License-Identifier: GPL-3.0-only

//! Scanning loop behavior through the public API

use fieldcam::app::frame_processor::{CodeReader, DecodeResult, InversionMode, ScanTick};
use fieldcam::app::{CapturePayload, CollectedOutput, QrScanner};
use fieldcam::backends::camera::PermissionState;
use fieldcam::backends::virtual_camera::VirtualCamera;
use fieldcam::errors::{AppError, CameraError};
use image::{Rgba, RgbaImage};
use qrcode::{Color, QrCode};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Every frame with a non-white first pixel carries a code naming its red value
struct MarkerReader {
    calls: Arc<AtomicUsize>,
}

impl CodeReader for MarkerReader {
    fn decode(&self, frame: &RgbaImage) -> Option<DecodeResult> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let px = frame.get_pixel(0, 0).0;
        (px != [255, 255, 255, 255]).then(|| DecodeResult::new(format!("record/{}", px[0])))
    }
}

fn frame(marker: Option<u8>) -> RgbaImage {
    let px = match marker {
        Some(r) => [r, 0, 0, 255],
        None => [255, 255, 255, 255],
    };
    RgbaImage::from_pixel(8, 8, Rgba(px))
}

/// Dark-on-light QR code, four pixels per module with a four module border
fn qr_frame(content: &str) -> RgbaImage {
    let code = QrCode::new(content.as_bytes()).expect("encode QR");
    let modules = code.width() as u32;
    let colors = code.to_colors();
    let side = (modules + 8) * 4;

    RgbaImage::from_fn(side, side, |x, y| {
        let (mx, my) = ((x / 4) as i64 - 4, (y / 4) as i64 - 4);
        let inside = (0..modules as i64).contains(&mx) && (0..modules as i64).contains(&my);
        let dark = inside && colors[(my as u32 * modules + mx as u32) as usize] == Color::Dark;
        let v = if dark { 0 } else { 255 };
        Rgba([v, v, v, 255])
    })
}

#[tokio::test]
async fn test_at_most_one_decode() {
    // Three consecutive frames hold valid codes
    let cam = Arc::new(VirtualCamera::from_images(vec![
        frame(None),
        frame(Some(1)),
        frame(Some(2)),
        frame(Some(3)),
    ]));
    let calls = Arc::new(AtomicUsize::new(0));
    let reader = MarkerReader {
        calls: Arc::clone(&calls),
    };
    let mut scanner = QrScanner::with_reader(cam.clone(), reader, CollectedOutput::new())
        .with_interval(Duration::from_millis(1));

    assert_eq!(scanner.open().await, PermissionState::Granted);
    let found = scanner.run().await.expect("run");
    assert_eq!(found.map(|r| r.content), Some("record/1".to_string()));

    for _ in 0..10 {
        assert_eq!(scanner.tick().expect("tick"), ScanTick::Stopped);
    }
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(cam.stats().active(), 0);
    assert_ne!(scanner.session().permission_state(), PermissionState::Granted);

    let out = scanner.into_sink();
    assert_eq!(out.payloads, vec![CapturePayload::Text("record/1".into())]);
    assert_eq!(out.closes, 1);
}

#[tokio::test]
async fn test_waits_for_buffered_frame() {
    let cam = Arc::new(VirtualCamera::from_images(vec![frame(Some(7))]).with_warmup(3));
    let calls = Arc::new(AtomicUsize::new(0));
    let reader = MarkerReader {
        calls: Arc::clone(&calls),
    };
    let mut scanner = QrScanner::with_reader(cam, reader, CollectedOutput::new());
    scanner.open().await;

    for _ in 0..3 {
        assert_eq!(scanner.tick().expect("tick"), ScanTick::NotReady);
    }
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert!(matches!(scanner.tick(), Ok(ScanTick::Found(_))));
}

#[tokio::test]
async fn test_blank_frames_keep_scanning() {
    let cam = Arc::new(VirtualCamera::from_images(vec![RgbaImage::from_pixel(
        64,
        64,
        Rgba([255, 255, 255, 255]),
    )]));
    let mut scanner =
        QrScanner::new(cam.clone(), InversionMode::AttemptBoth, CollectedOutput::new());
    scanner.open().await;

    for _ in 0..3 {
        assert_eq!(scanner.tick().expect("tick"), ScanTick::Miss);
    }
    assert!(scanner.is_scanning());
    assert_eq!(cam.stats().active(), 1);

    scanner.close();
    assert_eq!(cam.stats().active(), 0);
    assert!(scanner.sink().payloads.is_empty());
}

#[tokio::test]
async fn test_scans_real_qr_code() {
    let blank = RgbaImage::from_pixel(132, 132, Rgba([255, 255, 255, 255]));
    let cam = Arc::new(VirtualCamera::from_images(vec![blank, qr_frame("asset:42")]));
    let mut scanner = QrScanner::new(cam.clone(), InversionMode::default(), CollectedOutput::new())
        .with_interval(Duration::from_millis(1));

    assert_eq!(scanner.open().await, PermissionState::Granted);
    let found = scanner.run().await.expect("run");
    assert_eq!(found.map(|r| r.content), Some("asset:42".to_string()));
    assert_eq!(cam.stats().active(), 0);
    assert_eq!(
        scanner.into_sink().payloads,
        vec![CapturePayload::Text("asset:42".into())]
    );
}

#[tokio::test]
async fn test_unplug_ends_scan_with_error() {
    let cam = Arc::new(VirtualCamera::from_images(vec![frame(None)]));
    let calls = Arc::new(AtomicUsize::new(0));
    let reader = MarkerReader {
        calls: Arc::clone(&calls),
    };
    let mut scanner = QrScanner::with_reader(cam.clone(), reader, CollectedOutput::new())
        .with_interval(Duration::from_millis(1));
    scanner.open().await;
    assert_eq!(scanner.tick().expect("tick"), ScanTick::Miss);

    cam.unplug();
    let err = scanner.run().await.expect_err("device is gone");
    assert!(matches!(err, AppError::Camera(CameraError::DeviceLost(_))));

    assert!(scanner.is_closed());
    assert_eq!(cam.stats().active(), 0);
    let out = scanner.into_sink();
    assert!(out.payloads.is_empty());
    assert_eq!(out.closes, 1);
}
