// SPDX-License-Identifier: GPL-3.0-only

//! CLI commands
//!
//! The file-backed camera stands in for a device, so every command runs the
//! same surfaces a host application would:
//! - Scanning images for a QR code
//! - Capturing and annotating a photo
//! - Re-editing an existing photo
//! - Importing a library image unchanged

use chrono::Local;
use fieldcam::app::frame_processor::InversionMode;
use fieldcam::app::{
    CapturePayload, CaptureSurface, CollectedOutput, EditScript, QrScanner, SurfacePhase,
};
use fieldcam::backends::camera::{CameraBackend, PermissionState};
use fieldcam::backends::virtual_camera::{TorchSupport, VirtualCamera};
use fieldcam::config::Config;
use fieldcam::flash::FlashDevice;
use fieldcam::pipelines::photo::EncodedImage;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

type CliResult = Result<(), Box<dyn std::error::Error>>;

/// Upper bound on polls while waiting for the first frame
const MAX_CAPTURE_ATTEMPTS: u32 = 120;

/// Scan images for a QR code and print its text
pub async fn scan(images: Vec<PathBuf>, invert: bool, timeout: Duration) -> CliResult {
    let config = Config::load();
    let inversion = if invert {
        InversionMode::AttemptBoth
    } else {
        config.inversion
    };

    let camera: Arc<dyn CameraBackend> = Arc::new(VirtualCamera::from_files(&images)?);
    let mut scanner = QrScanner::new(camera, inversion, CollectedOutput::new())
        .with_interval(config.scan_interval());

    if scanner.open().await != PermissionState::Granted {
        return Err("camera access denied".into());
    }

    let found = match tokio::time::timeout(timeout, scanner.run()).await {
        Ok(result) => result?,
        Err(_) => {
            scanner.close();
            None
        }
    };

    match found {
        Some(result) => {
            println!("{}", result.content);
            Ok(())
        }
        None => Err("No QR code found".into()),
    }
}

/// Capture a still from `input`, optionally annotate it, and save the export
pub async fn capture(
    input: PathBuf,
    script: Option<PathBuf>,
    output: Option<PathBuf>,
    torch: bool,
) -> CliResult {
    let config = Config::load();
    let mut camera = VirtualCamera::from_files(&[&input])?;
    if config.flash_led {
        camera = camera.with_torch(TorchSupport::Flash(FlashDevice::discover()));
    }

    let mut surface =
        CaptureSurface::new(Arc::new(camera), config.viewport(), CollectedOutput::new());
    if surface.open().await != SurfacePhase::Live {
        return Err("camera access denied".into());
    }
    if torch {
        surface.toggle_torch();
    }

    let mut attempts = 0;
    while !surface.capture()? {
        attempts += 1;
        if attempts >= MAX_CAPTURE_ATTEMPTS {
            surface.close();
            return Err("camera produced no frame".into());
        }
        tokio::time::sleep(config.scan_interval()).await;
    }

    edit_and_export(surface, script, output, &config).await
}

/// Open an existing photo for annotation and save the export
pub async fn edit(input: PathBuf, script: Option<PathBuf>, output: Option<PathBuf>) -> CliResult {
    let config = Config::load();
    let bytes = tokio::fs::read(&input).await?;

    // No camera is needed to re-edit a photo
    let camera: Arc<dyn CameraBackend> = Arc::new(VirtualCamera::new(Vec::new()));
    let mut surface = CaptureSurface::new(camera, config.viewport(), CollectedOutput::new());
    surface.open_with_image(&bytes)?;

    edit_and_export(surface, script, output, &config).await
}

/// Forward a library image unchanged
pub async fn import(input: PathBuf, output: Option<PathBuf>) -> CliResult {
    let config = Config::load();

    // Without a device the surface lands on its denied screen, where
    // library import is offered
    let camera: Arc<dyn CameraBackend> = Arc::new(VirtualCamera::new(Vec::new()));
    let mut surface = CaptureSurface::new(camera, config.viewport(), CollectedOutput::new());
    surface.open().await;
    surface.import_file(&input).await?;

    let image = take_image(surface.into_sink())?;
    save(&image, output, &config).await
}

/// Print the effective configuration
pub fn show_config() -> CliResult {
    let config = Config::load();
    if let Some(path) = Config::default_path() {
        println!("# {}", path.display());
    }
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}

async fn edit_and_export(
    mut surface: CaptureSurface<CollectedOutput>,
    script: Option<PathBuf>,
    output: Option<PathBuf>,
    config: &Config,
) -> CliResult {
    if let Some(path) = script {
        let script = EditScript::load(&path)?;
        script.apply(surface.editor_mut()?);
    }
    surface.use_photo()?;

    let image = take_image(surface.into_sink())?;
    save(&image, output, config).await
}

fn take_image(output: CollectedOutput) -> Result<EncodedImage, Box<dyn std::error::Error>> {
    match output.payloads.into_iter().next() {
        Some(CapturePayload::Image(image)) => Ok(image),
        Some(CapturePayload::Text(_)) | None => Err("surface closed without an image".into()),
    }
}

async fn save(image: &EncodedImage, output: Option<PathBuf>, config: &Config) -> CliResult {
    let path = resolve_output(output, &config.output_dir(), image.format.extension());
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(&path, &image.data).await?;
    println!(
        "Photo saved: {} ({}x{})",
        path.display(),
        image.width,
        image.height
    );
    Ok(())
}

/// An explicit file wins; a directory gets a timestamped name
fn resolve_output(output: Option<PathBuf>, default_dir: &Path, extension: &str) -> PathBuf {
    let timestamped = |dir: &Path| {
        let timestamp = Local::now().format("%Y%m%d_%H%M%S");
        dir.join(format!("photo_{}.{}", timestamp, extension))
    };

    match output {
        Some(path) if path.is_dir() => timestamped(&path),
        Some(path) => path,
        None => timestamped(default_dir),
    }
}
