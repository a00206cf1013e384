use std::path::PathBuf;

use async_trait::async_trait;
use snip_types::{CroppedImage, FrameCapture, SelectionRect};

use crate::crop::crop_async;
use crate::error::CaptureError;

/// Source of full-viewport frames at device-pixel resolution
#[async_trait]
pub trait ScreenshotProvider: Send + Sync {
    /// Failures must be reported as [`CaptureError::Unavailable`]
    async fn capture_visible(&self) -> Result<FrameCapture, CaptureError>;
}

/// Frame read from a PNG already on disk
pub struct PngFileProvider {
    path: PathBuf,
}

impl PngFileProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl ScreenshotProvider for PngFileProvider {
    async fn capture_visible(&self) -> Result<FrameCapture, CaptureError> {
        let bytes = tokio::fs::read(&self.path).await.map_err(|e| {
            CaptureError::Unavailable(format!("Failed to read {}: {e}", self.path.display()))
        })?;
        Ok(FrameCapture::new(bytes))
    }
}

/// Grab one frame and crop it to `rect`
pub async fn capture_selection(
    provider: &dyn ScreenshotProvider,
    rect: SelectionRect,
) -> Result<CroppedImage, CaptureError> {
    let frame = provider.capture_visible().await?;
    tracing::debug!("Captured frame: {} bytes", frame.as_bytes().len());
    crop_async(frame, rect).await
}
