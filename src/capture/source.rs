//! Capture sources and session startup validation.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use super::png::decode_png;
use super::types::CaptureError;
use crate::draw::PixelBuffer;
use crate::geometry::Rect;

/// Produces the pixels of a screen region.
///
/// Implementations must return a buffer exactly the size of `bounds`.
#[async_trait]
pub trait CaptureSource: Send + Sync {
    async fn capture_region(&self, bounds: Rect) -> Result<PixelBuffer, CaptureError>;

    /// Full extent this source can capture, when known up front.
    async fn full_bounds(&self) -> Result<Rect, CaptureError>;
}

/// Treats a PNG file on disk as the "screen".
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<PixelBuffer, CaptureError> {
        let path = self.path.clone();
        let bytes = tokio::task::spawn_blocking(move || std::fs::read(path))
            .await
            .map_err(|e| CaptureError::Decode(format!("reader task failed: {e}")))??;
        decode_png(&bytes)
    }
}

#[async_trait]
impl CaptureSource for FileSource {
    async fn capture_region(&self, bounds: Rect) -> Result<PixelBuffer, CaptureError> {
        let image = self.load().await?;
        let available = image.bounds();
        if available.intersect(bounds) != Some(bounds) {
            return Err(CaptureError::RegionMismatch {
                requested: bounds,
                actual: available,
            });
        }
        log::debug!(
            "Cropping {:?} out of {}x{} image {}",
            bounds,
            image.width(),
            image.height(),
            self.path.display()
        );
        Ok(image.sub_image(bounds))
    }

    async fn full_bounds(&self) -> Result<Rect, CaptureError> {
        Ok(self.load().await?.bounds())
    }
}

/// Captures `bounds` from `source` and checks the result before an editing session
/// starts. On any error no session state exists yet; the caller aborts or retries.
pub async fn start_session(
    source: &dyn CaptureSource,
    bounds: Rect,
) -> Result<PixelBuffer, CaptureError> {
    let bounds = bounds.canon();
    if bounds.is_empty() {
        return Err(CaptureError::EmptyRegion(bounds));
    }

    let image = source.capture_region(bounds).await?;
    let actual = Rect::from_size(bounds.min.x, bounds.min.y, image.width(), image.height());
    if actual != bounds {
        log::error!("Capture source returned {:?} for {:?}", actual, bounds);
        return Err(CaptureError::RegionMismatch {
            requested: bounds,
            actual,
        });
    }

    log::info!(
        "Captured {}x{} pixels at ({}, {})",
        image.width(),
        image.height(),
        bounds.min.x,
        bounds.min.y
    );
    Ok(image)
}
