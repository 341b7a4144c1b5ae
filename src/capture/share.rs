use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::{mpsc, watch};

use super::file::{SaveTarget, ensure_directory_exists, write_private};
use super::png::encode_png;
use super::types::{CaptureError, ShareStatus};
use crate::draw::PixelBuffer;

/// Destination for an encoded screenshot (file, upload, clipboard...).
///
/// Called on a blocking worker thread; may take as long as it needs.
pub trait ShareSink: Send + Sync {
    /// Delivers PNG bytes under `name` and reports where they ended up, if anywhere.
    fn deliver(&self, name: &str, png: &[u8]) -> Result<Option<PathBuf>, CaptureError>;
}

/// Writes shared images as `<directory>/<name>.png`.
#[derive(Debug, Clone)]
pub struct FileSink {
    directory: PathBuf,
}

impl FileSink {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    pub fn from_target(target: &SaveTarget) -> Self {
        Self::new(target.directory.clone())
    }
}

impl ShareSink for FileSink {
    fn deliver(&self, name: &str, png: &[u8]) -> Result<Option<PathBuf>, CaptureError> {
        let directory = ensure_directory_exists(&self.directory)?;
        let path = directory.join(format!("{name}.png"));
        write_private(&path, png)?;
        log::info!("Shared screenshot written to {}", path.display());
        Ok(Some(path))
    }
}

struct ShareRequest {
    image: Arc<PixelBuffer>,
    name: String,
}

/// Runs share requests in the background so editing never waits on them.
///
/// Each request carries an immutable snapshot of the composed image; encoding and
/// delivery happen on a blocking worker.
#[derive(Clone)]
pub struct ShareManager {
    request_tx: mpsc::UnboundedSender<ShareRequest>,
    status: Arc<watch::Sender<ShareStatus>>,
}

impl ShareManager {
    /// Spawns the request loop on `runtime_handle`.
    pub fn new(runtime_handle: &tokio::runtime::Handle, sink: Arc<dyn ShareSink>) -> Self {
        let (request_tx, mut request_rx) = mpsc::unbounded_channel::<ShareRequest>();
        let status = Arc::new(watch::Sender::new(ShareStatus::Idle));

        let status_clone = status.clone();
        runtime_handle.spawn(async move {
            while let Some(request) = request_rx.recv().await {
                log::debug!(
                    "Processing share request '{}' ({}x{})",
                    request.name,
                    request.image.width(),
                    request.image.height()
                );

                let sink = sink.clone();
                let outcome = tokio::task::spawn_blocking(move || {
                    let bytes = encode_png(&request.image)?;
                    sink.deliver(&request.name, &bytes)
                })
                .await;

                let next = match outcome {
                    Ok(Ok(location)) => {
                        log::info!("Share delivered: {:?}", location);
                        ShareStatus::Delivered(location)
                    }
                    Ok(Err(e)) => {
                        log::error!("Share failed: {}", e);
                        ShareStatus::Failed(e.to_string())
                    }
                    Err(e) => {
                        log::error!("Share worker failed: {}", e);
                        ShareStatus::Failed(format!("share worker failed: {e}"))
                    }
                };
                status_clone.send_replace(next);
            }
        });

        Self { request_tx, status }
    }

    /// Queues `image` for sharing under `name`. Returns immediately.
    pub fn request_share(&self, image: Arc<PixelBuffer>, name: &str) -> Result<(), CaptureError> {
        self.status.send_replace(ShareStatus::InProgress);
        self.request_tx
            .send(ShareRequest {
                image,
                name: name.to_string(),
            })
            .map_err(|_| {
                let message = "Share manager not running".to_string();
                self.status.send_replace(ShareStatus::Failed(message.clone()));
                CaptureError::ShareFailed(message)
            })
    }

    pub fn status(&self) -> ShareStatus {
        self.status.borrow().clone()
    }

    /// Waits until the current request has been delivered or has failed.
    pub async fn wait_finished(&self) -> ShareStatus {
        let mut rx = self.status.subscribe();
        match rx.wait_for(|status| status.is_finished()).await {
            Ok(status) => status.clone(),
            Err(_) => self.status(),
        }
    }

    pub fn reset(&self) {
        self.status.send_replace(ShareStatus::Idle);
    }
}

#[cfg(test)]
impl ShareManager {
    pub(crate) fn with_closed_channel_for_test() -> Self {
        let (tx, rx) = mpsc::unbounded_channel::<ShareRequest>();
        drop(rx);
        Self {
            request_tx: tx,
            status: Arc::new(watch::Sender::new(ShareStatus::Idle)),
        }
    }
}
