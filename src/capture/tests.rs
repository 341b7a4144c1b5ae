use std::{
    path::PathBuf,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;

use super::{
    file::SaveTarget,
    share::{FileSink, ShareManager, ShareSink},
    source::{CaptureSource, FileSource, start_session},
    types::{CaptureError, ShareStatus},
};
use crate::draw::{
    PixelBuffer,
    color::{BLUE, RED},
};
use crate::geometry::Rect;

#[derive(Clone)]
struct MockSource {
    image: PixelBuffer,
    requested: Arc<Mutex<Vec<Rect>>>,
    crop: bool,
}

impl MockSource {
    fn new(image: PixelBuffer, crop: bool) -> Self {
        Self {
            image,
            requested: Arc::new(Mutex::new(Vec::new())),
            crop,
        }
    }
}

#[async_trait]
impl CaptureSource for MockSource {
    async fn capture_region(&self, bounds: Rect) -> Result<PixelBuffer, CaptureError> {
        self.requested.lock().unwrap().push(bounds);
        if self.crop {
            Ok(self.image.sub_image(bounds))
        } else {
            Ok(self.image.clone())
        }
    }

    async fn full_bounds(&self) -> Result<Rect, CaptureError> {
        Ok(self.image.bounds())
    }
}

#[derive(Clone, Default)]
struct MockSink {
    should_fail: bool,
    received: Arc<Mutex<Vec<(String, usize)>>>,
}

impl ShareSink for MockSink {
    fn deliver(&self, name: &str, png: &[u8]) -> Result<Option<PathBuf>, CaptureError> {
        self.received
            .lock()
            .unwrap()
            .push((name.to_string(), png.len()));
        if self.should_fail {
            Err(CaptureError::ShareFailed("upload rejected".to_string()))
        } else {
            Ok(None)
        }
    }
}

fn sample_image() -> PixelBuffer {
    PixelBuffer::from_fn(40, 30, |x, _| if x < 20 { RED } else { BLUE })
}

#[tokio::test]
async fn start_session_returns_exact_region() {
    let source = MockSource::new(sample_image(), true);
    let bounds = Rect::from_coords(30, 20, 10, 5);
    let image = start_session(&source, bounds).await.unwrap();
    assert_eq!(image.size(), (20, 15));
    assert_eq!(image.get(0, 0), Some(RED));
    assert_eq!(image.get(19, 0), Some(BLUE));
    assert_eq!(
        source.requested.lock().unwrap().as_slice(),
        &[Rect::from_coords(10, 5, 30, 20)]
    );
}

#[tokio::test]
async fn start_session_rejects_mismatched_buffers() {
    let source = MockSource::new(sample_image(), false);
    let err = start_session(&source, Rect::from_coords(0, 0, 10, 10))
        .await
        .unwrap_err();
    match err {
        CaptureError::RegionMismatch { requested, actual } => {
            assert_eq!(requested, Rect::from_coords(0, 0, 10, 10));
            assert_eq!(actual, Rect::from_coords(0, 0, 40, 30));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn start_session_rejects_empty_region() {
    let source = MockSource::new(sample_image(), true);
    let err = start_session(&source, Rect::from_coords(5, 5, 5, 9))
        .await
        .unwrap_err();
    assert!(matches!(err, CaptureError::EmptyRegion(_)));
    assert!(source.requested.lock().unwrap().is_empty());
}

#[tokio::test]
async fn file_source_reads_png_and_checks_bounds() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("screen.png");
    std::fs::write(&path, super::encode_png(&sample_image()).unwrap()).unwrap();

    let source = FileSource::new(&path);
    assert_eq!(
        source.full_bounds().await.unwrap(),
        Rect::from_coords(0, 0, 40, 30)
    );
    let region = source
        .capture_region(Rect::from_coords(18, 0, 22, 2))
        .await
        .unwrap();
    assert_eq!(region.get(1, 1), Some(RED));
    assert_eq!(region.get(2, 1), Some(BLUE));

    let outside = source.capture_region(Rect::from_coords(30, 0, 50, 10)).await;
    assert!(matches!(outside, Err(CaptureError::RegionMismatch { .. })));
}

#[tokio::test]
async fn file_source_missing_file_is_io_error() {
    let source = FileSource::new("/nonexistent/shotscribe/screen.png");
    let err = source.full_bounds().await.unwrap_err();
    assert!(matches!(err, CaptureError::Io(_)));
}

#[tokio::test(flavor = "multi_thread")]
async fn share_manager_delivers_snapshot_in_background() {
    let sink = MockSink::default();
    let manager = ShareManager::new(&tokio::runtime::Handle::current(), Arc::new(sink.clone()));
    assert_eq!(manager.status(), ShareStatus::Idle);

    manager
        .request_share(Arc::new(sample_image()), "Screenshot test")
        .unwrap();
    let status = manager.wait_finished().await;
    assert_eq!(status, ShareStatus::Delivered(None));

    let received = sink.received.lock().unwrap();
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].0, "Screenshot test");
    assert!(received[0].1 > 8);
}

#[tokio::test(flavor = "multi_thread")]
async fn share_manager_reports_sink_failure() {
    let sink = MockSink {
        should_fail: true,
        ..MockSink::default()
    };
    let manager = ShareManager::new(&tokio::runtime::Handle::current(), Arc::new(sink));
    manager
        .request_share(Arc::new(sample_image()), "broken")
        .unwrap();
    match manager.wait_finished().await {
        ShareStatus::Failed(message) => assert!(message.contains("upload rejected")),
        other => panic!("unexpected status: {other:?}"),
    }
    manager.reset();
    assert_eq!(manager.status(), ShareStatus::Idle);
}

#[tokio::test(flavor = "multi_thread")]
async fn file_sink_writes_named_png() {
    let dir = tempfile::tempdir().unwrap();
    let target = SaveTarget {
        directory: dir.path().to_path_buf(),
        filename_template: "unused".into(),
    };
    let manager = ShareManager::new(
        &tokio::runtime::Handle::current(),
        Arc::new(FileSink::from_target(&target)),
    );
    manager
        .request_share(Arc::new(sample_image()), "Screenshot 2024-01-01 00-00-00")
        .unwrap();
    match manager.wait_finished().await {
        ShareStatus::Delivered(Some(path)) => {
            assert!(path.ends_with("Screenshot 2024-01-01 00-00-00.png"));
            assert!(path.exists());
        }
        other => panic!("unexpected status: {other:?}"),
    }
}

#[test]
fn closed_share_manager_fails_fast() {
    let manager = ShareManager::with_closed_channel_for_test();
    let err = manager
        .request_share(Arc::new(sample_image()), "x")
        .unwrap_err();
    assert!(matches!(err, CaptureError::ShareFailed(_)));
    assert!(matches!(manager.status(), ShareStatus::Failed(_)));
}
