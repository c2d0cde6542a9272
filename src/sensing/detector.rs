use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use image::RgbImage;

use crate::analysis::{Detection, FrameDimensions};

/// Playback state of the video source at capture time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameReadiness {
    Ready,
    Paused,
    Ended,
    /// Not enough decoded data yet.
    Buffering,
}

/// A single captured video frame.
#[derive(Debug, Clone)]
pub struct Frame {
    pub image: RgbImage,
    pub captured_at: DateTime<Utc>,
    pub readiness: FrameReadiness,
}

impl Frame {
    pub fn new(image: RgbImage, readiness: FrameReadiness) -> Self {
        Self {
            image,
            captured_at: Utc::now(),
            readiness,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.readiness == FrameReadiness::Ready
    }

    pub fn dimensions(&self) -> FrameDimensions {
        let (width, height) = self.image.dimensions();
        FrameDimensions::new(width, height)
    }
}

/// Face / landmark / expression model behind a narrow interface.
///
/// `detect` returns at most one face; `Ok(None)` means nobody was found.
#[async_trait]
pub trait FaceDetector: Send + Sync {
    /// Load model weights. Called once through `DetectorHandle`.
    async fn load(&self) -> Result<()>;

    async fn detect(&self, frame: &Frame) -> Result<Option<Detection>>;
}
