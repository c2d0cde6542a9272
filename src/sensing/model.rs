use std::sync::Arc;

use anyhow::{bail, Result};
use log::{info, warn};
use tokio::sync::Mutex;

use crate::analysis::Detection;

use super::detector::{FaceDetector, Frame};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelState {
    Unloaded,
    Loaded,
    Failed(String),
}

struct DetectorInner {
    detector: Arc<dyn FaceDetector>,
    state: Mutex<ModelState>,
}

/// Owned, lazily-loaded detector. Models load on first `ensure_loaded` and the
/// handle refuses to run detections until they have.
#[derive(Clone)]
pub struct DetectorHandle {
    inner: Arc<DetectorInner>,
}

impl DetectorHandle {
    pub fn new(detector: Arc<dyn FaceDetector>) -> Self {
        Self {
            inner: Arc::new(DetectorInner {
                detector,
                state: Mutex::new(ModelState::Unloaded),
            }),
        }
    }

    pub async fn state(&self) -> ModelState {
        self.inner.state.lock().await.clone()
    }

    pub async fn is_loaded(&self) -> bool {
        *self.inner.state.lock().await == ModelState::Loaded
    }

    /// Loads the models unless already loaded. A previous failure is retried.
    pub async fn ensure_loaded(&self) -> Result<()> {
        let mut state = self.inner.state.lock().await;
        if *state == ModelState::Loaded {
            return Ok(());
        }

        match self.inner.detector.load().await {
            Ok(()) => {
                info!("Face detection models loaded");
                *state = ModelState::Loaded;
                Ok(())
            }
            Err(err) => {
                warn!("Failed to load face detection models: {err:#}");
                *state = ModelState::Failed(format!("{err:#}"));
                Err(err.context("face detection models unavailable"))
            }
        }
    }

    /// Runs one detection. Frames that are not ready yield `Ok(None)` without
    /// touching the model.
    pub async fn analyze(&self, frame: &Frame) -> Result<Option<Detection>> {
        if !self.is_loaded().await {
            bail!("face detection models are not loaded");
        }
        if !frame.is_ready() {
            return Ok(None);
        }
        self.inner.detector.detect(frame).await
    }
}
