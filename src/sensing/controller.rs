use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use anyhow::{bail, Context, Result};
use log::{info, warn};
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::analysis::{AggregateMetrics, AnalysisConfig, LiveMetrics, SampleLog};

use super::camera::{CameraDevice, CameraLease};
use super::loop_worker::{analysis_loop, LoopContext};
use super::model::DetectorHandle;

/// Owns the camera and the analysis loop for one interview session.
///
/// The sample log lives as long as the controller; restarting the camera keeps
/// appending to it.
pub struct SensingController {
    detector: DetectorHandle,
    config: AnalysisConfig,
    handle: Option<JoinHandle<()>>,
    cancel_token: Option<CancellationToken>,
    camera: Option<CameraLease>,
    camera_ready: Arc<AtomicBool>,
    samples: Arc<Mutex<SampleLog>>,
    live_tx: Arc<watch::Sender<LiveMetrics>>,
}

impl SensingController {
    pub fn new(detector: DetectorHandle, config: AnalysisConfig) -> Self {
        let (live_tx, _) = watch::channel(LiveMetrics::default());
        Self {
            detector,
            samples: Arc::new(Mutex::new(SampleLog::new(config.live_window))),
            config,
            handle: None,
            cancel_token: None,
            camera: None,
            camera_ready: Arc::new(AtomicBool::new(false)),
            live_tx: Arc::new(live_tx),
        }
    }

    pub fn is_active(&self) -> bool {
        self.handle.is_some()
    }

    pub fn is_camera_ready(&self) -> bool {
        self.camera_ready.load(Ordering::SeqCst)
    }

    /// Loads the detector if needed, opens the camera and starts sampling.
    ///
    /// On error nothing is left running and the session can continue
    /// without video.
    pub async fn start(&mut self, device: Box<dyn CameraDevice>) -> Result<()> {
        if self.handle.is_some() {
            bail!("camera analysis already active");
        }

        self.detector.ensure_loaded().await?;
        let camera = CameraLease::acquire(device)?;

        let cancel_token = CancellationToken::new();
        let ctx = LoopContext {
            camera: camera.clone(),
            detector: self.detector.clone(),
            samples: self.samples.clone(),
            camera_ready: self.camera_ready.clone(),
            live_tx: self.live_tx.clone(),
            config: self.config.clone(),
        };

        self.camera_ready.store(true, Ordering::SeqCst);
        let handle = tokio::spawn(analysis_loop(ctx, cancel_token.clone()));

        self.handle = Some(handle);
        self.cancel_token = Some(cancel_token);
        self.camera = Some(camera);
        info!("Camera ready and analysis started");
        Ok(())
    }

    /// Stops sampling and releases the camera. Safe to call when idle.
    pub async fn stop(&mut self) -> Result<()> {
        self.camera_ready.store(false, Ordering::SeqCst);

        if let Some(token) = self.cancel_token.take() {
            token.cancel();
        }

        let joined = match self.handle.take() {
            Some(handle) => handle
                .await
                .context("analysis loop task failed to join")
                .map(|_| ()),
            None => Ok(()),
        };

        if let Some(camera) = self.camera.take() {
            camera.release();
        }

        joined
    }

    pub fn subscribe(&self) -> watch::Receiver<LiveMetrics> {
        self.live_tx.subscribe()
    }

    pub fn live_metrics(&self) -> LiveMetrics {
        self.live_tx.borrow().clone()
    }

    pub async fn sample_count(&self) -> usize {
        self.samples.lock().await.len()
    }

    /// Report-grade metrics over every sample collected so far.
    pub async fn final_metrics(&self) -> AggregateMetrics {
        self.samples.lock().await.final_metrics()
    }

    /// Copy of every sample collected so far; the log itself is untouched.
    pub async fn snapshot(&self) -> SampleLog {
        self.samples.lock().await.clone()
    }

    /// Hands the collected samples to the caller, leaving an empty log behind.
    pub async fn take_samples(&self) -> SampleLog {
        let mut samples = self.samples.lock().await;
        std::mem::replace(&mut *samples, SampleLog::new(self.config.live_window))
    }
}

impl Drop for SensingController {
    fn drop(&mut self) {
        self.camera_ready.store(false, Ordering::SeqCst);
        if let Some(token) = self.cancel_token.take() {
            token.cancel();
        }
        // Detached; the loop exits on cancellation.
        self.handle.take();
        if let Some(camera) = self.camera.take() {
            warn!("Sensing controller dropped while camera was active");
            camera.release();
        }
    }
}
