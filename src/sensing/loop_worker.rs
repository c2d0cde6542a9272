use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use anyhow::{Context, Result};
use tokio::sync::{watch, Mutex};
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::analysis::{extract_sample, AnalysisConfig, FrameSample, LiveMetrics, SampleLog};

use super::camera::CameraLease;
use super::model::DetectorHandle;

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_error, log_info, log_warn};

/// Everything one camera run needs; cloned into the spawned loop.
#[derive(Clone)]
pub(crate) struct LoopContext {
    pub camera: CameraLease,
    pub detector: DetectorHandle,
    pub samples: Arc<Mutex<SampleLog>>,
    pub camera_ready: Arc<AtomicBool>,
    pub live_tx: Arc<watch::Sender<LiveMetrics>>,
    pub config: AnalysisConfig,
}

/// One capture + detection per tick until cancelled.
///
/// Ticks are never overlapped: a slow detection delays the next tick. Errors
/// and timeouts drop the tick and the loop carries on.
pub(crate) async fn analysis_loop(ctx: LoopContext, cancel_token: CancellationToken) {
    let period = ctx.config.sample_interval();
    let timeout = ctx.config.detection_timeout();
    let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    log_info!("analysis loop started (every {}ms)", period.as_millis());

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if !ctx.camera_ready.load(Ordering::SeqCst) {
                    log_debug!("skipping analysis - camera not ready");
                    continue;
                }

                let outcome = tokio::select! {
                    result = tokio::time::timeout(timeout, analyze_tick(&ctx)) => result,
                    _ = cancel_token.cancelled() => {
                        log_debug!("discarding in-flight analysis on shutdown");
                        break;
                    }
                };

                match outcome {
                    Ok(Ok(Some(sample))) => accept_sample(&ctx, sample).await,
                    Ok(Ok(None)) => log_debug!("no face in frame"),
                    Ok(Err(err)) => log_error!("frame analysis failed: {err:#}"),
                    Err(_) => log_warn!("frame analysis timeout (> {}ms)", timeout.as_millis()),
                }
            }
            _ = cancel_token.cancelled() => {
                break;
            }
        }
    }

    log_info!("analysis loop shutting down");
}

async fn analyze_tick(ctx: &LoopContext) -> Result<Option<FrameSample>> {
    let camera = ctx.camera.clone();
    let frame = tokio::task::spawn_blocking(move || camera.capture())
        .await
        .context("camera capture worker join failed")??;

    let Some(detection) = ctx.detector.analyze(&frame).await? else {
        return Ok(None);
    };

    Ok(extract_sample(
        &detection,
        frame.dimensions(),
        &ctx.config,
        frame.captured_at,
    ))
}

async fn accept_sample(ctx: &LoopContext, sample: FrameSample) {
    // The camera may have been stopped while the detector was running.
    if !ctx.camera_ready.load(Ordering::SeqCst) {
        log_debug!("dropping sample that finished after the camera stopped");
        return;
    }

    let live = {
        let mut samples = ctx.samples.lock().await;
        samples.push(sample);
        samples.live_metrics()
    };

    log_debug!(
        "live metrics: eye contact {}%, confidence {}, engagement {}",
        live.eye_contact_percent,
        live.confidence_score,
        live.engagement_score
    );
    ctx.live_tx.send_replace(live);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{Detection, ExpressionScores, HeadPose};
    use crate::sensing::camera::tests::FakeCamera;
    use crate::sensing::detector::{FaceDetector, Frame};
    use async_trait::async_trait;
    use chrono::Utc;

    struct NoFace;

    #[async_trait]
    impl FaceDetector for NoFace {
        async fn load(&self) -> Result<()> {
            Ok(())
        }

        async fn detect(&self, _frame: &Frame) -> Result<Option<Detection>> {
            Ok(None)
        }
    }

    fn context(camera_ready: bool) -> LoopContext {
        let (live_tx, _) = watch::channel(LiveMetrics::default());
        LoopContext {
            camera: CameraLease::acquire(Box::new(FakeCamera::default())).unwrap(),
            detector: DetectorHandle::new(Arc::new(NoFace)),
            samples: Arc::new(Mutex::new(SampleLog::new(10))),
            camera_ready: Arc::new(AtomicBool::new(camera_ready)),
            live_tx: Arc::new(live_tx),
            config: AnalysisConfig::default(),
        }
    }

    fn looking_away() -> FrameSample {
        FrameSample {
            expressions: ExpressionScores::all_neutral(),
            confidence: 0.7,
            eye_contact: false,
            head_pose: HeadPose::default(),
            timestamp: Utc::now(),
        }
    }

    #[tokio::test]
    async fn sample_finishing_after_stop_is_dropped() {
        let ctx = context(false);
        let live = ctx.live_tx.subscribe();

        accept_sample(&ctx, looking_away()).await;

        assert!(ctx.samples.lock().await.is_empty());
        assert!(!live.has_changed().unwrap());
    }

    #[tokio::test]
    async fn accepted_sample_updates_live_metrics() {
        let ctx = context(true);
        let live = ctx.live_tx.subscribe();

        accept_sample(&ctx, looking_away()).await;

        assert_eq!(ctx.samples.lock().await.len(), 1);
        assert!(live.has_changed().unwrap());
        assert_eq!(ctx.live_tx.borrow().eye_contact_percent, 0);
    }
}
