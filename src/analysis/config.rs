use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Sampling cadence and eye-contact thresholds for the body-language pipeline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AnalysisConfig {
    /// One detector call per tick.
    pub sample_interval_ms: u64,

    /// Number of most recent samples behind the live metrics.
    pub live_window: usize,

    /// A detection slower than this is abandoned for the tick.
    pub detection_timeout_ms: u64,

    /// Face centre must sit within these fractions of the frame size from the middle.
    pub center_tolerance_x: f64,
    pub center_tolerance_y: f64,

    /// |yaw| and |pitch| must both stay under this many degrees.
    pub facing_threshold_deg: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            sample_interval_ms: 2_000,
            live_window: 10,
            detection_timeout_ms: 5_000,
            center_tolerance_x: 0.2,
            center_tolerance_y: 0.25,
            facing_threshold_deg: 15.0,
        }
    }
}

impl AnalysisConfig {
    pub fn sample_interval(&self) -> Duration {
        Duration::from_millis(self.sample_interval_ms.max(1))
    }

    pub fn detection_timeout(&self) -> Duration {
        Duration::from_millis(self.detection_timeout_ms.max(1))
    }
}
