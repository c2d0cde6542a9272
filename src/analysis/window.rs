use crate::analysis::aggregate::aggregate_metrics;
use crate::analysis::types::{AggregateMetrics, FrameSample, LiveMetrics};

pub const DEFAULT_LIVE_WINDOW: usize = 10;

/// Append-only sample sequence owned by a single interview session.
///
/// Live feedback aggregates only the trailing window; the final report
/// aggregates everything. Both go through the same `aggregate_metrics`.
#[derive(Debug, Clone)]
pub struct SampleLog {
    samples: Vec<FrameSample>,
    live_window: usize,
}

impl Default for SampleLog {
    fn default() -> Self {
        Self::new(DEFAULT_LIVE_WINDOW)
    }
}

impl SampleLog {
    pub fn new(live_window: usize) -> Self {
        Self {
            samples: Vec::new(),
            live_window: live_window.max(1),
        }
    }

    pub fn push(&mut self, sample: FrameSample) {
        self.samples.push(sample);
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn samples(&self) -> &[FrameSample] {
        &self.samples
    }

    /// The most recent `live_window` samples (fewer at session start).
    pub fn live_window(&self) -> &[FrameSample] {
        let start = self.samples.len().saturating_sub(self.live_window);
        &self.samples[start..]
    }

    pub fn live_aggregate(&self) -> AggregateMetrics {
        aggregate_metrics(self.live_window())
    }

    pub fn live_metrics(&self) -> LiveMetrics {
        LiveMetrics::from(&self.live_aggregate())
    }

    pub fn final_metrics(&self) -> AggregateMetrics {
        aggregate_metrics(&self.samples)
    }

    pub fn into_samples(self) -> Vec<FrameSample> {
        self.samples
    }
}
