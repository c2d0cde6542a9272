pub mod aggregate;
pub mod config;
pub mod features;
pub mod types;
pub mod window;

pub use aggregate::aggregate_metrics;
pub use config::AnalysisConfig;
pub use features::extract_sample;
pub use types::{
    AggregateMetrics, Detection, Expression, ExpressionScores, FaceBox, FaceLandmarks,
    FrameDimensions, FrameSample, HeadPose, LiveMetrics, Point,
};
pub use window::SampleLog;
