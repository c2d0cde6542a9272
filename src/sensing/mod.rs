pub mod camera;
pub mod controller;
pub mod detector;
mod loop_worker;
pub mod model;

pub use camera::{CameraDevice, CameraLease};
pub use controller::SensingController;
pub use detector::{FaceDetector, Frame, FrameReadiness};
pub use model::{DetectorHandle, ModelState};
