mod controller;
pub mod script;
mod state;

pub use controller::{InterviewController, InterviewOutcome};
pub use state::{InterviewPhase, InterviewState};
