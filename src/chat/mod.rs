pub mod classifier;
pub mod client;
pub mod evaluation;
pub mod prompts;

pub use classifier::{classify_reply, ReplyIntent};
pub use client::{ApiMessage, ChatBackend, ChatRequest, LiteRouterClient};
pub use evaluation::{parse_evaluation, Evaluation, ParameterScore, Suggestion};
