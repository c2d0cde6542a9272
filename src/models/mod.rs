pub mod interview;

pub use interview::{
    AttemptScore, ChatMessage, InterviewMode, InterviewRecord, InterviewType, Progress, Role,
    StoredInterview, Trend, UserInfo,
};
