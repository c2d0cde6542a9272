//! Fixed interviewer lines. Everything else the interviewer says comes from
//! the chat backend.

use crate::models::InterviewType;

pub const WRAP_UP: &str = "Thank you so much for participating in this interview! You've done a great job. Do you have any questions for me before we wrap up?";
pub const WRAP_UP_VIDEO: &str = "Thank you for participating! Your body language analysis is complete. Do you have any questions before we wrap up?";

pub const CLOSING: &str = "Thank you for your response! It was wonderful speaking with you. Your interview evaluation is ready.";
pub const CLOSING_VIDEO: &str = "Thank you for your time! It was great speaking with you. Your video interview evaluation with body language analysis is ready.";

pub const PROMPT_FOR_QUESTION: &str = "I'd be happy to answer! What would you like to know about the role, the company, or the interview process?";
pub const ANSWER_SIGN_OFF: &str = "Thank you again for your time! Your evaluation is now ready.";
pub const ANSWER_FAILED: &str = "Thank you for your question! Unfortunately I couldn't process it fully. Your interview evaluation is ready.";

pub fn greeting(interview_type: InterviewType, video: bool) -> &'static str {
    match (interview_type, video) {
        (InterviewType::Technical, false) => "Hello! I am your AI Interviewer. I'm here to conduct a technical interview with you regarding your experience with React and Next.js. Shall we begin?",
        (InterviewType::Hr, false) => "Hello! I am your AI Interviewer. I'm here to conduct an HR interview to understand your background, motivations, and cultural fit. Shall we begin?",
        (InterviewType::Managerial, false) => "Hello! I am your AI Interviewer. I'm here to conduct a managerial interview to assess your leadership skills, decision-making abilities, and team management experience. Shall we begin?",
        (InterviewType::Technical, true) => "Hello! I am your AI Interviewer. This is a video-enabled interview. I can see your facial expressions and body language. Please ensure your camera is on. Shall we begin?",
        (InterviewType::Hr, true) => "Hello! I am your AI Interviewer. This is a video-enabled HR interview. Please keep your camera on for the full experience. Shall we begin?",
        (InterviewType::Managerial, true) => "Hello! I am your AI Interviewer. This is a video-enabled managerial interview. Your body language will be analyzed. Shall we begin?",
    }
}

pub fn wrap_up(video: bool) -> &'static str {
    if video {
        WRAP_UP_VIDEO
    } else {
        WRAP_UP
    }
}

pub fn closing(video: bool) -> &'static str {
    if video {
        CLOSING_VIDEO
    } else {
        CLOSING
    }
}
