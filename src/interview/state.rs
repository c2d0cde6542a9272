use serde::{Deserialize, Serialize};

use crate::models::{ChatMessage, UserInfo};

use super::script;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum InterviewPhase {
    /// Interviewer asks, candidate answers.
    Questioning,
    /// Wrap-up asked whether the candidate has questions.
    WrappingUp,
    /// Candidate said yes; their actual question is expected next.
    AwaitingQuestion,
    Finished,
}

impl Default for InterviewPhase {
    fn default() -> Self {
        InterviewPhase::Questioning
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterviewState {
    pub phase: InterviewPhase,
    pub user_info: UserInfo,
    pub question_count: u32,
    pub max_questions: u32,
    pub messages: Vec<ChatMessage>,
    pub evaluated: bool,
}

impl InterviewState {
    /// Fresh interview with the greeting already in the transcript.
    pub fn new(user_info: UserInfo, max_questions: u32) -> Self {
        let greeting = script::greeting(user_info.interview_type, user_info.is_video());
        Self {
            phase: InterviewPhase::Questioning,
            user_info,
            question_count: 0,
            max_questions,
            messages: vec![ChatMessage::ai(greeting)],
            evaluated: false,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.phase == InterviewPhase::Finished
    }

    pub fn is_video(&self) -> bool {
        self.user_info.is_video()
    }

    /// The answer that bumps the count past the last question triggers wrap-up.
    pub fn reached_wrap_up(&self) -> bool {
        self.question_count >= self.max_questions + 1
    }

    pub fn push_user(&mut self, content: impl Into<String>) {
        self.messages.push(ChatMessage::user(content));
    }

    pub fn push_ai(&mut self, content: impl Into<String>) -> ChatMessage {
        let message = ChatMessage::ai(content);
        self.messages.push(message.clone());
        message
    }

    pub fn finish_with(&mut self, closing: impl Into<String>) -> ChatMessage {
        self.phase = InterviewPhase::Finished;
        self.push_ai(closing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{InterviewMode, InterviewType, Role};

    #[test]
    fn starts_with_type_specific_greeting() {
        let state = InterviewState::new(UserInfo::new("Ada", InterviewType::Managerial), 5);
        assert_eq!(state.phase, InterviewPhase::Questioning);
        assert_eq!(state.messages.len(), 1);
        assert_eq!(state.messages[0].role, Role::Ai);
        assert!(state.messages[0].content.contains("managerial interview"));

        let mut video = UserInfo::new("Ada", InterviewType::Technical);
        video.mode = Some(InterviewMode::Video);
        let state = InterviewState::new(video, 5);
        assert!(state.messages[0].content.contains("video-enabled"));
    }

    #[test]
    fn wrap_up_comes_after_one_extra_answer() {
        let mut state = InterviewState::new(UserInfo::new("Ada", InterviewType::Hr), 5);
        state.question_count = 5;
        assert!(!state.reached_wrap_up());
        state.question_count = 6;
        assert!(state.reached_wrap_up());
    }
}
