use anyhow::{Context, Result};

use crate::models::{ChatMessage, InterviewType, Role, UserInfo};
use crate::settings::LlmSettings;

use super::client::{ApiMessage, ChatRequest};

pub const FALLBACK_REPLY: &str = "I apologize, I couldn't generate a response.";

pub fn system_instruction(interview_type: InterviewType) -> String {
    format!(
        "You are an expert AI Interviewer conducting a {interview_type} interview.\n\
Your goal is to assess the candidate's skills, confidence, and problem-solving abilities.\n\
- Ask one question at a time.\n\
- Be professional but encouraging.\n\
- If the user's answer is brief, ask follow-up questions.\n\
- Do not give away the answer, but hint if they are stuck.\n\
- Keep responses concise and focused."
    )
}

fn to_api_message(message: &ChatMessage) -> ApiMessage {
    match message.role {
        Role::Ai => ApiMessage::assistant(message.content.clone()),
        Role::User => ApiMessage::user(message.content.clone()),
    }
}

/// Next interviewer turn: system instruction followed by the whole transcript.
pub fn interviewer_request(
    interview_type: InterviewType,
    history: &[ChatMessage],
    llm: &LlmSettings,
) -> ChatRequest {
    let mut messages = Vec::with_capacity(history.len() + 1);
    messages.push(ApiMessage::system(system_instruction(interview_type)));
    messages.extend(history.iter().map(to_api_message));

    ChatRequest {
        messages,
        max_tokens: llm.chat_max_tokens,
        temperature: llm.chat_temperature,
    }
}

fn evaluation_prompt(history: &[ChatMessage], user: &UserInfo) -> Result<String> {
    let transcript =
        serde_json::to_string_pretty(history).context("Failed to serialize chat history")?;
    let video = user.is_video();

    let mode = if video {
        "Video (with body language analysis)"
    } else {
        "Text/Voice"
    };
    let body_language = if video {
        r#",
    "body_language": {
      "score": <number 0-100>,
      "feedback": "<feedback about body language, eye contact, facial expressions>"
    }"#
    } else {
        ""
    };

    Ok(format!(
        r#"Analyze the following interview conversation and provide a comprehensive evaluation in JSON format.

Conversation History:
{transcript}

Interview Type: {interview_type}
Interview Mode: {mode}

Provide your response as a valid JSON object with these EXACT fields:

{{
  "overall_score": <number 0-100>,
  "parameter_scores": {{
    "confidence": {{
      "score": <number 0-100>,
      "feedback": "<specific feedback about confidence level>"
    }},
    "communication_clarity": {{
      "score": <number 0-100>,
      "feedback": "<specific feedback about communication>"
    }},
    "technical_accuracy": {{
      "score": <number 0-100>,
      "feedback": "<specific feedback about technical knowledge>"
    }},
    "problem_solving": {{
      "score": <number 0-100>,
      "feedback": "<specific feedback about problem-solving approach>"
    }}{body_language}
  }},
  "general_feedback": "<overall summary of performance>",
  "strengths": ["<strength 1>", "<strength 2>", ...],
  "areas_for_improvement": ["<area 1>", "<area 2>", ...],
  "personalized_suggestions": [
    {{
      "area": "<specific skill or topic>",
      "suggestion": "<actionable advice to improve>",
      "resources": "<optional learning resource or practice tip>"
    }}
  ]
}}

Be specific, constructive, and provide actionable feedback. Respond with ONLY the JSON object, no markdown formatting."#,
        interview_type = user.interview_type,
    ))
}

/// Single-turn request asking for the structured evaluation of a transcript.
pub fn evaluation_request(
    history: &[ChatMessage],
    user: &UserInfo,
    llm: &LlmSettings,
) -> Result<ChatRequest> {
    Ok(ChatRequest {
        messages: vec![ApiMessage::user(evaluation_prompt(history, user)?)],
        max_tokens: llm.evaluation_max_tokens,
        temperature: llm.evaluation_temperature,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::InterviewMode;

    #[test]
    fn transcript_roles_map_to_wire_roles() {
        let history = vec![ChatMessage::ai("Shall we begin?"), ChatMessage::user("Yes")];
        let request = interviewer_request(InterviewType::Hr, &history, &LlmSettings::default());

        let roles: Vec<_> = request.messages.iter().map(|m| m.role).collect();
        assert_eq!(roles, vec!["system", "assistant", "user"]);
        assert!(request.messages[0].content.contains("conducting a HR interview"));
        assert_eq!(request.max_tokens, 1024);
        assert_eq!(request.temperature, 0.7);
    }

    #[test]
    fn body_language_only_requested_in_video_mode() {
        let history = vec![ChatMessage::user("I led the migration.")];
        let mut user = UserInfo::new("Ada", InterviewType::Technical);

        let text = evaluation_request(&history, &user, &LlmSettings::default()).unwrap();
        let prompt = &text.messages[0].content;
        assert!(!prompt.contains("body_language"));
        assert!(prompt.contains("Interview Mode: Text/Voice"));
        assert!(prompt.contains("I led the migration."));
        assert_eq!(text.max_tokens, 2048);

        user.mode = Some(InterviewMode::Video);
        let video = evaluation_request(&history, &user, &LlmSettings::default()).unwrap();
        assert!(video.messages[0].content.contains("\"body_language\""));
    }
}
