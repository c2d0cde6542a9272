//! Interview data models.
//!
//! Records are persisted as JSON files with snake_case keys; chat messages keep
//! the `user` / `ai` role names the transcript has always used.

use std::fmt;
use std::str::FromStr;

use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::analysis::{AggregateMetrics, FrameSample};
use crate::chat::Evaluation;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum InterviewType {
    Technical,
    #[serde(rename = "HR")]
    Hr,
    Managerial,
}

impl InterviewType {
    pub fn as_str(&self) -> &'static str {
        match self {
            InterviewType::Technical => "Technical",
            InterviewType::Hr => "HR",
            InterviewType::Managerial => "Managerial",
        }
    }
}

impl Default for InterviewType {
    fn default() -> Self {
        InterviewType::Technical
    }
}

impl fmt::Display for InterviewType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InterviewType {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.to_ascii_lowercase().as_str() {
            "technical" => Ok(InterviewType::Technical),
            "hr" => Ok(InterviewType::Hr),
            "managerial" => Ok(InterviewType::Managerial),
            other => Err(anyhow!("unknown interview type '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum InterviewMode {
    Text,
    Voice,
    Video,
}

impl Default for InterviewMode {
    fn default() -> Self {
        InterviewMode::Text
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserInfo {
    #[serde(default = "anonymous")]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default)]
    pub interview_type: InterviewType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<InterviewMode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
}

fn anonymous() -> String {
    "Anonymous".to_string()
}

impl Default for UserInfo {
    fn default() -> Self {
        Self::new(anonymous(), InterviewType::default())
    }
}

impl UserInfo {
    pub fn new(name: impl Into<String>, interview_type: InterviewType) -> Self {
        Self {
            name: name.into(),
            email: None,
            interview_type,
            mode: None,
            started_at: None,
        }
    }

    pub fn is_video(&self) -> bool {
        self.mode == Some(InterviewMode::Video)
    }

    pub fn matches_name(&self, name: &str) -> bool {
        self.name.to_lowercase() == name.to_lowercase()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Ai,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    pub id: String,
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn ai(content: impl Into<String>) -> Self {
        Self::new(Role::Ai, content)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Improving,
    Declining,
    Stable,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AttemptScore {
    pub date: DateTime<Utc>,
    pub score: f64,
}

/// Comparison against the same candidate's earlier attempts of the same type.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Progress {
    pub total_attempts: usize,
    pub previous_scores: Vec<AttemptScore>,
    pub improvement_from_last: f64,
    pub trend: Trend,
}

impl Progress {
    /// `previous` must be sorted oldest first. `None` for a first attempt.
    pub fn from_attempts(previous: Vec<AttemptScore>, new_score: f64) -> Option<Self> {
        let last = previous.last()?;
        let improvement = new_score - last.score;
        let trend = if improvement > 0.0 {
            Trend::Improving
        } else if improvement < 0.0 {
            Trend::Declining
        } else {
            Trend::Stable
        };

        Some(Self {
            total_attempts: previous.len() + 1,
            previous_scores: previous,
            improvement_from_last: improvement,
            trend,
        })
    }
}

/// One persisted interview.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InterviewRecord {
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub user_info: UserInfo,
    #[serde(default)]
    pub chat_history: Vec<ChatMessage>,
    #[serde(default)]
    pub evaluation: Evaluation,
    #[serde(default)]
    pub progress: Option<Progress>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_analysis: Option<Vec<FrameSample>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_metrics: Option<AggregateMetrics>,
}

impl InterviewRecord {
    pub fn score(&self) -> f64 {
        self.evaluation.overall_score
    }
}

/// A record as listed from the store, with its file-derived id.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct StoredInterview {
    pub id: String,
    pub filename: String,
    #[serde(flatten)]
    pub record: InterviewRecord,
}
