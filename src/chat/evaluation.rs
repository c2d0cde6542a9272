use std::collections::BTreeMap;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ParameterScore {
    pub score: f64,
    #[serde(default)]
    pub feedback: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Suggestion {
    pub area: String,
    pub suggestion: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resources: Option<String>,
}

/// Structured feedback produced by the evaluation call.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Evaluation {
    #[serde(alias = "score", default)]
    pub overall_score: f64,
    #[serde(default)]
    pub parameter_scores: BTreeMap<String, ParameterScore>,
    #[serde(default)]
    pub general_feedback: String,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub areas_for_improvement: Vec<String>,
    #[serde(default)]
    pub personalized_suggestions: Vec<Suggestion>,
}

/// Parses the model's reply, tolerating a markdown code fence around the JSON.
pub fn parse_evaluation(text: &str) -> Result<Evaluation> {
    let cleaned = text.replace("```json", "").replace("```", "");
    let cleaned = cleaned.trim();

    serde_json::from_str(cleaned)
        .with_context(|| format!("Failed to parse evaluation JSON:\n{cleaned}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    const BODY: &str = r#"{
        "overall_score": 78,
        "parameter_scores": {
            "confidence": { "score": 80, "feedback": "Steady delivery" },
            "body_language": { "score": 70, "feedback": "Good eye contact" }
        },
        "general_feedback": "Solid interview.",
        "strengths": ["Clear answers"],
        "areas_for_improvement": ["More examples"],
        "personalized_suggestions": [
            { "area": "STAR method", "suggestion": "Structure answers" }
        ]
    }"#;

    #[test]
    fn parses_plain_json() {
        let evaluation = parse_evaluation(BODY).unwrap();
        assert_eq!(evaluation.overall_score, 78.0);
        assert_eq!(evaluation.parameter_scores["body_language"].score, 70.0);
        assert_eq!(evaluation.personalized_suggestions[0].resources, None);
    }

    #[test]
    fn strips_markdown_fences() {
        let fenced = format!("```json\n{BODY}\n```\n");
        let evaluation = parse_evaluation(&fenced).unwrap();
        assert_eq!(evaluation.strengths, vec!["Clear answers".to_string()]);
    }

    #[test]
    fn accepts_legacy_score_key() {
        let evaluation = parse_evaluation(r#"{"score": 64}"#).unwrap();
        assert_eq!(evaluation.overall_score, 64.0);
        assert!(evaluation.parameter_scores.is_empty());
    }

    #[test]
    fn malformed_reply_is_an_error() {
        assert!(parse_evaluation("I'm sorry, I can't evaluate this.").is_err());
        assert!(parse_evaluation("").is_err());
    }
}
