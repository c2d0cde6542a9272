use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The seven expression classes reported by the detector.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum Expression {
    Neutral,
    Happy,
    Sad,
    Angry,
    Fearful,
    Disgusted,
    Surprised,
}

impl Expression {
    pub const ALL: [Expression; 7] = [
        Expression::Neutral,
        Expression::Happy,
        Expression::Sad,
        Expression::Angry,
        Expression::Fearful,
        Expression::Disgusted,
        Expression::Surprised,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Expression::Neutral => "neutral",
            Expression::Happy => "happy",
            Expression::Sad => "sad",
            Expression::Angry => "angry",
            Expression::Fearful => "fearful",
            Expression::Disgusted => "disgusted",
            Expression::Surprised => "surprised",
        }
    }

    /// User-facing "mood" string shown in the live panel and the report.
    pub fn mood_label(&self) -> &'static str {
        match self {
            Expression::Neutral => "😐 Professional",
            Expression::Happy => "😊 Positive",
            Expression::Sad => "😔 Concerned",
            Expression::Angry => "😠 Focused",
            Expression::Fearful => "😟 Nervous",
            Expression::Disgusted => "😒 Disappointed",
            Expression::Surprised => "😮 Interested",
        }
    }
}

/// Per-class probabilities. Detector output is assumed to already sum to ~1
/// and is never re-normalized here.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct ExpressionScores {
    pub neutral: f64,
    pub happy: f64,
    pub sad: f64,
    pub angry: f64,
    pub fearful: f64,
    pub disgusted: f64,
    pub surprised: f64,
}

impl ExpressionScores {
    /// Distribution reported when there is nothing to aggregate.
    pub fn all_neutral() -> Self {
        Self {
            neutral: 1.0,
            ..Self::default()
        }
    }

    pub fn get(&self, expression: Expression) -> f64 {
        match expression {
            Expression::Neutral => self.neutral,
            Expression::Happy => self.happy,
            Expression::Sad => self.sad,
            Expression::Angry => self.angry,
            Expression::Fearful => self.fearful,
            Expression::Disgusted => self.disgusted,
            Expression::Surprised => self.surprised,
        }
    }

    fn get_mut(&mut self, expression: Expression) -> &mut f64 {
        match expression {
            Expression::Neutral => &mut self.neutral,
            Expression::Happy => &mut self.happy,
            Expression::Sad => &mut self.sad,
            Expression::Angry => &mut self.angry,
            Expression::Fearful => &mut self.fearful,
            Expression::Disgusted => &mut self.disgusted,
            Expression::Surprised => &mut self.surprised,
        }
    }

    pub fn set(&mut self, expression: Expression, value: f64) {
        *self.get_mut(expression) = value;
    }

    /// Element-wise mean. Callers guarantee `scores` is non-empty.
    pub(crate) fn mean_of<'a, I>(scores: I, count: usize) -> Self
    where
        I: IntoIterator<Item = &'a ExpressionScores>,
    {
        let mut totals = Self::default();
        for score in scores {
            for expression in Expression::ALL {
                *totals.get_mut(expression) += score.get(expression);
            }
        }
        for expression in Expression::ALL {
            *totals.get_mut(expression) /= count as f64;
        }
        totals
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct FaceBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl FaceBox {
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

/// Landmark groups of a 68-point face model that the pose heuristics need.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FaceLandmarks {
    pub nose: Vec<Point>,
    pub left_eye: Vec<Point>,
    pub right_eye: Vec<Point>,
}

/// One face found by the external detector.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Detection {
    pub expressions: ExpressionScores,
    pub landmarks: FaceLandmarks,
    #[serde(rename = "box")]
    pub face_box: FaceBox,
    /// Raw detector confidence, not used by the scoring.
    pub score: f64,
}

/// Approximate head orientation in degrees.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct HeadPose {
    pub yaw: f64,
    pub pitch: f64,
    pub roll: f64,
}

impl HeadPose {
    pub fn is_finite(&self) -> bool {
        self.yaw.is_finite() && self.pitch.is_finite() && self.roll.is_finite()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameDimensions {
    pub width: u32,
    pub height: u32,
}

impl FrameDimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// One successfully analyzed frame.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FrameSample {
    pub expressions: ExpressionScores,
    pub confidence: f64,
    pub eye_contact: bool,
    pub head_pose: HeadPose,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AggregateMetrics {
    pub average_confidence: u32,
    pub eye_contact_percent: u32,
    pub dominant_expression: String,
    pub expression_distribution: ExpressionScores,
    pub nervousness_score: u32,
    pub engagement_score: u32,
    pub overall_body_language_score: u32,
}

impl Default for AggregateMetrics {
    fn default() -> Self {
        Self {
            average_confidence: 50,
            eye_contact_percent: 50,
            dominant_expression: Expression::Neutral.mood_label().to_string(),
            expression_distribution: ExpressionScores::all_neutral(),
            nervousness_score: 50,
            engagement_score: 50,
            overall_body_language_score: 50,
        }
    }
}

/// The reduced set of numbers shown while the camera is running.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LiveMetrics {
    pub eye_contact_percent: u32,
    pub confidence_score: u32,
    pub engagement_score: u32,
    pub dominant_expression: String,
}

impl From<&AggregateMetrics> for LiveMetrics {
    fn from(metrics: &AggregateMetrics) -> Self {
        Self {
            eye_contact_percent: metrics.eye_contact_percent,
            confidence_score: metrics.average_confidence,
            engagement_score: metrics.engagement_score,
            dominant_expression: metrics.dominant_expression.clone(),
        }
    }
}

impl Default for LiveMetrics {
    fn default() -> Self {
        Self::from(&AggregateMetrics::default())
    }
}
