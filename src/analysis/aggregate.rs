use crate::analysis::types::{AggregateMetrics, Expression, ExpressionScores, FrameSample};

/// Non-neutral expressions are boosted by this factor when picking the mood.
const NON_NEUTRAL_BOOST: f64 = 1.5;
/// A boosted expression must also clear this floor to displace the current pick.
const MIN_BOOSTED_SHARE: f64 = 0.2;

/// Aggregate a window of samples into report metrics.
///
/// Pure: the same slice always yields the same metrics. An empty slice yields
/// neutral defaults (all 50) so a session without a camera is not penalized.
pub fn aggregate_metrics(samples: &[FrameSample]) -> AggregateMetrics {
    if samples.is_empty() {
        return AggregateMetrics::default();
    }

    let count = samples.len() as f64;

    let avg_confidence = samples.iter().map(|s| s.confidence).sum::<f64>() / count;
    let eye_contact_count = samples.iter().filter(|s| s.eye_contact).count();
    let eye_contact_percent = eye_contact_count as f64 / count * 100.0;

    let distribution =
        ExpressionScores::mean_of(samples.iter().map(|s| &s.expressions), samples.len());
    let dominant = dominant_expression(&distribution);

    let nervousness_score = nervousness(&distribution);
    let engagement_score = engagement(&distribution, eye_contact_percent);

    let overall = (avg_confidence * 40.0
        + eye_contact_percent * 0.3
        + engagement_score as f64 * 0.2
        + (100.0 - nervousness_score as f64) * 0.1)
        .round()
        .clamp(0.0, 100.0);

    AggregateMetrics {
        average_confidence: to_score(avg_confidence * 100.0),
        eye_contact_percent: to_score(eye_contact_percent),
        dominant_expression: dominant.mood_label().to_string(),
        expression_distribution: distribution,
        nervousness_score,
        engagement_score,
        overall_body_language_score: overall as u32,
    }
}

/// Neutral wins unless a boosted non-neutral share beats the running maximum.
pub fn dominant_expression(distribution: &ExpressionScores) -> Expression {
    let mut dominant = Expression::Neutral;
    let mut max_value = distribution.neutral;

    for expression in Expression::ALL
        .into_iter()
        .filter(|e| *e != Expression::Neutral)
    {
        let boosted = distribution.get(expression) * NON_NEUTRAL_BOOST;
        if boosted > max_value && boosted > MIN_BOOSTED_SHARE {
            max_value = boosted;
            dominant = expression;
        }
    }

    dominant
}

fn nervousness(distribution: &ExpressionScores) -> u32 {
    let negative_impact = distribution.fearful * 1.5
        + distribution.sad * 0.8
        + distribution.disgusted * 0.5
        + distribution.angry * 0.3;
    to_score(negative_impact * 100.0).min(100)
}

/// Eye contact is already on a 0-100 scale while the expression term is 0-1
/// scaled by 30, so presence dominates expressiveness.
fn engagement(distribution: &ExpressionScores, eye_contact_percent: f64) -> u32 {
    let expression_engagement =
        distribution.neutral * 0.3 + distribution.happy * 0.6 + distribution.surprised * 0.4;
    to_score(eye_contact_percent * 0.7 + expression_engagement * 30.0)
}

/// Round half away from zero and saturate negatives at 0.
fn to_score(value: f64) -> u32 {
    value.round().max(0.0) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::types::HeadPose;
    use chrono::{TimeZone, Utc};

    fn sample(expressions: ExpressionScores, confidence: f64, eye_contact: bool) -> FrameSample {
        FrameSample {
            expressions,
            confidence,
            eye_contact,
            head_pose: HeadPose::default(),
            timestamp: Utc.timestamp_millis_opt(1_700_000_000_000).unwrap(),
        }
    }

    fn one_hot(expression: Expression) -> ExpressionScores {
        let mut scores = ExpressionScores::default();
        scores.set(expression, 1.0);
        scores
    }

    #[test]
    fn empty_input_returns_neutral_defaults() {
        let metrics = aggregate_metrics(&[]);

        assert_eq!(metrics.average_confidence, 50);
        assert_eq!(metrics.eye_contact_percent, 50);
        assert_eq!(metrics.dominant_expression, "😐 Professional");
        assert_eq!(metrics.expression_distribution, ExpressionScores::all_neutral());
        assert_eq!(metrics.nervousness_score, 50);
        assert_eq!(metrics.engagement_score, 50);
        assert_eq!(metrics.overall_body_language_score, 50);
    }

    #[test]
    fn eye_contact_percent_is_rounded_share() {
        let neutral = ExpressionScores::all_neutral();
        let samples = vec![
            sample(neutral, 0.5, true),
            sample(neutral, 0.5, false),
            sample(neutral, 0.5, false),
        ];

        // 33.33.. rounds to 33
        assert_eq!(aggregate_metrics(&samples).eye_contact_percent, 33);

        let samples = vec![
            sample(neutral, 0.5, true),
            sample(neutral, 0.5, true),
            sample(neutral, 0.5, false),
        ];
        assert_eq!(aggregate_metrics(&samples).eye_contact_percent, 67);
    }

    #[test]
    fn neutral_not_displaced_by_smaller_boosted_value() {
        let mut distribution = ExpressionScores::default();
        distribution.neutral = 0.5;
        distribution.happy = 0.25;

        assert_eq!(dominant_expression(&distribution), Expression::Neutral);
    }

    #[test]
    fn boosted_expression_displaces_neutral() {
        let mut distribution = ExpressionScores::default();
        distribution.neutral = 0.4;
        distribution.happy = 0.3;

        assert_eq!(dominant_expression(&distribution), Expression::Happy);
    }

    #[test]
    fn boosted_value_must_clear_floor() {
        let mut distribution = ExpressionScores::default();
        distribution.neutral = 0.05;
        distribution.sad = 0.1;

        assert_eq!(dominant_expression(&distribution), Expression::Neutral);
    }

    #[test]
    fn nervousness_from_fear_alone() {
        let mut scores = ExpressionScores::default();
        scores.fearful = 0.3;
        scores.neutral = 0.7;

        let metrics = aggregate_metrics(&[sample(scores, 0.5, false)]);
        assert_eq!(metrics.nervousness_score, 45);
    }

    #[test]
    fn nervousness_is_capped() {
        let metrics = aggregate_metrics(&[sample(one_hot(Expression::Fearful), 0.0, false)]);
        assert_eq!(metrics.nervousness_score, 100);
    }

    #[test]
    fn engagement_and_overall_use_unrounded_intermediates() {
        let mut scores = ExpressionScores::default();
        scores.neutral = 0.5;
        scores.happy = 0.5;
        let samples = vec![
            sample(scores, 0.8, true),
            sample(scores, 0.7, true),
            sample(scores, 0.6, false),
        ];

        let metrics = aggregate_metrics(&samples);

        // eye contact 66.66..; expression term (0.15 + 0.3) * 30 = 13.5
        // engagement = round(46.666.. + 13.5) = 60
        assert_eq!(metrics.engagement_score, 60);
        assert_eq!(metrics.average_confidence, 70);
        assert_eq!(metrics.nervousness_score, 0);
        // 0.7*40 + 66.66..*0.3 + 60*0.2 + 100*0.1 = 28 + 20 + 12 + 10
        assert_eq!(metrics.overall_body_language_score, 70);
        assert_eq!(metrics.dominant_expression, "😊 Positive");
    }

    #[test]
    fn overall_score_stays_in_range_for_extreme_inputs() {
        for expression in Expression::ALL {
            for (confidence, eye_contact) in [(0.0, false), (1.0, true)] {
                let samples = vec![sample(one_hot(expression), confidence, eye_contact); 4];
                let metrics = aggregate_metrics(&samples);
                assert!(metrics.overall_body_language_score <= 100);
            }
        }

        let mut saturated = ExpressionScores::default();
        for expression in Expression::ALL {
            saturated.set(expression, 5.0);
        }
        let metrics = aggregate_metrics(&[sample(saturated, 1.0, true)]);
        assert!(metrics.overall_body_language_score <= 100);
        assert!(metrics.engagement_score >= 100);
    }

    #[test]
    fn distribution_is_element_wise_mean() {
        let samples = vec![
            sample(one_hot(Expression::Happy), 0.5, true),
            sample(one_hot(Expression::Sad), 0.5, true),
        ];

        let distribution = aggregate_metrics(&samples).expression_distribution;
        assert!((distribution.happy - 0.5).abs() < 1e-12);
        assert!((distribution.sad - 0.5).abs() < 1e-12);
        assert_eq!(distribution.neutral, 0.0);
    }

    #[test]
    fn aggregation_is_idempotent() {
        let mut scores = ExpressionScores::default();
        scores.neutral = 0.3;
        scores.surprised = 0.7;
        let samples = vec![sample(scores, 0.42, true), sample(scores, 0.17, false)];

        assert_eq!(aggregate_metrics(&samples), aggregate_metrics(&samples));
    }
}
