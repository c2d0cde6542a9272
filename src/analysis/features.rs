use chrono::{DateTime, Utc};

use crate::analysis::config::AnalysisConfig;
use crate::analysis::types::{
    Detection, ExpressionScores, FaceBox, FaceLandmarks, FrameDimensions, FrameSample, HeadPose,
    Point,
};

/// Used when the source reports no intrinsic size yet.
const FALLBACK_FRAME_WIDTH: u32 = 320;
const FALLBACK_FRAME_HEIGHT: u32 = 240;

/// Turns one detector result into a `FrameSample`.
///
/// Returns `None` when the landmark geometry is degenerate (missing point sets,
/// zero eye distance or a zero-height box), so such frames count as gaps rather
/// than zeros in the aggregate.
pub fn extract_sample(
    detection: &Detection,
    frame: FrameDimensions,
    config: &AnalysisConfig,
    timestamp: DateTime<Utc>,
) -> Option<FrameSample> {
    let head_pose = estimate_head_pose(&detection.landmarks, &detection.face_box)?;
    let eye_contact = is_eye_contact(&detection.face_box, &head_pose, frame, config);
    let confidence = confidence_score(&detection.expressions, eye_contact);

    Some(FrameSample {
        expressions: detection.expressions,
        confidence,
        eye_contact,
        head_pose,
        timestamp,
    })
}

/// Geometry-only pose proxy. These are heuristics, not a calibrated estimate:
/// - yaw:   nose offset from the eye midpoint, relative to eye distance, x45
/// - pitch: nose vertical span relative to box height, x30, shifted by -15
/// - roll:  slope of the line between eye centres
pub fn estimate_head_pose(landmarks: &FaceLandmarks, face_box: &FaceBox) -> Option<HeadPose> {
    let nose_top = landmarks.nose.first()?;
    let nose_bottom = landmarks.nose.last()?;
    let left_center = centroid(&landmarks.left_eye)?;
    let right_center = centroid(&landmarks.right_eye)?;

    let eye_distance = right_center.x - left_center.x;
    let nose_offset = nose_top.x - (left_center.x + eye_distance / 2.0);

    let pose = HeadPose {
        yaw: nose_offset / eye_distance * 45.0,
        pitch: (nose_bottom.y - nose_top.y) / face_box.height * 30.0 - 15.0,
        roll: (right_center.y - left_center.y)
            .atan2(eye_distance)
            .to_degrees(),
    };

    pose.is_finite().then_some(pose)
}

/// Hard per-frame decision: centred in the frame and facing the camera.
pub fn is_eye_contact(
    face_box: &FaceBox,
    pose: &HeadPose,
    frame: FrameDimensions,
    config: &AnalysisConfig,
) -> bool {
    let width = if frame.width == 0 {
        FALLBACK_FRAME_WIDTH
    } else {
        frame.width
    } as f64;
    let height = if frame.height == 0 {
        FALLBACK_FRAME_HEIGHT
    } else {
        frame.height
    } as f64;

    let center = face_box.center();
    let is_centered = (center.x - width / 2.0).abs() < width * config.center_tolerance_x
        && (center.y - height / 2.0).abs() < height * config.center_tolerance_y;
    let is_facing_camera = pose.yaw.abs() < config.facing_threshold_deg
        && pose.pitch.abs() < config.facing_threshold_deg;

    is_centered && is_facing_camera
}

/// Perceived-confidence score in [0, 1].
///
/// Baseline 0.5, shifted by expression valence, +0.15 / -0.10 for eye contact,
/// and a penalty for "surprised" since it reads as panic on camera.
pub fn confidence_score(expressions: &ExpressionScores, eye_contact: bool) -> f64 {
    let positive = expressions.neutral * 0.4 + expressions.happy * 0.4;
    let negative =
        expressions.fearful * 1.0 + expressions.sad * 0.6 + expressions.disgusted * 0.6;

    let mut score = 0.5 + positive - negative;
    score += if eye_contact { 0.15 } else { -0.1 };
    score -= expressions.surprised * 0.4;

    score.clamp(0.0, 1.0)
}

fn centroid(points: &[Point]) -> Option<Point> {
    if points.is_empty() {
        return None;
    }
    let count = points.len() as f64;
    let (sum_x, sum_y) = points
        .iter()
        .fold((0.0, 0.0), |(x, y), p| (x + p.x, y + p.y));
    Some(Point::new(sum_x / count, sum_y / count))
}
