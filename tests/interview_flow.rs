use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use interview_coach_lib::{
    analysis::{aggregate_metrics, ExpressionScores, FrameSample, HeadPose, SampleLog},
    chat::{ChatBackend, ChatRequest},
    interview::{InterviewController, InterviewPhase},
    models::{InterviewType, UserInfo},
    settings::LlmSettings,
    store::LogStore,
};
use tempfile::TempDir;

struct CannedBackend {
    replies: Mutex<VecDeque<String>>,
}

impl CannedBackend {
    fn new(replies: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.iter().map(|r| r.to_string()).collect()),
        })
    }
}

#[async_trait]
impl ChatBackend for CannedBackend {
    async fn complete(&self, _request: ChatRequest) -> Result<String> {
        Ok(self.replies.lock().unwrap().pop_front().unwrap_or_default())
    }
}

fn sample(second: u32, eye_contact: bool) -> FrameSample {
    FrameSample {
        expressions: ExpressionScores::all_neutral(),
        confidence: 0.65,
        eye_contact,
        head_pose: HeadPose {
            yaw: 0.0,
            pitch: 0.0,
            roll: 0.0,
        },
        timestamp: Utc.with_ymd_and_hms(2026, 5, 1, 10, 0, second).unwrap(),
    }
}

#[test]
fn live_window_and_final_report_diverge() {
    let mut log = SampleLog::new(10);
    for i in 0..5 {
        log.push(sample(i, false));
    }
    for i in 5..15 {
        log.push(sample(i, i % 10 < 7));
    }

    assert_eq!(log.live_metrics().eye_contact_percent, 70);
    assert_eq!(log.final_metrics().eye_contact_percent, 47);
    assert_eq!(log.final_metrics(), aggregate_metrics(log.samples()));
}

#[tokio::test]
async fn full_interview_is_saved_and_counted_on_the_dashboard() {
    let logs = TempDir::new().unwrap();
    let store = LogStore::new(logs.path().join("interview_logs"));
    let backend = CannedBackend::new(&[
        "Tell me about a recent project.",
        "How did you test it?",
        r#"{"overall_score": 81, "parameter_scores": {"confidence": {"score": 77, "feedback": "Calm"}}}"#,
    ]);

    let interview = InterviewController::new(
        UserInfo::new("Grace", InterviewType::Managerial),
        1,
        backend,
        store.clone(),
        LlmSettings::default(),
    );

    interview.send("Yes, ready.").await.unwrap();
    let produced = interview.send("I led a billing migration.").await.unwrap();
    assert_eq!(produced.len(), 2);
    assert_eq!(interview.phase().await, InterviewPhase::WrappingUp);

    interview.send("Nope").await.unwrap();
    assert_eq!(interview.phase().await, InterviewPhase::Finished);

    let outcome = interview.finish().await.unwrap();
    assert_eq!(outcome.record.evaluation.overall_score, 81.0);
    let id = outcome.log_id.unwrap();

    let listed = store.list_for_user("grace").await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, id);
    assert_eq!(listed[0].record.chat_history.len(), 8);

    let stats = store.dashboard_stats().await.unwrap();
    assert_eq!(stats.total_interviews, 1);
    assert_eq!(stats.average_score, 81);
    assert_eq!(stats.by_type["Managerial"].count, 1);
    assert_eq!(stats.parameter_averages["confidence"], 77);

    assert!(store.delete_by_id(&id).await.unwrap());
    assert_eq!(store.dashboard_stats().await.unwrap().total_interviews, 0);
}
