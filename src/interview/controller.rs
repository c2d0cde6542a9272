use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use anyhow::{anyhow, bail, Context, Result};
use chrono::Utc;
use log::{error, info, warn};
use tokio::sync::{watch, Mutex};

use crate::{
    analysis::{AggregateMetrics, FrameSample, LiveMetrics},
    chat::{
        classify_reply, parse_evaluation,
        prompts::{evaluation_request, interviewer_request, FALLBACK_REPLY},
        ChatBackend, ReplyIntent,
    },
    models::{ChatMessage, InterviewRecord, UserInfo},
    sensing::{CameraDevice, SensingController},
    settings::LlmSettings,
    store::LogStore,
};

use super::{script, InterviewPhase, InterviewState};

/// Replies shorter than this that merely say "yes" get a prompt for the
/// actual question instead of an answer.
const SHORT_REPLY_CHARS: usize = 20;

#[derive(Debug, Clone)]
pub struct InterviewOutcome {
    pub record: InterviewRecord,
    /// `None` when the log could not be written.
    pub log_id: Option<String>,
}

/// Drives one interview: the conversation, the optional camera analysis and
/// the final evaluation.
#[derive(Clone)]
pub struct InterviewController {
    state: Arc<Mutex<InterviewState>>,
    backend: Arc<dyn ChatBackend>,
    store: LogStore,
    llm: LlmSettings,
    sensing: Option<Arc<Mutex<SensingController>>>,
    finishing: Arc<AtomicBool>,
}

impl InterviewController {
    pub fn new(
        mut user_info: UserInfo,
        max_questions: u32,
        backend: Arc<dyn ChatBackend>,
        store: LogStore,
        llm: LlmSettings,
    ) -> Self {
        user_info.started_at.get_or_insert_with(Utc::now);
        Self {
            state: Arc::new(Mutex::new(InterviewState::new(user_info, max_questions))),
            backend,
            store,
            llm,
            sensing: None,
            finishing: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn with_sensing(mut self, sensing: SensingController) -> Self {
        self.sensing = Some(Arc::new(Mutex::new(sensing)));
        self
    }

    pub async fn state(&self) -> InterviewState {
        self.state.lock().await.clone()
    }

    pub async fn phase(&self) -> InterviewPhase {
        self.state.lock().await.phase
    }

    pub async fn messages(&self) -> Vec<ChatMessage> {
        self.state.lock().await.messages.clone()
    }

    /// Opens the camera and starts body-language sampling. On error the
    /// interview carries on without video.
    pub async fn start_camera(&self, device: Box<dyn CameraDevice>) -> Result<()> {
        let sensing = self
            .sensing
            .as_ref()
            .ok_or_else(|| anyhow!("camera analysis is not configured for this interview"))?;
        sensing.lock().await.start(device).await
    }

    pub async fn live_metrics(&self) -> Option<watch::Receiver<LiveMetrics>> {
        match &self.sensing {
            Some(sensing) => Some(sensing.lock().await.subscribe()),
            None => None,
        }
    }

    /// Handles one candidate message and returns the interviewer messages it
    /// produced, in transcript order.
    pub async fn send(&self, text: &str) -> Result<Vec<ChatMessage>> {
        let text = text.trim();
        if text.is_empty() {
            bail!("message is empty");
        }

        let mut state = self.state.lock().await;
        match state.phase {
            InterviewPhase::Finished => bail!("interview already finished"),
            InterviewPhase::Questioning => self.answer_question(&mut state, text).await,
            InterviewPhase::WrappingUp | InterviewPhase::AwaitingQuestion => {
                self.handle_wrap_up_reply(&mut state, text).await
            }
        }
    }

    async fn answer_question(
        &self,
        state: &mut InterviewState,
        text: &str,
    ) -> Result<Vec<ChatMessage>> {
        state.push_user(text);
        let request = interviewer_request(state.user_info.interview_type, &state.messages, &self.llm);

        let reply = match self.backend.complete(request).await {
            Ok(reply) => reply,
            Err(err) => {
                error!("Chat turn failed: {err:#}");
                let apology = state.push_ai(format!("Sorry, I encountered an error: {err}"));
                return Ok(vec![apology]);
            }
        };

        state.question_count += 1;
        let mut produced = vec![state.push_ai(non_empty_or_fallback(reply))];

        if state.reached_wrap_up() {
            info!(
                "Question limit reached after {} answers; wrapping up",
                state.question_count
            );
            produced.push(state.push_ai(script::wrap_up(state.is_video())));
            state.phase = InterviewPhase::WrappingUp;
        }

        Ok(produced)
    }

    async fn handle_wrap_up_reply(
        &self,
        state: &mut InterviewState,
        text: &str,
    ) -> Result<Vec<ChatMessage>> {
        state.push_user(text);
        let awaiting = state.phase == InterviewPhase::AwaitingQuestion;
        let intent = classify_reply(text);

        if intent == ReplyIntent::Negative && !awaiting {
            let closing = state.finish_with(script::closing(state.is_video()));
            return Ok(vec![closing]);
        }

        if intent == ReplyIntent::Affirmative && text.chars().count() < SHORT_REPLY_CHARS {
            state.phase = InterviewPhase::AwaitingQuestion;
            return Ok(vec![state.push_ai(script::PROMPT_FOR_QUESTION)]);
        }

        if !awaiting && intent == ReplyIntent::Unrecognized {
            let closing = state.finish_with(script::closing(state.is_video()));
            return Ok(vec![closing]);
        }

        let request = interviewer_request(state.user_info.interview_type, &state.messages, &self.llm);
        let message = match self.backend.complete(request).await {
            Ok(answer) => format!(
                "{}\n\n{}",
                non_empty_or_fallback(answer),
                script::ANSWER_SIGN_OFF
            ),
            Err(err) => {
                warn!("Could not answer candidate question: {err:#}");
                script::ANSWER_FAILED.to_string()
            }
        };

        Ok(vec![state.finish_with(message)])
    }

    /// Stops the camera and reads the samples without draining them, so a
    /// failed evaluation can be retried with the same body-language data.
    async fn stop_camera(&self) -> Option<(Vec<FrameSample>, AggregateMetrics)> {
        let sensing = self.sensing.as_ref()?;
        let mut controller = sensing.lock().await;
        if let Err(err) = controller.stop().await {
            warn!("Failed to stop camera analysis cleanly: {err:#}");
        }
        let samples = controller.snapshot().await;
        let metrics = samples.final_metrics();
        info!(
            "Body language over {} samples: overall {}",
            samples.len(),
            metrics.overall_body_language_score
        );
        Some((samples.into_samples(), metrics))
    }

    /// Ends the interview: stops the camera, requests the evaluation and saves
    /// the log. An unparseable evaluation is an error, nothing is saved and
    /// `finish` can be called again.
    pub async fn finish(&self) -> Result<InterviewOutcome> {
        let _finishing = FinishGuard::acquire(&self.finishing)?;

        let (messages, user_info) = {
            let mut state = self.state.lock().await;
            if state.evaluated {
                bail!("interview already evaluated");
            }
            state.phase = InterviewPhase::Finished;
            (state.messages.clone(), state.user_info.clone())
        };

        let video = self.stop_camera().await;

        let request = evaluation_request(&messages, &user_info, &self.llm)?;
        let raw = self
            .backend
            .complete(request)
            .await
            .context("Failed to evaluate interview")?;
        let evaluation = parse_evaluation(&raw)?;

        if let Some(sensing) = &self.sensing {
            sensing.lock().await.take_samples().await;
        }

        let progress = self
            .store
            .progress_for(&user_info.name, user_info.interview_type, evaluation.overall_score)
            .await;

        let (video_analysis, video_metrics) = match video {
            Some((samples, metrics)) => (Some(samples), Some(metrics)),
            None => (None, None),
        };

        let record = InterviewRecord {
            timestamp: Utc::now(),
            user_info,
            chat_history: messages,
            evaluation,
            progress,
            video_analysis,
            video_metrics,
        };
        let log_id = self.store.save(&record).await;

        self.state.lock().await.evaluated = true;
        Ok(InterviewOutcome { record, log_id })
    }

    /// Abandons the interview without evaluating it.
    pub async fn cancel(&self) -> Result<()> {
        if let Some(sensing) = &self.sensing {
            sensing.lock().await.stop().await?;
        }
        self.state.lock().await.phase = InterviewPhase::Finished;
        info!("Interview cancelled");
        Ok(())
    }
}

/// Held for the duration of one `finish` call; cleared on drop so a failed or
/// abandoned attempt can be retried.
struct FinishGuard<'a>(&'a AtomicBool);

impl<'a> FinishGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Result<Self> {
        if flag
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            bail!("interview evaluation already in progress");
        }
        Ok(Self(flag))
    }
}

impl Drop for FinishGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

fn non_empty_or_fallback(reply: String) -> String {
    if reply.trim().is_empty() {
        FALLBACK_REPLY.to_string()
    } else {
        reply
    }
}
