use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use log::info;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines};

use crate::{
    analysis::{aggregate_metrics, FrameSample},
    chat::{Evaluation, LiteRouterClient},
    interview::{InterviewController, InterviewOutcome},
    models::{InterviewMode, InterviewType, Role, UserInfo},
    settings::SettingsStore,
    store::LogStore,
};

const END_COMMAND: &str = "/end";
const QUIT_COMMAND: &str = "/quit";

#[derive(Parser)]
#[command(name = "interview-coach", about = "AI mock interviews with structured feedback")]
pub struct Cli {
    /// Settings file; created with defaults on first write.
    #[arg(long, global = true, default_value = "settings.json")]
    settings: PathBuf,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run an interactive text interview on stdin.
    ///
    /// Video mode with body-language analysis is library-only: attach a
    /// `SensingController` backed by a camera and face detector through
    /// `InterviewController::with_sensing`.
    Interview {
        #[arg(long)]
        name: String,
        #[arg(long = "type", value_parser = parse_interview_type, default_value = "technical")]
        interview_type: InterviewType,
        #[arg(long)]
        email: Option<String>,
    },
    /// List saved interviews, newest first.
    History {
        #[arg(long)]
        user: Option<String>,
    },
    /// Aggregate statistics over every saved interview.
    Dashboard,
    /// Delete one log by id, or every log of a candidate.
    Delete {
        #[arg(long, conflicts_with = "user")]
        id: Option<String>,
        #[arg(long)]
        user: Option<String>,
    },
    /// Body-language report for a JSON array of frame samples.
    Report { samples: PathBuf },
}

fn parse_interview_type(value: &str) -> Result<InterviewType, String> {
    value.parse().map_err(|err: anyhow::Error| err.to_string())
}

pub async fn execute(cli: Cli) -> Result<()> {
    let settings = SettingsStore::new(cli.settings)?;
    let store = LogStore::new(settings.logs_dir());

    match cli.cmd {
        Commands::Interview {
            name,
            interview_type,
            email,
        } => {
            let mut user_info = UserInfo::new(name, interview_type);
            user_info.email = email;
            user_info.mode = Some(InterviewMode::Text);
            run_interview(&settings, store, user_info).await
        }
        Commands::History { user } => {
            let interviews = match &user {
                Some(name) => store.list_for_user(name).await?,
                None => store.list_all().await?,
            };
            if interviews.is_empty() {
                println!("No interviews found.");
            }
            for stored in interviews {
                let record = &stored.record;
                println!(
                    "{}  {:<20} {:<10} {:>5.1}  {}",
                    stored.id,
                    record.user_info.name,
                    record.user_info.interview_type.as_str(),
                    record.score(),
                    record.timestamp.format("%Y-%m-%d %H:%M")
                );
            }
            Ok(())
        }
        Commands::Dashboard => {
            let stats = store.dashboard_stats().await?;
            println!("{}", serde_json::to_string_pretty(&stats)?);
            Ok(())
        }
        Commands::Delete { id, user } => match (id, user) {
            (Some(id), _) => {
                if store.delete_by_id(&id).await? {
                    println!("Successfully deleted log {id}");
                    Ok(())
                } else {
                    bail!("log not found: {id}")
                }
            }
            (None, Some(user)) => {
                let count = store.delete_for_user(&user).await?;
                println!("Successfully cleared {count} logs for {user}");
                Ok(())
            }
            (None, None) => bail!("either --id or --user is required"),
        },
        Commands::Report { samples } => {
            let contents = tokio::fs::read_to_string(&samples)
                .await
                .with_context(|| format!("failed to read {}", samples.display()))?;
            let samples: Vec<FrameSample> =
                serde_json::from_str(&contents).context("failed to parse frame samples")?;
            let metrics = aggregate_metrics(&samples);
            println!("{}", serde_json::to_string_pretty(&metrics)?);
            Ok(())
        }
    }
}

async fn run_interview(
    settings: &SettingsStore,
    store: LogStore,
    user_info: UserInfo,
) -> Result<()> {
    let snapshot = settings.snapshot();
    let backend = Arc::new(LiteRouterClient::new(&snapshot.llm)?);
    let interview = InterviewController::new(
        user_info,
        snapshot.interview.max_questions,
        backend,
        store,
        snapshot.llm,
    );

    for message in interview.messages().await {
        print_interviewer(&message.content);
    }
    println!("(type {END_COMMAND} to finish early, {QUIT_COMMAND} to abandon)");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line == QUIT_COMMAND {
            interview.cancel().await?;
            println!("Interview abandoned.");
            return Ok(());
        }
        if line == END_COMMAND {
            break;
        }

        for message in interview.send(line).await? {
            if message.role == Role::Ai {
                print_interviewer(&message.content);
            }
        }
        if interview.state().await.is_finished() {
            break;
        }
    }

    loop {
        info!("Requesting evaluation");
        let err = match interview.finish().await {
            Ok(outcome) => {
                print_outcome(&outcome);
                return Ok(());
            }
            Err(err) => err,
        };

        eprintln!("Evaluation failed: {err:#}");
        println!("(type {END_COMMAND} to retry the evaluation, {QUIT_COMMAND} to abandon)");
        match await_retry(&mut lines).await? {
            RetryChoice::Retry => continue,
            RetryChoice::Quit => {
                interview.cancel().await?;
                println!("Interview abandoned.");
                return Ok(());
            }
            RetryChoice::Closed => return Err(err),
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
enum RetryChoice {
    Retry,
    Quit,
    Closed,
}

/// Waits for `/end` or `/quit` after a failed evaluation. Other input is ignored.
async fn await_retry<R>(lines: &mut Lines<R>) -> Result<RetryChoice>
where
    R: AsyncBufRead + Unpin,
{
    while let Some(line) = lines.next_line().await? {
        match line.trim() {
            END_COMMAND => return Ok(RetryChoice::Retry),
            QUIT_COMMAND => return Ok(RetryChoice::Quit),
            "" => continue,
            _ => println!("(type {END_COMMAND} to retry the evaluation, {QUIT_COMMAND} to abandon)"),
        }
    }
    Ok(RetryChoice::Closed)
}

fn print_interviewer(content: &str) {
    println!("\nInterviewer: {content}\n");
}

fn print_evaluation(evaluation: &Evaluation) {
    println!("Overall score: {}", evaluation.overall_score);
    for (name, parameter) in &evaluation.parameter_scores {
        println!("  {name:<24} {:>5.1}  {}", parameter.score, parameter.feedback);
    }
    if !evaluation.general_feedback.is_empty() {
        println!("\n{}", evaluation.general_feedback);
    }
    for strength in &evaluation.strengths {
        println!("  + {strength}");
    }
    for area in &evaluation.areas_for_improvement {
        println!("  - {area}");
    }
    for suggestion in &evaluation.personalized_suggestions {
        println!("  * {}: {}", suggestion.area, suggestion.suggestion);
        if let Some(resources) = &suggestion.resources {
            println!("      {resources}");
        }
    }
}

fn print_outcome(outcome: &InterviewOutcome) {
    print_evaluation(&outcome.record.evaluation);

    if let Some(progress) = &outcome.record.progress {
        println!(
            "\nAttempt {} ({:+.1} since last, {:?})",
            progress.total_attempts, progress.improvement_from_last, progress.trend
        );
    }
    if let Some(metrics) = &outcome.record.video_metrics {
        println!(
            "\nBody language: {} (eye contact {}%, {})",
            metrics.overall_body_language_score,
            metrics.eye_contact_percent,
            metrics.dominant_expression
        );
    }
    match &outcome.log_id {
        Some(id) => println!("\nSaved as {id}"),
        None => println!("\nEvaluation could not be saved."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn interview_help_says_video_is_library_only() {
        let command = Cli::command();
        let interview = command.find_subcommand("interview").unwrap();
        let help = interview.get_long_about().unwrap().to_string();
        assert!(help.contains("library-only"));
        assert!(help.contains("with_sensing"));
    }

    #[test]
    fn parses_interview_arguments() {
        let cli = Cli::parse_from([
            "interview-coach",
            "interview",
            "--name",
            "Ada",
            "--type",
            "HR",
        ]);
        match cli.cmd {
            Commands::Interview {
                name,
                interview_type,
                email,
            } => {
                assert_eq!(name, "Ada");
                assert_eq!(interview_type, InterviewType::Hr);
                assert!(email.is_none());
            }
            _ => panic!("expected interview command"),
        }
    }

    #[tokio::test]
    async fn failed_evaluation_waits_for_retry_or_quit() {
        let mut lines = BufReader::new(&b"what now?\n/end\n"[..]).lines();
        assert_eq!(await_retry(&mut lines).await.unwrap(), RetryChoice::Retry);

        let mut lines = BufReader::new(&b" /quit \n"[..]).lines();
        assert_eq!(await_retry(&mut lines).await.unwrap(), RetryChoice::Quit);

        let mut lines = BufReader::new(&b"hello\n"[..]).lines();
        assert_eq!(await_retry(&mut lines).await.unwrap(), RetryChoice::Closed);
    }

    #[test]
    fn delete_rejects_both_selectors() {
        let parsed = Cli::try_parse_from([
            "interview-coach",
            "delete",
            "--id",
            "interview_x",
            "--user",
            "Ada",
        ]);
        assert!(parsed.is_err());
    }
}
