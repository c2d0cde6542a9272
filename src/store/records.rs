use std::fs;

use anyhow::{Context, Result};
use log::{info, warn};

use crate::models::{AttemptScore, InterviewRecord, InterviewType, Progress, StoredInterview};

use super::helpers::{read_all, record_id, validate_id, FILE_EXTENSION};
use super::LogStore;

impl LogStore {
    /// Writes the record and returns its id. Failures are logged and yield `None`.
    pub async fn save(&self, record: &InterviewRecord) -> Option<String> {
        let record = record.clone();
        let result = self
            .execute(move |dir| {
                fs::create_dir_all(dir)
                    .with_context(|| format!("failed to create {}", dir.display()))?;

                let id = record_id(record.timestamp);
                let path = dir.join(format!("{id}.{FILE_EXTENSION}"));
                let serialized = serde_json::to_string_pretty(&record)?;
                fs::write(&path, serialized)
                    .with_context(|| format!("failed to write {}", path.display()))?;
                Ok(id)
            })
            .await;

        match result {
            Ok(id) => {
                info!("Interview log saved: {id}");
                Some(id)
            }
            Err(err) => {
                warn!("Could not save interview log: {err:#}");
                None
            }
        }
    }

    pub async fn list_all(&self) -> Result<Vec<StoredInterview>> {
        self.execute(read_all).await
    }

    pub async fn list_for_user(&self, name: &str) -> Result<Vec<StoredInterview>> {
        let interviews = self.list_all().await?;
        Ok(interviews
            .into_iter()
            .filter(|stored| stored.record.user_info.matches_name(name))
            .collect())
    }

    /// `Ok(false)` when no log with that id exists.
    pub async fn delete_by_id(&self, id: &str) -> Result<bool> {
        validate_id(id)?;
        let id = id.to_string();
        self.execute(move |dir| {
            let path = dir.join(format!("{id}.{FILE_EXTENSION}"));
            if !path.exists() {
                return Ok(false);
            }
            fs::remove_file(&path).with_context(|| format!("failed to delete {}", path.display()))?;
            info!("Deleted interview log {id}");
            Ok(true)
        })
        .await
    }

    /// Deletes every log whose candidate name matches, ignoring case.
    pub async fn delete_for_user(&self, name: &str) -> Result<usize> {
        let name = name.to_string();
        self.execute(move |dir| {
            let mut count = 0;
            for stored in read_all(dir)? {
                if !stored.record.user_info.matches_name(&name) {
                    continue;
                }
                let path = dir.join(&stored.filename);
                fs::remove_file(&path)
                    .with_context(|| format!("failed to delete {}", path.display()))?;
                count += 1;
            }
            info!("Cleared {count} interview logs for {name}");
            Ok(count)
        })
        .await
    }

    /// Earlier attempts by the same candidate at the same interview type,
    /// oldest first.
    pub async fn previous_attempts(
        &self,
        name: &str,
        interview_type: InterviewType,
    ) -> Result<Vec<AttemptScore>> {
        let mut attempts: Vec<AttemptScore> = self
            .list_for_user(name)
            .await?
            .into_iter()
            .filter(|stored| stored.record.user_info.interview_type == interview_type)
            .map(|stored| AttemptScore {
                date: stored.record.timestamp,
                score: stored.record.score(),
            })
            .collect();
        attempts.sort_by_key(|attempt| attempt.date);
        Ok(attempts)
    }

    /// Progress for a new score; `None` on a first attempt or when the history
    /// cannot be read.
    pub async fn progress_for(
        &self,
        name: &str,
        interview_type: InterviewType,
        new_score: f64,
    ) -> Option<Progress> {
        match self.previous_attempts(name, interview_type).await {
            Ok(previous) => Progress::from_attempts(previous, new_score),
            Err(err) => {
                warn!("Error getting previous attempts: {err:#}");
                None
            }
        }
    }
}
