use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};

use crate::models::{InterviewRecord, StoredInterview};

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_warn};

pub const FILE_EXTENSION: &str = "json";

/// `interview_2026-03-01T10-00-00.000Z` for a record saved at that instant.
pub fn record_id(timestamp: DateTime<Utc>) -> String {
    let iso = timestamp.to_rfc3339_opts(SecondsFormat::Millis, true);
    format!("interview_{}", iso.replace(':', "-"))
}

/// Ids name files directly inside the log directory, nothing else.
pub fn validate_id(id: &str) -> Result<()> {
    if id.is_empty() || id.contains(['/', '\\']) || id.contains("..") {
        bail!("invalid interview id '{id}'");
    }
    Ok(())
}

pub fn read_record(path: &Path) -> Result<InterviewRecord> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&contents).with_context(|| format!("failed to parse {}", path.display()))
}

/// Every readable record, newest file name first. A missing directory is
/// treated as empty.
pub fn read_all(dir: &Path) -> Result<Vec<StoredInterview>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }

    let mut filenames = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("failed to list {}", dir.display()))? {
        let path = entry?.path();
        if path.extension().and_then(|ext| ext.to_str()) != Some(FILE_EXTENSION) {
            continue;
        }
        if let Some(name) = path.file_name().and_then(|name| name.to_str()) {
            filenames.push(name.to_string());
        }
    }
    filenames.sort_by(|a, b| b.cmp(a));

    let mut interviews = Vec::with_capacity(filenames.len());
    for filename in filenames {
        match read_record(&dir.join(&filename)) {
            Ok(record) => {
                let id = filename
                    .strip_suffix(".json")
                    .unwrap_or(&filename)
                    .to_string();
                interviews.push(StoredInterview {
                    id,
                    filename,
                    record,
                });
            }
            Err(err) => log_warn!("skipping unreadable interview log: {err:#}"),
        }
    }

    log_debug!("loaded {} interview logs from {}", interviews.len(), dir.display());
    Ok(interviews)
}
