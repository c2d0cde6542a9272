use anyhow::{Context, Result};
use log::warn;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::PathBuf,
    sync::{RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use crate::analysis::AnalysisConfig;

pub const API_KEY_ENV: &str = "LITEROUTER_API_KEY";
pub const BASE_URL_ENV: &str = "LITEROUTER_BASE_URL";
pub const LOGS_DIR_ENV: &str = "INTERVIEW_LOGS_DIR";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LlmSettings {
    pub base_url: String,
    pub model: String,
    pub chat_max_tokens: u32,
    pub chat_temperature: f32,
    pub evaluation_max_tokens: u32,
    pub evaluation_temperature: f32,
    /// Only ever read from the environment.
    #[serde(skip)]
    pub api_key: Option<String>,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            base_url: "https://api.literouter.com/v1".into(),
            model: "gemini-free".into(),
            chat_max_tokens: 1024,
            chat_temperature: 0.7,
            evaluation_max_tokens: 2048,
            evaluation_temperature: 0.3,
            api_key: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct InterviewSettings {
    pub max_questions: u32,
}

impl Default for InterviewSettings {
    fn default() -> Self {
        Self { max_questions: 5 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppSettings {
    pub llm: LlmSettings,
    pub logs_dir: PathBuf,
    pub analysis: AnalysisConfig,
    pub interview: InterviewSettings,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            llm: LlmSettings::default(),
            logs_dir: PathBuf::from("interview_logs"),
            analysis: AnalysisConfig::default(),
            interview: InterviewSettings::default(),
        }
    }
}

impl AppSettings {
    /// Applies `LITEROUTER_*` / `INTERVIEW_LOGS_DIR` overrides from `lookup`.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(key) = non_empty(API_KEY_ENV) {
            self.llm.api_key = Some(key);
        }
        if let Some(url) = non_empty(BASE_URL_ENV) {
            self.llm.base_url = url;
        }
        if let Some(dir) = non_empty(LOGS_DIR_ENV) {
            self.logs_dir = PathBuf::from(dir);
        }
    }
}

pub struct SettingsStore {
    path: PathBuf,
    data: RwLock<AppSettings>,
}

impl SettingsStore {
    /// Loads `path`, falling back to defaults when it is missing or invalid.
    /// Environment overrides are applied on top.
    pub fn new(path: PathBuf) -> Result<Self> {
        let mut data = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings from {}", path.display()))?;
            serde_json::from_str(&contents).unwrap_or_else(|err| {
                warn!("Ignoring invalid settings file {}: {err}", path.display());
                AppSettings::default()
            })
        } else {
            AppSettings::default()
        };
        data.apply_overrides(|key| std::env::var(key).ok());

        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    fn read(&self) -> RwLockReadGuard<'_, AppSettings> {
        match self.data.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn write(&self) -> RwLockWriteGuard<'_, AppSettings> {
        match self.data.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    pub fn snapshot(&self) -> AppSettings {
        self.read().clone()
    }

    pub fn llm(&self) -> LlmSettings {
        self.read().llm.clone()
    }

    pub fn logs_dir(&self) -> PathBuf {
        self.read().logs_dir.clone()
    }

    pub fn analysis(&self) -> AnalysisConfig {
        self.read().analysis.clone()
    }

    pub fn update_analysis(&self, analysis: AnalysisConfig) -> Result<()> {
        let mut guard = self.write();
        guard.analysis = analysis;
        self.persist(&guard)
    }

    pub fn update_interview(&self, interview: InterviewSettings) -> Result<()> {
        let mut guard = self.write();
        guard.interview = interview;
        self.persist(&guard)
    }

    fn persist(&self, data: &AppSettings) -> Result<()> {
        let serialized = serde_json::to_string_pretty(data)?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("Failed to write settings to {}", self.path.display()))
    }
}
