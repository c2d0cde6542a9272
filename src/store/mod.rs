use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{anyhow, Result};

mod dashboard;
mod helpers;
mod records;

pub use dashboard::{compute_dashboard, DashboardStats, PerformerSummary, RecentInterview, TypeStats};

/// Interview logs kept as one pretty-printed JSON file per interview.
///
/// File I/O runs on the blocking pool; the store itself is cheap to clone.
#[derive(Clone)]
pub struct LogStore {
    dir: Arc<PathBuf>,
}

impl LogStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: Arc::new(dir.into()),
        }
    }

    pub fn dir(&self) -> &Path {
        self.dir.as_path()
    }

    async fn execute<F, T>(&self, task: F) -> Result<T>
    where
        F: FnOnce(&Path) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let dir = self.dir.clone();
        tokio::task::spawn_blocking(move || task(dir.as_path()))
            .await
            .map_err(|err| anyhow!("log store worker failed: {err}"))?
    }
}
