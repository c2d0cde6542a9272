use std::collections::BTreeMap;

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::InterviewRecord;

use super::helpers::read_all;
use super::LogStore;

const RECENT_LIMIT: usize = 5;
const TOP_LIMIT: usize = 5;

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct TypeStats {
    pub count: usize,
    #[serde(rename = "avgScore")]
    pub avg_score: i64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RecentInterview {
    pub name: String,
    #[serde(rename = "type")]
    pub interview_type: String,
    pub score: f64,
    pub date: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PerformerSummary {
    pub name: String,
    #[serde(rename = "type")]
    pub interview_type: String,
    pub score: f64,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct DashboardStats {
    pub total_interviews: usize,
    pub average_score: i64,
    pub by_type: BTreeMap<String, TypeStats>,
    pub recent: Vec<RecentInterview>,
    pub top_performers: Vec<PerformerSummary>,
    pub parameter_averages: BTreeMap<String, i64>,
}

fn rounded_mean(total: f64, count: usize) -> i64 {
    if count == 0 {
        return 0;
    }
    (total / count as f64).round() as i64
}

pub fn compute_dashboard(records: &[InterviewRecord]) -> DashboardStats {
    let total: f64 = records.iter().map(InterviewRecord::score).sum();

    let mut type_totals: BTreeMap<String, (usize, f64)> = BTreeMap::new();
    let mut parameter_totals: BTreeMap<String, (usize, f64)> = BTreeMap::new();
    for record in records {
        let entry = type_totals
            .entry(record.user_info.interview_type.to_string())
            .or_default();
        entry.0 += 1;
        entry.1 += record.score();

        for (name, parameter) in &record.evaluation.parameter_scores {
            let entry = parameter_totals.entry(name.clone()).or_default();
            entry.0 += 1;
            entry.1 += parameter.score;
        }
    }

    let mut newest: Vec<&InterviewRecord> = records.iter().collect();
    newest.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    let recent = newest
        .into_iter()
        .take(RECENT_LIMIT)
        .map(|record| RecentInterview {
            name: record.user_info.name.clone(),
            interview_type: record.user_info.interview_type.to_string(),
            score: record.score(),
            date: record.timestamp,
        })
        .collect();

    let mut best: Vec<&InterviewRecord> = records.iter().collect();
    best.sort_by(|a, b| b.score().total_cmp(&a.score()));
    let top_performers = best
        .into_iter()
        .take(TOP_LIMIT)
        .map(|record| PerformerSummary {
            name: record.user_info.name.clone(),
            interview_type: record.user_info.interview_type.to_string(),
            score: record.score(),
        })
        .collect();

    DashboardStats {
        total_interviews: records.len(),
        average_score: rounded_mean(total, records.len()),
        by_type: type_totals
            .into_iter()
            .map(|(kind, (count, sum))| {
                let stats = TypeStats {
                    count,
                    avg_score: rounded_mean(sum, count),
                };
                (kind, stats)
            })
            .collect(),
        recent,
        top_performers,
        parameter_averages: parameter_totals
            .into_iter()
            .map(|(name, (count, sum))| (name, rounded_mean(sum, count)))
            .collect(),
    }
}

impl LogStore {
    pub async fn dashboard_stats(&self) -> Result<DashboardStats> {
        let interviews = self.execute(read_all).await?;
        let records: Vec<InterviewRecord> =
            interviews.into_iter().map(|stored| stored.record).collect();
        Ok(compute_dashboard(&records))
    }
}
