//! Quiz result reports with JSON persistence.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::grading::Grade;
use crate::quiz::{Difficulty, QuestionRecord, QuizSession};

/// A finished (or abandoned) quiz run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizReport {
    /// Unique report identifier.
    pub id: Uuid,
    /// When the report was created.
    pub created_at: DateTime<Utc>,
    pub difficulty: Difficulty,
    pub score: u32,
    pub max_score: u32,
    pub grade: Grade,
    /// `false` when the quiz was quit before the last question.
    pub completed: bool,
    /// Every settled question, in order.
    pub questions: Vec<QuestionRecord>,
}

impl QuizReport {
    pub fn from_session<R: Rng>(session: &QuizSession<R>) -> Self {
        let summary = session.summary();
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            difficulty: summary.difficulty,
            score: summary.score,
            max_score: summary.max_score,
            grade: summary.grade,
            completed: session.is_finished(),
            questions: session.history().to_vec(),
        }
    }

    /// Save the report as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize report")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        Ok(())
    }

    /// Load a report from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read report from {}", path.display()))?;
        let report: QuizReport =
            serde_json::from_str(&content).context("failed to parse report JSON")?;
        Ok(report)
    }
}
