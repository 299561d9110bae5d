//! Quiz and quiz-result persistence.

use std::path::Path;

use serde::Serialize;
use tracing::debug;

use spookstudy_core::error::StudyError;
use spookstudy_core::model::{Quiz, QuizResult};

use crate::store::JsonStore;
use crate::Repository;

/// Results returned in the aggregate view.
const RECENT_RESULTS: usize = 10;

/// Quizzes, one file per quiz id.
#[derive(Debug, Clone)]
pub struct QuizStore {
    inner: JsonStore<Quiz>,
}

impl QuizStore {
    pub async fn open(data_dir: impl AsRef<Path>) -> Result<Self, StudyError> {
        Ok(Self {
            inner: JsonStore::open(data_dir.as_ref().join("quizzes")).await?,
        })
    }

    pub async fn save(&self, quiz: &Quiz) -> Result<(), StudyError> {
        self.inner.put(&quiz.id, quiz).await
    }

    pub async fn get(&self, id: &str) -> Result<Option<Quiz>, StudyError> {
        self.inner.get(id).await
    }
}

/// Aggregate view over every stored result.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserQuizStats {
    pub total_quizzes: usize,
    /// Mean score, one decimal. Zero with no results.
    pub average_score: f64,
    pub best_score: u32,
    /// Newest first, capped at ten.
    pub recent: Vec<QuizResult>,
}

/// Quiz results, one file per submission named `{quiz_id}-{timestamp}.json`
/// so repeated attempts at the same quiz never overwrite each other.
#[derive(Debug, Clone)]
pub struct ResultStore {
    inner: JsonStore<QuizResult>,
}

impl ResultStore {
    pub async fn open(data_dir: impl AsRef<Path>) -> Result<Self, StudyError> {
        Ok(Self {
            inner: JsonStore::open(data_dir.as_ref().join("results")).await?,
        })
    }

    pub async fn save(&self, result: &QuizResult) -> Result<(), StudyError> {
        let key = format!(
            "{}-{}",
            result.quiz_id,
            result.submitted_at.timestamp_millis()
        );
        debug!(%key, score = result.score, "storing quiz result");
        self.inner.put(&key, result).await
    }

    /// Every attempt at one quiz, newest first.
    pub async fn results_for(&self, quiz_id: &str) -> Result<Vec<QuizResult>, StudyError> {
        let mut results: Vec<QuizResult> = self
            .inner
            .list()
            .await?
            .into_iter()
            .filter(|r| r.quiz_id == quiz_id)
            .collect();
        results.sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at));
        Ok(results)
    }

    /// Aggregate stats across all stored results.
    pub async fn user_stats(&self) -> Result<UserQuizStats, StudyError> {
        let mut results = self.inner.list().await?;
        results.sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at));

        let total_quizzes = results.len();
        let average_score = if total_quizzes == 0 {
            0.0
        } else {
            let sum: u64 = results.iter().map(|r| r.score as u64).sum();
            (sum as f64 / total_quizzes as f64 * 10.0).round() / 10.0
        };
        let best_score = results.iter().map(|r| r.score).max().unwrap_or(0);
        results.truncate(RECENT_RESULTS);

        Ok(UserQuizStats {
            total_quizzes,
            average_score,
            best_score,
            recent: results,
        })
    }
}
