//! Derived statistics over a progress record.
//!
//! Read-only views computed on demand for the progress endpoint. Nothing
//! here mutates [`UserProgress`].

use std::collections::HashMap;

use serde::Serialize;

use crate::model::UserProgress;

/// Score at or above which a quiz "befriends a ghost".
const GHOST_SCORE: u32 = 80;
/// XP per piece of candy.
const XP_PER_CANDY: u64 = 10;
/// Quizzes averaged at each end when computing the improvement trend.
const TREND_WINDOW: usize = 5;

/// Themed progress counters shown on the dashboard.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct HalloweenMetrics {
    /// One pumpkin per story read.
    pub pumpkins_collected: usize,
    /// One ghost per quiz scored 80 or better.
    pub ghosts_befriended: usize,
    /// One spell per quiz taken, any score.
    pub spells_cast: usize,
    /// Total XP divided by 10.
    pub candy_earned: u64,
}

/// Plain learning statistics shown alongside the themed counters.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LearningStats {
    pub total_quizzes: usize,
    /// Mean quiz score, rounded to one decimal. Zero with no quizzes.
    pub average_score: f64,
    pub total_time_spent_secs: u64,
    /// Mean of the latest five scores minus the mean of the first five.
    /// Positive means improving. Zero until both windows have data.
    pub improvement_trend: f64,
    /// Up to three most-read topics, most frequent first.
    pub favorite_topics: Vec<String>,
}

pub fn halloween_metrics(progress: &UserProgress) -> HalloweenMetrics {
    HalloweenMetrics {
        pumpkins_collected: progress.stories_read.len(),
        ghosts_befriended: progress
            .quizzes_taken
            .iter()
            .filter(|q| q.score >= GHOST_SCORE)
            .count(),
        spells_cast: progress.quizzes_taken.len(),
        candy_earned: progress.experience_points / XP_PER_CANDY,
    }
}

pub fn learning_stats(progress: &UserProgress) -> LearningStats {
    let quizzes = &progress.quizzes_taken;
    let total_quizzes = quizzes.len();
    let average_score = if total_quizzes == 0 {
        0.0
    } else {
        let sum: u64 = quizzes.iter().map(|q| q.score as u64).sum();
        round1(sum as f64 / total_quizzes as f64)
    };
    let total_time_spent_secs = quizzes.iter().map(|q| q.time_spent_secs).sum();

    let improvement_trend = if total_quizzes > TREND_WINDOW {
        let mean = |slice: &[crate::model::QuizResult]| {
            slice.iter().map(|q| q.score as f64).sum::<f64>() / slice.len() as f64
        };
        let first = mean(&quizzes[..TREND_WINDOW]);
        let last = mean(&quizzes[total_quizzes - TREND_WINDOW..]);
        round1(last - first)
    } else {
        0.0
    };

    LearningStats {
        total_quizzes,
        average_score,
        total_time_spent_secs,
        improvement_trend,
        favorite_topics: favorite_topics(progress),
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Up to three topics by read count, ties broken alphabetically so the
/// output is stable across runs.
fn favorite_topics(progress: &UserProgress) -> Vec<String> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for read in &progress.stories_read {
        *counts.entry(read.topic.as_str()).or_insert(0) += 1;
    }
    let mut ranked: Vec<(&str, usize)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    ranked
        .into_iter()
        .take(3)
        .map(|(topic, _)| topic.to_string())
        .collect()
}
