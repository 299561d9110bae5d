//! Progression fold: XP, levels, and streaks.
//!
//! Folds story-read and quiz-completed events into a [`UserProgress`]
//! record. XP and level never decrease; badges append at most once per id;
//! the streak increments at most once per calendar day.

use chrono::{DateTime, Local, NaiveDate, Utc};
use tracing::debug;

use crate::badges;
use crate::model::{Badge, QuizResult, StoryRead, UserProgress};

/// XP granted for reading a story.
const STORY_READ_XP: u64 = 10;
/// Base XP for a quiz at 100%, scaled down by score before bonuses.
const QUIZ_BASE_XP: f64 = 15.0;

/// What a quiz-completed fold produced, for the submit response.
#[derive(Debug, Clone)]
pub struct QuizOutcome {
    pub earned_xp: u64,
    pub new_badges: Vec<Badge>,
    pub leveled_up: bool,
    pub level: u32,
}

/// Level as a pure function of cumulative XP: `floor(sqrt(xp / 100)) + 1`.
///
/// Recomputed from the total after every award rather than incremented, so
/// it can never drift.
pub fn level_for_xp(xp: u64) -> u32 {
    ((xp as f64 / 100.0).sqrt().floor() as u32) + 1
}

/// Record a story read. Deduped by story id: re-reading awards nothing.
///
/// Returns any badges newly minted by the event.
pub fn record_story_read(
    progress: &mut UserProgress,
    story_id: &str,
    topic: &str,
    now: DateTime<Utc>,
) -> Vec<Badge> {
    if progress.stories_read.iter().any(|s| s.story_id == story_id) {
        debug!(story_id, "story already counted, skipping");
        return Vec::new();
    }
    progress.stories_read.push(StoryRead {
        story_id: story_id.to_string(),
        topic: topic.to_string(),
        read_at: now,
    });
    progress.experience_points += STORY_READ_XP;
    progress.level = level_for_xp(progress.experience_points);

    let minted = badges::newly_qualified(progress, now);
    progress.badges.extend(minted.iter().cloned());
    minted
}

/// Fold a quiz submission into the progress record.
///
/// The XP streak bonus is computed against the streak as it stood before
/// this submission; the day's streak update happens after.
pub fn record_quiz_completed(progress: &mut UserProgress, result: QuizResult) -> QuizOutcome {
    let now = result.submitted_at;
    let multiplier = xp_multiplier(&result, progress.current_streak);
    let base = (QUIZ_BASE_XP * result.score as f64 / 100.0).round();
    let earned_xp = (base * multiplier).round() as u64;

    update_streak(progress, now.with_timezone(&Local).date_naive());
    progress.quizzes_taken.push(result);

    let level_before = progress.level;
    progress.experience_points += earned_xp;
    progress.level = level_for_xp(progress.experience_points);
    let leveled_up = progress.level > level_before;

    let mut new_badges = Vec::new();
    if leveled_up {
        let badge = badges::level_badge(progress.level, now);
        if !progress.has_badge(&badge.id) {
            progress.badges.push(badge.clone());
            new_badges.push(badge);
        }
    }
    let minted = badges::newly_qualified(progress, now);
    progress.badges.extend(minted.iter().cloned());
    new_badges.extend(minted);

    debug!(
        earned_xp,
        level = progress.level,
        streak = progress.current_streak,
        badges = new_badges.len(),
        "quiz folded into progress"
    );

    QuizOutcome {
        earned_xp,
        new_badges,
        leveled_up,
        level: progress.level,
    }
}

/// Bonus multiplier for quiz XP. Bonuses are additive on a 1.0 base and
/// applied once.
fn xp_multiplier(result: &QuizResult, streak_before: u32) -> f64 {
    let mut multiplier = 1.0;
    if result.score == 100 {
        multiplier += 0.5;
    }
    if result.time_spent_secs < 60 {
        multiplier += 0.2;
    }
    if streak_before >= 7 {
        multiplier += 0.3;
    } else if streak_before >= 3 {
        multiplier += 0.2;
    }
    multiplier
}

/// Advance the study streak for activity on `day` (local reckoning).
///
/// Same day as the last update: no change, so multiple submissions in one
/// day count once. Consecutive day: increment. Any gap, or first ever
/// activity: reset to 1.
pub fn update_streak(progress: &mut UserProgress, day: NaiveDate) {
    match progress.last_study_day {
        Some(last) if last == day => {}
        Some(last) if last.succ_opt() == Some(day) => {
            progress.current_streak += 1;
        }
        _ => {
            progress.current_streak = 1;
        }
    }
    progress.longest_streak = progress.longest_streak.max(progress.current_streak);
    progress.last_study_day = Some(day);
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn result(score: u32, time_spent_secs: u64, submitted_at: DateTime<Utc>) -> QuizResult {
        QuizResult {
            quiz_id: "quiz-1".into(),
            score,
            total_questions: 5,
            correct_answers: (score as usize * 5) / 100,
            time_spent_secs,
            feedback: String::new(),
            badges: Vec::new(),
            submitted_at,
        }
    }

    fn noon(day: u32) -> DateTime<Utc> {
        // Built from the local clock so streak dates land where the fold
        // puts them, in any timezone.
        Local
            .with_ymd_and_hms(2025, 10, day, 12, 0, 0)
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn level_curve() {
        assert_eq!(level_for_xp(0), 1);
        assert_eq!(level_for_xp(99), 1);
        assert_eq!(level_for_xp(100), 2);
        assert_eq!(level_for_xp(399), 2);
        assert_eq!(level_for_xp(400), 3);
        assert_eq!(level_for_xp(8100), 10);
    }

    #[test]
    fn story_read_awards_ten_xp_once() {
        let mut progress = UserProgress::new("default");
        record_story_read(&mut progress, "story-1", "biology", Utc::now());
        assert_eq!(progress.experience_points, 10);
        // Re-reading the same story is a no-op.
        record_story_read(&mut progress, "story-1", "biology", Utc::now());
        assert_eq!(progress.experience_points, 10);
        assert_eq!(progress.stories_read.len(), 1);
        assert!(progress.has_badge("first-story"));
    }

    #[test]
    fn quiz_xp_scales_with_score() {
        let mut progress = UserProgress::new("default");
        let outcome = record_quiz_completed(&mut progress, result(80, 120, noon(1)));
        // base round(15 × 0.8) = 12, no bonuses.
        assert_eq!(outcome.earned_xp, 12);
        assert_eq!(progress.experience_points, 12);
        assert!(progress.has_badge("first-quiz"));
    }

    #[test]
    fn perfect_fast_quiz_stacks_bonuses() {
        let mut progress = UserProgress::new("default");
        let outcome = record_quiz_completed(&mut progress, result(100, 25, noon(1)));
        // 15 × (1.0 + 0.5 perfect + 0.2 fast) = 25.5 → 26.
        assert_eq!(outcome.earned_xp, 26);
        assert!(progress.has_badge("perfect-first"));
        assert!(progress.has_badge("swift-spirit"));
    }

    #[test]
    fn streak_bonus_uses_pre_update_streak() {
        let mut progress = UserProgress::new("default");
        progress.current_streak = 2;
        progress.last_study_day = Some(noon(1).with_timezone(&Local).date_naive());
        // Day 2 submission raises the streak to 3, but the XP bonus sees the
        // pre-update value of 2: no streak bonus.
        let outcome = record_quiz_completed(&mut progress, result(80, 120, noon(2)));
        assert_eq!(outcome.earned_xp, 12);
        assert_eq!(progress.current_streak, 3);
        assert!(progress.has_badge("streak-3"));
    }

    #[test]
    fn same_day_submissions_count_once_for_streak() {
        let mut progress = UserProgress::new("default");
        record_quiz_completed(&mut progress, result(80, 120, noon(5)));
        record_quiz_completed(&mut progress, result(80, 120, noon(5)));
        assert_eq!(progress.current_streak, 1);
    }

    #[test]
    fn gap_resets_streak_but_not_longest() {
        let mut progress = UserProgress::new("default");
        update_streak(&mut progress, NaiveDate::from_ymd_opt(2025, 10, 1).unwrap());
        update_streak(&mut progress, NaiveDate::from_ymd_opt(2025, 10, 2).unwrap());
        update_streak(&mut progress, NaiveDate::from_ymd_opt(2025, 10, 3).unwrap());
        assert_eq!(progress.current_streak, 3);
        update_streak(&mut progress, NaiveDate::from_ymd_opt(2025, 10, 7).unwrap());
        assert_eq!(progress.current_streak, 1);
        assert_eq!(progress.longest_streak, 3);
    }

    #[test]
    fn xp_and_level_never_decrease() {
        let mut progress = UserProgress::new("default");
        let mut last_xp = 0;
        let mut last_level = 1;
        for day in 1..=9 {
            let score = (day * 11 % 101) as u32;
            record_quiz_completed(&mut progress, result(score, 100, noon(day)));
            assert!(progress.experience_points >= last_xp);
            assert!(progress.level >= last_level);
            last_xp = progress.experience_points;
            last_level = progress.level;
        }
    }

    #[test]
    fn level_up_mints_level_badge() {
        let mut progress = UserProgress::new("default");
        progress.experience_points = 95;
        progress.level = level_for_xp(95);
        let outcome = record_quiz_completed(&mut progress, result(100, 120, noon(1)));
        assert!(outcome.leveled_up);
        assert_eq!(outcome.level, 2);
        assert!(progress.has_badge("level-2"));
    }

    #[test]
    fn refolding_unchanged_history_awards_no_new_badges() {
        let mut progress = UserProgress::new("default");
        record_quiz_completed(&mut progress, result(80, 120, noon(1)));
        let badge_count = progress.badges.len();
        let minted = badges::newly_qualified(&progress, Utc::now());
        assert!(minted.is_empty());
        assert_eq!(progress.badges.len(), badge_count);
    }
}
