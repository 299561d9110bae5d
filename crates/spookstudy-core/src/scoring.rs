//! Quiz scoring engine.
//!
//! Pure functions over `(quiz, answers, elapsed time)` plus fixed constant
//! tables — no I/O, fully deterministic, safe to unit test exhaustively.
//! The per-submission badge names computed here are judged against this
//! single result only; full-history badges live in [`crate::badges`].

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::model::{Difficulty, Quiz, QuizResult};

/// Sentinel for a question the user never answered.
pub const UNANSWERED: i32 = -1;

/// Minimum post-multiplier score required for the speed bonus to apply.
const SPEED_BONUS_SCORE_GATE: u32 = 70;

/// Convert a submission into a [`QuizResult`].
///
/// Steps, in order: tally correct answers, compute the base accuracy score,
/// apply the difficulty multiplier (may exceed 100), apply the speed bonus
/// when gated in, clamp to 0..=100, then attach feedback and per-submission
/// badges.
pub fn score_quiz(
    quiz: &Quiz,
    answers: &HashMap<String, i32>,
    time_spent_secs: u64,
    submitted_at: DateTime<Utc>,
) -> QuizResult {
    let total = quiz.questions.len();
    let correct = quiz
        .questions
        .iter()
        .filter(|q| {
            answers.get(&q.id).copied().unwrap_or(UNANSWERED) == q.correct_answer as i32
        })
        .count();

    let base = ((correct as f64 / total as f64) * 100.0).round();
    let multiplied = (base * quiz.difficulty.score_multiplier()).round() as u32;

    let mut final_score = multiplied;
    if multiplied >= SPEED_BONUS_SCORE_GATE {
        let avg_secs = time_spent_secs as f64 / total as f64;
        let expected = quiz.difficulty.expected_answer_secs() as f64;
        if avg_secs < expected * 0.8 {
            final_score = (multiplied as f64 * 1.1).round() as u32;
        }
    }
    final_score = final_score.min(100);

    QuizResult {
        quiz_id: quiz.id.clone(),
        score: final_score,
        total_questions: total,
        correct_answers: correct,
        time_spent_secs,
        feedback: feedback(final_score, correct, total),
        badges: submission_badges(final_score, correct, total, time_spent_secs, quiz.difficulty),
        submitted_at,
    }
}

/// Score-banded feedback text. Presentational only.
fn feedback(score: u32, correct: usize, total: usize) -> String {
    if score >= 95 {
        format!(
            "🎉 Absolutely phenomenal! You scored {score}% ({correct}/{total} correct)! \
             You've mastered this material with spook-tacular precision!"
        )
    } else if score >= 85 {
        format!(
            "👻 Excellent work! You scored {score}% ({correct}/{total} correct)! \
             The spirits are thoroughly impressed with your performance!"
        )
    } else if score >= 70 {
        format!(
            "🎃 Good job! You scored {score}% ({correct}/{total} correct)! \
             You're getting the hang of this spooky learning adventure!"
        )
    } else if score >= 50 {
        format!(
            "🧙 You're learning! You scored {score}% ({correct}/{total} correct). \
             Don't worry - even the wisest witches had to start somewhere!"
        )
    } else {
        format!(
            "💀 Keep trying! You scored {score}% ({correct}/{total} correct). \
             Remember, even skeletons need to study their bones! Don't give up!"
        )
    }
}

/// Badge names earned by this submission alone.
fn submission_badges(
    score: u32,
    correct: usize,
    total: usize,
    time_spent_secs: u64,
    difficulty: Difficulty,
) -> Vec<String> {
    let mut badges = Vec::new();
    let avg_secs = time_spent_secs as f64 / total as f64;
    let expected = difficulty.expected_answer_secs() as f64;

    if score == 100 {
        badges.push("Perfect Score Phantom".to_string());
        if difficulty == Difficulty::Hard {
            badges.push("Hard Mode Hero".to_string());
        }
    }

    if score >= 95 {
        badges.push("Spooky Scholar Supreme".to_string());
    } else if score >= 90 {
        badges.push("Spooky Scholar".to_string());
    } else if score >= 85 {
        badges.push("Ghostly Graduate".to_string());
    } else if score >= 80 {
        badges.push("Haunted Honor Roll".to_string());
    }

    if avg_secs < expected * 0.6 && score >= 80 {
        badges.push("Lightning Learner".to_string());
    } else if avg_secs < expected * 0.8 && score >= 70 {
        badges.push("Quick Thinker".to_string());
    }

    if difficulty == Difficulty::Hard && score >= 70 {
        badges.push("Brave Soul".to_string());
    } else if difficulty == Difficulty::Medium && score >= 85 {
        badges.push("Rising Star".to_string());
    }

    if correct == total {
        badges.push("Precision Phantom".to_string());
    } else if correct * 10 >= total * 9 {
        badges.push("Sharp Shooter".to_string());
    }

    badges.push("Quiz Conqueror".to_string());
    if score >= 70 {
        badges.push("Knowledge Seeker".to_string());
    }

    badges
}

const PERFECT_MESSAGES: [&str; 3] = [
    "🎉 PERFECT SCORE! You're absolutely spook-tacular!",
    "👻 FLAWLESS VICTORY! The spirits bow to your knowledge!",
    "🎃 PERFECT! You've achieved Halloween learning mastery!",
];
const EXCELLENT_MESSAGES: [&str; 3] = [
    "🌟 EXCELLENT! You're a true spooky scholar!",
    "🧙 OUTSTANDING! Your knowledge is magical!",
    "👻 SUPERB! The ghosts are cheering for you!",
];
const GOOD_MESSAGES: [&str; 3] = [
    "🎃 WELL DONE! You're making great progress!",
    "💀 GOOD JOB! You're getting the hang of this!",
    "🧙 NICE WORK! Keep up the spooky studies!",
];
const OKAY_MESSAGES: [&str; 3] = [
    "🌟 KEEP GOING! You're on the right track!",
    "👻 GOOD EFFORT! Practice makes perfect!",
    "🎭 NICE TRY! Every attempt makes you stronger!",
];
const NEEDS_WORK_MESSAGES: [&str; 3] = [
    "💪 DON'T GIVE UP! You're learning and growing!",
    "🌟 KEEP TRYING! Every expert was once a beginner!",
    "🎃 STAY STRONG! Your next attempt will be better!",
];

/// Badge names that every submission earns; not worth celebrating.
const ROUTINE_BADGES: [&str; 2] = ["Quiz Conqueror", "Knowledge Seeker"];

/// Celebration line for the submit response. Deterministic in its inputs.
pub fn celebration_message(score: u32, badges: &[String]) -> String {
    let band: &[&str] = if score == 100 {
        &PERFECT_MESSAGES
    } else if score >= 85 {
        &EXCELLENT_MESSAGES
    } else if score >= 70 {
        &GOOD_MESSAGES
    } else if score >= 50 {
        &OKAY_MESSAGES
    } else {
        &NEEDS_WORK_MESSAGES
    };
    let message = band[score as usize % band.len()];

    let special = badges
        .iter()
        .filter(|b| !ROUTINE_BADGES.contains(&b.as_str()))
        .count();
    if special > 0 {
        let plural = if special > 1 { "s" } else { "" };
        format!("{message} You've earned {special} special badge{plural}! 🏆")
    } else {
        message.to_string()
    }
}

/// Study suggestions for the retry flow, banded by score.
pub fn retry_suggestions(score: u32, difficulty: Difficulty) -> Vec<String> {
    let mut suggestions = Vec::new();

    if score < 70 {
        suggestions.push("📖 Review the story content more carefully".to_string());
        suggestions.push("📝 Take notes while reading to remember key points".to_string());
        suggestions.push("🐌 Take your time - there's no rush to answer".to_string());
    }
    if score < 50 {
        suggestions.push("📚 Try reading the story multiple times".to_string());
        suggestions.push("🎯 Focus on understanding main concepts first".to_string());
        if difficulty != Difficulty::Easy {
            suggestions.push("⬇️ Consider trying an easier difficulty level".to_string());
        }
    }
    if (70..90).contains(&score) {
        suggestions.push("🔍 Pay closer attention to question details".to_string());
        suggestions.push("💭 Think through each answer choice carefully".to_string());
        suggestions.push("📊 Review the explanations for missed questions".to_string());
    }
    if score >= 90 && difficulty != Difficulty::Hard {
        suggestions.push("⬆️ Try a harder difficulty for more challenge".to_string());
        suggestions.push("🎯 Aim for that perfect 100% score".to_string());
    }

    suggestions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Character, QuizQuestion, POINTS_PER_QUESTION};

    fn quiz(difficulty: Difficulty, count: usize) -> Quiz {
        let questions = (0..count)
            .map(|i| QuizQuestion {
                id: format!("q{}", i + 1),
                prompt: format!("Question {i}"),
                options: vec!["a".into(), "b".into(), "c".into(), "d".into()],
                correct_answer: i % 4,
                explanation: "because".into(),
                character: Character::Ghost,
            })
            .collect::<Vec<_>>();
        Quiz {
            id: "quiz-1".into(),
            story_id: "story-1".into(),
            total_points: count as u32 * POINTS_PER_QUESTION,
            time_limit_secs: count as u64 * difficulty.seconds_per_question(),
            questions,
            difficulty,
            created_at: Utc::now(),
        }
    }

    fn all_correct(quiz: &Quiz) -> HashMap<String, i32> {
        quiz.questions
            .iter()
            .map(|q| (q.id.clone(), q.correct_answer as i32))
            .collect()
    }

    #[test]
    fn medium_all_correct_fast_clamps_to_100() {
        // 5 questions, all correct, 100s: base 100 -> ×1.1 = 110 -> speed
        // bonus (20s avg < 48s) -> 121 -> clamp -> 100.
        let quiz = quiz(Difficulty::Medium, 5);
        let result = score_quiz(&quiz, &all_correct(&quiz), 100, Utc::now());
        assert_eq!(result.score, 100);
        assert_eq!(result.correct_answers, 5);
    }

    #[test]
    fn easy_three_of_five_slow_scores_60() {
        // base 60 -> ×1.0 = 60, below the 70 gate so no speed bonus.
        let quiz = quiz(Difficulty::Easy, 5);
        let mut answers = all_correct(&quiz);
        for q in &quiz.questions[3..] {
            answers.insert(q.id.clone(), (q.correct_answer as i32 + 1) % 4);
        }
        let result = score_quiz(&quiz, &answers, 500, Utc::now());
        assert_eq!(result.score, 60);
        assert_eq!(result.correct_answers, 3);
    }

    #[test]
    fn missing_answers_count_as_wrong() {
        let quiz = quiz(Difficulty::Easy, 4);
        let result = score_quiz(&quiz, &HashMap::new(), 60, Utc::now());
        assert_eq!(result.score, 0);
        assert_eq!(result.correct_answers, 0);
    }

    #[test]
    fn score_always_within_bounds() {
        for difficulty in [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard] {
            for time in [1u64, 50, 500] {
                let quiz = quiz(difficulty, 5);
                let result = score_quiz(&quiz, &all_correct(&quiz), time, Utc::now());
                assert!(result.score <= 100);
            }
        }
    }

    #[test]
    fn hard_multiplier_pushes_partial_score_up() {
        // 4/5 correct on hard: base 80 -> ×1.2 = 96, slow, no speed bonus.
        let quiz = quiz(Difficulty::Hard, 5);
        let mut answers = all_correct(&quiz);
        let last = &quiz.questions[4];
        answers.insert(last.id.clone(), (last.correct_answer as i32 + 1) % 4);
        let result = score_quiz(&quiz, &answers, 600, Utc::now());
        assert_eq!(result.score, 96);
    }

    #[test]
    fn perfect_submission_earns_phantom_badges() {
        let quiz = quiz(Difficulty::Hard, 5);
        let result = score_quiz(&quiz, &all_correct(&quiz), 600, Utc::now());
        assert!(result.badges.contains(&"Perfect Score Phantom".to_string()));
        assert!(result.badges.contains(&"Hard Mode Hero".to_string()));
        assert!(result.badges.contains(&"Precision Phantom".to_string()));
        assert!(result.badges.contains(&"Quiz Conqueror".to_string()));
    }

    #[test]
    fn speed_badges_gated_on_accuracy() {
        // Fast but 0% accurate: no speed badge.
        let quiz = quiz(Difficulty::Medium, 5);
        let result = score_quiz(&quiz, &HashMap::new(), 10, Utc::now());
        assert!(!result.badges.iter().any(|b| b.contains("Lightning")));
        assert!(!result.badges.iter().any(|b| b.contains("Quick")));
    }

    #[test]
    fn feedback_band_matches_score() {
        let quiz = quiz(Difficulty::Easy, 4);
        let result = score_quiz(&quiz, &all_correct(&quiz), 600, Utc::now());
        assert!(result.feedback.contains("100%"));
        assert!(result.feedback.contains("phenomenal"));
    }

    #[test]
    fn celebration_counts_special_badges_only() {
        let message = celebration_message(
            100,
            &[
                "Perfect Score Phantom".to_string(),
                "Quiz Conqueror".to_string(),
                "Knowledge Seeker".to_string(),
            ],
        );
        assert!(message.contains("1 special badge!"));
    }

    #[test]
    fn retry_suggestions_banding() {
        assert!(!retry_suggestions(40, Difficulty::Medium).is_empty());
        assert!(retry_suggestions(40, Difficulty::Medium)
            .iter()
            .any(|s| s.contains("easier difficulty")));
        assert!(retry_suggestions(95, Difficulty::Hard).is_empty());
        assert!(retry_suggestions(95, Difficulty::Easy)
            .iter()
            .any(|s| s.contains("harder difficulty")));
    }
}
