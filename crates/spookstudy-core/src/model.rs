//! Core data model types for spookstudy.
//!
//! These are the fundamental types that the entire spookstudy system uses
//! to represent stories, quizzes, quiz results, and user progress.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::StudyError;

/// Quiz difficulty level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    /// Default number of questions generated at this difficulty.
    pub fn question_count(self) -> usize {
        match self {
            Difficulty::Easy => 3,
            Difficulty::Medium => 5,
            Difficulty::Hard => 7,
        }
    }

    /// Seconds granted per question when computing a quiz's time limit.
    ///
    /// Distinct from [`Difficulty::expected_answer_secs`]: this is the
    /// allowance shown to the user, not the scoring threshold.
    pub fn seconds_per_question(self) -> u64 {
        match self {
            Difficulty::Easy => 60,
            Difficulty::Medium => 90,
            Difficulty::Hard => 120,
        }
    }

    /// Expected answering time per question used by the scoring speed bonus.
    pub fn expected_answer_secs(self) -> u64 {
        match self {
            Difficulty::Easy => 45,
            Difficulty::Medium => 60,
            Difficulty::Hard => 90,
        }
    }

    /// Score multiplier applied after the base accuracy score.
    pub fn score_multiplier(self) -> f64 {
        match self {
            Difficulty::Easy => 1.0,
            Difficulty::Medium => 1.1,
            Difficulty::Hard => 1.2,
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Difficulty::Easy => write!(f, "easy"),
            Difficulty::Medium => write!(f, "medium"),
            Difficulty::Hard => write!(f, "hard"),
        }
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            other => Err(format!("unknown difficulty: {other}")),
        }
    }
}

/// Decorative Halloween character tag. Cosmetic only — never affects scoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Character {
    Ghost,
    Vampire,
    Witch,
    Skeleton,
    Pumpkin,
}

/// The four characters cycled through quiz questions, in round-robin order.
pub const QUESTION_CHARACTERS: [Character; 4] = [
    Character::Ghost,
    Character::Vampire,
    Character::Witch,
    Character::Skeleton,
];

impl fmt::Display for Character {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Character::Ghost => write!(f, "ghost"),
            Character::Vampire => write!(f, "vampire"),
            Character::Witch => write!(f, "witch"),
            Character::Skeleton => write!(f, "skeleton"),
            Character::Pumpkin => write!(f, "pumpkin"),
        }
    }
}

impl FromStr for Character {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ghost" => Ok(Character::Ghost),
            "vampire" => Ok(Character::Vampire),
            "witch" => Ok(Character::Witch),
            "skeleton" => Ok(Character::Skeleton),
            "pumpkin" => Ok(Character::Pumpkin),
            other => Err(format!("unknown character: {other}")),
        }
    }
}

/// A named character persona used in story framing and themed errors.
#[derive(Debug, Clone, Copy)]
pub struct CharacterProfile {
    pub name: &'static str,
    pub kind: Character,
    pub personality: &'static str,
    pub catchphrase: &'static str,
}

/// The narrator cast for generated stories and error payloads.
pub const CHARACTER_PROFILES: [CharacterProfile; 4] = [
    CharacterProfile {
        name: "Professor Ghostly",
        kind: Character::Ghost,
        personality: "Wise and encouraging, loves to help students learn",
        catchphrase: "Boo-tiful learning awaits!",
    },
    CharacterProfile {
        name: "Madame Mystique",
        kind: Character::Witch,
        personality: "Mysterious but helpful, speaks in riddles about knowledge",
        catchphrase: "Knowledge is the most powerful spell!",
    },
    CharacterProfile {
        name: "Count Studula",
        kind: Character::Vampire,
        personality: "Dramatic and theatrical, passionate about education",
        catchphrase: "I vant to teach you something new!",
    },
    CharacterProfile {
        name: "Bonnie Bones",
        kind: Character::Skeleton,
        personality: "Cheerful and energetic despite being bones",
        catchphrase: "Learning is in my bones!",
    },
];

/// A Halloween-framed study story generated from user-supplied text.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Story {
    /// Unique identifier for this story.
    pub id: String,
    /// Themed title.
    pub title: String,
    /// The full story text, educational content included verbatim.
    pub content: String,
    /// The raw text the story was generated from.
    #[serde(default)]
    pub original_content: Option<String>,
    /// File name or "Direct text input".
    pub original_topic: String,
    /// Names of the cast members featured in the story.
    #[serde(default)]
    pub characters: Vec<String>,
    /// Key sentences lifted from the source material.
    #[serde(default)]
    pub key_learning_points: Vec<String>,
    /// Estimated reading time in minutes, at 200 words per minute.
    #[serde(default)]
    pub estimated_read_minutes: u32,
    /// When the story was created.
    pub created_at: DateTime<Utc>,
    /// Opaque token for sharing the story without knowing its id.
    #[serde(default)]
    pub shareable_link: Option<String>,
}

/// A single multiple-choice question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizQuestion {
    /// Unique identifier within the quiz.
    pub id: String,
    /// The question text, possibly containing a blank.
    pub prompt: String,
    /// Exactly four distinct answer options, display order.
    pub options: Vec<String>,
    /// Index of the correct option in `options`.
    pub correct_answer: usize,
    /// Shown to the user after answering.
    pub explanation: String,
    /// Decorative tag, round-robin assigned.
    pub character: Character,
}

/// A generated quiz. Immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quiz {
    /// Unique identifier for this quiz.
    pub id: String,
    /// The story this quiz was generated from.
    pub story_id: String,
    /// Questions in display order.
    pub questions: Vec<QuizQuestion>,
    /// Always `10 × questions.len()`.
    pub total_points: u32,
    pub difficulty: Difficulty,
    /// `questions.len() × seconds_per_question(difficulty)`.
    pub time_limit_secs: u64,
    pub created_at: DateTime<Utc>,
}

/// Number of options every question must carry.
pub const OPTIONS_PER_QUESTION: usize = 4;

/// Points awarded per question toward `total_points`.
pub const POINTS_PER_QUESTION: u32 = 10;

impl Quiz {
    /// Check the structural invariants every quiz must satisfy.
    ///
    /// Applied to every AI-produced quiz at the boundary before acceptance;
    /// template-generated quizzes satisfy these by construction.
    pub fn validate(&self) -> Result<(), StudyError> {
        if self.questions.is_empty() {
            return Err(StudyError::GenerationFailed(
                "quiz has no questions".into(),
            ));
        }
        for (i, q) in self.questions.iter().enumerate() {
            if q.options.len() != OPTIONS_PER_QUESTION {
                return Err(StudyError::GenerationFailed(format!(
                    "question {i} has {} options, expected {OPTIONS_PER_QUESTION}",
                    q.options.len()
                )));
            }
            if q.correct_answer >= OPTIONS_PER_QUESTION {
                return Err(StudyError::GenerationFailed(format!(
                    "question {i} has correct answer index {} out of range",
                    q.correct_answer
                )));
            }
            for (a, opt) in q.options.iter().enumerate() {
                if q.options[..a].contains(opt) {
                    return Err(StudyError::GenerationFailed(format!(
                        "question {i} has duplicate option {opt:?}"
                    )));
                }
            }
            if q.explanation.trim().is_empty() {
                return Err(StudyError::GenerationFailed(format!(
                    "question {i} has an empty explanation"
                )));
            }
        }
        if self.total_points != self.questions.len() as u32 * POINTS_PER_QUESTION {
            return Err(StudyError::GenerationFailed(format!(
                "total points {} does not match question count {}",
                self.total_points,
                self.questions.len()
            )));
        }
        Ok(())
    }
}

/// The outcome of a single quiz submission. Immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizResult {
    pub quiz_id: String,
    /// Final score, clamped to 0..=100.
    pub score: u32,
    pub total_questions: usize,
    /// Invariant: `correct_answers <= total_questions`.
    pub correct_answers: usize,
    pub time_spent_secs: u64,
    /// Human-readable feedback text. Presentational only.
    pub feedback: String,
    /// Badge names earned by this submission alone.
    #[serde(default)]
    pub badges: Vec<String>,
    pub submitted_at: DateTime<Utc>,
}

/// Badge rarity tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rarity {
    Common,
    Rare,
    Legendary,
}

/// An earned achievement. Immutable once minted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Badge {
    /// Catalog id; appears at most once per user.
    pub id: String,
    pub name: String,
    pub description: String,
    pub icon: String,
    pub rarity: Rarity,
    pub unlocked_at: DateTime<Utc>,
}

/// Lightweight record of a story the user has read.
///
/// The full story body stays in story storage; progress keeps only what the
/// statistics need, so the progress file does not grow with story length.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryRead {
    pub story_id: String,
    pub topic: String,
    pub read_at: DateTime<Utc>,
}

/// Long-lived per-user progression record. Mutated additively, never deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProgress {
    pub user_id: String,
    /// Derived from XP: `floor(sqrt(xp / 100)) + 1`. Always >= 1.
    pub level: u32,
    /// Monotonically non-decreasing.
    pub experience_points: u64,
    /// Append-only, deduped by story id.
    pub stories_read: Vec<StoryRead>,
    /// Append-only submission history.
    pub quizzes_taken: Vec<QuizResult>,
    /// Append-only, deduped by badge id.
    pub badges: Vec<Badge>,
    pub current_streak: u32,
    /// Max of `current_streak` over the record's history.
    pub longest_streak: u32,
    /// Last calendar day (local reckoning) a quiz was completed. Backs the
    /// once-per-day streak increment.
    #[serde(default)]
    pub last_study_day: Option<NaiveDate>,
    #[serde(default)]
    pub favorite_character: Option<Character>,
}

impl UserProgress {
    /// Fresh record for a first-time user: level 1, zero XP, welcome badge.
    pub fn new(user_id: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            level: 1,
            experience_points: 0,
            stories_read: Vec::new(),
            quizzes_taken: Vec::new(),
            badges: vec![crate::badges::welcome_badge(Utc::now())],
            current_streak: 0,
            longest_streak: 0,
            last_study_day: None,
            favorite_character: None,
        }
    }

    pub fn has_badge(&self, id: &str) -> bool {
        self.badges.iter().any(|b| b.id == id)
    }
}
