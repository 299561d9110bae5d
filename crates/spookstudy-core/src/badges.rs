//! Full-history badge catalog.
//!
//! Unlike the per-submission badge names in [`crate::scoring`], these badges
//! are minted against the whole [`UserProgress`] record and appended at most
//! once per id. Evaluation is idempotent: re-running the catalog against
//! unchanged progress mints nothing new, because every condition that holds
//! already has its id present.

use chrono::{DateTime, Local, Timelike, Utc};

use crate::model::{Badge, Rarity, UserProgress};

/// One catalog entry: fixed identity plus a predicate over progress.
struct CatalogEntry {
    id: &'static str,
    name: &'static str,
    description: &'static str,
    icon: &'static str,
    rarity: Rarity,
    qualifies: fn(&UserProgress) -> bool,
}

/// Local-clock hour below which a submission counts as "after midnight".
const NIGHT_OWL_HOUR: u32 = 4;
/// Submissions faster than this earn the speed badge.
const SWIFT_SPIRIT_SECS: u64 = 30;

const CATALOG: &[CatalogEntry] = &[
    CatalogEntry {
        id: "first-story",
        name: "Story Seeker",
        description: "Read your first spooky story",
        icon: "📖",
        rarity: Rarity::Common,
        qualifies: |p| !p.stories_read.is_empty(),
    },
    CatalogEntry {
        id: "story-collector",
        name: "Story Collector",
        description: "Read 5 spooky stories",
        icon: "📚",
        rarity: Rarity::Rare,
        qualifies: |p| p.stories_read.len() >= 5,
    },
    CatalogEntry {
        id: "first-quiz",
        name: "Quiz Rookie",
        description: "Complete your first quiz",
        icon: "🎯",
        rarity: Rarity::Common,
        qualifies: |p| !p.quizzes_taken.is_empty(),
    },
    CatalogEntry {
        id: "quiz-apprentice",
        name: "Quiz Apprentice",
        description: "Complete 5 quizzes",
        icon: "🧙",
        rarity: Rarity::Common,
        qualifies: |p| p.quizzes_taken.len() >= 5,
    },
    CatalogEntry {
        id: "quiz-scholar",
        name: "Quiz Scholar",
        description: "Complete 10 quizzes",
        icon: "🎓",
        rarity: Rarity::Rare,
        qualifies: |p| p.quizzes_taken.len() >= 10,
    },
    CatalogEntry {
        id: "perfect-first",
        name: "Flawless Phantom",
        description: "Score 100% on a quiz",
        icon: "👻",
        rarity: Rarity::Rare,
        qualifies: |p| p.quizzes_taken.iter().any(|q| q.score == 100),
    },
    CatalogEntry {
        id: "perfect-trio",
        name: "Triple Phantom",
        description: "Score 100% on three quizzes",
        icon: "🏆",
        rarity: Rarity::Legendary,
        qualifies: |p| p.quizzes_taken.iter().filter(|q| q.score == 100).count() >= 3,
    },
    CatalogEntry {
        id: "streak-3",
        name: "Dedicated Spirit",
        description: "Keep a 3-day study streak",
        icon: "🔥",
        rarity: Rarity::Common,
        qualifies: |p| p.current_streak >= 3,
    },
    CatalogEntry {
        id: "streak-7",
        name: "Unstoppable Specter",
        description: "Keep a 7-day study streak",
        icon: "⚡",
        rarity: Rarity::Legendary,
        qualifies: |p| p.current_streak >= 7,
    },
    CatalogEntry {
        id: "high-achiever",
        name: "Haunted Honor Student",
        description: "Average 90% or better across 5 quizzes",
        icon: "🌟",
        rarity: Rarity::Legendary,
        qualifies: |p| {
            p.quizzes_taken.len() >= 5
                && p.quizzes_taken.iter().map(|q| q.score as u64).sum::<u64>()
                    >= 90 * p.quizzes_taken.len() as u64
        },
    },
    CatalogEntry {
        id: "night-owl",
        name: "Night Owl",
        description: "Complete a quiz after midnight",
        icon: "🦉",
        rarity: Rarity::Rare,
        qualifies: |p| {
            p.quizzes_taken
                .iter()
                .any(|q| q.submitted_at.with_timezone(&Local).hour() < NIGHT_OWL_HOUR)
        },
    },
    CatalogEntry {
        id: "swift-spirit",
        name: "Swift Spirit",
        description: "Finish a quiz in under 30 seconds",
        icon: "💨",
        rarity: Rarity::Rare,
        qualifies: |p| p.quizzes_taken.iter().any(|q| q.time_spent_secs < SWIFT_SPIRIT_SECS),
    },
];

/// The badge every new user starts with.
pub fn welcome_badge(now: DateTime<Utc>) -> Badge {
    Badge {
        id: "welcome".to_string(),
        name: "Welcome to the Haunted Library".to_string(),
        description: "Joined the spooky study adventure".to_string(),
        icon: "🎃".to_string(),
        rarity: Rarity::Common,
        unlocked_at: now,
    }
}

/// Badge minted when the user reaches `level`.
pub fn level_badge(level: u32, now: DateTime<Utc>) -> Badge {
    let rarity = if level >= 10 {
        Rarity::Legendary
    } else if level >= 5 {
        Rarity::Rare
    } else {
        Rarity::Common
    };
    Badge {
        id: format!("level-{level}"),
        name: format!("Level {level} Spirit"),
        description: format!("Reached level {level}"),
        icon: "⬆️".to_string(),
        rarity,
        unlocked_at: now,
    }
}

/// Evaluate the full catalog against `progress` and return the badges that
/// newly qualify. Does not mutate; the caller appends them.
pub fn newly_qualified(progress: &UserProgress, now: DateTime<Utc>) -> Vec<Badge> {
    CATALOG
        .iter()
        .filter(|entry| !progress.has_badge(entry.id) && (entry.qualifies)(progress))
        .map(|entry| Badge {
            id: entry.id.to_string(),
            name: entry.name.to_string(),
            description: entry.description.to_string(),
            icon: entry.icon.to_string(),
            rarity: entry.rarity,
            unlocked_at: now,
        })
        .collect()
}
