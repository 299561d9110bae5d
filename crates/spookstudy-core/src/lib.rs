//! spookstudy-core — Quiz generation, scoring, and progression engine.
//!
//! This crate defines the fundamental data model, generator traits, and the
//! deterministic business logic (template quiz building, scoring, badge and
//! level evaluation) that the rest of the spookstudy system builds on.

pub mod badges;
pub mod distractor;
pub mod error;
pub mod extract;
pub mod model;
pub mod progress;
pub mod quizgen;
pub mod scoring;
pub mod stats;
pub mod storygen;
pub mod traits;
