//! Sentence extraction from raw study text.
//!
//! Deterministic, side-effect-free text splitting used by the template quiz
//! builder and the story metadata helpers.

/// Sentences shorter than this are treated as fragments.
const MIN_SENTENCE_LEN: usize = 20;
/// Sentences longer than this are treated as run-ons.
const MAX_SENTENCE_LEN: usize = 200;

/// Split text into candidate sentences usable for quiz questions.
///
/// Splits on sentence-terminal punctuation, trims whitespace, and keeps only
/// sentences within the fragment/run-on length band. Deterministic for
/// identical input. May return an empty vec; the quiz builder degrades
/// gracefully in that case.
pub fn candidate_sentences(text: &str) -> Vec<String> {
    text.split(['.', '!', '?'])
        .map(str::trim)
        .filter(|s| (MIN_SENTENCE_LEN..=MAX_SENTENCE_LEN).contains(&s.len()))
        .map(str::to_string)
        .collect()
}

/// Key sentences lifted from source material for story metadata.
///
/// First five sentences longer than 20 characters, in source order.
pub fn key_learning_points(text: &str) -> Vec<String> {
    text.split(['.', '!', '?'])
        .map(str::trim)
        .filter(|s| s.len() > MIN_SENTENCE_LEN)
        .take(5)
        .map(str::to_string)
        .collect()
}

/// Estimated reading time in minutes at 200 words per minute, rounded up.
pub fn estimated_read_minutes(text: &str) -> u32 {
    const WORDS_PER_MINUTE: usize = 200;
    let words = text.split_whitespace().count();
    words.div_ceil(WORDS_PER_MINUTE).max(1) as u32
}

/// Words in a sentence eligible as quiz key terms (longer than 4 chars).
pub fn key_term_candidates(sentence: &str) -> Vec<&str> {
    sentence.split(' ').filter(|w| w.len() > 4).collect()
}
