//! Plausible wrong-answer generation for multiple-choice questions.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::error::StudyError;

/// Common words never used as contextual distractors.
const STOPWORDS: [&str; 12] = [
    "the", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "from",
];

/// Fixed vocabulary drawn from when the source sentence cannot supply enough
/// contextual distractors.
const GENERIC_POOL: [&str; 8] = [
    "Halloween",
    "Spooky",
    "Mystery",
    "Magic",
    "Phantom",
    "Shadow",
    "Midnight",
    "Enchanted",
];

/// Number of wrong answers every question needs.
pub const DISTRACTOR_COUNT: usize = 3;

/// Produce exactly three distractors for `correct`, preferring words from the
/// source sentence.
///
/// Up to two contextual words (longer than 3 chars, not the correct term, not
/// a stopword) are taken first; the remainder comes from the generic pool.
/// The result never contains duplicates or the correct term. Fails with
/// [`StudyError::GenerationFailed`] if the generic pool is exhausted before
/// three unique distractors exist.
pub fn distractors<R: Rng + ?Sized>(
    correct: &str,
    context_words: &[&str],
    rng: &mut R,
) -> Result<Vec<String>, StudyError> {
    let mut picked: Vec<String> = context_words
        .iter()
        .filter(|w| {
            **w != correct && w.len() > 3 && !STOPWORDS.contains(&w.to_lowercase().as_str())
        })
        .take(2)
        .map(|w| w.to_string())
        .collect();
    picked.dedup();

    let mut pool: Vec<&str> = GENERIC_POOL.to_vec();
    pool.shuffle(rng);
    for candidate in pool {
        if picked.len() >= DISTRACTOR_COUNT {
            break;
        }
        if candidate != correct && !picked.iter().any(|p| p == candidate) {
            picked.push(candidate.to_string());
        }
    }

    if picked.len() < DISTRACTOR_COUNT {
        return Err(StudyError::GenerationFailed(format!(
            "could not produce {DISTRACTOR_COUNT} unique distractors for {correct:?}"
        )));
    }
    picked.truncate(DISTRACTOR_COUNT);
    Ok(picked)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn exactly_three_none_equal_to_correct() {
        let mut rng = StdRng::seed_from_u64(7);
        let context = ["the", "algebra", "variable", "equation", "represents"];
        let got = distractors("variable", &context, &mut rng).unwrap();
        assert_eq!(got.len(), 3);
        assert!(!got.contains(&"variable".to_string()));
        for (i, d) in got.iter().enumerate() {
            assert!(!got[..i].contains(d), "duplicate distractor {d:?}");
        }
        // The two qualifying context words come first.
        assert!(got.contains(&"algebra".to_string()));
        assert!(got.contains(&"equation".to_string()));
    }

    #[test]
    fn pads_from_generic_pool_when_context_is_thin() {
        let mut rng = StdRng::seed_from_u64(1);
        let got = distractors("osmosis", &["the", "of"], &mut rng).unwrap();
        assert_eq!(got.len(), 3);
        for d in &got {
            assert!(GENERIC_POOL.contains(&d.as_str()));
        }
    }

    #[test]
    fn excludes_stopwords_regardless_of_case() {
        let mut rng = StdRng::seed_from_u64(2);
        let got = distractors("gravity", &["With", "From", "mass"], &mut rng).unwrap();
        assert!(!got.contains(&"With".to_string()));
        assert!(!got.contains(&"From".to_string()));
        assert!(got.contains(&"mass".to_string()));
    }

    #[test]
    fn never_collides_with_generic_correct_term() {
        // A correct term that lives in the generic pool must not reappear.
        for seed in 0..16 {
            let mut rng = StdRng::seed_from_u64(seed);
            let got = distractors("Phantom", &[], &mut rng).unwrap();
            assert!(!got.contains(&"Phantom".to_string()));
            assert_eq!(got.len(), 3);
        }
    }
}
