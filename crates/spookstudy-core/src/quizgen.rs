//! Template-based quiz builder.
//!
//! The deterministic-path [`QuizSource`]: blanks a key term out of candidate
//! sentences, surrounds the correct term with plausible distractors, and
//! falls back to a fixed comprehension question when the source text is too
//! short. Also home to the assembly helper the AI providers use to give
//! their questions ids, characters, and quiz metadata.

use chrono::Utc;
use rand::seq::SliceRandom;
use rand::Rng;
use uuid::Uuid;

use async_trait::async_trait;

use crate::distractor::distractors;
use crate::error::StudyError;
use crate::extract::{candidate_sentences, key_term_candidates};
use crate::model::{
    Character, Difficulty, Quiz, QuizQuestion, POINTS_PER_QUESTION, QUESTION_CHARACTERS,
};
use crate::traits::{QuizRequest, QuizSource};

/// Quiz backend that derives questions from the story text alone.
#[derive(Debug, Default)]
pub struct TemplateQuizSource;

impl TemplateQuizSource {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl QuizSource for TemplateQuizSource {
    fn name(&self) -> &str {
        "template"
    }

    async fn generate(&self, request: &QuizRequest) -> Result<Quiz, StudyError> {
        let mut rng = rand::thread_rng();
        build_quiz(request, &mut rng)
    }
}

/// Build a quiz from the request with an explicit RNG.
///
/// Split out from the trait impl so tests and benches can seed the RNG.
pub fn build_quiz<R: Rng + ?Sized>(
    request: &QuizRequest,
    rng: &mut R,
) -> Result<Quiz, StudyError> {
    let target = request.target_count();
    let mut sentences = candidate_sentences(&request.content);
    // Randomize selection order so repeated quizzes for the same story do
    // not always blank the first N sentences.
    sentences.shuffle(rng);

    let mut questions = Vec::new();
    for sentence in &sentences {
        if questions.len() >= target {
            break;
        }
        if let Some(q) = blank_question(sentence, rng)? {
            questions.push(q);
        }
    }

    // Content too short for the requested count: pad with the fixed
    // comprehension question so the quiz never has zero questions.
    if questions.len() < target {
        questions.push(comprehension_question());
    }
    if questions.is_empty() {
        return Err(StudyError::GenerationFailed(
            "no usable sentences in source text".into(),
        ));
    }
    questions.truncate(target.max(1));

    let quiz = assemble_quiz(&request.story_id, request.difficulty, questions);
    quiz.validate()?;
    Ok(quiz)
}

/// Turn one sentence into a fill-in-the-blank question, or `None` if the
/// sentence has no word long enough to serve as a key term.
fn blank_question<R: Rng + ?Sized>(
    sentence: &str,
    rng: &mut R,
) -> Result<Option<QuizQuestion>, StudyError> {
    let candidates = key_term_candidates(sentence);
    if candidates.is_empty() {
        return Ok(None);
    }
    // Key term comes from the first three qualifying words.
    let key_term = candidates[rng.gen_range(0..candidates.len().min(3))].to_string();
    let blanked = sentence.replacen(&key_term, "______", 1);

    let context: Vec<&str> = sentence.split(' ').collect();
    let wrong = distractors(&key_term, &context, rng)?;

    let mut options: Vec<String> = Vec::with_capacity(4);
    options.push(key_term.clone());
    options.extend(wrong);
    options.shuffle(rng);
    let correct_answer = options
        .iter()
        .position(|o| *o == key_term)
        .ok_or_else(|| StudyError::GenerationFailed("correct term lost in shuffle".into()))?;

    Ok(Some(QuizQuestion {
        id: String::new(), // assigned in assemble_quiz
        prompt: format!("Complete the statement: \"{blanked}\""),
        options,
        correct_answer,
        explanation: format!(
            "The correct answer is \"{key_term}\". This comes directly from your \
             study material: \"{sentence}\""
        ),
        character: Character::Ghost, // reassigned in assemble_quiz
    }))
}

/// The fixed fallback question appended when the source text runs dry.
fn comprehension_question() -> QuizQuestion {
    QuizQuestion {
        id: String::new(),
        prompt: "What was the main topic covered in this lesson?".to_string(),
        options: vec![
            "Halloween traditions and customs".to_string(),
            "The educational content from your study material".to_string(),
            "Ghost stories and folklore".to_string(),
            "Spooky character biographies".to_string(),
        ],
        correct_answer: 1,
        explanation: "The story was designed to help you learn your study material by \
                      wrapping it in an engaging Halloween theme!"
            .to_string(),
        character: Character::Ghost,
    }
}

/// Attach ids, round-robin characters, and quiz metadata to a question list.
///
/// Shared by the template path and the AI providers so every quiz carries
/// identical structure regardless of backend.
pub fn assemble_quiz(
    story_id: &str,
    difficulty: Difficulty,
    mut questions: Vec<QuizQuestion>,
) -> Quiz {
    for (i, q) in questions.iter_mut().enumerate() {
        q.id = format!("q{}", i + 1);
        q.character = QUESTION_CHARACTERS[i % QUESTION_CHARACTERS.len()];
    }
    let count = questions.len();
    Quiz {
        id: format!("quiz-{}", Uuid::new_v4()),
        story_id: story_id.to_string(),
        questions,
        total_points: count as u32 * POINTS_PER_QUESTION,
        difficulty,
        time_limit_secs: count as u64 * difficulty.seconds_per_question(),
        created_at: Utc::now(),
    }
}
