//! Prompt construction for the remote AI backends.
//!
//! Both providers share these prompts so switching backends never changes
//! what is asked of the model.

use spookstudy_core::model::Difficulty;

pub const QUIZ_SYSTEM_PROMPT: &str = "You are a Halloween-themed educational quiz generator. \
     Create engaging multiple-choice questions that test comprehension of the provided story \
     content. Always respond with valid JSON only.";

pub const STORY_SYSTEM_PROMPT: &str = "You are a Halloween-themed educational storyteller. \
     Wrap the provided study material in a spooky but friendly narrative without dropping any \
     of the educational content. Always respond with valid JSON only.";

fn difficulty_instructions(difficulty: Difficulty) -> &'static str {
    match difficulty {
        Difficulty::Easy => "Focus on basic comprehension and main concepts. Use simple language.",
        Difficulty::Medium => {
            "Include some analysis and application questions. Mix recall and understanding."
        }
        Difficulty::Hard => {
            "Include complex analysis, synthesis, and evaluation questions. Challenge critical thinking."
        }
    }
}

/// User prompt asking for a JSON array of questions.
pub fn quiz_prompt(content: &str, difficulty: Difficulty, question_count: usize) -> String {
    format!(
        "Generate {question_count} multiple-choice questions based on this educational story \
         content:\n\n{content}\n\n\
         Requirements:\n\
         - Difficulty level: {difficulty} ({instructions})\n\
         - Each question should have 4 options (A, B, C, D)\n\
         - Include detailed explanations for correct answers\n\
         - Focus on educational content, not Halloween elements\n\
         - Questions should test understanding of key concepts\n\n\
         Respond with ONLY a JSON array in this exact format:\n\
         [\n  {{\n    \"question\": \"What is the main concept explained in the story?\",\n    \
         \"options\": [\"Option A\", \"Option B\", \"Option C\", \"Option D\"],\n    \
         \"correctAnswer\": 0,\n    \
         \"explanation\": \"Detailed explanation of why this answer is correct.\"\n  }}\n]",
        instructions = difficulty_instructions(difficulty),
    )
}

/// User prompt asking for a themed story plus title.
pub fn story_prompt(content: &str, topic: &str) -> String {
    format!(
        "Transform this study material about {topic} into a fun Halloween-themed story \
         featuring friendly spooky characters:\n\n{content}\n\n\
         Requirements:\n\
         - Keep ALL the educational content intact and accurate\n\
         - Weave the material into a haunted-library adventure\n\
         - Keep the tone friendly and encouraging, never frightening\n\
         - Give the story a short themed title\n\n\
         Respond with ONLY a JSON object in this exact format:\n\
         {{\n  \"title\": \"A short themed title\",\n  \
         \"content\": \"The full story text with the educational material woven in.\"\n}}"
    )
}
