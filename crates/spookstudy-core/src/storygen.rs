//! Template-based story builder.
//!
//! Wraps the user's study text in a fixed Halloween narrative frame. The
//! educational content is preserved verbatim inside the frame; only the
//! theming around it is generated.

use chrono::Utc;
use rand::seq::SliceRandom;
use rand::Rng;
use uuid::Uuid;

use async_trait::async_trait;

use crate::error::StudyError;
use crate::extract::{estimated_read_minutes, key_learning_points};
use crate::model::{CharacterProfile, Story, CHARACTER_PROFILES};
use crate::traits::{StoryRequest, StorySource};

const MAX_TITLE_LEN: usize = 60;

/// Story backend that frames the study text without any remote calls.
#[derive(Debug, Default)]
pub struct TemplateStorySource;

impl TemplateStorySource {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl StorySource for TemplateStorySource {
    fn name(&self) -> &str {
        "template"
    }

    async fn generate(&self, request: &StoryRequest) -> Result<Story, StudyError> {
        let mut rng = rand::thread_rng();
        build_story(request, &mut rng)
    }
}

/// Build a framed story with an explicit RNG (for deterministic tests).
pub fn build_story<R: Rng + ?Sized>(
    request: &StoryRequest,
    rng: &mut R,
) -> Result<Story, StudyError> {
    let content = request.content.trim();
    if content.is_empty() {
        return Err(StudyError::GenerationFailed(
            "no study text to build a story from".into(),
        ));
    }

    let cast = pick_cast(rng);
    let topic = request.topic();
    let body = frame_content(content, &topic, &cast);
    let title = themed_title(content, cast[0]);

    Ok(Story {
        id: format!("story-{}", Uuid::new_v4()),
        title,
        content: body.clone(),
        original_content: Some(request.content.clone()),
        original_topic: topic,
        characters: cast.iter().map(|c| c.name.to_string()).collect(),
        key_learning_points: key_learning_points(content),
        estimated_read_minutes: estimated_read_minutes(&body),
        created_at: Utc::now(),
        shareable_link: None,
    })
}

/// Two random narrators from the fixed cast.
fn pick_cast<R: Rng + ?Sized>(rng: &mut R) -> Vec<&'static CharacterProfile> {
    let mut cast: Vec<&CharacterProfile> = CHARACTER_PROFILES.iter().collect();
    cast.shuffle(rng);
    cast.truncate(2);
    cast
}

fn frame_content(content: &str, topic: &str, cast: &[&CharacterProfile]) -> String {
    let (opener, closer) = (cast[0], cast[1]);
    let mut parts: Vec<String> = Vec::new();

    parts.push("🎃 **The Haunted Library of Knowledge** 🎃\n".to_string());
    parts.push(format!(
        "On a dark and stormy night, {} the {} discovered an ancient tome in the \
         depths of the haunted library. The dusty pages glowed with an eerie light \
         as they revealed secrets about {topic}.\n",
        opener.name, opener.kind
    ));
    parts.push(format!(
        "\"{}\" {} exclaimed, their spectral form shimmering with excitement.\n",
        opener.catchphrase, opener.name
    ));

    parts.push("\n📚 **The Ancient Knowledge Revealed** 📚\n".to_string());
    parts.push(format!(
        "{} the {} appeared in a swirl of mist, ready to help decode the \
         mysterious text:\n\n",
        closer.name, closer.kind
    ));

    // The full study text goes in untouched; the frame must never drop
    // educational content.
    let paragraphs: Vec<&str> = content
        .split("\n\n")
        .filter(|p| !p.trim().is_empty())
        .collect();
    for (i, para) in paragraphs.iter().enumerate() {
        if i > 0 {
            parts.push("\n".to_string());
        }
        parts.push(format!("{}\n", para.trim()));
    }

    parts.push("\n\n✨ **The Lesson Learned** ✨\n".to_string());
    parts.push(format!(
        "\"{}\" {} said with a knowing smile. \"Now you understand the mysteries \
         within!\"\n",
        closer.catchphrase, closer.name
    ));
    parts.push(
        "\nThe spooky characters had successfully transformed the lesson into an \
         unforgettable adventure. The knowledge was no longer just words on a page - \
         it was a story that would haunt your memory forever! 👻📖\n"
            .to_string(),
    );

    parts.concat()
}

fn themed_title(content: &str, opener: &CharacterProfile) -> String {
    let hint: String = content
        .split_whitespace()
        .take(3)
        .collect::<Vec<_>>()
        .join(" ");
    let title = format!("🎃 {}'s Guide to {hint}... 👻", opener.name);
    if title.chars().count() > MAX_TITLE_LEN {
        "🎃 The Haunted Lesson 👻".to_string()
    } else {
        title
    }
}
