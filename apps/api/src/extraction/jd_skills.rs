//! JD skill extraction — vocabulary skills required by a job description.
//!
//! A skill is kept when it is a whole-word match in the lowercased JD, or when it
//! equals one of the noun / proper-noun tokens or noun phrases reported by an
//! optional part-of-speech tagger. The tagger is an injected capability so tests
//! can use a deterministic stub.

use std::collections::HashSet;

use tracing::debug;

use crate::extraction::vocabulary::SkillVocabulary;
use crate::matching::skill_set::SkillSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartOfSpeech {
    Noun,
    ProperNoun,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaggedToken {
    pub text: String,
    pub pos: PartOfSpeech,
}

/// Output of a tagging pass: tokens with their part of speech, plus noun phrases.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaggedText {
    pub tokens: Vec<TaggedToken>,
    pub noun_phrases: Vec<String>,
}

pub trait PartOfSpeechTagger: Send + Sync {
    fn tag(&self, text: &str) -> TaggedText;
}

/// Collects the lowercased noun / proper-noun tokens and noun phrases of `tagged`.
fn keyword_candidates(tagged: &TaggedText) -> HashSet<String> {
    tagged
        .tokens
        .iter()
        .filter(|t| matches!(t.pos, PartOfSpeech::Noun | PartOfSpeech::ProperNoun))
        .map(|t| t.text.to_lowercase())
        .chain(tagged.noun_phrases.iter().map(|p| p.to_lowercase()))
        .collect()
}

pub fn extract_jd_skills(
    jd_text: &str,
    vocabulary: &SkillVocabulary,
    tagger: Option<&dyn PartOfSpeechTagger>,
) -> SkillSet {
    let jd_lower = jd_text.to_lowercase();
    let keywords = tagger
        .map(|t| keyword_candidates(&t.tag(&jd_lower)))
        .unwrap_or_default();

    let skills: SkillSet = vocabulary
        .skills()
        .filter(|skill| keywords.contains(*skill) || vocabulary.matches(skill, &jd_lower))
        .collect();

    debug!(
        "Extracted {} JD skills ({} tagger keywords)",
        skills.len(),
        keywords.len()
    );
    skills
}
