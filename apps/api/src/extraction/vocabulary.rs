//! Skill vocabulary — the closed list of recognised skill terms and their matchers.

use regex::{Regex, RegexBuilder};

use crate::errors::MatchError;
use crate::matching::skill_set::SkillSet;

/// Built-in "common skills" catalogue. Extended at startup via `EXTRA_SKILLS`.
pub const COMMON_SKILLS: &[&str] = &[
    "python",
    "java",
    "c++",
    "sql",
    "excel",
    "power bi",
    "tableau",
    "tensorflow",
    "pytorch",
    "nlp",
    "opencv",
    "machine learning",
    "deep learning",
    "data analysis",
    "data science",
    "html",
    "css",
    "javascript",
    "flask",
    "django",
    "aws",
    "azure",
    "git",
];

#[derive(Debug, Clone)]
struct VocabularyEntry {
    skill: String,
    pattern: Regex,
}

/// An ordered, deduplicated list of lowercase skills, each with a compiled
/// case-insensitive whole-word matcher.
#[derive(Debug, Clone)]
pub struct SkillVocabulary {
    entries: Vec<VocabularyEntry>,
}

impl SkillVocabulary {
    pub fn new<I, S>(skills: I) -> Result<Self, MatchError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut entries: Vec<VocabularyEntry> = Vec::new();
        for skill in skills {
            let skill = skill.as_ref().trim().to_lowercase();
            if skill.is_empty() || entries.iter().any(|e| e.skill == skill) {
                continue;
            }
            let pattern = RegexBuilder::new(&whole_word_pattern(&skill))
                .case_insensitive(true)
                .build()
                .map_err(|e| MatchError::InvalidVocabulary(format!("'{skill}': {e}")))?;
            entries.push(VocabularyEntry { skill, pattern });
        }
        Ok(Self { entries })
    }

    /// The built-in catalogue followed by `extra` entries.
    pub fn with_extra(extra: &[String]) -> Result<Self, MatchError> {
        Self::new(
            COMMON_SKILLS
                .iter()
                .map(|s| s.to_string())
                .chain(extra.iter().cloned()),
        )
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn skills(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.skill.as_str())
    }

    /// Every vocabulary entry that occurs as a whole word in `text`.
    pub fn find_in(&self, text: &str) -> SkillSet {
        self.entries
            .iter()
            .filter(|e| e.pattern.is_match(text))
            .map(|e| e.skill.as_str())
            .collect()
    }

    /// Whole-word test for a single entry; `false` for skills outside the vocabulary.
    pub fn matches(&self, skill: &str, text: &str) -> bool {
        self.entries
            .iter()
            .find(|e| e.skill == skill)
            .map(|e| e.pattern.is_match(text))
            .unwrap_or(false)
    }
}

/// `\b` only anchors between word and non-word characters, so entries that
/// begin or end with punctuation ("c++", ".net") use an explicit
/// start/non-word guard on that side instead.
fn whole_word_pattern(skill: &str) -> String {
    let is_word = |c: char| c.is_alphanumeric() || c == '_';
    let left = match skill.chars().next() {
        Some(c) if is_word(c) => r"\b",
        _ => r"(?:^|\W)",
    };
    let right = match skill.chars().last() {
        Some(c) if is_word(c) => r"\b",
        _ => r"(?:$|\W)",
    };
    format!("{left}{}{right}", regex::escape(skill))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn common() -> SkillVocabulary {
        SkillVocabulary::with_extra(&[]).unwrap()
    }

    #[test]
    fn test_common_catalogue_size() {
        assert_eq!(common().len(), COMMON_SKILLS.len());
    }

    #[test]
    fn test_whole_word_matching() {
        let vocab = common();
        let found = vocab.find_in("Wrote JavaScript and some Java; used Git daily");
        assert!(found.contains("javascript"));
        assert!(found.contains("java"));
        assert!(found.contains("git"));
        // "git" must not match inside "github"
        assert!(!vocab.find_in("see my github profile").contains("git"));
    }

    #[test]
    fn test_case_insensitive_multiword() {
        let found = common().find_in("Strong background in MACHINE LEARNING and Power BI");
        assert!(found.contains("machine learning"));
        assert!(found.contains("power bi"));
    }

    #[test]
    fn test_punctuated_skill_matches_as_word() {
        let vocab = common();
        assert!(vocab.find_in("Expert in C++, Rust").contains("c++"));
        assert!(vocab.find_in("C++").contains("c++"));
        assert!(!vocab.find_in("abc++ macros").contains("c++"));
    }

    #[test]
    fn test_extra_entries_are_normalised_and_deduplicated() {
        let vocab =
            SkillVocabulary::with_extra(&["Kubernetes".to_string(), "PYTHON".to_string()]).unwrap();
        assert_eq!(vocab.len(), COMMON_SKILLS.len() + 1);
        assert!(vocab.skills().any(|s| s == "kubernetes"));
        assert!(vocab.find_in("Ran workloads on kubernetes").contains("kubernetes"));
    }

    #[test]
    fn test_matches_single_entry() {
        let vocab = common();
        assert!(vocab.matches("sql", "PostgreSQL and SQL Server"));
        assert!(!vocab.matches("rust", "rust"));
    }

    #[test]
    fn test_no_matches_is_empty_set() {
        assert!(common().find_in("Gardening and baking").is_empty());
    }
}
