//! Skill sets — normalised, ordered collections of skill names shared by the
//! extractor, the JD parser and the scorer.

use std::collections::BTreeSet;

use serde::Serialize;
use serde_json::Value;

use crate::errors::MatchError;

/// A deduplicated set of lowercase skill names.
///
/// Entries are trimmed and lowercased on insertion; blank entries are dropped.
/// Iteration order is alphabetical.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SkillSet(BTreeSet<String>);

impl SkillSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, skill: &str) -> bool {
        let normalized = skill.trim().to_lowercase();
        if normalized.is_empty() {
            return false;
        }
        self.0.insert(normalized)
    }

    pub fn contains(&self, skill: &str) -> bool {
        self.0.contains(&skill.trim().to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn intersection(&self, other: &SkillSet) -> SkillSet {
        SkillSet(self.0.intersection(&other.0).cloned().collect())
    }

    pub fn difference(&self, other: &SkillSet) -> SkillSet {
        SkillSet(self.0.difference(&other.0).cloned().collect())
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.0.iter().cloned().collect()
    }

    /// Builds a set from untyped JSON entries, rejecting anything that is not a string.
    pub fn try_from_values(values: &[Value]) -> Result<Self, MatchError> {
        let mut set = SkillSet::new();
        for (i, value) in values.iter().enumerate() {
            match value.as_str() {
                Some(skill) => {
                    set.insert(skill);
                }
                None => {
                    return Err(MatchError::MalformedSkillSet(format!(
                        "entry {i} is not a string: {value}"
                    )))
                }
            }
        }
        Ok(set)
    }
}

impl<S: AsRef<str>> FromIterator<S> for SkillSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = SkillSet::new();
        for skill in iter {
            set.insert(skill.as_ref());
        }
        set
    }
}
