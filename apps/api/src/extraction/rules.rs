//! Field Extractor — ordered, independent pattern rules over raw résumé text.
//!
//! Every rule is a pure function from its input to an optional value. All rules
//! run on every call; none short-circuits another, and "not found" is `None`.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use tracing::debug;

use crate::extraction::vocabulary::SkillVocabulary;
use crate::matching::skill_set::SkillSet;

/// Experience text at or below this many characters is treated as a spurious match.
const MIN_EXPERIENCE_CHARS: usize = 30;

static RE_EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}").expect("valid email pattern")
});

// Permissive: any 9–16 char run of digits, spaces and hyphens starting with a digit
// (optionally after '+'). Long numeric sequences that are not phones also match.
static RE_PHONE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\+?\d[\d\s\-]{8,15}").expect("valid phone pattern"));

static RE_EDUCATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)(?:education|qualifications)(.*?)(?:experience|skills|projects|summary|$)")
        .expect("valid education pattern")
});

static RE_EXPERIENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)(?:experience|work history)\s*(.*?)(?:education|skills|projects|summary|$)")
        .expect("valid experience pattern")
});

/// Structured facts pulled from one résumé.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StructuredResumeFields {
    pub email: Option<String>,
    pub phone: Option<String>,
    pub linkedin: Option<String>,
    pub github: Option<String>,
    pub skills: SkillSet,
    pub education: Option<String>,
    pub experience: Option<String>,
}

/// LinkedIn / GitHub profile URLs classified from a document's hyperlinks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileLinks {
    pub linkedin: Option<String>,
    pub github: Option<String>,
}

/// A rule over the visible text, paired with the field it fills.
struct TextRule {
    name: &'static str,
    extract: fn(&str) -> Option<String>,
    apply: fn(&mut StructuredResumeFields, String),
}

const TEXT_RULES: &[TextRule] = &[
    TextRule {
        name: "email",
        extract: extract_email,
        apply: |fields, value| fields.email = Some(value),
    },
    TextRule {
        name: "phone",
        extract: extract_phone,
        apply: |fields, value| fields.phone = Some(value),
    },
    TextRule {
        name: "education",
        extract: extract_education,
        apply: |fields, value| fields.education = Some(value),
    },
    TextRule {
        name: "experience",
        extract: extract_experience,
        apply: |fields, value| fields.experience = Some(value),
    },
];

/// Runs every extraction rule against `raw_text` (and `hyperlinks`, when supplied).
///
/// Never fails; identical inputs always produce identical output.
pub fn extract(
    raw_text: &str,
    hyperlinks: Option<&[String]>,
    vocabulary: &SkillVocabulary,
) -> StructuredResumeFields {
    let mut fields = StructuredResumeFields::default();

    for rule in TEXT_RULES {
        if let Some(value) = (rule.extract)(raw_text) {
            (rule.apply)(&mut fields, value);
        } else {
            debug!("Field '{}' not found in résumé text", rule.name);
        }
    }

    let links = classify_links(hyperlinks.unwrap_or_default());
    fields.linkedin = links.linkedin;
    fields.github = links.github;

    fields.skills = extract_skills(raw_text, vocabulary);

    fields
}

/// First `local@domain.tld` occurrence.
pub fn extract_email(text: &str) -> Option<String> {
    RE_EMAIL.find(text).map(|m| m.as_str().to_string())
}

/// First phone-like digit run, exactly as matched. Trailing whitespace the
/// separator class picked up is part of the value.
pub fn extract_phone(text: &str) -> Option<String> {
    RE_PHONE.find(text).map(|m| m.as_str().to_string())
}

/// Folds over the links left to right; a later match replaces an earlier one.
pub fn classify_links(links: &[String]) -> ProfileLinks {
    links.iter().fold(ProfileLinks::default(), |mut acc, link| {
        if link.contains("linkedin.com") {
            acc.linkedin = Some(link.clone());
        }
        if link.contains("github.com") {
            acc.github = Some(link.clone());
        }
        acc
    })
}

pub fn extract_skills(text: &str, vocabulary: &SkillVocabulary) -> SkillSet {
    vocabulary.find_in(text)
}

/// Text after an `education`/`qualifications` header, up to the next section
/// header or end of text. Present (possibly empty) whenever the header is found.
pub fn extract_education(text: &str) -> Option<String> {
    RE_EDUCATION
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
}

/// Text after an `experience`/`work history` header, up to the next section
/// header or end of text. Kept only when longer than 30 characters.
pub fn extract_experience(text: &str) -> Option<String> {
    RE_EXPERIENCE
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|exp| exp.chars().count() > MIN_EXPERIENCE_CHARS)
}
