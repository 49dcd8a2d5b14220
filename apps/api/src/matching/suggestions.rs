//! Skill comparison — matched / missing lists plus the human-readable gap suggestion.

use serde::Serialize;

use crate::matching::skill_set::SkillSet;

const SUGGESTION_PREFIX: &str = "You may consider learning or adding projects using: ";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkillComparison {
    pub matched_skills: Vec<String>,
    pub missing_skills: Vec<String>,
    pub suggestions: Vec<String>,
}

/// Sorted matched and missing skills, and one suggestion naming every missing
/// skill when there are any.
pub fn compare(resume_skills: &SkillSet, jd_skills: &SkillSet) -> SkillComparison {
    let matched_skills = resume_skills.intersection(jd_skills).to_vec();
    let missing_skills = jd_skills.difference(resume_skills).to_vec();
    let suggestions = build_suggestions(&missing_skills);

    SkillComparison {
        matched_skills,
        missing_skills,
        suggestions,
    }
}

fn build_suggestions(missing: &[String]) -> Vec<String> {
    if missing.is_empty() {
        return Vec::new();
    }
    vec![format!("{SUGGESTION_PREFIX}{}", missing.join(", "))]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(skills: &[&str]) -> SkillSet {
        skills.iter().collect()
    }

    #[test]
    fn test_missing_skills_produce_one_suggestion() {
        let comparison = compare(&set(&["python"]), &set(&["python", "aws", "docker"]));
        assert_eq!(comparison.matched_skills, vec!["python"]);
        assert_eq!(comparison.missing_skills, vec!["aws", "docker"]);
        assert_eq!(
            comparison.suggestions,
            vec!["You may consider learning or adding projects using: aws, docker"]
        );
    }

    #[test]
    fn test_no_missing_skills_no_suggestions() {
        let comparison = compare(&set(&["python", "sql"]), &set(&["sql"]));
        assert!(comparison.missing_skills.is_empty());
        assert!(comparison.suggestions.is_empty());
    }

    #[test]
    fn test_suggestion_lists_each_missing_skill_once() {
        let comparison = compare(&set(&[]), &set(&["Git", "git", "AWS", "power bi"]));
        let suggestion = &comparison.suggestions[0];
        for skill in &comparison.missing_skills {
            assert_eq!(suggestion.matches(skill.as_str()).count(), 1, "{skill}");
        }
        assert!(suggestion.ends_with("aws, git, power bi"));
    }

    #[test]
    fn test_empty_jd() {
        let comparison = compare(&set(&["python"]), &set(&[]));
        assert!(comparison.matched_skills.is_empty());
        assert!(comparison.missing_skills.is_empty());
        assert!(comparison.suggestions.is_empty());
    }
}
