//! Fit Scoring — deterministic overlap score between résumé and JD skill sets.
//!
//! `AppState` holds an `Arc<dyn FitScorer>`; `SkillOverlapScorer` is the only backend.

use serde::Serialize;

use crate::matching::skill_set::SkillSet;

// ────────────────────────────────────────────────────────────────────────────
// Output data models
// ────────────────────────────────────────────────────────────────────────────

/// Qualitative tier derived from the numeric score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FitLevel {
    Low,
    Medium,
    High,
}

impl FitLevel {
    /// High ≥ 80, Medium ≥ 50, otherwise Low.
    pub fn from_score(score: u32) -> Self {
        if score >= 80 {
            FitLevel::High
        } else if score >= 50 {
            FitLevel::Medium
        } else {
            FitLevel::Low
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreResult {
    pub score: u32, // 0 – 100
    pub fit_level: FitLevel,
    pub matched: SkillSet,
    pub missing: SkillSet,
}

// ────────────────────────────────────────────────────────────────────────────
// Trait definition
// ────────────────────────────────────────────────────────────────────────────

/// The fit scorer trait. Carried in `AppState` as `Arc<dyn FitScorer>`.
pub trait FitScorer: Send + Sync {
    fn score(&self, resume_skills: &SkillSet, jd_skills: &SkillSet) -> ScoreResult;

    /// Label surfaced in responses for transparency.
    fn backend(&self) -> &'static str;
}

/// Pure set-overlap scorer.
///
/// 1. matched = résumé ∩ JD, missing = JD − résumé
/// 2. score = ⌊100 × |matched| / |JD|⌋, or 0 when the JD has no skills
/// 3. fit level from the score thresholds
pub struct SkillOverlapScorer;

impl FitScorer for SkillOverlapScorer {
    fn score(&self, resume_skills: &SkillSet, jd_skills: &SkillSet) -> ScoreResult {
        score(resume_skills, jd_skills)
    }

    fn backend(&self) -> &'static str {
        "skill_overlap"
    }
}

pub fn score(resume_skills: &SkillSet, jd_skills: &SkillSet) -> ScoreResult {
    let matched = resume_skills.intersection(jd_skills);
    let missing = jd_skills.difference(resume_skills);

    // integer division truncates: 2/3 → 66
    let score = if jd_skills.is_empty() {
        0
    } else {
        (matched.len() * 100 / jd_skills.len()) as u32
    };

    ScoreResult {
        score,
        fit_level: FitLevel::from_score(score),
        matched,
        missing,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
