//! Axum route handlers for the Matching API.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::AppError;
use crate::extraction::jd_skills::extract_jd_skills;
use crate::extraction::rules::{extract, StructuredResumeFields};
use crate::matching::scorer::ScoreResult;
use crate::matching::skill_set::SkillSet;
use crate::matching::suggestions::{compare, SkillComparison};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

/// Skill arrays stay untyped so non-string entries surface as `MalformedSkillSet`.
#[derive(Debug, Deserialize)]
pub struct SkillPairRequest {
    pub resume_skills: Vec<Value>,
    pub jd_skills: Vec<Value>,
}

impl SkillPairRequest {
    fn into_sets(self) -> Result<(SkillSet, SkillSet), AppError> {
        Ok((
            SkillSet::try_from_values(&self.resume_skills)?,
            SkillSet::try_from_values(&self.jd_skills)?,
        ))
    }
}

#[derive(Debug, Serialize)]
pub struct ScoreResponse {
    #[serde(flatten)]
    pub result: ScoreResult,
    pub scorer_backend: String,
}

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub resume_text: String,
    pub hyperlinks: Option<Vec<String>>,
    pub jd_text: String,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub resume: StructuredResumeFields,
    pub jd_skills: SkillSet,
    pub score: ScoreResult,
    pub comparison: SkillComparison,
    pub scorer_backend: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/match/score
pub async fn handle_score(
    State(state): State<AppState>,
    Json(request): Json<SkillPairRequest>,
) -> Result<Json<ScoreResponse>, AppError> {
    let (resume_skills, jd_skills) = request.into_sets()?;
    let result = state.fit_scorer.score(&resume_skills, &jd_skills);
    Ok(Json(ScoreResponse {
        result,
        scorer_backend: state.fit_scorer.backend().to_string(),
    }))
}

/// POST /api/v1/match/compare
pub async fn handle_compare(
    Json(request): Json<SkillPairRequest>,
) -> Result<Json<SkillComparison>, AppError> {
    let (resume_skills, jd_skills) = request.into_sets()?;
    Ok(Json(compare(&resume_skills, &jd_skills)))
}

/// POST /api/v1/match/analyze
///
/// Full flow: extract résumé fields → extract JD skills → score → compare.
pub async fn handle_analyze(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeRequest>,
) -> Result<Json<AnalyzeResponse>, AppError> {
    if request.jd_text.trim().is_empty() {
        return Err(AppError::Validation("jd_text cannot be empty".to_string()));
    }

    let resume = extract(
        &request.resume_text,
        request.hyperlinks.as_deref(),
        &state.vocabulary,
    );
    let jd_skills = extract_jd_skills(&request.jd_text, &state.vocabulary, state.tagger());
    let score = state.fit_scorer.score(&resume.skills, &jd_skills);
    let comparison = compare(&resume.skills, &jd_skills);

    tracing::info!(
        "Analyzed résumé: score {} ({:?}), {} missing skills",
        score.score,
        score.fit_level,
        score.missing.len()
    );

    Ok(Json(AnalyzeResponse {
        resume,
        jd_skills,
        score,
        comparison,
        scorer_backend: state.fit_scorer.backend().to_string(),
    }))
}
