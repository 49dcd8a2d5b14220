use std::sync::Arc;

use crate::config::Config;
use crate::extraction::jd_skills::PartOfSpeechTagger;
use crate::extraction::vocabulary::SkillVocabulary;
use crate::matching::scorer::FitScorer;
use crate::retrieval::pipeline::RetrievalPipeline;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Retrieval pipeline wrapping the caller-owned embedder built in `main`.
    pub pipeline: RetrievalPipeline,
    pub vocabulary: Arc<SkillVocabulary>,
    /// Optional noun-phrase tagger for JD keyword extraction. `None` → vocabulary matching only.
    pub tagger: Option<Arc<dyn PartOfSpeechTagger>>,
    /// Pluggable fit scorer. Default: SkillOverlapScorer.
    pub fit_scorer: Arc<dyn FitScorer>,
}

impl AppState {
    pub fn tagger(&self) -> Option<&dyn PartOfSpeechTagger> {
        self.tagger.as_deref()
    }
}
