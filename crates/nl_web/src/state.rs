use std::sync::Arc;

use nl_analysis::{AnalysisCache, AnalysisOrchestrator, PovOrchestrator};
use nl_core::TextGenerator;
use nl_search::SearchOrchestrator;
use nl_store::SavedArticlesStore;

/// One instance per process; every handler sees the same caches and store.
pub struct AppState {
    pub search: SearchOrchestrator,
    pub analyzer: AnalysisOrchestrator,
    pub pov: PovOrchestrator,
    pub analysis_cache: AnalysisCache,
    pub saved: SavedArticlesStore,
    /// Kept for the diagnostic models endpoint.
    pub generator: Arc<dyn TextGenerator>,
}
