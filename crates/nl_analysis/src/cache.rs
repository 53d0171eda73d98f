use std::collections::HashMap;

use tokio::sync::RwLock;
use tracing::info;

use nl_core::{AnalysisEntry, AnalysisResult, Pov};

pub const MAX_CACHE_SIZE: usize = 50;

/// In-memory cache of computed analyses, keyed by article url-or-title.
///
/// Capacity policy is intentionally crude: when the map is full and another
/// insert arrives, the whole cache is cleared first. No LRU, no partial
/// eviction; swapping this for an LRU would change documented behavior.
pub struct AnalysisCache {
    entries: RwLock<HashMap<String, AnalysisEntry>>,
}

impl AnalysisCache {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub async fn get(&self, key: &str) -> Option<AnalysisEntry> {
        self.entries.read().await.get(key).cloned()
    }

    pub async fn put(&self, key: String, analysis: AnalysisResult, povs: Vec<Pov>) {
        let mut entries = self.entries.write().await;
        if entries.len() >= MAX_CACHE_SIZE {
            info!("analysis cache limit reached, clearing");
            entries.clear();
        }
        entries.insert(key, AnalysisEntry { analysis, povs });
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

impl Default for AnalysisCache {
    fn default() -> Self {
        Self::new()
    }
}
