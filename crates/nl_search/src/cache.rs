use std::collections::HashMap;
use std::path::PathBuf;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, warn};

use nl_core::Article;

/// How long a cached result set stays fresh.
const FRESH_FOR_SECS: i64 = 900;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CacheEntry {
    timestamp: i64,
    results: Vec<Article>,
}

/// Time-boxed cache of search results keyed by `(query, max_results)`.
///
/// Stale entries behave as misses but are left in place until overwritten;
/// the key space is bounded by the distinct queries seen. The whole map is
/// written back to its backing file on every `put` so results survive a
/// restart. A corrupt or missing file loads as an empty cache.
pub struct SearchCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
    path: Option<PathBuf>,
}

impl SearchCache {
    pub fn in_memory() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            path: None,
        }
    }

    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match std::fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(entries) => entries,
                Err(e) => {
                    warn!("search cache at {} is corrupt ({}), starting empty", path.display(), e);
                    HashMap::new()
                }
            },
            Err(_) => HashMap::new(),
        };
        Self {
            entries: RwLock::new(entries),
            path: Some(path),
        }
    }

    fn cache_key(query: &str, max_results: usize) -> String {
        format!("{}_{}", query, max_results)
    }

    pub async fn get(&self, query: &str, max_results: usize) -> Option<Vec<Article>> {
        self.get_at(query, max_results, Utc::now().timestamp()).await
    }

    /// Freshness check against an explicit clock, for callers and tests
    /// that need deterministic time.
    pub async fn get_at(&self, query: &str, max_results: usize, now: i64) -> Option<Vec<Article>> {
        let entries = self.entries.read().await;
        let entry = entries.get(&Self::cache_key(query, max_results))?;
        if now - entry.timestamp < FRESH_FOR_SECS {
            debug!("returning cached results for: {}", query);
            Some(entry.results.clone())
        } else {
            None
        }
    }

    pub async fn put(&self, query: &str, max_results: usize, results: Vec<Article>) {
        self.put_at(query, max_results, results, Utc::now().timestamp()).await
    }

    pub async fn put_at(&self, query: &str, max_results: usize, results: Vec<Article>, now: i64) {
        let mut entries = self.entries.write().await;
        entries.insert(
            Self::cache_key(query, max_results),
            CacheEntry { timestamp: now, results },
        );
        self.persist(&entries);
    }

    fn persist(&self, entries: &HashMap<String, CacheEntry>) {
        let Some(path) = &self.path else { return };
        let serialized = match serde_json::to_string(entries) {
            Ok(s) => s,
            Err(e) => {
                warn!("failed to serialize search cache: {}", e);
                return;
            }
        };
        if let Err(e) = std::fs::write(path, serialized) {
            warn!("failed to persist search cache to {}: {}", path.display(), e);
        }
    }
}
