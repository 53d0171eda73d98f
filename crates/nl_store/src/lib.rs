use std::path::PathBuf;

use tokio::sync::RwLock;
use tracing::warn;

use nl_core::{Article, RemoveOutcome, SaveOutcome};

/// The user's saved articles, kept in memory and written back to a JSON
/// file after every successful mutation.
///
/// Dedup on save checks both `url` and `title`: either match means the
/// article is already saved. A failed write is logged and the in-memory
/// mutation stands; durability is best effort, not atomic.
pub struct SavedArticlesStore {
    articles: RwLock<Vec<Article>>,
    path: Option<PathBuf>,
}

impl SavedArticlesStore {
    pub fn in_memory() -> Self {
        Self {
            articles: RwLock::new(Vec::new()),
            path: None,
        }
    }

    /// A corrupt or missing backing file is an empty store, never an error.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let articles = match std::fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(articles) => articles,
                Err(e) => {
                    warn!("saved articles at {} are corrupt ({}), starting empty", path.display(), e);
                    Vec::new()
                }
            },
            Err(_) => Vec::new(),
        };
        Self {
            articles: RwLock::new(articles),
            path: Some(path),
        }
    }

    pub async fn list(&self) -> Vec<Article> {
        self.articles.read().await.clone()
    }

    pub async fn get(&self, index: usize) -> Option<Article> {
        self.articles.read().await.get(index).cloned()
    }

    pub async fn save(&self, article: Article) -> SaveOutcome {
        let mut articles = self.articles.write().await;
        let duplicate = articles
            .iter()
            .any(|saved| saved.url == article.url || saved.title == article.title);
        if duplicate {
            return SaveOutcome::AlreadySaved;
        }
        articles.push(article);
        self.persist(&articles);
        SaveOutcome::Saved
    }

    pub async fn remove(&self, url: &str) -> RemoveOutcome {
        let mut articles = self.articles.write().await;
        let before = articles.len();
        articles.retain(|a| a.url.as_deref() != Some(url));
        if articles.len() < before {
            self.persist(&articles);
            RemoveOutcome::Removed
        } else {
            RemoveOutcome::NotFound
        }
    }

    /// Whether an article with this `url` is saved. Two missing urls
    /// compare equal, matching the save-side dedup.
    pub async fn contains_url(&self, url: Option<&str>) -> bool {
        self.articles
            .read()
            .await
            .iter()
            .any(|a| a.url.as_deref() == url)
    }

    fn persist(&self, articles: &[Article]) {
        let Some(path) = &self.path else { return };
        let serialized = match serde_json::to_string_pretty(articles) {
            Ok(s) => s,
            Err(e) => {
                warn!("failed to serialize saved articles: {}", e);
                return;
            }
        };
        if let Err(e) = std::fs::write(path, serialized) {
            warn!("failed to persist saved articles to {}: {}", path.display(), e);
        }
    }
}
