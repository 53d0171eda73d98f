use std::sync::Arc;

use rand::Rng;
use tracing::{info, warn};

use nl_core::{Article, Error, NewsSearch, RawArticle, RetryPolicy, TimeWindow};

use crate::cache::SearchCache;
use crate::mock;

pub const DEFAULT_MAX_RESULTS: usize = 10;

const NO_CONTENT: &str = "No content available for this article.";

/// Recency constraint per attempt: freshest first, then widen.
const WIDENING: [Option<TimeWindow>; 3] = [Some(TimeWindow::Day), Some(TimeWindow::Week), None];

/// Sequences calls to the search collaborator: cache first, then up to
/// three attempts over widening time windows, then the mock fallback.
/// `search_news` always returns at least one article.
pub struct SearchOrchestrator {
    client: Arc<dyn NewsSearch>,
    cache: SearchCache,
    policy: RetryPolicy,
}

impl SearchOrchestrator {
    pub fn new(client: Arc<dyn NewsSearch>, cache: SearchCache) -> Self {
        Self {
            client,
            cache,
            policy: RetryPolicy::widening_search(),
        }
    }

    pub async fn search_news(&self, query: &str, max_results: usize) -> Vec<Article> {
        if let Some(cached) = self.cache.get(query, max_results).await {
            return cached;
        }

        info!("fetching fresh results for: {}", query);
        let fetched = self
            .policy
            .run(|attempt| {
                let client = Arc::clone(&self.client);
                let window = WIDENING[(attempt as usize).min(WIDENING.len() - 1)];
                async move {
                    let raw = client.search(query, max_results, window).await?;
                    if raw.is_empty() {
                        Err(Error::NoResults)
                    } else {
                        Ok(raw)
                    }
                }
            })
            .await;

        match fetched {
            Ok(raw) => {
                let articles: Vec<Article> = raw.into_iter().map(normalize).collect();
                self.cache.put(query, max_results, articles.clone()).await;
                articles
            }
            Err(e) => {
                warn!("search failed ({}), falling back to mock data", e);
                mock::fallback_news()
            }
        }
    }
}

/// Turn a provider result into an `Article` with every field populated.
pub fn normalize(raw: RawArticle) -> Article {
    let title = raw.title.unwrap_or_default();
    let image = match raw.image {
        Some(url) if url.starts_with("http") => url,
        _ => placeholder_image(),
    };
    let body = raw
        .body
        .filter(|b| !b.is_empty())
        .or_else(|| (!title.is_empty()).then(|| title.clone()))
        .unwrap_or_else(|| NO_CONTENT.to_string());
    let source = raw
        .source
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "Unknown Source".to_string());
    let date = raw
        .date
        .filter(|d| !d.is_empty())
        .unwrap_or_else(|| "Recently".to_string());

    Article { title, url: raw.url, source, body, image, date }
}

fn placeholder_image() -> String {
    let seed: u32 = rand::thread_rng().gen_range(0..=1000);
    format!("https://picsum.photos/seed/{}/800/600", seed)
}
