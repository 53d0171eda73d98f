use async_trait::async_trait;

use crate::types::{RawArticle, TimeWindow};
use crate::Result;

/// The external news-search collaborator. `window` narrows results by
/// recency; `None` means unrestricted.
#[async_trait]
pub trait NewsSearch: Send + Sync {
    async fn search(
        &self,
        query: &str,
        max_results: usize,
        window: Option<TimeWindow>,
    ) -> Result<Vec<RawArticle>>;
}

/// The external text-generation collaborator. Rate limiting surfaces as
/// `Error::RateLimited` so retry policies can key on it.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Available model identifiers, for the diagnostic endpoint.
    async fn list_models(&self) -> Result<Vec<String>>;
}
