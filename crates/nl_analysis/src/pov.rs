use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, warn};

use nl_core::{Error, NewsSearch, Pov, RawArticle, Result, RetryPolicy, TextGenerator, TimeWindow};

use crate::output;

const POV_SEARCH_RESULTS: usize = 10;

/// Finds opposing viewpoints for a headline. Two strategies:
/// real distinct-domain articles first, otherwise generate viewpoints and
/// backfill real links for them. Returns 0-2 entries and never fails.
pub struct PovOrchestrator {
    search: Arc<dyn NewsSearch>,
    generator: Arc<dyn TextGenerator>,
    policy: RetryPolicy,
}

impl PovOrchestrator {
    pub fn new(search: Arc<dyn NewsSearch>, generator: Arc<dyn TextGenerator>) -> Self {
        Self {
            search,
            generator,
            policy: RetryPolicy::rate_limited(),
        }
    }

    pub async fn get_pov(&self, headline: &str, original_url: Option<&str>) -> Vec<Pov> {
        debug!("getting POVs for: {}", headline);

        let related = self.find_related(headline, original_url).await;
        if related.len() >= 2 {
            match self.povs_from_articles(headline, &related[0], &related[1]).await {
                Ok(povs) => return povs,
                Err(e) => warn!("POV generation from real articles failed: {}", e),
            }
        }

        debug!("falling back to generate-then-backfill for: {}", headline);
        let mut povs = match self.generated_povs(headline).await {
            Ok(povs) => povs,
            Err(e) => {
                warn!("POV generation failed: {}", e);
                return Vec::new();
            }
        };
        for pov in &mut povs {
            self.backfill_link(pov, headline).await;
        }
        povs
    }

    /// Strategy 1 search: first two results from domains not seen yet,
    /// skipping the original article. Relevance beyond "different domain"
    /// is deliberately not checked.
    async fn find_related(&self, headline: &str, original_url: Option<&str>) -> Vec<RawArticle> {
        let results = match self
            .search
            .search(headline, POV_SEARCH_RESULTS, Some(TimeWindow::Week))
            .await
        {
            Ok(results) => results,
            Err(e) => {
                warn!("POV search failed: {}", e);
                return Vec::new();
            }
        };

        let mut seen_domains = HashSet::new();
        if let Some(domain) = original_url.and_then(domain_of) {
            seen_domains.insert(domain);
        }

        let mut related = Vec::new();
        for result in results {
            let Some(url) = result.url.as_deref().filter(|u| !u.is_empty()) else {
                continue;
            };
            if Some(url) == original_url {
                continue;
            }
            let Some(domain) = domain_of(url) else { continue };
            if seen_domains.insert(domain) {
                related.push(result);
                if related.len() >= 2 {
                    break;
                }
            }
        }
        related
    }

    /// Strategy 1 generation: the model writes only the perspective
    /// bullets; source names and links come from the matched articles.
    async fn povs_from_articles(
        &self,
        headline: &str,
        article_a: &RawArticle,
        article_b: &RawArticle,
    ) -> Result<Vec<Pov>> {
        // Trust boundary: third-party snippets go into the prompt verbatim.
        let prompt = format!(
            r#"Analyze these two news articles covering the headline: "{headline}"

Article A:
Source: {a_source}
Title: {a_title}
Snippet: {a_body}

Article B:
Source: {b_source}
Title: {b_title}
Snippet: {b_body}

Generate 2 distinct Points of View (POV) based on these specific articles.
Return a JSON array of 2 objects, each with:
- "source_type": the article's source name
- "perspective": a list of bullet points from that article
Keep bullet points to ONE sentence maximum."#,
            a_source = article_a.source.as_deref().unwrap_or(""),
            a_title = article_a.title.as_deref().unwrap_or(""),
            a_body = article_a.body.as_deref().unwrap_or(""),
            b_source = article_b.source.as_deref().unwrap_or(""),
            b_title = article_b.title.as_deref().unwrap_or(""),
            b_body = article_b.body.as_deref().unwrap_or(""),
        );

        let text = self.generate(&prompt).await?;
        let mut povs: Vec<Pov> = output::parse_json(&text)?;
        if povs.len() < 2 {
            return Err(Error::Generation(format!(
                "expected 2 POVs, model returned {}",
                povs.len()
            )));
        }
        povs.truncate(2);

        for (pov, article) in povs.iter_mut().zip([article_a, article_b]) {
            pov.source_type = article.source.clone().unwrap_or_default();
            pov.source_link = article.url.clone();
        }
        Ok(povs)
    }

    /// Strategy 2 generation: viewpoints without links.
    async fn generated_povs(&self, headline: &str) -> Result<Vec<Pov>> {
        let prompt = format!(
            r#"For the news headline: "{headline}"
Generate 2 distinct Points of View (POV) that might exist on this topic.
Return a JSON array of objects:
- "source_type": e.g., "Conservative Outlet", "Progressive Blog", "Mainstream Media"
- "perspective": 2-4 short bullet points

Do NOT include "source_link"."#
        );

        let text = self.generate(&prompt).await?;
        output::parse_json(&text)
    }

    /// Strategy 2 backfill: try to attach a real link to a generated POV.
    /// Search failures are swallowed; the POV simply keeps no link.
    async fn backfill_link(&self, pov: &mut Pov, headline: &str) {
        let query = format!("{} {}", pov.source_type, headline);
        debug!("searching for link for POV: {}", query);

        match self.search.search(&query, 1, None).await {
            Ok(results) if !results.is_empty() => {
                let hit = &results[0];
                pov.source_link = hit.url.clone();
                if let Some(source) = hit.source.as_deref().filter(|s| !s.is_empty()) {
                    pov.source_type = format!("{} ({})", pov.source_type, source);
                }
            }
            Ok(_) => {
                // Last resort: any link for the bare headline.
                match self.search.search(headline, 1, None).await {
                    Ok(results) => {
                        if let Some(url) = results.first().and_then(|r| r.url.clone()) {
                            pov.source_link = Some(url);
                        }
                    }
                    Err(e) => warn!("link search failed: {}", e),
                }
            }
            Err(e) => warn!("link search failed: {}", e),
        }
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        self.policy
            .run(|_| {
                let generator = Arc::clone(&self.generator);
                let prompt = prompt.to_string();
                async move { generator.generate(&prompt).await }
            })
            .await
    }
}

fn domain_of(url: &str) -> Option<String> {
    url::Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
}
