use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use nl_core::{Error, NewsSearch, RawArticle, Result, TimeWindow};

const USER_AGENT: &str = "Mozilla/5.0 (compatible; NewsLens/0.1)";

#[derive(Deserialize)]
struct NewsResponse {
    #[serde(default)]
    results: Vec<NewsResult>,
}

#[derive(Deserialize)]
struct NewsResult {
    title: Option<String>,
    url: Option<String>,
    source: Option<String>,
    excerpt: Option<String>,
    image: Option<String>,
    date: Option<i64>,
}

impl From<NewsResult> for RawArticle {
    fn from(r: NewsResult) -> Self {
        RawArticle {
            title: r.title,
            url: r.url,
            source: r.source,
            body: r.excerpt,
            image: r.image,
            date: r
                .date
                .and_then(|secs| chrono::DateTime::from_timestamp(secs, 0))
                .map(|dt| dt.to_rfc3339()),
        }
    }
}

/// DuckDuckGo news client. Each search first fetches the site's `vqd`
/// request token for the query, then queries the `news.js` JSON endpoint.
pub struct DdgNewsClient {
    client: Client,
    base_url: String,
}

impl DdgNewsClient {
    pub fn new() -> Self {
        Self::with_base_url("https://duckduckgo.com".to_string())
    }

    pub fn with_base_url(base_url: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .user_agent(USER_AGENT)
            .build()
            .unwrap_or_else(|_| Client::new());
        Self { client, base_url }
    }

    async fn fetch_vqd(&self, query: &str) -> Result<String> {
        let url = format!(
            "{}/?q={}&iar=news&ia=news",
            self.base_url,
            urlencoding::encode(query)
        );
        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(Error::Search(format!(
                "token request returned status {}",
                response.status()
            )));
        }
        let html = response.text().await?;
        extract_vqd(&html)
            .ok_or_else(|| Error::Search("no vqd token in search page".to_string()))
    }
}

impl Default for DdgNewsClient {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for DdgNewsClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DdgNewsClient")
            .field("base_url", &self.base_url)
            .finish()
    }
}

#[async_trait]
impl NewsSearch for DdgNewsClient {
    async fn search(
        &self,
        query: &str,
        max_results: usize,
        window: Option<TimeWindow>,
    ) -> Result<Vec<RawArticle>> {
        let vqd = self.fetch_vqd(query).await?;

        let mut url = format!(
            "{}/news.js?l=us-en&o=json&noamp=1&q={}&vqd={}",
            self.base_url,
            urlencoding::encode(query),
            vqd
        );
        if let Some(window) = window {
            let df = match window {
                TimeWindow::Day => "d",
                TimeWindow::Week => "w",
            };
            url.push_str("&df=");
            url.push_str(df);
        }
        debug!("fetching news: {}", url);

        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(Error::Search(format!(
                "news request returned status {}",
                response.status()
            )));
        }
        let parsed: NewsResponse = response.json().await?;

        Ok(parsed
            .results
            .into_iter()
            .take(max_results)
            .map(RawArticle::from)
            .collect())
    }
}

/// The token is embedded in the results page as `vqd="..."`, `vqd='...'`
/// or `vqd=...&` depending on the variant served.
fn extract_vqd(html: &str) -> Option<String> {
    let start = html.find("vqd=")? + "vqd=".len();
    let rest = &html[start..];
    let (rest, terminator) = match rest.as_bytes().first()? {
        b'"' => (&rest[1..], Some('"')),
        b'\'' => (&rest[1..], Some('\'')),
        _ => (rest, None),
    };
    let end = match terminator {
        Some(t) => rest.find(t)?,
        None => rest
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '-' || c == '_'))
            .unwrap_or(rest.len()),
    };
    let token = &rest[..end];
    (!token.is_empty()).then(|| token.to_string())
}
