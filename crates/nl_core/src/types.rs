use serde::{Deserialize, Serialize};

/// A normalized news article. Immutable once produced by the search
/// orchestrator; `image` is always a usable URL and `date` always has a
/// value, so rendering never branches on missing fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub date: String,
}

impl Article {
    /// Cache identity: prefer the URL, fall back to the title.
    pub fn key(&self) -> String {
        match &self.url {
            Some(url) if !url.is_empty() => url.clone(),
            _ => self.title.clone(),
        }
    }
}

/// An article as received from the search provider, before normalization.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawArticle {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
}

/// Recency constraint passed through to the search provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeWindow {
    Day,
    Week,
}

/// The six-field analysis the generator is asked to produce. Degraded
/// (simulated) instances use the same shape, so consumers never care
/// where one came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub summary: String,
    pub key_points: Vec<String>,
    pub bias_score: u8,
    pub bias_label: String,
    pub tone: String,
    pub trust_score: u8,
}

/// One point of view on a headline, either matched to a real article or
/// generated and then backfilled with a link.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pov {
    pub source_type: String,
    pub perspective: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_link: Option<String>,
}

/// What the analysis cache stores per article key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisEntry {
    pub analysis: AnalysisResult,
    pub povs: Vec<Pov>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved,
    AlreadySaved,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveOutcome {
    Removed,
    NotFound,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn article_key_prefers_url() {
        let article = Article {
            title: "Test Article".to_string(),
            url: Some("http://test.com/a".to_string()),
            source: "test".to_string(),
            body: "body".to_string(),
            image: "http://img".to_string(),
            date: "Recently".to_string(),
        };
        assert_eq!(article.key(), "http://test.com/a");
    }

    #[test]
    fn article_key_falls_back_to_title() {
        let article = Article {
            title: "Test Article".to_string(),
            url: None,
            source: "test".to_string(),
            body: "body".to_string(),
            image: "http://img".to_string(),
            date: "Recently".to_string(),
        };
        assert_eq!(article.key(), "Test Article");

        let empty_url = Article {
            url: Some(String::new()),
            ..article
        };
        assert_eq!(empty_url.key(), "Test Article");
    }

    #[test]
    fn pov_omits_missing_link() {
        let pov = Pov {
            source_type: "Mainstream Media".to_string(),
            perspective: vec!["One sentence.".to_string()],
            source_link: None,
        };
        let json = serde_json::to_string(&pov).unwrap();
        assert!(!json.contains("source_link"));
    }

    #[test]
    fn article_deserializes_from_partial_body() {
        let article: Article =
            serde_json::from_str(r#"{"title": "Just a title"}"#).unwrap();
        assert_eq!(article.title, "Just a title");
        assert!(article.url.is_none());
        assert!(article.source.is_empty());
    }
}
