use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{error, info};

use nl_core::{AnalysisResult, Article, Pov, RemoveOutcome, SaveOutcome};
use nl_search::DEFAULT_MAX_RESULTS;

use crate::AppState;

const DEFAULT_QUERY: &str = "breaking news latest headlines";
const MAX_QUERY_LEN: usize = 100;

#[derive(Deserialize)]
pub struct NewsQuery {
    q: Option<String>,
}

/// What the detail routes serve: everything the article page needs.
/// Templating happens client-side, so this is the whole view model.
#[derive(Serialize)]
pub struct ArticleDetail {
    pub article: Article,
    pub analysis: AnalysisResult,
    pub povs: Vec<Pov>,
    pub is_saved: bool,
}

fn sanitized_query(q: Option<String>) -> String {
    let query = q.unwrap_or_else(|| DEFAULT_QUERY.to_string());
    query.chars().take(MAX_QUERY_LEN).collect()
}

pub async fn get_news(
    State(state): State<Arc<AppState>>,
    Query(params): Query<NewsQuery>,
) -> impl IntoResponse {
    let query = sanitized_query(params.q);
    Json(state.search.search_news(&query, DEFAULT_MAX_RESULTS).await)
}

pub async fn list_models(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.generator.list_models().await {
        Ok(models) => Json(models),
        Err(e) => Json(vec![e.to_string()]),
    }
}

pub async fn list_saved(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.saved.list().await)
}

pub async fn save_news(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Response {
    let Ok(Json(payload)) = payload else {
        return error_status(StatusCode::BAD_REQUEST, "Invalid data");
    };
    if !payload.is_object() {
        return error_status(StatusCode::BAD_REQUEST, "Invalid data");
    }
    let article: Article = match serde_json::from_value(payload) {
        Ok(article) => article,
        Err(e) => {
            error!("error saving news: {}", e);
            return error_status(StatusCode::BAD_REQUEST, "Invalid data");
        }
    };

    match state.saved.save(article).await {
        SaveOutcome::Saved => Json(json!({"status": "success"})).into_response(),
        SaveOutcome::AlreadySaved => Json(json!({"status": "already_saved"})).into_response(),
    }
}

pub async fn remove_news(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Response {
    let url = match &payload {
        Ok(Json(p)) => p.get("url").and_then(Value::as_str),
        Err(_) => None,
    };
    let Some(url) = url else {
        return error_status(StatusCode::BAD_REQUEST, "Missing URL");
    };

    match state.saved.remove(url).await {
        RemoveOutcome::Removed => Json(json!({"status": "success"})).into_response(),
        RemoveOutcome::NotFound => Json(json!({"status": "not_found"})).into_response(),
    }
}

pub async fn news_detail(
    State(state): State<Arc<AppState>>,
    Path(index): Path<usize>,
    Query(params): Query<NewsQuery>,
) -> Response {
    let query = sanitized_query(params.q);
    let news = state.search.search_news(&query, DEFAULT_MAX_RESULTS).await;

    let Some(article) = news.get(index).cloned() else {
        return (StatusCode::NOT_FOUND, "Article not found").into_response();
    };

    let is_saved = state.saved.contains_url(article.url.as_deref()).await;
    Json(build_detail(&state, article, is_saved).await).into_response()
}

pub async fn saved_news_detail(
    State(state): State<Arc<AppState>>,
    Path(index): Path<usize>,
) -> Response {
    let Some(article) = state.saved.get(index).await else {
        return (StatusCode::NOT_FOUND, "Saved article not found").into_response();
    };
    Json(build_detail(&state, article, true).await).into_response()
}

/// Analysis and POVs are computed at most once per article key; a full
/// cache is cleared wholesale before the next insert.
async fn build_detail(state: &AppState, article: Article, is_saved: bool) -> ArticleDetail {
    let key = article.key();

    let entry = match state.analysis_cache.get(&key).await {
        Some(entry) => {
            info!("returning cached analysis for: {}", article.title);
            entry
        }
        None => {
            let analysis = state.analyzer.analyze_article(&article.body, &article.title).await;
            let povs = state.pov.get_pov(&article.title, article.url.as_deref()).await;
            state
                .analysis_cache
                .put(key, analysis.clone(), povs.clone())
                .await;
            nl_core::AnalysisEntry { analysis, povs }
        }
    };

    ArticleDetail {
        article,
        analysis: entry.analysis,
        povs: entry.povs,
        is_saved,
    }
}

fn error_status(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({"status": "error", "message": message}))).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::header::CONTENT_TYPE;
    use axum::http::Request;
    use nl_analysis::{AnalysisCache, AnalysisOrchestrator, PovOrchestrator};
    use nl_core::{Error, NewsSearch, RawArticle, Result, TextGenerator, TimeWindow};
    use nl_search::{SearchCache, SearchOrchestrator};
    use nl_store::SavedArticlesStore;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tower::ServiceExt;

    struct FixedSearch;

    #[async_trait]
    impl NewsSearch for FixedSearch {
        async fn search(
            &self,
            _query: &str,
            _max_results: usize,
            _window: Option<TimeWindow>,
        ) -> Result<Vec<RawArticle>> {
            Ok(vec![
                RawArticle {
                    title: Some("First story".to_string()),
                    url: Some("http://alpha.com/first".to_string()),
                    source: Some("Alpha".to_string()),
                    body: Some("Something happened.".to_string()),
                    image: Some("http://alpha.com/img.jpg".to_string()),
                    date: Some("2026-08-26".to_string()),
                },
                RawArticle {
                    title: Some("Second story".to_string()),
                    url: Some("http://beta.com/second".to_string()),
                    source: Some("Beta".to_string()),
                    body: Some("Something else happened.".to_string()),
                    image: Some("http://beta.com/img.jpg".to_string()),
                    date: Some("2026-08-26".to_string()),
                },
            ])
        }
    }

    struct CountingGenerator {
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl TextGenerator for CountingGenerator {
        async fn generate(&self, _prompt: &str) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(Error::Generation("offline".to_string()))
        }

        async fn list_models(&self) -> Result<Vec<String>> {
            Ok(vec!["models/test-1".to_string()])
        }
    }

    fn make_state(generator_calls: Arc<AtomicUsize>) -> AppState {
        let search_client = Arc::new(FixedSearch);
        let generator: Arc<dyn TextGenerator> =
            Arc::new(CountingGenerator { calls: generator_calls });
        AppState {
            search: SearchOrchestrator::new(search_client.clone(), SearchCache::in_memory()),
            analyzer: AnalysisOrchestrator::new(generator.clone()),
            pov: PovOrchestrator::new(search_client, generator.clone()),
            analysis_cache: AnalysisCache::new(),
            saved: SavedArticlesStore::in_memory(),
            generator,
        }
    }

    async fn make_app() -> axum::Router {
        crate::create_app(make_state(Arc::new(AtomicUsize::new(0)))).await
    }

    async fn body_json(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn post_json(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn news_listing_serves_json_with_security_headers() {
        let app = make_app().await;
        let response = app
            .oneshot(Request::builder().uri("/api/news?q=mars").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["x-content-type-options"], "nosniff");
        assert_eq!(response.headers()["x-frame-options"], "SAMEORIGIN");
        assert_eq!(response.headers()["x-xss-protection"], "1; mode=block");

        let body = body_json(response).await;
        assert_eq!(body.as_array().unwrap().len(), 2);
        assert_eq!(body[0]["title"], "First story");
    }

    #[tokio::test]
    async fn detail_view_degrades_but_always_renders() {
        let app = make_app().await;
        let response = app
            .oneshot(Request::builder().uri("/news/0?q=mars").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["article"]["title"], "First story");
        assert_eq!(body["is_saved"], false);
        // Generator is offline: simulated analysis, same shape.
        assert!(body["analysis"]["summary"].as_str().unwrap().contains("simulated"));
        let bias = body["analysis"]["bias_score"].as_u64().unwrap();
        assert!((1..=10).contains(&bias));
    }

    #[tokio::test]
    async fn second_detail_hit_comes_from_the_analysis_cache() {
        let calls = Arc::new(AtomicUsize::new(0));
        let app = crate::create_app(make_state(calls.clone())).await;

        for _ in 0..2 {
            let response = app
                .clone()
                .oneshot(Request::builder().uri("/news/0?q=mars").body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }

        // First request: one analysis call, one strategy-1 POV call and
        // one strategy-2 POV call. The second request is served from the
        // cache without generating again.
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn out_of_range_detail_is_a_plain_404() {
        let app = make_app().await;
        let response = app
            .oneshot(Request::builder().uri("/news/99?q=mars").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn save_then_duplicate_then_remove_roundtrip() {
        let app = make_app().await;
        let article = r#"{"title": "First story", "url": "http://alpha.com/first"}"#;

        let response = app.clone().oneshot(post_json("/api/save_news", article)).await.unwrap();
        assert_eq!(body_json(response).await["status"], "success");

        let response = app.clone().oneshot(post_json("/api/save_news", article)).await.unwrap();
        assert_eq!(body_json(response).await["status"], "already_saved");

        let response = app
            .clone()
            .oneshot(post_json("/api/remove_news", r#"{"url": "http://nope.com"}"#))
            .await
            .unwrap();
        assert_eq!(body_json(response).await["status"], "not_found");

        let response = app
            .oneshot(post_json("/api/remove_news", r#"{"url": "http://alpha.com/first"}"#))
            .await
            .unwrap();
        assert_eq!(body_json(response).await["status"], "success");
    }

    #[tokio::test]
    async fn malformed_save_body_is_a_400_error_status() {
        let app = make_app().await;

        let response = app
            .clone()
            .oneshot(post_json("/api/save_news", "not json at all"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["status"], "error");

        let response = app
            .oneshot(post_json("/api/remove_news", r#"{"no_url": true}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn models_endpoint_lists_generator_models() {
        let app = make_app().await;
        let response = app
            .oneshot(Request::builder().uri("/api/models").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let body = body_json(response).await;
        assert_eq!(body[0], "models/test-1");
    }

    #[tokio::test]
    async fn saved_detail_always_reports_saved() {
        let app = make_app().await;
        let article = r#"{"title": "Kept", "url": "http://alpha.com/kept", "body": "text"}"#;
        app.clone().oneshot(post_json("/api/save_news", article)).await.unwrap();

        let response = app
            .oneshot(Request::builder().uri("/saved_news/0").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["is_saved"], true);
        assert_eq!(body["article"]["title"], "Kept");
    }

    #[test]
    fn query_is_truncated_to_the_documented_limit() {
        let long = "x".repeat(500);
        assert_eq!(sanitized_query(Some(long)).len(), MAX_QUERY_LEN);
        assert_eq!(sanitized_query(None), DEFAULT_QUERY);
    }
}
