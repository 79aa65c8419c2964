//! HTTP request handler.
//!
//! This module defines the router and the single extraction endpoint that
//! ties normalization, caching, fetching, and extraction together.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::{
    Router,
    body::Bytes,
    extract::{ConnectInfo, RawQuery, State},
    http::{HeaderMap, StatusCode, Uri, header},
    response::{IntoResponse, Response},
    routing::any,
};
use serde::{Deserialize, Serialize};
use sieve_client::{PageFetcher, extract, normalize};
use sieve_core::{CacheEntry, CacheKey, Error, ResponseCache};
use tower_http::trace::{DefaultMakeSpan, TraceLayer};
use tracing::Level;

use crate::error::ServerError;
use crate::params::FormParams;

/// Shared state injected into every request.
#[derive(Clone)]
pub struct AppState {
    cache: ResponseCache,
    fetcher: Arc<dyn PageFetcher>,
}

impl AppState {
    pub fn new(cache: ResponseCache, fetcher: Arc<dyn PageFetcher>) -> Self {
        Self { cache, fetcher }
    }
}

/// Body of a successful extraction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionResult {
    /// The selector as requested.
    pub selector: String,
    /// The normalized URL that was fetched.
    pub url: String,
    /// One entry per matched node, in document order.
    pub elements: Vec<String>,
}

/// Build the application router. Only `/` is served.
///
/// Handlers read the peer address, so serve it with
/// `into_make_service_with_connect_info::<SocketAddr>()`.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", any(extract_elements))
        .fallback(not_found)
        .layer(TraceLayer::new_for_http().make_span_with(DefaultMakeSpan::new().level(Level::INFO)))
        .with_state(state)
}

async fn not_found(ConnectInfo(remote): ConnectInfo<SocketAddr>, uri: Uri) -> StatusCode {
    tracing::info!(path = uri.path(), remote = %remote, "request received");
    StatusCode::NOT_FOUND
}

/// Serve the elements matching `selector` on the page at `url`.
async fn extract_elements(
    State(state): State<AppState>, ConnectInfo(remote): ConnectInfo<SocketAddr>, uri: Uri, RawQuery(query): RawQuery,
    headers: HeaderMap, body: Bytes,
) -> Result<Response, ServerError> {
    tracing::info!(path = uri.path(), remote = %remote, "request received");

    let params = FormParams::parse(query.as_deref(), &headers, &body);
    let url = normalize(&params.url);
    let key = CacheKey::new(url.clone(), params.selector.clone(), params.raw);

    if let Some(entry) = state.cache.get(&key).await {
        tracing::info!(url = %url, selector = %params.selector, key = %key.digest(), "cache hit");
        let max_age = entry.max_age(state.cache.ttl(), Instant::now());
        return Ok(json_response(entry.payload, max_age));
    }

    let html = state.fetcher.fetch(&url).await.inspect_err(|e| {
        tracing::warn!(url = %url, error = %e, "fetch failed");
    })?;

    let elements = extract(&html, &params.selector, params.raw)?;
    let result = ExtractionResult { selector: params.selector, url, elements };
    let payload = Bytes::from(serde_json::to_vec_pretty(&result).map_err(Error::from)?);

    state.cache.put(key, CacheEntry::new(payload.clone())).await;

    Ok(json_response(payload, state.cache.ttl().as_secs()))
}

fn json_response(payload: Bytes, max_age: u64) -> Response {
    (
        [
            (header::CONTENT_TYPE, "application/json".to_string()),
            (header::CACHE_CONTROL, format!("public, max-age={max_age}, immutable")),
        ],
        payload,
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::{Body, to_bytes};
    use axum::extract::connect_info::MockConnectInfo;
    use axum::http::{Method, Request};
    use std::num::NonZeroUsize;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tower::ServiceExt;

    const PAGE: &str = r#"
        <html>
        <body>
            <div>  Hello <b>World</b>  </div>
            <p class="item">one</p>
            <p class="item">two</p>
        </body>
        </html>
    "#;

    /// Serves a fixed page (or a 404) and counts calls.
    struct StubFetcher {
        page: Option<&'static str>,
        calls: AtomicUsize,
    }

    impl StubFetcher {
        fn serving(page: &'static str) -> Arc<Self> {
            Arc::new(Self { page: Some(page), calls: AtomicUsize::new(0) })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self { page: None, calls: AtomicUsize::new(0) })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl PageFetcher for StubFetcher {
        async fn fetch(&self, _url: &str) -> Result<String, Error> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.page {
                Some(page) => Ok(page.to_string()),
                None => Err(Error::HttpStatus { code: 404, reason: "Not Found".into() }),
            }
        }
    }

    fn test_cache() -> ResponseCache {
        ResponseCache::new(NonZeroUsize::new(10).unwrap(), Duration::from_secs(3600))
    }

    fn peer() -> SocketAddr {
        SocketAddr::from(([127, 0, 0, 1], 40_000))
    }

    fn app(cache: ResponseCache, fetcher: Arc<StubFetcher>) -> Router {
        router(AppState::new(cache, fetcher)).layer(MockConnectInfo(peer()))
    }

    async fn get(app: &Router, uri: &str) -> Response {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        app.clone().oneshot(request).await.unwrap()
    }

    async fn body_of(response: Response) -> Bytes {
        to_bytes(response.into_body(), usize::MAX).await.unwrap()
    }

    fn cache_control(response: &Response) -> String {
        response.headers().get(header::CACHE_CONTROL).unwrap().to_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_text_mode_response() {
        let fetcher = StubFetcher::serving(PAGE);
        let app = app(test_cache(), fetcher.clone());

        let response = get(&app, "/?url=example.com&selector=div").await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers().get(header::CONTENT_TYPE).unwrap(), "application/json");
        assert_eq!(cache_control(&response), "public, max-age=3600, immutable");

        let result: ExtractionResult = serde_json::from_slice(&body_of(response).await).unwrap();
        assert_eq!(result.url, "https://example.com");
        assert_eq!(result.selector, "div");
        assert_eq!(result.elements, vec!["Hello World"]);
        assert_eq!(fetcher.calls(), 1);
    }

    #[tokio::test]
    async fn test_raw_mode_response() {
        let app = app(test_cache(), StubFetcher::serving(PAGE));

        let response = get(&app, "/?url=example.com&selector=div&raw").await;
        let result: ExtractionResult = serde_json::from_slice(&body_of(response).await).unwrap();

        assert_eq!(result.elements, vec!["  Hello <b>World</b>  "]);
    }

    #[tokio::test]
    async fn test_body_is_pretty_printed() {
        let app = app(test_cache(), StubFetcher::serving(PAGE));

        let response = get(&app, "/?url=http:////example.com&selector=p.item").await;
        let body = body_of(response).await;

        let expected = "{\n  \"selector\": \"p.item\",\n  \"url\": \"http://example.com\",\n  \"elements\": [\n    \"one\",\n    \"two\"\n  ]\n}";
        assert_eq!(body, Bytes::from(expected));
    }

    #[tokio::test]
    async fn test_repeat_request_served_from_cache() {
        let fetcher = StubFetcher::serving(PAGE);
        let app = app(test_cache(), fetcher.clone());

        let first = body_of(get(&app, "/?url=example.com&selector=p").await).await;
        let response = get(&app, "/?url=example.com&selector=p").await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers().get(header::CONTENT_TYPE).unwrap(), "application/json");
        let control = cache_control(&response);
        assert!(
            control == "public, max-age=3600, immutable" || control == "public, max-age=3599, immutable",
            "{control}"
        );
        assert_eq!(body_of(response).await, first);
        assert_eq!(fetcher.calls(), 1);
    }

    #[tokio::test]
    async fn test_mode_is_part_of_the_key() {
        let fetcher = StubFetcher::serving(PAGE);
        let app = app(test_cache(), fetcher.clone());

        get(&app, "/?url=example.com&selector=div").await;
        get(&app, "/?url=example.com&selector=div&raw=1").await;

        assert_eq!(fetcher.calls(), 2);
    }

    #[tokio::test]
    async fn test_cache_hit_reports_remaining_lifetime() {
        let cache = test_cache();
        let fetcher = StubFetcher::serving(PAGE);
        let app = app(cache.clone(), fetcher.clone());

        let key = CacheKey::new("https://example.com", "div", false);
        let created_at = Instant::now().checked_sub(Duration::from_secs(600)).unwrap();
        cache.put(key, CacheEntry::with_created_at("{\"cached\":true}", created_at)).await;

        let response = get(&app, "/?url=example.com&selector=div").await;

        assert_eq!(cache_control(&response), "public, max-age=3000, immutable");
        assert_eq!(body_of(response).await, Bytes::from_static(b"{\"cached\":true}"));
        assert_eq!(fetcher.calls(), 0);
    }

    #[tokio::test]
    async fn test_expired_entry_is_refetched() {
        let cache = ResponseCache::new(NonZeroUsize::new(10).unwrap(), Duration::from_secs(10));
        let fetcher = StubFetcher::serving(PAGE);
        let app = app(cache.clone(), fetcher.clone());

        let key = CacheKey::new("https://example.com", "div", false);
        let created_at = Instant::now().checked_sub(Duration::from_secs(11)).unwrap();
        cache.put(key, CacheEntry::with_created_at("stale", created_at)).await;

        let response = get(&app, "/?url=example.com&selector=div").await;

        assert_eq!(cache_control(&response), "public, max-age=10, immutable");
        assert_ne!(body_of(response).await, Bytes::from_static(b"stale"));
        assert_eq!(fetcher.calls(), 1);
    }

    #[tokio::test]
    async fn test_empty_selector_still_fetches() {
        let fetcher = StubFetcher::serving(PAGE);
        let app = app(test_cache(), fetcher.clone());

        let response = get(&app, "/?url=example.com&selector=").await;
        assert_eq!(response.status(), StatusCode::OK);

        let result: ExtractionResult = serde_json::from_slice(&body_of(response).await).unwrap();
        assert!(result.elements.is_empty());
        assert_eq!(fetcher.calls(), 1);
    }

    #[tokio::test]
    async fn test_fetch_failure_is_500_and_not_cached() {
        let cache = test_cache();
        let fetcher = StubFetcher::failing();
        let app = app(cache.clone(), fetcher.clone());

        let response = get(&app, "/?url=example.com&selector=div").await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_of(response).await, Bytes::from_static(b"status code error: 404 Not Found"));

        get(&app, "/?url=example.com&selector=div").await;
        assert_eq!(fetcher.calls(), 2);
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_invalid_selector_is_500_and_not_cached() {
        let cache = test_cache();
        let app = app(cache.clone(), StubFetcher::serving(PAGE));

        let response = get(&app, "/?url=example.com&selector=div%5B").await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_of(response).await;
        assert!(String::from_utf8_lossy(&body).starts_with("invalid selector"));
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_other_paths_are_404_without_fetch() {
        let fetcher = StubFetcher::serving(PAGE);
        let app = app(test_cache(), fetcher.clone());

        for uri in ["/favicon.ico", "/api?url=example.com&selector=div", "/index.html"] {
            let response = get(&app, uri).await;
            assert_eq!(response.status(), StatusCode::NOT_FOUND, "{uri}");
            assert!(body_of(response).await.is_empty());
        }
        assert_eq!(fetcher.calls(), 0);
    }

    #[tokio::test]
    async fn test_peer_address_is_available_to_handlers() {
        let fetcher = StubFetcher::serving(PAGE);
        let app = router(AppState::new(test_cache(), fetcher.clone()))
            .layer(MockConnectInfo(SocketAddr::from(([10, 0, 0, 7], 51_234))));

        let response = get(&app, "/?url=example.com&selector=div").await;
        assert_eq!(response.status(), StatusCode::OK);

        let response = get(&app, "/elsewhere").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(fetcher.calls(), 1);
    }

    #[tokio::test]
    async fn test_post_form_body() {
        let fetcher = StubFetcher::serving(PAGE);
        let app = app(test_cache(), fetcher.clone());

        let request = Request::builder()
            .method(Method::POST)
            .uri("/")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from("url=example.com&selector=p.item&raw"))
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();

        let result: ExtractionResult = serde_json::from_slice(&body_of(response).await).unwrap();
        assert_eq!(result.elements, vec!["one", "two"]);
        assert_eq!(fetcher.calls(), 1);

        get(&app, "/?url=example.com&selector=p.item&raw").await;
        assert_eq!(fetcher.calls(), 1);
    }
}
