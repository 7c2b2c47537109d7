//! Axum-based HTTP server exposing the crawl API.
//!
//! | Method | Path | Purpose |
//! |--------|------|---------|
//! | `GET` | `/` | API name, version and endpoint list |
//! | `GET` | `/api/health` | Liveness check |
//! | `POST` | `/api/crawl` | Crawl a thread's comments |
//! | `POST` | `/api/draw` | Draw winners from a crawled thread |

mod error;
mod handlers;
mod types;

use axum::Router;
use axum::extract::Request;
use axum::http::{Method, StatusCode};
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::{get, post};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::config::Config;
use crate::sessions::SessionStore;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub sessions: Arc<SessionStore>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let sessions = SessionStore::new(config.sessions.ttl());
        Self {
            config: Arc::new(config),
            sessions: Arc::new(sessions),
        }
    }
}

/// Answer every successful `OPTIONS` with 204, including preflights that
/// `CorsLayer` short-circuits with its own 200.
async fn options_no_content(request: Request, next: Next) -> Response {
    let is_options = request.method() == Method::OPTIONS;
    let mut response = next.run(request).await;
    if is_options && response.status().is_success() {
        *response.status_mut() = StatusCode::NO_CONTENT;
    }
    response
}

/// Create the API router with all routes
pub fn create_router(state: AppState) -> Router {
    let cors_enabled = state.config.server.cors_enabled;

    let mut app = Router::new()
        .route("/", get(handlers::index))
        .route("/api/health", get(handlers::health))
        .route(
            "/api/crawl",
            post(handlers::crawl).options(handlers::preflight),
        )
        .route(
            "/api/draw",
            post(handlers::draw).options(handlers::preflight),
        )
        .with_state(state);

    if cors_enabled {
        let cors = CorsLayer::new()
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers(Any)
            .allow_origin(Any);
        app = app.layer(cors);
    }

    app.layer(middleware::from_fn(options_no_content))
        .layer(TraceLayer::new_for_http())
}

/// Bind the configured address and serve until Ctrl-C.
pub async fn serve(config: Config) -> std::io::Result<()> {
    let addr = config.server.listen_addr();
    let app = create_router(AppState::new(config));

    let listener = TcpListener::bind(&addr).await?;
    let local: SocketAddr = listener.local_addr()?;
    info!(address = %local, "HTTP API server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            match tokio::signal::ctrl_c().await {
                Ok(()) => info!("HTTP server shutting down"),
                Err(e) => warn!(error = %e, "Failed to listen for Ctrl-C; shutting down"),
            }
        })
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CrawlerConfig;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode, header};
    use serde_json::{Value, json};
    use tower::ServiceExt;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const THREAD_PAGE: &str = r#"<html><body>
        <div class="article-head">
          <div class="member-info"><span class="user-info"><a href="/u/@op" data-filter="op">op</a></span></div>
        </div>
        <div class="article-comment">
          <div class="comment-item">
            <span class="user-info"><a href="/u/@alice" data-filter="alice">alice</a></span>
            <time>2025-05-06 10:00</time>
            <div class="message"><pre>me please</pre></div>
          </div>
          <div class="comment-item">
            <span class="user-info"><a href="/u/@op" data-filter="op">op</a></span>
            <time>2025-05-06 10:01</time>
            <div class="message"><pre>good luck</pre></div>
          </div>
          <div class="comment-item">
            <span class="user-info"><a href="/u/@bob" data-filter="bob">bob</a></span>
            <time>2025-05-06 10:02</time>
            <div class="message"><div class="emoticon-wrapper"><img src="/e.png"></div></div>
          </div>
        </div>
    </body></html>"#;

    fn test_state() -> AppState {
        AppState::new(Config {
            crawler: CrawlerConfig {
                site_domain: "127.0.0.1".to_string(),
                priming_delay_ms: 0,
                request_delay_ms: 0,
                ..CrawlerConfig::default()
            },
            ..Config::default()
        })
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn thread_server(status: u16, body: &str) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/b/test/1"))
            .respond_with(ResponseTemplate::new(status).set_body_string(body))
            .mount(&server)
            .await;
        server
    }

    #[tokio::test]
    async fn test_health() {
        let app = create_router(test_state());
        let request = Request::get("/api/health").body(Body::empty()).unwrap();
        let (status, body) = send(app, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"status": "ok", "message": "Server is running"}));
    }

    #[tokio::test]
    async fn test_index_lists_endpoints() {
        let app = create_router(test_state());
        let (status, body) = send(app, Request::get("/").body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
        assert!(body["endpoints"]["/api/crawl"].is_string());
        assert!(body["endpoints"]["/api/health"].is_string());
    }

    #[tokio::test]
    async fn test_options_is_no_content() {
        let app = create_router(test_state());
        let request = Request::builder()
            .method("OPTIONS")
            .uri("/api/crawl")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(bytes.is_empty());
    }

    #[tokio::test]
    async fn test_browser_preflight_is_no_content() {
        let app = create_router(test_state());
        let request = Request::builder()
            .method("OPTIONS")
            .uri("/api/crawl")
            .header(header::ORIGIN, "https://frontend.example")
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert_eq!(
            response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "*"
        );
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(bytes.is_empty());
    }

    #[tokio::test]
    async fn test_options_without_cors_is_no_content() {
        let mut config = Config::default();
        config.server.cors_enabled = false;
        let app = create_router(AppState::new(config));
        let request = Request::builder()
            .method("OPTIONS")
            .uri("/api/draw")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert!(
            response
                .headers()
                .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_cors_header_present() {
        let app = create_router(test_state());
        let request = Request::get("/api/health")
            .header(header::ORIGIN, "https://frontend.example")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(
            response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "*"
        );
    }

    #[tokio::test]
    async fn test_empty_url_is_bad_request() {
        let app = create_router(test_state());
        let (status, body) = send(app, post_json("/api/crawl", json!({"url": "   "}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"success": false, "error": "please enter a URL"}));
    }

    #[tokio::test]
    async fn test_missing_url_field_is_bad_request() {
        let app = create_router(test_state());
        let (status, body) = send(app, post_json("/api/crawl", json!({}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "please enter a URL");
    }

    #[tokio::test]
    async fn test_foreign_url_is_bad_request() {
        let app = create_router(AppState::new(Config::default()));
        let (status, body) = send(
            app,
            post_json("/api/crawl", json!({"url": "https://example.com/post/1"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "not a arca.live URL");
    }

    #[tokio::test]
    async fn test_malformed_body_is_server_error() {
        let app = create_router(test_state());
        let request = Request::builder()
            .method("POST")
            .uri("/api/crawl")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let (status, body) = send(app, request).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["success"], false);
        assert!(
            body["error"]
                .as_str()
                .unwrap()
                .starts_with("error during crawl: ")
        );
    }

    #[tokio::test]
    async fn test_crawl_excludes_thread_author() {
        let server = thread_server(200, THREAD_PAGE).await;
        let app = create_router(test_state());
        let url = format!("{}/b/test/1", server.uri());

        let (status, body) = send(app, post_json("/api/crawl", json!({"url": url}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["stats"], json!({"totalComments": 2, "uniqueAuthors": 2}));
        assert_eq!(
            body["data"],
            json!([
                {"author": "alice", "content": "me please", "time": "2025-05-06 10:00"},
                {"author": "bob", "content": "[emoticon]", "time": "2025-05-06 10:02"}
            ])
        );
        assert_eq!(body["session_id"].as_str().unwrap().len(), 16);
    }

    #[tokio::test]
    async fn test_rejected_fetch_is_not_found() {
        let server = thread_server(403, "blocked").await;
        let app = create_router(test_state());
        let url = format!("{}/b/test/1", server.uri());

        let (status, body) = send(app, post_json("/api/crawl", json!({"url": url}))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(
            body,
            json!({"success": false, "error": "no comments found, check the URL"})
        );
    }

    #[tokio::test]
    async fn test_page_without_comments_is_not_found() {
        let server = thread_server(200, "<html><body>댓글 0</body></html>").await;
        let app = create_router(test_state());
        let url = format!("{}/b/test/1", server.uri());

        let (status, _) = send(app, post_json("/api/crawl", json!({"url": url}))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_crawl_then_draw() {
        let server = thread_server(200, THREAD_PAGE).await;
        let state = test_state();
        let url = format!("{}/b/test/1", server.uri());

        let (_, crawled) = send(
            create_router(state.clone()),
            post_json("/api/crawl", json!({"url": url})),
        )
        .await;
        let session_id = crawled["session_id"].as_str().unwrap().to_string();

        let (status, body) = send(
            create_router(state.clone()),
            post_json("/api/draw", json!({"session_id": session_id, "count": 2})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["participants"], 2);
        let mut winners: Vec<String> = serde_json::from_value(body["winners"].clone()).unwrap();
        winners.sort();
        assert_eq!(winners, vec!["alice", "bob"]);

        let (status, body) = send(
            create_router(state),
            post_json("/api/draw", json!({"session_id": session_id, "count": 3})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "cannot draw 3 winners from 2 participants");
    }

    #[tokio::test]
    async fn test_draw_defaults_to_one_winner() {
        let state = test_state();
        let id = state.sessions.insert(
            "http://127.0.0.1/b/test/1",
            vec![crate::models::Comment {
                author: "solo".to_string(),
                content: "hi".to_string(),
                time: "now".to_string(),
            }],
        );
        let (status, body) = send(
            create_router(state),
            post_json("/api/draw", json!({"session_id": id})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["winners"], json!(["solo"]));
    }

    #[tokio::test]
    async fn test_draw_unknown_session_is_not_found() {
        let app = create_router(test_state());
        let (status, body) = send(
            app,
            post_json("/api/draw", json!({"session_id": "0000000000000000"})),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "session not found or expired");
    }

    #[tokio::test]
    async fn test_draw_zero_winners_is_bad_request() {
        let state = test_state();
        let id = state.sessions.insert("u", vec![]);
        let (status, body) = send(
            create_router(state),
            post_json("/api/draw", json!({"session_id": id, "count": 0})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "winner count must be at least 1");
    }

    #[tokio::test]
    async fn test_draw_negative_count_is_bad_request() {
        let app = create_router(test_state());
        let (status, body) = send(
            app,
            post_json("/api/draw", json!({"session_id": "x", "count": -1})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().starts_with("invalid request: "));
    }
}
