pub mod health;
pub mod profile;
pub mod views;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue},
    routing::{get, post},
    Router,
};
use tower_http::{compression::CompressionLayer, set_header::SetResponseHeaderLayer};

use crate::analysis::handlers::handle_analyze_jd;
use crate::chat::handlers::handle_chat;
use crate::state::AppState;

const MAX_BODY_BYTES: usize = 100 * 1024;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/health/ready", get(health::readiness_handler))
        .route("/api/profile", get(profile::handle_get_profile))
        .route("/api/analyze-jd", post(handle_analyze_jd))
        .route("/api/chat", post(handle_chat))
        .route("/api/views", get(views::handle_increment_views))
        .route("/api/views/count", get(views::handle_view_count))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(CompressionLayer::new())
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::REFERRER_POLICY,
            HeaderValue::from_static("no-referrer"),
        ))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use axum::{
        body::{to_bytes, Body},
        http::{header::CONTENT_TYPE, Request, StatusCode},
        response::Response,
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::cache::memory::{FailingCounterStore, MemoryCounterStore};
    use crate::cache::CounterStore;
    use crate::context::prompts::CHAT_FALLBACK_PROMPT;
    use crate::llm_client::stub::StubProvider;
    use crate::llm_client::LlmClient;
    use crate::models::history::{ChatRole, Verdict};
    use crate::session::{hash_ip, is_valid_session_id};
    use crate::store::memory::MemoryStore;
    use crate::store::PortfolioStore;

    const CLIENT: &str = "203.0.113.7";
    const SALT: &str = "test-salt";
    const STRONG_FIT: &str = r#"```json
{"verdict": "strong_fit", "openingParagraph": "Good match.", "whereIDontFit": [], "whatTransfers": ["Kubernetes"], "recommendation": "Apply."}
```"#;

    struct Harness {
        app: Router,
        store: Arc<MemoryStore>,
        provider: Arc<StubProvider>,
    }

    fn harness_with(
        store: Option<Arc<MemoryStore>>,
        counters: Option<Arc<dyn CounterStore>>,
        provider: StubProvider,
    ) -> Harness {
        let provider = Arc::new(provider);
        let dyn_store = store.clone().map(|s| s as Arc<dyn PortfolioStore>);
        let state = AppState::new(dyn_store, counters, LlmClient::new(provider.clone()), SALT);
        Harness {
            app: build_router(state),
            store: store.unwrap_or_default(),
            provider,
        }
    }

    fn harness(reply: &str) -> Harness {
        harness_with(
            Some(Arc::new(MemoryStore::with_sample_data())),
            Some(Arc::new(MemoryCounterStore::default())),
            StubProvider::replying(reply),
        )
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(CONTENT_TYPE, "application/json")
            .header("x-forwarded-for", CLIENT)
            .body(Body::from(body.to_string()))
            .expect("build request")
    }

    fn get_req(uri: &str) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .body(Body::empty())
            .expect("build request")
    }

    async fn send(app: &Router, request: Request<Body>) -> Response {
        app.clone().oneshot(request).await.expect("router call")
    }

    async fn json_body(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), MAX_BODY_BYTES)
            .await
            .expect("read body");
        serde_json::from_slice(&bytes).expect("parse json")
    }

    async fn eventually(check: impl Fn() -> bool) {
        for _ in 0..200 {
            if check() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("background write never landed");
    }

    fn user_messages(n: usize) -> Vec<Value> {
        (0..n)
            .map(|i| json!({ "role": "user", "content": format!("question {i}") }))
            .collect()
    }

    #[tokio::test]
    async fn test_analyze_jd_returns_verdict_and_persists_once() {
        let h = harness(STRONG_FIT);
        let jd = "Senior platform engineer, Kubernetes, remote, SaaS";
        assert_eq!(jd.len(), 50);

        let response = send(&h.app, post_json("/api/analyze-jd", json!({ "jobDescription": jd }))).await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        assert_eq!(body["verdict"], "strong_fit");
        assert_eq!(body["whatTransfers"][0], "Kubernetes");
        assert_eq!(body["openingParagraph"], "Good match.");

        eventually(|| h.store.analyses().len() == 1).await;
        let analyses = h.store.analyses();
        let stored = &analyses[0];
        assert_eq!(stored.job_description, jd);
        assert_eq!(stored.verdict, Verdict::StrongFit);
        assert!(!stored.is_demo);
        assert_eq!(stored.session_id.as_deref(), Some(hash_ip(SALT, CLIENT).as_str()));

        let requests = h.provider.requests();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].system.contains("Test User"));
        assert!(requests[0].messages[0].content.contains(jd));
    }

    #[tokio::test]
    async fn test_eleventh_analysis_is_rate_limited_before_provider() {
        let h = harness(STRONG_FIT);

        for _ in 0..10 {
            let response = send(
                &h.app,
                post_json("/api/analyze-jd", json!({ "jobDescription": "Rust engineer" })),
            )
            .await;
            assert_eq!(response.status(), StatusCode::OK);
        }

        let response = send(
            &h.app,
            post_json("/api/analyze-jd", json!({ "jobDescription": "Rust engineer" })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(json_body(response).await["error"], "Rate limit exceeded. Try again later.");
        assert_eq!(h.provider.calls(), 10);
    }

    #[tokio::test]
    async fn test_rate_limit_is_charged_before_validation() {
        let h = harness(STRONG_FIT);

        for _ in 0..10 {
            let response = send(&h.app, post_json("/api/analyze-jd", json!({}))).await;
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        }
        let response = send(&h.app, post_json("/api/analyze-jd", json!({}))).await;
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(h.provider.calls(), 0);
    }

    #[tokio::test]
    async fn test_malformed_completion_is_500_without_record() {
        let h = harness("Sure! You look like a great fit.");

        let response = send(
            &h.app,
            post_json("/api/analyze-jd", json!({ "jobDescription": "Rust engineer" })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json_body(response).await["error"], "Failed to parse analysis results");
        assert!(h.store.analyses().is_empty());
    }

    #[tokio::test]
    async fn test_provider_failure_is_generic_500() {
        let h = harness_with(
            Some(Arc::new(MemoryStore::with_sample_data())),
            None,
            StubProvider::failing(),
        );

        let response = send(
            &h.app,
            post_json("/api/analyze-jd", json!({ "jobDescription": "Rust engineer" })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = json_body(response).await;
        assert_eq!(body["error"], "Analysis failed. Please try again.");
        assert!(!body.to_string().contains("upstream exploded"));
    }

    #[tokio::test]
    async fn test_context_read_failure_fails_analysis() {
        let h = harness(STRONG_FIT);
        h.store.fail_reads(true);

        let response = send(
            &h.app,
            post_json("/api/analyze-jd", json!({ "jobDescription": "Rust engineer" })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(h.provider.calls(), 0);
    }

    #[tokio::test]
    async fn test_chat_with_51_messages_never_reaches_provider() {
        let h = harness("hello");

        let response = send(
            &h.app,
            post_json("/api/chat", json!({ "messages": user_messages(51) })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["error"], "Too many messages (max 50)");
        assert_eq!(h.provider.calls(), 0);
    }

    #[tokio::test]
    async fn test_chat_issues_session_and_records_exchange() {
        let h = harness("I have run Kubernetes in production for years.");

        let response = send(
            &h.app,
            post_json("/api/chat", json!({ "messages": user_messages(1) })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        let session_id = body["sessionId"].as_str().unwrap().to_string();
        assert!(is_valid_session_id(&session_id));
        assert_eq!(body["response"], "I have run Kubernetes in production for years.");

        eventually(|| h.store.chat_turns().len() == 2).await;
        let turns = h.store.chat_turns();
        assert_eq!(turns[0].role, ChatRole::User);
        assert_eq!(turns[0].content, "question 0");
        assert_eq!(turns[0].session_id, session_id);
        assert_eq!(turns[1].role, ChatRole::Assistant);
    }

    #[tokio::test]
    async fn test_chat_keeps_supplied_session_id() {
        let h = harness("hi");
        let session_id = "session_1700000000000_abc123def456";

        let response = send(
            &h.app,
            post_json(
                "/api/chat",
                json!({ "messages": user_messages(2), "sessionId": session_id }),
            ),
        )
        .await;
        assert_eq!(json_body(response).await["sessionId"], session_id);
    }

    #[tokio::test]
    async fn test_chat_rejects_bad_session_id() {
        let h = harness("hi");

        let response = send(
            &h.app,
            post_json(
                "/api/chat",
                json!({ "messages": user_messages(1), "sessionId": "session_1_NOTHEX" }),
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["error"], "Invalid session ID format");
        assert_eq!(h.provider.calls(), 0);
    }

    #[tokio::test]
    async fn test_chat_without_store_uses_fallback_prompt() {
        let h = harness_with(None, None, StubProvider::replying("hi"));

        let response = send(
            &h.app,
            post_json("/api/chat", json!({ "messages": user_messages(1) })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(h.provider.requests()[0].system, CHAT_FALLBACK_PROMPT);
    }

    #[tokio::test]
    async fn test_chat_survives_history_write_failure() {
        let h = harness("hi");
        h.store.fail_writes(true);

        let response = send(
            &h.app,
            post_json("/api/chat", json!({ "messages": user_messages(1) })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_profile_requires_store() {
        let h = harness_with(None, None, StubProvider::replying("x"));

        let response = send(&h.app, get_req("/api/profile")).await;
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(json_body(response).await["error"], "Database not available");
    }

    #[tokio::test]
    async fn test_profile_payload() {
        let h = harness("x");

        let response = send(&h.app, get_req("/api/profile")).await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        assert_eq!(body["profile"]["name"], "Test User");
        assert_eq!(body["experiences"].as_array().unwrap().len(), 2);
        assert_eq!(body["skills"].as_array().unwrap().len(), 3);
        let suggested = body["suggestedQuestions"].as_array().unwrap();
        assert_eq!(suggested.len(), 1);
        assert!(suggested[0]["question"].is_string());
    }

    #[tokio::test]
    async fn test_profile_read_failure_is_500() {
        let h = harness("x");
        h.store.fail_reads(true);

        let response = send(&h.app, get_req("/api/profile")).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json_body(response).await["error"], "Failed to fetch profile");
    }

    #[tokio::test]
    async fn test_views_increment_then_read() {
        for counters in [
            Some(Arc::new(MemoryCounterStore::default()) as Arc<dyn CounterStore>),
            None,
        ] {
            let h = harness_with(None, counters, StubProvider::replying("x"));

            let response = send(&h.app, get_req("/api/views/count")).await;
            assert_eq!(json_body(response).await["views"], 0);

            send(&h.app, get_req("/api/views")).await;
            let response = send(&h.app, get_req("/api/views")).await;
            assert_eq!(json_body(response).await["views"], 2);

            let response = send(&h.app, get_req("/api/views/count")).await;
            assert_eq!(json_body(response).await["views"], 2);
        }
    }

    #[tokio::test]
    async fn test_views_store_error_is_500() {
        let h = harness_with(None, Some(Arc::new(FailingCounterStore)), StubProvider::replying("x"));

        let response = send(&h.app, get_req("/api/views")).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json_body(response).await["error"], "Failed to get view count");
    }

    #[tokio::test]
    async fn test_readiness_reports_each_dependency() {
        let h = harness("x");
        let response = send(&h.app, get_req("/health/ready")).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["checks"]["database"], true);
        assert_eq!(body["checks"]["cache"], true);

        let h = harness_with(None, None, StubProvider::replying("x"));
        let body = json_body(send(&h.app, get_req("/health/ready")).await).await;
        assert_eq!(body["status"], "ok");
        assert!(body["checks"]["database"].is_null());
        assert!(body["checks"]["cache"].is_null());

        let h = harness_with(
            Some(Arc::new(MemoryStore::default())),
            Some(Arc::new(FailingCounterStore)),
            StubProvider::replying("x"),
        );
        let response = send(&h.app, get_req("/health/ready")).await;
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        let body = json_body(response).await;
        assert_eq!(body["status"], "degraded");
        assert_eq!(body["checks"]["cache"], false);
    }

    #[tokio::test]
    async fn test_security_headers_and_liveness() {
        let h = harness("x");
        let response = send(&h.app, get_req("/health")).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["x-content-type-options"], "nosniff");
        assert_eq!(response.headers()["x-frame-options"], "DENY");
        assert_eq!(response.headers()["referrer-policy"], "no-referrer");
        assert_eq!(json_body(response).await, json!({ "status": "ok" }));
    }
}
