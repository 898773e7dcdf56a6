//! Routes: ページ・ログインゲート・タグ中継・スタブAPIの結合テスト

#[path = "support/mod.rs"]
mod support;

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    response::Response,
};
use serde_json::{json, Value};
use support::app::{test_router, test_state};
use support::http::closed_port_url;
use tower::ServiceExt;
use wiremock::matchers::{body_json, header as header_matcher, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn body_text(response: Response) -> String {
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(body.to_vec()).unwrap()
}

async fn body_json_value(response: Response) -> Value {
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&body).unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn login_request(password: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/login")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(format!("password={password}")))
        .unwrap()
}

#[tokio::test]
async fn health_is_always_ok() {
    let state = test_state(&closed_port_url(), None);
    let response = test_router(&state).oneshot(get("/api/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json_value(response).await,
        json!({"status": "ok", "message": "PixelBrain Backend is running"})
    );
}

#[tokio::test]
async fn tags_are_passed_through() {
    let upstream = MockServer::start().await;
    let tags = json!({
        "models": [{"name": "llama3:8b", "details": {"family": "llama"}}]
    });
    Mock::given(method("GET"))
        .and(path("/api/tags"))
        .respond_with(ResponseTemplate::new(200).set_body_json(tags.clone()))
        .mount(&upstream)
        .await;
    let state = test_state(&upstream.uri(), None);

    let response = test_router(&state).oneshot(get("/api/tags")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json_value(response).await, tags);
}

#[tokio::test]
async fn tags_upstream_error_is_500_json() {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/tags"))
        .respond_with(ResponseTemplate::new(404).set_body_string("not found"))
        .mount(&upstream)
        .await;
    let state = test_state(&upstream.uri(), None);

    let response = test_router(&state).oneshot(get("/api/tags")).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json_value(response).await;
    assert_eq!(body["error"], "Upstream returned status 404: not found");
}

#[tokio::test]
async fn generate_forwards_payload_unmodified() {
    let upstream = MockServer::start().await;
    let payload = json!({"model": "llama3:8b", "prompt": "why is the sky blue?", "stream": false});
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .and(header_matcher("content-type", "application/json"))
        .and(body_json(payload.clone()))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(r#"{"response":"Rayleigh","done":true}"#, "application/json"),
        )
        .expect(1)
        .mount(&upstream)
        .await;
    let state = test_state(&upstream.uri(), None);

    let request = Request::builder()
        .method("POST")
        .uri("/api/generate")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(payload.to_string()))
        .unwrap();
    let response = test_router(&state).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "application/json"
    );
    assert_eq!(body_json_value(response).await["response"], "Rayleigh");
}

#[tokio::test]
async fn generate_upstream_status_error_is_500_json() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({"error": "model 'nope' not found"})),
        )
        .mount(&upstream)
        .await;
    let state = test_state(&upstream.uri(), None);

    let request = Request::builder()
        .method("POST")
        .uri("/api/generate")
        .body(Body::from(r#"{"model":"nope","prompt":"x"}"#))
        .unwrap();
    let response = test_router(&state).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json_value(response).await;
    assert!(body["error"].as_str().unwrap().contains("404"));
}

#[tokio::test]
async fn excel_endpoint_is_not_implemented() {
    let state = test_state(&closed_port_url(), None);
    let request = Request::builder()
        .method("POST")
        .uri("/api/excel/analyze")
        .body(Body::empty())
        .unwrap();

    let response = test_router(&state).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_IMPLEMENTED);
    assert_eq!(
        body_json_value(response).await,
        json!({"message": "Excel analysis endpoint not implemented yet."})
    );
}

#[tokio::test]
async fn pages_are_served() {
    let state = test_state(&closed_port_url(), None);

    for uri in ["/", "/chat", "/chat/", "/login"] {
        let response = test_router(&state).oneshot(get(uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK, "GET {uri}");
        assert!(response
            .headers()
            .get(header::CONTENT_TYPE)
            .unwrap()
            .to_str()
            .unwrap()
            .starts_with("text/html"));
    }
}

#[tokio::test]
async fn static_assets_have_mime_types() {
    let state = test_state(&closed_port_url(), None);

    let css = test_router(&state)
        .oneshot(get("/static/style.css"))
        .await
        .unwrap();
    assert_eq!(css.status(), StatusCode::OK);
    assert_eq!(css.headers().get(header::CONTENT_TYPE).unwrap(), "text/css");

    let missing = test_router(&state)
        .oneshot(get("/static/nope.js"))
        .await
        .unwrap();
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn page_html_is_not_served_as_static() {
    let state = test_state(&closed_port_url(), Some("letmein"));

    for uri in ["/static/dashboard.html", "/static/login.html", "/static/index.html"] {
        let response = test_router(&state).oneshot(get(uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "GET {uri}");
    }

    let gated = test_router(&state).oneshot(get("/dashboard")).await.unwrap();
    assert!(gated.status().is_redirection());
}

#[tokio::test]
async fn login_page_has_no_placeholder() {
    let state = test_state(&closed_port_url(), Some("letmein"));

    let response = test_router(&state).oneshot(get("/login")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(!body_text(response).await.contains("{{error}}"));
}

#[tokio::test]
async fn login_page_redirects_when_session_is_valid() {
    let state = test_state(&closed_port_url(), Some("letmein"));
    let token = state.sessions.create().await;

    let request = Request::builder()
        .uri("/login")
        .header(header::COOKIE, format!("pixelbrain_session={token}"))
        .body(Body::empty())
        .unwrap();
    let response = test_router(&state).oneshot(request).await.unwrap();

    assert!(response.status().is_redirection());
    assert_eq!(
        response.headers().get(header::LOCATION).unwrap(),
        "/dashboard"
    );
}

#[tokio::test]
async fn dashboard_is_open_without_password() {
    let state = test_state(&closed_port_url(), None);
    let response = test_router(&state).oneshot(get("/dashboard")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn dashboard_requires_login_when_password_set() {
    let state = test_state(&closed_port_url(), Some("letmein"));

    let response = test_router(&state).oneshot(get("/dashboard")).await.unwrap();
    assert!(response.status().is_redirection());
    assert_eq!(response.headers().get(header::LOCATION).unwrap(), "/login");
}

#[tokio::test]
async fn wrong_password_is_denied() {
    let state = test_state(&closed_port_url(), Some("letmein"));

    let response = test_router(&state)
        .oneshot(login_request("guess"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(response.headers().get(header::SET_COOKIE).is_none());
    assert!(body_text(response).await.contains("ACCESS DENIED"));
}

#[tokio::test]
async fn login_then_dashboard_then_logout() {
    let state = test_state(&closed_port_url(), Some("letmein"));

    let response = test_router(&state)
        .oneshot(login_request("letmein"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        response.headers().get(header::LOCATION).unwrap(),
        "/dashboard"
    );
    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    let cookie = set_cookie.split(';').next().unwrap().to_string();
    assert!(cookie.starts_with("pixelbrain_session="));

    let with_cookie = |uri: &str| {
        Request::builder()
            .uri(uri)
            .header(header::COOKIE, cookie.clone())
            .body(Body::empty())
            .unwrap()
    };

    let dashboard = test_router(&state)
        .oneshot(with_cookie("/dashboard"))
        .await
        .unwrap();
    assert_eq!(dashboard.status(), StatusCode::OK);

    let logout = test_router(&state)
        .oneshot(with_cookie("/logout"))
        .await
        .unwrap();
    assert!(logout.status().is_redirection());
    assert!(logout
        .headers()
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap()
        .contains("Max-Age=0"));

    let after = test_router(&state)
        .oneshot(with_cookie("/dashboard"))
        .await
        .unwrap();
    assert!(after.status().is_redirection());
}
