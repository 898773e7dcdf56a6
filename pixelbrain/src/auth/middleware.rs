//! ダッシュボード保護ミドルウェア
//!
//! 有効なセッションCookieがなければ `/login` へリダイレクトする。

use crate::AppState;
use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderMap, Request},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

/// Cookieヘッダーからセッショントークンを取り出す
pub(crate) fn extract_session_cookie(headers: &HeaderMap) -> Option<String> {
    let cookie_header = headers.get(header::COOKIE)?.to_str().ok()?;
    for part in cookie_header.split(';') {
        let trimmed = part.trim();
        if let Some(value) = trimmed.strip_prefix(&format!("{}=", super::SESSION_COOKIE)) {
            if !value.is_empty() {
                return Some(value.to_string());
            }
        }
    }
    None
}

/// リクエストが有効なセッションを持つか
pub(crate) async fn has_valid_session(state: &AppState, headers: &HeaderMap) -> bool {
    if !state.gate.is_enabled() {
        return true;
    }
    match extract_session_cookie(headers) {
        Some(token) => state.sessions.is_valid(&token).await,
        None => false,
    }
}

/// ダッシュボードをセッションで保護するミドルウェア
pub async fn require_dashboard_session(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if has_valid_session(&state, request.headers()).await {
        return next.run(request).await;
    }

    tracing::debug!(
        path = %request.uri().path(),
        "Dashboard session missing; redirecting to login"
    );
    Redirect::to("/login").into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_extract_session_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; pixelbrain_session=tok123; other=1"),
        );
        assert_eq!(extract_session_cookie(&headers), Some("tok123".to_string()));
    }

    #[test]
    fn test_extract_session_cookie_missing_or_empty() {
        let mut headers = HeaderMap::new();
        assert_eq!(extract_session_cookie(&headers), None);

        headers.insert(header::COOKIE, HeaderValue::from_static("pixelbrain_session="));
        assert_eq!(extract_session_cookie(&headers), None);
    }
}
