//! ページ配信とログイン
//!
//! HTML・CSS・JSはバイナリに埋め込む。ページHTMLは `PAGES_DIR` に置き、
//! `/static/*` からは配信しない。

use crate::auth::{self, middleware::extract_session_cookie};
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use include_dir::{include_dir, Dir};
use serde::Deserialize;
use tracing::{info, warn};

static STATIC_DIR: Dir<'static> = include_dir!("$CARGO_MANIFEST_DIR/src/web/static");
static PAGES_DIR: Dir<'static> = include_dir!("$CARGO_MANIFEST_DIR/src/web/pages");

/// ログインページ内のエラーメッセージ差し込み位置
const LOGIN_ERROR_PLACEHOLDER: &str = "{{error}}";

/// 誤ったパスワードに対するメッセージ
pub const ACCESS_DENIED: &str = "ACCESS DENIED";

fn embedded_page(name: &str) -> Response {
    match PAGES_DIR
        .get_file(name)
        .and_then(|file| file.contents_utf8())
    {
        Some(html) => Html(html).into_response(),
        None => {
            warn!(page = name, "Embedded page missing");
            StatusCode::NOT_FOUND.into_response()
        }
    }
}

fn render_login(error: &str) -> String {
    PAGES_DIR
        .get_file("login.html")
        .and_then(|file| file.contents_utf8())
        .unwrap_or(LOGIN_ERROR_PLACEHOLDER)
        .replace(LOGIN_ERROR_PLACEHOLDER, error)
}

/// GET / - ホーム
pub async fn home() -> Response {
    embedded_page("index.html")
}

/// GET /chat - チャット画面
pub async fn chat() -> Response {
    embedded_page("chat.html")
}

/// GET /dashboard - ダッシュボード（セッション必須）
pub async fn dashboard() -> Response {
    embedded_page("dashboard.html")
}

/// GET /static/*path - 埋め込み静的ファイル
pub async fn static_asset(Path(path): Path<String>) -> Response {
    let path = path.trim_start_matches('/');
    let Some(file) = STATIC_DIR.get_file(path) else {
        return StatusCode::NOT_FOUND.into_response();
    };
    let mime = mime_guess::from_path(path).first_or_octet_stream();
    let content_type = HeaderValue::from_str(mime.as_ref())
        .unwrap_or_else(|_| HeaderValue::from_static("application/octet-stream"));
    ([(header::CONTENT_TYPE, content_type)], file.contents()).into_response()
}

/// GET /login - ログイン画面
///
/// ゲート有効時に有効なセッションがあればダッシュボードへ送る。
pub async fn login_page(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if state.gate.is_enabled() && auth::middleware::has_valid_session(&state, &headers).await {
        return Redirect::to("/dashboard").into_response();
    }
    Html(render_login("")).into_response()
}

/// ログインフォーム
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    /// 共有パスワード
    #[serde(default)]
    pub password: String,
}

/// POST /login - パスワード検証とセッション発行
pub async fn login(State(state): State<AppState>, Form(form): Form<LoginForm>) -> Response {
    if !state.gate.verify(&form.password) {
        warn!("Dashboard login rejected");
        return (StatusCode::UNAUTHORIZED, Html(render_login(ACCESS_DENIED))).into_response();
    }

    let token = state.sessions.create().await;
    info!("Dashboard login accepted");
    let cookie = auth::build_session_cookie(&token, state.sessions.ttl_secs());
    (
        [(header::SET_COOKIE, cookie)],
        Redirect::to("/dashboard"),
    )
        .into_response()
}

/// GET /logout - セッション破棄
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if let Some(token) = extract_session_cookie(&headers) {
        state.sessions.revoke(&token).await;
    }
    (
        [(header::SET_COOKIE, auth::clear_session_cookie())],
        Redirect::to("/"),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_pages_exist() {
        for name in ["index.html", "chat.html", "dashboard.html", "login.html"] {
            assert!(PAGES_DIR.get_file(name).is_some(), "missing {name}");
            assert!(STATIC_DIR.get_file(name).is_none(), "{name} must not be public");
        }
        for name in ["style.css", "chat.js", "dashboard.js"] {
            assert!(STATIC_DIR.get_file(name).is_some(), "missing {name}");
        }
    }

    #[test]
    fn test_render_login_inserts_error() {
        let page = render_login(ACCESS_DENIED);
        assert!(page.contains(ACCESS_DENIED));
        assert!(!page.contains(LOGIN_ERROR_PLACEHOLDER));

        let clean = render_login("");
        assert!(!clean.contains(ACCESS_DENIED));
    }
}
