//! REST APIハンドラー
//!
//! Ollamaプロキシ、ダッシュボード統計、ヘルスチェック、ページ配信

pub mod dashboard;
pub mod error;
pub mod excel;
pub mod health;
pub mod pages;
pub mod proxy;

use crate::auth::middleware::require_dashboard_session;
use crate::registry::middleware::track_client;
use crate::AppState;
use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// 生成リクエスト本文の上限（画像入力を含むため大きめ）
const GENERATE_BODY_LIMIT_BYTES: usize = 64 * 1024 * 1024;

/// APIルーターを作成
pub fn create_router(state: AppState) -> Router {
    let gated = Router::new()
        .route("/dashboard", get(pages::dashboard))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_dashboard_session,
        ));

    Router::new()
        .route("/", get(pages::home))
        .route("/chat", get(pages::chat))
        .route("/chat/", get(pages::chat))
        .route("/login", get(pages::login_page).post(pages::login))
        .route("/logout", get(pages::logout))
        .route("/static/*path", get(pages::static_asset))
        .route(
            "/api/generate",
            post(proxy::proxy_generate).layer(DefaultBodyLimit::max(GENERATE_BODY_LIMIT_BYTES)),
        )
        .route("/api/tags", get(proxy::proxy_tags))
        .route("/api/stats", get(dashboard::get_stats))
        .route("/api/health", get(health::health_check))
        .route("/api/excel/analyze", post(excel::analyze))
        .merge(gated)
        .layer(middleware::from_fn_with_state(state.clone(), track_client))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
