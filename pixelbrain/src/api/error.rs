//! APIエラーレスポンス型
//!
//! axum用の共通エラーハンドリング

use axum::{http::StatusCode, response::IntoResponse, Json};
use pixelbrain_common::error::ProxyError;
use serde_json::json;

/// Axum用のエラーレスポンス型
///
/// 上流の失敗はいずれも `500 {"error": "<message>"}` として返す。
#[derive(Debug)]
pub struct AppError(pub ProxyError);

impl From<ProxyError> for AppError {
    fn from(err: ProxyError) -> Self {
        AppError(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let message = self.0.to_string();
        tracing::warn!(error = %message, "Proxy request failed");

        let payload = json!({
            "error": message
        });

        (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response()
    }
}
