//! スプレッドシート解析API（未実装）

use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

/// POST /api/excel/analyze - 未実装であることを返す
pub async fn analyze() -> impl IntoResponse {
    (
        StatusCode::NOT_IMPLEMENTED,
        Json(json!({
            "message": "Excel analysis endpoint not implemented yet."
        })),
    )
}
