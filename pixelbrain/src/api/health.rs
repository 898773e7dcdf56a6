//! ヘルスチェックAPI

use axum::Json;
use pixelbrain_common::types::HealthResponse;

/// ヘルスチェックのメッセージ
pub const HEALTH_MESSAGE: &str = "PixelBrain Backend is running";

/// GET /api/health - プロセスの生存確認（上流には問い合わせない）
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        message: HEALTH_MESSAGE.to_string(),
    })
}
