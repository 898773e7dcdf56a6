//! ダッシュボードAPI
//!
//! `GET /api/stats` は上流がダウンしていても常に200を返す。

use crate::stats;
use crate::AppState;
use axum::{extract::State, Json};
use pixelbrain_common::types::StatsResponse;

/// GET /api/stats - ホスト負荷・上流状態・最近のクライアント
pub async fn get_stats(State(state): State<AppState>) -> Json<StatsResponse> {
    let snapshot = stats::collect(&state).await;
    Json(snapshot.to_response())
}
