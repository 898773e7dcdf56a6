use std::sync::Arc;

use axum::Router;
use pixelbrain::config::AppConfig;
use pixelbrain::metrics::FixedMetrics;
use pixelbrain::AppState;
use pixelbrain_common::config::UpstreamConfig;
use pixelbrain_common::types::SystemSample;

/// テスト用の固定メトリクス（8GB / 16GB）
#[allow(dead_code)]
pub fn fixed_sample() -> SystemSample {
    SystemSample {
        cpu_percent: 25.0,
        ram_percent: 50.0,
        ram_used_bytes: 8 * 1024 * 1024 * 1024,
        ram_total_bytes: 16 * 1024 * 1024 * 1024,
    }
}

/// 上流URLとパスワードを指定して状態を作る
#[allow(dead_code)]
pub fn test_state(upstream_url: &str, password: Option<&str>) -> AppState {
    let config = AppConfig {
        upstream: UpstreamConfig {
            base_url: upstream_url.to_string(),
            ..UpstreamConfig::default()
        },
        dashboard_password: password.map(str::to_string),
        ..AppConfig::default()
    };
    AppState::new(config, Arc::new(FixedMetrics(fixed_sample()))).unwrap()
}

/// 状態からルーターを作る
#[allow(dead_code)]
pub fn test_router(state: &AppState) -> Router {
    pixelbrain::api::create_router(state.clone())
}
