//! ロギング初期化
//!
//! `PIXELBRAIN_LOG_LEVEL` > `RUST_LOG` > `info` の順でフィルタを決める。

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// ログレベル指定の環境変数
pub const LOG_LEVEL_ENV: &str = "PIXELBRAIN_LOG_LEVEL";

const DEFAULT_FILTER: &str = "info";

/// フィルタ文字列から `EnvFilter` を作る（不正値は既定値）
fn build_filter(directive: Option<&str>) -> EnvFilter {
    if let Some(directive) = directive.map(str::trim).filter(|d| !d.is_empty()) {
        if let Ok(filter) = EnvFilter::try_new(directive) {
            return filter;
        }
        eprintln!(
            "Invalid {} value '{}', falling back to '{}'",
            LOG_LEVEL_ENV, directive, DEFAULT_FILTER
        );
        return EnvFilter::new(DEFAULT_FILTER);
    }
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// グローバルなtracing subscriberを初期化する
///
/// プロセスで1回だけ呼び出す。2回目以降はエラーを返す。
pub fn init() -> Result<(), tracing_subscriber::util::TryInitError> {
    let directive = std::env::var(LOG_LEVEL_ENV).ok();
    tracing_subscriber::registry()
        .with(build_filter(directive.as_deref()))
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .try_init()
}
