//! Configuration management via environment variables
//!
//! Provides helper functions for reading environment variables with fallback
//! to legacy variable names with warning logs, and assembles [`AppConfig`].

use pixelbrain_common::config::{ClientTrackingConfig, ServerConfig, UpstreamConfig};
use pixelbrain_common::error::CommonResult;

/// Get an environment variable with fallback to a legacy name
///
/// If the new variable name is set, returns its value.
/// If only the old (legacy) variable name is set, returns its value
/// and logs a deprecation warning.
pub fn get_env_with_fallback(new_name: &str, old_name: &str) -> Option<String> {
    if let Ok(val) = std::env::var(new_name) {
        return Some(val);
    }
    if new_name == old_name {
        return None;
    }
    if let Ok(val) = std::env::var(old_name) {
        tracing::warn!(
            "Environment variable '{}' is deprecated, use '{}' instead",
            old_name,
            new_name
        );
        return Some(val);
    }
    None
}

/// Get an environment variable with fallback and default value
pub fn get_env_with_fallback_or(new_name: &str, old_name: &str, default: &str) -> String {
    get_env_with_fallback(new_name, old_name).unwrap_or_else(|| default.to_string())
}

/// Get an environment variable with fallback, parsing to a specific type
///
/// Falls back to `default` if neither is set or parsing fails.
pub fn get_env_with_fallback_parse<T: std::str::FromStr>(
    new_name: &str,
    old_name: &str,
    default: T,
) -> T {
    get_env_with_fallback(new_name, old_name)
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}

/// Parse a boolean flag (`true/1/yes/on`)
fn get_env_flag(new_name: &str, old_name: &str) -> bool {
    get_env_with_fallback(new_name, old_name)
        .map(|value| {
            matches!(
                value.trim().to_ascii_lowercase().as_str(),
                "1" | "true" | "yes" | "on"
            )
        })
        .unwrap_or(false)
}

/// `OLLAMA_HOST` 形式（`host:port`）の値にスキームを補う
fn normalize_upstream_url(value: &str) -> String {
    let value = value.trim();
    if value.contains("://") {
        value.to_string()
    } else {
        format!("http://{}", value)
    }
}

/// アプリケーション全体の設定
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    /// 待ち受け設定
    pub server: ServerConfig,
    /// Ollama接続設定
    pub upstream: UpstreamConfig,
    /// クライアント追跡設定
    pub tracking: ClientTrackingConfig,
    /// ダッシュボードの共有パスワード（未設定ならゲートなし）
    pub dashboard_password: Option<String>,
}

impl AppConfig {
    /// 環境変数から設定を読み込む
    pub fn from_env() -> Self {
        let server_defaults = ServerConfig::default();
        let upstream_defaults = UpstreamConfig::default();
        let tracking_defaults = ClientTrackingConfig::default();

        let server = ServerConfig {
            host: get_env_with_fallback_or(
                "PIXELBRAIN_HOST",
                "PIXELBRAIN_HOST",
                &server_defaults.host,
            ),
            port: get_env_with_fallback_parse(
                "PIXELBRAIN_PORT",
                "PIXELBRAIN_PORT",
                server_defaults.port,
            ),
        };

        let upstream = UpstreamConfig {
            base_url: normalize_upstream_url(&get_env_with_fallback_or(
                "PIXELBRAIN_OLLAMA_URL",
                "OLLAMA_HOST",
                &upstream_defaults.base_url,
            )),
            probe_timeout_secs: get_env_with_fallback_parse(
                "PIXELBRAIN_HEALTH_PROBE_TIMEOUT_SECS",
                "PIXELBRAIN_HEALTH_PROBE_TIMEOUT_SECS",
                upstream_defaults.probe_timeout_secs,
            ),
            connect_timeout_secs: get_env_with_fallback_parse(
                "PIXELBRAIN_UPSTREAM_CONNECT_TIMEOUT_SECS",
                "PIXELBRAIN_UPSTREAM_CONNECT_TIMEOUT_SECS",
                upstream_defaults.connect_timeout_secs,
            ),
            stream_buffer_chunks: get_env_with_fallback_parse(
                "PIXELBRAIN_STREAM_BUFFER_CHUNKS",
                "PIXELBRAIN_STREAM_BUFFER_CHUNKS",
                upstream_defaults.stream_buffer_chunks,
            ),
        };

        let tracking = ClientTrackingConfig {
            retention_secs: get_env_with_fallback_parse(
                "PIXELBRAIN_CLIENT_RETENTION_SECS",
                "PIXELBRAIN_CLIENT_RETENTION_SECS",
                tracking_defaults.retention_secs,
            ),
            sweep_interval_secs: get_env_with_fallback_parse(
                "PIXELBRAIN_CLIENT_SWEEP_INTERVAL_SECS",
                "PIXELBRAIN_CLIENT_SWEEP_INTERVAL_SECS",
                tracking_defaults.sweep_interval_secs,
            ),
            trust_proxy_headers: get_env_flag(
                "PIXELBRAIN_TRUST_PROXY_HEADERS",
                "PIXELBRAIN_TRUST_PROXY_HEADERS",
            ),
        };

        let dashboard_password =
            get_env_with_fallback("PIXELBRAIN_DASHBOARD_PASSWORD", "DASHBOARD_PASSWORD")
                .filter(|value| !value.is_empty());

        Self {
            server,
            upstream,
            tracking,
            dashboard_password,
        }
    }

    /// 設定値を検証する
    pub fn validate(&self) -> CommonResult<()> {
        self.upstream.validate()?;
        self.tracking.validate()?;
        Ok(())
    }
}
