//! 設定管理
//!
//! ServerConfig, UpstreamConfig, ClientTrackingConfig等の設定構造体

use crate::error::{CommonError, CommonResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// サーバー設定
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServerConfig {
    /// ホストアドレス (デフォルト: "0.0.0.0")
    #[serde(default = "default_host")]
    pub host: String,

    /// ポート番号 (デフォルト: 5000)
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

impl ServerConfig {
    /// バインドアドレス（`host:port`）
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// ローカルからアクセスする際のベースURL
    pub fn local_base_url(&self) -> String {
        let host = match self.host.as_str() {
            "0.0.0.0" | "::" | "[::]" => "127.0.0.1",
            other => other,
        };
        format!("http://{}:{}", host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// 上流（Ollama）接続設定
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UpstreamConfig {
    /// OllamaのベースURL (デフォルト: "http://localhost:11434")
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// ヘルスプローブのタイムアウト（秒）(デフォルト: 1)
    #[serde(default = "default_probe_timeout")]
    pub probe_timeout_secs: u64,

    /// 上流への接続タイムアウト（秒）(デフォルト: 5)
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    /// ストリーミング中に保持するチャンク数の上限 (デフォルト: 16)
    #[serde(default = "default_stream_buffer")]
    pub stream_buffer_chunks: usize,
}

fn default_base_url() -> String {
    "http://localhost:11434".to_string()
}

fn default_probe_timeout() -> u64 {
    1
}

fn default_connect_timeout() -> u64 {
    5
}

fn default_stream_buffer() -> usize {
    16
}

impl UpstreamConfig {
    /// 上流のパスを結合したURLを返す
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    /// ヘルスプローブのタイムアウト
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }

    /// 接続タイムアウト
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// 設定値を検証する
    pub fn validate(&self) -> CommonResult<()> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(CommonError::Config(format!(
                "upstream URL must start with http:// or https://: {}",
                self.base_url
            )));
        }
        if self.probe_timeout_secs == 0 {
            return Err(CommonError::Config(
                "health probe timeout must be at least 1 second".to_string(),
            ));
        }
        if self.stream_buffer_chunks == 0 {
            return Err(CommonError::Config(
                "stream buffer must hold at least one chunk".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            probe_timeout_secs: default_probe_timeout(),
            connect_timeout_secs: default_connect_timeout(),
            stream_buffer_chunks: default_stream_buffer(),
        }
    }
}

/// クライアント追跡設定
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClientTrackingConfig {
    /// 最終アクセスからの保持期間（秒）(デフォルト: 300)
    #[serde(default = "default_retention")]
    pub retention_secs: u64,

    /// 期限切れ掃除の実行間隔（秒）(デフォルト: 60)
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_secs: u64,

    /// `X-Forwarded-For` を信頼するか (デフォルト: false)
    #[serde(default)]
    pub trust_proxy_headers: bool,
}

fn default_retention() -> u64 {
    300
}

fn default_sweep_interval() -> u64 {
    60
}

impl ClientTrackingConfig {
    /// 保持期間
    pub fn retention(&self) -> Duration {
        Duration::from_secs(self.retention_secs)
    }

    /// 掃除間隔
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }

    /// 設定値を検証する
    pub fn validate(&self) -> CommonResult<()> {
        if self.sweep_interval_secs == 0 {
            return Err(CommonError::Config(
                "sweep interval must be at least 1 second".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for ClientTrackingConfig {
    fn default() -> Self {
        Self {
            retention_secs: default_retention(),
            sweep_interval_secs: default_sweep_interval(),
            trust_proxy_headers: false,
        }
    }
}
