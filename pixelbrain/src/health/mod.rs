//! 上流（Ollama）ヘルスプローブ
//!
//! `GET /api/tags` を短いタイムアウトで呼び出し、稼働状態を分類する。
//! 失敗は呼び出し元へ伝播させず、すべて [`BackendStatus`] に吸収する。

use pixelbrain_common::config::UpstreamConfig;
use pixelbrain_common::types::{BackendStatus, TagsResponse};
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::{debug, warn};

/// 上流のモデル一覧エンドポイント
pub const TAGS_PATH: &str = "/api/tags";

/// ヘルスプローブ
#[derive(Clone)]
pub struct BackendProber {
    client: Client,
    tags_url: String,
    timeout: Duration,
}

impl BackendProber {
    /// 新しいプローブを作成
    pub fn new(client: Client, upstream: &UpstreamConfig) -> Self {
        Self {
            client,
            tags_url: upstream.url(TAGS_PATH),
            timeout: upstream.probe_timeout(),
        }
    }

    /// タイムアウトを上書きする
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// 上流の状態を取得
    ///
    /// 200 → `Online`、それ以外のステータス → `Error`、
    /// 接続失敗・タイムアウト → `Offline`。
    pub async fn probe(&self) -> BackendStatus {
        let response = match self
            .client
            .get(&self.tags_url)
            .timeout(self.timeout)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                debug!(url = %self.tags_url, error = %e, "Upstream probe failed");
                return BackendStatus::Offline {
                    reason: offline_reason(&e),
                };
            }
        };

        let status = response.status();
        if status != StatusCode::OK {
            debug!(url = %self.tags_url, status = %status, "Upstream probe returned non-200");
            return BackendStatus::Error {
                http_status: status.as_u16(),
            };
        }

        match response.json::<TagsResponse>().await {
            Ok(tags) => BackendStatus::Online {
                models: tags.models,
            },
            Err(e) if e.is_timeout() => BackendStatus::Offline {
                reason: offline_reason(&e),
            },
            Err(e) => {
                warn!(
                    url = %self.tags_url,
                    error = %e,
                    "Upstream returned an unreadable model list; reporting no models"
                );
                BackendStatus::Online { models: Vec::new() }
            }
        }
    }
}

fn offline_reason(error: &reqwest::Error) -> String {
    if error.is_timeout() {
        "Request timed out".to_string()
    } else if error.is_connect() {
        "Connection refused".to_string()
    } else {
        error.to_string()
    }
}
