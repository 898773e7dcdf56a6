//! 共通型定義
//!
//! BackendStatus, SystemSample, StatsResponse等のコアデータ型

use serde::{Deserialize, Serialize};

const BYTES_PER_GIB: f64 = 1024.0 * 1024.0 * 1024.0;

/// Ollamaのモデル情報（`GET /api/tags` の要素）
///
/// ダッシュボードへはそのまま返すため、未知のフィールドも保持する。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModelDescriptor {
    /// モデル名（例: "llama3:8b"）
    pub name: String,
    /// モデルサイズ（バイト）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    /// ダイジェスト
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,
    /// 最終更新日時（Ollamaの表記のまま）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_at: Option<String>,
    /// その他のフィールド
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// `GET /api/tags` のレスポンス
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TagsResponse {
    /// モデル一覧
    #[serde(default)]
    pub models: Vec<ModelDescriptor>,
}

/// 上流（Ollama）の稼働状態
///
/// 統計要求ごとに新しく生成し、キャッシュしない。
#[derive(Debug, Clone, PartialEq)]
pub enum BackendStatus {
    /// 応答あり（モデル一覧付き）
    Online {
        /// 利用可能なモデル
        models: Vec<ModelDescriptor>,
    },
    /// 接続不可・タイムアウト
    Offline {
        /// 理由
        reason: String,
    },
    /// 200以外のステータスが返った
    Error {
        /// HTTPステータスコード
        http_status: u16,
    },
}

impl BackendStatus {
    /// ステータス文字列（"online" / "offline" / "error"）
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Online { .. } => "online",
            Self::Offline { .. } => "offline",
            Self::Error { .. } => "error",
        }
    }
}

/// `/api/stats` の `ollama` フィールド
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BackendInfo {
    /// "online" / "offline" / "error"
    pub status: String,
    /// オンライン時のモデル一覧
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub models: Option<Vec<ModelDescriptor>>,
    /// オフライン・エラー時のメッセージ
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl From<&BackendStatus> for BackendInfo {
    fn from(status: &BackendStatus) -> Self {
        let (models, message) = match status {
            BackendStatus::Online { models } => (Some(models.clone()), None),
            BackendStatus::Offline { reason } => (None, Some(reason.clone())),
            BackendStatus::Error { http_status } => {
                (None, Some(format!("Status code: {}", http_status)))
            }
        };
        Self {
            status: status.as_str().to_string(),
            models,
            message,
        }
    }
}

/// ホストメトリクスの瞬間値
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SystemSample {
    /// CPU使用率（0.0-100.0）
    pub cpu_percent: f32,
    /// メモリ使用率（0.0-100.0）
    pub ram_percent: f32,
    /// 使用中メモリ（バイト）
    pub ram_used_bytes: u64,
    /// 総メモリ（バイト）
    pub ram_total_bytes: u64,
}

/// `/api/stats` の `system` フィールド
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SystemInfo {
    /// CPU使用率
    pub cpu: f32,
    /// メモリ使用率
    pub ram_percent: f32,
    /// 使用中メモリ（GiB、小数第2位）
    pub ram_used_gb: f64,
    /// 総メモリ（GiB、小数第2位）
    pub ram_total_gb: f64,
}

fn bytes_to_gib(bytes: u64) -> f64 {
    (bytes as f64 / BYTES_PER_GIB * 100.0).round() / 100.0
}

impl From<SystemSample> for SystemInfo {
    fn from(sample: SystemSample) -> Self {
        Self {
            cpu: sample.cpu_percent,
            ram_percent: sample.ram_percent,
            ram_used_gb: bytes_to_gib(sample.ram_used_bytes),
            ram_total_gb: bytes_to_gib(sample.ram_total_bytes),
        }
    }
}

/// `/api/stats` のクライアント表示行
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClientEntry {
    /// クライアントIP
    pub ip: String,
    /// 最終アクセス（ローカル時刻 `%Y-%m-%d %H:%M:%S`）
    pub last_seen: String,
}

/// `GET /api/stats` レスポンス
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StatsResponse {
    /// ホストメトリクス
    pub system: SystemInfo,
    /// Ollamaの状態
    pub ollama: BackendInfo,
    /// 最近アクセスしたクライアント
    pub clients: Vec<ClientEntry>,
}

/// `GET /api/health` レスポンス
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HealthResponse {
    /// 常に "ok"
    pub status: String,
    /// メッセージ
    pub message: String,
}
