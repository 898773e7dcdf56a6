//! ダッシュボード統計の集約
//!
//! ホストメトリクス、上流プローブ、レジストリのスナップショットを1回の要求ごとに組み立てる。

use crate::registry::ClientRecord;
use crate::AppState;
use chrono::Local;
use pixelbrain_common::types::{
    BackendInfo, BackendStatus, ClientEntry, StatsResponse, SystemInfo, SystemSample,
};

/// 表示用のタイムスタンプ形式（ローカル時刻）
pub const LAST_SEEN_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// 要求スコープの統計スナップショット
#[derive(Debug, Clone)]
pub struct StatsSnapshot {
    /// ホストメトリクス
    pub system: SystemSample,
    /// 上流の状態
    pub backend: BackendStatus,
    /// クライアント一覧（ループバック含む、新しい順）
    pub clients: Vec<ClientRecord>,
}

impl StatsSnapshot {
    /// `/api/stats` のレスポンスへ変換する
    ///
    /// ループバックアドレスは表示から除外する（レジストリには残る）。
    pub fn to_response(&self) -> StatsResponse {
        let clients = self
            .clients
            .iter()
            .filter(|record| !record.ip.is_loopback())
            .map(|record| ClientEntry {
                ip: record.ip.to_string(),
                last_seen: record
                    .last_seen
                    .with_timezone(&Local)
                    .format(LAST_SEEN_FORMAT)
                    .to_string(),
            })
            .collect();

        StatsResponse {
            system: SystemInfo::from(self.system),
            ollama: BackendInfo::from(&self.backend),
            clients,
        }
    }
}

/// 統計を収集する
///
/// メトリクス取得（ブロッキング）と上流プローブは並行に実行する。
pub async fn collect(state: &AppState) -> StatsSnapshot {
    let metrics = state.system_metrics.clone();
    let sample_task = tokio::task::spawn_blocking(move || metrics.sample());

    let (sample, backend, clients) =
        tokio::join!(sample_task, state.prober.probe(), state.clients.snapshot());

    let system = sample.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Host metrics sampling failed; reporting zeros");
        SystemSample::default()
    });

    StatsSnapshot {
        system,
        backend,
        clients,
    }
}
