//! クライアントレジストリ
//!
//! 最近アクセスしたクライアントのIPと最終アクセス時刻をメモリ内で管理する。
//! 全リクエストからの更新と期限切れ掃除が同じロックを取り合う。

pub mod middleware;
pub mod sweeper;

pub use sweeper::ExpirySweeper;

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::RwLock;

/// レジストリ操作のエラー
#[derive(Debug, Error)]
pub enum RegistryError {
    /// 書き込みロックを時間内に取得できなかった
    #[error("Timed out acquiring client registry lock after {0:?}")]
    LockTimeout(Duration),
}

/// クライアント1件分の記録
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientRecord {
    /// クライアントIP
    pub ip: IpAddr,
    /// 最終アクセス時刻
    pub last_seen: DateTime<Utc>,
}

/// クライアントレジストリ
///
/// 内部のマップは外部へ公開せず、参照はすべてコピーで返す。
#[derive(Clone, Default)]
pub struct ClientRegistry {
    clients: Arc<RwLock<HashMap<IpAddr, DateTime<Utc>>>>,
    sweeper_started: Arc<AtomicBool>,
}

impl ClientRegistry {
    /// 新しいレジストリを作成
    pub fn new() -> Self {
        Self::default()
    }

    /// クライアントのアクセスを記録する（現在時刻）
    ///
    /// 時刻はロック取得後に採るため、同一IPへの並行更新でも後勝ちの値が最新になる。
    pub async fn touch(&self, ip: IpAddr) {
        let mut clients = self.clients.write().await;
        clients.insert(ip, Utc::now());
    }

    /// 指定時刻でクライアントのアクセスを記録する
    pub async fn touch_at(&self, ip: IpAddr, seen_at: DateTime<Utc>) {
        let mut clients = self.clients.write().await;
        clients.insert(ip, seen_at);
    }

    /// 現時点のコピーを返す（最終アクセスの新しい順）
    pub async fn snapshot(&self) -> Vec<ClientRecord> {
        let mut records: Vec<ClientRecord> = {
            let clients = self.clients.read().await;
            clients
                .iter()
                .map(|(ip, last_seen)| ClientRecord {
                    ip: *ip,
                    last_seen: *last_seen,
                })
                .collect()
        };
        records.sort_by(|a, b| b.last_seen.cmp(&a.last_seen).then_with(|| a.ip.cmp(&b.ip)));
        records
    }

    /// 記録済みクライアント数
    pub async fn len(&self) -> usize {
        self.clients.read().await.len()
    }

    /// 記録が空か
    pub async fn is_empty(&self) -> bool {
        self.clients.read().await.is_empty()
    }

    /// 指定IPが記録されているか
    pub async fn contains(&self, ip: IpAddr) -> bool {
        self.clients.read().await.contains_key(&ip)
    }

    /// `cutoff` より古い記録を削除し、削除件数を返す
    pub async fn evict_older_than(&self, cutoff: DateTime<Utc>) -> usize {
        let mut clients = self.clients.write().await;
        evict(&mut clients, cutoff)
    }

    /// ロック取得に上限時間を設けた `evict_older_than`
    pub(crate) async fn try_evict_older_than(
        &self,
        cutoff: DateTime<Utc>,
        lock_timeout: Duration,
    ) -> Result<usize, RegistryError> {
        let mut clients = tokio::time::timeout(lock_timeout, self.clients.write())
            .await
            .map_err(|_| RegistryError::LockTimeout(lock_timeout))?;
        Ok(evict(&mut clients, cutoff))
    }

    /// 掃除タスクの起動権を取得する（最初の1回だけ `true`）
    pub(crate) fn claim_sweeper(&self) -> bool {
        self.sweeper_started
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }
}

fn evict(clients: &mut HashMap<IpAddr, DateTime<Utc>>, cutoff: DateTime<Utc>) -> usize {
    let before = clients.len();
    clients.retain(|_, last_seen| *last_seen >= cutoff);
    before - clients.len()
}
