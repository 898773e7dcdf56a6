//! 期限切れクライアントの掃除タスク
//!
//! プロセス起動時に1回だけ開始し、プロセス終了まで動き続ける。
//! 1回分の失敗はログに残して次の周期で再試行する。

use super::{ClientRegistry, RegistryError};
use chrono::{DateTime, Utc};
use pixelbrain_common::config::ClientTrackingConfig;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, error, info, trace, warn};

/// ロック取得待ちの上限（秒）
const DEFAULT_LOCK_TIMEOUT_SECS: u64 = 5;

/// 異常終了後に再起動するまでの待ち時間
const RESTART_BACKOFF: Duration = Duration::from_secs(1);

/// 掃除間隔の下限（0は `interval_at` がパニックする）
const MIN_SWEEP_INTERVAL: Duration = Duration::from_secs(1);

/// 破棄時にタスクを止めるハンドル
struct AbortOnDrop(JoinHandle<()>);

impl Drop for AbortOnDrop {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// 期限切れ掃除タスク
#[derive(Clone)]
pub struct ExpirySweeper {
    registry: ClientRegistry,
    retention: Duration,
    interval: Duration,
    lock_timeout: Duration,
}

impl ExpirySweeper {
    /// 新しい掃除タスクを作成
    ///
    /// 掃除間隔が下限未満なら下限に切り上げる。
    pub fn new(registry: ClientRegistry, config: &ClientTrackingConfig) -> Self {
        let mut interval = config.sweep_interval();
        if interval < MIN_SWEEP_INTERVAL {
            warn!(
                configured_secs = config.sweep_interval_secs,
                "Client sweep interval too small; using {}s",
                MIN_SWEEP_INTERVAL.as_secs()
            );
            interval = MIN_SWEEP_INTERVAL;
        }
        Self {
            registry,
            retention: config.retention(),
            interval,
            lock_timeout: Duration::from_secs(DEFAULT_LOCK_TIMEOUT_SECS),
        }
    }

    /// ロック取得待ちの上限を設定
    pub fn with_lock_timeout(mut self, lock_timeout: Duration) -> Self {
        self.lock_timeout = lock_timeout;
        self
    }

    /// 現在時刻における削除境界
    fn cutoff(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let retention = chrono::Duration::from_std(self.retention)
            .unwrap_or_else(|_| chrono::Duration::days(365 * 100));
        now.checked_sub_signed(retention)
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    /// 1回分の掃除を実行し、削除件数を返す
    pub async fn sweep_once(&self) -> Result<usize, RegistryError> {
        let cutoff = self.cutoff(Utc::now());
        self.registry
            .try_evict_older_than(cutoff, self.lock_timeout)
            .await
    }

    /// バックグラウンドで掃除を開始
    ///
    /// 同じレジストリに対しては最初の呼び出しだけが有効で、
    /// 2回目以降は `None` を返す。
    pub fn start(self) -> Option<JoinHandle<()>> {
        if !self.registry.claim_sweeper() {
            warn!("Client expiry sweeper already running; ignoring second start");
            return None;
        }
        Some(tokio::spawn(self.supervise()))
    }

    /// 掃除ループを監視し、パニックした場合は再起動する
    ///
    /// 監視タスクをabortすると実行中のループも止まる。
    async fn supervise(self) {
        loop {
            let mut worker = AbortOnDrop(tokio::spawn(self.clone().run()));
            match (&mut worker.0).await {
                Ok(()) => {
                    warn!("Client expiry sweeper loop exited unexpectedly; restarting");
                }
                Err(e) if e.is_cancelled() => {
                    info!("Client expiry sweeper cancelled");
                    return;
                }
                Err(e) => {
                    error!(error = %e, "Client expiry sweeper crashed; restarting");
                }
            }
            tokio::time::sleep(RESTART_BACKOFF).await;
        }
    }

    /// 掃除ループ
    async fn run(self) {
        let mut timer = interval_at(Instant::now() + self.interval, self.interval);
        timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(
            interval_secs = self.interval.as_secs(),
            retention_secs = self.retention.as_secs(),
            "Client expiry sweeper started"
        );

        loop {
            timer.tick().await;

            match self.sweep_once().await {
                Ok(0) => trace!("Client sweep found nothing to evict"),
                Ok(removed) => debug!(removed, "Evicted stale clients"),
                Err(e) => warn!(error = %e, "Client sweep skipped; retrying next tick"),
            }
        }
    }
}
