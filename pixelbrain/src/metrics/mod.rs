//! ホストメトリクス収集
//!
//! CPU/メモリ使用率をsysinfoで取得する。
//! 値は不透明なスカラーとして扱い、ハンドラからはトレイト越しに参照する。

use pixelbrain_common::types::SystemSample;
use std::sync::Mutex;
use sysinfo::System;

/// ホストメトリクスの提供元
pub trait SystemMetricsProvider: Send + Sync {
    /// 現在のCPU/メモリ使用状況を取得
    ///
    /// 同期的にOSへ問い合わせるため、非同期コンテキストからは
    /// `spawn_blocking` 経由で呼び出すこと。
    fn sample(&self) -> SystemSample;
}

/// sysinfoによるメトリクス収集
pub struct SysinfoMetrics {
    system: Mutex<System>,
}

impl SysinfoMetrics {
    /// 新しいコレクターを作成
    pub fn new() -> Self {
        let mut system = System::new();
        // CPU使用率は前回リフレッシュとの差分で計算されるため、先に1回読んでおく
        system.refresh_cpu_usage();
        system.refresh_memory();
        Self {
            system: Mutex::new(system),
        }
    }
}

impl Default for SysinfoMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemMetricsProvider for SysinfoMetrics {
    fn sample(&self) -> SystemSample {
        let mut system = match self.system.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        system.refresh_cpu_usage();
        system.refresh_memory();

        let total = system.total_memory();
        let used = system.used_memory();
        let ram_percent = if total == 0 {
            0.0
        } else {
            (used as f64 / total as f64 * 100.0) as f32
        };

        SystemSample {
            cpu_percent: system.global_cpu_usage(),
            ram_percent,
            ram_used_bytes: used,
            ram_total_bytes: total,
        }
    }
}

/// 固定値を返すメトリクス（テスト用）
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedMetrics(pub SystemSample);

impl SystemMetricsProvider for FixedMetrics {
    fn sample(&self) -> SystemSample {
        self.0
    }
}
