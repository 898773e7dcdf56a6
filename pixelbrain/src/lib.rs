//! PixelBrain control plane
//!
//! ローカルのOllamaサーバーの前段に立ち、生成リクエストをストリーミング中継しつつ
//! ホスト負荷・上流の稼働状態・最近のクライアントを表示するダッシュボードを提供する。

#![warn(missing_docs)]

/// REST APIハンドラー・ページ
pub mod api;

/// ダッシュボードのパスワードゲート
pub mod auth;

/// CLIインターフェース
pub mod cli;

/// 設定管理（環境変数ヘルパー）
pub mod config;

/// 上流ヘルスプローブ
pub mod health;

/// ロギング初期化ユーティリティ
pub mod logging;

/// ホストメトリクス収集
pub mod metrics;

/// クライアントレジストリと期限切れ掃除
pub mod registry;

/// サーバー起動
pub mod server;

/// ダッシュボード統計の集約
pub mod stats;

use std::sync::Arc;

/// アプリケーション状態
#[derive(Clone)]
pub struct AppState {
    /// 設定
    pub config: Arc<config::AppConfig>,
    /// 共有HTTPクライアント（接続プーリング有効）
    pub http_client: reqwest::Client,
    /// クライアントレジストリ
    pub clients: registry::ClientRegistry,
    /// 上流ヘルスプローブ
    pub prober: health::BackendProber,
    /// ホストメトリクス
    pub system_metrics: Arc<dyn metrics::SystemMetricsProvider>,
    /// ダッシュボードセッション
    pub sessions: auth::SessionStore,
    /// ダッシュボードのパスワードゲート
    pub gate: auth::DashboardGate,
}

impl AppState {
    /// 設定からアプリケーション状態を組み立てる
    pub fn new(
        config: config::AppConfig,
        system_metrics: Arc<dyn metrics::SystemMetricsProvider>,
    ) -> Result<Self, reqwest::Error> {
        let http_client = reqwest::Client::builder()
            .connect_timeout(config.upstream.connect_timeout())
            .build()?;
        let prober = health::BackendProber::new(http_client.clone(), &config.upstream);
        let gate = auth::DashboardGate::new(config.dashboard_password.as_deref());

        Ok(Self {
            config: Arc::new(config),
            http_client,
            clients: registry::ClientRegistry::new(),
            prober,
            system_metrics,
            sessions: auth::SessionStore::default(),
            gate,
        })
    }
}
