//! axumサーバー起動・シャットダウンハンドリング

use crate::registry::ExpirySweeper;
use crate::AppState;
use std::future::Future;
use std::net::SocketAddr;
use tracing::{info, warn};

/// axumサーバーを起動し、シャットダウンシグナルを待機する
///
/// 期限切れ掃除タスクもここで1回だけ開始する。
pub async fn run(state: AppState) -> std::io::Result<()> {
    let bind_addr = state.config.server.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!(
        "Dashboard available at {}/dashboard",
        state.config.server.local_base_url()
    );
    serve(listener, state, shutdown_signal()).await
}

/// 既にバインド済みのリスナーでサーバーを動かす
pub async fn serve<F>(
    listener: tokio::net::TcpListener,
    state: AppState,
    shutdown: F,
) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    if state.gate.is_enabled() {
        info!("Dashboard password gate enabled");
    } else {
        warn!(
            "No dashboard password configured; /dashboard is open to anyone who can reach this host"
        );
    }

    let sweeper = ExpirySweeper::new(state.clients.clone(), &state.config.tracking).start();

    let local_addr = listener.local_addr()?;
    info!(
        addr = %local_addr,
        upstream = %state.config.upstream.base_url,
        "PixelBrain server listening"
    );

    let app = crate::api::create_router(state);
    let result = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown)
    .await;

    if let Some(handle) = sweeper {
        handle.abort();
    }

    info!("Server shutdown complete");
    result
}

/// シャットダウンシグナルを待機
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down...");
        }
        _ = terminate => {
            info!("Received SIGTERM, shutting down...");
        }
    }
}
