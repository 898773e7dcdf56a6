//! クライアント追跡ミドルウェア
//!
//! ルーティング前に呼び出し元のIPをレジストリへ記録する。
//! 静的アセットは追跡しない。APIパス（`/api/generate` 等）は追跡対象。

use crate::AppState;
use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{HeaderMap, Request},
    middleware::Next,
    response::Response,
};
use pixelbrain_common::ip::{normalize_socket_ip, parse_forwarded_for};
use std::net::{IpAddr, SocketAddr};

/// 追跡対象外のパスか
fn should_skip(path: &str) -> bool {
    path == "/static" || path.starts_with("/static/") || path == "/favicon.ico"
}

/// 呼び出し元IPを決定する
///
/// `trust_proxy_headers` が有効なときだけ `X-Forwarded-For` を参照する。
fn client_ip(
    headers: &HeaderMap,
    connect_info: Option<&ConnectInfo<SocketAddr>>,
    trust_proxy_headers: bool,
) -> Option<IpAddr> {
    if trust_proxy_headers {
        let forwarded = headers
            .get("x-forwarded-for")
            .and_then(|value| value.to_str().ok())
            .and_then(parse_forwarded_for);
        if forwarded.is_some() {
            return forwarded;
        }
    }
    connect_info.map(|ConnectInfo(addr)| normalize_socket_ip(addr))
}

/// 呼び出し元を記録するミドルウェア
pub async fn track_client(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if !should_skip(request.uri().path()) {
        let ip = client_ip(
            request.headers(),
            request.extensions().get::<ConnectInfo<SocketAddr>>(),
            state.config.tracking.trust_proxy_headers,
        );
        match ip {
            Some(ip) => state.clients.touch(ip).await,
            None => tracing::trace!(
                path = %request.uri().path(),
                "No peer address available; request not tracked"
            ),
        }
    }

    next.run(request).await
}
