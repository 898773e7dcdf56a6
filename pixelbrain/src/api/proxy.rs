//! Ollama API proxy
//!
//! `/api/generate` はレスポンスをバッファせずにチャンク単位で中継する。
//! `/api/tags` は同期的に取得してそのまま返す。

use crate::api::error::AppError;
use crate::health::TAGS_PATH;
use crate::AppState;
use axum::{
    body::{Body, Bytes},
    extract::State,
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use futures::{Stream, StreamExt};
use pixelbrain_common::error::{ProxyError, MAX_UPSTREAM_BODY_CHARS};
use std::fmt::Display;
use std::io;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, warn};

/// 上流の生成エンドポイント
pub const GENERATE_PATH: &str = "/api/generate";

type ChunkSender = mpsc::Sender<Result<Bytes, io::Error>>;

/// POST /api/generate - 生成リクエストの中継
pub async fn proxy_generate(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, AppError> {
    let url = state.config.upstream.url(GENERATE_PATH);
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .cloned()
        .unwrap_or_else(|| HeaderValue::from_static("application/json"));

    debug!(url = %url, bytes = body.len(), "Forwarding generate request");

    let response = state
        .http_client
        .post(&url)
        .header(header::CONTENT_TYPE, content_type)
        .body(body)
        .send()
        .await
        .map_err(|e| ProxyError::UpstreamUnreachable(e.to_string()))?;

    let response = ensure_success(response).await?;
    let buffer = state.config.upstream.stream_buffer_chunks;
    Ok(forward_streaming_response(response, buffer).await?)
}

/// GET /api/tags - モデル一覧の中継
pub async fn proxy_tags(State(state): State<AppState>) -> Result<Response, AppError> {
    let url = state.config.upstream.url(TAGS_PATH);

    let response = state
        .http_client
        .get(&url)
        .send()
        .await
        .map_err(|e| ProxyError::UpstreamUnreachable(e.to_string()))?;

    let response = ensure_success(response).await?;
    let tags: serde_json::Value = response
        .json()
        .await
        .map_err(|e| ProxyError::InvalidUpstreamResponse(e.to_string()))?;

    Ok(Json(tags).into_response())
}

/// 2xx以外なら本文を読んで `UpstreamError` にする
async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, ProxyError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = read_error_body(Box::pin(response.bytes_stream())).await;
    Err(ProxyError::upstream_error(status.as_u16(), &body))
}

/// エラー本文を上限バイト数まで読む
///
/// UTF-8の1文字は最大4バイトなので、切り詰め後の文字数分は必ず読める。
async fn read_error_body<S, E>(mut body: S) -> String
where
    S: Stream<Item = Result<Bytes, E>> + Unpin,
{
    let limit = MAX_UPSTREAM_BODY_CHARS * 4;
    let mut buf = Vec::new();
    while buf.len() < limit {
        match body.next().await {
            Some(Ok(chunk)) => buf.extend_from_slice(&chunk),
            _ => break,
        }
    }
    buf.truncate(limit);
    String::from_utf8_lossy(&buf).into_owned()
}

/// 上流レスポンスをストリーミングで返す
///
/// 最初のチャンクが届くまでは応答を確定しないため、それまでの失敗は
/// エラーレスポンスにできる。以降の失敗はストリームの中断になる。
pub(crate) async fn forward_streaming_response(
    response: reqwest::Response,
    buffer_chunks: usize,
) -> Result<Response, ProxyError> {
    let status = StatusCode::from_u16(response.status().as_u16()).unwrap_or(StatusCode::OK);
    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|value| HeaderValue::from_bytes(value.as_bytes()).ok())
        .unwrap_or_else(|| HeaderValue::from_static("application/json"));

    let mut upstream = Box::pin(response.bytes_stream());
    let first = loop {
        match upstream.next().await {
            Some(Ok(chunk)) if chunk.is_empty() => continue,
            Some(Ok(chunk)) => break Some(chunk),
            Some(Err(e)) => return Err(ProxyError::TransportInterrupted(e.to_string())),
            None => break None,
        }
    };

    let (tx, rx) = mpsc::channel(buffer_chunks.max(1));
    tokio::spawn(pump_upstream(upstream, first, tx));

    let mut axum_response = Response::new(Body::from_stream(ReceiverStream::new(rx)));
    *axum_response.status_mut() = status;
    axum_response
        .headers_mut()
        .insert(header::CONTENT_TYPE, content_type);
    Ok(axum_response)
}

/// 上流のチャンクを有界チャネルへ流し込む
///
/// 呼び出し元が切断したら上流のストリームを破棄して接続を閉じる。
/// 上流が途中で失敗した場合はエラーを流して応答を打ち切らせる。
async fn pump_upstream<S, E>(mut upstream: S, first: Option<Bytes>, tx: ChunkSender)
where
    S: Stream<Item = Result<Bytes, E>> + Unpin,
    E: Display,
{
    if let Some(chunk) = first {
        if tx.send(Ok(chunk)).await.is_err() {
            debug!("Downstream closed before first chunk was delivered");
            return;
        }
    }

    loop {
        tokio::select! {
            biased;
            _ = tx.closed() => {
                debug!("Downstream disconnected; cancelling upstream stream");
                return;
            }
            next = upstream.next() => match next {
                Some(Ok(chunk)) => {
                    if chunk.is_empty() {
                        continue;
                    }
                    if tx.send(Ok(chunk)).await.is_err() {
                        debug!("Downstream disconnected; cancelling upstream stream");
                        return;
                    }
                }
                Some(Err(e)) => {
                    let err = ProxyError::TransportInterrupted(e.to_string());
                    warn!(error = %err, "Terminating response stream");
                    let _ = tx.send(Err(io::Error::other(err))).await;
                    return;
                }
                None => return,
            }
        }
    }
}
