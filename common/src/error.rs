//! エラー型定義
//!
//! 統一エラー型（thiserror使用）

use thiserror::Error;

/// Common layer error type
#[derive(Debug, Error)]
pub enum CommonError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Common layer result type
pub type CommonResult<T> = Result<T, CommonError>;

/// エラーメッセージに含める上流レスポンス本文の最大文字数
pub const MAX_UPSTREAM_BODY_CHARS: usize = 512;

/// プロキシ層のエラー型
///
/// いずれも呼び出し元へ何も送信していない段階でのみ応答に変換される。
/// ストリーム送信開始後の失敗はストリームの打ち切りでしか表現できない。
#[derive(Debug, Error)]
pub enum ProxyError {
    /// 上流へ接続できない（接続拒否・タイムアウト）
    #[error("Upstream unreachable: {0}")]
    UpstreamUnreachable(String),

    /// 上流が2xx以外を返した
    #[error("Upstream returned status {status}: {body}")]
    UpstreamError {
        /// HTTPステータスコード
        status: u16,
        /// レスポンス本文（切り詰め済み）
        body: String,
    },

    /// 上流のストリームが途中で切断された
    #[error("Upstream stream interrupted: {0}")]
    TransportInterrupted(String),

    /// 上流のレスポンスを解釈できない
    #[error("Invalid upstream response: {0}")]
    InvalidUpstreamResponse(String),
}

impl ProxyError {
    /// 本文を切り詰めて `UpstreamError` を作る
    pub fn upstream_error(status: u16, body: &str) -> Self {
        let body = body.trim();
        let body = match body.char_indices().nth(MAX_UPSTREAM_BODY_CHARS) {
            Some((idx, _)) => format!("{}...", &body[..idx]),
            None => body.to_string(),
        };
        Self::UpstreamError { status, body }
    }
}
