// 認証モジュール
//
// ダッシュボード用の共有パスワードとメモリ内セッション

/// ダッシュボード保護ミドルウェア
pub mod middleware;

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// セッションCookie名
pub const SESSION_COOKIE: &str = "pixelbrain_session";

/// セッションの有効期間（秒）
pub const SESSION_TTL_SECS: i64 = 12 * 60 * 60;

const SESSION_TOKEN_LEN: usize = 48;

/// セッションCookieヘッダーを生成
pub fn build_session_cookie(token: &str, max_age_secs: i64) -> String {
    format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        SESSION_COOKIE, token, max_age_secs
    )
}

/// セッションCookieを削除するためのヘッダーを生成
pub fn clear_session_cookie() -> String {
    format!(
        "{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0; Expires=Thu, 01 Jan 1970 00:00:00 GMT",
        SESSION_COOKIE
    )
}

/// ランダムトークン生成
pub fn generate_random_token(length: usize) -> String {
    use rand::Rng;
    const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
    let mut rng = rand::thread_rng();
    (0..length)
        .map(|_| {
            let idx = rng.gen_range(0..CHARSET.len());
            CHARSET[idx] as char
        })
        .collect()
}

/// 共有パスワードによるダッシュボードゲート
///
/// パスワード自体は保持せず、SHA-256ダイジェストのみを保持する。
#[derive(Clone)]
pub struct DashboardGate {
    digest: Option<[u8; 32]>,
}

impl DashboardGate {
    /// ゲートを作成（`None` なら常に開放）
    pub fn new(password: Option<&str>) -> Self {
        Self {
            digest: password.map(digest),
        }
    }

    /// パスワード保護が有効か
    pub fn is_enabled(&self) -> bool {
        self.digest.is_some()
    }

    /// 入力されたパスワードを検証する
    pub fn verify(&self, candidate: &str) -> bool {
        match &self.digest {
            Some(expected) => {
                let actual = digest(candidate);
                // 長さ固定のダイジェスト同士を全バイト比較する
                expected
                    .iter()
                    .zip(actual.iter())
                    .fold(0u8, |acc, (a, b)| acc | (a ^ b))
                    == 0
            }
            None => true,
        }
    }
}

fn digest(value: &str) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(value.as_bytes());
    hasher.finalize().into()
}

/// メモリ内セッションストア
///
/// 再起動でセッションは失われる。
#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<String, DateTime<Utc>>>>,
    ttl: ChronoDuration,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(ChronoDuration::seconds(SESSION_TTL_SECS))
    }
}

impl SessionStore {
    /// 新しいストアを作成
    pub fn new(ttl: ChronoDuration) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    /// セッションの有効期間（秒）
    pub fn ttl_secs(&self) -> i64 {
        self.ttl.num_seconds()
    }

    /// 新しいセッションを発行し、トークンを返す
    pub async fn create(&self) -> String {
        let token = generate_random_token(SESSION_TOKEN_LEN);
        let expires_at = Utc::now() + self.ttl;
        let mut sessions = self.sessions.write().await;
        let now = Utc::now();
        sessions.retain(|_, expiry| *expiry > now);
        sessions.insert(token.clone(), expires_at);
        token
    }

    /// トークンが有効か
    pub async fn is_valid(&self, token: &str) -> bool {
        let sessions = self.sessions.read().await;
        sessions
            .get(token)
            .map(|expiry| *expiry > Utc::now())
            .unwrap_or(false)
    }

    /// セッションを破棄する
    pub async fn revoke(&self, token: &str) {
        self.sessions.write().await.remove(token);
    }
}
