use std::collections::VecDeque;
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::{Body, Bytes},
    http::header,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use futures::stream;
use serde_json::json;

use super::http::{spawn_server, TestServer};

/// モック上流が送出する1ステップ
#[allow(dead_code)]
#[derive(Debug, Clone)]
pub enum Step {
    /// 指定時間待ってからチャンクを送る
    Chunk(Duration, &'static str),
    /// 指定時間待ってから接続を異常終了させる
    Fail(Duration),
}

/// ボディが破棄されたことを記録するガード
struct DropFlag(Arc<AtomicBool>);

impl Drop for DropFlag {
    fn drop(&mut self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

fn scripted_body(steps: Vec<Step>, dropped: Arc<AtomicBool>) -> Body {
    let state = (VecDeque::from(steps), DropFlag(dropped));
    let stream = stream::unfold(state, |(mut steps, flag)| async move {
        match steps.pop_front()? {
            Step::Chunk(delay, text) => {
                tokio::time::sleep(delay).await;
                Some((Ok::<_, io::Error>(Bytes::from_static(text.as_bytes())), (steps, flag)))
            }
            Step::Fail(delay) => {
                tokio::time::sleep(delay).await;
                steps.clear();
                Some((Err(io::Error::other("mock upstream failure")), (steps, flag)))
            }
        }
    });
    Body::from_stream(stream)
}

/// 台本どおりに `/api/generate` をストリーミングするOllamaモック
///
/// 戻り値のフラグはモック側のレスポンスボディが破棄されると `true` になる。
#[allow(dead_code)]
pub async fn spawn_scripted_ollama(
    steps: Vec<Step>,
    content_type: &'static str,
) -> (TestServer, Arc<AtomicBool>) {
    let dropped = Arc::new(AtomicBool::new(false));
    let flag = dropped.clone();

    let generate = move || {
        let steps = steps.clone();
        let flag = flag.clone();
        async move {
            Response::builder()
                .header(header::CONTENT_TYPE, content_type)
                .body(scripted_body(steps, flag))
                .unwrap()
        }
    };

    async fn tags() -> impl IntoResponse {
        Json(json!({
            "models": [
                { "name": "llama3:8b", "size": 4_000_000_000i64 }
            ]
        }))
    }

    let app = Router::new()
        .route("/api/generate", post(generate))
        .route("/api/tags", get(tags));

    (spawn_server(app).await, dropped)
}
