//! serve サブコマンド
//!
//! サーバーを起動します。未指定の項目は環境変数の設定を使います。

use crate::config::AppConfig;
use clap::Args;

/// serve サブコマンドの引数
#[derive(Args, Debug, Clone, Default)]
pub struct ServeArgs {
    /// Listen port
    #[arg(short, long, env = "PIXELBRAIN_PORT")]
    pub port: Option<u16>,

    /// Bind address
    #[arg(short = 'H', long, env = "PIXELBRAIN_HOST")]
    pub host: Option<String>,

    /// Ollama base URL
    #[arg(long, env = "PIXELBRAIN_OLLAMA_URL")]
    pub ollama_url: Option<String>,
}

impl ServeArgs {
    /// 引数で指定された値を設定へ反映する
    pub fn apply(&self, config: &mut AppConfig) {
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(host) = &self.host {
            config.server.host = host.clone();
        }
        if let Some(url) = &self.ollama_url {
            config.upstream.base_url = url.clone();
        }
    }
}
