//! PixelBrain 共通ライブラリ
//!
//! サーバーとCLIで共有する型定義・設定・エラー

#![warn(missing_docs)]

/// 設定構造体
pub mod config;

/// エラー型
pub mod error;

/// IPアドレス正規化
pub mod ip;

/// 共通型定義
pub mod types;
