//! # Fabric Wallet Bridge ウォレット
//!
//! EIP-1193相当の `request(method, params)` インターフェースでウォレットと通信する。
//!
//! ## 構成
//! - [`provider`]: `WalletProvider` トレイトとHTTP JSON-RPC実装
//! - [`api`]: よく使うメソッドの型付きラッパー
//! - [`signer`]: `personal_sign` によるトークン署名者
//! - [`events`]: チェーン・アカウント変更イベントの配信
//! - [`chain`]: デモ用チェーン定義

pub mod api;
pub mod chain;
pub mod error;
pub mod events;
pub mod provider;
pub mod signer;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use api::WalletApi;
pub use error::WalletError;
pub use events::{EventDispatcher, WalletEvent, WalletWatcher};
pub use provider::{HttpWalletProvider, WalletProvider};
pub use signer::WalletSigner;
