//! # Content Fabric クライアント
//!
//! ## 構成
//! - [`config`]: ネットワーク名からの設定取得
//! - [`contracts`]: ウォレット経由のコントラクト呼び出し（オブジェクト作成、updateRequest）
//! - [`api`]: Fabric REST API（オブジェクト情報、編集、アップロード）
//! - [`upload`]: アップロード対象ファイルと進捗表示

pub mod api;
pub mod config;
pub mod contracts;
pub mod error;
pub mod upload;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use api::{FabricApi, HttpFabricClient};
pub use config::FabricConfig;
pub use contracts::{ContentContracts, CreatedObject, UpdateRequestResult};
pub use error::FabricError;
pub use upload::{format_progress, load_files, ProgressCallback, UploadFile};
