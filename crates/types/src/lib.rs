//! # Fabric Wallet Bridge 共有型定義
//!
//! ウォレット（JSON-RPC）とContent Fabric（REST）の間でやり取りするデータ構造。
//!
//! ## エンコーディング規則
//! - Hex (`0x`付き): Ethereumアドレス、トランザクションハッシュ、チェーンID
//! - Base58: Fabric ID（`iq__`, `ilib`, `ispc`, `iusr` の後ろ）とアクセストークン本体
//! - Base64: トークンClaim内のバイト列フィールド

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// JSON-RPC 2.0
// ---------------------------------------------------------------------------

/// JSON-RPCリクエスト。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    /// 常に "2.0"
    pub jsonrpc: String,
    /// リクエストID
    pub id: u64,
    /// メソッド名 (例: "eth_accounts")
    pub method: String,
    /// パラメータ（配列）
    pub params: serde_json::Value,
}

impl JsonRpcRequest {
    /// バージョン "2.0" のリクエストを構築する。
    pub fn new(id: u64, method: &str, params: serde_json::Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            method: method.to_string(),
            params,
        }
    }
}

/// JSON-RPCレスポンス。`result` と `error` のどちらか一方が入る。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    /// レスポンスID
    #[serde(default)]
    pub id: serde_json::Value,
    /// 成功時の結果
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    /// 失敗時のエラー
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcErrorObject>,
}

/// JSON-RPCのエラーオブジェクト。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcErrorObject {
    /// エラーコード（4001はユーザー拒否）
    pub code: i64,
    /// エラーメッセージ
    pub message: String,
}

// ---------------------------------------------------------------------------
// Ethereum
// ---------------------------------------------------------------------------

/// `eth_getBlockByNumber` の結果のうち、使用するフィールドのみ。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockHeader {
    /// ブロック番号 (hex)
    #[serde(default)]
    pub number: Option<String>,
    /// EIP-1559のベースフィー。存在すればEIP-1559対応チェーン。
    #[serde(default)]
    pub base_fee_per_gas: Option<String>,
}

/// `eth_sendTransaction` に渡すトランザクション。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionRequest {
    /// 送信元アドレス
    pub from: String,
    /// 宛先コントラクトアドレス
    pub to: String,
    /// ABIエンコード済みの呼び出しデータ (hex)
    pub data: String,
}

/// トランザクションレシート。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionReceipt {
    /// トランザクションハッシュ
    pub transaction_hash: String,
    /// 実行ステータス ("0x1" 成功 / "0x0" 失敗)
    #[serde(default)]
    pub status: Option<String>,
    /// 発行されたイベントログ
    #[serde(default)]
    pub logs: Vec<LogEntry>,
}

/// イベントログ。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    /// ログを発行したコントラクトのアドレス
    pub address: String,
    /// インデックス付きトピック
    #[serde(default)]
    pub topics: Vec<String>,
    /// 非インデックスデータ (hex)
    #[serde(default)]
    pub data: String,
}

/// `wallet_addEthereumChain` のパラメータ (EIP-3085)。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddChainParams {
    /// チェーンID (hex)
    pub chain_id: String,
    /// RPC URL一覧
    pub rpc_urls: Vec<String>,
    /// 表示名
    pub chain_name: String,
    /// ネイティブ通貨
    pub native_currency: NativeCurrency,
    /// ブロックエクスプローラー（なければnull）
    pub block_explorer_urls: Option<Vec<String>>,
}

/// チェーンのネイティブ通貨。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NativeCurrency {
    /// 通貨名
    pub name: String,
    /// 小数桁数
    pub decimals: u8,
    /// シンボル
    pub symbol: String,
}

/// `wallet_switchEthereumChain` のパラメータ (EIP-3326)。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwitchChainParams {
    /// 切り替え先のチェーンID (hex)
    pub chain_id: String,
}

// ---------------------------------------------------------------------------
// Content Fabric
// ---------------------------------------------------------------------------

/// ネットワークの `/config` エンドポイントが返す設定ドキュメント。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfigDocument {
    /// Content Space情報
    pub qspace: QSpaceInfo,
    /// シードノード情報
    pub network: NetworkSeeds,
}

/// Content Space情報。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QSpaceInfo {
    /// Content Space ID (`ispc...`)
    pub id: String,
}

/// ネットワークのシードノード。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkSeeds {
    /// 各APIのエンドポイント一覧
    pub seed_nodes: SeedNodes,
}

/// API別のシードノードURI。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedNodes {
    /// Fabric REST API
    #[serde(default)]
    pub fabric_api: Vec<String>,
    /// Ethereum JSON-RPC API
    #[serde(default)]
    pub ethereum_api: Vec<String>,
}

/// `GET /qlibs/{lib}/q/{obj}` のレスポンス。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentObjectResponse {
    /// オブジェクトID
    pub id: String,
    /// 最新バージョンハッシュ (`hq__...`)
    pub hash: String,
    /// コンテンツタイプのバージョンハッシュ（未設定なら空）
    #[serde(default, rename = "type")]
    pub content_type: String,
}

/// `POST /qlibs/{lib}/q/{obj}` (edit) のレスポンス。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditResponse {
    /// オブジェクトID
    #[serde(default)]
    pub id: String,
    /// 書き込みトークン (`tqw__...`)
    pub write_token: String,
}

/// アップロード対象ファイルのメタ情報。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileInfo {
    /// オブジェクト内のパス
    pub path: String,
    /// MIMEタイプ
    pub mime_type: String,
    /// バイト数
    pub size: u64,
}

/// ファイルジョブ作成リクエスト。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileJobRequest {
    /// 暗号化方式 ("none" | "cgck")
    pub encryption: String,
    /// 追加操作の一覧
    pub ops: Vec<FileJobOp>,
}

/// ファイルジョブの個別操作。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileJobOp {
    /// 操作種別 ("add")
    pub op: String,
    /// オブジェクト内のパス
    pub path: String,
    /// エントリ種別 ("file")
    #[serde(rename = "type")]
    pub entry_type: String,
    /// MIMEタイプ
    pub mime_type: String,
    /// バイト数
    pub size: u64,
}

/// ファイルジョブ作成レスポンス。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileJobResponse {
    /// アップロードID
    pub id: String,
    /// ジョブID一覧
    pub jobs: Vec<String>,
}

/// ジョブごとのアップロード範囲。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadJobInfo {
    /// このジョブで送るファイル範囲
    pub files: Vec<UploadJobFile>,
}

/// ジョブ内の1ファイル範囲。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadJobFile {
    /// オブジェクト内のパス
    pub path: String,
    /// 開始オフセット
    pub off: u64,
    /// 長さ
    pub len: u64,
}

/// ファイルごとのアップロード進捗。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileProgress {
    /// 送信済みバイト数
    pub uploaded: u64,
    /// 総バイト数
    pub total: u64,
}

/// ファイル名 → 進捗。ファイル名順に並ぶ。
pub type UploadProgress = BTreeMap<String, FileProgress>;

/// Content Objectの要約情報。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectInfo {
    /// オブジェクトID
    pub object_id: String,
    /// 最新バージョンハッシュ
    pub latest_hash: String,
    /// コンテンツタイプ
    #[serde(rename = "type")]
    pub content_type: String,
    /// メタデータ
    pub metadata: serde_json::Value,
}
