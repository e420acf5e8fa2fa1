//! # ウォレットプロバイダ
//!
//! ブラウザ拡張の `window.ethereum.request` に相当する抽象。
//! HTTP実装はJSON-RPC 2.0でノードまたは署名サービスに中継する。

use std::sync::atomic::{AtomicU64, Ordering};

use fabric_types::{JsonRpcRequest, JsonRpcResponse};

use crate::WalletError;

/// EIP-1193相当のウォレットプロバイダ。
#[async_trait::async_trait]
pub trait WalletProvider: Send + Sync {
    /// `method` を `params`（JSON配列）付きで呼び出し、`result` を返す。
    async fn request(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> Result<serde_json::Value, WalletError>;
}

/// HTTP JSON-RPCによるウォレットプロバイダ。
pub struct HttpWalletProvider {
    /// JSON-RPCエンドポイント
    rpc_url: String,
    /// HTTPクライアント
    http_client: reqwest::Client,
    /// 次のリクエストID
    next_id: AtomicU64,
}

impl HttpWalletProvider {
    /// エンドポイントURLから構築する。
    pub fn new(rpc_url: &str) -> Self {
        Self::with_client(rpc_url, reqwest::Client::new())
    }

    /// HTTPクライアントを指定して構築する。
    pub fn with_client(rpc_url: &str, http_client: reqwest::Client) -> Self {
        Self {
            rpc_url: rpc_url.to_string(),
            http_client,
            next_id: AtomicU64::new(1),
        }
    }

    /// 接続先URL。
    pub fn rpc_url(&self) -> &str {
        &self.rpc_url
    }
}

#[async_trait::async_trait]
impl WalletProvider for HttpWalletProvider {
    async fn request(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> Result<serde_json::Value, WalletError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let request = JsonRpcRequest::new(id, method, params);
        tracing::debug!(method, id, "JSON-RPCリクエストを送信");

        let response = self
            .http_client
            .post(&self.rpc_url)
            .json(&request)
            .send()
            .await
            .map_err(|e| WalletError::Transport(format!("HTTP送信失敗: {e}")))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| WalletError::Transport(format!("レスポンス読み取り失敗: {e}")))?;

        if !status.is_success() {
            return Err(WalletError::Transport(format!("HTTP {status} - {body}")));
        }

        let rpc: JsonRpcResponse = serde_json::from_str(&body)
            .map_err(|e| WalletError::InvalidResponse(format!("JSON-RPCレスポンスのパースに失敗: {e}")))?;

        if let Some(error) = rpc.error {
            tracing::warn!(method, code = error.code, message = %error.message, "JSON-RPCエラー");
            return Err(WalletError::Rpc {
                code: error.code,
                message: error.message,
            });
        }

        Ok(rpc.result.unwrap_or(serde_json::Value::Null))
    }
}
