//! # 型付きウォレットAPI
//!
//! `WalletProvider::request` の上に、このアプリが使うメソッドを型付きで提供する。

use serde::de::DeserializeOwned;

use fabric_crypto::to_prefixed_hex;
use fabric_types::{AddChainParams, BlockHeader, SwitchChainParams, TransactionReceipt, TransactionRequest};

use crate::{WalletError, WalletProvider};

fn parse<T: DeserializeOwned>(method: &str, value: serde_json::Value) -> Result<T, WalletError> {
    serde_json::from_value(value)
        .map_err(|e| WalletError::InvalidResponse(format!("{method}の結果のパースに失敗: {e}")))
}

/// 型付きウォレットAPI。全ての `WalletProvider` で使える。
#[async_trait::async_trait]
pub trait WalletApi: WalletProvider {
    /// `eth_accounts`: 接続済みアカウント一覧（未接続なら空）。
    async fn accounts(&self) -> Result<Vec<String>, WalletError> {
        let value = self.request("eth_accounts", serde_json::json!([])).await?;
        parse("eth_accounts", value)
    }

    /// `eth_requestAccounts`: アカウント接続を要求する。
    async fn request_accounts(&self) -> Result<Vec<String>, WalletError> {
        let value = self
            .request("eth_requestAccounts", serde_json::json!([]))
            .await?;
        parse("eth_requestAccounts", value)
    }

    /// `eth_chainId`
    async fn chain_id(&self) -> Result<String, WalletError> {
        let value = self.request("eth_chainId", serde_json::json!([])).await?;
        parse("eth_chainId", value)
    }

    /// `net_version`
    async fn net_version(&self) -> Result<String, WalletError> {
        let value = self.request("net_version", serde_json::json!([])).await?;
        parse("net_version", value)
    }

    /// `eth_getBlockByNumber("latest", false)`
    async fn latest_block(&self) -> Result<BlockHeader, WalletError> {
        let value = self
            .request("eth_getBlockByNumber", serde_json::json!(["latest", false]))
            .await?;
        parse("eth_getBlockByNumber", value)
    }

    /// 最新ブロックに `baseFeePerGas` があればEIP-1559対応とみなす。
    async fn supports_eip1559(&self) -> Result<bool, WalletError> {
        Ok(self.latest_block().await?.base_fee_per_gas.is_some())
    }

    /// `wallet_addEthereumChain`
    async fn add_chain(&self, params: &AddChainParams) -> Result<(), WalletError> {
        self.request("wallet_addEthereumChain", serde_json::json!([params]))
            .await?;
        Ok(())
    }

    /// `wallet_switchEthereumChain`
    async fn switch_chain(&self, chain_id: &str) -> Result<(), WalletError> {
        let params = SwitchChainParams {
            chain_id: chain_id.to_string(),
        };
        self.request("wallet_switchEthereumChain", serde_json::json!([params]))
            .await?;
        Ok(())
    }

    /// `personal_sign`: UTF-8メッセージをhexで渡し、`0x` 付きhexの署名を返す。
    async fn personal_sign(&self, address: &str, message: &str) -> Result<String, WalletError> {
        let value = self
            .request(
                "personal_sign",
                serde_json::json!([to_prefixed_hex(message.as_bytes()), address]),
            )
            .await?;
        parse("personal_sign", value)
    }

    /// `eth_sendTransaction`: トランザクションハッシュを返す。
    async fn send_transaction(&self, tx: &TransactionRequest) -> Result<String, WalletError> {
        let value = self
            .request("eth_sendTransaction", serde_json::json!([tx]))
            .await?;
        parse("eth_sendTransaction", value)
    }

    /// `eth_getTransactionReceipt`: 未確定なら `None`。
    async fn transaction_receipt(
        &self,
        transaction_hash: &str,
    ) -> Result<Option<TransactionReceipt>, WalletError> {
        let value = self
            .request(
                "eth_getTransactionReceipt",
                serde_json::json!([transaction_hash]),
            )
            .await?;
        parse("eth_getTransactionReceipt", value)
    }
}

impl<T: WalletProvider + ?Sized> WalletApi for T {}
