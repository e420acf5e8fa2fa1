//! # コンテンツコントラクト呼び出し
//!
//! ライブラリ・オブジェクトのコントラクトへのトランザクションをウォレット経由で送る。
//! 署名と送信はウォレットが行い、ここではcalldata構築とレシート解釈のみを扱う。

use std::sync::Arc;
use std::time::Duration;

use fabric_crypto::ids::{OBJECT_PREFIX, VERSION_HASH_PREFIX};
use fabric_crypto::{
    decode_prefixed_hex, decode_version_hash, function_selector, hash_to_address,
    object_id_from_address, to_prefixed_hex,
};
use fabric_types::{TransactionReceipt, TransactionRequest};
use fabric_wallet::{WalletApi, WalletProvider};

use crate::FabricError;

/// 既定のレシートポーリング間隔
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// 既定のレシートポーリング回数上限
pub const DEFAULT_MAX_ATTEMPTS: u32 = 120;

const WORD_LEN: usize = 32;
const ADDRESS_LEN: usize = 20;

/// 作成されたContent Object。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedObject {
    /// オブジェクトのコントラクトアドレス
    pub contract_address: String,
    /// Content Object ID (`iq__...`)
    pub object_id: String,
    /// 作成トランザクションのハッシュ
    pub transaction_hash: String,
}

/// updateRequestの結果。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateRequestResult {
    /// トランザクションハッシュ（編集トークンの `txh`）
    pub transaction_hash: String,
    /// オブジェクトのコントラクトアドレス
    pub contract_address: String,
}

/// コンテンツコントラクトのクライアント。
pub struct ContentContracts {
    provider: Arc<dyn WalletProvider>,
    poll_interval: Duration,
    max_attempts: u32,
}

impl ContentContracts {
    pub fn new(provider: Arc<dyn WalletProvider>) -> Self {
        Self {
            provider,
            poll_interval: DEFAULT_POLL_INTERVAL,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    /// レシート待ちのポーリング設定を変更する。
    pub fn with_polling(mut self, poll_interval: Duration, max_attempts: u32) -> Self {
        self.poll_interval = poll_interval;
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// ライブラリに新しいContent Objectを作成する。
    ///
    /// `content_type` はコンテンツタイプのオブジェクトID (`iq__`) かバージョンハッシュ (`hq__`)。
    /// 省略時はゼロアドレス。
    pub async fn create_content_object(
        &self,
        from: &str,
        library_id: &str,
        content_type: Option<&str>,
    ) -> Result<CreatedObject, FabricError> {
        let library_address = id_to_address(library_id)?;
        let type_address = match content_type {
            Some(t) => content_type_address(t)?,
            None => to_prefixed_hex(&[0u8; ADDRESS_LEN]),
        };

        let mut data = function_selector("createContent(address)").to_vec();
        data.extend_from_slice(&encode_address_word(&type_address)?);

        tracing::info!(library_id, content_type = ?content_type, "Content Objectを作成中");
        let receipt = self.transact(from, &library_address, &data).await?;

        let log = receipt
            .logs
            .iter()
            .find(|log| log.address.eq_ignore_ascii_case(&library_address))
            .ok_or_else(|| {
                FabricError::InvalidResponse(format!(
                    "作成トランザクションにライブラリのイベントがありません: {}",
                    receipt.transaction_hash
                ))
            })?;
        let contract_address = address_from_log_data(&log.data)?;
        let object_id = id_from_address(&contract_address)?;

        tracing::info!(%object_id, %contract_address, "Content Objectを作成しました");
        Ok(CreatedObject {
            contract_address,
            object_id,
            transaction_hash: receipt.transaction_hash,
        })
    }

    /// オブジェクトのコントラクトに `updateRequest()` を送る。
    ///
    /// 編集権限がなければコントラクトはイベントを発行しないため、ログが空なら拒否とみなす。
    pub async fn update_request(
        &self,
        from: &str,
        object_id: &str,
    ) -> Result<UpdateRequestResult, FabricError> {
        let contract_address = id_to_address(object_id)?;
        let data = function_selector("updateRequest()").to_vec();

        tracing::info!(object_id, "updateRequestを送信中");
        let receipt = self.transact(from, &contract_address, &data).await?;

        let emitted = receipt
            .logs
            .iter()
            .any(|log| log.address.eq_ignore_ascii_case(&contract_address));
        if !emitted {
            tracing::warn!(object_id, tx = %receipt.transaction_hash, "updateRequestが拒否されました");
            return Err(FabricError::UpdateRequestDenied(object_id.to_string()));
        }

        Ok(UpdateRequestResult {
            transaction_hash: receipt.transaction_hash,
            contract_address,
        })
    }

    /// トランザクションを送信し、成功したレシートを返す。
    async fn transact(
        &self,
        from: &str,
        to: &str,
        data: &[u8],
    ) -> Result<TransactionReceipt, FabricError> {
        let tx = TransactionRequest {
            from: from.to_string(),
            to: to.to_string(),
            data: to_prefixed_hex(data),
        };
        let tx_hash = self.provider.send_transaction(&tx).await?;
        tracing::debug!(%tx_hash, to, "トランザクションを送信しました");

        let receipt = self.wait_for_receipt(&tx_hash).await?;
        if receipt.status.as_deref() == Some("0x0") {
            return Err(FabricError::TransactionReverted(tx_hash));
        }
        Ok(receipt)
    }

    /// レシートが得られるまでポーリングする。
    pub async fn wait_for_receipt(
        &self,
        transaction_hash: &str,
    ) -> Result<TransactionReceipt, FabricError> {
        for attempt in 0..self.max_attempts {
            if let Some(receipt) = self.provider.transaction_receipt(transaction_hash).await? {
                return Ok(receipt);
            }
            tracing::debug!(transaction_hash, attempt, "レシート待機中");
            tokio::time::sleep(self.poll_interval).await;
        }
        Err(FabricError::ReceiptTimeout(transaction_hash.to_string()))
    }
}

fn id_to_address(id: &str) -> Result<String, FabricError> {
    let address = hash_to_address(id).map_err(|e| FabricError::InvalidId(e.to_string()))?;
    if decode_prefixed_hex(&address).map(|b| b.len()).unwrap_or(0) != ADDRESS_LEN {
        return Err(FabricError::InvalidId(format!("{id}: アドレス長が不正です")));
    }
    Ok(address)
}

fn id_from_address(address: &str) -> Result<String, FabricError> {
    object_id_from_address(address).map_err(|e| FabricError::InvalidId(e.to_string()))
}

fn content_type_address(content_type: &str) -> Result<String, FabricError> {
    if content_type.starts_with(VERSION_HASH_PREFIX) {
        let version =
            decode_version_hash(content_type).map_err(|e| FabricError::InvalidId(e.to_string()))?;
        id_to_address(&version.object_id)
    } else if content_type.starts_with(OBJECT_PREFIX) {
        id_to_address(content_type)
    } else {
        Err(FabricError::InvalidId(format!(
            "{content_type}: コンテンツタイプは iq__ か hq__ で指定してください"
        )))
    }
}

/// アドレスをABIの32バイトワードに左詰めゼロパディングする。
fn encode_address_word(address: &str) -> Result<[u8; WORD_LEN], FabricError> {
    let bytes = decode_prefixed_hex(address).map_err(|e| FabricError::InvalidId(e.to_string()))?;
    if bytes.len() != ADDRESS_LEN {
        return Err(FabricError::InvalidId(format!("{address}: アドレス長が不正です")));
    }
    let mut word = [0u8; WORD_LEN];
    word[WORD_LEN - ADDRESS_LEN..].copy_from_slice(&bytes);
    Ok(word)
}

/// ログデータの先頭ワードからアドレスを取り出す。
fn address_from_log_data(data: &str) -> Result<String, FabricError> {
    let bytes = decode_prefixed_hex(data)
        .map_err(|e| FabricError::InvalidResponse(format!("ログデータが不正: {e}")))?;
    if bytes.len() < WORD_LEN {
        return Err(FabricError::InvalidResponse(format!(
            "ログデータが短すぎます: {}バイト",
            bytes.len()
        )));
    }
    Ok(to_prefixed_hex(&bytes[WORD_LEN - ADDRESS_LEN..WORD_LEN]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use fabric_crypto::ids::LIBRARY_PREFIX;
    use fabric_crypto::address_to_hash;
    use fabric_wallet::WalletError;

    const LIBRARY_ADDRESS: &str = "0x1111111111111111111111111111111111111111";
    const OBJECT_ADDRESS: &str = "0x9fa7b1d53d0ec35b4f5b28a5d4e6bcb2ba33a8ef";
    const FROM: &str = "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266";

    /// 送信されたトランザクションを記録し、固定のレシートを返すモックウォレット
    struct MockWallet {
        sent: Mutex<Vec<serde_json::Value>>,
        receipt: serde_json::Value,
        pending_polls: Mutex<u32>,
    }

    impl MockWallet {
        fn new(receipt: serde_json::Value) -> Arc<Self> {
            Arc::new(Self {
                sent: Mutex::new(Vec::new()),
                receipt,
                pending_polls: Mutex::new(0),
            })
        }
    }

    #[async_trait::async_trait]
    impl WalletProvider for MockWallet {
        async fn request(
            &self,
            method: &str,
            params: serde_json::Value,
        ) -> Result<serde_json::Value, WalletError> {
            match method {
                "eth_sendTransaction" => {
                    self.sent.lock().unwrap().push(params[0].clone());
                    Ok(serde_json::json!("0xabcd"))
                }
                "eth_getTransactionReceipt" => {
                    let mut pending = self.pending_polls.lock().unwrap();
                    if *pending > 0 {
                        *pending -= 1;
                        return Ok(serde_json::Value::Null);
                    }
                    Ok(self.receipt.clone())
                }
                other => Err(WalletError::InvalidResponse(format!("unexpected {other}"))),
            }
        }
    }

    fn library_id() -> String {
        format!("{LIBRARY_PREFIX}{}", address_to_hash(LIBRARY_ADDRESS).unwrap())
    }

    fn contracts(wallet: Arc<MockWallet>) -> ContentContracts {
        ContentContracts::new(wallet).with_polling(Duration::from_millis(1), 5)
    }

    /// createContentのcalldataとログからのアドレス取り出しを確認
    #[tokio::test]
    async fn test_create_content_object() {
        let log_data = format!("0x{}{}", "0".repeat(24), &OBJECT_ADDRESS[2..]);
        let wallet = MockWallet::new(serde_json::json!({
            "transactionHash": "0xabcd",
            "status": "0x1",
            "logs": [
                {"address": "0x2222222222222222222222222222222222222222", "topics": [], "data": "0x"},
                {"address": LIBRARY_ADDRESS, "topics": [], "data": log_data},
            ]
        }));
        *wallet.pending_polls.lock().unwrap() = 2;

        let created = contracts(wallet.clone())
            .create_content_object(FROM, &library_id(), None)
            .await
            .unwrap();
        assert_eq!(created.contract_address, OBJECT_ADDRESS);
        assert_eq!(created.object_id, object_id_from_address(OBJECT_ADDRESS).unwrap());
        assert_eq!(created.transaction_hash, "0xabcd");

        let sent = wallet.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0]["to"], LIBRARY_ADDRESS);
        assert_eq!(sent[0]["from"], FROM);
        let data = sent[0]["data"].as_str().unwrap();
        let selector = hex::encode(function_selector("createContent(address)"));
        assert_eq!(&data[2..10], selector);
        // セレクタ + ゼロアドレス1ワード
        assert_eq!(data.len(), 2 + 8 + 64);
    }

    /// コンテンツタイプ（iq__）がcalldataに入ることを確認
    #[tokio::test]
    async fn test_create_with_content_type() {
        let log_data = format!("0x{}{}", "0".repeat(24), &OBJECT_ADDRESS[2..]);
        let wallet = MockWallet::new(serde_json::json!({
            "transactionHash": "0xabcd",
            "status": "0x1",
            "logs": [{"address": LIBRARY_ADDRESS, "topics": [], "data": log_data}]
        }));
        let type_id = object_id_from_address(OBJECT_ADDRESS).unwrap();

        contracts(wallet.clone())
            .create_content_object(FROM, &library_id(), Some(&type_id))
            .await
            .unwrap();
        let sent = wallet.sent.lock().unwrap();
        assert!(sent[0]["data"].as_str().unwrap().ends_with(&OBJECT_ADDRESS[2..]));
    }

    #[tokio::test]
    async fn test_create_rejects_unknown_content_type() {
        let wallet = MockWallet::new(serde_json::Value::Null);
        let result = contracts(wallet)
            .create_content_object(FROM, &library_id(), Some("text/plain"))
            .await;
        assert!(matches!(result, Err(FabricError::InvalidId(_))));
    }

    /// ログが空のupdateRequestは拒否されることを確認
    #[tokio::test]
    async fn test_update_request_denied() {
        let wallet = MockWallet::new(serde_json::json!({
            "transactionHash": "0xabcd",
            "status": "0x1",
            "logs": []
        }));
        let object_id = object_id_from_address(OBJECT_ADDRESS).unwrap();
        let result = contracts(wallet).update_request(FROM, &object_id).await;
        assert!(matches!(result, Err(FabricError::UpdateRequestDenied(id)) if id == object_id));
    }

    #[tokio::test]
    async fn test_update_request_accepted() {
        let wallet = MockWallet::new(serde_json::json!({
            "transactionHash": "0xfeed",
            "status": "0x1",
            "logs": [{"address": OBJECT_ADDRESS, "topics": [], "data": "0x"}]
        }));
        let object_id = object_id_from_address(OBJECT_ADDRESS).unwrap();
        let result = contracts(wallet.clone())
            .update_request(FROM, &object_id)
            .await
            .unwrap();
        assert_eq!(result.transaction_hash, "0xfeed");
        assert_eq!(result.contract_address, OBJECT_ADDRESS);

        let sent = wallet.sent.lock().unwrap();
        assert_eq!(
            sent[0]["data"],
            to_prefixed_hex(&function_selector("updateRequest()"))
        );
    }

    #[tokio::test]
    async fn test_reverted_transaction() {
        let wallet = MockWallet::new(serde_json::json!({
            "transactionHash": "0xabcd",
            "status": "0x0",
            "logs": []
        }));
        let object_id = object_id_from_address(OBJECT_ADDRESS).unwrap();
        let result = contracts(wallet).update_request(FROM, &object_id).await;
        assert!(matches!(result, Err(FabricError::TransactionReverted(_))));
    }

    /// レシートが得られない場合はタイムアウトになることを確認
    #[tokio::test]
    async fn test_receipt_timeout() {
        let wallet = MockWallet::new(serde_json::Value::Null);
        let result = contracts(wallet).wait_for_receipt("0xabcd").await;
        assert!(matches!(result, Err(FabricError::ReceiptTimeout(_))));
    }
}
