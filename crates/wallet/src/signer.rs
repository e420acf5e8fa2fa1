//! # ウォレット署名者
//!
//! トークン署名をウォレットの `personal_sign` に委譲する。

use std::sync::Arc;

use fabric_token::{MessageSigner, TokenError};

use crate::{WalletApi, WalletProvider};

/// `personal_sign` でトークンに署名する署名者。
pub struct WalletSigner {
    provider: Arc<dyn WalletProvider>,
}

impl WalletSigner {
    /// プロバイダから構築する。
    pub fn new(provider: Arc<dyn WalletProvider>) -> Self {
        Self { provider }
    }
}

#[async_trait::async_trait]
impl MessageSigner for WalletSigner {
    async fn personal_sign(&self, address: &str, message: &str) -> Result<String, TokenError> {
        tracing::info!(address, "ウォレットにpersonal_signを要求");
        self.provider
            .personal_sign(address, message)
            .await
            .map_err(|e| {
                if e.is_user_rejection() {
                    tracing::warn!(address, "ユーザーが署名を拒否しました");
                }
                TokenError::Signing(e.to_string())
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::start_mock_rpc;
    use crate::HttpWalletProvider;

    #[tokio::test]
    async fn test_wallet_signer_builds_token() {
        let port = start_mock_rpc(|method, params| {
            assert_eq!(method, "personal_sign");
            // ヘッダ "Eluvio Content Fabric Access Token 1.0\n" のhex先頭
            assert!(params[0].as_str().unwrap().starts_with("0x456c7576696f"));
            Ok(serde_json::json!("0xdeadbeef"))
        })
        .await;
        let provider = Arc::new(HttpWalletProvider::new(&format!("http://127.0.0.1:{port}")));
        let signer = WalletSigner::new(provider);

        let token =
            fabric_token::create_edit_token(&signer, "0x1234", "0xabcd", "ispcTEST", "ilibTEST")
                .await
                .unwrap();
        assert!(token.starts_with("atxpjc"));
    }

    /// ユーザー拒否がトークン生成の失敗として伝播することを確認
    #[tokio::test]
    async fn test_wallet_signer_rejection() {
        let port = start_mock_rpc(|_, _| Err((4001, "User rejected the request.".to_string()))).await;
        let provider = Arc::new(HttpWalletProvider::new(&format!("http://127.0.0.1:{port}")));
        let signer = WalletSigner::new(provider);

        let result =
            fabric_token::create_edit_token(&signer, "0x1234", "0xabcd", "ispcTEST", "ilibTEST").await;
        assert!(matches!(result, Err(TokenError::Signing(_))));
    }
}
