//! # 署名者トレイト
//!
//! personal_sign相当の署名能力を抽象化する。
//! ウォレット実装は `fabric-wallet` の `WalletSigner` を参照。

use fabric_crypto::{to_prefixed_hex, LocalKeySigner};

use crate::TokenError;

/// EIP-191 personal_signを行う署名者。
///
/// ユーザーの確認操作を伴う場合があり、完了まで任意の時間待たされうる。
/// 呼び出し側はタイムアウトを設けない。
#[async_trait::async_trait]
pub trait MessageSigner: Send + Sync {
    /// `address` の鍵で `message` に署名し、`0x` 付きhexの署名を返す。
    async fn personal_sign(&self, address: &str, message: &str) -> Result<String, TokenError>;
}

#[async_trait::async_trait]
impl MessageSigner for LocalKeySigner {
    async fn personal_sign(&self, address: &str, message: &str) -> Result<String, TokenError> {
        if !address.eq_ignore_ascii_case(&self.address()) {
            return Err(TokenError::Signing(format!(
                "このキーでは {address} として署名できません"
            )));
        }
        let signature = self
            .sign_personal(message.as_bytes())
            .map_err(|e| TokenError::Signing(e.to_string()))?;
        Ok(to_prefixed_hex(&signature))
    }
}
