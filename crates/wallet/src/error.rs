//! # ウォレット エラー型

/// EIP-1193でユーザーがリクエストを拒否したときのエラーコード
pub const USER_REJECTED_CODE: i64 = 4001;

/// ウォレット通信のエラー型。
#[derive(Debug, thiserror::Error)]
pub enum WalletError {
    /// HTTP送受信の失敗
    #[error("ウォレットとの通信に失敗: {0}")]
    Transport(String),
    /// ウォレットがJSON-RPCエラーを返した
    #[error("ウォレットがエラーを返しました ({code}): {message}")]
    Rpc {
        /// エラーコード
        code: i64,
        /// エラーメッセージ
        message: String,
    },
    /// 結果の形式が想定と異なる
    #[error("ウォレットの応答が不正: {0}")]
    InvalidResponse(String),
}

impl WalletError {
    /// ユーザーが拒否したかどうか。
    pub fn is_user_rejection(&self) -> bool {
        matches!(self, WalletError::Rpc { code, .. } if *code == USER_REJECTED_CODE)
    }
}
