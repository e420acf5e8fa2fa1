//! # Fabric クライアント エラー型

use fabric_wallet::WalletError;

/// Fabricクライアントのエラー型。
#[derive(Debug, thiserror::Error)]
pub enum FabricError {
    /// HTTP送受信の失敗
    #[error("Fabricとの通信に失敗: {0}")]
    Http(String),
    /// Fabricがエラーステータスを返した
    #[error("Fabricがエラーを返しました: HTTP {status} - {body}")]
    Status {
        /// HTTPステータス
        status: u16,
        /// レスポンスボディ
        body: String,
    },
    /// 応答の形式が想定と異なる
    #[error("Fabricの応答が不正: {0}")]
    InvalidResponse(String),
    /// ウォレット呼び出しの失敗
    #[error(transparent)]
    Wallet(#[from] WalletError),
    /// updateRequestが拒否された（イベントが発行されなかった）
    #[error("Update request denied for {0}")]
    UpdateRequestDenied(String),
    /// トランザクションがrevertした
    #[error("トランザクションが失敗しました: {0}")]
    TransactionReverted(String),
    /// レシートが規定回数内に得られなかった
    #[error("レシートの待機がタイムアウトしました: {0}")]
    ReceiptTimeout(String),
    /// 不正なID・アドレス
    #[error("不正なID: {0}")]
    InvalidId(String),
    /// 設定エラー
    #[error("設定エラー: {0}")]
    Config(String),
    /// ファイル入出力エラー
    #[error("ファイル入出力エラー: {0}")]
    Io(String),
}
