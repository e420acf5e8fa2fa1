//! # トークン エラー型

/// トークン構築・解読のエラー型。
///
/// いずれも致命的で、内部での再試行は行わない。再試行するかは呼び出し側が決める。
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    /// 入力検証エラー（不正なhex、空の識別子）。署名要求の前に検出される。
    #[error("不正な入力: {0}")]
    InvalidInput(String),
    /// 署名者のエラー（ユーザー拒否、ウォレット通信失敗、不正な署名形式）
    #[error("署名に失敗: {0}")]
    Signing(String),
    /// Claimのシリアライズ・圧縮エラー
    #[error("トークンのエンコードに失敗: {0}")]
    Encoding(String),
    /// トークン文字列の解読エラー
    #[error("トークンのデコードに失敗: {0}")]
    Decoding(String),
}
