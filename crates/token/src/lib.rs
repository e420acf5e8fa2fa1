//! # Fabric アクセストークン
//!
//! ウォレット署名付きアクセストークンの構築と解読。
//!
//! ## ワイヤ形式
//! ```text
//! <tag: 6文字ASCII><base58(署名バイト列 || raw_deflate(claim JSON))>
//! ```
//!
//! | tag | 種別 | Claim |
//! |-----|------|-------|
//! | `atxpjc` | 編集リクエストトークン | `txh, adr, spc, lib` |
//! | `acspjc` | クライアント署名トークン | `sub, adr, spc, iat, exp` |
//!
//! 署名対象は `"Eluvio Content Fabric Access Token 1.0\n" + claim JSON`。
//! Claim JSONはキー順を構造体の宣言順に固定したコンパクト形式で、
//! 署名対象と圧縮対象は同一のバイト列になる。

pub mod claim;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod signer;

pub use claim::{ClientSignedClaim, EditRequestClaim, TokenClaim, TokenKind, TAG_LEN, TOKEN_MESSAGE_HEADER};
pub use decoder::{decode_token, DecodedToken};
pub use encoder::{create_client_signed_token, create_edit_token, encode_token, signing_message};
pub use error::TokenError;
pub use signer::MessageSigner;

/// Base64エンジン（Standard）
pub(crate) fn b64() -> base64::engine::GeneralPurpose {
    base64::engine::general_purpose::STANDARD
}
