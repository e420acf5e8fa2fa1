//! # トークンClaim
//!
//! Claimのフィールド順は構造体の宣言順で固定する。
//! 署名は順序を含むJSONバイト列に対して行われるため、並び替えは既存トークンを無効にする。

use base64::Engine;
use serde::{Deserialize, Serialize};

use fabric_crypto::{decode_prefixed_hex, user_id_from_address};

use crate::{b64, TokenError};

/// 署名対象メッセージの固定ヘッダ
pub const TOKEN_MESSAGE_HEADER: &str = "Eluvio Content Fabric Access Token 1.0\n";

/// タグの文字数
pub const TAG_LEN: usize = 6;

/// トークン種別。タグ文字列と1対1に対応する。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenKind {
    /// updateRequestトランザクションを証跡とする編集リクエストトークン
    EditRequest,
    /// トランザクションを伴わずウォレットが直接署名したトークン
    ClientSigned,
}

impl TokenKind {
    /// 既知の全種別
    pub const ALL: [TokenKind; 2] = [TokenKind::EditRequest, TokenKind::ClientSigned];

    /// トークン先頭のタグ。
    pub fn tag(&self) -> &'static str {
        match self {
            TokenKind::EditRequest => "atxpjc",
            TokenKind::ClientSigned => "acspjc",
        }
    }

    /// タグから種別を引く。未知のタグは `None`。
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.tag() == tag)
    }
}

/// 編集リクエストトークンのClaim。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditRequestClaim {
    /// updateRequestトランザクションハッシュ（Base64）
    pub txh: String,
    /// 署名者アドレス（Base64）
    pub adr: String,
    /// Content Space ID
    pub spc: String,
    /// Content Library ID
    pub lib: String,
}

impl EditRequestClaim {
    /// hex形式のトランザクションハッシュとアドレスからClaimを構築する。
    pub fn new(
        transaction_hash: &str,
        address: &str,
        content_space_id: &str,
        library_id: &str,
    ) -> Result<Self, TokenError> {
        Ok(Self {
            txh: hex_field_to_base64("transactionProof", transaction_hash)?,
            adr: hex_field_to_base64("signerAddress", address)?,
            spc: require_non_empty("contentSpaceId", content_space_id)?,
            lib: require_non_empty("libraryId", library_id)?,
        })
    }
}

/// クライアント署名トークンのClaim。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientSignedClaim {
    /// サブジェクト (`iusr` + アドレスのBase58)
    pub sub: String,
    /// 署名者アドレス（Base64）
    pub adr: String,
    /// Content Space ID
    pub spc: String,
    /// 発行時刻（UNIXミリ秒）
    pub iat: u64,
    /// 失効時刻（UNIXミリ秒）
    pub exp: u64,
}

impl ClientSignedClaim {
    /// 発行時刻と有効期間（ミリ秒）からClaimを構築する。
    pub fn new(
        address: &str,
        content_space_id: &str,
        issued_at_ms: u64,
        duration_ms: u64,
    ) -> Result<Self, TokenError> {
        let adr = hex_field_to_base64("signerAddress", address)?;
        let sub = user_id_from_address(address)
            .map_err(|e| TokenError::InvalidInput(format!("signerAddress: {e}")))?;
        let exp = issued_at_ms
            .checked_add(duration_ms)
            .ok_or_else(|| TokenError::InvalidInput("有効期間が大きすぎます".to_string()))?;
        Ok(Self {
            sub,
            adr,
            spc: require_non_empty("contentSpaceId", content_space_id)?,
            iat: issued_at_ms,
            exp,
        })
    }
}

/// 種別付きのClaim。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum TokenClaim {
    /// 編集リクエストトークン
    EditRequest(EditRequestClaim),
    /// クライアント署名トークン
    ClientSigned(ClientSignedClaim),
}

impl TokenClaim {
    /// Claimに対応するトークン種別。
    pub fn kind(&self) -> TokenKind {
        match self {
            TokenClaim::EditRequest(_) => TokenKind::EditRequest,
            TokenClaim::ClientSigned(_) => TokenKind::ClientSigned,
        }
    }

    /// 署名・圧縮の対象となるコンパクトJSON。
    pub fn to_canonical_json(&self) -> Result<String, TokenError> {
        serde_json::to_string(self)
            .map_err(|e| TokenError::Encoding(format!("Claimのシリアライズに失敗: {e}")))
    }
}

impl From<EditRequestClaim> for TokenClaim {
    fn from(claim: EditRequestClaim) -> Self {
        TokenClaim::EditRequest(claim)
    }
}

impl From<ClientSignedClaim> for TokenClaim {
    fn from(claim: ClientSignedClaim) -> Self {
        TokenClaim::ClientSigned(claim)
    }
}

fn hex_field_to_base64(name: &str, value: &str) -> Result<String, TokenError> {
    let bytes =
        decode_prefixed_hex(value).map_err(|e| TokenError::InvalidInput(format!("{name}: {e}")))?;
    if bytes.is_empty() {
        return Err(TokenError::InvalidInput(format!("{name}が空です")));
    }
    Ok(b64().encode(bytes))
}

fn require_non_empty(name: &str, value: &str) -> Result<String, TokenError> {
    if value.trim().is_empty() {
        return Err(TokenError::InvalidInput(format!("{name}が空です")));
    }
    Ok(value.to_string())
}
