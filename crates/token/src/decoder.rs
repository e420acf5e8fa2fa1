//! # トークンデコーダ
//!
//! エンコーダの逆変換。署名は65バイト（`r || s || v`）として切り出す。

use base58::FromBase58;
use base64::Engine;

use fabric_crypto::{inflate_raw, recover_personal_signer, to_prefixed_hex, RECOVERABLE_SIGNATURE_LEN};

use crate::claim::{TokenKind, TAG_LEN};
use crate::encoder::signing_message;
use crate::{b64, TokenError};

/// 解読済みトークン。
#[derive(Debug, Clone)]
pub struct DecodedToken {
    /// トークン種別
    pub kind: TokenKind,
    /// 署名バイト列
    pub signature: Vec<u8>,
    /// Claim
    pub claim: serde_json::Value,
    /// 署名対象となった元のClaim JSON（キー順を保持）
    claim_json: String,
}

impl DecodedToken {
    /// 展開した元のClaim JSON。
    pub fn claim_json(&self) -> &str {
        &self.claim_json
    }

    /// 署名から署名者アドレスを復元する。
    pub fn recover_signer(&self) -> Result<String, TokenError> {
        let message = signing_message(&self.claim_json);
        recover_personal_signer(message.as_bytes(), &self.signature)
            .map_err(|e| TokenError::Decoding(e.to_string()))
    }

    /// Claimの `adr` を `0x` 付きhexで返す。
    pub fn claimed_address(&self) -> Result<String, TokenError> {
        let adr = self
            .claim
            .get("adr")
            .and_then(|v| v.as_str())
            .ok_or_else(|| TokenError::Decoding("Claimにadrがありません".to_string()))?;
        let bytes = b64()
            .decode(adr)
            .map_err(|e| TokenError::Decoding(format!("adrのBase64デコードに失敗: {e}")))?;
        Ok(to_prefixed_hex(&bytes))
    }

    /// 復元した署名者とClaimの `adr` が一致するか検証し、一致すればアドレスを返す。
    pub fn verify(&self) -> Result<String, TokenError> {
        let recovered = self.recover_signer()?;
        let claimed = self.claimed_address()?;
        if !recovered.eq_ignore_ascii_case(&claimed) {
            return Err(TokenError::Decoding(format!(
                "署名者が一致しません: 署名={recovered}, adr={claimed}"
            )));
        }
        Ok(recovered)
    }

    /// 表示用のJSON。
    pub fn summary(&self) -> serde_json::Value {
        serde_json::json!({
            "kind": self.kind,
            "tag": self.kind.tag(),
            "signature": to_prefixed_hex(&self.signature),
            "claim": self.claim,
        })
    }
}

/// トークン文字列を解読する。
pub fn decode_token(token: &str) -> Result<DecodedToken, TokenError> {
    if token.len() <= TAG_LEN || !token.is_char_boundary(TAG_LEN) {
        return Err(TokenError::Decoding("トークンが短すぎます".to_string()));
    }
    let (tag, body) = token.split_at(TAG_LEN);
    let kind = TokenKind::from_tag(tag)
        .ok_or_else(|| TokenError::Decoding(format!("未知のタグ: {tag}")))?;

    let bytes = body
        .from_base58()
        .map_err(|e| TokenError::Decoding(format!("Base58デコードに失敗: {e:?}")))?;
    if bytes.len() <= RECOVERABLE_SIGNATURE_LEN {
        return Err(TokenError::Decoding(format!(
            "トークン本体が短すぎます: {}バイト",
            bytes.len()
        )));
    }
    let (signature, compressed) = bytes.split_at(RECOVERABLE_SIGNATURE_LEN);

    let claim_bytes = inflate_raw(compressed).map_err(|e| TokenError::Decoding(e.to_string()))?;
    let claim_json = String::from_utf8(claim_bytes)
        .map_err(|e| TokenError::Decoding(format!("ClaimがUTF-8ではありません: {e}")))?;
    let claim = serde_json::from_str(&claim_json)
        .map_err(|e| TokenError::Decoding(format!("ClaimのJSONパースに失敗: {e}")))?;

    Ok(DecodedToken {
        kind,
        signature: signature.to_vec(),
        claim,
        claim_json,
    })
}
