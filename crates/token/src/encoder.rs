//! # トークンエンコーダ
//!
//! 両種別で共通のパイプライン:
//! 1. Claim → コンパクトJSON
//! 2. 固定ヘッダ + JSON を署名者に渡して署名を得る
//! 3. 同じJSONをRaw Deflateで圧縮
//! 4. 署名 || 圧縮Claim をBase58化し、種別タグを前置

use base58::ToBase58;

use fabric_crypto::{decode_prefixed_hex, deflate_raw};

use crate::claim::{ClientSignedClaim, EditRequestClaim, TokenClaim, TOKEN_MESSAGE_HEADER};
use crate::signer::MessageSigner;
use crate::TokenError;

/// 署名対象メッセージ（固定ヘッダ + Claim JSON）。
pub fn signing_message(claim_json: &str) -> String {
    format!("{TOKEN_MESSAGE_HEADER}{claim_json}")
}

/// Claimに署名してトークン文字列を作る。
///
/// `address` は署名者のアドレスで、Claim内の `adr` と同じものを渡す。
/// 署名は入力検証とメッセージ構築が完了してから一度だけ要求する。
pub async fn encode_token(
    claim: &TokenClaim,
    address: &str,
    signer: &dyn MessageSigner,
) -> Result<String, TokenError> {
    decode_prefixed_hex(address)
        .map_err(|e| TokenError::InvalidInput(format!("signerAddress: {e}")))?;

    let kind = claim.kind();
    let claim_json = claim.to_canonical_json()?;
    let message = signing_message(&claim_json);

    tracing::debug!(kind = ?kind, address, "トークンへの署名を要求");
    let signature_hex = signer.personal_sign(address, &message).await?;
    let signature = decode_prefixed_hex(&signature_hex)
        .map_err(|e| TokenError::Signing(format!("署名者が不正な署名を返しました: {e}")))?;

    let compressed = deflate_raw(claim_json.as_bytes())
        .map_err(|e| TokenError::Encoding(e.to_string()))?;

    let mut buf = Vec::with_capacity(signature.len() + compressed.len());
    buf.extend_from_slice(&signature);
    buf.extend_from_slice(&compressed);

    let token = format!("{}{}", kind.tag(), buf.to_base58());
    tracing::debug!(kind = ?kind, token_len = token.len(), "トークンを生成しました");
    Ok(token)
}

/// updateRequestトランザクションを証跡とする編集リクエストトークンを作る。
pub async fn create_edit_token(
    signer: &dyn MessageSigner,
    address: &str,
    transaction_hash: &str,
    content_space_id: &str,
    library_id: &str,
) -> Result<String, TokenError> {
    let claim = EditRequestClaim::new(transaction_hash, address, content_space_id, library_id)?;
    encode_token(&claim.into(), address, signer).await
}

/// ウォレットが直接署名するクライアント署名トークンを作る。
pub async fn create_client_signed_token(
    signer: &dyn MessageSigner,
    address: &str,
    content_space_id: &str,
    issued_at_ms: u64,
    duration_ms: u64,
) -> Result<String, TokenError> {
    let claim = ClientSignedClaim::new(address, content_space_id, issued_at_ms, duration_ms)?;
    encode_token(&claim.into(), address, signer).await
}
