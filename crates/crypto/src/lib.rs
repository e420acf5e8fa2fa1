//! # Fabric Wallet Bridge 暗号処理
//!
//! ウォレット署名とアクセストークンで使用するプリミティブ。
//!
//! ## 暗号アルゴリズム
//! | 用途 | アルゴリズム |
//! |------|------------|
//! | 署名 | secp256k1 ECDSA（リカバリID付き, 65バイト） |
//! | ハッシュ | Keccak-256 |
//! | メッセージ署名 | EIP-191 `personal_sign` |
//! | 圧縮 | Raw Deflate（zlib/gzipヘッダなし） |
//! | テキスト化 | Base58（Bitcoinアルファベット） |

pub mod compress;
pub mod ids;

use k256::ecdsa::{RecoveryId, Signature, SigningKey, VerifyingKey};
use k256::elliptic_curve::sec1::ToEncodedPoint;
use sha3::{Digest, Keccak256};

pub use compress::{deflate_raw, inflate_raw};
pub use ids::{
    address_to_hash, decode_version_hash, hash_to_address, object_id_from_address,
    user_id_from_address, VersionHash,
};

/// EIP-191 personal_signのメッセージ接頭辞
pub const PERSONAL_MESSAGE_PREFIX: &str = "\x19Ethereum Signed Message:\n";

/// `r || s || v` 形式の署名長
pub const RECOVERABLE_SIGNATURE_LEN: usize = 65;

/// 暗号処理のエラー型
#[derive(Debug, thiserror::Error)]
pub enum CryptoError {
    /// hexデコードエラー
    #[error("不正なhex文字列です: {0}")]
    InvalidHex(String),
    /// Fabric IDのデコードエラー
    #[error("不正なFabric IDです: {0}")]
    InvalidId(String),
    /// 秘密鍵が範囲外・長さ不正
    #[error("秘密鍵が不正です")]
    InvalidSecretKey,
    /// ECDSA署名エラー
    #[error("署名に失敗しました: {0}")]
    SignError(String),
    /// 署名長が65バイトでない
    #[error("署名の長さが不正です: {0}バイト")]
    InvalidSignatureLength(usize),
    /// 公開鍵の復元に失敗
    #[error("署名から公開鍵を復元できません")]
    RecoverError,
    /// Deflate圧縮エラー
    #[error("圧縮に失敗しました: {0}")]
    CompressError(String),
    /// Deflate展開エラー
    #[error("展開に失敗しました: {0}")]
    DecompressError(String),
}

/// 先頭の `0x` / `0X` を取り除く。接頭辞がなければそのまま返す。
pub fn strip_hex_prefix(s: &str) -> &str {
    s.strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s)
}

/// `0x` 付き（または無し）のhex文字列をバイト列にデコードする。
pub fn decode_prefixed_hex(s: &str) -> Result<Vec<u8>, CryptoError> {
    hex::decode(strip_hex_prefix(s)).map_err(|e| CryptoError::InvalidHex(format!("{s}: {e}")))
}

/// バイト列を `0x` 付きの小文字hexにする。
pub fn to_prefixed_hex(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}

/// Keccak-256ハッシュ計算。
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    let result = hasher.finalize();
    let mut hash = [0u8; 32];
    hash.copy_from_slice(&result);
    hash
}

/// EIP-191 personal_signの署名対象ハッシュ。
///
/// `keccak256("\x19Ethereum Signed Message:\n" || len(message) || message)`
pub fn personal_message_hash(message: &[u8]) -> [u8; 32] {
    let mut data = Vec::with_capacity(PERSONAL_MESSAGE_PREFIX.len() + 20 + message.len());
    data.extend_from_slice(PERSONAL_MESSAGE_PREFIX.as_bytes());
    data.extend_from_slice(message.len().to_string().as_bytes());
    data.extend_from_slice(message);
    keccak256(&data)
}

/// Solidity関数シグネチャのセレクタ（先頭4バイト）。
pub fn function_selector(signature: &str) -> [u8; 4] {
    let hash = keccak256(signature.as_bytes());
    [hash[0], hash[1], hash[2], hash[3]]
}

/// 公開鍵からEthereumアドレス（`0x` + 20バイトの小文字hex）を導出する。
pub fn address_from_verifying_key(key: &VerifyingKey) -> String {
    let point = key.to_encoded_point(false);
    let hash = keccak256(&point.as_bytes()[1..]);
    to_prefixed_hex(&hash[12..])
}

/// メモリ内のsecp256k1秘密鍵によるpersonal_sign署名者。
/// ウォレットを介さない開発用・テスト用。
pub struct LocalKeySigner {
    key: SigningKey,
}

impl LocalKeySigner {
    /// ランダムな秘密鍵を生成する。
    pub fn random() -> Self {
        Self {
            key: SigningKey::random(&mut rand::rngs::OsRng),
        }
    }

    /// hex（`0x`可）の32バイト秘密鍵から構築する。
    pub fn from_hex(secret_hex: &str) -> Result<Self, CryptoError> {
        let bytes = decode_prefixed_hex(secret_hex)?;
        let key = SigningKey::from_slice(&bytes).map_err(|_| CryptoError::InvalidSecretKey)?;
        Ok(Self { key })
    }

    /// 対応するEthereumアドレス。
    pub fn address(&self) -> String {
        address_from_verifying_key(self.key.verifying_key())
    }

    /// EIP-191形式でメッセージに署名し、`r || s || v`（v = 27 + recid）を返す。
    pub fn sign_personal(
        &self,
        message: &[u8],
    ) -> Result<[u8; RECOVERABLE_SIGNATURE_LEN], CryptoError> {
        let hash = personal_message_hash(message);
        let (signature, recovery_id) = self
            .key
            .sign_prehash_recoverable(&hash)
            .map_err(|e| CryptoError::SignError(e.to_string()))?;

        let mut out = [0u8; RECOVERABLE_SIGNATURE_LEN];
        out[..64].copy_from_slice(&signature.to_bytes());
        out[64] = 27 + recovery_id.to_byte();
        Ok(out)
    }
}

/// personal_sign署名から署名者アドレスを復元する。
///
/// `v` は 27/28 と 0/1 のどちらの表現も受け付ける。
pub fn recover_personal_signer(message: &[u8], signature: &[u8]) -> Result<String, CryptoError> {
    if signature.len() != RECOVERABLE_SIGNATURE_LEN {
        return Err(CryptoError::InvalidSignatureLength(signature.len()));
    }

    let hash = personal_message_hash(message);
    let sig = Signature::from_slice(&signature[..64]).map_err(|_| CryptoError::RecoverError)?;
    let v = signature[64];
    let recovery_id = RecoveryId::from_byte(if v >= 27 { v - 27 } else { v })
        .ok_or(CryptoError::RecoverError)?;

    let key = VerifyingKey::recover_from_prehash(&hash, &sig, recovery_id)
        .map_err(|_| CryptoError::RecoverError)?;
    Ok(address_from_verifying_key(&key))
}
