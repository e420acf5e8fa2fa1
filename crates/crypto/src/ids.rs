//! # Fabric ID
//!
//! Content Fabricのリソース識別子とEthereumアドレスの相互変換。
//!
//! IDは4文字の種別接頭辞 + アドレス20バイトのBase58。
//!
//! | 接頭辞 | リソース |
//! |--------|---------|
//! | `iusr` | ユーザー |
//! | `iq__` | Content Object |
//! | `ilib` | Content Library |
//! | `ispc` | Content Space |
//!
//! バージョンハッシュ (`hq__`) は `SHA-256ダイジェスト(32) || サイズ(LEB128) || オブジェクトアドレス(20)`。

use base58::{FromBase58, ToBase58};

use crate::{decode_prefixed_hex, to_prefixed_hex, CryptoError};

/// ユーザーIDの接頭辞
pub const USER_PREFIX: &str = "iusr";
/// Content Object IDの接頭辞
pub const OBJECT_PREFIX: &str = "iq__";
/// Content Library IDの接頭辞
pub const LIBRARY_PREFIX: &str = "ilib";
/// Content Space IDの接頭辞
pub const SPACE_PREFIX: &str = "ispc";
/// バージョンハッシュの接頭辞
pub const VERSION_HASH_PREFIX: &str = "hq__";

const DIGEST_LEN: usize = 32;

const PREFIX_LEN: usize = 4;

/// アドレス（hex）をBase58ハッシュ部にする。接頭辞は付かない。
pub fn address_to_hash(address: &str) -> Result<String, CryptoError> {
    Ok(decode_prefixed_hex(address)?.to_base58())
}

/// Fabric IDからコントラクトアドレス（`0x` + 小文字hex）を取り出す。
pub fn hash_to_address(id: &str) -> Result<String, CryptoError> {
    if id.len() <= PREFIX_LEN || !id.is_char_boundary(PREFIX_LEN) {
        return Err(CryptoError::InvalidId(id.to_string()));
    }
    let bytes = id[PREFIX_LEN..]
        .from_base58()
        .map_err(|e| CryptoError::InvalidId(format!("{id}: {e:?}")))?;
    Ok(to_prefixed_hex(&bytes))
}

/// コントラクトアドレスからContent Object ID (`iq__...`) を作る。
pub fn object_id_from_address(address: &str) -> Result<String, CryptoError> {
    Ok(format!("{OBJECT_PREFIX}{}", address_to_hash(address)?))
}

/// ウォレットアドレスからユーザーID (`iusr...`) を作る。
pub fn user_id_from_address(address: &str) -> Result<String, CryptoError> {
    Ok(format!("{USER_PREFIX}{}", address_to_hash(address)?))
}

/// 解読済みバージョンハッシュ。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionHash {
    /// コンテンツのSHA-256ダイジェスト
    pub digest: [u8; DIGEST_LEN],
    /// パートサイズ
    pub size: u64,
    /// 所属するContent Object ID
    pub object_id: String,
}

/// バージョンハッシュ (`hq__...`) を解読する。
pub fn decode_version_hash(hash: &str) -> Result<VersionHash, CryptoError> {
    let body = hash
        .strip_prefix(VERSION_HASH_PREFIX)
        .ok_or_else(|| CryptoError::InvalidId(format!("{hash}: hq__で始まりません")))?;
    let bytes = body
        .from_base58()
        .map_err(|e| CryptoError::InvalidId(format!("{hash}: {e:?}")))?;
    if bytes.len() <= DIGEST_LEN {
        return Err(CryptoError::InvalidId(format!("{hash}: 長さが不足しています")));
    }

    let mut digest = [0u8; DIGEST_LEN];
    digest.copy_from_slice(&bytes[..DIGEST_LEN]);

    // LEB128
    let mut size: u64 = 0;
    let mut shift = 0u32;
    let mut pos = DIGEST_LEN;
    loop {
        let byte = *bytes
            .get(pos)
            .ok_or_else(|| CryptoError::InvalidId(format!("{hash}: サイズが途中で終わっています")))?;
        pos += 1;
        if shift >= 64 {
            return Err(CryptoError::InvalidId(format!("{hash}: サイズが大きすぎます")));
        }
        size |= u64::from(byte & 0x7f) << shift;
        if byte & 0x80 == 0 {
            break;
        }
        shift += 7;
    }

    let address = &bytes[pos..];
    if address.is_empty() {
        return Err(CryptoError::InvalidId(format!("{hash}: オブジェクトIDがありません")));
    }
    Ok(VersionHash {
        digest,
        size,
        object_id: format!("{OBJECT_PREFIX}{}", address.to_base58()),
    })
}
