//! # Raw Deflate
//!
//! トークンClaimの圧縮。zlib/gzipのヘッダ・チェックサムは付与しない。

use std::io::{Read, Write};

use flate2::read::DeflateDecoder;
use flate2::write::DeflateEncoder;
use flate2::Compression;

use crate::CryptoError;

/// Raw Deflateで圧縮する（既定レベル）。
pub fn deflate_raw(data: &[u8]) -> Result<Vec<u8>, CryptoError> {
    let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(data)
        .map_err(|e| CryptoError::CompressError(e.to_string()))?;
    encoder
        .finish()
        .map_err(|e| CryptoError::CompressError(e.to_string()))
}

/// Raw Deflateを展開する。
pub fn inflate_raw(data: &[u8]) -> Result<Vec<u8>, CryptoError> {
    let mut decoder = DeflateDecoder::new(data);
    let mut out = Vec::new();
    decoder
        .read_to_end(&mut out)
        .map_err(|e| CryptoError::DecompressError(e.to_string()))?;
    Ok(out)
}
