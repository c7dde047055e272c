//! Digest and deflate helpers used when writing `/EmbeddedFile` streams.

use crate::Result;
use flate2::Compression;
use flate2::write::ZlibEncoder;
use md5::{Digest as _, Md5};
use std::fmt::Write as _;
use std::io::Write;

/// MD5 digest of `data`, as stored in the `/CheckSum` entry of an embedded file.
///
/// The checksum only lets readers detect a damaged payload; it is not a security measure.
pub fn digest(data: &[u8]) -> [u8; 16] {
    let mut out = [0u8; 16];
    out.copy_from_slice(&Md5::digest(data));
    out
}

/// Lowercase hexadecimal form of [`digest`], always 32 characters long.
pub fn checksum(data: &[u8]) -> String {
    digest(data).iter().fold(String::with_capacity(32), |mut hex, byte| {
        let _ = write!(hex, "{:02x}", byte);
        hex
    })
}

/// Deflate `data` into a zlib stream suitable for `/FlateDecode`.
///
/// `level` is clamped to the 0-9 range understood by zlib.
pub fn compress(data: &[u8], level: u32) -> Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::with_capacity(data.len() / 2), Compression::new(level.min(9)));
    encoder.write_all(data)?;
    Ok(encoder.finish()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::read::ZlibDecoder;
    use std::io::Read;

    #[test]
    fn checksum_is_lowercase_md5_hex() {
        assert_eq!(checksum(b""), "d41d8cd98f00b204e9800998ecf8427e");
        assert_eq!(checksum(b"hello world"), "5eb63bbbe01eeed093cb22bb8f5acdc3");
        assert_eq!(checksum(b"hello world").len(), 32);
    }

    #[test]
    fn compressed_data_inflates_back() {
        let data = b"attachment payload ".repeat(64);
        let compressed = compress(&data, 6).unwrap();
        assert!(compressed.len() < data.len());

        let mut inflated = Vec::new();
        ZlibDecoder::new(compressed.as_slice()).read_to_end(&mut inflated).unwrap();
        assert_eq!(inflated, data);
    }

    #[test]
    fn empty_input_still_produces_a_valid_stream() {
        let compressed = compress(b"", 9).unwrap();
        assert!(!compressed.is_empty());

        let mut inflated = Vec::new();
        ZlibDecoder::new(compressed.as_slice()).read_to_end(&mut inflated).unwrap();
        assert!(inflated.is_empty());
    }
}
