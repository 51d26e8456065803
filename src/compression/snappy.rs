//! Kafka does not use raw snappy framing; it uses the container format that
//! the `snappy-java` library (referred to upstream as "Xerial" framing)
//! wraps every compressed block in:
//!
//!   magic: 8 bytes, literally `\x82SNAPPY\x00`
//!   version: int32 (always 1 for this implementation)
//!   compat_version: int32 (always 1)
//!   then a sequence of: block_length: int32, compressed_block: bytes
//!
//! Each block holds a raw (unframed) snappy-compressed chunk of up to 32 KiB
//! of uncompressed input.

use byteorder::{BigEndian, ByteOrder};
use snap::{Decoder, Encoder};

use errors::{ErrorKind, Result};

const XERIAL_MAGIC: &'static [u8] = b"\x82SNAPPY\x00";
const XERIAL_VERSION: i32 = 1;
const XERIAL_COMPAT_VERSION: i32 = 1;
const BLOCK_SIZE: usize = 32 * 1024;

pub fn compress_xerial(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len() / 2 + 32);
    out.extend_from_slice(XERIAL_MAGIC);

    let mut header = [0u8; 8];
    BigEndian::write_i32(&mut header[0..4], XERIAL_VERSION);
    BigEndian::write_i32(&mut header[4..8], XERIAL_COMPAT_VERSION);
    out.extend_from_slice(&header);

    let mut encoder = Encoder::new();
    for chunk in data.chunks(BLOCK_SIZE) {
        let block = encoder
            .compress_vec(chunk)
            .expect("compressing a bounded in-memory chunk cannot fail");

        let mut len_buf = [0u8; 4];
        BigEndian::write_i32(&mut len_buf, block.len() as i32);
        out.extend_from_slice(&len_buf);
        out.extend_from_slice(&block);
    }

    out
}

pub fn decompress_xerial(data: &[u8]) -> Result<Vec<u8>> {
    if data.starts_with(XERIAL_MAGIC) {
        decompress_framed(&data[XERIAL_MAGIC.len()..])
    } else {
        // Fall back to raw snappy for producers that did not use the
        // Xerial container: if the magic header is absent, raw-snappy is
        // the documented compatibility fallback.
        decompress_raw_block(data)
    }
}

fn decompress_framed(data: &[u8]) -> Result<Vec<u8>> {
    if data.len() < 8 {
        bail!(ErrorKind::Codec("truncated xerial-snappy header"));
    }
    // version / compat_version are not validated; newer producers may bump
    // them without changing the wire format in a way this decoder cares
    // about.
    let mut rest = &data[8..];
    let mut out = Vec::new();

    while !rest.is_empty() {
        if rest.len() < 4 {
            bail!(ErrorKind::Codec("truncated xerial-snappy block length"));
        }
        let block_len = BigEndian::read_i32(&rest[0..4]) as usize;
        rest = &rest[4..];
        if rest.len() < block_len {
            bail!(ErrorKind::Codec("truncated xerial-snappy block body"));
        }
        let block = &rest[..block_len];
        rest = &rest[block_len..];

        out.extend_from_slice(&decompress_raw_block(block)?);
    }

    Ok(out)
}

fn decompress_raw_block(block: &[u8]) -> Result<Vec<u8>> {
    Decoder::new()
        .decompress_vec(block)
        .map_err(|_| ErrorKind::Codec("invalid snappy block").into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_xerial_roundtrip() {
        let original = b"the quick brown fox jumps over the lazy dog".repeat(10);
        let compressed = compress_xerial(&original);
        assert!(compressed.starts_with(XERIAL_MAGIC));
        assert_eq!(decompress_xerial(&compressed).unwrap(), original);
    }

    #[test]
    fn test_raw_snappy_fallback() {
        let original = b"hello snappy world";
        let raw_block = Encoder::new().compress_vec(original).unwrap();

        assert!(!raw_block.starts_with(XERIAL_MAGIC));
        assert_eq!(decompress_xerial(&raw_block).unwrap(), original);
    }
}
