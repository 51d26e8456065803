//! Standard LZ4 frame format with content checksum, as produced by
//! `liblz4`'s frame API. An earlier Kafka LZ4 variant shipped with a broken
//! header checksum; this crate targets the corrected post-0.10 framing only
//! and does not attempt to read the broken variant.

use std::io::{Read, Write};

use lz4::{Decoder, EncoderBuilder};

use errors::{ErrorKind, Result};

pub fn compress(data: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = EncoderBuilder::new()
        .checksum(::lz4::ContentChecksum::ChecksumEnabled)
        .build(Vec::new())?;
    encoder.write_all(data)?;
    let (buf, result) = encoder.finish();
    result?;
    Ok(buf)
}

pub fn decompress(data: &[u8]) -> Result<Vec<u8>> {
    let mut decoder = Decoder::new(data)?;
    let mut out = Vec::new();
    decoder
        .read_to_end(&mut out)
        .map_err(|_| ErrorKind::Codec("invalid lz4 frame"))?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lz4_roundtrip() {
        let original = b"the quick brown fox jumps over the lazy dog".repeat(10);
        let compressed = compress(&original).unwrap();
        assert_eq!(decompress(&compressed).unwrap(), original);
    }
}
