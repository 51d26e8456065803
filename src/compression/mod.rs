//! Compression codecs for the Kafka message-set format.
//!
//! The low 3 bits of a message's `attributes` byte select the codec; the
//! remaining bits are reserved and must be zero on encode. `protocol::message`
//! treats any reserved bit set, or a codec value this enum does not know, as
//! `ERROR_METADATA_ATTRIBUTES` rather than a hard decode failure.

#[cfg(feature = "gzip")]
mod gzip;
#[cfg(feature = "snappy")]
mod snappy;
#[cfg(feature = "lz4")]
mod lz4_frame;

use errors::Result;

/// `attributes & 0x07`: the compression codec applied to a message's value.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[repr(i8)]
pub enum Compression {
    None = 0,
    Gzip = 1,
    Snappy = 2,
    Lz4 = 3,
}

impl Compression {
    /// Decodes the low 3 bits of an `attributes` byte. Returns `None` for
    /// any value this crate does not implement a codec for (reserved
    /// values 4-7), so callers can distinguish "no compression" from
    /// "unknown compression".
    pub fn from_attributes(attrs: i8) -> Option<Compression> {
        match attrs & 0x07 {
            0 => Some(Compression::None),
            1 => Some(Compression::Gzip),
            2 => Some(Compression::Snappy),
            3 => Some(Compression::Lz4),
            _ => None,
        }
    }

    pub fn compress(&self, data: &[u8]) -> Result<Vec<u8>> {
        match *self {
            Compression::None => Ok(data.to_vec()),
            #[cfg(feature = "gzip")]
            Compression::Gzip => gzip::compress(data),
            #[cfg(feature = "snappy")]
            Compression::Snappy => Ok(snappy::compress_xerial(data)),
            #[cfg(feature = "lz4")]
            Compression::Lz4 => lz4_frame::compress(data),
            #[allow(unreachable_patterns)]
            _ => bail!(::errors::ErrorKind::Codec("compression codec not compiled in")),
        }
    }

    pub fn decompress(&self, data: &[u8]) -> Result<Vec<u8>> {
        match *self {
            Compression::None => Ok(data.to_vec()),
            #[cfg(feature = "gzip")]
            Compression::Gzip => gzip::decompress(data),
            #[cfg(feature = "snappy")]
            Compression::Snappy => snappy::decompress_xerial(data),
            #[cfg(feature = "lz4")]
            Compression::Lz4 => lz4_frame::decompress(data),
            #[allow(unreachable_patterns)]
            _ => bail!(::errors::ErrorKind::Codec("compression codec not compiled in")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_attributes_rejects_reserved_codec() {
        assert_eq!(Compression::from_attributes(0), Some(Compression::None));
        assert_eq!(Compression::from_attributes(3), Some(Compression::Lz4));
        assert_eq!(Compression::from_attributes(7), None);
    }
}
