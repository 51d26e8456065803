use bytes::Bytes;

use serialization::{Deserializer, Never, Serializer};

/// Identity conversion: the application already deals in `Bytes`.
#[derive(Clone, Copy, Debug, Default)]
pub struct BytesSerializer;

impl Serializer for BytesSerializer {
    type Item = Bytes;
    type Error = Never;

    fn serialize(&self, _topic_name: &str, data: Bytes) -> Result<Bytes, Never> {
        Ok(data)
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct BytesDeserializer;

impl Deserializer for BytesDeserializer {
    type Item = Bytes;
    type Error = Never;

    fn deserialize(&self, _topic_name: &str, data: Bytes) -> Result<Bytes, Never> {
        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bytes_roundtrip_is_identity() {
        let data = Bytes::from(&b"payload"[..]);
        assert_eq!(BytesSerializer.serialize("t", data.clone()).unwrap(), data);
    }
}
