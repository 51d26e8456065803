use bytes::Bytes;

use serialization::{Deserializer, Never, Serializer};

/// Owned `Vec<u8>` in, owned `Vec<u8>` out -- for callers that would rather
/// not depend on `bytes::Bytes` in their own code.
#[derive(Clone, Copy, Debug, Default)]
pub struct RawSerializer;

impl Serializer for RawSerializer {
    type Item = Vec<u8>;
    type Error = Never;

    fn serialize(&self, _topic_name: &str, data: Vec<u8>) -> Result<Bytes, Never> {
        Ok(Bytes::from(data))
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct RawDeserializer;

impl Deserializer for RawDeserializer {
    type Item = Vec<u8>;
    type Error = Never;

    fn deserialize(&self, _topic_name: &str, data: Bytes) -> Result<Vec<u8>, Never> {
        Ok(data.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_roundtrip() {
        let data = vec![1u8, 2, 3];
        let bytes = RawSerializer.serialize("t", data.clone()).unwrap();
        assert_eq!(RawDeserializer.deserialize("t", bytes).unwrap(), data);
    }
}
