use std::string::FromUtf8Error;

use bytes::Bytes;

use serialization::{Deserializer, Never, Serializer};

/// `String` in as UTF-8 bytes, no failure mode on the way out.
#[derive(Clone, Copy, Debug, Default)]
pub struct StringSerializer;

impl Serializer for StringSerializer {
    type Item = String;
    type Error = Never;

    fn serialize(&self, _topic_name: &str, data: String) -> Result<Bytes, Never> {
        Ok(Bytes::from(data.into_bytes()))
    }
}

/// UTF-8 bytes back to `String`; fails on malformed input rather than
/// lossily substituting the replacement character.
#[derive(Clone, Copy, Debug, Default)]
pub struct StringDeserializer;

impl Deserializer for StringDeserializer {
    type Item = String;
    type Error = FromUtf8Error;

    fn deserialize(&self, _topic_name: &str, data: Bytes) -> Result<String, FromUtf8Error> {
        String::from_utf8(data.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_roundtrip() {
        let bytes = StringSerializer.serialize("t", "hello".to_owned()).unwrap();
        assert_eq!(StringDeserializer.deserialize("t", bytes).unwrap(), "hello");
    }

    #[test]
    fn test_string_deserialize_rejects_invalid_utf8() {
        let bytes = Bytes::from(&[0xff, 0xfe][..]);
        assert!(StringDeserializer.deserialize("t", bytes).is_err());
    }
}
