use std::borrow::Cow;

use bytes::Bytes;
use encoding::{DecoderTrap, EncoderTrap, EncodingRef};

use serialization::{Deserializer, Serializer};

/// `String` <-> bytes through an arbitrary codepage, for topics whose
/// producers predate UTF-8 (Shift-JIS logs, Latin-1 exports, and the like).
#[derive(Clone, Copy)]
pub struct StrEncodingSerializer {
    pub encoding: EncodingRef,
    pub trap: EncoderTrap,
}

impl StrEncodingSerializer {
    pub fn new(encoding: EncodingRef) -> StrEncodingSerializer {
        StrEncodingSerializer {
            encoding: encoding,
            trap: EncoderTrap::Strict,
        }
    }
}

impl Serializer for StrEncodingSerializer {
    type Item = String;
    type Error = Cow<'static, str>;

    fn serialize(&self, _topic_name: &str, data: String) -> Result<Bytes, Cow<'static, str>> {
        self.encoding.encode(&data, self.trap).map(Bytes::from)
    }
}

#[derive(Clone, Copy)]
pub struct StrEncodingDeserializer {
    pub encoding: EncodingRef,
    pub trap: DecoderTrap,
}

impl StrEncodingDeserializer {
    pub fn new(encoding: EncodingRef) -> StrEncodingDeserializer {
        StrEncodingDeserializer {
            encoding: encoding,
            trap: DecoderTrap::Strict,
        }
    }
}

impl Deserializer for StrEncodingDeserializer {
    type Item = String;
    type Error = Cow<'static, str>;

    fn deserialize(&self, _topic_name: &str, data: Bytes) -> Result<String, Cow<'static, str>> {
        self.encoding.decode(&data, self.trap)
    }
}
