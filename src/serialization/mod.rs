//! Converting between application values and the raw bytes that go on the
//! wire as a message key or value. Every converter is independent of the
//! client: callers serialize before calling `Producer::produce` and
//! deserialize after calling `Consumer::fetch`.

mod bytes;
mod noop;
mod raw;
mod str;

pub use self::bytes::{BytesDeserializer, BytesSerializer};
pub use self::noop::{NoopDeserializer, NoopSerializer};
pub use self::raw::{RawDeserializer, RawSerializer};
pub use self::str::{StringDeserializer, StringSerializer};

#[cfg(feature = "encoding")]
mod encoding;
#[cfg(feature = "encoding")]
pub use self::encoding::{StrEncodingDeserializer, StrEncodingSerializer};

#[cfg(feature = "json")]
mod json;
#[cfg(feature = "json")]
pub use self::json::{JsonDeserializer, JsonSerializer};

use ::bytes::Bytes;

/// An uninhabited error type for converters that cannot fail, so their
/// `Result` still composes with ones that can.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Never {}

/// Turns an application value into the bytes sent as a message key or
/// value for `topic_name`. The topic is passed through so a single
/// serializer can vary its format per topic if it needs to.
pub trait Serializer {
    type Item;
    type Error;

    fn serialize(&self, topic_name: &str, data: Self::Item) -> Result<Bytes, Self::Error>;
}

/// The inverse of `Serializer`: turns the raw bytes fetched for `topic_name`
/// back into an application value.
pub trait Deserializer {
    type Item;
    type Error;

    fn deserialize(&self, topic_name: &str, data: Bytes) -> Result<Self::Item, Self::Error>;
}
