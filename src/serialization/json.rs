use std::marker::PhantomData;

use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json;

use serialization::{Deserializer, Serializer};

/// Serializes any `Serialize` value to its JSON encoding.
pub struct JsonSerializer<T> {
    _marker: PhantomData<T>,
}

impl<T> Default for JsonSerializer<T> {
    fn default() -> JsonSerializer<T> {
        JsonSerializer { _marker: PhantomData }
    }
}

impl<T: Serialize> Serializer for JsonSerializer<T> {
    type Item = T;
    type Error = serde_json::Error;

    fn serialize(&self, _topic_name: &str, data: T) -> Result<Bytes, serde_json::Error> {
        serde_json::to_vec(&data).map(Bytes::from)
    }
}

/// Deserializes a value of type `T` from its JSON encoding.
pub struct JsonDeserializer<T> {
    _marker: PhantomData<T>,
}

impl<T> Default for JsonDeserializer<T> {
    fn default() -> JsonDeserializer<T> {
        JsonDeserializer { _marker: PhantomData }
    }
}

impl<T: DeserializeOwned> Deserializer for JsonDeserializer<T> {
    type Item = T;
    type Error = serde_json::Error;

    fn deserialize(&self, _topic_name: &str, data: Bytes) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&data)
    }
}
