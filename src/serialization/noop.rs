use bytes::Bytes;

use serialization::{Deserializer, Never, Serializer};

/// Produces and accepts an empty payload; useful for keyless records and
/// for tombstones.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopSerializer;

impl Serializer for NoopSerializer {
    type Item = ();
    type Error = Never;

    fn serialize(&self, _topic_name: &str, _data: ()) -> Result<Bytes, Never> {
        Ok(Bytes::new())
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct NoopDeserializer;

impl Deserializer for NoopDeserializer {
    type Item = ();
    type Error = Never;

    fn deserialize(&self, _topic_name: &str, _data: Bytes) -> Result<(), Never> {
        Ok(())
    }
}
