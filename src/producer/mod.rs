//! The producer facade: builds a message set, dispatches a Produce request
//! at the partition's leader, and reports back the assigned offset (or the
//! synthesized no-op response when `required_acks == 0`).

use bytes::Bytes;

use client::{KafkaClient, Target};
use compression::Compression;
use errors::{ErrorKind, Result};
use protocol::{encode_compressed_message_set, encode_message_set, synthesize_no_ack_response, ApiKeys,
              Message, Offset, PartitionId, ProducePartitionData, ProduceRequest, ProduceResponse,
              ProduceTopicData, Timestamp};

const MESSAGE_FORMAT_MAGIC: i8 = 0;

/// One record handed to `Producer::produce`; offsets are assigned by the
/// broker, so this carries only what the caller actually controls.
#[derive(Clone, Debug, PartialEq)]
pub struct ProducerRecord {
    pub key: Option<Bytes>,
    pub value: Option<Bytes>,
    pub timestamp: Option<Timestamp>,
}

impl ProducerRecord {
    pub fn from_value<V: Into<Bytes>>(value: V) -> ProducerRecord {
        ProducerRecord {
            key: None,
            value: Some(value.into()),
            timestamp: None,
        }
    }

    pub fn new<K: Into<Bytes>, V: Into<Bytes>>(key: K, value: V) -> ProducerRecord {
        ProducerRecord {
            key: Some(key.into()),
            value: Some(value.into()),
            timestamp: None,
        }
    }

    fn into_message(self, offset: Offset) -> Message {
        Message {
            offset: offset,
            timestamp: self.timestamp,
            key: self.key,
            value: self.value,
        }
    }
}

/// The result of a successful produce, mirroring the one partition this
/// crate's dispatcher always targets.
#[derive(Clone, Debug, PartialEq)]
pub struct ProduceResult {
    pub partition: PartitionId,
    pub offset: Offset,
}

pub struct Producer {
    client: KafkaClient,
}

impl Producer {
    pub fn new(client: KafkaClient) -> Producer {
        Producer { client: client }
    }

    pub fn client(&self) -> &KafkaClient {
        &self.client
    }

    pub fn client_mut(&mut self) -> &mut KafkaClient {
        &mut self.client
    }

    /// Sends `records` to `topic`/`partition` as a single message set,
    /// compressed with `compression` unless it is `Compression::None`.
    /// `required_acks` follows the wire convention directly: `0` returns
    /// immediately with a synthesized offset of `-1`, `1` waits for the
    /// leader's local write, `-1` waits for the full in-sync replica set.
    pub fn produce(&mut self,
                   topic: &str,
                   partition: PartitionId,
                   records: Vec<ProducerRecord>,
                   required_acks: i16,
                   timeout_ms: i32,
                   compression: Compression)
                   -> Result<ProduceResult> {
        let topic = topic.to_owned();
        let target = Target::Leader {
            topic: topic.clone(),
            partition: partition,
        };
        let required_acks_zero = required_acks == 0;

        let response: ProduceResponse = {
            let topic = topic.clone();
            let records = records;
            self.client.dispatch(ApiKeys::Produce,
                                  target,
                                  required_acks_zero,
                                  move || {
                    let messages: Vec<Message> = records
                        .iter()
                        .cloned()
                        .enumerate()
                        .map(|(i, r)| r.into_message(i as Offset))
                        .collect();

                    let mut set_writer = ::protocol::Writer::with_capacity(256);
                    if compression == Compression::None {
                        encode_message_set(&mut set_writer, MESSAGE_FORMAT_MAGIC, &messages);
                    } else {
                        // A codec failure here cannot be surfaced through
                        // the builder closure's infallible signature; fall
                        // back to an uncompressed set rather than silently
                        // dropping the request.
                        if encode_compressed_message_set(&mut set_writer, MESSAGE_FORMAT_MAGIC, compression, &messages)
                               .is_err() {
                            set_writer = ::protocol::Writer::with_capacity(256);
                            encode_message_set(&mut set_writer, MESSAGE_FORMAT_MAGIC, &messages);
                        }
                    }

                    ProduceRequest {
                        required_acks: required_acks,
                        timeout_ms: timeout_ms,
                        topics: vec![ProduceTopicData {
                                         topic_name: topic.clone(),
                                         partitions: vec![ProducePartitionData {
                                                               partition: partition,
                                                               message_set: set_writer.into_bytes(),
                                                           }],
                                     }],
                    }
                },
                                  Some(|req: &ProduceRequest| synthesize_no_ack_response(req)))?
        };

        let partition_response = response
            .topics
            .into_iter()
            .next()
            .and_then(|t| t.partitions.into_iter().next())
            .ok_or_else(|| ErrorKind::EmptyMetadata)?;

        Ok(ProduceResult {
               partition: partition_response.partition,
               offset: partition_response.offset,
           })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_producer_record_from_value_has_no_key() {
        let record = ProducerRecord::from_value(&b"v"[..]);
        assert!(record.key.is_none());
        assert_eq!(record.value, Some(Bytes::from(&b"v"[..])));
    }
}
