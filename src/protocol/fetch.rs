//! Fetch API (key 1, versions 0-3).
//!
//! ```text
//! FetchRequest => ReplicaId MaxWaitTime MinBytes [MaxBytes (v3+)]
//!                 [TopicName [Partition FetchOffset MaxBytes]]
//!
//! FetchResponse => [ThrottleTimeMs (v1+)]
//!                  [TopicName [Partition ErrorCode HighwaterMarkOffset MessageSetSize MessageSet]]
//! ```

use protocol::message::{decode_message_set, DecodeOptions, FetchedMessage};
use protocol::{ApiVersion, Decodable, Encodable, ErrorCode, Offset, PartitionId, Reader, Writer};
use errors::Result;

/// The replica id a regular consumer sends: not a broker, so always -1.
pub const CONSUMER_REPLICA_ID: i32 = -1;

#[derive(Clone, Debug, PartialEq)]
pub struct FetchPartition {
    pub partition: PartitionId,
    pub fetch_offset: Offset,
    pub max_bytes: i32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct FetchTopic {
    pub topic_name: String,
    pub partitions: Vec<FetchPartition>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct FetchRequest {
    pub replica_id: i32,
    pub max_wait_time: i32,
    pub min_bytes: i32,
    /// Only encoded at api_version >= 3.
    pub max_bytes: i32,
    pub topics: Vec<FetchTopic>,
}

impl Encodable for FetchRequest {
    fn encode(&self, api_version: ApiVersion, writer: &mut Writer) {
        writer.write_i32(self.replica_id);
        writer.write_i32(self.max_wait_time);
        writer.write_i32(self.min_bytes);
        if api_version >= 3 {
            writer.write_i32(self.max_bytes);
        }
        writer.write_array(&self.topics, |w, topic| {
            w.write_string(Some(&topic.topic_name));
            w.write_array(&topic.partitions, |w, partition| {
                w.write_i32(partition.partition);
                w.write_i64(partition.fetch_offset);
                w.write_i32(partition.max_bytes);
            });
        });
    }
}

/// A decoded partition response, already expanded into individual messages
/// (compressed batches have been unwrapped, truncated trailing fragments
/// discarded).
#[derive(Clone, Debug, PartialEq)]
pub struct FetchPartitionData {
    pub partition: PartitionId,
    pub error_code: ErrorCode,
    pub highwater_mark_offset: Offset,
    pub messages: Vec<FetchedMessage>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct FetchTopicData {
    pub topic_name: String,
    pub partitions: Vec<FetchPartitionData>,
}

#[derive(Clone, Debug, PartialEq, Default)]
pub struct FetchResponse {
    pub throttle_time_ms: i32,
    pub topics: Vec<FetchTopicData>,
}

impl FetchResponse {
    pub fn decode_with_options(api_version: ApiVersion,
                               reader: &mut Reader,
                               opts: DecodeOptions)
                               -> Result<FetchResponse> {
        let throttle_time_ms = if api_version >= 1 { reader.read_i32()? } else { 0 };

        let topics = reader.read_array(|r| {
                let topic_name = r.read_string()?.unwrap_or_default();
                let partitions = r.read_array(|r| {
                        let partition = r.read_i32()?;
                        let error_code = r.read_i16()?;
                        let highwater_mark_offset = r.read_i64()?;
                        let message_set_bytes = r.read_opaque()?;
                        let messages = decode_message_set(message_set_bytes, highwater_mark_offset, opts)?;
                        Ok(FetchPartitionData {
                               partition: partition,
                               error_code: error_code,
                               highwater_mark_offset: highwater_mark_offset,
                               messages: messages,
                           })
                    })?;
                Ok(FetchTopicData {
                       topic_name: topic_name,
                       partitions: partitions,
                   })
            })?;

        Ok(FetchResponse {
               throttle_time_ms: throttle_time_ms,
               topics: topics,
           })
    }
}

impl Decodable for FetchResponse {
    fn decode(api_version: ApiVersion, reader: &mut Reader) -> Result<FetchResponse> {
        FetchResponse::decode_with_options(api_version, reader, DecodeOptions::default())
    }

    fn decode_opts(api_version: ApiVersion, reader: &mut Reader, opts: DecodeOptions) -> Result<FetchResponse> {
        FetchResponse::decode_with_options(api_version, reader, opts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use protocol::message::encode_message;

    #[test]
    fn test_encode_fetch_request_v3_includes_max_bytes() {
        let req = FetchRequest {
            replica_id: CONSUMER_REPLICA_ID,
            max_wait_time: 100,
            min_bytes: 1,
            max_bytes: 1_048_576,
            topics: vec![],
        };

        let mut w = Writer::with_capacity(32);
        req.encode(3, &mut w);
        let bytes = w.into_bytes();

        let mut r = Reader::new(&bytes);
        assert_eq!(r.read_i32().unwrap(), -1);
        assert_eq!(r.read_i32().unwrap(), 100);
        assert_eq!(r.read_i32().unwrap(), 1);
        assert_eq!(r.read_i32().unwrap(), 1_048_576);
        assert_eq!(r.read_i32().unwrap(), 0); // empty topics array
    }

    #[test]
    fn test_encode_fetch_request_v0_omits_max_bytes() {
        let req = FetchRequest {
            replica_id: CONSUMER_REPLICA_ID,
            max_wait_time: 100,
            min_bytes: 1,
            max_bytes: 1_048_576,
            topics: vec![],
        };

        let mut w = Writer::with_capacity(32);
        req.encode(0, &mut w);
        let bytes = w.into_bytes();

        // replica_id + max_wait_time + min_bytes + empty topic array, no max_bytes
        assert_eq!(bytes.len(), 4 + 4 + 4 + 4);
    }

    #[test]
    fn test_decode_fetch_response_expands_messages() {
        let mut message_set = Writer::with_capacity(64);
        encode_message(&mut message_set, 10, 0, 0, None, None, Some(b"a message"));
        let message_set = message_set.into_bytes();

        let mut w = Writer::with_capacity(128);
        w.write_array(&[0i32], |w, _| {
            w.write_string(Some("t"));
            w.write_array(&[0i32], |w, _| {
                w.write_i32(0); // partition
                w.write_i16(0); // error_code
                w.write_i64(11); // highwater_mark_offset
                w.write_opaque(&message_set);
            });
        });
        let bytes = w.into_bytes();

        let mut r = Reader::new(&bytes);
        let resp = FetchResponse::decode(0, &mut r).unwrap();

        assert_eq!(resp.topics[0].partitions[0].messages.len(), 1);
        assert_eq!(resp.topics[0].partitions[0].messages[0].offset, 10);
        assert_eq!(resp.topics[0].partitions[0].highwater_mark_offset, 11);
    }
}
