//! Produce API (key 0, versions 0-2).
//!
//! ```text
//! ProduceRequest => RequiredAcks Timeout [TopicName [Partition MessageSetSize MessageSet]]
//!
//! ProduceResponse => [TopicName [Partition ErrorCode Offset]] (v0)
//!                    ... + ThrottleTimeMs                      (v1)
//!                    ... + LogAppendTime per partition          (v2)
//! ```

use bytes::Bytes;

use protocol::{ApiVersion, Decodable, Encodable, ErrorCode, Offset, PartitionId, Reader, Writer};
use errors::Result;

#[derive(Clone, Debug, PartialEq)]
pub struct ProducePartitionData {
    pub partition: PartitionId,
    /// A fully-encoded message set, as produced by `protocol::message`.
    pub message_set: Bytes,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ProduceTopicData {
    pub topic_name: String,
    pub partitions: Vec<ProducePartitionData>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ProduceRequest {
    pub required_acks: i16,
    pub timeout_ms: i32,
    pub topics: Vec<ProduceTopicData>,
}

impl Encodable for ProduceRequest {
    fn encode(&self, _api_version: ApiVersion, writer: &mut Writer) {
        writer.write_i16(self.required_acks);
        writer.write_i32(self.timeout_ms);
        writer.write_array(&self.topics, |w, topic| {
            w.write_string(Some(&topic.topic_name));
            w.write_array(&topic.partitions, |w, partition| {
                w.write_i32(partition.partition);
                w.write_opaque(&partition.message_set);
            });
        });
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ProducePartitionResponse {
    pub partition: PartitionId,
    pub error_code: ErrorCode,
    pub offset: Offset,
    /// Present only at api_version >= 2 (`LogAppendTime`); `None` otherwise.
    pub log_append_time: Option<i64>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ProduceTopicResponse {
    pub topic_name: String,
    pub partitions: Vec<ProducePartitionResponse>,
}

#[derive(Clone, Debug, PartialEq, Default)]
pub struct ProduceResponse {
    pub topics: Vec<ProduceTopicResponse>,
    pub throttle_time_ms: i32,
}

impl Decodable for ProduceResponse {
    fn decode(api_version: ApiVersion, reader: &mut Reader) -> Result<ProduceResponse> {
        let topics = reader.read_array(|r| {
                let topic_name = r.read_string()?.unwrap_or_default();
                let partitions = r.read_array(|r| {
                        let partition = r.read_i32()?;
                        let error_code = r.read_i16()?;
                        let offset = r.read_i64()?;
                        let log_append_time = if api_version >= 2 { Some(r.read_i64()?) } else { None };
                        Ok(ProducePartitionResponse {
                               partition: partition,
                               error_code: error_code,
                               offset: offset,
                               log_append_time: log_append_time,
                           })
                    })?;
                Ok(ProduceTopicResponse {
                       topic_name: topic_name,
                       partitions: partitions,
                   })
            })?;

        let throttle_time_ms = if api_version >= 1 { reader.read_i32()? } else { 0 };

        Ok(ProduceResponse {
               topics: topics,
               throttle_time_ms: throttle_time_ms,
           })
    }
}

/// For `required_acks == 0` the broker sends nothing back; the dispatcher
/// synthesizes this instead of reading the socket.
pub fn synthesize_no_ack_response(request: &ProduceRequest) -> ProduceResponse {
    ProduceResponse {
        topics: request
            .topics
            .iter()
            .map(|topic| {
                     ProduceTopicResponse {
                         topic_name: topic.topic_name.clone(),
                         partitions: topic
                             .partitions
                             .iter()
                             .map(|partition| {
                                      ProducePartitionResponse {
                                          partition: partition.partition,
                                          error_code: 0,
                                          offset: -1,
                                          log_append_time: None,
                                      }
                                  })
                             .collect(),
                     }
                 })
            .collect(),
        throttle_time_ms: 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_produce_request_v0() {
        let req = ProduceRequest {
            required_acks: 1,
            timeout_ms: 1500,
            topics: vec![ProduceTopicData {
                             topic_name: "t".to_owned(),
                             partitions: vec![ProducePartitionData {
                                                   partition: 0,
                                                   message_set: Bytes::from(&b"abc"[..]),
                                               }],
                         }],
        };

        let mut w = Writer::with_capacity(64);
        req.encode(0, &mut w);
        let bytes = w.into_bytes();

        let mut r = Reader::new(&bytes);
        assert_eq!(r.read_i16().unwrap(), 1);
        assert_eq!(r.read_i32().unwrap(), 1500);
        assert_eq!(r.read_i32().unwrap(), 1); // topic count
        assert_eq!(r.read_string().unwrap(), Some("t".to_owned()));
        assert_eq!(r.read_i32().unwrap(), 1); // partition count
        assert_eq!(r.read_i32().unwrap(), 0);
        assert_eq!(r.read_opaque().unwrap(), b"abc");
    }

    #[test]
    fn test_decode_produce_response_v0_has_no_throttle_or_append_time() {
        let mut w = Writer::with_capacity(32);
        w.write_array(&[0i32], |w, _| {
            w.write_string(Some("t"));
            w.write_array(&[0i32], |w, _| {
                w.write_i32(0);
                w.write_i16(0);
                w.write_i64(42);
            });
        });

        let bytes = w.into_bytes();
        let mut r = Reader::new(&bytes);
        let resp = ProduceResponse::decode(0, &mut r).unwrap();

        assert_eq!(resp.topics[0].partitions[0].offset, 42);
        assert_eq!(resp.topics[0].partitions[0].log_append_time, None);
        assert_eq!(resp.throttle_time_ms, 0);
    }

    #[test]
    fn test_synthesize_no_ack_response() {
        let req = ProduceRequest {
            required_acks: 0,
            timeout_ms: 0,
            topics: vec![ProduceTopicData {
                             topic_name: "t".to_owned(),
                             partitions: vec![ProducePartitionData {
                                                   partition: 3,
                                                   message_set: Bytes::from(&b""[..]),
                                               }],
                         }],
        };

        let resp = synthesize_no_ack_response(&req);
        assert_eq!(resp.topics[0].partitions[0].partition, 3);
        assert_eq!(resp.topics[0].partitions[0].error_code, 0);
    }
}
