//! Offset API (key 2, versions 0-1) -- despite the api name "ListOffsets" in
//! later broker versions, this is the same `OFFSET` request the 0.8-0.10
//! wire protocol documents.
//!
//! ```text
//! OffsetRequest => ReplicaId [TopicName [Partition Time MaxNumberOfOffsets (v0 only)]]
//! OffsetResponse => [TopicName [Partition ErrorCode [Offset] (v0) | ErrorCode Timestamp Offset (v1)]]
//! ```

use protocol::{ApiVersion, Decodable, Encodable, ErrorCode, Offset, PartitionId, Reader, Timestamp,
               Writer};
use errors::Result;

pub const LATEST_OFFSET_TIME: i64 = -1;
pub const EARLIEST_OFFSET_TIME: i64 = -2;

#[derive(Clone, Debug, PartialEq)]
pub struct OffsetPartition {
    pub partition: PartitionId,
    pub time: i64,
    /// Only encoded at api_version 0; v1 always asks for exactly one offset.
    pub max_number_of_offsets: i32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct OffsetTopic {
    pub topic_name: String,
    pub partitions: Vec<OffsetPartition>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct OffsetRequest {
    pub replica_id: i32,
    pub topics: Vec<OffsetTopic>,
}

impl Encodable for OffsetRequest {
    fn encode(&self, api_version: ApiVersion, writer: &mut Writer) {
        writer.write_i32(self.replica_id);
        writer.write_array(&self.topics, |w, topic| {
            w.write_string(Some(&topic.topic_name));
            w.write_array(&topic.partitions, |w, partition| {
                w.write_i32(partition.partition);
                w.write_i64(partition.time);
                if api_version == 0 {
                    w.write_i32(partition.max_number_of_offsets);
                }
            });
        });
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct OffsetPartitionData {
    pub partition: PartitionId,
    pub error_code: ErrorCode,
    /// v0 may return several candidate offsets, newest first; v1 returns
    /// exactly one offset alongside its timestamp.
    pub offsets: Vec<Offset>,
    pub timestamp: Option<Timestamp>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct OffsetTopicData {
    pub topic_name: String,
    pub partitions: Vec<OffsetPartitionData>,
}

#[derive(Clone, Debug, PartialEq, Default)]
pub struct OffsetResponse {
    pub topics: Vec<OffsetTopicData>,
}

impl Decodable for OffsetResponse {
    fn decode(api_version: ApiVersion, reader: &mut Reader) -> Result<OffsetResponse> {
        let topics = reader.read_array(|r| {
                let topic_name = r.read_string()?.unwrap_or_default();
                let partitions = r.read_array(|r| {
                        let partition = r.read_i32()?;
                        let error_code = r.read_i16()?;
                        if api_version == 0 {
                            let offsets = r.read_array(Reader::read_i64)?;
                            Ok(OffsetPartitionData {
                                   partition: partition,
                                   error_code: error_code,
                                   offsets: offsets,
                                   timestamp: None,
                               })
                        } else {
                            let timestamp = r.read_i64()?;
                            let offset = r.read_i64()?;
                            Ok(OffsetPartitionData {
                                   partition: partition,
                                   error_code: error_code,
                                   offsets: vec![offset],
                                   timestamp: Some(timestamp),
                               })
                        }
                    })?;
                Ok(OffsetTopicData {
                       topic_name: topic_name,
                       partitions: partitions,
                   })
            })?;

        Ok(OffsetResponse { topics: topics })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_offset_request_v0_includes_max_number_of_offsets() {
        let req = OffsetRequest {
            replica_id: -1,
            topics: vec![OffsetTopic {
                             topic_name: "t".to_owned(),
                             partitions: vec![OffsetPartition {
                                                   partition: 0,
                                                   time: LATEST_OFFSET_TIME,
                                                   max_number_of_offsets: 1,
                                               }],
                         }],
        };

        let mut w = Writer::with_capacity(32);
        req.encode(0, &mut w);
        let bytes = w.into_bytes();

        let mut r = Reader::new(&bytes);
        assert_eq!(r.read_i32().unwrap(), -1);
        r.read_i32().unwrap(); // topic count
        r.read_string().unwrap();
        r.read_i32().unwrap(); // partition count
        r.read_i32().unwrap(); // partition
        assert_eq!(r.read_i64().unwrap(), LATEST_OFFSET_TIME);
        assert_eq!(r.read_i32().unwrap(), 1); // max_number_of_offsets present
    }

    #[test]
    fn test_decode_offset_response_v1_single_offset() {
        let mut w = Writer::with_capacity(32);
        w.write_array(&[0i32], |w, _| {
            w.write_string(Some("t"));
            w.write_array(&[0i32], |w, _| {
                w.write_i32(0);
                w.write_i16(0);
                w.write_i64(123_456);
                w.write_i64(99);
            });
        });
        let bytes = w.into_bytes();
        let mut r = Reader::new(&bytes);
        let resp = OffsetResponse::decode(1, &mut r).unwrap();

        assert_eq!(resp.topics[0].partitions[0].offsets, vec![99]);
        assert_eq!(resp.topics[0].partitions[0].timestamp, Some(123_456));
    }
}
