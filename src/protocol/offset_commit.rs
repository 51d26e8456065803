//! OffsetCommit API (key 8, versions 0-1).
//!
//! This client has no group membership (no JoinGroup/SyncGroup/Heartbeat),
//! so v1 commits are always sent with `generation_id = -1, member_id = ""`.
//!
//! ```text
//! OffsetCommitRequest => GroupId [GenerationId MemberId (v1)]
//!                        [TopicName [Partition Offset [Timestamp (v1)] Metadata]]
//! OffsetCommitResponse => [TopicName [Partition ErrorCode]]
//! ```

use protocol::{ApiVersion, Decodable, Encodable, ErrorCode, GenerationId, Offset, PartitionId,
               Reader, Writer};
use errors::Result;

/// The generation id this client always sends: it never joins a consumer
/// group, so it has no real generation.
pub const NO_GENERATION: GenerationId = -1;

#[derive(Clone, Debug, PartialEq)]
pub struct OffsetCommitPartition {
    pub partition: PartitionId,
    pub offset: Offset,
    /// Only encoded at api_version 1; the broker stamps `now_ms` if absent.
    pub timestamp: Option<i64>,
    pub metadata: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct OffsetCommitTopic {
    pub topic_name: String,
    pub partitions: Vec<OffsetCommitPartition>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct OffsetCommitRequest {
    pub group_id: String,
    pub generation_id: GenerationId,
    pub member_id: String,
    pub topics: Vec<OffsetCommitTopic>,
}

impl Encodable for OffsetCommitRequest {
    fn encode(&self, api_version: ApiVersion, writer: &mut Writer) {
        writer.write_string(Some(&self.group_id));
        if api_version >= 1 {
            writer.write_i32(self.generation_id);
            writer.write_string(Some(&self.member_id));
        }
        writer.write_array(&self.topics, |w, topic| {
            w.write_string(Some(&topic.topic_name));
            w.write_array(&topic.partitions, |w, partition| {
                w.write_i32(partition.partition);
                w.write_i64(partition.offset);
                if api_version >= 1 {
                    w.write_i64(partition.timestamp.unwrap_or(-1));
                }
                w.write_string(partition.metadata.as_ref().map(String::as_str));
            });
        });
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct OffsetCommitTopicResponse {
    pub topic_name: String,
    pub partitions: Vec<(PartitionId, ErrorCode)>,
}

#[derive(Clone, Debug, PartialEq, Default)]
pub struct OffsetCommitResponse {
    pub topics: Vec<OffsetCommitTopicResponse>,
}

impl Decodable for OffsetCommitResponse {
    fn decode(_api_version: ApiVersion, reader: &mut Reader) -> Result<OffsetCommitResponse> {
        let topics = reader.read_array(|r| {
                let topic_name = r.read_string()?.unwrap_or_default();
                let partitions = r.read_array(|r| Ok((r.read_i32()?, r.read_i16()?)))?;
                Ok(OffsetCommitTopicResponse {
                       topic_name: topic_name,
                       partitions: partitions,
                   })
            })?;
        Ok(OffsetCommitResponse { topics: topics })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_offset_commit_v1_uses_no_generation_convention() {
        let req = OffsetCommitRequest {
            group_id: "g".to_owned(),
            generation_id: NO_GENERATION,
            member_id: String::new(),
            topics: vec![OffsetCommitTopic {
                             topic_name: "t".to_owned(),
                             partitions: vec![OffsetCommitPartition {
                                                   partition: 0,
                                                   offset: 10,
                                                   timestamp: None,
                                                   metadata: None,
                                               }],
                         }],
        };

        let mut w = Writer::with_capacity(64);
        req.encode(1, &mut w);
        let bytes = w.into_bytes();

        let mut r = Reader::new(&bytes);
        assert_eq!(r.read_string().unwrap(), Some("g".to_owned()));
        assert_eq!(r.read_i32().unwrap(), -1); // generation_id
        assert_eq!(r.read_string().unwrap(), Some(String::new())); // member_id
    }

    #[test]
    fn test_decode_offset_commit_response() {
        let mut w = Writer::with_capacity(32);
        w.write_array(&[0i32], |w, _| {
            w.write_string(Some("t"));
            w.write_array(&[0i32], |w, _| {
                w.write_i32(0);
                w.write_i16(0);
            });
        });
        let bytes = w.into_bytes();
        let mut r = Reader::new(&bytes);
        let resp = OffsetCommitResponse::decode(1, &mut r).unwrap();
        assert_eq!(resp.topics[0].partitions[0], (0, 0));
    }
}
