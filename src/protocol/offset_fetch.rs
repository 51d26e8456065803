//! OffsetFetch API (key 9, versions 0-1). The wire format is identical
//! between the two versions; v1 only changes where the broker looks up
//! committed offsets (Zookeeper vs. the internal `__consumer_offsets`
//! topic), which is transparent to the client.
//!
//! ```text
//! OffsetFetchRequest => GroupId [TopicName [Partition]]
//! OffsetFetchResponse => [TopicName [Partition Offset Metadata ErrorCode]]
//! ```

use protocol::{ApiVersion, Decodable, Encodable, ErrorCode, Offset, PartitionId, Reader, Writer};
use errors::Result;

#[derive(Clone, Debug, PartialEq)]
pub struct OffsetFetchTopic {
    pub topic_name: String,
    pub partitions: Vec<PartitionId>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct OffsetFetchRequest {
    pub group_id: String,
    pub topics: Vec<OffsetFetchTopic>,
}

impl Encodable for OffsetFetchRequest {
    fn encode(&self, _api_version: ApiVersion, writer: &mut Writer) {
        writer.write_string(Some(&self.group_id));
        writer.write_array(&self.topics, |w, topic| {
            w.write_string(Some(&topic.topic_name));
            w.write_array(&topic.partitions, |w, partition| w.write_i32(*partition));
        });
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct OffsetFetchPartitionData {
    pub partition: PartitionId,
    pub offset: Offset,
    pub metadata: Option<String>,
    pub error_code: ErrorCode,
}

#[derive(Clone, Debug, PartialEq)]
pub struct OffsetFetchTopicData {
    pub topic_name: String,
    pub partitions: Vec<OffsetFetchPartitionData>,
}

#[derive(Clone, Debug, PartialEq, Default)]
pub struct OffsetFetchResponse {
    pub topics: Vec<OffsetFetchTopicData>,
}

impl Decodable for OffsetFetchResponse {
    fn decode(_api_version: ApiVersion, reader: &mut Reader) -> Result<OffsetFetchResponse> {
        let topics = reader.read_array(|r| {
                let topic_name = r.read_string()?.unwrap_or_default();
                let partitions = r.read_array(|r| {
                        Ok(OffsetFetchPartitionData {
                               partition: r.read_i32()?,
                               offset: r.read_i64()?,
                               metadata: r.read_string()?,
                               error_code: r.read_i16()?,
                           })
                    })?;
                Ok(OffsetFetchTopicData {
                       topic_name: topic_name,
                       partitions: partitions,
                   })
            })?;
        Ok(OffsetFetchResponse { topics: topics })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_offset_fetch_request() {
        let req = OffsetFetchRequest {
            group_id: "g".to_owned(),
            topics: vec![OffsetFetchTopic {
                             topic_name: "t".to_owned(),
                             partitions: vec![0, 1],
                         }],
        };

        let mut w = Writer::with_capacity(32);
        req.encode(1, &mut w);
        let bytes = w.into_bytes();

        let mut r = Reader::new(&bytes);
        assert_eq!(r.read_string().unwrap(), Some("g".to_owned()));
        r.read_i32().unwrap(); // topic count
        r.read_string().unwrap();
        assert_eq!(r.read_i32().unwrap(), 2); // partition count
        assert_eq!(r.read_i32().unwrap(), 0);
        assert_eq!(r.read_i32().unwrap(), 1);
    }

    #[test]
    fn test_decode_offset_fetch_response_no_committed_offset_is_minus_one() {
        let mut w = Writer::with_capacity(32);
        w.write_array(&[0i32], |w, _| {
            w.write_string(Some("t"));
            w.write_array(&[0i32], |w, _| {
                w.write_i32(0);
                w.write_i64(-1);
                w.write_string(None);
                w.write_i16(0);
            });
        });
        let bytes = w.into_bytes();
        let mut r = Reader::new(&bytes);
        let resp = OffsetFetchResponse::decode(1, &mut r).unwrap();
        assert_eq!(resp.topics[0].partitions[0].offset, -1);
    }
}
