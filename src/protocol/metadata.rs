//! Metadata API (key 3, version 0 only).
//!
//! ```text
//! MetadataRequest => [TopicName]
//!
//! MetadataResponse => [Broker] [TopicMetadata]
//!   Broker => NodeId Host Port
//!   TopicMetadata => TopicErrorCode TopicName [PartitionMetadata]
//!   PartitionMetadata => PartitionErrorCode PartitionId Leader [Replicas] [Isr]
//! ```

use protocol::{ApiVersion, Decodable, Encodable, ErrorCode, NodeId, PartitionId, Reader, Writer};
use errors::Result;

#[derive(Clone, Debug, PartialEq, Default)]
pub struct MetadataRequest {
    /// Empty means "all topics known to the cluster".
    pub topics: Vec<String>,
}

impl Encodable for MetadataRequest {
    fn encode(&self, _api_version: ApiVersion, writer: &mut Writer) {
        writer.write_array(&self.topics, |w, topic| w.write_string(Some(topic)));
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct BrokerMetadata {
    pub node_id: NodeId,
    pub host: String,
    pub port: i32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PartitionMetadata {
    pub error_code: ErrorCode,
    pub partition: PartitionId,
    pub leader: NodeId,
    pub replicas: Vec<NodeId>,
    pub isr: Vec<NodeId>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TopicMetadata {
    pub error_code: ErrorCode,
    pub topic_name: String,
    pub partitions: Vec<PartitionMetadata>,
}

#[derive(Clone, Debug, PartialEq, Default)]
pub struct MetadataResponse {
    pub brokers: Vec<BrokerMetadata>,
    pub topics: Vec<TopicMetadata>,
}

impl Decodable for MetadataResponse {
    fn decode(_api_version: ApiVersion, reader: &mut Reader) -> Result<MetadataResponse> {
        let brokers = reader.read_array(|r| {
                Ok(BrokerMetadata {
                       node_id: r.read_i32()?,
                       host: r.read_string()?.unwrap_or_default(),
                       port: r.read_i32()?,
                   })
            })?;

        let topics = reader.read_array(|r| {
                let error_code = r.read_i16()?;
                let topic_name = r.read_string()?.unwrap_or_default();
                let partitions = r.read_array(|r| {
                        Ok(PartitionMetadata {
                               error_code: r.read_i16()?,
                               partition: r.read_i32()?,
                               leader: r.read_i32()?,
                               replicas: r.read_array(|r| r.read_i32())?,
                               isr: r.read_array(|r| r.read_i32())?,
                           })
                    })?;
                Ok(TopicMetadata {
                       error_code: error_code,
                       topic_name: topic_name,
                       partitions: partitions,
                   })
            })?;

        Ok(MetadataResponse {
               brokers: brokers,
               topics: topics,
           })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_empty_topics_means_all() {
        let req = MetadataRequest::default();
        let mut w = Writer::with_capacity(8);
        req.encode(0, &mut w);
        let bytes = w.into_bytes();
        assert_eq!(&bytes[..], &[0, 0, 0, 0]);
    }

    #[test]
    fn test_decode_metadata_response() {
        let mut w = Writer::with_capacity(128);
        w.write_array(&[1i32], |w, n| w.write_i32(*n)); // 1 broker
        w.write_i32(7); // node_id
        w.write_string(Some("broker7"));
        w.write_i32(9092);

        w.write_i32(1); // 1 topic
        w.write_i16(0); // topic error_code
        w.write_string(Some("mytopic"));
        w.write_i32(1); // 1 partition
        w.write_i16(0); // partition error_code
        w.write_i32(0); // partition id
        w.write_i32(7); // leader
        w.write_array(&[7i32], |w, n| w.write_i32(*n)); // replicas
        w.write_array(&[7i32], |w, n| w.write_i32(*n)); // isr

        let bytes = w.into_bytes();
        let mut r = Reader::new(&bytes);
        let resp = MetadataResponse::decode(0, &mut r).unwrap();

        assert_eq!(resp.brokers.len(), 1);
        assert_eq!(resp.brokers[0].host, "broker7");
        assert_eq!(resp.topics.len(), 1);
        assert_eq!(resp.topics[0].topic_name, "mytopic");
        assert_eq!(resp.topics[0].partitions[0].leader, 7);
    }
}
