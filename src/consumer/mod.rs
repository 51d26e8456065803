//! The consumer facade: fetching a message batch from a partition's leader,
//! resolving time-based offsets, and committing/fetching consumer-group
//! offsets at the group's coordinator.

use std::collections::HashMap;

use client::{KafkaClient, Target};
use errors::{ErrorKind, Result};
use protocol::{ApiKeys, FetchPartition, FetchRequest, FetchResponse, FetchTopic, FetchedMessage,
              Offset, OffsetCommitPartition, OffsetCommitRequest, OffsetCommitResponse, OffsetCommitTopic,
              OffsetFetchRequest, OffsetFetchResponse, OffsetFetchTopic, OffsetPartition, OffsetRequest,
              OffsetResponse, OffsetTopic, PartitionId, CONSUMER_REPLICA_ID, EARLIEST_OFFSET_TIME,
              LATEST_OFFSET_TIME, NO_GENERATION};

pub struct Consumer {
    client: KafkaClient,
}

impl Consumer {
    pub fn new(client: KafkaClient) -> Consumer {
        Consumer { client: client }
    }

    pub fn client(&self) -> &KafkaClient {
        &self.client
    }

    pub fn client_mut(&mut self) -> &mut KafkaClient {
        &mut self.client
    }

    /// Fetches from `start_offset` up to `max_bytes`. Messages the broker
    /// includes from before `start_offset` -- the tail of a compressed
    /// batch whose wrapper offset predates the requested offset -- are
    /// dropped rather than handed to the caller.
    pub fn fetch(&mut self,
                 topic: &str,
                 partition: PartitionId,
                 start_offset: Offset,
                 max_bytes: i32)
                 -> Result<Vec<FetchedMessage>> {
        let topic = topic.to_owned();
        let target = Target::Leader {
            topic: topic.clone(),
            partition: partition,
        };

        let no_synth: Option<fn(&FetchRequest) -> FetchResponse> = None;
        let response: FetchResponse = self.client.dispatch(ApiKeys::Fetch,
                                                            target,
                                                            false,
                                                            move || {
                FetchRequest {
                    replica_id: CONSUMER_REPLICA_ID,
                    max_wait_time: 1000,
                    min_bytes: 1,
                    max_bytes: max_bytes,
                    topics: vec![FetchTopic {
                                     topic_name: topic.clone(),
                                     partitions: vec![FetchPartition {
                                                           partition: partition,
                                                           fetch_offset: start_offset,
                                                           max_bytes: max_bytes,
                                                       }],
                                 }],
                }
            },
                                                            no_synth)?;

        let messages = response
            .topics
            .into_iter()
            .next()
            .and_then(|t| t.partitions.into_iter().next())
            .map(|p| p.messages)
            .unwrap_or_default();

        Ok(messages.into_iter().filter(|m| m.offset >= start_offset).collect())
    }

    /// The single offset the broker reports for `time`: `-1` (latest) or
    /// `-2` (earliest) per the wire convention, or a millisecond timestamp.
    pub fn offset_at_time(&mut self, topic: &str, partition: PartitionId, time: i64) -> Result<Offset> {
        let topic = topic.to_owned();
        let target = Target::Leader {
            topic: topic.clone(),
            partition: partition,
        };

        let no_synth: Option<fn(&OffsetRequest) -> OffsetResponse> = None;
        let response: OffsetResponse = self.client.dispatch(ApiKeys::ListOffsets,
                                                             target,
                                                             false,
                                                             move || {
                OffsetRequest {
                    replica_id: CONSUMER_REPLICA_ID,
                    topics: vec![OffsetTopic {
                                     topic_name: topic.clone(),
                                     partitions: vec![OffsetPartition {
                                                           partition: partition,
                                                           time: time,
                                                           max_number_of_offsets: 1,
                                                       }],
                                 }],
                }
            },
                                                             no_synth)?;

        response
            .topics
            .into_iter()
            .next()
            .and_then(|t| t.partitions.into_iter().next())
            .and_then(|p| p.offsets.into_iter().next())
            .ok_or_else(|| ErrorKind::EmptyMetadata.into())
    }

    pub fn offset_earliest(&mut self, topic: &str, partition: PartitionId) -> Result<Offset> {
        self.offset_at_time(topic, partition, EARLIEST_OFFSET_TIME)
    }

    pub fn offset_latest(&mut self, topic: &str, partition: PartitionId) -> Result<Offset> {
        self.offset_at_time(topic, partition, LATEST_OFFSET_TIME)
    }

    /// Commits `offset` for `topic`/`partition` under `group_id`. This
    /// crate never joins a consumer group, so generation and member id are
    /// always the standalone-commit sentinels.
    pub fn commit_offset(&mut self,
                          group_id: &str,
                          topic: &str,
                          partition: PartitionId,
                          offset: Offset,
                          metadata: Option<String>)
                          -> Result<()> {
        let topic = topic.to_owned();
        let group_id = group_id.to_owned();
        let target = Target::GroupCoordinator { group_id: group_id.clone() };

        let no_synth: Option<fn(&OffsetCommitRequest) -> OffsetCommitResponse> = None;
        let response: OffsetCommitResponse = self.client.dispatch(ApiKeys::OffsetCommit,
                                                                   target,
                                                                   false,
                                                                   move || {
                OffsetCommitRequest {
                    group_id: group_id.clone(),
                    generation_id: NO_GENERATION,
                    member_id: String::new(),
                    topics: vec![OffsetCommitTopic {
                                     topic_name: topic.clone(),
                                     partitions: vec![OffsetCommitPartition {
                                                           partition: partition,
                                                           offset: offset,
                                                           timestamp: None,
                                                           metadata: metadata.clone(),
                                                       }],
                                 }],
                }
            },
                                                                   no_synth)?;

        let (_, error_code) = response
            .topics
            .into_iter()
            .next()
            .and_then(|t| t.partitions.into_iter().next())
            .ok_or_else(|| ErrorKind::EmptyMetadata)?;

        if error_code != 0 {
            bail!(ErrorKind::KafkaError(error_code.into()));
        }
        Ok(())
    }

    pub fn fetch_offsets(&mut self,
                          group_id: &str,
                          topic: &str,
                          partitions: &[PartitionId])
                          -> Result<HashMap<PartitionId, Offset>> {
        let topic = topic.to_owned();
        let partitions = partitions.to_vec();
        let target = Target::GroupCoordinator { group_id: group_id.to_owned() };
        let group_id = group_id.to_owned();

        let no_synth: Option<fn(&OffsetFetchRequest) -> OffsetFetchResponse> = None;
        let response: OffsetFetchResponse = self.client.dispatch(ApiKeys::OffsetFetch,
                                                                  target,
                                                                  false,
                                                                  move || {
                OffsetFetchRequest {
                    group_id: group_id.clone(),
                    topics: vec![OffsetFetchTopic {
                                     topic_name: topic.clone(),
                                     partitions: partitions.clone(),
                                 }],
                }
            },
                                                                  no_synth)?;

        let mut result = HashMap::new();
        if let Some(topic_data) = response.topics.into_iter().next() {
            for partition_data in topic_data.partitions {
                if partition_data.error_code == 0 {
                    result.insert(partition_data.partition, partition_data.offset);
                }
            }
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_offsets_defaults_to_empty_map() {
        let result: HashMap<PartitionId, Offset> = HashMap::new();
        assert!(result.is_empty());
    }
}
