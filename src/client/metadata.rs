//! Metadata cache: the client's local, eventually-refreshed view of
//! topic/partition leadership and group coordinators.

use std::collections::HashMap;

use network::ServerKey;
use protocol::{NodeId, PartitionId};

#[derive(Clone, Debug, PartialEq)]
pub struct PartitionMetadata {
    pub leader: NodeId,
    pub replicas: Vec<NodeId>,
    pub isr: Vec<NodeId>,
}

/// `TopicName -> Partition -> PartitionMetadata`, plus `NodeId -> ServerKey`
/// for leader resolution. Snapshots are never cleared wholesale: each
/// `merge` call only overwrites the topics it was given, preserving
/// entries for topics that were not part of this round's request.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MetadataSnapshot {
    pub topics: HashMap<String, HashMap<PartitionId, PartitionMetadata>>,
    pub leaders: HashMap<NodeId, ServerKey>,
}

impl MetadataSnapshot {
    pub fn new() -> MetadataSnapshot {
        MetadataSnapshot::default()
    }

    pub fn leader_for(&self, topic: &str, partition: PartitionId) -> Option<NodeId> {
        self.topics
            .get(topic)
            .and_then(|partitions| partitions.get(&partition))
            .map(|p| p.leader)
    }

    pub fn leader_server_key(&self, node_id: NodeId) -> Option<ServerKey> {
        self.leaders.get(&node_id).cloned()
    }

    /// Merges one topic's freshly-fetched partition map in, replacing
    /// whatever this cache previously held for that topic only.
    pub fn merge_topic(&mut self, topic: String, partitions: HashMap<PartitionId, PartitionMetadata>) {
        self.topics.insert(topic, partitions);
    }

    pub fn merge_leader(&mut self, node_id: NodeId, server_key: ServerKey) {
        self.leaders.insert(node_id, server_key);
    }
}

/// `GroupId -> ServerKey`, populated on demand via FindCoordinator and
/// invalidated on `NotCoordinatorForGroup`/`GroupCoordinatorNotAvailable`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GroupCoordinatorMap {
    coordinators: HashMap<String, ServerKey>,
}

impl GroupCoordinatorMap {
    pub fn get(&self, group_id: &str) -> Option<ServerKey> {
        self.coordinators.get(group_id).cloned()
    }

    pub fn set(&mut self, group_id: String, server_key: ServerKey) {
        self.coordinators.insert(group_id, server_key);
    }

    pub fn invalidate(&mut self, group_id: &str) {
        self.coordinators.remove(group_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_preserves_topics_not_in_this_round() {
        let mut snapshot = MetadataSnapshot::new();

        let mut partitions_a = HashMap::new();
        partitions_a.insert(0,
                            PartitionMetadata {
                                leader: 1,
                                replicas: vec![1],
                                isr: vec![1],
                            });
        snapshot.merge_topic("a".to_owned(), partitions_a);

        let mut partitions_b = HashMap::new();
        partitions_b.insert(0,
                            PartitionMetadata {
                                leader: 2,
                                replicas: vec![2],
                                isr: vec![2],
                            });
        snapshot.merge_topic("b".to_owned(), partitions_b);

        assert_eq!(snapshot.leader_for("a", 0), Some(1));
        assert_eq!(snapshot.leader_for("b", 0), Some(2));
    }

    #[test]
    fn test_coordinator_invalidate() {
        let mut coordinators = GroupCoordinatorMap::default();
        coordinators.set("g".to_owned(), ServerKey::new("kafka1".to_owned(), 9092));
        assert!(coordinators.get("g").is_some());
        coordinators.invalidate("g");
        assert!(coordinators.get("g").is_none());
    }
}
