//! Pieces shared by the retry state machine in `client::client`'s
//! `KafkaClient::dispatch`: the request-target enum, the per-response
//! error-code extraction every single-(topic, partition)-target response
//! implements, and the fixed retriable-error classification.

use errors::{Error, ErrorKind, KafkaCode};
use protocol::{FetchResponse, OffsetCommitResponse, OffsetFetchResponse, OffsetResponse, ProduceResponse};

/// Who a request is addressed to; resolved to a `ServerKey` fresh on every
/// attempt, since the metadata/coordinator cache may have changed between
/// attempts (a retriable failure triggers a refresh).
pub enum Target {
    Leader { topic: String, partition: i32 },
    GroupCoordinator { group_id: String },
}

/// Implemented by every response type the dispatcher classifies: the error
/// code that decides retry-or-return, matching the pseudocode's
/// `response.first_partition.error_code`.
pub trait ResponseOutcome {
    fn outcome_error_code(&self) -> i16;
}

/// All five single-target responses carry exactly one topic with exactly
/// one partition (the dispatcher never builds a multi-partition request),
/// so the outcome is always that partition's own error code, or `0` if the
/// response somehow came back empty.
impl ResponseOutcome for ProduceResponse {
    fn outcome_error_code(&self) -> i16 {
        self.topics
            .first()
            .and_then(|t| t.partitions.first())
            .map(|p| p.error_code)
            .unwrap_or(0)
    }
}

impl ResponseOutcome for FetchResponse {
    fn outcome_error_code(&self) -> i16 {
        self.topics
            .first()
            .and_then(|t| t.partitions.first())
            .map(|p| p.error_code)
            .unwrap_or(0)
    }
}

impl ResponseOutcome for OffsetResponse {
    fn outcome_error_code(&self) -> i16 {
        self.topics
            .first()
            .and_then(|t| t.partitions.first())
            .map(|p| p.error_code)
            .unwrap_or(0)
    }
}

impl ResponseOutcome for OffsetCommitResponse {
    fn outcome_error_code(&self) -> i16 {
        self.topics
            .first()
            .and_then(|t| t.partitions.first())
            .map(|&(_, error_code)| error_code)
            .unwrap_or(0)
    }
}

impl ResponseOutcome for OffsetFetchResponse {
    fn outcome_error_code(&self) -> i16 {
        self.topics
            .first()
            .and_then(|t| t.partitions.first())
            .map(|p| p.error_code)
            .unwrap_or(0)
    }
}

/// The fixed retriable-error set transient broker conditions fall into.
/// `NoConnection` is a client-local condition and is classified alongside
/// this set wherever a caller decides whether a failed attempt should
/// retry.
pub fn is_retriable_error_code(code: i16) -> bool {
    KafkaCode::from(code).is_retriable()
}

/// I/O failures eligible for a reconnect-and-retry rather than the
/// Produce-specific `SendNoAck` fatal path: the two conditions under which
/// no bytes can have reached the broker.
pub fn is_reconnectable(err: &Error) -> bool {
    match *err.kind() {
        ErrorKind::CannotBind(_) | ErrorKind::NoConnection(_) => true,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retriable_set_matches_known_list() {
        assert!(is_retriable_error_code(-1)); // Unknown
        assert!(is_retriable_error_code(2)); // CorruptMessage
        assert!(is_retriable_error_code(3)); // UnknownTopicOrPartition
        assert!(is_retriable_error_code(5)); // LeaderNotAvailable
        assert!(is_retriable_error_code(6)); // NotLeaderForPartition
        assert!(is_retriable_error_code(7)); // RequestTimedOut
        assert!(is_retriable_error_code(8)); // BrokerNotAvailable
        assert!(is_retriable_error_code(9)); // ReplicaNotAvailable
        assert!(is_retriable_error_code(11)); // StaleControllerEpoch
        assert!(is_retriable_error_code(13)); // NetworkException
        assert!(is_retriable_error_code(14)); // GroupLoadInProgress
        assert!(is_retriable_error_code(15)); // GroupCoordinatorNotAvailable
        assert!(is_retriable_error_code(16)); // NotCoordinatorForGroup
        assert!(is_retriable_error_code(19)); // NotEnoughReplicas
        assert!(is_retriable_error_code(20)); // NotEnoughReplicasAfterAppend
        assert!(is_retriable_error_code(27)); // RebalanceInProgress

        assert!(!is_retriable_error_code(0)); // None
        assert!(!is_retriable_error_code(4)); // InvalidMessageSize
        assert!(!is_retriable_error_code(17)); // InvalidTopic
    }
}
