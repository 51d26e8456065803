//! Crate-wide error type.
//!
//! Every fallible call in this crate returns `Result<T>`. There is no ambient
//! "last error" accessor anywhere in the public API: concurrent callers on
//! distinct `KafkaClient` instances can never observe each other's failures.

use std::net::AddrParseError;

/// Error codes reported by a remote Kafka broker in a response's per-partition
/// or top-level `error_code` field.
///
/// See also [Kafka Errors](http://kafka.apache.org/protocol.html#protocol_error_codes)
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum KafkaCode {
    /// The server experienced an unexpected error when processing the request
    Unknown,
    /// No error
    None,
    /// The requested offset is outside the range of offsets
    /// maintained by the server for the given topic/partition
    OffsetOutOfRange,
    /// This indicates that a message contents does not match its CRC
    CorruptMessage,
    /// This request is for a topic or partition that does not exist
    /// on this broker.
    UnknownTopicOrPartition,
    /// The message has a negative size
    InvalidMessageSize,
    /// This error is thrown if we are in the middle of a leadership
    /// election and there is currently no leader for this partition
    /// and hence it is unavailable for writes.
    LeaderNotAvailable,
    /// This error is thrown if the client attempts to send messages
    /// to a replica that is not the leader for some partition. It
    /// indicates that the client's metadata is out of date.
    NotLeaderForPartition,
    /// This error is thrown if the request exceeds the user-specified
    /// time limit in the request.
    RequestTimedOut,
    /// This is not a client facing error and is used mostly by tools
    /// when a broker is not alive.
    BrokerNotAvailable,
    /// If replica is expected on a broker, but is not (this can be
    /// safely ignored).
    ReplicaNotAvailable,
    /// The server has a configurable maximum message size to avoid
    /// unbounded memory allocation. This error is thrown if the
    /// client attempts to produce a message larger than this maximum.
    MessageSizeTooLarge,
    /// Internal error code for broker-to-broker communication.
    StaleControllerEpoch,
    /// If you specify a string larger than the configured maximum for
    /// offset metadata.
    OffsetMetadataTooLarge,
    /// The server disconnected before a response was received.
    NetworkException,
    /// The broker returns this error code for an offset fetch request
    /// if it is still loading offsets, or in response to group
    /// membership requests while group metadata is loading.
    GroupLoadInProgress,
    /// The group coordinator is not available.
    GroupCoordinatorNotAvailable,
    /// The broker is not the coordinator for this group.
    NotCoordinatorForGroup,
    /// For a request which attempts to access an invalid topic, or to
    /// write to an internal topic.
    InvalidTopic,
    /// A message batch in a produce request exceeds the maximum
    /// configured segment size.
    RecordListTooLarge,
    /// Fewer in-sync replicas than the configured minimum when
    /// `required_acks` is -1.
    NotEnoughReplicas,
    /// Message written to the log with fewer in-sync replicas than
    /// required.
    NotEnoughReplicasAfterAppend,
    /// `required_acks` is invalid (anything other than -1, 1, or 0).
    InvalidRequiredAcks,
    /// The generation id provided does not match the group's current
    /// generation.
    IllegalGeneration,
    /// A join group request's protocol type or protocol set is
    /// incompatible with the current group.
    InconsistentGroupProtocol,
    /// The group id is empty or null.
    InvalidGroupId,
    /// `member_id` is not known to the group's current generation.
    UnknownMemberId,
    /// Requested session timeout is outside the broker's allowed range.
    InvalidSessionTimeout,
    /// The coordinator has begun rebalancing the group; rejoin is
    /// required.
    RebalanceInProgress,
    /// An offset commit was rejected for oversize metadata.
    InvalidCommitOffsetSize,
    /// The client is not authorized to access the requested topic.
    TopicAuthorizationFailed,
    /// The client is not authorized to access the requested group.
    GroupAuthorizationFailed,
    /// The client is not authorized to use an inter-broker or
    /// administrative API.
    ClusterAuthorizationFailed,
    /// The message timestamp is out of acceptable range.
    InvalidTimestamp,
    /// The broker does not support the requested SASL mechanism.
    UnsupportedSaslMechanism,
    /// Request is not valid given the current SASL state.
    IllegalSaslState,
    /// The requested API version is not supported.
    UnsupportedVersion,
    /// Catch-all for any code not enumerated above.
    Other(i16),
}

impl From<i16> for KafkaCode {
    fn from(v: i16) -> Self {
        match v {
            -1 => KafkaCode::Unknown,
            0 => KafkaCode::None,
            1 => KafkaCode::OffsetOutOfRange,
            2 => KafkaCode::CorruptMessage,
            3 => KafkaCode::UnknownTopicOrPartition,
            4 => KafkaCode::InvalidMessageSize,
            5 => KafkaCode::LeaderNotAvailable,
            6 => KafkaCode::NotLeaderForPartition,
            7 => KafkaCode::RequestTimedOut,
            8 => KafkaCode::BrokerNotAvailable,
            9 => KafkaCode::ReplicaNotAvailable,
            10 => KafkaCode::MessageSizeTooLarge,
            11 => KafkaCode::StaleControllerEpoch,
            12 => KafkaCode::OffsetMetadataTooLarge,
            13 => KafkaCode::NetworkException,
            14 => KafkaCode::GroupLoadInProgress,
            15 => KafkaCode::GroupCoordinatorNotAvailable,
            16 => KafkaCode::NotCoordinatorForGroup,
            17 => KafkaCode::InvalidTopic,
            18 => KafkaCode::RecordListTooLarge,
            19 => KafkaCode::NotEnoughReplicas,
            20 => KafkaCode::NotEnoughReplicasAfterAppend,
            21 => KafkaCode::InvalidRequiredAcks,
            22 => KafkaCode::IllegalGeneration,
            23 => KafkaCode::InconsistentGroupProtocol,
            24 => KafkaCode::InvalidGroupId,
            25 => KafkaCode::UnknownMemberId,
            26 => KafkaCode::InvalidSessionTimeout,
            27 => KafkaCode::RebalanceInProgress,
            28 => KafkaCode::InvalidCommitOffsetSize,
            29 => KafkaCode::TopicAuthorizationFailed,
            30 => KafkaCode::GroupAuthorizationFailed,
            31 => KafkaCode::ClusterAuthorizationFailed,
            32 => KafkaCode::InvalidTimestamp,
            33 => KafkaCode::UnsupportedSaslMechanism,
            34 => KafkaCode::IllegalSaslState,
            35 => KafkaCode::UnsupportedVersion,
            other => KafkaCode::Other(other),
        }
    }
}

impl From<KafkaCode> for i16 {
    fn from(code: KafkaCode) -> i16 {
        match code {
            KafkaCode::Unknown => -1,
            KafkaCode::None => 0,
            KafkaCode::OffsetOutOfRange => 1,
            KafkaCode::CorruptMessage => 2,
            KafkaCode::UnknownTopicOrPartition => 3,
            KafkaCode::InvalidMessageSize => 4,
            KafkaCode::LeaderNotAvailable => 5,
            KafkaCode::NotLeaderForPartition => 6,
            KafkaCode::RequestTimedOut => 7,
            KafkaCode::BrokerNotAvailable => 8,
            KafkaCode::ReplicaNotAvailable => 9,
            KafkaCode::MessageSizeTooLarge => 10,
            KafkaCode::StaleControllerEpoch => 11,
            KafkaCode::OffsetMetadataTooLarge => 12,
            KafkaCode::NetworkException => 13,
            KafkaCode::GroupLoadInProgress => 14,
            KafkaCode::GroupCoordinatorNotAvailable => 15,
            KafkaCode::NotCoordinatorForGroup => 16,
            KafkaCode::InvalidTopic => 17,
            KafkaCode::RecordListTooLarge => 18,
            KafkaCode::NotEnoughReplicas => 19,
            KafkaCode::NotEnoughReplicasAfterAppend => 20,
            KafkaCode::InvalidRequiredAcks => 21,
            KafkaCode::IllegalGeneration => 22,
            KafkaCode::InconsistentGroupProtocol => 23,
            KafkaCode::InvalidGroupId => 24,
            KafkaCode::UnknownMemberId => 25,
            KafkaCode::InvalidSessionTimeout => 26,
            KafkaCode::RebalanceInProgress => 27,
            KafkaCode::InvalidCommitOffsetSize => 28,
            KafkaCode::TopicAuthorizationFailed => 29,
            KafkaCode::GroupAuthorizationFailed => 30,
            KafkaCode::ClusterAuthorizationFailed => 31,
            KafkaCode::InvalidTimestamp => 32,
            KafkaCode::UnsupportedSaslMechanism => 33,
            KafkaCode::IllegalSaslState => 34,
            KafkaCode::UnsupportedVersion => 35,
            KafkaCode::Other(v) => v,
        }
    }
}

impl KafkaCode {
    /// The fixed retriable-error set used by the dispatcher's retry policy.
    /// `NoConnection` is a client-local condition, handled alongside this
    /// set wherever callers classify a failed attempt.
    pub fn is_retriable(&self) -> bool {
        match *self {
            KafkaCode::Unknown |
            KafkaCode::CorruptMessage |
            KafkaCode::UnknownTopicOrPartition |
            KafkaCode::LeaderNotAvailable |
            KafkaCode::NotLeaderForPartition |
            KafkaCode::RequestTimedOut |
            KafkaCode::BrokerNotAvailable |
            KafkaCode::ReplicaNotAvailable |
            KafkaCode::StaleControllerEpoch |
            KafkaCode::NetworkException |
            KafkaCode::GroupLoadInProgress |
            KafkaCode::GroupCoordinatorNotAvailable |
            KafkaCode::NotCoordinatorForGroup |
            KafkaCode::NotEnoughReplicas |
            KafkaCode::NotEnoughReplicasAfterAppend |
            KafkaCode::RebalanceInProgress => true,
            _ => false,
        }
    }
}

error_chain!{
    foreign_links {
        IoError(::std::io::Error);
        AddrParseError(AddrParseError);
    }

    errors {
        /// A well-formed but unsupported argument passed to a public API:
        /// bad host, out-of-range numeric field, bytes where UTF-8 is
        /// required. Raised before any I/O takes place.
        InvalidArgument(reason: String) {
            description("invalid argument")
            display("invalid argument: {}", reason)
        }

        /// A remote broker reported a per-partition or top-level error that
        /// is not in the retry set (or was retried until attempts ran out).
        KafkaError(code: KafkaCode) {
            description("kafka error")
            display("kafka error: {:?}", code)
        }

        /// Failed to establish a TCP connection within the configured
        /// timeout.
        CannotBind(server: String) {
            description("cannot bind")
            display("cannot connect to {}", server)
        }

        /// A write failed, or the peer had already closed the connection
        /// before any bytes were written.
        CannotSend(server: String) {
            description("cannot send")
            display("cannot send to {}", server)
        }

        /// A read failed partway through a response (EOF mid-message).
        CannotRecv(server: String) {
            description("cannot receive")
            display("cannot receive from {}", server)
        }

        /// The peer closed the socket without sending any bytes; eligible
        /// for reconnect-and-retry.
        NoConnection(server: String) {
            description("no connection")
            display("no connection to {}", server)
        }

        /// No response arrived within the configured timeout.
        ResponseNotReceived(server: String) {
            description("response not received")
            display("response not received from {}", server)
        }

        /// A response's `correlation_id` did not match the request that was
        /// sent on the same connection.
        MismatchedCorrelationId(expected: i32, actual: i32) {
            description("mismatched correlation id")
            display("mismatched correlation id: expected {}, got {}", expected, actual)
        }

        /// The codec encountered a malformed frame, an unimplemented api key,
        /// or a byte string that is not valid UTF-8 where required.
        Codec(reason: &'static str) {
            description("codec error")
            display("codec error: {}", reason)
        }

        /// An api_key whose negotiated version for this broker is `-1`
        /// (broker's minimum exceeds the client's maximum).
        UnsupportedApiVersion(api_key: i16) {
            description("unsupported api version")
            display("no usable api version for api_key {}", api_key)
        }

        /// A Produce request whose outcome cannot be confirmed because bytes
        /// may have left the socket before the failure was observed. Must
        /// never be silently retried; the caller decides whether to risk
        /// duplicate delivery.
        SendNoAck {
            description("produce request outcome unconfirmed")
            display("produce request outcome unconfirmed, will not retry automatically")
        }

        /// No broker in the known set could satisfy the request.
        BrokerNotAvailable {
            description("no broker available")
            display("no broker available")
        }

        /// The dispatcher exhausted `send_max_attempts` on only retriable
        /// failures.
        RetriesExhausted(last: String) {
            description("retries exhausted")
            display("retries exhausted, last error: {}", last)
        }

        /// A metadata refresh returned no brokers and `auto_create_topics`
        /// was not set.
        EmptyMetadata {
            description("empty metadata response")
            display("metadata response contained no brokers")
        }

        /// A wait for in-flight metadata/coordinator resolution was
        /// canceled (e.g. the owning client was dropped).
        Canceled(reason: &'static str) {
            description("canceled")
            display("canceled: {}", reason)
        }
    }
}
