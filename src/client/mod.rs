//! The blocking Kafka client: broker registry, metadata cache, request
//! dispatcher and the `KafkaClient` facade built on top of them.

mod client;
mod config;
mod dispatcher;
mod metadata;
mod nonfatal;
mod registry;

pub use self::client::KafkaClient;
pub use self::config::{ClientBuilder, ClientConfig, SaslPlainConfig};
pub use self::dispatcher::Target;
pub use self::metadata::{GroupCoordinatorMap, MetadataSnapshot, PartitionMetadata};
pub use self::registry::{ApiVersionMap, BrokerEntry, BrokerRegistry};
