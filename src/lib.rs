#![recursion_limit="128"]

#![cfg_attr(feature="clippy", feature(plugin))]
#![cfg_attr(feature="clippy", plugin(clippy))]

#![allow(dead_code)]

#[macro_use]
extern crate log;
#[macro_use]
extern crate error_chain;
#[macro_use]
extern crate lazy_static;
extern crate bytes;
extern crate byteorder;
extern crate rand;
extern crate crc;
extern crate twox_hash;
extern crate time;
extern crate hexplay;
extern crate serde;
#[macro_use]
extern crate serde_derive;

#[cfg(feature = "metrics")]
#[macro_use]
extern crate prometheus;

#[cfg(feature = "gzip")]
extern crate flate2;
#[cfg(feature = "snappy")]
extern crate snap;
#[cfg(feature = "lz4")]
extern crate lz4;
#[cfg(feature = "encoding")]
extern crate encoding;
#[cfg(feature = "json")]
extern crate serde_json;

#[cfg(test)]
extern crate pretty_env_logger;

#[macro_use]
pub mod errors;
mod compression;
mod protocol;
mod network;
pub mod client;
pub mod producer;
pub mod consumer;
pub mod serialization;

pub use client::{ClientBuilder, ClientConfig, KafkaClient, SaslPlainConfig, Target};
pub use compression::Compression;
pub use consumer::Consumer;
pub use errors::{Error, ErrorKind, KafkaCode};
pub use network::TopicPartition;
pub use producer::{Producer, ProducerRecord, ProduceResult};
pub use protocol::{Message, Offset, PartitionId};
pub use serialization::{Deserializer, NoopDeserializer, NoopSerializer, Serializer};
