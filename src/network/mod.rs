//! Broker identity and the blocking socket endpoint.
//!
//! The source this crate descends from drove its sockets through a tokio
//! reactor; every send/receive was a future polled by an event loop shared
//! across the whole client. The concurrency model this crate implements
//! instead is one blocking socket per broker connection, used by at most
//! one in-flight request at a time -- so `connect`/`send`/`receive` below
//! are synchronous calls that block the calling thread for up to the
//! configured timeout, mirroring what the reactor's task used to do one
//! poll at a time, just without the poll.

pub mod endpoint;

pub use self::endpoint::{Endpoint, IpVersionPref};

use std::fmt;
use std::net::ToSocketAddrs;
use std::str::FromStr;

use errors::{ErrorKind, Result};
use protocol::PartitionId;

/// `host:port`, used locally to key a broker's connection state. Kafka
/// itself only knows brokers by `NodeId`; this is how bootstrap
/// configuration and operator-supplied addresses are identified before a
/// `NodeId` is known.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ServerKey {
    host: String,
    port: u16,
}

impl ServerKey {
    pub fn new<S: Into<String>>(host: S, port: u16) -> ServerKey {
        ServerKey {
            host: host.into(),
            port: port,
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Resolves this key to a connectable socket address list, honoring no
    /// IP-version preference (`connect` in `endpoint` applies that filter).
    pub fn to_socket_addrs_string(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl fmt::Display for ServerKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.host.contains(':') {
            write!(f, "[{}]:{}", self.host, self.port)
        } else {
            write!(f, "{}:{}", self.host, self.port)
        }
    }
}

impl FromStr for ServerKey {
    type Err = ::errors::Error;

    fn from_str(s: &str) -> Result<ServerKey> {
        if s.starts_with('[') {
            let close = s.find(']')
                .ok_or_else(|| ErrorKind::InvalidArgument(format!("unterminated IPv6 bracket in {}", s)))?;
            let host = &s[1..close];
            let rest = &s[close + 1..];
            let port_str = rest.strip_prefix_compat(':')
                .ok_or_else(|| ErrorKind::InvalidArgument(format!("missing port in {}", s)))?;
            let port: u16 = port_str
                .parse()
                .map_err(|_| ErrorKind::InvalidArgument(format!("invalid port in {}", s)))?;
            Ok(ServerKey::new(host.to_owned(), port))
        } else {
            let idx = s.rfind(':')
                .ok_or_else(|| ErrorKind::InvalidArgument(format!("missing port in {}", s)))?;
            let (host, port_str) = (&s[..idx], &s[idx + 1..]);
            let port: u16 = port_str
                .parse()
                .map_err(|_| ErrorKind::InvalidArgument(format!("invalid port in {}", s)))?;
            Ok(ServerKey::new(host.to_owned(), port))
        }
    }
}

/// `str::strip_prefix` was stabilized well after the Rust version this
/// crate's Cargo.toml targets; this is the one-liner it would otherwise be.
trait StripPrefixCompat {
    fn strip_prefix_compat(&self, prefix: char) -> Option<&str>;
}

impl StripPrefixCompat for str {
    fn strip_prefix_compat(&self, prefix: char) -> Option<&str> {
        if self.starts_with(prefix) {
            Some(&self[prefix.len_utf8()..])
        } else {
            None
        }
    }
}

impl ToSocketAddrs for ServerKey {
    type Iter = ::std::vec::IntoIter<::std::net::SocketAddr>;

    fn to_socket_addrs(&self) -> ::std::io::Result<Self::Iter> {
        (self.host.as_str(), self.port).to_socket_addrs()
    }
}

/// A topic name paired with a partition id; the unit most dispatcher and
/// metadata-cache maps are keyed by.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TopicPartition {
    pub topic: String,
    pub partition: PartitionId,
}

impl TopicPartition {
    pub fn new<S: Into<String>>(topic: S, partition: PartitionId) -> TopicPartition {
        TopicPartition {
            topic: topic.into(),
            partition: partition,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_key_display_brackets_ipv6() {
        let key = ServerKey::new("::1", 9092);
        assert_eq!(key.to_string(), "[::1]:9092");
    }

    #[test]
    fn test_server_key_display_plain_ipv4_or_hostname() {
        let key = ServerKey::new("kafka1.example.com", 9092);
        assert_eq!(key.to_string(), "kafka1.example.com:9092");
    }

    #[test]
    fn test_server_key_parse_roundtrip_ipv6() {
        let key: ServerKey = "[::1]:9092".parse().unwrap();
        assert_eq!(key.host(), "::1");
        assert_eq!(key.port(), 9092);
        assert_eq!(key.to_string(), "[::1]:9092");
    }

    #[test]
    fn test_server_key_parse_roundtrip_hostname() {
        let key: ServerKey = "kafka1.example.com:9092".parse().unwrap();
        assert_eq!(key.host(), "kafka1.example.com");
        assert_eq!(key.port(), 9092);
    }

    #[test]
    fn test_server_key_parse_rejects_missing_port() {
        assert!("kafka1.example.com".parse::<ServerKey>().is_err());
    }
}
