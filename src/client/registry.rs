//! Broker registry: the set of known brokers, keyed by `ServerKey`, each
//! with at most one open connection.

use std::collections::HashMap;
use std::time::Duration;

use rand::{thread_rng, Rng};

use errors::Result;
use network::{Endpoint, IpVersionPref, ServerKey};
use protocol::ApiKey;

/// `api_versions[api_key]`: the negotiated usable version for this broker,
/// or `-1` if the broker's minimum exceeds everything this crate
/// implements -- such an api_key must fail fatally if used rather than
/// silently falling back to an unsupported version.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ApiVersionMap {
    versions: HashMap<ApiKey, i16>,
}

impl ApiVersionMap {
    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }

    pub fn set(&mut self, api_key: ApiKey, version: i16) {
        self.versions.insert(api_key, version);
    }

    pub fn get(&self, api_key: ApiKey) -> Option<i16> {
        self.versions.get(&api_key).cloned()
    }
}

/// One known broker. Not evicted when metadata stops mentioning it -- only
/// its `node_id` is cleared.
pub struct BrokerEntry {
    pub host: String,
    pub port: u16,
    pub node_id: Option<i32>,
    pub connection: Option<Endpoint>,
    pub last_error: Option<String>,
    pub api_versions: ApiVersionMap,
    /// Whether the current `connection` has completed a SASL handshake.
    /// Reset to `false` on every fresh connect; a new TCP connection always
    /// needs its own authentication.
    pub authenticated: bool,
}

impl BrokerEntry {
    fn new(host: String, port: u16) -> BrokerEntry {
        BrokerEntry {
            host: host,
            port: port,
            node_id: None,
            connection: None,
            last_error: None,
            api_versions: ApiVersionMap::default(),
            authenticated: false,
        }
    }

    pub fn server_key(&self) -> ServerKey {
        ServerKey::new(self.host.clone(), self.port)
    }

    pub fn is_connected(&self) -> bool {
        self.connection.is_some()
    }

    pub fn ensure_connected(&mut self, ip_pref: IpVersionPref, connect_timeout: Duration) -> Result<&mut Endpoint> {
        if self.connection.is_none() {
            match Endpoint::connect(self.server_key(), ip_pref, connect_timeout) {
                Ok(endpoint) => {
                    self.connection = Some(endpoint);
                    self.last_error = None;
                    self.authenticated = false;
                }
                Err(e) => {
                    self.last_error = Some(e.to_string());
                    return Err(e);
                }
            }
        }
        Ok(self.connection.as_mut().unwrap())
    }

    /// Closes the connection; clears `last_error` only when asked, matching
    /// the io endpoint's documented close semantics.
    pub fn close_connection(&mut self, clear_last_error: bool) {
        if let Some(mut conn) = self.connection.take() {
            conn.close();
        }
        self.authenticated = false;
        if clear_last_error {
            self.last_error = None;
        }
    }
}

#[derive(Default)]
pub struct BrokerRegistry {
    brokers: HashMap<ServerKey, BrokerEntry>,
}

/// The three classes `iterate_for_metadata` orders brokers into, from most
/// to least likely to answer quickly.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
enum BrokerClass {
    KnownNodeIdConnected = 0,
    KnownNodeIdDisconnected = 1,
    UnknownNodeId = 2,
}

impl BrokerRegistry {
    pub fn new() -> BrokerRegistry {
        BrokerRegistry::default()
    }

    pub fn known(&self) -> Vec<ServerKey> {
        self.brokers.keys().cloned().collect()
    }

    pub fn get(&self, key: &ServerKey) -> Option<&BrokerEntry> {
        self.brokers.get(key)
    }

    pub fn get_mut(&mut self, key: &ServerKey) -> Option<&mut BrokerEntry> {
        self.brokers.get_mut(key)
    }

    pub fn insert_or_update(&mut self, node_id: Option<i32>, host: String, port: u16) -> ServerKey {
        let key = ServerKey::new(host.clone(), port);
        let entry = self.brokers
            .entry(key.clone())
            .or_insert_with(|| BrokerEntry::new(host, port));
        if node_id.is_some() {
            entry.node_id = node_id;
        }
        key
    }

    pub fn leader_for(&self, node_id: i32) -> Option<ServerKey> {
        self.brokers
            .iter()
            .find(|&(_, entry)| entry.node_id == Some(node_id))
            .map(|(key, _)| key.clone())
    }

    /// Nulls every broker's `node_id` before the caller repopulates it from
    /// a fresh metadata response; brokers absent from the response keep
    /// their slot (and connection) but end up with `node_id = None`.
    pub fn clear_all_node_ids(&mut self) {
        for entry in self.brokers.values_mut() {
            entry.node_id = None;
        }
    }

    /// Ordering: (shuffled within each class) known-node-id-and-connected
    /// first, then known-node-id-without-connection, then node-id-unknown.
    pub fn iterate_for_metadata(&self) -> Vec<ServerKey> {
        let mut classified: Vec<(BrokerClass, ServerKey)> = self.brokers
            .iter()
            .map(|(key, entry)| {
                let class = match (entry.node_id.is_some(), entry.is_connected()) {
                    (true, true) => BrokerClass::KnownNodeIdConnected,
                    (true, false) => BrokerClass::KnownNodeIdDisconnected,
                    (false, _) => BrokerClass::UnknownNodeId,
                };
                (class, key.clone())
            })
            .collect();

        let mut rng = thread_rng();
        rng.shuffle(&mut classified);
        classified.sort_by_key(|&(class, _)| class);

        classified.into_iter().map(|(_, key)| key).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_or_update_is_keyed_by_host_port() {
        let mut registry = BrokerRegistry::new();
        let key = registry.insert_or_update(Some(1), "kafka1".to_owned(), 9092);
        registry.insert_or_update(Some(1), "kafka1".to_owned(), 9092);

        assert_eq!(registry.known().len(), 1);
        assert_eq!(registry.get(&key).unwrap().node_id, Some(1));
    }

    #[test]
    fn test_clear_all_node_ids_then_repopulate_drops_absent_brokers_node_id() {
        let mut registry = BrokerRegistry::new();
        let a = registry.insert_or_update(Some(1), "a".to_owned(), 9092);
        let b = registry.insert_or_update(Some(2), "b".to_owned(), 9092);

        registry.clear_all_node_ids();
        registry.insert_or_update(Some(1), "a".to_owned(), 9092);

        assert_eq!(registry.get(&a).unwrap().node_id, Some(1));
        assert_eq!(registry.get(&b).unwrap().node_id, None);
    }

    #[test]
    fn test_iterate_for_metadata_orders_by_class() {
        let mut registry = BrokerRegistry::new();
        registry.insert_or_update(None, "unknown".to_owned(), 9092);
        registry.insert_or_update(Some(1), "known".to_owned(), 9092);

        let order = registry.iterate_for_metadata();
        let known_key = ServerKey::new("known".to_owned(), 9092);
        let unknown_key = ServerKey::new("unknown".to_owned(), 9092);

        let known_pos = order.iter().position(|k| *k == known_key).unwrap();
        let unknown_pos = order.iter().position(|k| *k == unknown_key).unwrap();
        assert!(known_pos < unknown_pos);
    }
}
