//! `KafkaClient`: the single-threaded facade that owns the broker registry,
//! the metadata cache, and the request dispatcher's retry loop. Every
//! fallible operation this crate exposes -- produce, fetch, list offsets,
//! commit/fetch group offsets -- ultimately goes through `dispatch`.

use std::collections::HashMap;
use std::thread;
use std::time::Duration;

use byteorder::{BigEndian, ByteOrder};
use rand;

use client::config::ClientConfig;
use client::dispatcher::{is_reconnectable, is_retriable_error_code, ResponseOutcome, Target};
use client::metadata::{GroupCoordinatorMap, MetadataSnapshot, PartitionMetadata};
use client::nonfatal::NonFatalErrors;
use client::registry::BrokerRegistry;
use errors::{Error, ErrorKind, KafkaCode, Result};
use network::ServerKey;
use protocol::{ApiKeys, ApiVersionsRequest, ApiVersionsResponse, Decodable, DecodeOptions, Encodable,
               FindCoordinatorRequest, FindCoordinatorResponse, MetadataRequest, MetadataResponse,
               Reader, RequestHeader, ResponseHeader, Writer, plain_auth_bytes, SaslHandshakeRequest,
               SaslHandshakeResponse, MECHANISM_PLAIN};

/// The blocking, single-threaded Kafka client. One instance owns exactly one
/// generation of broker connections, metadata cache and coordinator cache;
/// nothing here is `Send`/`Sync` on purpose -- concurrent use means separate
/// instances (one thread, one connection per broker, at most one in-flight request per connection).
pub struct KafkaClient {
    config: ClientConfig,
    registry: BrokerRegistry,
    metadata: MetadataSnapshot,
    coordinators: GroupCoordinatorMap,
    nonfatal: NonFatalErrors,
    correlation_id: i32,
}

impl KafkaClient {
    /// Builds a client from a bare list of `host:port` strings, using
    /// otherwise-default configuration, then bootstraps it.
    pub fn from_hosts<I, S>(hosts: I) -> Result<KafkaClient>
        where I: IntoIterator<Item = S>,
              S: Into<String>
    {
        let mut config = ClientConfig::default();
        config.hosts = hosts.into_iter().map(Into::into).collect();
        KafkaClient::from_config(config)
    }

    /// Builds and bootstraps a client from a fully-assembled `ClientConfig`.
    pub fn from_config(config: ClientConfig) -> Result<KafkaClient> {
        let mut client = KafkaClient {
            nonfatal: NonFatalErrors::with_capacity(config.max_logged_errors),
            config: config,
            registry: BrokerRegistry::new(),
            metadata: MetadataSnapshot::new(),
            coordinators: GroupCoordinatorMap::default(),
            correlation_id: rand::random::<i32>(),
        };
        client.bootstrap()?;
        Ok(client)
    }

    /// Seeds the registry from `config.hosts`, loads an initial metadata
    /// snapshot, and -- unless configured off -- negotiates api versions
    /// (and authenticates, if SASL is configured) against every bootstrap
    /// host up front so the first real request does not pay for it.
    fn bootstrap(&mut self) -> Result<()> {
        if self.config.hosts.is_empty() {
            bail!(ErrorKind::InvalidArgument("no bootstrap hosts configured".to_owned()));
        }

        let mut seeds = Vec::with_capacity(self.config.hosts.len());
        for host in self.config.hosts.clone() {
            let key: ServerKey = host.parse()?;
            self.registry.insert_or_update(None, key.host().to_owned(), key.port());
            seeds.push(key);
        }

        for server in &seeds {
            if !self.config.dont_load_api_versions {
                let _ = self.negotiate_api_versions(server);
            }
        }

        self.update_metadata(None)
    }

    fn next_correlation_id(&mut self) -> i32 {
        let id = self.correlation_id;
        self.correlation_id = self.correlation_id.wrapping_add(1);
        id
    }

    /// The usable api_version for `api_key` against `server`, falling back
    /// to this crate's max supported version when negotiation never
    /// completed for this broker (e.g. a pre-0.10 broker, or a prior
    /// negotiation failure that was tracked but not retried yet). Fails when
    /// negotiation recorded the `-1` sentinel, meaning every version this
    /// broker supports for `api_key` is below what this crate can speak.
    fn api_version_for(&self, server: &ServerKey, api_key: ApiKeys) -> Result<i16> {
        let version = self.registry
            .get(server)
            .and_then(|entry| entry.api_versions.get(api_key as i16))
            .unwrap_or_else(|| api_key.max_supported_version());
        if version < 0 {
            bail!(ErrorKind::UnsupportedApiVersion(api_key as i16));
        }
        Ok(version)
    }

    /// Runs ApiVersions against `server` and records the negotiated version
    /// for every api_key this crate implements. Deliberately does not go
    /// through `send_unrouted`, which itself calls this method first --
    /// that would recurse. On any failure the broker's api_versions map is
    /// left empty (so `api_version_for` falls back to this crate's own max
    /// version) and the failure is tracked as the broker's `last_error`,
    /// matching the "async version-detection failure" handling: the broker
    /// is not blacklisted, just retried at the next metadata refresh.
    fn negotiate_api_versions(&mut self, server: &ServerKey) -> Result<()> {
        let correlation_id = self.next_correlation_id();
        let client_id = self.config.client_id.clone();
        let timeout = self.config.timeout;
        let ip_version = self.config.ip_version;

        let result = (|| -> Result<ApiVersionsResponse> {
            let entry = self.registry
                .get_mut(server)
                .ok_or_else(|| Error::from(ErrorKind::BrokerNotAvailable))?;
            let endpoint = entry.ensure_connected(ip_version, timeout)?;

            let header = RequestHeader {
                api_key: ApiKeys::ApiVersions as i16,
                api_version: 0,
                correlation_id: correlation_id,
                client_id: client_id,
            };
            let mut writer = Writer::with_capacity(64);
            header.encode(&mut writer);
            ApiVersionsRequest.encode(0, &mut writer);
            let frame = writer.framed();

            endpoint.send(&frame, timeout)?;
            let size_bytes = endpoint.receive(4, timeout)?;
            let size = BigEndian::read_i32(&size_bytes) as usize;
            let body = endpoint.receive(size, timeout)?;

            let mut reader = Reader::new(&body);
            let response_header = ResponseHeader::decode(&mut reader)?;
            if response_header.correlation_id != correlation_id {
                bail!(ErrorKind::MismatchedCorrelationId(correlation_id, response_header.correlation_id));
            }
            ApiVersionsResponse::decode(0, &mut reader)
        })();

        match result {
            Ok(response) => {
                if response.error_code != 0 {
                    let entry = self.registry.get_mut(server).unwrap();
                    entry.last_error = Some(format!("ApiVersions error_code {}", response.error_code));
                    return Ok(());
                }
                let entry = self.registry.get_mut(server).unwrap();
                for supported in response.api_versions {
                    let usable = supported.max_version.min(ApiKeys::max_version_for(supported.api_key));
                    let usable = if usable < supported.min_version { -1 } else { usable };
                    entry.api_versions.set(supported.api_key, usable);
                }
                Ok(())
            }
            Err(e) => {
                if let Some(entry) = self.registry.get_mut(server) {
                    entry.last_error = Some(e.to_string());
                }
                self.nonfatal.push(format!("api version negotiation failed for {}: {}", server, e));
                Ok(())
            }
        }
    }

    /// Performs the SASL PLAIN handshake and authentication frame on
    /// `server`'s current connection, unless it already completed one for
    /// this connection generation. A no-op when SASL is not configured.
    fn ensure_authenticated(&mut self, server: &ServerKey) -> Result<()> {
        let sasl = match self.config.sasl_plain.clone() {
            Some(sasl) => sasl,
            None => return Ok(()),
        };

        if self.registry.get(server).map(|e| e.authenticated).unwrap_or(false) {
            return Ok(());
        }

        let correlation_id = self.next_correlation_id();
        let client_id = self.config.client_id.clone();
        let timeout = self.config.timeout;
        let ip_version = self.config.ip_version;

        let entry = self.registry
            .get_mut(server)
            .ok_or_else(|| Error::from(ErrorKind::BrokerNotAvailable))?;
        let endpoint = entry.ensure_connected(ip_version, timeout)?;

        let header = RequestHeader {
            api_key: ApiKeys::SaslHandshake as i16,
            api_version: 0,
            correlation_id: correlation_id,
            client_id: client_id,
        };
        let mut writer = Writer::with_capacity(64);
        header.encode(&mut writer);
        let handshake = SaslHandshakeRequest { mechanism: MECHANISM_PLAIN.to_owned() };
        handshake.encode(0, &mut writer);
        let frame = writer.framed();

        endpoint.send(&frame, timeout)?;
        let size_bytes = endpoint.receive(4, timeout)?;
        let size = BigEndian::read_i32(&size_bytes) as usize;
        let body = endpoint.receive(size, timeout)?;

        let mut reader = Reader::new(&body);
        let response_header = ResponseHeader::decode(&mut reader)?;
        if response_header.correlation_id != correlation_id {
            bail!(ErrorKind::MismatchedCorrelationId(correlation_id, response_header.correlation_id));
        }
        let handshake_response = SaslHandshakeResponse::decode(0, &mut reader)?;
        if handshake_response.error_code != 0 {
            bail!(ErrorKind::KafkaError(handshake_response.error_code.into()));
        }

        let auth_bytes = plain_auth_bytes(&sasl.username, &sasl.password);
        let mut auth_frame = Writer::with_capacity(auth_bytes.len());
        auth_frame.extend_from_slice(&auth_bytes);
        endpoint.send(&auth_frame.framed(), timeout)?;
        let reply_size_bytes = endpoint.receive(4, timeout)?;
        let reply_size = BigEndian::read_i32(&reply_size_bytes) as usize;
        if reply_size > 0 {
            endpoint.receive(reply_size, timeout)?;
        }

        entry.authenticated = true;
        Ok(())
    }

    /// One-shot request/response against any currently-known, reachable
    /// broker. Used by metadata refresh and coordinator lookup, which are
    /// not addressed at a specific leader the way Produce/Fetch/etc. are.
    fn send_unrouted<Req, Resp>(&mut self, server: &ServerKey, api_key: ApiKeys, request: &Req) -> Result<Resp>
        where Req: Encodable,
              Resp: Decodable
    {
        if !self.config.dont_load_api_versions {
            let needs_negotiation = self.registry
                .get(server)
                .map(|e| e.api_versions.is_empty())
                .unwrap_or(true);
            if needs_negotiation {
                self.negotiate_api_versions(server)?;
            }
        }
        self.ensure_authenticated(server)?;

        let api_version = self.api_version_for(server, api_key)?;
        let correlation_id = self.next_correlation_id();
        let client_id = self.config.client_id.clone();
        let timeout = self.config.timeout;
        let ip_version = self.config.ip_version;

        let entry = self.registry
            .get_mut(server)
            .ok_or_else(|| Error::from(ErrorKind::BrokerNotAvailable))?;
        let endpoint = entry.ensure_connected(ip_version, timeout)?;

        let header = RequestHeader {
            api_key: api_key as i16,
            api_version: api_version,
            correlation_id: correlation_id,
            client_id: client_id,
        };
        let mut writer = Writer::with_capacity(128);
        header.encode(&mut writer);
        request.encode(api_version, &mut writer);
        let frame = writer.framed();

        endpoint.send(&frame, timeout)?;
        let size_bytes = endpoint.receive(4, timeout)?;
        let size = BigEndian::read_i32(&size_bytes) as usize;
        let body = endpoint.receive(size, timeout)?;

        let mut reader = Reader::new(&body);
        let response_header = ResponseHeader::decode(&mut reader)?;
        if response_header.correlation_id != correlation_id {
            bail!(ErrorKind::MismatchedCorrelationId(correlation_id, response_header.correlation_id));
        }
        Resp::decode(api_version, &mut reader)
    }

    /// Refreshes the metadata cache for `topic` (or every topic, if
    /// `None`), per the cluster-metadata algorithm: try brokers in
    /// `iterate_for_metadata` order until one answers, classify per-topic
    /// and per-partition errors, merge the result in, and recurse (bounded
    /// by `send_max_attempts`) when the response came back with no brokers
    /// at all and `auto_create_topics` is enabled.
    pub fn update_metadata(&mut self, topic: Option<&str>) -> Result<()> {
        self.update_metadata_attempt(topic, 1)
    }

    fn update_metadata_attempt(&mut self, topic: Option<&str>, attempt: u32) -> Result<()> {
        let request = MetadataRequest { topics: topic.map(|t| vec![t.to_owned()]).unwrap_or_default() };

        let candidates = self.registry.iterate_for_metadata();
        if candidates.is_empty() {
            bail!(ErrorKind::BrokerNotAvailable);
        }

        let mut last_error = None;
        let mut response = None;
        for server in &candidates {
            match self.send_unrouted::<MetadataRequest, MetadataResponse>(server, ApiKeys::Metadata, &request) {
                Ok(r) => {
                    response = Some(r);
                    break;
                }
                Err(e) => last_error = Some(e),
            }
        }

        let response = match response {
            Some(r) => r,
            None => {
                let message = last_error.map(|e| e.to_string()).unwrap_or_else(|| "no reachable broker".to_owned());
                bail!(ErrorKind::RetriesExhausted(message));
            }
        };

        if response.brokers.is_empty() {
            if self.config.auto_create_topics && attempt < self.config.send_max_attempts {
                thread::sleep(Duration::from_millis(self.config.retry_backoff_ms));
                return self.update_metadata_attempt(topic, attempt + 1);
            }
            bail!(ErrorKind::EmptyMetadata);
        }

        for topic_meta in &response.topics {
            match topic_meta.error_code {
                0 => {}
                code if is_retriable_error_code(code) && attempt < self.config.send_max_attempts => {
                    thread::sleep(Duration::from_millis(self.config.retry_backoff_ms));
                    return self.update_metadata_attempt(topic, attempt + 1);
                }
                code => bail!(ErrorKind::KafkaError(code.into())),
            }
            for partition in &topic_meta.partitions {
                match partition.error_code {
                    0 | 9 => {}
                    code if is_retriable_error_code(code) && attempt < self.config.send_max_attempts => {
                        thread::sleep(Duration::from_millis(self.config.retry_backoff_ms));
                        return self.update_metadata_attempt(topic, attempt + 1);
                    }
                    code => bail!(ErrorKind::KafkaError(code.into())),
                }
            }
        }

        self.registry.clear_all_node_ids();
        for broker in &response.brokers {
            let key = self.registry
                .insert_or_update(Some(broker.node_id), broker.host.clone(), broker.port as u16);
            self.metadata.merge_leader(broker.node_id, key);
        }

        for topic_meta in response.topics {
            let mut partitions = HashMap::new();
            for partition in topic_meta.partitions {
                partitions.insert(partition.partition,
                                   PartitionMetadata {
                                       leader: partition.leader,
                                       replicas: partition.replicas,
                                       isr: partition.isr,
                                   });
            }
            self.metadata.merge_topic(topic_meta.topic_name, partitions);
        }

        Ok(())
    }

    /// Resolves `group_id`'s coordinator, consulting the cache first. A
    /// cache miss issues FindCoordinator against any reachable broker and
    /// caches the result; callers that hit `NotCoordinatorForGroup` or
    /// `GroupCoordinatorNotAvailable` invalidate the entry and call this
    /// again to force a fresh lookup.
    pub fn coordinator(&mut self, group_id: &str) -> Result<ServerKey> {
        if let Some(key) = self.coordinators.get(group_id) {
            return Ok(key);
        }

        let candidates = self.registry.iterate_for_metadata();
        if candidates.is_empty() {
            bail!(ErrorKind::BrokerNotAvailable);
        }

        let request = FindCoordinatorRequest { group_id: group_id.to_owned() };
        let mut last_error = None;
        for server in &candidates {
            match self.send_unrouted::<FindCoordinatorRequest, FindCoordinatorResponse>(server,
                                                                    ApiKeys::FindCoordinator,
                                                                    &request) {
                Ok(response) => {
                    if response.error_code != 0 {
                        last_error = Some(Error::from(ErrorKind::KafkaError(response.error_code.into())));
                        continue;
                    }
                    let key = self.registry
                        .insert_or_update(Some(response.node_id), response.host, response.port as u16);
                    self.coordinators.set(group_id.to_owned(), key.clone());
                    return Ok(key);
                }
                Err(e) => last_error = Some(e),
            }
        }

        let message = last_error.map(|e| e.to_string()).unwrap_or_else(|| "no reachable broker".to_owned());
        Err(ErrorKind::RetriesExhausted(message).into())
    }

    fn resolve_target(&self, target: &Target) -> Option<ServerKey> {
        match *target {
            Target::Leader { ref topic, partition } => {
                self.metadata
                    .leader_for(topic, partition)
                    .and_then(|node_id| self.metadata.leader_server_key(node_id))
            }
            Target::GroupCoordinator { ref group_id } => self.coordinators.get(group_id),
        }
    }

    fn refresh_for_target(&mut self, target: &Target) -> Result<()> {
        match *target {
            Target::Leader { ref topic, .. } => self.update_metadata(Some(topic)),
            Target::GroupCoordinator { ref group_id } => {
                self.coordinators.invalidate(group_id);
                self.coordinator(group_id).map(|_| ())
            }
        }
    }

    /// The request dispatcher's retry state machine:
    /// resolve `target` to a server, connect, negotiate/authenticate as
    /// needed, encode and send `build_request`'s output, receive and decode
    /// the response (or synthesize one via `synth_no_ack` when
    /// `required_acks_zero` is set, since the broker sends nothing back),
    /// and classify the outcome -- retriable errors trigger a target
    /// refresh and a fixed backoff before the next attempt; anything else
    /// returns immediately.
    pub fn dispatch<Req, Resp, B, S>(&mut self,
                                      api_key: ApiKeys,
                                      target: Target,
                                      required_acks_zero: bool,
                                      mut build_request: B,
                                      synth_no_ack: Option<S>)
                                      -> Result<Resp>
        where Req: Encodable,
              Resp: Decodable + ResponseOutcome,
              B: FnMut() -> Req,
              S: Fn(&Req) -> Resp
    {
        let max_attempts = self.config.send_max_attempts;
        let mut last_error: Option<Error> = None;

        for attempt in 1..=max_attempts {
            let server = match self.resolve_target(&target) {
                Some(server) => server,
                None => {
                    if let Err(e) = self.refresh_for_target(&target) {
                        last_error = Some(e);
                        continue;
                    }
                    match self.resolve_target(&target) {
                        Some(server) => server,
                        None => {
                            last_error = Some(ErrorKind::BrokerNotAvailable.into());
                            continue;
                        }
                    }
                }
            };

            let result = self.dispatch_once(&server,
                                             api_key,
                                             required_acks_zero,
                                             &mut build_request,
                                             synth_no_ack.as_ref());

            match result {
                Ok(response) => {
                    let code = response.outcome_error_code();
                    if code == 0 {
                        return Ok(response);
                    }
                    if api_key as i16 == ApiKeys::Produce as i16 && code == i16::from(KafkaCode::RequestTimedOut) {
                        bail!(ErrorKind::SendNoAck);
                    }
                    if is_retriable_error_code(code) && attempt < max_attempts {
                        self.nonfatal.push(format!("attempt {} against {}: retriable error {}", attempt, server, code));
                        let _ = self.refresh_for_target(&target);
                        thread::sleep(Duration::from_millis(self.config.retry_backoff_ms));
                        last_error = Some(ErrorKind::KafkaError(code.into()).into());
                        continue;
                    }
                    return Err(ErrorKind::KafkaError(code.into()).into());
                }
                Err(e) => {
                    if let ErrorKind::SendNoAck = *e.kind() {
                        return Err(e);
                    }
                    if is_reconnectable(&e) && attempt < max_attempts {
                        self.nonfatal.push(format!("attempt {} against {}: {}", attempt, server, e));
                        if let Some(entry) = self.registry.get_mut(&server) {
                            entry.close_connection(false);
                        }
                        let _ = self.refresh_for_target(&target);
                        thread::sleep(Duration::from_millis(self.config.retry_backoff_ms));
                        last_error = Some(e);
                        continue;
                    }
                    last_error = Some(e);
                    break;
                }
            }
        }

        Err(ErrorKind::RetriesExhausted(last_error.map(|e| e.to_string())
                                             .unwrap_or_else(|| "no attempts made".to_owned()))
                .into())
    }

    fn dispatch_once<Req, Resp, B, S>(&mut self,
                                       server: &ServerKey,
                                       api_key: ApiKeys,
                                       required_acks_zero: bool,
                                       build_request: &mut B,
                                       synth_no_ack: Option<&S>)
                                       -> Result<Resp>
        where Req: Encodable,
              Resp: Decodable,
              B: FnMut() -> Req,
              S: Fn(&Req) -> Resp
    {
        if !self.config.dont_load_api_versions {
            let needs_negotiation = self.registry
                .get(server)
                .map(|e| e.api_versions.is_empty())
                .unwrap_or(true);
            if needs_negotiation {
                self.negotiate_api_versions(server)?;
            }
        }
        self.ensure_authenticated(server)?;

        let api_version = self.api_version_for(server, api_key)?;
        let correlation_id = self.next_correlation_id();
        let client_id = self.config.client_id.clone();
        let timeout = self.config.timeout;
        let ip_version = self.config.ip_version;
        let is_produce = api_key as i16 == ApiKeys::Produce as i16;
        let decode_options = DecodeOptions {
            outer_offset_for_inner_messages: self.config.outer_offset_for_inner_messages,
            verify_crc: self.config.verify_crc,
        };

        let request = build_request();

        let entry = self.registry
            .get_mut(server)
            .ok_or_else(|| Error::from(ErrorKind::BrokerNotAvailable))?;
        let endpoint = entry.ensure_connected(ip_version, timeout)?;

        let header = RequestHeader {
            api_key: api_key as i16,
            api_version: api_version,
            correlation_id: correlation_id,
            client_id: client_id,
        };
        let mut writer = Writer::with_capacity(256);
        header.encode(&mut writer);
        request.encode(api_version, &mut writer);
        let frame = writer.framed();

        if let Err(e) = endpoint.send(&frame, timeout) {
            if is_produce && !is_reconnectable(&e) {
                bail!(ErrorKind::SendNoAck);
            }
            return Err(e);
        }

        if required_acks_zero {
            let synth = synth_no_ack.expect("required_acks_zero dispatch must supply a synthesizer");
            return Ok(synth(&request));
        }

        let size_bytes = match endpoint.receive(4, timeout) {
            Ok(bytes) => bytes,
            Err(e) => {
                if is_produce {
                    bail!(ErrorKind::SendNoAck);
                }
                return Err(e);
            }
        };
        let size = BigEndian::read_i32(&size_bytes) as usize;
        let body = match endpoint.receive(size, timeout) {
            Ok(bytes) => bytes,
            Err(e) => {
                if is_produce {
                    bail!(ErrorKind::SendNoAck);
                }
                return Err(e);
            }
        };

        let mut reader = Reader::new(&body);
        let response_header = ResponseHeader::decode(&mut reader)?;
        if response_header.correlation_id != correlation_id {
            bail!(ErrorKind::MismatchedCorrelationId(correlation_id, response_header.correlation_id));
        }
        Resp::decode_opts(api_version, &mut reader, decode_options)
    }

    /// The ring of recent non-fatal errors the dispatcher absorbed while
    /// retrying.
    pub fn nonfatal_errors(&self) -> Vec<String> {
        self.nonfatal.iter().cloned().collect()
    }

    pub fn clear_nonfatals(&mut self) {
        self.nonfatal.clear();
    }

    /// Snapshot of each known broker's most recently observed error, if
    /// any -- e.g. for surfacing why a given server has been skipped by
    /// `iterate_for_metadata`.
    pub fn cluster_errors(&self) -> HashMap<ServerKey, String> {
        self.registry
            .known()
            .into_iter()
            .filter_map(|key| {
                            self.registry
                                .get(&key)
                                .and_then(|entry| entry.last_error.clone())
                                .map(|err| (key, err))
                        })
            .collect()
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }
}

trait MaxVersionFor {
    fn max_version_for(api_key: i16) -> i16;
}

impl MaxVersionFor for ApiKeys {
    fn max_version_for(api_key: i16) -> i16 {
        match api_key {
            k if k == ApiKeys::Produce as i16 => ApiKeys::Produce.max_supported_version(),
            k if k == ApiKeys::Fetch as i16 => ApiKeys::Fetch.max_supported_version(),
            k if k == ApiKeys::ListOffsets as i16 => ApiKeys::ListOffsets.max_supported_version(),
            k if k == ApiKeys::Metadata as i16 => ApiKeys::Metadata.max_supported_version(),
            k if k == ApiKeys::OffsetCommit as i16 => ApiKeys::OffsetCommit.max_supported_version(),
            k if k == ApiKeys::OffsetFetch as i16 => ApiKeys::OffsetFetch.max_supported_version(),
            k if k == ApiKeys::FindCoordinator as i16 => ApiKeys::FindCoordinator.max_supported_version(),
            k if k == ApiKeys::SaslHandshake as i16 => ApiKeys::SaslHandshake.max_supported_version(),
            k if k == ApiKeys::ApiVersions as i16 => ApiKeys::ApiVersions.max_supported_version(),
            // Unimplemented api_key: treat as version 0 so negotiation never
            // picks something this crate cannot encode.
            _ => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_hosts_rejects_empty_list() {
        let result = KafkaClient::from_hosts(Vec::<String>::new());
        assert!(result.is_err());
    }

    #[test]
    fn test_resolve_target_leader_uses_metadata_then_registry() {
        let mut client = KafkaClient {
            config: ClientConfig::default(),
            registry: BrokerRegistry::new(),
            metadata: MetadataSnapshot::new(),
            coordinators: GroupCoordinatorMap::default(),
            nonfatal: NonFatalErrors::with_capacity(10),
            correlation_id: 0,
        };

        let key = client.registry.insert_or_update(Some(1), "kafka1".to_owned(), 9092);
        client.metadata.merge_leader(1, key.clone());
        let mut partitions = HashMap::new();
        partitions.insert(0,
                           PartitionMetadata {
                               leader: 1,
                               replicas: vec![1],
                               isr: vec![1],
                           });
        client.metadata.merge_topic("t".to_owned(), partitions);

        let target = Target::Leader {
            topic: "t".to_owned(),
            partition: 0,
        };
        assert_eq!(client.resolve_target(&target), Some(key));
    }

    #[test]
    fn test_resolve_target_missing_leader_is_none() {
        let client = KafkaClient {
            config: ClientConfig::default(),
            registry: BrokerRegistry::new(),
            metadata: MetadataSnapshot::new(),
            coordinators: GroupCoordinatorMap::default(),
            nonfatal: NonFatalErrors::with_capacity(10),
            correlation_id: 0,
        };

        let target = Target::Leader {
            topic: "missing".to_owned(),
            partition: 0,
        };
        assert_eq!(client.resolve_target(&target), None);
    }

    #[test]
    fn test_cluster_errors_surfaces_last_error_per_broker() {
        let mut client = KafkaClient {
            config: ClientConfig::default(),
            registry: BrokerRegistry::new(),
            metadata: MetadataSnapshot::new(),
            coordinators: GroupCoordinatorMap::default(),
            nonfatal: NonFatalErrors::with_capacity(10),
            correlation_id: 0,
        };
        let key = client.registry.insert_or_update(Some(1), "kafka1".to_owned(), 9092);
        client.registry.get_mut(&key).unwrap().last_error = Some("boom".to_owned());

        let errors = client.cluster_errors();
        assert_eq!(errors.get(&key), Some(&"boom".to_owned()));
    }
}
