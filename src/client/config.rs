//! Client configuration: a plain data struct plus a fluent builder.

use std::time::Duration;

use network::IpVersionPref;

#[derive(Clone, Debug, PartialEq)]
pub struct ClientConfig {
    pub hosts: Vec<String>,
    pub client_id: Option<String>,
    pub ip_version: IpVersionPref,
    pub timeout: Duration,
    pub send_max_attempts: u32,
    pub retry_backoff_ms: u64,
    pub auto_create_topics: bool,
    pub max_logged_errors: usize,
    pub dont_load_api_versions: bool,
    /// Open-question decision: whether a decompressed batch's inner
    /// messages are renumbered to the outer message's offset (`true`,
    /// matching the source this crate descends from) or trusted as
    /// absolute (`false`, Kafka >= 0.10 batching behaviour).
    pub outer_offset_for_inner_messages: bool,
    /// Open-question decision: recompute and check each message's CRC on
    /// consume. Off by default -- the broker already verified it once.
    pub verify_crc: bool,
    pub sasl_plain: Option<SaslPlainConfig>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SaslPlainConfig {
    pub username: String,
    pub password: String,
}

impl Default for ClientConfig {
    fn default() -> ClientConfig {
        ClientConfig {
            hosts: Vec::new(),
            client_id: None,
            ip_version: IpVersionPref::Any,
            timeout: Duration::from_millis(1500),
            send_max_attempts: 4,
            retry_backoff_ms: 100,
            auto_create_topics: false,
            max_logged_errors: 100,
            dont_load_api_versions: false,
            outer_offset_for_inner_messages: true,
            verify_crc: false,
            sasl_plain: None,
        }
    }
}

/// Fluent builder over `ClientConfig`, feeding `KafkaClient::from_hosts`/
/// `from_config`.
#[derive(Clone, Debug, Default)]
pub struct ClientBuilder {
    config: ClientConfig,
}

impl ClientBuilder {
    pub fn new() -> ClientBuilder {
        ClientBuilder::default()
    }

    pub fn host<S: Into<String>>(mut self, host: S, port: u16) -> ClientBuilder {
        self.config.hosts.push(format!("{}:{}", host.into(), port));
        self
    }

    pub fn broker_list<I, S>(mut self, hosts: I) -> ClientBuilder
        where I: IntoIterator<Item = S>,
              S: Into<String>
    {
        self.config.hosts.extend(hosts.into_iter().map(Into::into));
        self
    }

    pub fn client_id<S: Into<String>>(mut self, client_id: S) -> ClientBuilder {
        self.config.client_id = Some(client_id.into());
        self
    }

    pub fn ip_version(mut self, pref: IpVersionPref) -> ClientBuilder {
        self.config.ip_version = pref;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> ClientBuilder {
        self.config.timeout = timeout;
        self
    }

    pub fn send_max_attempts(mut self, attempts: u32) -> ClientBuilder {
        self.config.send_max_attempts = attempts;
        self
    }

    pub fn retry_backoff_ms(mut self, ms: u64) -> ClientBuilder {
        self.config.retry_backoff_ms = ms;
        self
    }

    pub fn auto_create_topics(mut self, enabled: bool) -> ClientBuilder {
        self.config.auto_create_topics = enabled;
        self
    }

    pub fn max_logged_errors(mut self, n: usize) -> ClientBuilder {
        self.config.max_logged_errors = n;
        self
    }

    pub fn dont_load_api_versions(mut self, skip: bool) -> ClientBuilder {
        self.config.dont_load_api_versions = skip;
        self
    }

    pub fn outer_offset_for_inner_messages(mut self, enabled: bool) -> ClientBuilder {
        self.config.outer_offset_for_inner_messages = enabled;
        self
    }

    pub fn verify_crc(mut self, enabled: bool) -> ClientBuilder {
        self.config.verify_crc = enabled;
        self
    }

    pub fn sasl_plain<S: Into<String>>(mut self, username: S, password: S) -> ClientBuilder {
        self.config.sasl_plain = Some(SaslPlainConfig {
                                           username: username.into(),
                                           password: password.into(),
                                       });
        self
    }

    pub fn build(self) -> ClientConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_configuration_table() {
        let config = ClientConfig::default();
        assert_eq!(config.timeout, Duration::from_millis(1500));
        assert_eq!(config.send_max_attempts, 4);
        assert_eq!(config.retry_backoff_ms, 100);
        assert_eq!(config.auto_create_topics, false);
        assert_eq!(config.max_logged_errors, 100);
        assert_eq!(config.dont_load_api_versions, false);
    }

    #[test]
    fn test_builder_collects_broker_list_and_bootstrap_host() {
        let config = ClientBuilder::new()
            .host("kafka1", 9092)
            .broker_list(vec!["kafka2:9092", "[::1]:9092"])
            .build();

        assert_eq!(config.hosts,
                   vec!["kafka1:9092".to_owned(), "kafka2:9092".to_owned(), "[::1]:9092".to_owned()]);
    }
}
