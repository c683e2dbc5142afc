//! Adaptor configuration.
//!
//! [`AdaptorConfig`] holds the fixed identities, addresses and streaming
//! constants the adaptor uses. Defaults reproduce the reference adaptor; the
//! builder validates overrides before an adaptor is constructed.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use static_assertions::const_assert;
use thiserror::Error;

/// Default number of chunks appended to a streamed message.
pub const DEFAULT_STREAM_CHUNK_BOUND: u32 = 10;
/// Default content of each streamed chunk.
pub const DEFAULT_STREAM_CHUNK: &str =
    "0123456789abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";
/// Default credit window reported to the core.
pub const DEFAULT_CREDIT_WINDOW: u32 = 8;
/// Default link capacity requested when opening the connection.
pub const DEFAULT_LINK_CAPACITY: u32 = 250;

const_assert!(DEFAULT_STREAM_CHUNK_BOUND > 0);
const_assert!(DEFAULT_CREDIT_WINDOW > 0);

/// How a flow event on an outbound link translates into sends.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CreditPolicy {
    /// Attempt exactly one send per flow event, ignoring the granted count.
    #[default]
    SingleSend,
    /// Attempt one simple send per unit of granted credit.
    UpToCredit,
}

impl CreditPolicy {
    /// Number of one-shot sends to attempt for a grant of `credit`.
    #[must_use]
    pub fn sends_for(self, credit: i32) -> usize {
        match self {
            Self::SingleSend => 1,
            Self::UpToCredit => usize::try_from(credit).unwrap_or(0),
        }
    }
}

/// Errors returned when validating an [`AdaptorConfig`].
#[non_exhaustive]
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("stream chunk bound must be at least 1")]
    ZeroChunkBound,
    #[error("stream chunk content must not be empty")]
    EmptyChunk,
    #[error("credit window must be at least 1")]
    ZeroCreditWindow,
    #[error("event capacity must be at least 1")]
    ZeroEventCapacity,
    #[error("container label must not be empty")]
    EmptyContainer,
    #[error("simple and stream addresses must differ; both are {0:?}")]
    DuplicateAddress(String),
}

/// Configuration for one adaptor instance.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdaptorConfig {
    pub adaptor_name: String,
    pub container: String,
    pub link_name_prefix: String,
    pub simple_address: String,
    pub stream_address: String,
    pub link_capacity: u32,
    pub credit_window: u32,
    pub stream_chunk_bound: u32,
    pub stream_chunk: String,
    pub stream_start_delay: Duration,
    pub stream_interval: Duration,
    pub credit_policy: CreditPolicy,
    pub event_capacity: usize,
}

impl Default for AdaptorConfig {
    fn default() -> Self {
        Self {
            adaptor_name: "reference".to_owned(),
            container: "reference-adaptor".to_owned(),
            link_name_prefix: "ref".to_owned(),
            simple_address: "examples".to_owned(),
            stream_address: "stream".to_owned(),
            link_capacity: DEFAULT_LINK_CAPACITY,
            credit_window: DEFAULT_CREDIT_WINDOW,
            stream_chunk_bound: DEFAULT_STREAM_CHUNK_BOUND,
            stream_chunk: DEFAULT_STREAM_CHUNK.to_owned(),
            stream_start_delay: Duration::from_millis(1000),
            stream_interval: Duration::from_millis(100),
            credit_policy: CreditPolicy::default(),
            event_capacity: 64,
        }
    }
}

impl AdaptorConfig {
    /// Start building a configuration from the defaults.
    #[must_use]
    pub fn builder() -> AdaptorConfigBuilder { AdaptorConfigBuilder::default() }

    /// Check the configuration for values the adaptor cannot run with.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.stream_chunk_bound == 0 {
            return Err(ConfigError::ZeroChunkBound);
        }
        if self.stream_chunk.is_empty() {
            return Err(ConfigError::EmptyChunk);
        }
        if self.credit_window == 0 {
            return Err(ConfigError::ZeroCreditWindow);
        }
        if self.event_capacity == 0 {
            return Err(ConfigError::ZeroEventCapacity);
        }
        if self.container.is_empty() {
            return Err(ConfigError::EmptyContainer);
        }
        if self.simple_address == self.stream_address {
            return Err(ConfigError::DuplicateAddress(self.simple_address.clone()));
        }
        Ok(())
    }

    /// Name of the `index`th link the adaptor attaches.
    #[must_use]
    pub fn link_name(&self, index: usize) -> String { format!("{}.{index}", self.link_name_prefix) }

    /// Total body length of a fully streamed message.
    #[must_use]
    pub fn streamed_len(&self) -> usize {
        self.stream_chunk.len() * self.stream_chunk_bound as usize
    }
}

/// Builder for [`AdaptorConfig`].
///
/// # Examples
///
/// ```
/// use std::time::Duration;
///
/// use linkwire::config::{AdaptorConfig, CreditPolicy};
///
/// let config = AdaptorConfig::builder()
///     .stream_chunk_bound(3)
///     .stream_interval(Duration::from_millis(5))
///     .credit_policy(CreditPolicy::UpToCredit)
///     .build()
///     .expect("valid configuration");
/// assert_eq!(config.streamed_len(), 3 * 62);
/// ```
#[derive(Debug, Default)]
pub struct AdaptorConfigBuilder {
    config: AdaptorConfig,
}

impl AdaptorConfigBuilder {
    /// Set the name the adaptor registers under.
    #[must_use]
    pub fn adaptor_name(mut self, name: impl Into<String>) -> Self {
        self.config.adaptor_name = name.into();
        self
    }

    /// Set the container label reported when opening the connection.
    #[must_use]
    pub fn container(mut self, container: impl Into<String>) -> Self {
        self.config.container = container.into();
        self
    }

    /// Set the prefix used for link names.
    #[must_use]
    pub fn link_name_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.link_name_prefix = prefix.into();
        self
    }

    /// Set the address of the one-shot send link.
    #[must_use]
    pub fn simple_address(mut self, address: impl Into<String>) -> Self {
        self.config.simple_address = address.into();
        self
    }

    /// Set the address shared by the streaming send and receive links.
    #[must_use]
    pub fn stream_address(mut self, address: impl Into<String>) -> Self {
        self.config.stream_address = address.into();
        self
    }

    /// Set the link capacity requested from the core.
    #[must_use]
    pub fn link_capacity(mut self, capacity: u32) -> Self {
        self.config.link_capacity = capacity;
        self
    }

    /// Set the credit window reported to the core.
    #[must_use]
    pub fn credit_window(mut self, window: u32) -> Self {
        self.config.credit_window = window;
        self
    }

    /// Set how many chunks complete a streamed message.
    #[must_use]
    pub fn stream_chunk_bound(mut self, bound: u32) -> Self {
        self.config.stream_chunk_bound = bound;
        self
    }

    /// Set the content appended per streamed chunk.
    #[must_use]
    pub fn stream_chunk(mut self, chunk: impl Into<String>) -> Self {
        self.config.stream_chunk = chunk.into();
        self
    }

    /// Set the delay before the first chunk is appended.
    #[must_use]
    pub fn stream_start_delay(mut self, delay: Duration) -> Self {
        self.config.stream_start_delay = delay;
        self
    }

    /// Set the delay between chunks.
    #[must_use]
    pub fn stream_interval(mut self, interval: Duration) -> Self {
        self.config.stream_interval = interval;
        self
    }

    /// Set the flow handling policy.
    #[must_use]
    pub fn credit_policy(mut self, policy: CreditPolicy) -> Self {
        self.config.credit_policy = policy;
        self
    }

    /// Set the capacity of the connection actor's event channel.
    #[must_use]
    pub fn event_capacity(mut self, capacity: usize) -> Self {
        self.config.event_capacity = capacity;
        self
    }

    /// Validate and return the configuration.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] describing the first invalid setting.
    pub fn build(self) -> Result<AdaptorConfig, ConfigError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = AdaptorConfig::default();
        assert_eq!(config.validate(), Ok(()));
        assert_eq!(config.streamed_len(), 620);
        assert_eq!(config.link_name(0), "ref.0");
    }

    #[rstest]
    #[case(AdaptorConfig::builder().stream_chunk_bound(0), ConfigError::ZeroChunkBound)]
    #[case(AdaptorConfig::builder().stream_chunk(""), ConfigError::EmptyChunk)]
    #[case(AdaptorConfig::builder().credit_window(0), ConfigError::ZeroCreditWindow)]
    #[case(AdaptorConfig::builder().event_capacity(0), ConfigError::ZeroEventCapacity)]
    #[case(AdaptorConfig::builder().container(""), ConfigError::EmptyContainer)]
    #[case(
        AdaptorConfig::builder().simple_address("stream"),
        ConfigError::DuplicateAddress("stream".to_owned())
    )]
    fn rejects_invalid_settings(#[case] builder: AdaptorConfigBuilder, #[case] expected: ConfigError) {
        assert_eq!(builder.build(), Err(expected));
    }

    #[test]
    fn partial_config_fills_missing_fields_with_defaults() {
        use serde::de::value::{Error as ValueError, MapDeserializer};

        let fields = [
            ("container", "edge-adaptor"),
            ("simple_address", "greetings"),
            ("credit_policy", "UpToCredit"),
        ];
        let config =
            AdaptorConfig::deserialize(MapDeserializer::<_, ValueError>::new(fields.into_iter()))
                .expect("partial config deserialises");

        assert_eq!(
            config,
            AdaptorConfig {
                container: "edge-adaptor".to_owned(),
                simple_address: "greetings".to_owned(),
                credit_policy: CreditPolicy::UpToCredit,
                ..AdaptorConfig::default()
            }
        );
        assert_eq!(config.validate(), Ok(()));
    }

    #[rstest]
    #[case(CreditPolicy::SingleSend, 5, 1)]
    #[case(CreditPolicy::SingleSend, 0, 1)]
    #[case(CreditPolicy::UpToCredit, 5, 5)]
    #[case(CreditPolicy::UpToCredit, -1, 0)]
    fn credit_policy_counts_sends(
        #[case] policy: CreditPolicy,
        #[case] credit: i32,
        #[case] expected: usize,
    ) {
        assert_eq!(policy.sends_for(credit), expected);
    }
}
