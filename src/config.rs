use crate::calldata::BatchPolicy;
use crate::debounce::DEFAULT_DEBOUNCE;
use std::env;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// A supported Substrate network with label, WebSocket endpoint and native token.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubstrateNetwork {
    pub key: &'static str,
    pub label: &'static str,
    pub ws_url: &'static str,
    pub native_token: &'static str,
}

impl SubstrateNetwork {
    pub const fn new(
        key: &'static str,
        label: &'static str,
        ws_url: &'static str,
        native_token: &'static str,
    ) -> Self {
        Self {
            key,
            label,
            ws_url,
            native_token,
        }
    }
}

pub const NETWORKS: &[SubstrateNetwork] = &[SubstrateNetwork::new(
    "tanssi",
    "Tanssi",
    "wss://services.tanssi-mainnet.network/tanssi",
    "TANSSI",
)];

pub const DEFAULT_NETWORK: &str = "tanssi";

/// Polkadot.js Apps, used to decode and submit the generated call.
pub const EXPLORER_BASE_URL: &str = "https://polkadot.js.org/apps/";

pub const ENV_NETWORK: &str = "PROXY_BUILDER_NETWORK";
pub const ENV_RPC: &str = "PROXY_BUILDER_RPC";
pub const ENV_DEBOUNCE_MS: &str = "PROXY_BUILDER_DEBOUNCE_MS";
pub const ENV_BATCH_POLICY: &str = "PROXY_BUILDER_BATCH_POLICY";

/// Find a network by key (case-insensitive)
pub fn find_network(key: &str) -> Option<&'static SubstrateNetwork> {
    NETWORKS.iter().find(|n| n.key.eq_ignore_ascii_case(key.trim()))
}

/// Find the index of a network in NETWORKS by key
pub fn find_network_index(key: &str) -> Option<usize> {
    NETWORKS.iter().position(|n| n.key.eq_ignore_ascii_case(key.trim()))
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Unknown network '{0}'")]
    UnknownNetwork(String),
    #[error("Invalid endpoint '{0}': expected a ws:// or wss:// URL")]
    InvalidEndpoint(String),
    #[error("Invalid batch policy '{0}': expected proxy-then-batch or batch-then-proxy")]
    InvalidBatchPolicy(String),
    #[error("Invalid debounce delay '{0}': expected milliseconds")]
    InvalidDebounce(String),
}

/// Check that `endpoint` is a WebSocket URL.
pub fn validate_endpoint(endpoint: &str) -> Result<String, ConfigError> {
    let trimmed = endpoint.trim();
    let url = Url::parse(trimmed).map_err(|_| ConfigError::InvalidEndpoint(trimmed.to_string()))?;
    match url.scheme() {
        "ws" | "wss" if url.host_str().is_some() => Ok(trimmed.to_string()),
        _ => Err(ConfigError::InvalidEndpoint(trimmed.to_string())),
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub network_key: String,
    pub label: String,
    pub ws_url: String,
    pub native_token: String,
    pub debounce_ms: u64,
    pub batch_policy: BatchPolicy,
}

impl Config {
    pub fn from_network(network: &SubstrateNetwork) -> Self {
        Self {
            network_key: network.key.to_string(),
            label: network.label.to_string(),
            ws_url: network.ws_url.to_string(),
            native_token: network.native_token.to_string(),
            debounce_ms: DEFAULT_DEBOUNCE.as_millis() as u64,
            batch_policy: BatchPolicy::default(),
        }
    }

    /// Build the config from `PROXY_BUILDER_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Build the config from a variable lookup; unset or blank variables take defaults.
    pub fn from_vars<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let key = var(ENV_NETWORK).unwrap_or_else(|| DEFAULT_NETWORK.to_string());
        let network = find_network(&key).ok_or_else(|| ConfigError::UnknownNetwork(key.clone()))?;
        let mut config = Self::from_network(network);

        if let Some(rpc) = var(ENV_RPC) {
            config.ws_url = validate_endpoint(&rpc)?;
            tracing::info!("Using endpoint override {}", config.ws_url);
        }
        if let Some(ms) = var(ENV_DEBOUNCE_MS) {
            config.debounce_ms = ms
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidDebounce(ms.clone()))?;
        }
        if let Some(policy) = var(ENV_BATCH_POLICY) {
            config.batch_policy = policy.parse().map_err(ConfigError::InvalidBatchPolicy)?;
        }

        tracing::debug!(
            "Config: network={} endpoint={} debounce={}ms policy={}",
            config.network_key,
            config.ws_url,
            config.debounce_ms,
            config.batch_policy
        );
        Ok(config)
    }

    /// Switch to another network, keeping the editing preferences.
    pub fn select_network(&mut self, network: &SubstrateNetwork) {
        let debounce_ms = self.debounce_ms;
        let batch_policy = self.batch_policy;
        *self = Self::from_network(network);
        self.debounce_ms = debounce_ms;
        self.batch_policy = batch_policy;
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// Polkadot.js Apps link that opens `calldata` in the extrinsic decoder.
    pub fn explorer_decode_url(&self, calldata: &str) -> Result<Url, url::ParseError> {
        let mut url = Url::parse_with_params(EXPLORER_BASE_URL, &[("rpc", self.ws_url.as_str())])?;
        url.set_fragment(Some(&format!("/extrinsics/decode/{}", calldata)));
        Ok(url)
    }
}

impl Default for Config {
    fn default() -> Self {
        match find_network(DEFAULT_NETWORK) {
            Some(network) => Self::from_network(network),
            None => Self::from_network(&NETWORKS[0]),
        }
    }
}
