//! WebSocket connector for Substrate nodes.

use super::{CallEncoder, ChainConnector, ChainHandle, EncodedCall};
use anyhow::{anyhow, bail, Context, Result};
use frame_metadata::{RuntimeMetadataPrefixed, META_RESERVED};
use jsonrpsee::{core::client::ClientT, rpc_params, ws_client::WsClientBuilder};
use parity_scale_codec::Decode;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

pub const CONNECTION_TIMEOUT: Duration = Duration::from_secs(15);
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Runtime metadata of larger chains runs to several megabytes.
const MAX_RESPONSE_SIZE: u32 = 64 * 1024 * 1024;

/// Highest precision whose scaling factor still fits in a `u128`.
const MAX_DECIMALS: u32 = 38;

#[derive(Debug, Clone)]
pub struct SubstrateConnector {
    connection_timeout: Duration,
    request_timeout: Duration,
}

impl Default for SubstrateConnector {
    fn default() -> Self {
        Self {
            connection_timeout: CONNECTION_TIMEOUT,
            request_timeout: REQUEST_TIMEOUT,
        }
    }
}

impl SubstrateConnector {
    pub fn with_timeouts(connection_timeout: Duration, request_timeout: Duration) -> Self {
        Self {
            connection_timeout,
            request_timeout,
        }
    }
}

impl ChainConnector for SubstrateConnector {
    type Handle = SubstrateChain;

    async fn connect(&self, endpoint: &str) -> Result<SubstrateChain> {
        tracing::info!("Connecting to {}", endpoint);

        let client = WsClientBuilder::default()
            .connection_timeout(self.connection_timeout)
            .request_timeout(self.request_timeout)
            .max_response_size(MAX_RESPONSE_SIZE)
            .build(endpoint)
            .await
            .with_context(|| format!("Failed to connect to {}", endpoint))?;

        let metadata_hex: String = client
            .request("state_getMetadata", rpc_params![])
            .await
            .context("Failed to fetch runtime metadata")?;
        let encoder = decode_metadata(&metadata_hex)?;

        let properties: Value = client
            .request("system_properties", rpc_params![])
            .await
            .context("Failed to fetch chain properties")?;
        let decimals = token_decimals(&properties)?;

        tracing::info!(
            "Connected to {} ({} pallets with calls, {} decimals)",
            endpoint,
            encoder.pallets().len(),
            decimals
        );
        Ok(SubstrateChain::new(encoder, decimals))
    }
}

/// Decode the hex `state_getMetadata` payload into a call encoder.
pub fn decode_metadata(metadata_hex: &str) -> Result<CallEncoder> {
    let bytes = hex::decode(metadata_hex.trim().trim_start_matches("0x"))
        .context("Runtime metadata is not valid hex")?;
    let metadata = RuntimeMetadataPrefixed::decode(&mut &bytes[..])
        .map_err(|e| anyhow!("Failed to decode runtime metadata: {}", e))?;
    if metadata.0 != META_RESERVED {
        bail!("Runtime metadata has an unexpected magic number");
    }
    CallEncoder::from_metadata(metadata)
}

/// `tokenDecimals` is a number, or an array on multi-token chains.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TokenDecimals {
    Single(u64),
    Multi(Vec<u64>),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChainProperties {
    token_decimals: Option<TokenDecimals>,
}

/// Native token precision from `system_properties`.
///
/// For an array the first entry is the native token.
pub fn token_decimals(properties: &Value) -> Result<u32> {
    let properties =
        ChainProperties::deserialize(properties).context("Malformed chain properties")?;
    let decimals = match properties.token_decimals {
        Some(TokenDecimals::Single(d)) => Some(d),
        Some(TokenDecimals::Multi(values)) => values.first().copied(),
        None => None,
    }
    .ok_or_else(|| anyhow!("Chain does not report tokenDecimals"))?;
    match u32::try_from(decimals) {
        Ok(d) if d <= MAX_DECIMALS => Ok(d),
        _ => bail!("Unsupported token precision of {} decimals", decimals),
    }
}

/// Connection snapshot: the call encoder and token precision.
///
/// Holds no socket, so it stays usable after the runtime that connected is gone.
#[derive(Debug, Clone)]
pub struct SubstrateChain {
    encoder: CallEncoder,
    decimals: u32,
}

impl SubstrateChain {
    pub fn new(encoder: CallEncoder, decimals: u32) -> Self {
        Self { encoder, decimals }
    }
}

impl ChainHandle for SubstrateChain {
    fn decimal_precision(&self) -> u32 {
        self.decimals
    }

    fn build_transfer(&self, dest: &str, value: u128) -> Result<EncodedCall> {
        self.encoder.transfer_keep_alive(dest, value)
    }

    fn build_proxy(
        &self,
        real: &str,
        force_proxy_type: Option<&str>,
        call: EncodedCall,
    ) -> Result<EncodedCall> {
        self.encoder.proxy(real, force_proxy_type, call)
    }

    fn build_batch(&self, calls: Vec<EncodedCall>) -> Result<EncodedCall> {
        self.encoder.batch_all(calls)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::metadata::fixtures;
    use serde_json::json;

    // ==================== token_decimals tests ====================

    #[test]
    fn test_token_decimals_number() {
        let properties = json!({ "tokenDecimals": 12, "tokenSymbol": "TANSSI" });
        assert_eq!(token_decimals(&properties).unwrap(), 12);
    }

    #[test]
    fn test_token_decimals_array_uses_first() {
        let properties = json!({ "tokenDecimals": [18, 6], "tokenSymbol": ["A", "B"] });
        assert_eq!(token_decimals(&properties).unwrap(), 18);
    }

    #[test]
    fn test_token_decimals_missing_fails() {
        assert!(token_decimals(&json!({})).is_err());
        assert!(token_decimals(&json!({ "tokenDecimals": [] })).is_err());
        assert!(token_decimals(&json!({ "tokenDecimals": "12" })).is_err());
    }

    #[test]
    fn test_token_decimals_out_of_range_fails() {
        assert!(token_decimals(&json!({ "tokenDecimals": 39 })).is_err());
    }

    // ==================== decode_metadata tests ====================

    #[test]
    fn test_decode_metadata_rejects_bad_hex() {
        let err = decode_metadata("0xnothex").unwrap_err();
        assert!(err.to_string().contains("hex"));
    }

    #[test]
    fn test_decode_metadata_rejects_truncated_payload() {
        assert!(decode_metadata("0x6d657461").is_err());
    }

    // ==================== handle tests ====================

    #[test]
    fn test_chain_handle_delegates_to_encoder() {
        let chain = SubstrateChain::new(fixtures::encoder(), 12);
        assert_eq!(chain.decimal_precision(), 12);

        let (dest, _) = fixtures::account(2);
        let call = chain.build_transfer(&dest, 1).unwrap();
        let hex = chain.encode_hex(&call);
        assert!(hex.starts_with("0x0a03"));
        assert_eq!(hex, hex.to_lowercase());
    }

    #[tokio::test]
    async fn test_connect_unreachable_endpoint_fails() {
        let connector =
            SubstrateConnector::with_timeouts(Duration::from_secs(2), Duration::from_secs(2));
        let err = connector.connect("ws://127.0.0.1:1").await.unwrap_err();
        assert!(err.to_string().contains("Failed to connect"));
    }
}
