//! Chain client adapter.
//!
//! Everything the calldata builder needs from a Substrate chain sits behind
//! [`ChainHandle`]: the decimal precision of the native token and the three
//! call constructors. [`ChainConnector`] produces handles for an endpoint, and
//! [`ChainSession`] caches the handle for the currently selected network.

pub mod metadata;
pub mod session;
pub mod substrate;

pub use metadata::CallEncoder;
pub use session::ChainSession;
pub use substrate::{SubstrateChain, SubstrateConnector};

use anyhow::Result;
use std::future::Future;

/// SCALE-encoded call bytes, opaque outside the adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedCall(Vec<u8>);

impl EncodedCall {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }
}

/// A connected chain able to construct calls.
pub trait ChainHandle: Send + Sync {
    /// Decimal places of the native token.
    fn decimal_precision(&self) -> u32;

    /// `balances.transfer_keep_alive(dest, value)`.
    fn build_transfer(&self, dest: &str, value: u128) -> Result<EncodedCall>;

    /// `proxy.proxy(real, force_proxy_type, call)`.
    fn build_proxy(
        &self,
        real: &str,
        force_proxy_type: Option<&str>,
        call: EncodedCall,
    ) -> Result<EncodedCall>;

    /// `utility.batch_all(calls)`.
    fn build_batch(&self, calls: Vec<EncodedCall>) -> Result<EncodedCall>;

    /// `0x`-prefixed lowercase hex of the call bytes.
    fn encode_hex(&self, call: &EncodedCall) -> String {
        format!("0x{}", hex::encode(call.as_bytes()))
    }
}

/// Opens connections to an endpoint.
pub trait ChainConnector: Send + Sync + 'static {
    type Handle: ChainHandle + 'static;

    fn connect(&self, endpoint: &str) -> impl Future<Output = Result<Self::Handle>> + Send;
}
