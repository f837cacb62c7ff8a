//! Proxy transfer calldata builder.
//!
//! Turns a ready [`ProxyRequest`] into the hex encoding of one call:
//! `proxy.proxy` around a single transfer, or a `utility.batch_all` for
//! several transfers arranged according to the [`BatchPolicy`].

use crate::chain::{ChainConnector, ChainHandle, ChainSession, EncodedCall};
use crate::types::ProxyRequest;
use crate::utils::{self, AmountError};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// How several transfers are combined with the proxy call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BatchPolicy {
    /// `batch_all([proxy(transfer_1), proxy(transfer_2), ...])`
    #[default]
    ProxyThenBatch,
    /// `proxy(batch_all([transfer_1, transfer_2, ...]))`
    BatchThenProxy,
}

impl BatchPolicy {
    pub const ALL: [BatchPolicy; 2] = [BatchPolicy::ProxyThenBatch, BatchPolicy::BatchThenProxy];

    pub fn as_str(&self) -> &'static str {
        match self {
            BatchPolicy::ProxyThenBatch => "proxy-then-batch",
            BatchPolicy::BatchThenProxy => "batch-then-proxy",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            BatchPolicy::ProxyThenBatch => "Batch of proxied transfers",
            BatchPolicy::BatchThenProxy => "Proxied batch of transfers",
        }
    }
}

impl fmt::Display for BatchPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BatchPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "proxy-then-batch" => Ok(BatchPolicy::ProxyThenBatch),
            "batch-then-proxy" => Ok(BatchPolicy::BatchThenProxy),
            other => Err(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    #[error("Failed to connect to chain: {0}")]
    Connection(String),
    #[error("Transfer #{position}: invalid amount '{value}': {source}")]
    Amount {
        position: usize,
        value: String,
        source: AmountError,
    },
    #[error("No transfers to build")]
    EmptyBatch,
    #[error("{0}")]
    Call(String),
}

impl BuildError {
    fn call(err: anyhow::Error) -> Self {
        BuildError::Call(format!("{:#}", err))
    }
}

/// Build the hex calldata for `request`.
///
/// Every amount is converted before any call is constructed, so an amount
/// error always names the first offending row.
pub fn build_calldata<H: ChainHandle + ?Sized>(
    chain: &H,
    request: &ProxyRequest,
    policy: BatchPolicy,
) -> Result<String, BuildError> {
    let decimals = chain.decimal_precision();
    let mut units = Vec::with_capacity(request.transfers.len());
    for (i, entry) in request.transfers.iter().enumerate() {
        let value = utils::parse_units(&entry.amount, decimals).map_err(|source| {
            BuildError::Amount {
                position: i + 1,
                value: entry.amount.trim().to_string(),
                source,
            }
        })?;
        units.push(value);
    }

    let transfers = request
        .transfers
        .iter()
        .zip(units)
        .map(|(entry, value)| chain.build_transfer(entry.destination.trim(), value))
        .collect::<anyhow::Result<Vec<EncodedCall>>>()
        .map_err(BuildError::call)?;

    let real = request.proxy_account.trim();
    let proxy = |call: EncodedCall| chain.build_proxy(real, None, call);

    let call = match transfers.len() {
        0 => return Err(BuildError::EmptyBatch),
        1 => {
            let transfer = transfers.into_iter().next().ok_or(BuildError::EmptyBatch)?;
            proxy(transfer).map_err(BuildError::call)?
        }
        n => {
            tracing::debug!("Batching {} transfers ({})", n, policy);
            match policy {
                BatchPolicy::ProxyThenBatch => {
                    let proxied = transfers
                        .into_iter()
                        .map(proxy)
                        .collect::<anyhow::Result<Vec<_>>>()
                        .map_err(BuildError::call)?;
                    chain.build_batch(proxied).map_err(BuildError::call)?
                }
                BatchPolicy::BatchThenProxy => {
                    let batch = chain.build_batch(transfers).map_err(BuildError::call)?;
                    proxy(batch).map_err(BuildError::call)?
                }
            }
        }
    };

    Ok(chain.encode_hex(&call))
}

/// Obtain the handle for `endpoint` (connecting if needed) and build.
pub async fn rebuild<C: ChainConnector>(
    session: &ChainSession<C>,
    endpoint: &str,
    request: &ProxyRequest,
    policy: BatchPolicy,
) -> Result<String, BuildError> {
    let chain = session
        .handle(endpoint)
        .await
        .map_err(|e| BuildError::Connection(format!("{:#}", e)))?;
    let calldata = build_calldata(chain.as_ref(), request, policy)?;
    tracing::info!(
        "Built calldata for {} transfer(s), {} bytes",
        request.transfers.len(),
        calldata.len().saturating_sub(2) / 2
    );
    Ok(calldata)
}
