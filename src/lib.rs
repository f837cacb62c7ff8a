//! Builds unsigned `proxy.proxy` call data, optionally batched across several
//! balance transfers, for manual submission through Polkadot.js Apps.

pub mod calldata;
pub mod chain;
pub mod config;
pub mod csv_import;
pub mod debounce;
pub mod form;
pub mod gui;
pub mod rebuild;
pub mod transfer_list;
pub mod types;
pub mod utils;
