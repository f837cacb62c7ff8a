//! Transfer list model: the proxy account field plus the ordered transfer rows.
//!
//! Every effective mutation bumps [`TransferList::revision`], which is what the
//! form controller watches to decide when calldata has to be rebuilt. Writes
//! that leave a value unchanged do not bump it.

use crate::types::{ProxyRequest, TransferEntry, TransferField};
use std::collections::HashSet;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ListError {
    #[error("a transfer batch needs at least one entry")]
    EmptyBatch,
    #[error("duplicate transfer id {0}")]
    DuplicateId(u64),
}

#[derive(Debug, Clone)]
pub struct TransferList {
    proxy_account: String,
    entries: Vec<TransferEntry>,
    next_id: u64,
    revision: u64,
}

impl Default for TransferList {
    fn default() -> Self {
        Self::new()
    }
}

impl TransferList {
    /// A list holding a single empty row with id 1.
    pub fn new() -> Self {
        Self {
            proxy_account: String::new(),
            entries: vec![TransferEntry::empty(1)],
            next_id: 2,
            revision: 0,
        }
    }

    pub fn proxy_account(&self) -> &str {
        &self.proxy_account
    }

    pub fn entries(&self) -> &[TransferEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false; kept for the `len`/`is_empty` pair.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: u64) -> Option<&TransferEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Append an empty row and return its id. Ids are never reused.
    pub fn add(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.entries.push(TransferEntry::empty(id));
        self.touch();
        id
    }

    /// Remove a row. Removing the last remaining row (or an unknown id) is a no-op.
    pub fn remove(&mut self, id: u64) -> bool {
        if self.entries.len() <= 1 {
            return false;
        }
        let Some(pos) = self.entries.iter().position(|e| e.id == id) else {
            return false;
        };
        self.entries.remove(pos);
        self.touch();
        true
    }

    /// Set one field of a row. Returns whether anything changed.
    pub fn update(&mut self, id: u64, field: TransferField, value: &str) -> bool {
        let Some(entry) = self.entries.iter_mut().find(|e| e.id == id) else {
            return false;
        };
        let slot = entry.field_mut(field);
        if *slot == value {
            return false;
        }
        *slot = value.to_string();
        self.touch();
        true
    }

    pub fn set_proxy_account(&mut self, value: &str) -> bool {
        if self.proxy_account == value {
            return false;
        }
        self.proxy_account = value.to_string();
        self.touch();
        true
    }

    /// Swap the whole batch at once; id allocation restarts past the highest id.
    ///
    /// # Errors
    /// An empty batch or duplicate ids are rejected and the list is left untouched.
    pub fn replace_all(&mut self, entries: Vec<TransferEntry>) -> Result<(), ListError> {
        if entries.is_empty() {
            return Err(ListError::EmptyBatch);
        }
        let mut seen = HashSet::with_capacity(entries.len());
        for entry in &entries {
            if !seen.insert(entry.id) {
                return Err(ListError::DuplicateId(entry.id));
            }
        }
        self.next_id = entries.iter().map(|e| e.id).max().unwrap_or(0) + 1;
        self.entries = entries;
        self.touch();
        Ok(())
    }

    /// "Clear all": back to a single empty row with id 1. The proxy account is kept.
    pub fn clear(&mut self) {
        self.entries = vec![TransferEntry::empty(1)];
        self.next_id = 2;
        self.touch();
    }

    pub fn request(&self) -> ProxyRequest {
        ProxyRequest {
            proxy_account: self.proxy_account.trim().to_string(),
            transfers: self
                .entries
                .iter()
                .map(|e| TransferEntry::new(e.id, e.destination.trim(), e.amount.trim()))
                .collect(),
        }
    }

    fn touch(&mut self) {
        self.revision += 1;
    }
}
