//! Common types shared across modules.

use crate::utils;

/// One destination/amount row of the transfer batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferEntry {
    pub id: u64,
    pub destination: String,
    /// Decimal literal in the chain's human-readable unit
    pub amount: String,
}

impl TransferEntry {
    pub fn new(id: u64, destination: impl Into<String>, amount: impl Into<String>) -> Self {
        Self {
            id,
            destination: destination.into(),
            amount: amount.into(),
        }
    }

    pub fn empty(id: u64) -> Self {
        Self::new(id, String::new(), String::new())
    }

    pub fn field(&self, field: TransferField) -> &str {
        match field {
            TransferField::Destination => &self.destination,
            TransferField::Amount => &self.amount,
        }
    }

    pub(crate) fn field_mut(&mut self, field: TransferField) -> &mut String {
        match field {
            TransferField::Destination => &mut self.destination,
            TransferField::Amount => &mut self.amount,
        }
    }

    /// Both fields filled in and the amount is a decimal literal.
    pub fn is_complete(&self) -> bool {
        !self.destination.trim().is_empty() && utils::is_decimal_literal(&self.amount)
    }
}

/// Editable field of a [`TransferEntry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransferField {
    Destination,
    Amount,
}

/// Snapshot of everything needed to build the proxy call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyRequest {
    pub proxy_account: String,
    pub transfers: Vec<TransferEntry>,
}

impl ProxyRequest {
    /// Ready to build: proxy account set and every row complete.
    ///
    /// An incomplete request is not an error, the rebuild is simply skipped.
    pub fn is_ready(&self) -> bool {
        !self.proxy_account.trim().is_empty()
            && !self.transfers.is_empty()
            && self.transfers.iter().all(TransferEntry::is_complete)
    }
}

/// Chain facts resolved once per connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainContext {
    pub endpoint: String,
    pub decimal_precision: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(proxy: &str, rows: &[(&str, &str)]) -> ProxyRequest {
        ProxyRequest {
            proxy_account: proxy.to_string(),
            transfers: rows
                .iter()
                .enumerate()
                .map(|(i, (d, a))| TransferEntry::new(i as u64 + 1, *d, *a))
                .collect(),
        }
    }

    #[test]
    fn test_request_ready_when_all_fields_present() {
        assert!(request("PROXY", &[("AAA", "10"), ("BBB", "0.5")]).is_ready());
    }

    #[test]
    fn test_request_not_ready_without_proxy() {
        assert!(!request("  ", &[("AAA", "10")]).is_ready());
    }

    #[test]
    fn test_request_not_ready_with_empty_field() {
        assert!(!request("PROXY", &[("AAA", "10"), ("", "5")]).is_ready());
        assert!(!request("PROXY", &[("AAA", "")]).is_ready());
    }

    #[test]
    fn test_request_not_ready_with_non_numeric_amount() {
        assert!(!request("PROXY", &[("AAA", "ten")]).is_ready());
    }

    #[test]
    fn test_request_not_ready_without_transfers() {
        assert!(!request("PROXY", &[]).is_ready());
    }

    #[test]
    fn test_entry_field_accessors() {
        let mut entry = TransferEntry::new(3, "AAA", "1");
        assert_eq!(entry.field(TransferField::Destination), "AAA");
        *entry.field_mut(TransferField::Amount) = "2".to_string();
        assert_eq!(entry.field(TransferField::Amount), "2");
    }
}
