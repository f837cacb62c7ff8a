//! Form controller: ties the transfer list to calldata rebuilds.
//!
//! The GUI mutates the list through [`ProxyForm::list_mut`], then calls
//! [`ProxyForm::poll_rebuild`] once per frame. Any effective change clears the
//! shown calldata and error and, when the request is complete, yields a new
//! rebuild to run in the background. Results are handed back through
//! [`ProxyForm::complete`], which drops anything superseded in the meantime.

use crate::csv_import::{self, CsvImportError};
use crate::rebuild::{RebuildTicket, RebuildTracker};
use crate::transfer_list::TransferList;
use crate::types::ProxyRequest;

#[derive(Debug, Default)]
pub struct ProxyForm {
    list: TransferList,
    tracker: RebuildTracker,
    seen_revision: Option<u64>,
    in_flight: Option<RebuildTicket>,
    calldata: Option<String>,
    error: Option<String>,
}

impl ProxyForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn list(&self) -> &TransferList {
        &self.list
    }

    pub fn list_mut(&mut self) -> &mut TransferList {
        &mut self.list
    }

    pub fn calldata(&self) -> Option<&str> {
        self.calldata.as_deref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_building(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Force a rebuild on the next poll, e.g. after switching networks.
    pub fn invalidate(&mut self) {
        self.seen_revision = None;
    }

    /// Check for list changes since the last poll.
    ///
    /// Returns the request to build when something changed and the request is
    /// complete. An incomplete request only clears the previous output.
    pub fn poll_rebuild(&mut self) -> Option<(RebuildTicket, ProxyRequest)> {
        let revision = self.list.revision();
        if self.seen_revision == Some(revision) {
            return None;
        }
        self.seen_revision = Some(revision);
        self.calldata = None;
        self.error = None;

        let request = self.list.request();
        if !request.is_ready() {
            self.tracker.invalidate();
            self.in_flight = None;
            return None;
        }

        let ticket = self.tracker.begin();
        self.in_flight = Some(ticket);
        tracing::debug!("Starting rebuild #{}", ticket.generation());
        Some((ticket, request))
    }

    /// Apply a finished rebuild. Returns false when the result was stale and dropped.
    pub fn complete(&mut self, ticket: RebuildTicket, result: Result<String, String>) -> bool {
        if !self.tracker.is_current(ticket) {
            tracing::debug!("Discarding stale rebuild #{}", ticket.generation());
            return false;
        }
        self.in_flight = None;
        match result {
            Ok(calldata) => {
                self.calldata = Some(calldata);
                self.error = None;
            }
            Err(error) => {
                tracing::warn!("Calldata build failed: {}", error);
                self.calldata = None;
                self.error = Some(error);
            }
        }
        true
    }

    /// Replace all rows with the parsed CSV. On error the list is left as it was.
    pub fn import_csv(&mut self, text: &str) -> Result<usize, CsvImportError> {
        let entries = csv_import::parse_transfers(text)?;
        let count = entries.len();
        self.list
            .replace_all(entries)
            .map_err(|_| CsvImportError::NoTransfers)?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TransferField;

    fn ready_form() -> ProxyForm {
        let mut form = ProxyForm::new();
        form.list_mut().set_proxy_account("PROXY");
        form.list_mut().update(1, TransferField::Destination, "AAA");
        form.list_mut().update(1, TransferField::Amount, "10");
        form
    }

    // ==================== poll_rebuild tests ====================

    #[test]
    fn test_incomplete_request_is_silent() {
        let mut form = ProxyForm::new();
        form.list_mut().update(1, TransferField::Destination, "AAA");
        assert!(form.poll_rebuild().is_none());
        assert!(form.error().is_none());
        assert!(form.calldata().is_none());
        assert!(!form.is_building());
    }

    #[test]
    fn test_ready_request_is_emitted_once() {
        let mut form = ready_form();
        let (_, request) = form.poll_rebuild().unwrap();
        assert_eq!(request.proxy_account, "PROXY");
        assert!(form.is_building());
        assert!(form.poll_rebuild().is_none());
    }

    #[test]
    fn test_identical_updates_yield_one_rebuild() {
        let mut form = ready_form();
        form.poll_rebuild();
        form.list_mut().update(1, TransferField::Amount, "20");
        assert!(form.poll_rebuild().is_some());
        form.list_mut().update(1, TransferField::Amount, "20");
        assert!(form.poll_rebuild().is_none());
    }

    #[test]
    fn test_change_clears_previous_output() {
        let mut form = ready_form();
        let (ticket, _) = form.poll_rebuild().unwrap();
        form.complete(ticket, Ok("0xabcd".to_string()));
        assert_eq!(form.calldata(), Some("0xabcd"));

        form.list_mut().add();
        assert!(form.poll_rebuild().is_none());
        assert!(form.calldata().is_none());
    }

    #[test]
    fn test_invalidate_forces_rebuild() {
        let mut form = ready_form();
        form.poll_rebuild();
        assert!(form.poll_rebuild().is_none());
        form.invalidate();
        assert!(form.poll_rebuild().is_some());
    }

    // ==================== complete tests ====================

    #[test]
    fn test_stale_result_is_discarded() {
        let mut form = ready_form();
        let (old, _) = form.poll_rebuild().unwrap();
        form.list_mut().update(1, TransferField::Amount, "11");
        let (new, _) = form.poll_rebuild().unwrap();

        assert!(form.complete(new, Ok("0x02".to_string())));
        assert!(!form.complete(old, Ok("0x01".to_string())));
        assert_eq!(form.calldata(), Some("0x02"));
    }

    #[test]
    fn test_result_after_incomplete_edit_is_discarded() {
        let mut form = ready_form();
        let (ticket, _) = form.poll_rebuild().unwrap();
        form.list_mut().update(1, TransferField::Amount, "");
        assert!(form.poll_rebuild().is_none());
        assert!(!form.complete(ticket, Ok("0x01".to_string())));
        assert!(form.calldata().is_none());
    }

    #[test]
    fn test_error_clears_calldata() {
        let mut form = ready_form();
        let (ticket, _) = form.poll_rebuild().unwrap();
        form.complete(ticket, Ok("0x01".to_string()));
        form.invalidate();
        let (ticket, _) = form.poll_rebuild().unwrap();
        form.complete(ticket, Err("Failed to connect".to_string()));
        assert!(form.calldata().is_none());
        assert_eq!(form.error(), Some("Failed to connect"));
        assert!(!form.is_building());
    }

    // ==================== import_csv tests ====================

    #[test]
    fn test_import_replaces_rows() {
        let mut form = ready_form();
        let count = form.import_csv("address,amount\nAAA,10\nBBB,20").unwrap();
        assert_eq!(count, 2);
        let ids: Vec<u64> = form.list().entries().iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![1, 2]);
        assert_eq!(form.list().proxy_account(), "PROXY");
    }

    #[test]
    fn test_failed_import_leaves_list_unchanged() {
        let mut form = ready_form();
        form.list_mut().add();
        let before = form.list().entries().to_vec();
        let revision = form.list().revision();

        let err = form.import_csv("AAA,10\nBBB,notanumber").unwrap_err();
        assert!(matches!(err, CsvImportError::InvalidAmount { line: 2, .. }));
        assert_eq!(form.list().entries(), &before[..]);
        assert_eq!(form.list().revision(), revision);
    }
}
