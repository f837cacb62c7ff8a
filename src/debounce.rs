//! Debounced text input.
//!
//! The draft follows every keystroke so the widget echoes immediately, while
//! the model only sees the value once typing has paused for `delay`. Time is
//! passed in by the caller (the GUI hands in the frame's `Instant`), which
//! keeps the buffer deterministic under test.

use std::time::{Duration, Instant};

/// Default quiet period before a draft is committed.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

#[derive(Debug, Clone)]
pub struct DebouncedInput {
    draft: String,
    committed: String,
    last_edit: Option<Instant>,
    delay: Duration,
}

impl DebouncedInput {
    pub fn new(initial: impl Into<String>, delay: Duration) -> Self {
        let initial = initial.into();
        Self {
            draft: initial.clone(),
            committed: initial,
            last_edit: None,
            delay,
        }
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    /// Mutable draft for the text widget. Call [`Self::mark_edited`] when it changes.
    pub fn draft_mut(&mut self) -> &mut String {
        &mut self.draft
    }

    /// Record a keystroke; restarts the quiet period.
    pub fn mark_edited(&mut self, now: Instant) {
        self.last_edit = Some(now);
    }

    /// Replace the draft as if typed.
    pub fn edit(&mut self, value: impl Into<String>, now: Instant) {
        self.draft = value.into();
        self.mark_edited(now);
    }

    pub fn is_pending(&self) -> bool {
        self.last_edit.is_some()
    }

    /// Remaining quiet time before a pending draft is committed.
    pub fn time_until_commit(&self, now: Instant) -> Option<Duration> {
        self.last_edit
            .map(|at| self.delay.saturating_sub(now.saturating_duration_since(at)))
    }

    /// Commit the draft once the quiet period has elapsed.
    ///
    /// Returns the value to write into the model, or `None` if the quiet period
    /// is still running or the draft equals the last committed value.
    pub fn poll(&mut self, now: Instant) -> Option<String> {
        let at = self.last_edit?;
        if now.saturating_duration_since(at) < self.delay {
            return None;
        }
        self.last_edit = None;
        if self.draft == self.committed {
            return None;
        }
        self.committed = self.draft.clone();
        Some(self.committed.clone())
    }

    /// Follow a model value that changed for some other reason (CSV import, clear).
    ///
    /// A value equal to our own last commit is ignored so an in-progress draft
    /// is not clobbered by its own echo.
    pub fn sync_external(&mut self, value: &str) {
        if self.committed == value {
            return;
        }
        tracing::trace!("Resynchronizing draft to external value");
        self.committed = value.to_string();
        self.draft = value.to_string();
        self.last_edit = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DELAY: Duration = Duration::from_millis(300);

    #[test]
    fn test_draft_echoes_immediately() {
        let start = Instant::now();
        let mut input = DebouncedInput::new("", DELAY);
        input.edit("A", start);
        assert_eq!(input.draft(), "A");
        assert!(input.is_pending());
    }

    #[test]
    fn test_commit_waits_for_quiet_period() {
        let start = Instant::now();
        let mut input = DebouncedInput::new("", DELAY);
        input.edit("AB", start);
        assert_eq!(input.poll(start + Duration::from_millis(100)), None);
        assert_eq!(input.poll(start + DELAY), Some("AB".to_string()));
        assert!(!input.is_pending());
    }

    #[test]
    fn test_keystrokes_restart_quiet_period() {
        let start = Instant::now();
        let mut input = DebouncedInput::new("", DELAY);
        input.edit("A", start);
        input.edit("AB", start + Duration::from_millis(200));
        assert_eq!(input.poll(start + Duration::from_millis(400)), None);
        assert_eq!(
            input.poll(start + Duration::from_millis(500)),
            Some("AB".to_string())
        );
    }

    #[test]
    fn test_commit_equal_to_previous_is_noop() {
        let start = Instant::now();
        let mut input = DebouncedInput::new("10", DELAY);
        input.edit("1", start);
        input.edit("10", start + Duration::from_millis(10));
        assert_eq!(input.poll(start + Duration::from_secs(1)), None);
        assert!(!input.is_pending());
    }

    #[test]
    fn test_sync_external_overwrites_draft() {
        let start = Instant::now();
        let mut input = DebouncedInput::new("old", DELAY);
        input.edit("typing", start);
        input.sync_external("from csv");
        assert_eq!(input.draft(), "from csv");
        assert!(!input.is_pending());
        assert_eq!(input.poll(start + Duration::from_secs(1)), None);
    }

    #[test]
    fn test_sync_external_ignores_own_commit() {
        let start = Instant::now();
        let mut input = DebouncedInput::new("", DELAY);
        input.edit("AAA", start);
        assert_eq!(input.poll(start + DELAY), Some("AAA".to_string()));
        input.edit("AAAB", start + DELAY);
        input.sync_external("AAA");
        assert_eq!(input.draft(), "AAAB");
        assert!(input.is_pending());
    }

    #[test]
    fn test_time_until_commit() {
        let start = Instant::now();
        let mut input = DebouncedInput::new("", DELAY);
        assert_eq!(input.time_until_commit(start), None);
        input.edit("A", start);
        assert_eq!(
            input.time_until_commit(start + Duration::from_millis(100)),
            Some(Duration::from_millis(200))
        );
        assert_eq!(
            input.time_until_commit(start + Duration::from_secs(2)),
            Some(Duration::ZERO)
        );
    }
}
