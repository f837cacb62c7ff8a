//! Generation tokens for calldata rebuilds.
//!
//! Rebuilds run as independent background jobs and can finish out of order.
//! Each one carries the ticket it was started with, and only a result whose
//! ticket is still current is allowed to reach the display.

/// Identifies one rebuild attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RebuildTicket(u64);

impl RebuildTicket {
    pub fn generation(&self) -> u64 {
        self.0
    }
}

#[derive(Debug, Default)]
pub struct RebuildTracker {
    generation: u64,
}

impl RebuildTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new attempt, superseding every earlier ticket.
    pub fn begin(&mut self) -> RebuildTicket {
        self.generation += 1;
        RebuildTicket(self.generation)
    }

    /// Supersede outstanding tickets without starting a new attempt.
    pub fn invalidate(&mut self) {
        self.generation += 1;
    }

    pub fn is_current(&self, ticket: RebuildTicket) -> bool {
        ticket.0 == self.generation
    }
}
