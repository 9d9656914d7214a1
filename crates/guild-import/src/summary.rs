//! Import run summaries.

/// Counters for one reconciliation run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    /// Rows that created a new record.
    pub created: usize,
    /// Rows that updated an existing record.
    pub updated: usize,
    /// Rows (or whole runs) skipped by an idempotence guard.
    pub skipped: usize,
}

impl ImportSummary {
    /// Number of rows that changed anything.
    #[must_use]
    pub fn writes(&self) -> usize {
        self.created + self.updated
    }
}
