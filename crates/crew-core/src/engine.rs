use crew_history::{HistoryEntry, HistoryRecorder};
use crew_storage::Store;
use tracing::warn;

use crate::join_code::MAX_JOIN_CODE_ATTEMPTS;

/// The collaboration engine.
///
/// Generic over the backend so tests can substitute mocks; production
/// callers use [`Engine<StoreBackend>`](crate::StoreBackend).
pub struct Engine<B> {
    pub store: B,
    pub(crate) join_code_attempts: u32,
}

impl<B> Engine<B>
where
    B: Store + HistoryRecorder,
{
    pub fn new(store: B) -> Self {
        Self {
            store,
            join_code_attempts: MAX_JOIN_CODE_ATTEMPTS,
        }
    }

    /// Override the join-code retry bound.
    pub fn with_join_code_attempts(mut self, attempts: u32) -> Self {
        self.join_code_attempts = attempts;
        self
    }

    /// Record a history entry. Failures are logged but do not fail the
    /// operation that triggered the entry.
    pub(crate) async fn record_history(&self, entry: HistoryEntry) {
        if let Err(e) = self.store.record(entry).await {
            warn!(error = %e, "failed to record history entry");
        }
    }
}
