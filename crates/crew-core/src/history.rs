//! User-visible history.

use tracing::info;

use crew_history::{HistoryAction, HistoryEntry, HistoryRecorder};
use crew_storage::{Principal, Store};

use crate::engine::Engine;
use crate::error::EngineError;

impl<B> Engine<B>
where
    B: Store + HistoryRecorder,
{
    /// The principal's own history, oldest first.
    pub async fn history(&self, principal: &Principal) -> Result<Vec<HistoryEntry>, EngineError> {
        Ok(self.store.history_for(&principal.id).await?)
    }

    /// Accept a support query: log it and leave a history trace.
    /// Delivery is handled elsewhere.
    pub async fn submit_support_query(
        &self,
        principal: &Principal,
        query: &str,
    ) -> Result<(), EngineError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(EngineError::Validation("support query is required".into()));
        }

        info!(principal = %principal.id, username = %principal.username, "support query received");

        self.record_history(HistoryEntry::new(
            &principal.id,
            HistoryAction::SupportQuery,
            format!("Submitted support query: {}", query),
        ))
        .await;

        Ok(())
    }
}
