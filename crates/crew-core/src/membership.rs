//! Membership admission.

use tracing::info;

use crew_history::{HistoryAction, HistoryEntry, HistoryRecorder};
use crew_storage::{JoinCode, Principal, Project, Store};

use crate::engine::Engine;
use crate::error::EngineError;

impl<B> Engine<B>
where
    B: Store + HistoryRecorder,
{
    /// Admit the principal into the project holding `join_code`.
    ///
    /// The admission itself is one atomic conditional mutation at the
    /// store: the membership and capacity predicates are evaluated
    /// against the record at commit time, so two concurrent joins can
    /// never both squeeze past the team-size cap. A rejected admission is
    /// reported, not retried.
    pub async fn join_project(
        &self,
        principal: &Principal,
        join_code: &str,
    ) -> Result<Project, EngineError> {
        let join_code = join_code.trim();
        if join_code.is_empty() {
            return Err(EngineError::Validation("join code is required".into()));
        }
        // Codes are opaque to callers; anything that cannot be a code
        // cannot name a project.
        let code: JoinCode = match join_code.parse() {
            Ok(code) => code,
            Err(_) => return Err(EngineError::NotFound),
        };

        let project = self.store.add_member(&code, &principal.id).await?;
        info!(project = %project.id, principal = %principal.id, "member admitted");

        self.record_history(HistoryEntry::new(
            &principal.id,
            HistoryAction::ProjectJoin,
            format!("Joined project: {}", project.name),
        ))
        .await;

        Ok(project)
    }
}
