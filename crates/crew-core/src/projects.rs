//! Project operations: create, list, delete.

use tracing::info;

use crew_history::{HistoryAction, HistoryEntry, HistoryRecorder};
use crew_storage::{
    CreateProjectParams, FileRef, Principal, Project, ProjectId, Store, StoreError,
};

use crate::engine::Engine;
use crate::error::EngineError;
use crate::join_code;

/// Input for creating a project.
#[derive(Clone, Debug)]
pub struct NewProject {
    pub name: String,
    pub description: String,
    pub team_size: u32,
    pub files: Vec<FileRef>,
}

impl<B> Engine<B>
where
    B: Store + HistoryRecorder,
{
    /// Create a project owned by `principal`, who becomes its first
    /// member. Draws join codes until the store accepts one under the
    /// global uniqueness key, bounded by the configured attempt count.
    pub async fn create_project(
        &self,
        principal: &Principal,
        input: NewProject,
    ) -> Result<Project, EngineError> {
        let name = input.name.trim();
        if name.is_empty() {
            return Err(EngineError::Validation("name is required".into()));
        }
        let description = input.description.trim();
        if description.is_empty() {
            return Err(EngineError::Validation("description is required".into()));
        }
        if input.team_size == 0 {
            return Err(EngineError::Validation(
                "team size must be a positive number".into(),
            ));
        }
        if input.files.is_empty() {
            return Err(EngineError::Validation("at least one file is required".into()));
        }

        for _ in 0..self.join_code_attempts {
            let params = CreateProjectParams {
                name: name.to_string(),
                description: description.to_string(),
                team_size: input.team_size,
                join_code: join_code::draw(&mut rand::rng()),
                owner_id: principal.id.clone(),
                files: input.files.clone(),
            };

            match self.store.create_project(&params).await {
                Ok(project) => {
                    info!(project = %project.id, code = %project.join_code, "project created");
                    self.record_history(HistoryEntry::new(
                        &principal.id,
                        HistoryAction::ProjectCreate,
                        format!("Created project: {}", project.name),
                    ))
                    .await;
                    return Ok(project);
                }
                // Another project holds this code; redraw.
                Err(StoreError::JoinCodeTaken) => continue,
                Err(other) => return Err(other.into()),
            }
        }

        Err(EngineError::JoinCodesExhausted)
    }

    /// All projects the principal is a member of.
    pub async fn list_projects(&self, principal: &Principal) -> Result<Vec<Project>, EngineError> {
        Ok(self.store.list_projects_for(&principal.id).await?)
    }

    /// Hard-delete a project. The delete is conditional on ownership
    /// inside the store mutation; a non-owner learns nothing beyond
    /// "not found". The project's join code stays retired forever.
    pub async fn delete_project(
        &self,
        principal: &Principal,
        project_id: &ProjectId,
    ) -> Result<(), EngineError> {
        let project = self.store.delete_project(project_id, &principal.id).await?;
        info!(project = %project.id, "project deleted");

        self.record_history(HistoryEntry::new(
            &principal.id,
            HistoryAction::ProjectDelete,
            format!("Deleted project: {}", project.name),
        ))
        .await;

        Ok(())
    }
}
