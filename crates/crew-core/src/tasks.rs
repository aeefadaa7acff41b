//! Task registry: owner-gated task creation.

use chrono::{DateTime, Utc};
use tracing::info;

use crew_history::{HistoryAction, HistoryEntry, HistoryRecorder};
use crew_storage::{Principal, ProjectId, Store, Task, TaskDraft};

use crate::engine::Engine;
use crate::error::EngineError;

/// Input for adding a task. Status is not settable at creation; new
/// tasks always start `pending`.
#[derive(Clone, Debug, Default)]
pub struct TaskInput {
    pub title: String,
    pub description: String,
    pub assigned_to: String,
    pub due_date: Option<DateTime<Utc>>,
}

impl<B> Engine<B>
where
    B: Store + HistoryRecorder,
{
    /// Append a task to the project. Only the project owner may do this;
    /// any other caller gets `Forbidden` and nothing is appended.
    pub async fn add_task(
        &self,
        principal: &Principal,
        project_id: &ProjectId,
        input: TaskInput,
    ) -> Result<Task, EngineError> {
        if input.title.trim().is_empty() {
            return Err(EngineError::Validation("title is required".into()));
        }
        if input.description.trim().is_empty() {
            return Err(EngineError::Validation("description is required".into()));
        }
        if input.assigned_to.trim().is_empty() {
            return Err(EngineError::Validation("assignedTo is required".into()));
        }

        // Ownership never changes after creation, so the gate does not
        // race the append.
        let project = self.store.get_project(project_id).await?;
        if project.owner_id != principal.id {
            return Err(EngineError::Forbidden("only the project owner can add tasks"));
        }

        let draft = TaskDraft {
            title: input.title,
            description: input.description,
            assigned_to: input.assigned_to,
            due_date: input.due_date,
        };
        let task = self.store.append_task(project_id, &draft).await?;
        info!(project = %project.id, task = %task.id, "task added");

        self.record_history(HistoryEntry::new(
            &principal.id,
            HistoryAction::TaskAdd,
            format!("Added task: {} to project: {}", task.title, project.name),
        ))
        .await;

        Ok(task)
    }
}
