//! In-memory storage backend for crew.
//!
//! This implementation is suitable for:
//! - Development and testing
//! - Single-process deployments that don't need durability
//!
//! Every conditional mutation evaluates its predicate and applies its
//! change under one state lock, which is the in-process rendition of the
//! store's atomic conditional-update contract. The lock is never held
//! across an await.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::Utc;
use uuid::Uuid;

use crew_history::{HistoryEntry, HistoryError, HistoryRecorder};
use crew_storage::{
    CreateProjectParams, JoinCode, PrincipalId, Project, ProjectId, Store, StoreError, Task,
    TaskDraft, TaskId, TaskStatus,
};

#[derive(Default)]
struct State {
    projects: HashMap<ProjectId, Project>,
    /// Code -> project. Entries are never removed, so a deleted project's
    /// code stays reserved and its stale links stay inert.
    join_codes: HashMap<String, ProjectId>,
    history: HashMap<PrincipalId, Vec<HistoryEntry>>,
}

#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, State>, StoreError> {
        self.state
            .lock()
            .map_err(|_| StoreError::Backend("state mutex poisoned".into()))
    }
}

#[async_trait::async_trait]
impl Store for MemoryStore {
    async fn create_project(&self, params: &CreateProjectParams) -> Result<Project, StoreError> {
        let mut state = self.lock()?;

        if state.join_codes.contains_key(&params.join_code.0) {
            return Err(StoreError::JoinCodeTaken);
        }

        let project = Project {
            id: ProjectId(Uuid::now_v7()),
            name: params.name.clone(),
            description: params.description.clone(),
            team_size: params.team_size,
            join_code: params.join_code.clone(),
            owner_id: params.owner_id.clone(),
            members: vec![params.owner_id.clone()],
            files: params.files.clone(),
            tasks: vec![],
            created_at: Utc::now(),
        };

        state
            .join_codes
            .insert(params.join_code.0.clone(), project.id.clone());
        state.projects.insert(project.id.clone(), project.clone());
        Ok(project)
    }

    async fn get_project(&self, project_id: &ProjectId) -> Result<Project, StoreError> {
        let state = self.lock()?;
        state
            .projects
            .get(project_id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn list_projects_for(
        &self,
        principal_id: &PrincipalId,
    ) -> Result<Vec<Project>, StoreError> {
        let state = self.lock()?;
        let mut out: Vec<Project> = state
            .projects
            .values()
            .filter(|p| p.members.contains(principal_id))
            .cloned()
            .collect();
        out.sort_by(|a, b| (a.created_at, a.id.0).cmp(&(b.created_at, b.id.0)));
        Ok(out)
    }

    async fn add_member(
        &self,
        code: &JoinCode,
        principal_id: &PrincipalId,
    ) -> Result<Project, StoreError> {
        let mut state = self.lock()?;

        let project_id = state.join_codes.get(&code.0).cloned().ok_or(StoreError::NotFound)?;
        // A retired code still maps to its deleted project.
        let project = state
            .projects
            .get_mut(&project_id)
            .ok_or(StoreError::NotFound)?;

        if project.members.contains(principal_id) {
            return Err(StoreError::AlreadyMember);
        }
        if project.members.len() >= project.team_size as usize {
            return Err(StoreError::CapacityReached);
        }

        project.members.push(principal_id.clone());
        Ok(project.clone())
    }

    async fn append_task(
        &self,
        project_id: &ProjectId,
        draft: &TaskDraft,
    ) -> Result<Task, StoreError> {
        let mut state = self.lock()?;
        let project = state
            .projects
            .get_mut(project_id)
            .ok_or(StoreError::NotFound)?;

        let task = Task {
            id: TaskId(Uuid::now_v7()),
            title: draft.title.clone(),
            description: draft.description.clone(),
            assigned_to: draft.assigned_to.clone(),
            status: TaskStatus::Pending,
            due_date: draft.due_date,
            created_at: Utc::now(),
        };
        project.tasks.push(task.clone());
        Ok(task)
    }

    async fn delete_project(
        &self,
        project_id: &ProjectId,
        owner_id: &PrincipalId,
    ) -> Result<Project, StoreError> {
        let mut state = self.lock()?;

        match state.projects.get(project_id) {
            Some(project) if &project.owner_id == owner_id => {}
            _ => return Err(StoreError::NotFound),
        }

        // The join_codes entry stays behind on purpose.
        state
            .projects
            .remove(project_id)
            .ok_or(StoreError::NotFound)
    }
}

#[async_trait::async_trait]
impl HistoryRecorder for MemoryStore {
    async fn record(&self, entry: HistoryEntry) -> Result<(), HistoryError> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| HistoryError::Database("state mutex poisoned".into()))?;
        state
            .history
            .entry(entry.get_principal_id())
            .or_default()
            .push(entry);
        Ok(())
    }

    async fn history_for(
        &self,
        principal_id: &PrincipalId,
    ) -> Result<Vec<HistoryEntry>, HistoryError> {
        let state = self
            .state
            .lock()
            .map_err(|_| HistoryError::Database("state mutex poisoned".into()))?;
        Ok(state.history.get(principal_id).cloned().unwrap_or_default())
    }
}
