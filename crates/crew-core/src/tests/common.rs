//! Shared helpers for engine tests.

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crew_history::{HistoryEntry, HistoryError, HistoryRecorder};
use crew_storage::{
    CreateProjectParams, FileRef, JoinCode, Principal, PrincipalId, Project, ProjectId, Store,
    StoreError, Task, TaskDraft,
};
use crew_store_memory::MemoryStore;
use crew_store_sqlite::SqliteStore;

use crate::backend::StoreBackend;
use crate::engine::Engine;
use crate::projects::NewProject;

pub fn memory_engine() -> Engine<StoreBackend> {
    Engine::new(StoreBackend::Memory(Arc::new(MemoryStore::new())))
}

pub async fn sqlite_engine() -> Engine<StoreBackend> {
    let store = Arc::new(SqliteStore::open_in_memory().await.unwrap());
    Engine::new(StoreBackend::Sqlite(store))
}

/// Both real backends, for properties that must hold regardless of store.
pub async fn engines() -> Vec<Engine<StoreBackend>> {
    vec![memory_engine(), sqlite_engine().await]
}

pub fn test_principal(username: &str) -> Principal {
    Principal {
        id: PrincipalId(Uuid::new_v4()),
        username: username.to_string(),
        email: format!("{}@example.com", username),
    }
}

pub fn new_project(name: &str, team_size: u32) -> NewProject {
    NewProject {
        name: name.to_string(),
        description: "a test project".to_string(),
        team_size,
        files: vec![FileRef {
            name: "brief.pdf".to_string(),
            size: 2048,
            content_type: "application/pdf".to_string(),
            path: "uploads/brief.pdf".to_string(),
        }],
    }
}

/// What a well-behaved store returns for a create call.
pub fn project_from(params: &CreateProjectParams) -> Project {
    Project {
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
    }
}

mockall::mock! {
    pub Backend {}

    #[async_trait::async_trait]
    impl Store for Backend {
        async fn create_project(
            &self,
            params: &CreateProjectParams,
        ) -> Result<Project, StoreError>;
        async fn get_project(&self, project_id: &ProjectId) -> Result<Project, StoreError>;
        async fn list_projects_for(
            &self,
            principal_id: &PrincipalId,
        ) -> Result<Vec<Project>, StoreError>;
        async fn add_member(
            &self,
            code: &JoinCode,
            principal_id: &PrincipalId,
        ) -> Result<Project, StoreError>;
        async fn append_task(
            &self,
            project_id: &ProjectId,
            draft: &TaskDraft,
        ) -> Result<Task, StoreError>;
        async fn delete_project(
            &self,
            project_id: &ProjectId,
            owner_id: &PrincipalId,
        ) -> Result<Project, StoreError>;
    }

    #[async_trait::async_trait]
    impl HistoryRecorder for Backend {
        async fn record(&self, entry: HistoryEntry) -> Result<(), HistoryError>;
        async fn history_for(
            &self,
            principal_id: &PrincipalId,
        ) -> Result<Vec<HistoryEntry>, HistoryError>;
    }
}
