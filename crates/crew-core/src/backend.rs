//! StoreBackend abstracts over the SQLite and in-memory implementations.

use std::sync::Arc;

use crew_history::{HistoryEntry, HistoryError, HistoryRecorder};
use crew_storage::{
    CreateProjectParams, JoinCode, PrincipalId, Project, ProjectId, Store, StoreError, Task,
    TaskDraft,
};
use crew_store_memory::MemoryStore;
use crew_store_sqlite::SqliteStore;

use crate::config::EngineConfig;
use crate::engine::Engine;

/// Backend selected at startup from the database URL.
#[derive(Clone)]
pub enum StoreBackend {
    Sqlite(Arc<SqliteStore>),
    Memory(Arc<MemoryStore>),
}

impl StoreBackend {
    /// Open the backend named by `database_url`: `sqlite://…` /
    /// `sqlite::memory:` for SQLite, `memory:` for the in-process store.
    pub async fn open(database_url: &str) -> Result<Self, StoreError> {
        if database_url == "memory:" {
            Ok(StoreBackend::Memory(Arc::new(MemoryStore::new())))
        } else if database_url.starts_with("sqlite:") {
            Ok(StoreBackend::Sqlite(Arc::new(
                SqliteStore::open(database_url).await?,
            )))
        } else {
            Err(StoreError::Backend(format!(
                "unsupported database url: {}",
                database_url
            )))
        }
    }
}

impl Engine<StoreBackend> {
    /// Engine wired from configuration.
    pub async fn connect(config: &EngineConfig) -> Result<Self, StoreError> {
        let backend = StoreBackend::open(&config.database_url).await?;
        Ok(Engine::new(backend).with_join_code_attempts(config.join_code_attempts))
    }
}

#[async_trait::async_trait]
impl Store for StoreBackend {
    async fn create_project(&self, params: &CreateProjectParams) -> Result<Project, StoreError> {
        match self {
            StoreBackend::Sqlite(s) => s.create_project(params).await,
            StoreBackend::Memory(s) => s.create_project(params).await,
        }
    }

    async fn get_project(&self, project_id: &ProjectId) -> Result<Project, StoreError> {
        match self {
            StoreBackend::Sqlite(s) => s.get_project(project_id).await,
            StoreBackend::Memory(s) => s.get_project(project_id).await,
        }
    }

    async fn list_projects_for(
        &self,
        principal_id: &PrincipalId,
    ) -> Result<Vec<Project>, StoreError> {
        match self {
            StoreBackend::Sqlite(s) => s.list_projects_for(principal_id).await,
            StoreBackend::Memory(s) => s.list_projects_for(principal_id).await,
        }
    }

    async fn add_member(
        &self,
        code: &JoinCode,
        principal_id: &PrincipalId,
    ) -> Result<Project, StoreError> {
        match self {
            StoreBackend::Sqlite(s) => s.add_member(code, principal_id).await,
            StoreBackend::Memory(s) => s.add_member(code, principal_id).await,
        }
    }

    async fn append_task(
        &self,
        project_id: &ProjectId,
        draft: &TaskDraft,
    ) -> Result<Task, StoreError> {
        match self {
            StoreBackend::Sqlite(s) => s.append_task(project_id, draft).await,
            StoreBackend::Memory(s) => s.append_task(project_id, draft).await,
        }
    }

    async fn delete_project(
        &self,
        project_id: &ProjectId,
        owner_id: &PrincipalId,
    ) -> Result<Project, StoreError> {
        match self {
            StoreBackend::Sqlite(s) => s.delete_project(project_id, owner_id).await,
            StoreBackend::Memory(s) => s.delete_project(project_id, owner_id).await,
        }
    }
}

#[async_trait::async_trait]
impl HistoryRecorder for StoreBackend {
    async fn record(&self, entry: HistoryEntry) -> Result<(), HistoryError> {
        match self {
            StoreBackend::Sqlite(s) => s.record(entry).await,
            StoreBackend::Memory(s) => s.record(entry).await,
        }
    }

    async fn history_for(
        &self,
        principal_id: &PrincipalId,
    ) -> Result<Vec<HistoryEntry>, HistoryError> {
        match self {
            StoreBackend::Sqlite(s) => s.history_for(principal_id).await,
            StoreBackend::Memory(s) => s.history_for(principal_id).await,
        }
    }
}
