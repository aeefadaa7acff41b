//! The Store trait that backends implement.

use crate::types::*;
use crate::StoreError;

/// The storage trait the engine depends on.
///
/// Every mutating method is a **single atomic conditional operation**:
/// the predicate over the record's current state and the mutation are
/// evaluated together at commit time, never as an independent read
/// followed by an independent write. Backends must guarantee that two
/// conflicting calls cannot both observe the same pre-commit state and
/// both succeed.
#[cfg_attr(feature = "test-support", mockall::automock)]
#[async_trait::async_trait]
pub trait Store: Send + Sync {
    /// Create a project with its owner as the first member, reserving the
    /// join code under the global uniqueness key.
    ///
    /// Returns `JoinCodeTaken` if another project (live or deleted) ever
    /// held the code; the caller redraws and retries.
    async fn create_project(&self, params: &CreateProjectParams) -> Result<Project, StoreError>;

    /// Get a project by ID.
    async fn get_project(&self, project_id: &ProjectId) -> Result<Project, StoreError>;

    /// List all projects the principal is a member of.
    async fn list_projects_for(
        &self,
        principal_id: &PrincipalId,
    ) -> Result<Vec<Project>, StoreError>;

    /// Admit a principal into the project holding `code`, if and only if
    /// the principal is not already a member AND the member count is below
    /// `team_size`, both evaluated against the record at commit time.
    ///
    /// A rejected admission is not retried. Returns the updated project on
    /// success; `NotFound` for unknown or retired codes, `AlreadyMember`,
    /// or `CapacityReached` otherwise.
    async fn add_member(
        &self,
        code: &JoinCode,
        principal_id: &PrincipalId,
    ) -> Result<Project, StoreError>;

    /// Append a task to the project. Append order is creation order; the
    /// stored status is always `Pending`.
    async fn append_task(
        &self,
        project_id: &ProjectId,
        draft: &TaskDraft,
    ) -> Result<Task, StoreError>;

    /// Hard-delete the project, conditional on `owner_id` matching in the
    /// same mutation. Returns the deleted record. The join code stays
    /// reserved forever.
    async fn delete_project(
        &self,
        project_id: &ProjectId,
        owner_id: &PrincipalId,
    ) -> Result<Project, StoreError>;
}
