//! Project types.

use chrono::{DateTime, Utc};

use super::{FileRef, JoinCode, PrincipalId, ProjectId, Task};

/// Project record.
///
/// `members` is duplicate-free and ordered by join time; the owner is
/// always `members[0]`. `members.len() <= team_size` holds at all times,
/// including under concurrent admission.
#[derive(Clone, Debug)]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    pub description: String,
    pub team_size: u32,
    pub join_code: JoinCode,
    pub owner_id: PrincipalId,
    pub members: Vec<PrincipalId>,
    pub files: Vec<FileRef>,
    pub tasks: Vec<Task>,
    pub created_at: DateTime<Utc>,
}

/// Parameters for creating a project.
///
/// The owner becomes the first member; the join code must be freshly
/// drawn by the caller and is reserved by the store on success.
#[derive(Clone, Debug)]
pub struct CreateProjectParams {
    pub name: String,
    pub description: String,
    pub team_size: u32,
    pub join_code: JoinCode,
    pub owner_id: PrincipalId,
    pub files: Vec<FileRef>,
}
