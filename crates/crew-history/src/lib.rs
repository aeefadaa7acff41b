//! Per-user audit history abstraction for crew.
//!
//! This crate defines the `HistoryRecorder` trait for persisting
//! user-visible history entries and the types representing the actions
//! that produce them.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crew_storage::PrincipalId;

/// Unique identifier for a history entry
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HistoryEntryId(pub Uuid);

impl HistoryEntryId {
    /// Generate a new entry ID using UUID v7 (time-ordered)
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for HistoryEntryId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for HistoryEntryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for HistoryEntryId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// Categories of actions that leave a history entry
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryAction {
    ProjectCreate,
    ProjectJoin,
    ProjectDelete,
    TaskAdd,
    SupportQuery,
}

impl std::fmt::Display for HistoryAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            HistoryAction::ProjectCreate => "project.create",
            HistoryAction::ProjectJoin => "project.join",
            HistoryAction::ProjectDelete => "project.delete",
            HistoryAction::TaskAdd => "task.add",
            HistoryAction::SupportQuery => "support.query",
        };
        write!(f, "{}", s)
    }
}

impl std::str::FromStr for HistoryAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "project.create" => Ok(HistoryAction::ProjectCreate),
            "project.join" => Ok(HistoryAction::ProjectJoin),
            "project.delete" => Ok(HistoryAction::ProjectDelete),
            "task.add" => Ok(HistoryAction::TaskAdd),
            "support.query" => Ok(HistoryAction::SupportQuery),
            _ => Err(format!("Unknown history action: {}", s)),
        }
    }
}

/// A single append-only history entry, owned by one principal.
///
/// Uses a raw UUID for the principal for serialization compatibility;
/// use [`HistoryEntry::get_principal_id`] for the typed form.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: HistoryEntryId,
    pub principal_id: Uuid,
    pub action: HistoryAction,
    pub text: String,
    pub recorded_at: DateTime<Utc>,
}

impl HistoryEntry {
    pub fn new(principal_id: &PrincipalId, action: HistoryAction, text: impl Into<String>) -> Self {
        Self {
            id: HistoryEntryId::new(),
            principal_id: principal_id.0,
            action,
            text: text.into(),
            recorded_at: Utc::now(),
        }
    }

    /// The owning principal as a typed ID
    pub fn get_principal_id(&self) -> PrincipalId {
        PrincipalId(self.principal_id)
    }
}

/// Error type for history operations
#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("database error: {0}")]
    Database(String),
}

/// Trait for history persistence.
///
/// Implementations append entries and return them per principal. A
/// failure to record an entry must be logged by the caller and must not
/// fail the operation that triggered it; history is an observability
/// side channel, not a correctness dependency. Appends to one
/// principal's history must be atomic so concurrent recordings lose
/// nothing.
#[async_trait]
pub trait HistoryRecorder: Send + Sync {
    /// Append one entry to its principal's history.
    async fn record(&self, entry: HistoryEntry) -> Result<(), HistoryError>;

    /// All entries for a principal, oldest first.
    async fn history_for(
        &self,
        principal_id: &PrincipalId,
    ) -> Result<Vec<HistoryEntry>, HistoryError>;
}
