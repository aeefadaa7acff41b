use thiserror::Error;

use crew_history::HistoryError;
use crew_storage::StoreError;

/// Caller-facing engine errors.
///
/// Everything except `Store` and `History` is an expected, terminal,
/// user-visible outcome; the engine never retries a rejected conditional
/// write (the caller may retry the whole operation, which re-evaluates
/// the predicate fresh).
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Forbidden(&'static str),
    #[error("project not found")]
    NotFound,
    #[error("already a member of this project")]
    AlreadyMember,
    #[error("team size limit reached")]
    CapacityReached,
    #[error("could not allocate an unused join code")]
    JoinCodesExhausted,
    #[error("history error: {0}")]
    History(#[from] HistoryError),
    #[error("storage error: {0}")]
    Store(StoreError),
}

impl From<StoreError> for EngineError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => EngineError::NotFound,
            StoreError::AlreadyMember => EngineError::AlreadyMember,
            StoreError::CapacityReached => EngineError::CapacityReached,
            // JoinCodeTaken is consumed by the allocation loop; reaching
            // here means a backend produced it out of context.
            other => EngineError::Store(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_conflicts_map_to_engine_variants() {
        assert!(matches!(
            EngineError::from(StoreError::NotFound),
            EngineError::NotFound
        ));
        assert!(matches!(
            EngineError::from(StoreError::AlreadyMember),
            EngineError::AlreadyMember
        ));
        assert!(matches!(
            EngineError::from(StoreError::CapacityReached),
            EngineError::CapacityReached
        ));
        assert!(matches!(
            EngineError::from(StoreError::Backend("boom".into())),
            EngineError::Store(_)
        ));
    }
}
