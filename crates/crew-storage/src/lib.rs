//! Storage abstraction for crew.
//!
//! Backend crates (e.g., crew-store-sqlite, crew-store-memory) implement the
//! [`Store`] trait so the engine doesn't depend on any specific database
//! engine or schema details.

use thiserror::Error;

mod store;
pub mod types;

pub use store::Store;
pub use types::*;

#[cfg(feature = "test-support")]
pub use store::MockStore;

/// Uniform error type for all storage backends.
///
/// The conflict variants are produced by the conditional mutations only:
/// `JoinCodeTaken` by [`Store::create_project`], `AlreadyMember` and
/// `CapacityReached` by [`Store::add_member`].
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("not found")]
    NotFound,
    #[error("join code already taken")]
    JoinCodeTaken,
    #[error("already a member")]
    AlreadyMember,
    #[error("team capacity reached")]
    CapacityReached,
    #[error("backend error: {0}")]
    Backend(String),
}
