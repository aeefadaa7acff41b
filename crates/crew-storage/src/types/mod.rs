//! Type definitions for crew storage.

mod ids;
mod join_code;
mod principals;
mod projects;
mod tasks;

// Re-export all types from submodules
pub use ids::*;
pub use join_code::*;
pub use principals::*;
pub use projects::*;
pub use tasks::*;
