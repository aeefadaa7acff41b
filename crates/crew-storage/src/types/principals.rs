//! Principal types.

use super::PrincipalId;

/// An authenticated identity supplied by the external identity provider.
///
/// Immutable for the lifetime of a request; the store never persists
/// credentials, only member principal IDs.
#[derive(Clone, Debug)]
pub struct Principal {
    pub id: PrincipalId,
    pub username: String,
    pub email: String,
}
