//! Join-code drawing.
//!
//! Codes are drawn at random from the 36^8 keyspace; global uniqueness is
//! the store's unique key over codes, never a read-then-insert here. The
//! retry bound exists as a defensive limit, not an expected path.

use rand::Rng;

use crew_storage::{JoinCode, JOIN_CODE_LEN};

/// Default number of draw attempts before giving up with
/// `JoinCodesExhausted`.
pub(crate) const MAX_JOIN_CODE_ATTEMPTS: u32 = 10;

const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Draw one candidate code.
pub(crate) fn draw<R: Rng>(rng: &mut R) -> JoinCode {
    let code: String = (0..JOIN_CODE_LEN)
        .map(|_| ALPHABET[rng.random_range(0..ALPHABET.len())] as char)
        .collect();
    JoinCode(code)
}
