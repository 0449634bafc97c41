//! Slug ids: 22 character URL-safe task identifiers.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use uuid::Uuid;

/// Generate a fresh task id from a random v4 UUID.
///
/// The high bit of the first byte is cleared so ids never start with `-`.
pub fn slugid() -> String {
    let mut bytes = *Uuid::new_v4().as_bytes();
    bytes[0] &= 0x7f;
    URL_SAFE_NO_PAD.encode(bytes)
}
