//! Deterministic appointment identity for idempotent creates.

use uuid::Uuid;

/// ## Summary
/// Derives the appointment id for a `(user, idempotency key)` pair.
///
/// The id is a name-based UUID (SHA-1, version 5) under the fixed OID
/// namespace over the verbatim string
/// `schedula:create_appointment:<user>:<key>`, so the derivation is portable
/// across languages and stable across retries.
#[must_use]
pub fn appointment_id_for_key(user_id: &str, key: &str) -> Uuid {
    let name = format!("schedula:create_appointment:{user_id}:{key}");
    Uuid::new_v5(&Uuid::NAMESPACE_OID, name.as_bytes())
}
