//! Administrator authorization gate.
//!
//! Evaluated before every command — mutations and listings alike get one
//! uniform policy.

/// Whether `sender_id` may issue commands. An empty admin set is open mode:
/// everyone is authorized.
pub(super) fn is_authorized(admins: &[String], sender_id: &str) -> bool {
    admins.is_empty() || admins.iter().any(|a| a == sender_id)
}
