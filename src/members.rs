//! The module contains the `Member` struct.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A member of a group sharing the pool.
///
/// Members are supplied by the caller and never mutated by the engine; the
/// engine only reads the id (to key contributions and shares) and the display
/// name (for reports).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    /// Stable identifier for this member.
    ///
    /// Generated once by the caller, so the member can be renamed without
    /// breaking references from transactions and expenses.
    pub id: Uuid,
    pub name: String,
}

impl Member {
    pub fn new(name: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
        }
    }

    pub fn with_id(id: Uuid, name: String) -> Self {
        Self { id, name }
    }
}
