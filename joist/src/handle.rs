//! Opaque element identities.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;
use uuid::Uuid;

/// Opaque identity of a rendered element.
///
/// The host creates one per mounted element. The sequence number records
/// creation order and breaks ties between equal document positions.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize)]
pub struct ElementHandle {
    id: Uuid,
    sequence: u64,
}

impl ElementHandle {
    /// Create a new unique handle.
    pub fn new() -> Self {
        static SEQUENCE: AtomicU64 = AtomicU64::new(0);
        Self {
            id: Uuid::new_v4(),
            sequence: SEQUENCE.fetch_add(1, Ordering::SeqCst),
        }
    }

    /// Get the underlying UUID.
    pub fn as_uuid(&self) -> Uuid {
        self.id
    }

    /// Creation sequence, monotonically increasing per process.
    pub fn sequence(&self) -> u64 {
        self.sequence
    }
}

impl Default for ElementHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ElementHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id)
    }
}
