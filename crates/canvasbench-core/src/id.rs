//! Stable pool slot identifiers

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies one entity slot in the pool.
///
/// A slot keeps its id for the lifetime of the pool, so the renderer can key
/// its visual handles by `SlotId` and never see a live entity's handle
/// reassigned when some other entity is retired.
#[derive(Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SlotId(pub u32);

impl SlotId {
    /// Create a SlotId from a raw index
    pub fn from_index(index: usize) -> Self {
        Self(index as u32)
    }

    /// Get the raw value
    pub fn raw(&self) -> u32 {
        self.0
    }

    /// Position of the slot in the pool's backing storage
    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SlotId({})", self.0)
    }
}

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_roundtrip() {
        let id = SlotId::from_index(42);
        assert_eq!(id.raw(), 42);
        assert_eq!(id.index(), 42);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", SlotId(7)), "7");
        assert_eq!(format!("{:?}", SlotId(7)), "SlotId(7)");
    }
}
