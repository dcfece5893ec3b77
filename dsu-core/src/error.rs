// Registry error types.

use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RegistryError {
    /// Every slot is occupied and none is stale enough to reclaim.
    CapacityExceeded,
    /// The slot has no occupant.
    SlotVacant(u8),
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CapacityExceeded => {
                write!(f, "no available slots (max {})", crate::MAX_SLOTS)
            }
            Self::SlotVacant(slot) => write!(f, "slot {} has no occupant", slot),
        }
    }
}

impl std::error::Error for RegistryError {}
