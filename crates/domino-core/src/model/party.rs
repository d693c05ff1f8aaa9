use core::fmt;
use serde::{Deserialize, Serialize};

/// Largest number of parties a table may seat; zone keys are 32-bit masks.
pub const MAX_PARTIES: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Party(u8);

impl Party {
    pub const fn new(index: u8) -> Self {
        Self(index)
    }

    pub const fn from_index(index: usize) -> Option<Self> {
        if index < MAX_PARTIES {
            Some(Self(index as u8))
        } else {
            None
        }
    }

    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Seats `0..count`, in order.
    pub fn seats(count: usize) -> Vec<Party> {
        (0..count.min(MAX_PARTIES)).map(|i| Party(i as u8)).collect()
    }
}

impl fmt::Display for Party {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}", self.0)
    }
}
