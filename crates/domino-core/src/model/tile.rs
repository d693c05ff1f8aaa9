use crate::model::item::Item;
use core::fmt;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

pub type Pip = u8;

/// A domino. Stored with `low <= high` so that `[2|5]` and `[5|2]` are the same tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Tile {
    low: Pip,
    high: Pip,
}

impl Tile {
    pub const fn new(a: Pip, b: Pip) -> Self {
        if a <= b {
            Self { low: a, high: b }
        } else {
            Self { low: b, high: a }
        }
    }

    pub const fn low(self) -> Pip {
        self.low
    }

    pub const fn high(self) -> Pip {
        self.high
    }

    pub const fn has(self, pip: Pip) -> bool {
        self.low == pip || self.high == pip
    }

    pub const fn is_double(self) -> bool {
        self.low == self.high
    }

    pub const fn pip_total(self) -> u16 {
        self.low as u16 + self.high as u16
    }

    /// The pip on the far side of `pip`, if the tile carries it.
    pub const fn other_end(self, pip: Pip) -> Option<Pip> {
        if self.low == pip {
            Some(self.high)
        } else if self.high == pip {
            Some(self.low)
        } else {
            None
        }
    }

    /// Position of the tile in the canonical ordering of a double-N set:
    /// `[0|0], [0|1], ..., [0|N], [1|1], ...`.
    pub fn to_id(self, max_pip: Pip) -> Option<usize> {
        if self.high > max_pip {
            return None;
        }
        let n = max_pip as usize + 1;
        let low = self.low as usize;
        let before = low * n - (low * low.saturating_sub(1)) / 2;
        Some(before + (self.high as usize - low))
    }
}

impl Item for Tile {
    type Attribute = Pip;

    fn attributes(&self) -> impl Iterator<Item = Pip> {
        let second = if self.is_double() { None } else { Some(self.high) };
        std::iter::once(self.low).chain(second)
    }

    fn has_attribute(&self, attribute: Pip) -> bool {
        self.has(attribute)
    }
}

impl fmt::Display for Tile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}|{}]", self.low, self.high)
    }
}

impl Serialize for Tile {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        [self.low, self.high].serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Tile {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let [a, b] = <[Pip; 2]>::deserialize(deserializer)?;
        Ok(Tile::new(a, b))
    }
}
