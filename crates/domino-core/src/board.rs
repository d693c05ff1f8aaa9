use crate::model::tile::{Pip, Tile};
use core::fmt;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Left,
    Right,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Side::Left => "left",
            Side::Right => "right",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlayError {
    #[error("{tile} does not match the {side} end ({end})")]
    Mismatch { tile: Tile, side: Side, end: Pip },
    #[error("{0} is already on the table")]
    AlreadyPlayed(Tile),
}

/// The chain of tiles on the table and its two open ends.
#[derive(Debug, Clone, Default)]
pub struct LineOfPlay {
    tiles: VecDeque<Tile>,
    ends: Option<(Pip, Pip)>,
}

impl LineOfPlay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tiles(&self) -> impl Iterator<Item = Tile> + '_ {
        self.tiles.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// `(left, right)`, or `None` before the opening tile.
    pub fn open_ends(&self) -> Option<(Pip, Pip)> {
        self.ends
    }

    pub fn end(&self, side: Side) -> Option<Pip> {
        self.ends.map(|(left, right)| match side {
            Side::Left => left,
            Side::Right => right,
        })
    }

    pub fn fits(&self, tile: Tile, side: Side) -> bool {
        self.end(side).is_none_or(|end| tile.has(end))
    }

    /// Places `tile` on `side`. The first tile opens both ends regardless of side.
    /// Returns the new open pip on that side.
    pub fn play(&mut self, tile: Tile, side: Side) -> Result<Pip, PlayError> {
        if self.tiles.contains(&tile) {
            return Err(PlayError::AlreadyPlayed(tile));
        }
        let Some((left, right)) = self.ends else {
            self.tiles.push_back(tile);
            self.ends = Some((tile.low(), tile.high()));
            return Ok(match side {
                Side::Left => tile.low(),
                Side::Right => tile.high(),
            });
        };

        let end = if side == Side::Left { left } else { right };
        let open = tile
            .other_end(end)
            .ok_or(PlayError::Mismatch { tile, side, end })?;
        match side {
            Side::Left => {
                self.tiles.push_front(tile);
                self.ends = Some((open, right));
            }
            Side::Right => {
                self.tiles.push_back(tile);
                self.ends = Some((left, open));
            }
        }
        Ok(open)
    }

    /// Pips a passing party provably holds none of: every open end.
    pub fn pass_reveals(&self) -> Vec<Pip> {
        match self.ends {
            Some((left, right)) if left == right => vec![left],
            Some((left, right)) => vec![left, right],
            None => Vec::new(),
        }
    }
}
