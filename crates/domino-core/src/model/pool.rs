use crate::model::party::Party;
use crate::model::tile::{Pip, Tile};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

/// The full set of tiles for a double-N game, before anything is dealt.
#[derive(Debug, Clone)]
pub struct Pool {
    max_pip: Pip,
    tiles: Vec<Tile>,
}

impl Pool {
    pub fn double_six() -> Self {
        Self::with_max_pip(6)
    }

    pub fn with_max_pip(max_pip: Pip) -> Self {
        let n = max_pip as usize + 1;
        let mut tiles = Vec::with_capacity(n * (n + 1) / 2);
        for low in 0..=max_pip {
            for high in low..=max_pip {
                tiles.push(Tile::new(low, high));
            }
        }
        Self { max_pip, tiles }
    }

    pub fn shuffled<R: rand::Rng + ?Sized>(max_pip: Pip, rng: &mut R) -> Self {
        let mut pool = Self::with_max_pip(max_pip);
        pool.tiles.shuffle(rng);
        pool
    }

    pub fn shuffled_with_seed(max_pip: Pip, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        Self::shuffled(max_pip, &mut rng)
    }

    pub fn max_pip(&self) -> Pip {
        self.max_pip
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Deals `hand_size` tiles to each party in turn, from the front of the pool.
    /// Whatever is left over stays undealt and is not returned.
    pub fn deal(&self, hand_size: usize, parties: &[Party]) -> Vec<(Party, Vec<Tile>)> {
        let mut hands: Vec<(Party, Vec<Tile>)> = parties
            .iter()
            .map(|&party| (party, Vec::with_capacity(hand_size)))
            .collect();
        if parties.is_empty() {
            return hands;
        }
        let dealt = (hand_size * parties.len()).min(self.tiles.len());
        for (index, tile) in self.tiles[..dealt].iter().enumerate() {
            hands[index % parties.len()].1.push(*tile);
        }
        hands
    }
}
