//! Caller-owned belief state fed by game events.

use super::cache::EstimateKey;
use crate::combin::Subpartition;
use crate::inference::{CancelFlag, Estimate, EstimateError, ProbabilityEstimator};
use crate::model::hands::HandTargets;
use crate::model::item::Item;
use crate::model::party::Party;
use crate::zone::{ShrinkOutcome, ZoneError, ZonePartition, ZoneSnapshot};
use num_rational::BigRational;

/// An event reported by the game driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BeliefUpdate<T: Item> {
    /// `party` holds no item bearing `attribute`.
    StructuralReveal { party: Party, attribute: T::Attribute },
    /// `item` left circulation: played, or its owner is known.
    ItemSettled(T),
    HandSizeChanged { party: Party, size: usize },
}

/// Zone partition plus hand targets for one table, from one observer's view.
///
/// Updates need `&mut self` and estimation only `&self`, so an estimation pass
/// can never overlap a structural change.
#[derive(Debug, Clone)]
pub struct Belief<T: Item> {
    partition: ZonePartition<T>,
    hands: HandTargets,
}

impl<T: Item> Belief<T> {
    /// Every party starts able to hold every item, each with `hand_size` items.
    pub fn new<I>(items: I, parties: &[Party], hand_size: usize) -> Result<Self, ZoneError>
    where
        I: IntoIterator<Item = T>,
    {
        Self::with_targets(items, parties, HandTargets::uniform(parties, hand_size))
    }

    pub fn with_targets<I>(items: I, parties: &[Party], hands: HandTargets) -> Result<Self, ZoneError>
    where
        I: IntoIterator<Item = T>,
    {
        let mut partition = ZonePartition::new();
        partition.initialize(items, parties)?;
        Ok(Self { partition, hands })
    }

    pub fn partition(&self) -> &ZonePartition<T> {
        &self.partition
    }

    pub fn hands(&self) -> &HandTargets {
        &self.hands
    }

    pub fn apply(&mut self, update: BeliefUpdate<T>) -> Result<(), ZoneError> {
        match update {
            BeliefUpdate::StructuralReveal { party, attribute } => {
                self.partition
                    .shrink(|item| item.has_attribute(attribute), party);
            }
            BeliefUpdate::ItemSettled(item) => {
                self.partition.remove(item)?;
            }
            BeliefUpdate::HandSizeChanged { party, size } => self.hands.set(party, size),
        }
        Ok(())
    }

    /// Rules `party` out of every live item matching `matches`.
    pub fn on_structural_reveal<F>(&mut self, matches: F, party: Party) -> ShrinkOutcome<T>
    where
        F: Fn(&T) -> bool,
    {
        self.partition.shrink(matches, party)
    }

    /// `party` played `item` from its hidden hand.
    pub fn on_item_played(&mut self, party: Party, item: T) -> Result<(), ZoneError> {
        self.partition.remove(item)?;
        self.hands.decrement(party);
        Ok(())
    }

    pub fn snapshot(&self) -> ZoneSnapshot<T> {
        self.partition.snapshot()
    }

    /// Key identifying the current state for [`EstimateCache`](super::EstimateCache).
    pub fn cache_key(&self) -> EstimateKey<T> {
        EstimateKey::new(self.snapshot(), self.hands.clone())
    }

    pub fn estimate(&self) -> Result<Estimate<T>, EstimateError> {
        let snapshot = self.snapshot();
        ProbabilityEstimator::new(&snapshot, &self.hands).run()
    }

    pub fn estimate_with_cancel(&self, cancel: CancelFlag) -> Result<Estimate<T>, EstimateError> {
        let snapshot = self.snapshot();
        ProbabilityEstimator::new(&snapshot, &self.hands)
            .with_cancel(cancel)
            .run()
    }

    pub fn probability_of_attribute(
        &self,
        party: Party,
        attribute: T::Attribute,
    ) -> Result<BigRational, EstimateError> {
        self.estimate()?.probability_of_attribute(party, attribute)
    }

    pub fn ranked_hand_compositions(
        &self,
        party: Party,
    ) -> Result<Vec<(Subpartition, BigRational)>, EstimateError> {
        Ok(self.estimate()?.ranked_hand_compositions(party)?.to_vec())
    }
}
