use super::EstimateError;
use crate::combin::Subpartition;
use crate::model::item::Item;
use crate::model::party::Party;
use crate::zone::ZoneKey;
use num_bigint::{BigInt, BigUint};
use num_rational::BigRational;
use num_traits::{ToPrimitive, Zero};
use std::collections::BTreeMap;

/// Everything one estimation pass learned about a single party.
#[derive(Debug, Clone, PartialEq)]
pub struct PartyEstimate<A: Ord> {
    pub hand_size: usize,
    /// Probability of holding at least one item bearing each attribute.
    pub attributes: BTreeMap<A, BigRational>,
    /// Expected number of held items bearing each attribute.
    pub expected_counts: BTreeMap<A, BigRational>,
    /// Probability that one particular item from each zone is held.
    pub zone_shares: BTreeMap<ZoneKey, BigRational>,
    /// Hand compositions, most likely first.
    pub compositions: Vec<(Subpartition, BigRational)>,
}

impl<A: Ord> PartyEstimate<A> {
    pub(crate) fn empty(hand_size: usize) -> Self {
        Self {
            hand_size,
            attributes: BTreeMap::new(),
            expected_counts: BTreeMap::new(),
            zone_shares: BTreeMap::new(),
            compositions: Vec::new(),
        }
    }
}

/// Aggregate probability table produced by [`ProbabilityEstimator`](super::ProbabilityEstimator).
///
/// Every value is exact. Convert with [`Estimate::percent`] only for display.
#[derive(Debug, Clone, PartialEq)]
pub struct Estimate<T: Item> {
    pub(crate) total_weight: BigUint,
    pub(crate) branch_count: u64,
    pub(crate) parties: BTreeMap<Party, PartyEstimate<T::Attribute>>,
    pub(crate) item_zones: BTreeMap<T, ZoneKey>,
}

impl<T: Item> Estimate<T> {
    /// Number of assignments consistent with the hand targets.
    pub fn total_weight(&self) -> &BigUint {
        &self.total_weight
    }

    pub fn branch_count(&self) -> u64 {
        self.branch_count
    }

    pub fn parties(&self) -> impl Iterator<Item = Party> + '_ {
        self.parties.keys().copied()
    }

    pub fn party(&self, party: Party) -> Result<&PartyEstimate<T::Attribute>, EstimateError> {
        self.parties
            .get(&party)
            .ok_or(EstimateError::UnknownParty(party))
    }

    pub fn probability_of_attribute(
        &self,
        party: Party,
        attribute: T::Attribute,
    ) -> Result<BigRational, EstimateError> {
        Ok(self
            .party(party)?
            .attributes
            .get(&attribute)
            .cloned()
            .unwrap_or_else(BigRational::zero))
    }

    pub fn expected_attribute_count(
        &self,
        party: Party,
        attribute: T::Attribute,
    ) -> Result<BigRational, EstimateError> {
        Ok(self
            .party(party)?
            .expected_counts
            .get(&attribute)
            .cloned()
            .unwrap_or_else(BigRational::zero))
    }

    /// Probability that `item` is in `party`'s hand. Items no longer live score zero.
    pub fn probability_of_item(&self, party: Party, item: T) -> Result<BigRational, EstimateError> {
        let estimate = self.party(party)?;
        Ok(self
            .item_zones
            .get(&item)
            .and_then(|zone| estimate.zone_shares.get(zone))
            .cloned()
            .unwrap_or_else(BigRational::zero))
    }

    pub fn ranked_hand_compositions(
        &self,
        party: Party,
    ) -> Result<&[(Subpartition, BigRational)], EstimateError> {
        Ok(&self.party(party)?.compositions)
    }

    /// `value` as a percentage, truncated to four decimal places.
    pub fn percent(value: &BigRational) -> f64 {
        if value.denom().is_zero() {
            return 0.0;
        }
        let scaled: BigInt = value.numer() * BigInt::from(1_000_000u32) / value.denom();
        scaled.to_f64().unwrap_or(0.0) / 10_000.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::tile::Tile;

    fn r(n: i64, d: i64) -> BigRational {
        BigRational::new(BigInt::from(n), BigInt::from(d))
    }

    #[test]
    fn percent_truncates_at_four_places() {
        assert_eq!(Estimate::<Tile>::percent(&r(1, 2)), 50.0);
        assert_eq!(Estimate::<Tile>::percent(&r(1, 3)), 33.3333);
        assert_eq!(Estimate::<Tile>::percent(&r(1, 1)), 100.0);
    }

    #[test]
    fn unknown_party_is_an_error() {
        let mut parties = BTreeMap::new();
        parties.insert(Party::new(0), PartyEstimate::empty(0));
        let estimate: Estimate<Tile> = Estimate {
            total_weight: BigUint::from(1u32),
            branch_count: 1,
            parties,
            item_zones: BTreeMap::new(),
        };
        assert_eq!(
            estimate.probability_of_attribute(Party::new(3), 6),
            Err(EstimateError::UnknownParty(Party::new(3)))
        );
        assert!(
            estimate
                .probability_of_attribute(Party::new(0), 6)
                .unwrap()
                .is_zero()
        );
    }
}
