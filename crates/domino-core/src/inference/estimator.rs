//! Exact probability estimation over every consistent global branch.

use super::cancel::CancelFlag;
use super::estimate::{Estimate, PartyEstimate};
use super::union::union_probability;
use super::EstimateError;
use crate::combin::{Branch, CombinatorialCounter, Subpartition};
use crate::model::hands::HandTargets;
use crate::model::item::Item;
use crate::model::party::Party;
use crate::zone::{ZoneCounts, ZoneKey, ZoneSnapshot};
use num_bigint::{BigInt, BigUint};
use num_rational::BigRational;
use num_traits::{One, Zero};
use std::collections::{BTreeMap, HashMap};
use tracing::{Level, event};

/// Runs one estimation pass against an immutable zone snapshot.
///
/// Within a branch every party's take from a zone is a uniformly random subset
/// of that zone, independent across zones, so the chance the take from zone
/// `z` includes the attribute is `1 - C(n - v, c) / C(n, c)`. Those per-zone
/// events are merged by inclusion-exclusion and the branch results are averaged
/// by branch weight.
pub struct ProbabilityEstimator<'a, T: Item> {
    snapshot: &'a ZoneSnapshot<T>,
    targets: HandTargets,
    counter: CombinatorialCounter,
    cancel: Option<CancelFlag>,
}

struct PartyTally<A> {
    hand_size: usize,
    attributes: BTreeMap<A, BigRational>,
    takes: BTreeMap<ZoneKey, BigUint>,
    compositions: HashMap<Subpartition, BigUint>,
}

impl<'a, T: Item> ProbabilityEstimator<'a, T> {
    /// Parties of the snapshot missing from `hands` are treated as holding nothing.
    pub fn new(snapshot: &'a ZoneSnapshot<T>, hands: &HandTargets) -> Self {
        let mut targets: HandTargets = snapshot
            .parties()
            .iter()
            .map(|&party| (party, hands.get(party)))
            .collect();
        for (party, size) in hands.iter() {
            targets.set(party, size);
        }
        Self {
            snapshot,
            targets,
            counter: CombinatorialCounter::for_sizes(snapshot.sizes()),
            cancel: None,
        }
    }

    pub fn with_cancel(mut self, cancel: CancelFlag) -> Self {
        self.cancel = Some(cancel);
        self
    }

    pub fn targets(&self) -> &HandTargets {
        &self.targets
    }

    fn check_cancelled(&self) -> Result<(), EstimateError> {
        match &self.cancel {
            Some(flag) if flag.is_cancelled() => Err(EstimateError::Cancelled),
            _ => Ok(()),
        }
    }

    fn checkpoint(&self) -> Result<(), EstimateError> {
        match &self.cancel {
            Some(flag) if flag.checkpoint() => Err(EstimateError::Cancelled),
            _ => Ok(()),
        }
    }

    pub fn run(&self) -> Result<Estimate<T>, EstimateError> {
        self.check_cancelled()?;
        let sizes = self.snapshot.sizes();
        event!(
            target: "domino_core::estimate",
            Level::DEBUG,
            parties = self.targets.len(),
            live = self.snapshot.live_count(),
            targets = self.targets.total(),
            "estimation pass started"
        );

        let attributes: Vec<(T::Attribute, ZoneCounts)> = self
            .snapshot
            .attributes()
            .map(|attribute| (attribute, self.snapshot.attribute_counts(attribute)))
            .collect();

        let mut tallies: BTreeMap<Party, PartyTally<T::Attribute>> = self
            .targets
            .iter()
            .map(|(party, hand_size)| {
                let tally = PartyTally {
                    hand_size,
                    attributes: attributes
                        .iter()
                        .map(|(attribute, _)| (*attribute, BigRational::zero()))
                        .collect(),
                    takes: BTreeMap::new(),
                    compositions: HashMap::new(),
                };
                (party, tally)
            })
            .collect();

        // Every enumerated branch, zero-weight ones included, is a checkpoint.
        let mut branch_count = 0u64;
        let mut total = BigUint::zero();
        for branch in self.counter.branches(sizes, &self.targets) {
            self.checkpoint()?;
            if branch.weight().is_zero() {
                continue;
            }
            branch_count += 1;
            total += branch.weight();
            self.tally_branch(&branch, &attributes, &mut tallies);
        }
        if total.is_zero() {
            event!(
                target: "domino_core::estimate",
                Level::DEBUG,
                "hand targets admit no consistent deal"
            );
            return Err(EstimateError::NoConsistentDeal);
        }

        let estimate = self.finish(total, branch_count, &attributes, tallies);
        if tracing::enabled!(target: "domino_core::estimate", Level::DEBUG) {
            event!(
                target: "domino_core::estimate",
                Level::DEBUG,
                branches = estimate.branch_count(),
                total_weight = %estimate.total_weight(),
                "estimation pass finished"
            );
        }
        Ok(estimate)
    }

    fn tally_branch(
        &self,
        branch: &Branch,
        attributes: &[(T::Attribute, ZoneCounts)],
        tallies: &mut BTreeMap<Party, PartyTally<T::Attribute>>,
    ) {
        let sizes = self.snapshot.sizes();
        let table = self.counter.table();
        let weight = branch.weight();
        let weight_ratio = BigRational::from_integer(BigInt::from(weight.clone()));

        for (party, share) in branch.shares() {
            let Some(tally) = tallies.get_mut(party) else {
                continue;
            };
            *tally.compositions.entry(share.clone()).or_default() += weight;

            let drawn: Vec<(ZoneKey, usize, usize)> = share
                .iter()
                .filter(|&(_, taken)| taken > 0)
                .map(|(zone, taken)| (zone, taken, sizes.get(&zone).copied().unwrap_or(0)))
                .collect();
            for &(zone, taken, _) in &drawn {
                *tally.takes.entry(zone).or_default() += weight * BigUint::from(taken);
            }

            for (attribute, counts) in attributes {
                let events: Vec<BigRational> = drawn
                    .iter()
                    .filter_map(|&(zone, taken, size)| {
                        let bearing = counts.get(&zone).copied().unwrap_or(0);
                        if bearing == 0 {
                            return None;
                        }
                        let all = table.choose(size, taken);
                        if all.is_zero() {
                            return None;
                        }
                        let clean = table.choose(size - bearing.min(size), taken);
                        let miss = BigRational::new(BigInt::from(clean), BigInt::from(all));
                        Some(BigRational::one() - miss)
                    })
                    .collect();
                if events.is_empty() {
                    continue;
                }
                let union = union_probability(&events);
                if let Some(slot) = tally.attributes.get_mut(attribute) {
                    *slot += union * &weight_ratio;
                }
            }
        }
    }

    fn finish(
        &self,
        total: BigUint,
        branch_count: u64,
        attributes: &[(T::Attribute, ZoneCounts)],
        tallies: BTreeMap<Party, PartyTally<T::Attribute>>,
    ) -> Estimate<T> {
        let sizes = self.snapshot.sizes();
        let denominator = BigInt::from(total.clone());
        let whole = BigRational::from_integer(denominator.clone());

        let parties = tallies
            .into_iter()
            .map(|(party, tally)| {
                let mut estimate = PartyEstimate::empty(tally.hand_size);

                estimate.attributes = tally
                    .attributes
                    .into_iter()
                    .map(|(attribute, weighted)| (attribute, weighted / &whole))
                    .collect();

                for (&zone, take) in &tally.takes {
                    let size = sizes.get(&zone).copied().unwrap_or(0);
                    if size == 0 {
                        continue;
                    }
                    let share = BigRational::new(
                        BigInt::from(take.clone()),
                        &denominator * BigInt::from(size),
                    );
                    estimate.zone_shares.insert(zone, share);
                }

                estimate.expected_counts = attributes
                    .iter()
                    .map(|(attribute, counts)| {
                        let expected = estimate
                            .zone_shares
                            .iter()
                            .map(|(zone, share)| {
                                let bearing = counts.get(zone).copied().unwrap_or(0);
                                share * BigRational::from_integer(BigInt::from(bearing))
                            })
                            .fold(BigRational::zero(), |acc, term| acc + term);
                        (*attribute, expected)
                    })
                    .collect();

                let mut compositions: Vec<(Subpartition, BigRational)> = tally
                    .compositions
                    .into_iter()
                    .map(|(split, weight)| {
                        let probability =
                            BigRational::new(BigInt::from(weight), denominator.clone());
                        (split, probability)
                    })
                    .collect();
                compositions.sort_by(|(a, pa), (b, pb)| pb.cmp(pa).then_with(|| a.cmp(b)));
                estimate.compositions = compositions;

                (party, estimate)
            })
            .collect();

        Estimate {
            total_weight: total,
            branch_count,
            parties,
            item_zones: self.snapshot.items().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combin::binomial;
    use crate::model::pool::Pool;
    use crate::model::tile::{Pip, Tile};
    use crate::zone::ZonePartition;

    fn ratio(n: BigUint, d: BigUint) -> BigRational {
        BigRational::new(BigInt::from(n), BigInt::from(d))
    }

    fn partition(max_pip: Pip, seats: usize) -> ZonePartition<Tile> {
        let mut partition = ZonePartition::new();
        partition
            .initialize(Pool::with_max_pip(max_pip).tiles().iter().copied(), &Party::seats(seats))
            .unwrap();
        partition
    }

    #[test]
    fn untouched_pool_matches_closed_form() {
        let partition = partition(3, 2);
        let snapshot = partition.snapshot();
        let hands = HandTargets::uniform(&Party::seats(2), 5);
        let estimate = ProbabilityEstimator::new(&snapshot, &hands).run().unwrap();

        // Ten tiles, four bear pip 0; P0 draws five of ten.
        let expected = BigRational::one() - ratio(binomial(6, 5), binomial(10, 5));
        assert_eq!(
            estimate.probability_of_attribute(Party::new(0), 0).unwrap(),
            expected
        );
        assert_eq!(estimate.total_weight(), &binomial(10, 5));
        assert_eq!(estimate.branch_count(), 1);
    }

    #[test]
    fn attribute_probability_matches_exclusion_count() {
        let mut partition = partition(3, 3);
        partition.shrink(|tile| tile.has(3), Party::new(1));
        partition.shrink(|tile| tile.has(0), Party::new(2));
        let snapshot = partition.snapshot();
        let hands = HandTargets::uniform(&Party::seats(3), 3);
        let estimate = ProbabilityEstimator::new(&snapshot, &hands).run().unwrap();

        let counter = CombinatorialCounter::for_sizes(snapshot.sizes());
        let total = counter.total_consistent_assignments(snapshot.sizes(), &hands);
        for party in Party::seats(3) {
            for pip in 0..=3 {
                let excluded = counter.exclusion_count(
                    snapshot.sizes(),
                    &hands,
                    party,
                    &snapshot.attribute_counts(pip),
                );
                let expected = BigRational::one() - ratio(excluded, total.clone());
                assert_eq!(
                    estimate.probability_of_attribute(party, pip).unwrap(),
                    expected,
                    "{party} pip {pip}"
                );
            }
        }
        assert!(
            estimate
                .probability_of_attribute(Party::new(1), 3)
                .unwrap()
                .is_zero()
        );
    }

    #[test]
    fn compositions_are_ranked_and_sum_to_one() {
        let mut partition = partition(3, 2);
        partition.shrink(|tile| tile.has(3), Party::new(0));
        let snapshot = partition.snapshot();
        let hands = HandTargets::uniform(&Party::seats(2), 4);
        let estimate = ProbabilityEstimator::new(&snapshot, &hands).run().unwrap();

        for party in Party::seats(2) {
            let ranked = estimate.ranked_hand_compositions(party).unwrap();
            assert!(!ranked.is_empty());
            let total = ranked
                .iter()
                .fold(BigRational::zero(), |acc, (_, p)| acc + p);
            assert!(total.is_one());
            for pair in ranked.windows(2) {
                assert!(pair[0].1 >= pair[1].1);
            }
        }
    }

    #[test]
    fn item_probabilities_sum_to_hand_size() {
        let mut partition = partition(3, 3);
        partition.shrink(|tile| tile.has(2), Party::new(0));
        let snapshot = partition.snapshot();
        let hands = HandTargets::uniform(&Party::seats(3), 3);
        let estimate = ProbabilityEstimator::new(&snapshot, &hands).run().unwrap();

        for party in Party::seats(3) {
            let held = Pool::with_max_pip(3)
                .tiles()
                .iter()
                .map(|tile| estimate.probability_of_item(party, *tile).unwrap())
                .fold(BigRational::zero(), |acc, p| acc + p);
            assert_eq!(held, BigRational::from_integer(BigInt::from(3)));
        }
        assert!(
            estimate
                .probability_of_item(Party::new(0), Tile::new(2, 2))
                .unwrap()
                .is_zero()
        );
    }

    #[test]
    fn impossible_targets_report_no_consistent_deal() {
        let mut partition = partition(2, 2);
        partition.shrink(|tile| tile.has(0) || tile.has(1), Party::new(1));
        let snapshot = partition.snapshot();
        let hands = HandTargets::uniform(&Party::seats(2), 2);
        let result = ProbabilityEstimator::new(&snapshot, &hands).run();
        assert_eq!(result.err(), Some(EstimateError::NoConsistentDeal));
    }

    #[test]
    fn pass_stops_when_cancelled_midway() {
        let mut partition = partition(3, 3);
        partition.shrink(|tile| tile.has(3), Party::new(1));
        partition.shrink(|tile| tile.has(0), Party::new(2));
        let snapshot = partition.snapshot();
        let hands = HandTargets::uniform(&Party::seats(3), 3);
        let full = ProbabilityEstimator::new(&snapshot, &hands).run().unwrap();
        assert!(full.branch_count() > 3);

        let flag = CancelFlag::with_step_limit(3);
        let result = ProbabilityEstimator::new(&snapshot, &hands)
            .with_cancel(flag.clone())
            .run();
        assert_eq!(result.err(), Some(EstimateError::Cancelled));
        assert!(flag.is_cancelled());
        assert_eq!(flag.steps(), 4);

        let roomy = CancelFlag::with_step_limit(u64::MAX);
        let finished = ProbabilityEstimator::new(&snapshot, &hands)
            .with_cancel(roomy.clone())
            .run()
            .unwrap();
        assert_eq!(finished.total_weight(), full.total_weight());
        assert!(roomy.steps() >= full.branch_count());
    }

    #[test]
    fn cancelled_pass_returns_error() {
        let partition = partition(3, 3);
        let snapshot = partition.snapshot();
        let hands = HandTargets::uniform(&Party::seats(3), 3);
        let flag = CancelFlag::new();
        flag.cancel();
        let result = ProbabilityEstimator::new(&snapshot, &hands)
            .with_cancel(flag)
            .run();
        assert_eq!(result.err(), Some(EstimateError::Cancelled));
    }
}
