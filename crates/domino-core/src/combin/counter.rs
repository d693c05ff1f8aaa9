//! Exact counting of hand assignments under per-zone capacity limits.
//!
//! An assignment picks, for every party, which live items it holds, such that
//! each party holds exactly its target and only draws from zones it belongs to.
//! Items nobody takes stay in an undealt remainder. Counting proceeds party by
//! party: each level enumerates the party's subpartitions against the capacity
//! left by earlier levels and multiplies `C(remaining, taken)` per zone.

use super::binomial::BinomialTable;
use super::subpartition::{Subpartition, SubpartitionEnumerator, Subpartitions};
use crate::model::hands::HandTargets;
use crate::model::party::Party;
use crate::zone::{ZoneCounts, ZoneKey};
use num_bigint::BigUint;
use num_traits::{One, Zero};

#[derive(Debug, Clone)]
pub struct CombinatorialCounter {
    table: BinomialTable,
}

impl CombinatorialCounter {
    pub fn new(max_n: usize) -> Self {
        Self {
            table: BinomialTable::new(max_n),
        }
    }

    /// Sized so every binomial drawn from `sizes` hits the precomputed table.
    pub fn for_sizes(sizes: &ZoneCounts) -> Self {
        Self::new(sizes.values().sum())
    }

    pub fn table(&self) -> &BinomialTable {
        &self.table
    }

    /// Number of ways every party can hold exactly its target.
    pub fn total_consistent_assignments(&self, sizes: &ZoneCounts, hands: &HandTargets) -> BigUint {
        let parties: Vec<(Party, usize)> = hands.iter().collect();
        self.count_levels(&parties, sizes, None)
    }

    /// Number of assignments in which `party` holds none of the items counted
    /// by `attribute_counts` (per zone, how many items bear the attribute).
    ///
    /// `party` is placed first so its share is drawn from the attribute-free part
    /// of each zone; everyone else then draws from what is left, unaffected.
    pub fn exclusion_count(
        &self,
        sizes: &ZoneCounts,
        hands: &HandTargets,
        party: Party,
        attribute_counts: &ZoneCounts,
    ) -> BigUint {
        let parties: Vec<(Party, usize)> = std::iter::once((party, hands.get(party)))
            .chain(hands.iter().filter(|(other, _)| *other != party))
            .collect();
        self.count_levels(&parties, sizes, Some(attribute_counts))
    }

    /// Assignments consistent with one fixed share per party: per zone, the
    /// multinomial of the zone size over every party's take and the remainder.
    pub fn branch_weight(&self, sizes: &ZoneCounts, shares: &[(Party, Subpartition)]) -> BigUint {
        let mut weight = BigUint::one();
        for (&zone, &size) in sizes {
            let parts: Vec<usize> = shares
                .iter()
                .map(|(_, share)| share.get(zone))
                .filter(|&taken| taken > 0)
                .collect();
            if parts.is_empty() {
                continue;
            }
            weight *= self.table.multinomial(size, &parts);
            if weight.is_zero() {
                break;
            }
        }
        weight
    }

    /// Like [`branch_weight`](Self::branch_weight) but counting only the
    /// assignments where `party` avoids every item in `attribute_counts`.
    pub fn branch_exclusion_weight(
        &self,
        sizes: &ZoneCounts,
        shares: &[(Party, Subpartition)],
        party: Party,
        attribute_counts: &ZoneCounts,
    ) -> BigUint {
        let mut weight = BigUint::one();
        for (&zone, &size) in sizes {
            let own = shares
                .iter()
                .find(|(p, _)| *p == party)
                .map(|(_, share)| share.get(zone))
                .unwrap_or(0);
            let others: Vec<usize> = shares
                .iter()
                .filter(|(p, _)| *p != party)
                .map(|(_, share)| share.get(zone))
                .filter(|&taken| taken > 0)
                .collect();
            let clean = size.saturating_sub(attribute_counts.get(&zone).copied().unwrap_or(0));
            weight *= self.table.choose(clean, own);
            if own <= size {
                weight *= self.table.multinomial(size - own, &others);
            }
            if weight.is_zero() {
                break;
            }
        }
        weight
    }

    /// Every global branch (one subpartition per party) with its weight.
    pub fn branches(&self, sizes: &ZoneCounts, hands: &HandTargets) -> Branches<'_> {
        Branches::new(self, sizes.clone(), hands.iter().collect())
    }

    fn count_levels(
        &self,
        parties: &[(Party, usize)],
        remaining: &ZoneCounts,
        avoid: Option<&ZoneCounts>,
    ) -> BigUint {
        let Some((&(party, target), rest)) = parties.split_first() else {
            return BigUint::one();
        };

        // What this party may draw from: remaining capacity, minus attribute
        // items when it is the party being kept clear of them.
        let pool: ZoneCounts = remaining
            .iter()
            .filter(|(key, _)| key.contains(party))
            .map(|(&key, &capacity)| {
                let blocked = avoid.and_then(|counts| counts.get(&key)).copied().unwrap_or(0);
                (key, capacity.saturating_sub(blocked))
            })
            .collect();

        if rest.is_empty() {
            // Last party: summing C(pool_z, c_z) over its splits collapses to one term.
            let reachable: usize = pool.values().sum();
            if target > reachable {
                return BigUint::zero();
            }
            return self.table.choose(reachable, target);
        }

        let mut total = BigUint::zero();
        for split in SubpartitionEnumerator::new(party, target, &pool).iter() {
            let mut ways = BigUint::one();
            for (zone, taken) in split.iter() {
                ways *= self.table.choose(pool.get(&zone).copied().unwrap_or(0), taken);
            }
            if ways.is_zero() {
                continue;
            }
            let next = subtract(remaining, &split);
            let below = self.count_levels(rest, &next, None);
            if !below.is_zero() {
                total += ways * below;
            }
        }
        total
    }
}

fn subtract(capacities: &ZoneCounts, split: &Subpartition) -> ZoneCounts {
    capacities
        .iter()
        .map(|(&key, &capacity)| (key, capacity.saturating_sub(split.get(key))))
        .collect()
}

/// One global branch: a subpartition for every party, and how many concrete
/// assignments realise it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Branch {
    shares: Vec<(Party, Subpartition)>,
    weight: BigUint,
}

impl Branch {
    pub fn shares(&self) -> &[(Party, Subpartition)] {
        &self.shares
    }

    pub fn share(&self, party: Party) -> Option<&Subpartition> {
        self.shares
            .iter()
            .find(|(p, _)| *p == party)
            .map(|(_, share)| share)
    }

    /// Items `party` takes from `zone` in this branch.
    pub fn taken(&self, party: Party, zone: ZoneKey) -> usize {
        self.share(party).map(|share| share.get(zone)).unwrap_or(0)
    }

    pub fn weight(&self) -> &BigUint {
        &self.weight
    }
}

struct Frame {
    remaining: ZoneCounts,
    splits: Subpartitions,
    chosen: Option<Subpartition>,
}

/// Depth-first walk over nested subpartition enumerations, one level per party.
pub struct Branches<'a> {
    counter: &'a CombinatorialCounter,
    sizes: ZoneCounts,
    parties: Vec<(Party, usize)>,
    frames: Vec<Frame>,
    started: bool,
}

impl<'a> Branches<'a> {
    fn new(counter: &'a CombinatorialCounter, sizes: ZoneCounts, parties: Vec<(Party, usize)>) -> Self {
        Self {
            counter,
            sizes,
            parties,
            frames: Vec::new(),
            started: false,
        }
    }

    fn frame_for(&self, depth: usize, remaining: ZoneCounts) -> Frame {
        let (party, target) = self.parties[depth];
        let splits = SubpartitionEnumerator::new(party, target, &remaining).iter();
        Frame {
            remaining,
            splits,
            chosen: None,
        }
    }
}

impl Iterator for Branches<'_> {
    type Item = Branch;

    fn next(&mut self) -> Option<Branch> {
        if !self.started {
            self.started = true;
            if self.parties.is_empty() {
                return Some(Branch {
                    shares: Vec::new(),
                    weight: BigUint::one(),
                });
            }
            let first = self.frame_for(0, self.sizes.clone());
            self.frames.push(first);
        }

        loop {
            let depth = self.frames.len();
            let frame = self.frames.last_mut()?;
            let Some(split) = frame.splits.next() else {
                self.frames.pop();
                continue;
            };

            if depth == self.parties.len() {
                let shares: Vec<(Party, Subpartition)> = self.frames[..depth - 1]
                    .iter()
                    .zip(&self.parties)
                    .filter_map(|(frame, (party, _))| {
                        frame.chosen.clone().map(|chosen| (*party, chosen))
                    })
                    .chain(std::iter::once((self.parties[depth - 1].0, split)))
                    .collect();
                let weight = self.counter.branch_weight(&self.sizes, &shares);
                return Some(Branch { shares, weight });
            }

            let remaining = subtract(&frame.remaining, &split);
            frame.chosen = Some(split);
            let next = self.frame_for(depth, remaining);
            self.frames.push(next);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combin::binomial::binomial;

    fn p(i: u8) -> Party {
        Party::new(i)
    }

    fn key(parties: &[u8]) -> ZoneKey {
        ZoneKey::from_parties(parties.iter().map(|&i| p(i)))
    }

    fn counts(entries: &[(&[u8], usize)]) -> ZoneCounts {
        entries.iter().map(|(parties, n)| (key(parties), *n)).collect()
    }

    fn hands(entries: &[(u8, usize)]) -> HandTargets {
        entries.iter().map(|&(i, n)| (p(i), n)).collect()
    }

    #[test]
    fn single_shared_zone_is_a_multinomial() {
        let sizes = counts(&[(&[0, 1, 2], 21)]);
        let targets = hands(&[(0, 7), (1, 7), (2, 7)]);
        let counter = CombinatorialCounter::for_sizes(&sizes);
        let expected = binomial(21, 7) * binomial(14, 7);
        assert_eq!(counter.total_consistent_assignments(&sizes, &targets), expected);
    }

    #[test]
    fn two_hands_with_overlap_match_hand_count() {
        // P0 may hold {1..20}, P1 only {8..17}; each holds 5.
        let sizes = counts(&[(&[0], 10), (&[0, 1], 10)]);
        let targets = hands(&[(0, 5), (1, 5)]);
        let counter = CombinatorialCounter::for_sizes(&sizes);
        let mut expected = BigUint::zero();
        for i in 0..=5usize {
            expected += binomial(10, i) * binomial(10, 5 - i) * binomial(5 + i, 5);
        }
        assert_eq!(counter.total_consistent_assignments(&sizes, &targets), expected);
    }

    #[test]
    fn infeasible_targets_count_zero() {
        let sizes = counts(&[(&[0], 2), (&[0, 1], 1)]);
        let targets = hands(&[(0, 1), (1, 2)]);
        let counter = CombinatorialCounter::for_sizes(&sizes);
        assert!(counter.total_consistent_assignments(&sizes, &targets).is_zero());
        assert_eq!(counter.branches(&sizes, &targets).count(), 0);
    }

    #[test]
    fn lone_party_exclusion_is_closed_form() {
        let sizes = counts(&[(&[0], 9)]);
        let targets = hands(&[(0, 4)]);
        let attribute = counts(&[(&[0], 3)]);
        let counter = CombinatorialCounter::for_sizes(&sizes);
        assert_eq!(
            counter.exclusion_count(&sizes, &targets, p(0), &attribute),
            binomial(6, 4)
        );
    }

    #[test]
    fn uncontested_zone_exclusion_factorises() {
        let sizes = counts(&[(&[0], 5), (&[1], 4)]);
        let targets = hands(&[(0, 3), (1, 2)]);
        let attribute = counts(&[(&[0], 2), (&[1], 4)]);
        let counter = CombinatorialCounter::for_sizes(&sizes);
        assert_eq!(
            counter.exclusion_count(&sizes, &targets, p(0), &attribute),
            binomial(3, 3) * binomial(4, 2)
        );
        // P1 can only draw attribute items, so it cannot avoid them.
        assert!(counter.exclusion_count(&sizes, &targets, p(1), &attribute).is_zero());
    }

    #[test]
    fn branch_weights_sum_to_total() {
        let sizes = counts(&[
            (&[0], 2),
            (&[1], 1),
            (&[2], 3),
            (&[0, 1], 3),
            (&[0, 2], 2),
            (&[1, 2], 2),
            (&[0, 1, 2], 4),
        ]);
        let targets = hands(&[(0, 6), (1, 5), (2, 6)]);
        let counter = CombinatorialCounter::for_sizes(&sizes);
        let total = counter.total_consistent_assignments(&sizes, &targets);
        let mut summed = BigUint::zero();
        let mut seen = std::collections::HashSet::new();
        for branch in counter.branches(&sizes, &targets) {
            assert!(!branch.weight().is_zero());
            assert!(seen.insert(branch.shares().to_vec()), "branch repeated");
            for (party, share) in branch.shares() {
                assert_eq!(share.total(), targets.get(*party));
            }
            summed += branch.weight();
        }
        assert!(!total.is_zero());
        assert_eq!(summed, total);
    }

    #[test]
    fn branch_exclusions_sum_to_exclusion_count() {
        let sizes = counts(&[(&[0], 2), (&[1], 2), (&[0, 1], 4), (&[0, 1, 2], 3), (&[2], 1)]);
        let targets = hands(&[(0, 3), (1, 3), (2, 2)]);
        let attribute = counts(&[(&[0], 1), (&[0, 1], 2), (&[0, 1, 2], 1)]);
        let counter = CombinatorialCounter::for_sizes(&sizes);
        for party in [p(0), p(1), p(2)] {
            let mut summed = BigUint::zero();
            for branch in counter.branches(&sizes, &targets) {
                summed += counter.branch_exclusion_weight(&sizes, branch.shares(), party, &attribute);
            }
            assert_eq!(
                summed,
                counter.exclusion_count(&sizes, &targets, party, &attribute),
                "{party}"
            );
        }
    }

    #[test]
    fn relabelling_parties_preserves_total() {
        let sizes = counts(&[(&[0], 1), (&[0, 1], 3), (&[1, 2], 2), (&[0, 1, 2], 4)]);
        let targets = hands(&[(0, 3), (1, 4), (2, 2)]);
        // Swap P0 <-> P2 in both zones and targets.
        let swapped_sizes = counts(&[(&[2], 1), (&[2, 1], 3), (&[1, 0], 2), (&[0, 1, 2], 4)]);
        let swapped_targets = hands(&[(2, 3), (1, 4), (0, 2)]);
        let counter = CombinatorialCounter::for_sizes(&sizes);
        assert_eq!(
            counter.total_consistent_assignments(&sizes, &targets),
            counter.total_consistent_assignments(&swapped_sizes, &swapped_targets)
        );
    }

    #[test]
    fn no_parties_yields_single_empty_branch() {
        let sizes = counts(&[(&[0], 3)]);
        let counter = CombinatorialCounter::for_sizes(&sizes);
        let branches: Vec<_> = counter.branches(&sizes, &HandTargets::new()).collect();
        assert_eq!(branches.len(), 1);
        assert_eq!(branches[0].weight(), &BigUint::one());
    }
}
