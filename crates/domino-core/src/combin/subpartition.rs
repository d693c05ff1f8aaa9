use crate::model::party::Party;
use crate::zone::{ZoneCounts, ZoneKey};
use core::fmt;

/// One way for a party to meet its hand size: how many items it takes from each
/// zone it can draw from. Zones it takes nothing from are kept with a zero count
/// so every subpartition of the same request has the same shape.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Subpartition {
    counts: Vec<(ZoneKey, usize)>,
}

impl Subpartition {
    pub fn new(mut counts: Vec<(ZoneKey, usize)>) -> Self {
        counts.sort();
        Self { counts }
    }

    pub fn get(&self, zone: ZoneKey) -> usize {
        self.counts
            .iter()
            .find(|(key, _)| *key == zone)
            .map(|(_, count)| *count)
            .unwrap_or(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (ZoneKey, usize)> + '_ {
        self.counts.iter().copied()
    }

    pub fn total(&self) -> usize {
        self.counts.iter().map(|(_, count)| count).sum()
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn to_counts(&self) -> ZoneCounts {
        self.counts.iter().copied().collect()
    }
}

impl fmt::Display for Subpartition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (zone, count)) in self.counts.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{zone}:{count}")?;
        }
        Ok(())
    }
}

/// Enumerates every split of a required count across a party's reachable zones.
#[derive(Debug, Clone)]
pub struct SubpartitionEnumerator {
    zones: Vec<(ZoneKey, usize)>,
    required: usize,
}

impl SubpartitionEnumerator {
    /// Restricts `capacities` to zones whose key contains `party`.
    pub fn new(party: Party, required: usize, capacities: &ZoneCounts) -> Self {
        let zones = capacities
            .iter()
            .filter(|(key, _)| key.contains(party))
            .map(|(key, capacity)| (*key, *capacity))
            .collect();
        Self::from_zones(zones, required)
    }

    pub fn from_zones(mut zones: Vec<(ZoneKey, usize)>, required: usize) -> Self {
        zones.sort();
        Self { zones, required }
    }

    pub fn required(&self) -> usize {
        self.required
    }

    pub fn capacity(&self) -> usize {
        self.zones.iter().map(|(_, capacity)| capacity).sum()
    }

    pub fn is_feasible(&self) -> bool {
        self.required <= self.capacity()
    }

    /// A fresh pass over the subpartitions, in lexicographic order of the count vector.
    pub fn iter(&self) -> Subpartitions {
        Subpartitions::new(self.zones.clone(), self.required)
    }
}

impl IntoIterator for &SubpartitionEnumerator {
    type Item = Subpartition;
    type IntoIter = Subpartitions;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Cursor {
    Fresh,
    Active,
    Exhausted,
}

/// Lazy odometer over compositions. Each step touches only the suffix that changes.
#[derive(Debug, Clone)]
pub struct Subpartitions {
    zones: Vec<(ZoneKey, usize)>,
    // suffix[i] = capacity of zones[i..]
    suffix: Vec<usize>,
    counts: Vec<usize>,
    required: usize,
    cursor: Cursor,
}

impl Subpartitions {
    fn new(zones: Vec<(ZoneKey, usize)>, required: usize) -> Self {
        let mut suffix = vec![0; zones.len() + 1];
        for i in (0..zones.len()).rev() {
            suffix[i] = suffix[i + 1] + zones[i].1;
        }
        let counts = vec![0; zones.len()];
        Self {
            zones,
            suffix,
            counts,
            required,
            cursor: Cursor::Fresh,
        }
    }

    /// Smallest completion of positions `start..` that takes exactly `remaining`.
    fn fill_from(&mut self, start: usize, mut remaining: usize) {
        for j in start..self.counts.len() {
            let take = remaining.saturating_sub(self.suffix[j + 1]);
            self.counts[j] = take;
            remaining -= take;
        }
    }

    fn advance(&mut self) -> bool {
        let n = self.counts.len();
        if n < 2 {
            return false;
        }
        for i in (0..n - 1).rev() {
            let prefix: usize = self.counts[..i].iter().sum();
            let bumped = self.counts[i] + 1;
            if bumped <= self.zones[i].1 && prefix + bumped <= self.required {
                self.counts[i] = bumped;
                self.fill_from(i + 1, self.required - prefix - bumped);
                return true;
            }
        }
        false
    }

    fn current(&self) -> Subpartition {
        Subpartition {
            counts: self
                .zones
                .iter()
                .zip(&self.counts)
                .map(|((key, _), count)| (*key, *count))
                .collect(),
        }
    }
}

impl Iterator for Subpartitions {
    type Item = Subpartition;

    fn next(&mut self) -> Option<Self::Item> {
        match self.cursor {
            Cursor::Fresh => {
                if self.required > self.suffix[0] {
                    self.cursor = Cursor::Exhausted;
                    return None;
                }
                self.fill_from(0, self.required);
                self.cursor = Cursor::Active;
                Some(self.current())
            }
            Cursor::Active => {
                if self.advance() {
                    Some(self.current())
                } else {
                    self.cursor = Cursor::Exhausted;
                    None
                }
            }
            Cursor::Exhausted => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zones(capacities: &[usize]) -> Vec<(ZoneKey, usize)> {
        capacities
            .iter()
            .enumerate()
            .map(|(i, &c)| (ZoneKey::single(Party::new(i as u8)), c))
            .collect()
    }

    fn vectors(enumerator: &SubpartitionEnumerator) -> Vec<Vec<usize>> {
        enumerator
            .iter()
            .map(|s| s.iter().map(|(_, c)| c).collect())
            .collect()
    }

    #[test]
    fn first_splits_come_in_lexicographic_order() {
        let enumerator = SubpartitionEnumerator::from_zones(zones(&[1, 2, 3, 4]), 4);
        let all = vectors(&enumerator);
        assert_eq!(all[0], vec![0, 0, 0, 4]);
        assert_eq!(all[1], vec![0, 0, 1, 3]);
        assert_eq!(all[2], vec![0, 0, 2, 2]);
        assert_eq!(all[3], vec![0, 0, 3, 1]);
        assert_eq!(all[4], vec![0, 1, 0, 3]);
        let mut sorted = all.clone();
        sorted.sort();
        assert_eq!(all, sorted);
    }

    #[test]
    fn matches_nested_loop_count() {
        let caps = [1usize, 2, 3, 4];
        let mut expected = 0;
        for a in 0..=caps[0] {
            for b in 0..=caps[1] {
                for c in 0..=caps[2] {
                    for d in 0..=caps[3] {
                        if a + b + c + d == 4 {
                            expected += 1;
                        }
                    }
                }
            }
        }
        let enumerator = SubpartitionEnumerator::from_zones(zones(&caps), 4);
        let all = vectors(&enumerator);
        assert_eq!(all.len(), expected);
        for split in &all {
            assert_eq!(split.iter().sum::<usize>(), 4);
            for (count, cap) in split.iter().zip(caps) {
                assert!(*count <= cap);
            }
        }
    }

    #[test]
    fn over_capacity_request_yields_nothing() {
        let enumerator = SubpartitionEnumerator::from_zones(zones(&[1, 1]), 3);
        assert!(!enumerator.is_feasible());
        assert_eq!(enumerator.iter().count(), 0);
    }

    #[test]
    fn zero_request_yields_single_empty_take() {
        let enumerator = SubpartitionEnumerator::from_zones(zones(&[2, 0, 5]), 0);
        assert_eq!(vectors(&enumerator), vec![vec![0, 0, 0]]);
        let none = SubpartitionEnumerator::from_zones(Vec::new(), 0);
        assert_eq!(none.iter().count(), 1);
        let impossible = SubpartitionEnumerator::from_zones(Vec::new(), 1);
        assert_eq!(impossible.iter().count(), 0);
    }

    #[test]
    fn enumeration_is_restartable() {
        let enumerator = SubpartitionEnumerator::from_zones(zones(&[2, 2, 2]), 3);
        let first: Vec<_> = enumerator.iter().collect();
        let second: Vec<_> = enumerator.iter().collect();
        assert_eq!(first, second);
        assert_eq!(first.len(), 7);
    }

    #[test]
    fn new_keeps_only_reachable_zones() {
        let p0 = Party::new(0);
        let p1 = Party::new(1);
        let capacities: ZoneCounts = [
            (ZoneKey::single(p0), 2),
            (ZoneKey::single(p1), 5),
            (ZoneKey::from_parties([p0, p1]), 1),
        ]
        .into_iter()
        .collect();
        let enumerator = SubpartitionEnumerator::new(p0, 2, &capacities);
        assert_eq!(enumerator.capacity(), 3);
        let splits: Vec<_> = enumerator.iter().collect();
        assert_eq!(splits.len(), 2);
        assert!(splits.iter().all(|s| s.get(ZoneKey::single(p1)) == 0 && s.len() == 2));
    }
}
