use crate::model::party::{MAX_PARTIES, Party};
use core::cmp::Ordering;
use core::fmt;

/// Canonical identity of a zone: the set of parties who could still own an item.
///
/// Stored as a bitmask, so any two constructions naming the same parties (in any
/// order, with or without duplicates) compare and hash equal. Ordering is
/// lexicographic over the ascending member list: `{P0} < {P0,P1} < {P0,P2} < {P1}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ZoneKey(u32);

impl ZoneKey {
    pub fn from_parties<I: IntoIterator<Item = Party>>(parties: I) -> Self {
        let mask = parties
            .into_iter()
            .filter(|party| party.index() < MAX_PARTIES)
            .fold(0u32, |mask, party| mask | (1 << party.index()));
        Self(mask)
    }

    pub fn single(party: Party) -> Self {
        Self::from_parties([party])
    }

    /// The initial zone: every party at the table.
    pub fn full(parties: &[Party]) -> Self {
        Self::from_parties(parties.iter().copied())
    }

    pub fn contains(self, party: Party) -> bool {
        party.index() < MAX_PARTIES && self.0 & (1 << party.index()) != 0
    }

    /// The zone an item moves to once `party` is ruled out. `None` if no owner would remain.
    pub fn without(self, party: Party) -> Option<Self> {
        if party.index() >= MAX_PARTIES {
            return Some(self);
        }
        let reduced = self.0 & !(1 << party.index());
        (reduced != 0).then_some(Self(reduced))
    }

    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn is_subset_of(self, other: ZoneKey) -> bool {
        self.0 & !other.0 == 0
    }

    pub fn iter(self) -> impl Iterator<Item = Party> {
        (0..MAX_PARTIES)
            .filter(move |index| self.0 & (1 << index) != 0)
            .filter_map(Party::from_index)
    }

    /// Every non-empty subset of `full`, in canonical order.
    pub fn subsets_of(full: ZoneKey) -> Vec<ZoneKey> {
        let mut keys = Vec::new();
        // Standard submask walk: visits every non-empty submask of `full` exactly once.
        let mut sub = full.0;
        while sub != 0 {
            keys.push(ZoneKey(sub));
            sub = (sub - 1) & full.0;
        }
        keys.sort();
        keys
    }
}

impl Ord for ZoneKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.iter().cmp(other.iter())
    }
}

impl PartialOrd for ZoneKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for ZoneKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, party) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{party}")?;
        }
        f.write_str("}")
    }
}

#[cfg(test)]
mod tests {
    use super::ZoneKey;
    use crate::model::party::Party;

    fn p(i: u8) -> Party {
        Party::new(i)
    }

    #[test]
    fn order_and_duplicates_do_not_matter() {
        let a = ZoneKey::from_parties([p(2), p(0), p(2)]);
        let b = ZoneKey::from_parties([p(0), p(2)]);
        assert_eq!(a, b);
        assert_eq!(a.len(), 2);
    }

    #[test]
    fn without_shrinks_and_empties() {
        let key = ZoneKey::from_parties([p(1), p(3)]);
        assert_eq!(key.without(p(1)), Some(ZoneKey::single(p(3))));
        assert_eq!(key.without(p(2)), Some(key));
        assert_eq!(ZoneKey::single(p(3)).without(p(3)), None);
    }

    #[test]
    fn ordering_is_lexicographic_over_members() {
        let mut keys = vec![
            ZoneKey::single(p(1)),
            ZoneKey::from_parties([p(0), p(2)]),
            ZoneKey::single(p(0)),
            ZoneKey::from_parties([p(0), p(1)]),
        ];
        keys.sort();
        let rendered: Vec<String> = keys.iter().map(|k| k.to_string()).collect();
        assert_eq!(rendered, vec!["{P0}", "{P0,P1}", "{P0,P2}", "{P1}"]);
    }

    #[test]
    fn subsets_cover_all_non_empty_combinations() {
        let full = ZoneKey::from_parties([p(1), p(2), p(3)]);
        let subsets = ZoneKey::subsets_of(full);
        assert_eq!(subsets.len(), 7);
        assert!(subsets.iter().all(|s| s.is_subset_of(full) && !s.is_empty()));
        assert_eq!(subsets.first(), Some(&ZoneKey::single(p(1))));
    }
}
