use crate::model::party::Party;
use std::collections::BTreeMap;

/// Required holding size per party. Only confirmed plays and deals change it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct HandTargets {
    sizes: BTreeMap<Party, usize>,
}

impl HandTargets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn uniform(parties: &[Party], size: usize) -> Self {
        Self {
            sizes: parties.iter().map(|&party| (party, size)).collect(),
        }
    }

    pub fn set(&mut self, party: Party, size: usize) {
        self.sizes.insert(party, size);
    }

    pub fn get(&self, party: Party) -> usize {
        self.sizes.get(&party).copied().unwrap_or(0)
    }

    pub fn contains(&self, party: Party) -> bool {
        self.sizes.contains_key(&party)
    }

    pub fn decrement(&mut self, party: Party) {
        if let Some(size) = self.sizes.get_mut(&party) {
            *size = size.saturating_sub(1);
        }
    }

    pub fn total(&self) -> usize {
        self.sizes.values().sum()
    }

    pub fn len(&self) -> usize {
        self.sizes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sizes.is_empty()
    }

    /// Parties in ascending order with their targets.
    pub fn iter(&self) -> impl Iterator<Item = (Party, usize)> + '_ {
        self.sizes.iter().map(|(&party, &size)| (party, size))
    }
}

impl FromIterator<(Party, usize)> for HandTargets {
    fn from_iter<I: IntoIterator<Item = (Party, usize)>>(iter: I) -> Self {
        Self {
            sizes: iter.into_iter().collect(),
        }
    }
}
