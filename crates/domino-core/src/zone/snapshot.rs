use super::ZoneCounts;
use super::key::ZoneKey;
use super::partition::ZonePartition;
use crate::model::item::Item;
use crate::model::party::Party;
use std::collections::BTreeMap;

/// Immutable copy of the partition taken at the start of an estimation pass.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ZoneSnapshot<T: Item> {
    parties: Vec<Party>,
    sizes: ZoneCounts,
    attribute_counts: BTreeMap<T::Attribute, ZoneCounts>,
    item_zones: BTreeMap<T, ZoneKey>,
}

impl<T: Item> ZoneSnapshot<T> {
    pub(crate) fn capture(partition: &ZonePartition<T>) -> Self {
        let sizes: ZoneCounts = partition.zones().collect();
        let mut attribute_counts: BTreeMap<T::Attribute, ZoneCounts> = partition
            .attributes()
            .map(|attribute| {
                let empty = sizes.keys().map(|&key| (key, 0)).collect();
                (attribute, empty)
            })
            .collect();
        let mut item_zones = BTreeMap::new();

        for &key in sizes.keys() {
            let Ok(items) = partition.items_in(key) else {
                continue;
            };
            for item in items {
                item_zones.insert(*item, key);
                for attribute in item.attributes() {
                    *attribute_counts
                        .entry(attribute)
                        .or_default()
                        .entry(key)
                        .or_default() += 1;
                }
            }
        }

        Self {
            parties: partition.parties().to_vec(),
            sizes,
            attribute_counts,
            item_zones,
        }
    }

    pub fn parties(&self) -> &[Party] {
        &self.parties
    }

    pub fn sizes(&self) -> &ZoneCounts {
        &self.sizes
    }

    pub fn size(&self, zone: ZoneKey) -> usize {
        self.sizes.get(&zone).copied().unwrap_or(0)
    }

    pub fn live_count(&self) -> usize {
        self.sizes.values().sum()
    }

    pub fn attributes(&self) -> impl Iterator<Item = T::Attribute> + '_ {
        self.attribute_counts.keys().copied()
    }

    /// Per-zone count of live items bearing `attribute`. Zones without any are zero.
    pub fn attribute_counts(&self, attribute: T::Attribute) -> ZoneCounts {
        self.attribute_counts
            .get(&attribute)
            .cloned()
            .unwrap_or_else(|| self.sizes.keys().map(|&key| (key, 0)).collect())
    }

    pub fn attribute_count(&self, attribute: T::Attribute, zone: ZoneKey) -> usize {
        self.attribute_counts
            .get(&attribute)
            .and_then(|counts| counts.get(&zone))
            .copied()
            .unwrap_or(0)
    }

    /// Live items bearing `attribute`, across all zones.
    pub fn attribute_total(&self, attribute: T::Attribute) -> usize {
        self.attribute_counts
            .get(&attribute)
            .map(|counts| counts.values().sum())
            .unwrap_or(0)
    }

    pub fn zone_of(&self, item: T) -> Option<ZoneKey> {
        self.item_zones.get(&item).copied()
    }

    pub fn items(&self) -> impl Iterator<Item = (T, ZoneKey)> + '_ {
        self.item_zones.iter().map(|(item, key)| (*item, *key))
    }
}
