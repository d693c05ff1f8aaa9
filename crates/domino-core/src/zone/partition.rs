//! Item → zone bookkeeping. No combinatorics live here.

use super::key::ZoneKey;
use super::snapshot::ZoneSnapshot;
use crate::model::item::Item;
use crate::model::party::{MAX_PARTIES, Party};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use thiserror::Error;
use tracing::{Level, event};

/// Tracks, for every live item, the exact set of parties who could still own it.
///
/// Every live item sits in exactly one zone. Zones only ever lose parties: a
/// shrink moves items to a strictly smaller owner set, a remove takes them out
/// of circulation for good.
#[derive(Debug, Clone)]
pub struct ZonePartition<T: Item> {
    parties: Vec<Party>,
    full: Option<ZoneKey>,
    zones: BTreeMap<ZoneKey, Vec<T>>,
    assignment: HashMap<T, ZoneKey>,
    attributes: BTreeSet<T::Attribute>,
}

/// Result of a shrink event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShrinkOutcome<T> {
    /// Items moved to a smaller zone.
    pub relocated: usize,
    /// Items left with no possible owner; they were removed from the partition.
    pub orphaned: Vec<T>,
}

impl<T> ShrinkOutcome<T> {
    pub fn is_noop(&self) -> bool {
        self.relocated == 0 && self.orphaned.is_empty()
    }
}

impl<T: Item> Default for ZonePartition<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Item> ZonePartition<T> {
    pub fn new() -> Self {
        Self {
            parties: Vec::new(),
            full: None,
            zones: BTreeMap::new(),
            assignment: HashMap::new(),
            attributes: BTreeSet::new(),
        }
    }

    /// Places every item in the zone owned by all `parties`.
    pub fn initialize<I>(&mut self, items: I, parties: &[Party]) -> Result<(), ZoneError>
    where
        I: IntoIterator<Item = T>,
    {
        if self.full.is_some() {
            return Err(ZoneError::AlreadyInitialized);
        }

        if let Some(&stranger) = parties.iter().find(|party| party.index() >= MAX_PARTIES) {
            return Err(ZoneError::PartyOutOfRange(stranger));
        }
        let full = ZoneKey::full(parties);
        if full.is_empty() {
            return Err(ZoneError::InvalidZone(full));
        }

        self.parties = full.iter().collect();
        self.zones = ZoneKey::subsets_of(full)
            .into_iter()
            .map(|key| (key, Vec::new()))
            .collect();

        let mut members = Vec::new();
        for item in items {
            if self.assignment.insert(item, full).is_none() {
                self.attributes.extend(item.attributes());
                members.push(item);
            }
        }
        self.zones.insert(full, members);
        self.full = Some(full);
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.full.is_some()
    }

    /// Rules `party` out for every live item matching `matches`.
    ///
    /// Items whose owner set is already free of `party` are left alone.
    pub fn shrink<F>(&mut self, matches: F, party: Party) -> ShrinkOutcome<T>
    where
        F: Fn(&T) -> bool,
    {
        let matches = &matches;
        let moves: Vec<(T, ZoneKey, Option<ZoneKey>)> = self
            .zones
            .iter()
            .filter(|(key, _)| key.contains(party))
            .flat_map(move |(key, items)| {
                items
                    .iter()
                    .filter(move |item| matches(item))
                    .map(move |item| (*item, *key, key.without(party)))
            })
            .collect();

        let mut outcome = ShrinkOutcome {
            relocated: 0,
            orphaned: Vec::new(),
        };

        for (item, from, to) in moves {
            self.detach(item, from);
            match to {
                Some(target) => {
                    self.assignment.insert(item, target);
                    self.zones.entry(target).or_default().push(item);
                    outcome.relocated += 1;
                }
                None => {
                    self.assignment.remove(&item);
                    event!(
                        target: "domino_core::zone",
                        Level::WARN,
                        item = %item,
                        party = %party,
                        "item has no remaining owner; removed from partition"
                    );
                    outcome.orphaned.push(item);
                }
            }
        }

        if !outcome.is_noop() {
            event!(
                target: "domino_core::zone",
                Level::DEBUG,
                party = %party,
                relocated = outcome.relocated,
                orphaned = outcome.orphaned.len(),
                live = self.assignment.len(),
                "shrink applied"
            );
        }

        outcome
    }

    /// Takes `item` out of circulation and returns the zone it left.
    pub fn remove(&mut self, item: T) -> Result<ZoneKey, ZoneError> {
        let zone = self
            .assignment
            .remove(&item)
            .ok_or_else(|| ZoneError::UnknownItem(item.to_string()))?;
        self.detach(item, zone);
        event!(
            target: "domino_core::zone",
            Level::DEBUG,
            item = %item,
            zone = %zone,
            live = self.assignment.len(),
            "item removed"
        );
        Ok(zone)
    }

    pub fn zone_size(&self, zone: ZoneKey) -> Result<usize, ZoneError> {
        self.items_in(zone).map(<[T]>::len)
    }

    pub fn count_matching<F>(&self, zone: ZoneKey, matches: F) -> Result<usize, ZoneError>
    where
        F: Fn(&T) -> bool,
    {
        Ok(self.items_in(zone)?.iter().filter(|item| matches(item)).count())
    }

    pub fn items_in(&self, zone: ZoneKey) -> Result<&[T], ZoneError> {
        self.zones
            .get(&zone)
            .map(Vec::as_slice)
            .ok_or(ZoneError::InvalidZone(zone))
    }

    /// Live items `party` could hold. Lazy; each call walks the current state.
    pub fn items_owned_by(&self, party: Party) -> impl Iterator<Item = T> + '_ {
        self.zones
            .iter()
            .filter(move |(key, _)| key.contains(party))
            .flat_map(|(_, items)| items.iter().copied())
    }

    pub fn zone_of(&self, item: T) -> Option<ZoneKey> {
        self.assignment.get(&item).copied()
    }

    pub fn live_count(&self) -> usize {
        self.assignment.len()
    }

    /// Every valid zone with its size, empty zones included, in canonical order.
    pub fn zones(&self) -> impl Iterator<Item = (ZoneKey, usize)> + '_ {
        self.zones.iter().map(|(key, items)| (*key, items.len()))
    }

    pub fn parties(&self) -> &[Party] {
        &self.parties
    }

    pub fn full_zone(&self) -> Option<ZoneKey> {
        self.full
    }

    /// Every attribute carried by any item registered at initialization.
    pub fn attributes(&self) -> impl Iterator<Item = T::Attribute> + '_ {
        self.attributes.iter().copied()
    }

    pub fn snapshot(&self) -> ZoneSnapshot<T> {
        ZoneSnapshot::capture(self)
    }

    fn detach(&mut self, item: T, zone: ZoneKey) {
        if let Some(items) = self.zones.get_mut(&zone) {
            if let Some(index) = items.iter().position(|candidate| *candidate == item) {
                items.remove(index);
            }
        }
    }
}

/// Structural misuse of the partition. Never retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ZoneError {
    #[error("zone partition already initialized")]
    AlreadyInitialized,
    #[error("item {0} is not live in the partition")]
    UnknownItem(String),
    #[error("zone {0} is not a valid zone for this table")]
    InvalidZone(ZoneKey),
    #[error("{0} cannot be seated; zone keys hold at most {MAX_PARTIES} parties")]
    PartyOutOfRange(Party),
}
