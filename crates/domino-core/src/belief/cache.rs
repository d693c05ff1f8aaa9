//! Bounded cache of estimates keyed by the full belief state.

use super::tracker::Belief;
use crate::inference::{Estimate, EstimateError, ProbabilityEstimator};
use crate::model::hands::HandTargets;
use crate::model::item::Item;
use crate::zone::ZoneSnapshot;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

/// Everything an estimate depends on: zone sizes, attribute counts, which zone
/// each live item sits in, and the hand targets.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EstimateKey<T: Item> {
    snapshot: ZoneSnapshot<T>,
    hands: HandTargets,
}

impl<T: Item> EstimateKey<T> {
    pub fn new(snapshot: ZoneSnapshot<T>, hands: HandTargets) -> Self {
        Self { snapshot, hands }
    }

    pub fn snapshot(&self) -> &ZoneSnapshot<T> {
        &self.snapshot
    }

    pub fn hands(&self) -> &HandTargets {
        &self.hands
    }
}

/// Stores finished estimates with an LRU eviction policy.
#[derive(Debug)]
pub struct EstimateCache<T: Item> {
    entries: HashMap<EstimateKey<T>, Arc<Estimate<T>>>,
    order: VecDeque<EstimateKey<T>>,
    capacity: usize,
    hits: u64,
    misses: u64,
}

impl<T: Item> EstimateCache<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: HashMap::new(),
            order: VecDeque::new(),
            capacity,
            hits: 0,
            misses: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }

    pub fn get(&mut self, key: &EstimateKey<T>) -> Option<Arc<Estimate<T>>> {
        let found = self.entries.get(key).cloned();
        if found.is_some() {
            self.touch(key);
        }
        found
    }

    pub fn insert(&mut self, key: EstimateKey<T>, estimate: Arc<Estimate<T>>) {
        if self.capacity == 0 {
            return;
        }
        self.touch(&key);
        self.entries.insert(key, estimate);
        self.evict_if_needed();
    }

    /// Returns the cached estimate for `belief`'s current state, running a pass on a miss.
    pub fn get_or_compute(&mut self, belief: &Belief<T>) -> Result<Arc<Estimate<T>>, EstimateError> {
        let key = belief.cache_key();
        if let Some(estimate) = self.get(&key) {
            self.hits += 1;
            return Ok(estimate);
        }
        self.misses += 1;
        let estimate = Arc::new(ProbabilityEstimator::new(key.snapshot(), key.hands()).run()?);
        self.insert(key, Arc::clone(&estimate));
        Ok(estimate)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }

    fn touch(&mut self, key: &EstimateKey<T>) {
        self.order.retain(|existing| existing != key);
        self.order.push_back(key.clone());
    }

    fn evict_if_needed(&mut self) {
        while self.capacity > 0 && self.order.len() > self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.entries.remove(&oldest);
            }
        }
    }
}
