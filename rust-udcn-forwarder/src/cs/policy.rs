//! Content store replacement policies.
//!
//! The store tells its policy about every insert, refresh, use and erase, and
//! asks it for a victim while it is over capacity. A policy keeps its own
//! bookkeeping and forgets a name as soon as it hands it out as a victim.

use rust_udcn_common::ndn::Name;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::time::Instant;

use super::CsEntry;

pub trait CsPolicy: Send {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// A new entry was stored under `name`.
    fn after_insert(&mut self, name: &Name, entry: &CsEntry);

    /// An existing entry was replaced by a newer copy of the same Data.
    fn after_refresh(&mut self, name: &Name, entry: &CsEntry);

    /// The entry is about to answer an Interest.
    fn before_use(&mut self, name: &Name);

    /// The entry is about to be removed for a reason other than eviction.
    fn before_erase(&mut self, name: &Name);

    /// Picks the next entry to evict and stops tracking it.
    fn select_victim(&mut self) -> Option<Name>;
}

/// Replacement policy selection, as found in the forwarder configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum CsPolicyKind {
    Lru,
    LatencyWeighted {
        #[serde(default = "default_latency_weight")]
        weight: f64,
    },
}

fn default_latency_weight() -> f64 {
    1.0
}

/// Largest accepted latency weight.
pub const MAX_LATENCY_WEIGHT: f64 = 1000.0;

impl Default for CsPolicyKind {
    fn default() -> Self {
        CsPolicyKind::Lru
    }
}

impl CsPolicyKind {
    pub fn build(&self) -> Box<dyn CsPolicy> {
        match self {
            CsPolicyKind::Lru => Box::new(LruPolicy::new()),
            CsPolicyKind::LatencyWeighted { weight } => {
                Box::new(LatencyWeightedPolicy::new(*weight))
            }
        }
    }
}

/// Least recently used: inserts, refreshes and hits move an entry to the back
/// of the queue; victims come from the front.
#[derive(Debug, Default)]
pub struct LruPolicy {
    stamps: HashMap<Name, u64>,
    queue: BTreeMap<u64, Name>,
    next_stamp: u64,
}

impl LruPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    fn touch(&mut self, name: &Name) {
        let stamp = self.next_stamp;
        self.next_stamp += 1;
        if let Some(old) = self.stamps.insert(name.clone(), stamp) {
            self.queue.remove(&old);
        }
        self.queue.insert(stamp, name.clone());
    }
}

impl CsPolicy for LruPolicy {
    fn name(&self) -> &'static str {
        "lru"
    }

    fn after_insert(&mut self, name: &Name, _entry: &CsEntry) {
        self.touch(name);
    }

    fn after_refresh(&mut self, name: &Name, _entry: &CsEntry) {
        self.touch(name);
    }

    fn before_use(&mut self, name: &Name) {
        // Only names we already track get promoted.
        if self.stamps.contains_key(name) {
            self.touch(name);
        }
    }

    fn before_erase(&mut self, name: &Name) {
        if let Some(stamp) = self.stamps.remove(name) {
            self.queue.remove(&stamp);
        }
    }

    fn select_victim(&mut self) -> Option<Name> {
        let (_, name) = self.queue.pop_first()?;
        self.stamps.remove(&name);
        Some(name)
    }
}

/// Evicts the entry with the smallest `arrival time + weight * latency`.
///
/// Data that took long to fetch is kept around longer than Data that arrived
/// at the same time from a nearby producer. Hits do not change the score.
#[derive(Debug)]
pub struct LatencyWeightedPolicy {
    weight: f64,
    scores: HashMap<Name, (Instant, u64)>,
    queue: BTreeMap<(Instant, u64), Name>,
    next_seq: u64,
}

impl LatencyWeightedPolicy {
    /// `weight` is clamped to `0..=MAX_LATENCY_WEIGHT`; NaN counts as 0.
    pub fn new(weight: f64) -> Self {
        let weight = if weight.is_nan() {
            0.0
        } else {
            weight.clamp(0.0, MAX_LATENCY_WEIGHT)
        };
        Self {
            weight,
            scores: HashMap::new(),
            queue: BTreeMap::new(),
            next_seq: 0,
        }
    }

    fn score(&mut self, name: &Name, entry: &CsEntry) {
        let key = (
            entry.arrived_at() + entry.latency().mul_f64(self.weight),
            self.next_seq,
        );
        self.next_seq += 1;
        if let Some(old) = self.scores.insert(name.clone(), key) {
            self.queue.remove(&old);
        }
        self.queue.insert(key, name.clone());
    }
}

impl CsPolicy for LatencyWeightedPolicy {
    fn name(&self) -> &'static str {
        "latency-weighted"
    }

    fn after_insert(&mut self, name: &Name, entry: &CsEntry) {
        self.score(name, entry);
    }

    fn after_refresh(&mut self, name: &Name, entry: &CsEntry) {
        self.score(name, entry);
    }

    fn before_use(&mut self, _name: &Name) {}

    fn before_erase(&mut self, name: &Name) {
        if let Some(key) = self.scores.remove(name) {
            self.queue.remove(&key);
        }
    }

    fn select_victim(&mut self) -> Option<Name> {
        let (_, name) = self.queue.pop_first()?;
        self.scores.remove(&name);
        Some(name)
    }
}
