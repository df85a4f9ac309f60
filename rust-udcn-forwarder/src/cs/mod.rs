//! Content Store.
//!
//! Entries are kept in a `BTreeMap` keyed by Data name, so every name under a
//! prefix sits in one contiguous range and a CanBePrefix lookup is a range
//! scan. Capacity is enforced on every insert by asking the replacement
//! policy for victims until the store is back within its limit.

pub mod policy;

use log::{debug, trace};
use rust_udcn_common::ndn::{Data, Interest, Name};
use std::collections::BTreeMap;
use std::time::{Duration, Instant};

pub use policy::{CsPolicy, CsPolicyKind, LatencyWeightedPolicy, LruPolicy};

/// A cached Data packet and what the store knows about it.
#[derive(Debug, Clone)]
pub struct CsEntry {
    data: Data,
    arrived_at: Instant,
    stale_at: Option<Instant>,
    latency: Duration,
    unsolicited: bool,
}

impl CsEntry {
    pub fn new(data: Data, arrived_at: Instant, latency: Duration, unsolicited: bool) -> Self {
        let stale_at = data.freshness_period().map(|period| arrived_at + period);
        Self {
            data,
            arrived_at,
            stale_at,
            latency,
            unsolicited,
        }
    }

    pub fn data(&self) -> &Data {
        &self.data
    }

    pub fn arrived_at(&self) -> Instant {
        self.arrived_at
    }

    /// Round-trip time observed when the Data was fetched.
    pub fn latency(&self) -> Duration {
        self.latency
    }

    pub fn is_unsolicited(&self) -> bool {
        self.unsolicited
    }

    /// Data without a freshness period never goes stale.
    pub fn is_fresh(&self, now: Instant) -> bool {
        self.stale_at.map_or(true, |stale_at| now < stale_at)
    }

    fn can_satisfy(&self, interest: &Interest, now: Instant) -> bool {
        interest.matches_data(&self.data) && (!interest.must_be_fresh || self.is_fresh(now))
    }
}

pub struct ContentStore {
    entries: BTreeMap<Name, CsEntry>,
    limit: usize,
    policy: Box<dyn CsPolicy>,
}

impl ContentStore {
    pub fn new(limit: usize, policy: Box<dyn CsPolicy>) -> Self {
        Self {
            entries: BTreeMap::new(),
            limit,
            policy,
        }
    }

    /// Stores `data`, replacing any entry with the same name.
    ///
    /// Returns false when the store has no capacity at all.
    pub fn insert(&mut self, data: &Data, now: Instant, latency: Duration, unsolicited: bool) -> bool {
        if self.limit == 0 {
            return false;
        }

        let name = data.name.clone();
        match self.entries.get_mut(&name) {
            Some(existing) => {
                let unsolicited = existing.unsolicited && unsolicited;
                *existing = CsEntry::new(data.clone(), now, latency, unsolicited);
                self.policy.after_refresh(&name, existing);
                trace!("CS refresh {}", name);
            }
            None => {
                let entry = CsEntry::new(data.clone(), now, latency, unsolicited);
                self.policy.after_insert(&name, &entry);
                self.entries.insert(name.clone(), entry);
                trace!("CS insert {}", name);
            }
        }

        self.evict_entries();
        true
    }

    /// Looks up a Data packet that satisfies `interest`.
    ///
    /// A hit counts as a use for the replacement policy.
    pub fn find(&mut self, interest: &Interest, now: Instant) -> Option<Data> {
        let name = self.lookup(interest, now)?;
        self.policy.before_use(&name);
        self.entries.get(&name).map(|entry| entry.data.clone())
    }

    fn lookup(&self, interest: &Interest, now: Instant) -> Option<Name> {
        let wanted = &interest.name;

        // Full name: the entry lives under the name without the digest.
        if wanted.last().map_or(false, |c| c.is_implicit_digest()) {
            let name = wanted.prefix(wanted.len() - 1);
            if let Some(entry) = self.entries.get(&name) {
                if entry.can_satisfy(interest, now) {
                    return Some(name);
                }
            }
        }

        if !interest.can_be_prefix {
            return self
                .entries
                .get(wanted)
                .filter(|entry| entry.can_satisfy(interest, now))
                .map(|_| wanted.clone());
        }

        self.entries
            .range(wanted.clone()..)
            .take_while(|(name, _)| wanted.is_prefix_of(name))
            .find(|(_, entry)| entry.can_satisfy(interest, now))
            .map(|(name, _)| name.clone())
    }

    pub fn get(&self, name: &Name) -> Option<&CsEntry> {
        self.entries.get(name)
    }

    pub fn erase(&mut self, name: &Name) -> bool {
        if !self.entries.contains_key(name) {
            return false;
        }
        self.policy.before_erase(name);
        self.entries.remove(name);
        true
    }

    /// Changes the capacity, evicting right away if the store is now too big.
    pub fn set_limit(&mut self, limit: usize) {
        self.limit = limit;
        self.evict_entries();
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn policy_name(&self) -> &'static str {
        self.policy.name()
    }

    fn evict_entries(&mut self) {
        while self.entries.len() > self.limit {
            let Some(victim) = self.policy.select_victim() else {
                break;
            };
            if self.entries.remove(&victim).is_some() {
                debug!("CS evict {} ({} policy)", victim, self.policy.name());
            }
        }
    }
}

impl std::fmt::Debug for ContentStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentStore")
            .field("len", &self.entries.len())
            .field("limit", &self.limit)
            .field("policy", &self.policy.name())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    fn data(name: &str) -> Data {
        Data::new(Name::from_string(name), Bytes::from_static(b"payload"))
    }

    fn lru_store(limit: usize) -> ContentStore {
        ContentStore::new(limit, Box::new(LruPolicy::new()))
    }

    fn interest(name: &str) -> Interest {
        Interest::new(Name::from_string(name))
    }

    #[test]
    fn test_capacity_one_evicts_previous() {
        let now = Instant::now();
        let mut cs = lru_store(1);
        cs.insert(&data("/A"), now, Duration::ZERO, false);
        cs.insert(&data("/B"), now, Duration::ZERO, false);

        assert_eq!(cs.len(), 1);
        assert!(cs.find(&interest("/A"), now).is_none());
        assert_eq!(cs.find(&interest("/B"), now), Some(data("/B")));
    }

    #[test]
    fn test_hit_protects_from_eviction() {
        let now = Instant::now();
        let mut cs = lru_store(2);
        cs.insert(&data("/a"), now, Duration::ZERO, false);
        cs.insert(&data("/b"), now, Duration::ZERO, false);
        assert!(cs.find(&interest("/a"), now).is_some());
        cs.insert(&data("/c"), now, Duration::ZERO, false);

        assert!(cs.get(&Name::from_string("/a")).is_some());
        assert!(cs.get(&Name::from_string("/b")).is_none());
        assert!(cs.len() <= cs.limit());
    }

    #[test]
    fn test_refresh_replaces_without_growing() {
        let now = Instant::now();
        let mut cs = lru_store(4);
        cs.insert(&data("/a"), now, Duration::ZERO, true);
        let newer = data("/a").with_freshness_period(10);
        cs.insert(&newer, now, Duration::ZERO, false);

        assert_eq!(cs.len(), 1);
        let entry = cs.get(&Name::from_string("/a")).unwrap();
        assert_eq!(entry.data(), &newer);
        assert!(!entry.is_unsolicited());
    }

    #[test]
    fn test_prefix_lookup() {
        let now = Instant::now();
        let mut cs = lru_store(8);
        cs.insert(&data("/video/a/1"), now, Duration::ZERO, false);
        cs.insert(&data("/videos"), now, Duration::ZERO, false);

        let prefix = interest("/video").with_can_be_prefix(true);
        assert_eq!(cs.find(&prefix, now).unwrap().name, Name::from_string("/video/a/1"));
        assert!(cs.find(&interest("/video"), now).is_none());
        assert!(cs.find(&interest("/vid").with_can_be_prefix(true), now).is_none());
    }

    #[test]
    fn test_must_be_fresh() {
        let now = Instant::now();
        let mut cs = lru_store(8);
        cs.insert(&data("/stale").with_freshness_period(0), now, Duration::ZERO, false);
        cs.insert(&data("/fresh").with_freshness_period(1000), now, Duration::ZERO, false);
        cs.insert(&data("/forever"), now, Duration::ZERO, false);

        assert!(cs.find(&interest("/stale").with_must_be_fresh(true), now).is_none());
        assert!(cs.find(&interest("/stale"), now).is_some());
        assert!(cs.find(&interest("/fresh").with_must_be_fresh(true), now).is_some());
        let later = now + Duration::from_millis(1000);
        assert!(cs.find(&interest("/fresh").with_must_be_fresh(true), later).is_none());
        assert!(cs.find(&interest("/forever").with_must_be_fresh(true), later).is_some());
    }

    #[test]
    fn test_full_name_lookup() {
        let now = Instant::now();
        let mut cs = lru_store(8);
        let stored = data("/doc");
        cs.insert(&stored, now, Duration::ZERO, false);

        assert_eq!(cs.find(&Interest::new(stored.full_name()), now), Some(stored));
        let other = Data::new(Name::from_string("/doc"), Bytes::from_static(b"other"));
        assert!(cs.find(&Interest::new(other.full_name()), now).is_none());
    }

    #[test]
    fn test_zero_limit_and_shrinking() {
        let now = Instant::now();
        let mut cs = lru_store(0);
        assert!(!cs.insert(&data("/a"), now, Duration::ZERO, false));
        assert!(cs.is_empty());

        cs.set_limit(3);
        for name in ["/a", "/b", "/c"] {
            cs.insert(&data(name), now, Duration::ZERO, false);
        }
        cs.set_limit(1);
        assert_eq!(cs.len(), 1);
        assert!(cs.get(&Name::from_string("/c")).is_some());
    }

    #[test]
    fn test_erase() {
        let now = Instant::now();
        let mut cs = lru_store(2);
        cs.insert(&data("/a"), now, Duration::ZERO, false);
        cs.insert(&data("/b"), now, Duration::ZERO, false);
        assert!(cs.erase(&Name::from_string("/a")));
        assert!(!cs.erase(&Name::from_string("/a")));

        cs.insert(&data("/c"), now, Duration::ZERO, false);
        assert_eq!(cs.len(), 2);
        assert!(cs.get(&Name::from_string("/b")).is_some());
    }
}
