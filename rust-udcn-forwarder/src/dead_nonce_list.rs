//! Dead Nonce List: (name, nonce) pairs of requests that left the PIT.
//!
//! An Interest whose pair is still listed is treated as looping. Entries are
//! keyed by a 64-bit hash of the pair, so a false positive is possible but
//! vanishingly rare. Each entry lives for the list's lifetime; the oldest
//! entries are also evicted when the list reaches its capacity.

use rust_udcn_common::ndn::Name;
use std::collections::hash_map::DefaultHasher;
use std::collections::{HashMap, VecDeque};
use std::hash::{Hash, Hasher};
use std::time::{Duration, Instant};

#[derive(Debug)]
pub struct DeadNonceList {
    lifetime: Duration,
    capacity: usize,
    entries: HashMap<u64, Instant>,
    // insertion order, used for expiry and capacity eviction
    queue: VecDeque<(Instant, u64)>,
}

impl DeadNonceList {
    pub fn new(lifetime: Duration, capacity: usize) -> Self {
        Self {
            lifetime,
            capacity: capacity.max(1),
            entries: HashMap::new(),
            queue: VecDeque::new(),
        }
    }

    /// How long an entry is remembered.
    pub fn lifetime(&self) -> Duration {
        self.lifetime
    }

    pub fn has(&self, name: &Name, nonce: u32, now: Instant) -> bool {
        self.entries
            .get(&Self::key(name, nonce))
            .map_or(false, |expiry| *expiry > now)
    }

    pub fn add(&mut self, name: &Name, nonce: u32, now: Instant) {
        self.evict_expired(now);

        let key = Self::key(name, nonce);
        let expiry = now + self.lifetime;
        self.entries.insert(key, expiry);
        self.queue.push_back((expiry, key));

        while self.entries.len() > self.capacity {
            match self.queue.pop_front() {
                Some((expiry, key)) => self.forget(key, expiry),
                None => break,
            }
        }
    }

    /// Drops every entry whose lifetime has elapsed at `now`.
    pub fn evict_expired(&mut self, now: Instant) {
        while let Some(&(expiry, key)) = self.queue.front() {
            if expiry > now {
                break;
            }
            self.queue.pop_front();
            self.forget(key, expiry);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    // A re-added pair has a newer expiry; only the matching queue slot may remove it.
    fn forget(&mut self, key: u64, expiry: Instant) {
        if self.entries.get(&key) == Some(&expiry) {
            self.entries.remove(&key);
        }
    }

    fn key(name: &Name, nonce: u32) -> u64 {
        let mut hasher = DefaultHasher::new();
        name.hash(&mut hasher);
        nonce.hash(&mut hasher);
        hasher.finish()
    }
}
