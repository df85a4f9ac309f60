//! Forwarding Information Base lookup.
//!
//! The pipelines only need [`FibLookup::longest_prefix_match`]; how routes get
//! there is up to the routing layer. [`Fib`] is a plain name-keyed table good
//! enough for static routes and tests.

use log::{debug, info};
use rust_udcn_common::{ndn::Name, types::FaceId};
use std::collections::BTreeMap;

/// Next hop information
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NextHop {
    pub face: FaceId,
    /// Cost metric for this next hop; lower is preferred.
    pub cost: u32,
}

pub trait FibLookup: Send {
    /// Next hops of the longest registered prefix of `name`, ordered by cost.
    /// An empty vector means no route.
    fn longest_prefix_match(&self, name: &Name) -> Vec<NextHop>;
}

#[derive(Debug, Default)]
pub struct Fib {
    entries: BTreeMap<Name, Vec<NextHop>>,
}

impl Fib {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a next hop under `prefix`, or updates its cost if already present.
    pub fn add_next_hop(&mut self, prefix: &Name, face: FaceId, cost: u32) {
        let next_hops = self.entries.entry(prefix.clone()).or_default();
        match next_hops.iter_mut().find(|nh| nh.face == face) {
            Some(existing) => existing.cost = cost,
            None => next_hops.push(NextHop { face, cost }),
        }
        next_hops.sort_by_key(|nh| (nh.cost, nh.face));
        info!("Added FIB next hop {} -> {} cost {}", prefix, face, cost);
    }

    pub fn remove_next_hop(&mut self, prefix: &Name, face: FaceId) -> bool {
        let Some(next_hops) = self.entries.get_mut(prefix) else {
            return false;
        };
        let before = next_hops.len();
        next_hops.retain(|nh| nh.face != face);
        let removed = next_hops.len() != before;
        if next_hops.is_empty() {
            self.entries.remove(prefix);
        }
        removed
    }

    /// Drops every next hop through `face`.
    pub fn remove_face(&mut self, face: FaceId) {
        self.entries.retain(|_, next_hops| {
            next_hops.retain(|nh| nh.face != face);
            !next_hops.is_empty()
        });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FibLookup for Fib {
    fn longest_prefix_match(&self, name: &Name) -> Vec<NextHop> {
        for len in (0..=name.len()).rev() {
            if let Some(next_hops) = self.entries.get(&name.prefix(len)) {
                debug!("FIB lookup for {}: found {} next hops", name, next_hops.len());
                return next_hops.clone();
            }
        }
        debug!("FIB lookup for {}: no route found", name);
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_longest_prefix_wins() {
        let mut fib = Fib::new();
        fib.add_next_hop(&Name::new(), FaceId(256), 10);
        fib.add_next_hop(&Name::from_string("/a"), FaceId(257), 5);
        fib.add_next_hop(&Name::from_string("/a/b"), FaceId(258), 1);

        let hops = fib.longest_prefix_match(&Name::from_string("/a/b/c"));
        assert_eq!(hops, vec![NextHop { face: FaceId(258), cost: 1 }]);

        let hops = fib.longest_prefix_match(&Name::from_string("/a/x"));
        assert_eq!(hops[0].face, FaceId(257));

        let hops = fib.longest_prefix_match(&Name::from_string("/z"));
        assert_eq!(hops[0].face, FaceId(256));
    }

    #[test]
    fn test_next_hops_sorted_by_cost() {
        let mut fib = Fib::new();
        let prefix = Name::from_string("/p");
        fib.add_next_hop(&prefix, FaceId(256), 30);
        fib.add_next_hop(&prefix, FaceId(257), 10);
        fib.add_next_hop(&prefix, FaceId(258), 20);
        fib.add_next_hop(&prefix, FaceId(256), 5);

        let faces: Vec<FaceId> = fib
            .longest_prefix_match(&prefix)
            .iter()
            .map(|nh| nh.face)
            .collect();
        assert_eq!(faces, vec![FaceId(256), FaceId(257), FaceId(258)]);
    }

    #[test]
    fn test_removal() {
        let mut fib = Fib::new();
        let prefix = Name::from_string("/p");
        fib.add_next_hop(&prefix, FaceId(256), 1);
        fib.add_next_hop(&Name::from_string("/q"), FaceId(256), 1);
        fib.add_next_hop(&Name::from_string("/q"), FaceId(257), 1);

        assert!(fib.remove_next_hop(&prefix, FaceId(256)));
        assert!(!fib.remove_next_hop(&prefix, FaceId(256)));
        assert!(fib.longest_prefix_match(&prefix).is_empty());

        fib.remove_face(FaceId(257));
        assert_eq!(fib.len(), 1);
    }
}
