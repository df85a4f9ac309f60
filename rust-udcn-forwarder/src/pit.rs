//! PIT (Pending Interest Table) operations.
//!
//! One [`PitEntry`] exists per distinct (name, selectors) request. Each entry
//! keeps an in-record per downstream face that asked for it and an out-record
//! per upstream face it was forwarded to, plus the handles of its unsatisfy
//! and straggler timers. Entries are addressed by a [`PitToken`] that is never
//! reused, so a timer event for an erased entry simply finds nothing.

use rust_udcn_common::{
    ndn::{Data, Interest, Nack, Name, Selectors},
    types::FaceId,
};
use std::collections::HashMap;
use std::time::Instant;

use crate::scheduler::TimerId;

/// Stable handle of a PIT entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PitToken(u64);

/// Downstream that is waiting for Data.
#[derive(Debug, Clone)]
pub struct InRecord {
    pub face: FaceId,
    pub last_nonce: u32,
    pub last_renewed: Instant,
    pub expiry: Instant,
    /// Table-wide arrival order; higher means more recent.
    pub sequence: u64,
    /// The Interest as last received from this face.
    pub interest: Interest,
}

/// Upstream the request was forwarded to.
#[derive(Debug, Clone)]
pub struct OutRecord {
    pub face: FaceId,
    pub last_nonce: u32,
    pub last_renewed: Instant,
    pub expiry: Instant,
    pub incoming_nack: Option<Nack>,
}

impl OutRecord {
    /// Still expecting an answer from this upstream.
    pub fn is_pending(&self, now: Instant) -> bool {
        self.incoming_nack.is_none() && self.expiry > now
    }
}

#[derive(Debug)]
pub struct PitEntry {
    token: PitToken,
    interest: Interest,
    in_records: Vec<InRecord>,
    out_records: Vec<OutRecord>,
    pub(crate) unsatisfy_timer: Option<TimerId>,
    pub(crate) straggler_timer: Option<TimerId>,
}

impl PitEntry {
    fn new(token: PitToken, interest: &Interest) -> Self {
        Self {
            token,
            interest: interest.clone(),
            in_records: Vec::new(),
            out_records: Vec::new(),
            unsatisfy_timer: None,
            straggler_timer: None,
        }
    }

    pub fn token(&self) -> PitToken {
        self.token
    }

    pub fn name(&self) -> &Name {
        &self.interest.name
    }

    pub fn selectors(&self) -> Selectors {
        self.interest.selectors()
    }

    /// The Interest that created this entry.
    pub fn interest(&self) -> &Interest {
        &self.interest
    }

    pub fn matches_data(&self, data: &Data) -> bool {
        self.interest.matches_data(data)
    }

    pub fn in_records(&self) -> &[InRecord] {
        &self.in_records
    }

    pub fn out_records(&self) -> &[OutRecord] {
        &self.out_records
    }

    pub fn in_record(&self, face: FaceId) -> Option<&InRecord> {
        self.in_records.iter().find(|r| r.face == face)
    }

    pub fn out_record(&self, face: FaceId) -> Option<&OutRecord> {
        self.out_records.iter().find(|r| r.face == face)
    }

    pub(crate) fn out_record_mut(&mut self, face: FaceId) -> Option<&mut OutRecord> {
        self.out_records.iter_mut().find(|r| r.face == face)
    }

    pub fn has_in_records(&self) -> bool {
        !self.in_records.is_empty()
    }

    /// Whether some downstream is still waiting at `now`.
    pub fn has_live_in_records(&self, now: Instant) -> bool {
        self.in_records.iter().any(|r| r.expiry > now)
    }

    pub fn has_pending_out_records(&self, now: Instant) -> bool {
        self.out_records.iter().any(|r| r.is_pending(now))
    }

    pub fn has_unsatisfy_timer(&self) -> bool {
        self.unsatisfy_timer.is_some()
    }

    pub fn has_straggler_timer(&self) -> bool {
        self.straggler_timer.is_some()
    }

    /// Whether `nonce` arriving on `face` means the Interest looped.
    ///
    /// That is the case when another downstream already brought the same
    /// nonce, or when the nonce is one we sent upstream ourselves. The same
    /// nonce again from the same downstream is a retransmission, not a loop.
    pub fn has_duplicate_nonce(&self, nonce: u32, face: FaceId) -> bool {
        self.in_records
            .iter()
            .any(|r| r.last_nonce == nonce && r.face != face)
            || self.out_records.iter().any(|r| r.last_nonce == nonce)
    }

    /// Latest expiry across all in-records.
    pub fn last_in_record_expiry(&self) -> Option<Instant> {
        self.in_records.iter().map(|r| r.expiry).max()
    }

    pub(crate) fn insert_or_update_in_record(
        &mut self,
        face: FaceId,
        interest: &Interest,
        now: Instant,
        sequence: u64,
    ) {
        let expiry = now + interest.lifetime();
        match self.in_records.iter_mut().find(|r| r.face == face) {
            Some(record) => {
                record.last_nonce = interest.nonce;
                record.last_renewed = now;
                record.expiry = expiry;
                record.sequence = sequence;
                record.interest = interest.clone();
            }
            None => self.in_records.push(InRecord {
                face,
                last_nonce: interest.nonce,
                last_renewed: now,
                expiry,
                sequence,
                interest: interest.clone(),
            }),
        }
    }

    pub(crate) fn delete_in_record(&mut self, face: FaceId) -> Option<InRecord> {
        let index = self.in_records.iter().position(|r| r.face == face)?;
        Some(self.in_records.remove(index))
    }

    pub(crate) fn clear_in_records(&mut self) {
        self.in_records.clear();
    }

    pub(crate) fn insert_or_update_out_record(
        &mut self,
        face: FaceId,
        interest: &Interest,
        now: Instant,
    ) {
        let expiry = now + interest.lifetime();
        match self.out_records.iter_mut().find(|r| r.face == face) {
            Some(record) => {
                record.last_nonce = interest.nonce;
                record.last_renewed = now;
                record.expiry = expiry;
                record.incoming_nack = None;
            }
            None => self.out_records.push(OutRecord {
                face,
                last_nonce: interest.nonce,
                last_renewed: now,
                expiry,
                incoming_nack: None,
            }),
        }
    }

    pub(crate) fn delete_out_record(&mut self, face: FaceId) -> Option<OutRecord> {
        let index = self.out_records.iter().position(|r| r.face == face)?;
        Some(self.out_records.remove(index))
    }

    /// Removes both records of `face`.
    ///
    /// True only when a record of `face` was dropped, none are left, and the
    /// entry is not already straggling.
    fn remove_face(&mut self, face: FaceId) -> bool {
        let before = self.in_records.len() + self.out_records.len();
        self.in_records.retain(|r| r.face != face);
        self.out_records.retain(|r| r.face != face);
        let removed = self.in_records.len() + self.out_records.len() < before;
        removed
            && self.in_records.is_empty()
            && self.out_records.is_empty()
            && self.straggler_timer.is_none()
    }
}

#[derive(Debug, Default)]
pub struct Pit {
    entries: HashMap<PitToken, PitEntry>,
    by_name: HashMap<Name, Vec<PitToken>>,
    next_token: u64,
    next_sequence: u64,
    digest_names: usize,
}

impl Pit {
    pub fn new() -> Self {
        Self::default()
    }

    /// Finds the entry for the Interest's (name, selectors), creating it if needed.
    /// The flag is true when the entry was just created.
    pub fn insert(&mut self, interest: &Interest) -> (PitToken, bool) {
        if let Some(token) = self.find(interest) {
            return (token, false);
        }

        let token = PitToken(self.next_token);
        self.next_token += 1;

        if Self::ends_with_digest(&interest.name) {
            self.digest_names += 1;
        }
        self.entries.insert(token, PitEntry::new(token, interest));
        self.by_name
            .entry(interest.name.clone())
            .or_default()
            .push(token);
        (token, true)
    }

    /// Exact lookup by (name, selectors).
    pub fn find(&self, interest: &Interest) -> Option<PitToken> {
        let selectors = interest.selectors();
        self.by_name.get(&interest.name)?.iter().copied().find(|token| {
            self.entries
                .get(token)
                .map_or(false, |entry| entry.selectors() == selectors)
        })
    }

    /// Every entry that `data` satisfies, in creation order.
    pub fn find_all_data_matches(&self, data: &Data) -> Vec<PitToken> {
        let mut candidates: Vec<PitToken> = (0..=data.name.len())
            .filter_map(|len| self.by_name.get(&data.name.prefix(len)))
            .flatten()
            .copied()
            .collect();

        if self.digest_names > 0 {
            if let Some(tokens) = self.by_name.get(&data.full_name()) {
                candidates.extend(tokens.iter().copied());
            }
        }

        candidates.retain(|token| {
            self.entries
                .get(token)
                .map_or(false, |entry| entry.matches_data(data))
        });
        candidates.sort();
        candidates
    }

    pub fn get(&self, token: PitToken) -> Option<&PitEntry> {
        self.entries.get(&token)
    }

    pub fn get_mut(&mut self, token: PitToken) -> Option<&mut PitEntry> {
        self.entries.get_mut(&token)
    }

    pub fn contains(&self, token: PitToken) -> bool {
        self.entries.contains_key(&token)
    }

    pub fn erase(&mut self, token: PitToken) -> Option<PitEntry> {
        let entry = self.entries.remove(&token)?;
        if let Some(tokens) = self.by_name.get_mut(entry.name()) {
            tokens.retain(|t| *t != token);
            if tokens.is_empty() {
                self.by_name.remove(entry.name());
            }
        }
        if Self::ends_with_digest(entry.name()) {
            self.digest_names -= 1;
        }
        Some(entry)
    }

    /// Hands out the next in-record sequence number.
    pub(crate) fn next_sequence(&mut self) -> u64 {
        self.next_sequence += 1;
        self.next_sequence
    }

    /// Removes every record of `face`; returns the entries it left with no records.
    pub(crate) fn remove_face(&mut self, face: FaceId) -> Vec<PitToken> {
        let mut emptied: Vec<PitToken> = self
            .entries
            .values_mut()
            .filter_map(|entry| entry.remove_face(face).then_some(entry.token))
            .collect();
        emptied.sort();
        emptied
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PitEntry> {
        self.entries.values()
    }

    fn ends_with_digest(name: &Name) -> bool {
        name.last().map_or(false, |c| c.is_implicit_digest())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use std::time::Duration;

    fn interest(name: &str, nonce: u32) -> Interest {
        Interest::new(Name::from_string(name)).with_nonce(nonce)
    }

    #[test]
    fn test_one_entry_per_name_and_selectors() {
        let mut pit = Pit::new();
        let (a, new_a) = pit.insert(&interest("/a", 1));
        let (again, new_again) = pit.insert(&interest("/a", 2));
        let (fresh, new_fresh) = pit.insert(&interest("/a", 3).with_must_be_fresh(true));

        assert!(new_a);
        assert!(!new_again);
        assert_eq!(a, again);
        assert!(new_fresh);
        assert_ne!(a, fresh);
        assert_eq!(pit.len(), 2);
        assert_eq!(pit.find(&interest("/a", 9)), Some(a));
    }

    #[test]
    fn test_data_matches_selector_variants() {
        let mut pit = Pit::new();
        let (exact, _) = pit.insert(&interest("/v/1", 1));
        let (prefix, _) = pit.insert(&interest("/v", 2).with_can_be_prefix(true));
        let (fresh, _) = pit.insert(&interest("/v/1", 3).with_must_be_fresh(true));
        let (no_prefix, _) = pit.insert(&interest("/v", 4));
        let (_other, _) = pit.insert(&interest("/w", 5).with_can_be_prefix(true));

        let data = Data::new(Name::from_string("/v/1"), Bytes::from_static(b"x"));
        let matches = pit.find_all_data_matches(&data);

        assert_eq!(matches, vec![exact, prefix, fresh]);
        assert!(!matches.contains(&no_prefix));
    }

    #[test]
    fn test_data_matches_full_name() {
        let mut pit = Pit::new();
        let data = Data::new(Name::from_string("/doc"), Bytes::from_static(b"body"));
        let (token, _) = pit.insert(&Interest::new(data.full_name()));

        assert_eq!(pit.find_all_data_matches(&data), vec![token]);

        let forged = Data::new(Name::from_string("/doc"), Bytes::from_static(b"forged"));
        assert!(pit.find_all_data_matches(&forged).is_empty());

        pit.erase(token);
        assert!(pit.find_all_data_matches(&data).is_empty());
    }

    #[test]
    fn test_duplicate_nonce_detection() {
        let now = Instant::now();
        let mut pit = Pit::new();
        let (token, _) = pit.insert(&interest("/a", 1));
        let entry = pit.get_mut(token).unwrap();
        entry.insert_or_update_in_record(FaceId(256), &interest("/a", 1), now, 1);
        entry.insert_or_update_out_record(FaceId(258), &interest("/a", 1), now);

        assert!(!entry.has_duplicate_nonce(1, FaceId(256)));
        assert!(entry.has_duplicate_nonce(1, FaceId(257)));
        assert!(entry.has_duplicate_nonce(1, FaceId(258)));
        assert!(!entry.has_duplicate_nonce(2, FaceId(257)));
    }

    #[test]
    fn test_in_record_refresh_keeps_one_record_per_face() {
        let now = Instant::now();
        let mut pit = Pit::new();
        let (token, _) = pit.insert(&interest("/a", 1));
        let entry = pit.get_mut(token).unwrap();

        entry.insert_or_update_in_record(FaceId(256), &interest("/a", 1).with_lifetime(100), now, 1);
        entry.insert_or_update_in_record(FaceId(257), &interest("/a", 2).with_lifetime(500), now, 2);
        entry.insert_or_update_in_record(FaceId(256), &interest("/a", 3).with_lifetime(200), now, 3);

        assert_eq!(entry.in_records().len(), 2);
        let record = entry.in_record(FaceId(256)).unwrap();
        assert_eq!(record.last_nonce, 3);
        assert_eq!(record.sequence, 3);
        assert_eq!(entry.last_in_record_expiry(), Some(now + Duration::from_millis(500)));
    }

    #[test]
    fn test_pending_out_records() {
        let now = Instant::now();
        let mut pit = Pit::new();
        let (token, _) = pit.insert(&interest("/a", 1));
        let entry = pit.get_mut(token).unwrap();
        entry.insert_or_update_out_record(FaceId(256), &interest("/a", 1).with_lifetime(100), now);

        assert!(entry.has_pending_out_records(now));
        assert!(!entry.has_pending_out_records(now + Duration::from_millis(100)));

        let nack = Nack::new(interest("/a", 1), rust_udcn_common::ndn::NackReason::Congestion);
        entry.out_record_mut(FaceId(256)).unwrap().incoming_nack = Some(nack);
        assert!(!entry.has_pending_out_records(now));
    }

    #[test]
    fn test_remove_face_reports_emptied_entries() {
        let now = Instant::now();
        let mut pit = Pit::new();
        let (lonely, _) = pit.insert(&interest("/a", 1));
        let (shared, _) = pit.insert(&interest("/b", 2));
        pit.get_mut(lonely)
            .unwrap()
            .insert_or_update_in_record(FaceId(256), &interest("/a", 1), now, 1);
        let entry = pit.get_mut(shared).unwrap();
        entry.insert_or_update_in_record(FaceId(256), &interest("/b", 2), now, 2);
        entry.insert_or_update_in_record(FaceId(257), &interest("/b", 3), now, 3);

        assert_eq!(pit.remove_face(FaceId(256)), vec![lonely]);
        assert_eq!(pit.get(shared).unwrap().in_records().len(), 1);
    }

    #[test]
    fn test_remove_face_skips_untouched_entries() {
        let now = Instant::now();
        let mut pit = Pit::new();
        let (recordless, _) = pit.insert(&interest("/a", 1));
        let (straggling, _) = pit.insert(&interest("/b", 2));
        let entry = pit.get_mut(straggling).unwrap();
        entry.insert_or_update_out_record(FaceId(256), &interest("/b", 2), now);
        let mut scheduler = crate::scheduler::Scheduler::new();
        entry.straggler_timer = Some(scheduler.schedule(now, ()));

        assert!(pit.remove_face(FaceId(257)).is_empty());
        assert!(pit.remove_face(FaceId(256)).is_empty());
        assert!(pit.contains(recordless));
        assert!(pit.get(straggling).unwrap().out_records().is_empty());
    }
}
