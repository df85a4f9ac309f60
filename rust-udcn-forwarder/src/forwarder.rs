//! The forwarding pipelines.
//!
//! [`Forwarder`] owns the face table, PIT, content store, Dead Nonce List and
//! timer scheduler. Each packet arrival and each due timer runs its pipeline
//! to completion through `&mut self`, so none of the tables need locking.
//! Timers are only armed through `set_unsatisfy_timer` and
//! `set_straggler_timer`, which cancel both of an entry's timers
//! first, and an entry only leaves the PIT through `finalize`.

use log::{debug, error, info, trace, warn};
use rust_udcn_common::{
    metrics::ForwarderCounters,
    ndn::{Data, Interest, Nack, NackReason},
    tags::Tags,
    types::{FaceId, FaceScope, LinkType},
    Result,
};
use std::time::{Duration, Instant};

use crate::clock::Clock;
use crate::config::{ForwarderConfig, SatisfyPolicy};
use crate::cs::ContentStore;
use crate::dead_nonce_list::DeadNonceList;
use crate::face::{FaceSender, FaceTable};
use crate::fib::{Fib, FibLookup};
use crate::pit::{Pit, PitEntry, PitToken};
use crate::scheduler::{Scheduler, TimerId};
use crate::strategy::{BestRouteStrategy, Strategy, StrategyAction, StrategyContext};
use crate::unsolicited::{UnsolicitedDataDecision, UnsolicitedDataPolicy};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TimerEvent {
    Unsatisfy(PitToken),
    Straggler {
        token: PitToken,
        satisfied: bool,
        data_freshness: Option<Duration>,
    },
}

pub struct Forwarder {
    config: ForwarderConfig,
    faces: FaceTable,
    pit: Pit,
    cs: ContentStore,
    dnl: DeadNonceList,
    scheduler: Scheduler<TimerEvent>,
    fib: Box<dyn FibLookup>,
    strategy: Box<dyn Strategy>,
    unsolicited: Box<dyn UnsolicitedDataPolicy>,
    clock: Box<dyn Clock>,
    counters: ForwarderCounters,
}

impl Forwarder {
    /// Creates a forwarder with an empty [`Fib`] and [`BestRouteStrategy`].
    pub fn new(config: ForwarderConfig, clock: Box<dyn Clock>) -> Self {
        info!(
            "Creating forwarder: CS capacity {} ({:?}), straggler {}ms, satisfy policy {:?}",
            config.cs_capacity, config.cs_policy, config.straggler_time_ms, config.satisfy_policy
        );
        Self {
            cs: ContentStore::new(config.cs_capacity, config.cs_policy.build()),
            dnl: DeadNonceList::new(config.dead_nonce_lifetime(), config.dead_nonce_capacity),
            unsolicited: Box::new(config.unsolicited_data),
            faces: FaceTable::new(),
            pit: Pit::new(),
            scheduler: Scheduler::new(),
            fib: Box::new(Fib::new()),
            strategy: Box::new(BestRouteStrategy::new()),
            clock,
            counters: ForwarderCounters::new(),
            config,
        }
    }

    pub fn set_fib(&mut self, fib: Box<dyn FibLookup>) {
        self.fib = fib;
    }

    pub fn set_strategy(&mut self, strategy: Box<dyn Strategy>) {
        info!("Forwarding strategy set to {}", strategy.name());
        self.strategy = strategy;
    }

    pub fn set_unsolicited_policy(&mut self, policy: Box<dyn UnsolicitedDataPolicy>) {
        self.unsolicited = policy;
    }

    pub fn add_face(
        &mut self,
        link_type: LinkType,
        scope: FaceScope,
        sender: Box<dyn FaceSender>,
    ) -> Result<FaceId> {
        let id = self.faces.add(link_type, scope, sender)?;
        info!("Added face {} ({:?}, {:?})", id, link_type, scope);
        Ok(id)
    }

    /// Removes a face and every PIT record that refers to it.
    ///
    /// Entries left without any record are finalized right away.
    pub fn remove_face(&mut self, face: FaceId) -> bool {
        if self.faces.remove(face).is_none() {
            return false;
        }
        info!("Removed face {}", face);

        for token in self.pit.remove_face(face) {
            self.finalize(token, false, None);
        }
        true
    }

    pub fn set_face_valid(&mut self, face: FaceId, valid: bool) -> Result<()> {
        self.faces.set_valid(face, valid)
    }

    pub fn config(&self) -> &ForwarderConfig {
        &self.config
    }

    pub fn faces(&self) -> &FaceTable {
        &self.faces
    }

    pub fn pit(&self) -> &Pit {
        &self.pit
    }

    pub fn cs(&self) -> &ContentStore {
        &self.cs
    }

    pub fn cs_mut(&mut self) -> &mut ContentStore {
        &mut self.cs
    }

    pub fn dead_nonce_list(&self) -> &DeadNonceList {
        &self.dnl
    }

    pub fn counters(&self) -> &ForwarderCounters {
        &self.counters
    }

    /// Starts a new counting period; PIT and CS sizes are unaffected.
    pub fn reset_counters(&self) {
        self.counters.reset();
    }

    pub fn now(&self) -> Instant {
        self.clock.now()
    }

    /// Deadline of the earliest armed timer.
    pub fn next_deadline(&mut self) -> Option<Instant> {
        self.scheduler.next_deadline()
    }

    /// Runs every timer that is due, returning how many fired.
    pub fn process_timers(&mut self) -> usize {
        let now = self.clock.now();
        let mut fired = 0;

        while let Some((id, event)) = self.scheduler.pop_due(now) {
            fired += 1;
            match event {
                TimerEvent::Unsatisfy(token) => {
                    self.clear_fired_timer(token, id);
                    self.on_interest_unsatisfied(token, now);
                }
                TimerEvent::Straggler {
                    token,
                    satisfied,
                    data_freshness,
                } => {
                    self.clear_fired_timer(token, id);
                    self.finalize(token, satisfied, data_freshness);
                }
            }
        }

        self.dnl.evict_expired(now);
        fired
    }

    /* ------------------------------------------------------------ *
     * Interest pipeline
     * ------------------------------------------------------------ */

    pub fn on_incoming_interest(&mut self, face: FaceId, interest: Interest, tags: Tags) {
        if let Err(e) = interest.check_well_formed() {
            debug!("Dropping malformed Interest from {}: {}", face, e);
            return;
        }
        let Some(in_face) = self.faces.get(face) else {
            debug!("Dropping Interest {} from unknown face {}", interest.name, face);
            return;
        };
        let now = self.clock.now();
        let tags = tags.received_on(face);
        let shared_medium = in_face.is_shared_medium();

        let mut interest = interest;
        if interest.lifetime_ms == 0 {
            interest.lifetime_ms = self.config.default_interest_lifetime_ms;
        }
        if in_face.scope() == FaceScope::NonLocal {
            interest.hop_limit = interest.hop_limit.map(|h| h.saturating_sub(1));
        }

        self.counters.n_in_interests.increment();
        debug!(
            "onIncomingInterest face={} interest={} nonce={}",
            face, interest.name, interest.nonce
        );

        if in_face.violates_localhost(&interest.name) {
            debug!("onIncomingInterest face={} interest={} violates /localhost", face, interest.name);
            return;
        }

        if self.dnl.has(&interest.name, interest.nonce, now) {
            self.on_interest_loop(face, shared_medium, &interest);
            return;
        }

        let (token, is_new) = self.pit.insert(&interest);
        if is_new {
            self.counters.pit_size.set(self.pit.len() as u64);
        }

        let (looped, has_live_in_records) = match self.pit.get(token) {
            Some(entry) => (
                entry.has_duplicate_nonce(interest.nonce, face),
                entry.has_live_in_records(now),
            ),
            None => return,
        };
        if looped {
            self.on_interest_loop(face, shared_medium, &interest);
            return;
        }

        self.cancel_timers(token);

        if has_live_in_records {
            self.on_content_store_miss(face, token, &interest, tags, now);
            return;
        }

        match self.cs.find(&interest, now) {
            Some(data) => self.on_content_store_hit(face, token, &interest, tags, data, now),
            None => {
                self.counters.cs_misses.increment();
                self.on_content_store_miss(face, token, &interest, tags, now);
            }
        }
    }

    /// Looped Interests get a Duplicate Nack on point-to-point links and are
    /// dropped on shared media. No PIT record is touched.
    fn on_interest_loop(&mut self, face: FaceId, shared_medium: bool, interest: &Interest) {
        if shared_medium {
            debug!(
                "onInterestLoop face={} interest={} drop (shared medium)",
                face, interest.name
            );
            return;
        }

        debug!("onInterestLoop face={} interest={} send-Nack=Duplicate", face, interest.name);
        let nack = Nack::new(interest.clone(), NackReason::Duplicate);
        if let Some(out) = self.faces.get_mut(face) {
            out.send_nack(&nack, &Tags::new());
            self.counters.n_out_nacks.increment();
        }
    }

    fn on_content_store_hit(
        &mut self,
        face: FaceId,
        token: PitToken,
        interest: &Interest,
        tags: Tags,
        data: Data,
        now: Instant,
    ) {
        debug!("onContentStoreHit interest={}", interest.name);
        self.counters.cs_hits.increment();

        let data_tags = tags.for_cached_response();
        self.with_strategy(token, now, |strategy, ctx, entry| {
            strategy.before_satisfy_interest(ctx, entry, FaceId::CONTENT_STORE, &data)
        });

        self.set_straggler_timer(token, true, data.freshness_period(), now);
        self.on_outgoing_data(&data, data_tags, face);
    }

    fn on_content_store_miss(
        &mut self,
        face: FaceId,
        token: PitToken,
        interest: &Interest,
        tags: Tags,
        now: Instant,
    ) {
        trace!("onContentStoreMiss interest={}", interest.name);

        let sequence = self.pit.next_sequence();
        let Some(entry) = self.pit.get_mut(token) else {
            return;
        };
        entry.insert_or_update_in_record(face, interest, now, sequence);
        self.set_unsatisfy_timer(token, now);

        if let Some(next_hop) = tags.next_hop_face {
            if self.faces.contains(next_hop) {
                debug!("onContentStoreMiss interest={} nexthop-faceid={}", interest.name, next_hop);
                self.on_outgoing_interest(token, next_hop, interest, now);
            } else {
                debug!(
                    "onContentStoreMiss interest={} unknown nexthop-faceid={}",
                    interest.name, next_hop
                );
            }
            return;
        }

        if self.config.direct_fib_forwarding {
            let next_hops: Vec<FaceId> = self
                .fib
                .longest_prefix_match(&interest.name)
                .into_iter()
                .map(|hop| hop.face)
                .filter(|hop| *hop != face)
                .filter(|hop| {
                    self.faces.get(*hop).map_or(false, |out| {
                        out.is_valid() && !out.violates_localhost(&interest.name)
                    })
                })
                .collect();
            if !next_hops.is_empty() {
                for hop in next_hops {
                    self.on_outgoing_interest(token, hop, interest, now);
                }
                return;
            }
        }

        self.with_strategy(token, now, |strategy, ctx, entry| {
            strategy.after_receive_interest(ctx, face, interest, entry)
        });
    }

    fn on_outgoing_interest(&mut self, token: PitToken, out_face: FaceId, interest: &Interest, now: Instant) {
        let Some(face) = self.faces.get_mut(out_face) else {
            warn!("onOutgoingInterest face={} interest={} unknown face", out_face, interest.name);
            return;
        };
        if face.scope() == FaceScope::NonLocal && interest.hop_limit == Some(0) {
            debug!("onOutgoingInterest face={} interest={} hop limit reached", out_face, interest.name);
            return;
        }
        let Some(entry) = self.pit.get_mut(token) else {
            return;
        };

        trace!("onOutgoingInterest face={} interest={}", out_face, interest.name);
        entry.insert_or_update_out_record(out_face, interest, now);
        face.send_interest(interest, &Tags::new());
        self.counters.n_out_interests.increment();
    }

    /// The request cannot be forwarded; it lingers for the straggler time.
    fn on_interest_reject(&mut self, token: PitToken, now: Instant) {
        let Some(entry) = self.pit.get(token) else {
            return;
        };
        if entry.has_pending_out_records(now) {
            error!("onInterestReject interest={} cannot reject forwarded Interest", entry.name());
            return;
        }
        debug!("onInterestReject interest={}", entry.name());
        self.set_straggler_timer(token, false, None, now);
    }

    fn on_interest_unsatisfied(&mut self, token: PitToken, now: Instant) {
        let Some(entry) = self.pit.get(token) else {
            return;
        };
        debug!("onInterestUnsatisfied interest={}", entry.name());

        self.with_strategy(token, now, |strategy, ctx, entry| {
            strategy.before_expire_pending_interest(ctx, entry)
        });
        self.set_straggler_timer(token, false, None, now);
    }

    /// The only way out of the PIT.
    fn finalize(&mut self, token: PitToken, satisfied: bool, data_freshness: Option<Duration>) {
        let now = self.clock.now();
        let Some(entry) = self.pit.get(token) else {
            return;
        };
        debug!("onInterestFinalize interest={} satisfied={}", entry.name(), satisfied);

        Self::insert_dead_nonce_list(&mut self.dnl, entry, satisfied, data_freshness, None, now);
        if satisfied {
            self.counters.n_satisfied_interests.increment();
        } else {
            self.counters.n_unsatisfied_interests.increment();
        }

        self.cancel_timers(token);
        self.pit.erase(token);
        self.counters.pit_size.set(self.pit.len() as u64);
    }

    /* ------------------------------------------------------------ *
     * Data pipeline
     * ------------------------------------------------------------ */

    pub fn on_incoming_data(&mut self, face: FaceId, data: Data, tags: Tags) {
        if data.name.is_empty() {
            debug!("Dropping Data with empty name from {}", face);
            return;
        }
        let Some(in_face) = self.faces.get(face) else {
            debug!("Dropping Data {} from unknown face {}", data.name, face);
            return;
        };
        let now = self.clock.now();
        let scope = in_face.scope();

        self.counters.n_in_data.increment();
        debug!("onIncomingData face={} data={}", face, data.name);

        if in_face.violates_localhost(&data.name) {
            debug!("onIncomingData face={} data={} violates /localhost", face, data.name);
            return;
        }

        let tokens = self.pit.find_all_data_matches(&data);
        if tokens.is_empty() {
            self.on_data_unsolicited(face, scope, &data, now);
            return;
        }

        // Round trip observed on the upstream that answered.
        let latency = tokens
            .iter()
            .filter_map(|token| self.pit.get(*token)?.out_record(face))
            .map(|record| now.saturating_duration_since(record.last_renewed))
            .next()
            .unwrap_or_default();
        self.cs.insert(&data, now, latency, false);
        self.counters.cs_size.set(self.cs.len() as u64);

        let data_freshness = data.freshness_period();
        let mut downstreams: Vec<FaceId> = Vec::new();

        for token in tokens {
            let Some(entry) = self.pit.get(token) else {
                continue;
            };
            let live: Vec<(FaceId, u64)> = entry
                .in_records()
                .iter()
                .filter(|r| r.expiry > now)
                .map(|r| (r.face, r.sequence))
                .collect();
            let most_recent_only =
                self.config.satisfy_policy == SatisfyPolicy::MostRecent && live.len() > 1;
            let satisfied: Vec<FaceId> = if most_recent_only {
                live.iter()
                    .max_by_key(|(_, sequence)| *sequence)
                    .map(|(face, _)| *face)
                    .into_iter()
                    .collect()
            } else {
                live.iter().map(|(face, _)| *face).collect()
            };
            debug!(
                "onIncomingData matching={} satisfying {} of {} downstreams",
                entry.name(),
                satisfied.len(),
                live.len()
            );

            self.cancel_timers(token);
            self.with_strategy(token, now, |strategy, ctx, entry| {
                strategy.before_satisfy_interest(ctx, entry, face, &data)
            });

            let Some(entry) = self.pit.get_mut(token) else {
                continue;
            };
            Self::insert_dead_nonce_list(&mut self.dnl, entry, true, data_freshness, Some(face), now);

            if most_recent_only {
                for downstream in &satisfied {
                    entry.delete_in_record(*downstream);
                }
                if entry.has_live_in_records(now) {
                    self.set_unsatisfy_timer(token, now);
                } else {
                    self.set_straggler_timer(token, true, data_freshness, now);
                }
            } else {
                entry.clear_in_records();
                entry.delete_out_record(face);
                self.set_straggler_timer(token, true, data_freshness, now);
            }

            for downstream in satisfied {
                if !downstreams.contains(&downstream) {
                    downstreams.push(downstream);
                }
            }
        }

        let out_tags = Tags {
            hop_count: None,
            next_hop_face: None,
            ..tags.received_on(face)
        };
        for downstream in downstreams {
            self.on_outgoing_data(&data, out_tags, downstream);
        }
    }

    fn on_data_unsolicited(&mut self, face: FaceId, scope: FaceScope, data: &Data, now: Instant) {
        match self.unsolicited.decide(scope, data) {
            UnsolicitedDataDecision::Cache => {
                debug!("onDataUnsolicited face={} data={} decision=cache", face, data.name);
                self.cs.insert(data, now, Duration::ZERO, true);
                self.counters.cs_size.set(self.cs.len() as u64);
            }
            UnsolicitedDataDecision::Drop => {
                debug!("onDataUnsolicited face={} data={} decision=drop", face, data.name);
            }
        }
    }

    fn on_outgoing_data(&mut self, data: &Data, tags: Tags, out_face: FaceId) {
        if out_face == FaceId::INVALID {
            warn!("onOutgoingData face=invalid data={}", data.name);
            return;
        }
        let Some(face) = self.faces.get_mut(out_face) else {
            warn!("onOutgoingData face={} data={} unknown face", out_face, data.name);
            return;
        };
        if !face.is_valid() {
            warn!("onOutgoingData face={} data={} face is invalid", out_face, data.name);
            return;
        }
        if face.violates_localhost(&data.name) {
            debug!("onOutgoingData face={} data={} violates /localhost", out_face, data.name);
            return;
        }

        trace!("onOutgoingData face={} data={}", out_face, data.name);
        face.send_data(data, &tags);
        self.counters.n_out_data.increment();
    }

    /* ------------------------------------------------------------ *
     * Nack pipeline
     * ------------------------------------------------------------ */

    pub fn on_incoming_nack(&mut self, face: FaceId, nack: Nack, _tags: Tags) {
        if let Err(e) = nack.check_well_formed() {
            debug!("Dropping malformed Nack from {}: {}", face, e);
            return;
        }
        let Some(in_face) = self.faces.get(face) else {
            debug!("Dropping Nack {} from unknown face {}", nack.interest.name, face);
            return;
        };
        let now = self.clock.now();

        self.counters.n_in_nacks.increment();
        debug!(
            "onIncomingNack face={} nack={}~{}",
            face, nack.interest.name, nack.reason
        );

        if in_face.is_shared_medium() {
            debug!("onIncomingNack face={} drop (shared medium)", face);
            return;
        }

        let Some(token) = self.pit.find(&nack.interest) else {
            debug!("onIncomingNack face={} nack={} no PIT entry", face, nack.interest.name);
            return;
        };
        let Some(entry) = self.pit.get_mut(token) else {
            return;
        };
        let Some(out_record) = entry.out_record_mut(face) else {
            debug!("onIncomingNack face={} nack={} no out-record", face, nack.interest.name);
            return;
        };
        if out_record.last_nonce != nack.interest.nonce {
            debug!(
                "onIncomingNack face={} nack={} wrong nonce {} != {}",
                face, nack.interest.name, nack.interest.nonce, out_record.last_nonce
            );
            return;
        }
        out_record.incoming_nack = Some(nack.clone());

        self.with_strategy(token, now, |strategy, ctx, entry| {
            strategy.after_receive_nack(ctx, face, &nack, entry)
        });
    }

    fn on_outgoing_nack(&mut self, token: PitToken, out_face: FaceId, reason: NackReason) {
        let Some(face) = self.faces.get_mut(out_face) else {
            warn!("onOutgoingNack face={} unknown face", out_face);
            return;
        };
        if !face.is_valid() {
            warn!("onOutgoingNack face={} face is invalid", out_face);
            return;
        }
        let Some(entry) = self.pit.get_mut(token) else {
            return;
        };
        let Some(in_record) = entry.in_record(out_face) else {
            debug!("onOutgoingNack face={} interest={} no in-record", out_face, entry.name());
            return;
        };
        if face.is_shared_medium() {
            debug!("onOutgoingNack face={} interest={} shared medium", out_face, entry.name());
            return;
        }

        let nack = Nack::new(in_record.interest.clone(), reason);
        debug!("onOutgoingNack face={} nack={}~{}", out_face, nack.interest.name, reason);
        entry.delete_in_record(out_face);
        face.send_nack(&nack, &Tags::new());
        self.counters.n_out_nacks.increment();
    }

    /* ------------------------------------------------------------ *
     * Strategy dispatch
     * ------------------------------------------------------------ */

    fn with_strategy<F>(&mut self, token: PitToken, now: Instant, f: F)
    where
        F: FnOnce(&mut dyn Strategy, &mut StrategyContext<'_>, &PitEntry),
    {
        let Some(entry) = self.pit.get(token) else {
            return;
        };
        let mut ctx = StrategyContext::new(token, self.fib.as_ref(), &self.faces, now);
        f(self.strategy.as_mut(), &mut ctx, entry);
        let actions = ctx.into_actions();
        self.apply_strategy_actions(actions, now);
    }

    fn apply_strategy_actions(&mut self, actions: Vec<StrategyAction>, now: Instant) {
        for action in actions {
            match action {
                StrategyAction::SendInterest {
                    token,
                    face,
                    interest,
                } => self.on_outgoing_interest(token, face, &interest, now),
                StrategyAction::SendNack {
                    token,
                    face,
                    reason,
                } => self.on_outgoing_nack(token, face, reason),
                StrategyAction::Reject { token } => self.on_interest_reject(token, now),
            }
        }
    }

    /* ------------------------------------------------------------ *
     * Timers and Dead Nonce List
     * ------------------------------------------------------------ */

    fn cancel_timers(&mut self, token: PitToken) {
        let Some(entry) = self.pit.get_mut(token) else {
            return;
        };
        if let Some(id) = entry.unsatisfy_timer.take() {
            self.scheduler.cancel(id);
        }
        if let Some(id) = entry.straggler_timer.take() {
            self.scheduler.cancel(id);
        }
    }

    fn clear_fired_timer(&mut self, token: PitToken, id: TimerId) {
        let Some(entry) = self.pit.get_mut(token) else {
            return;
        };
        if entry.unsatisfy_timer == Some(id) {
            entry.unsatisfy_timer = None;
        }
        if entry.straggler_timer == Some(id) {
            entry.straggler_timer = None;
        }
    }

    /// Arms the unsatisfy timer for the latest in-record expiry.
    fn set_unsatisfy_timer(&mut self, token: PitToken, now: Instant) {
        self.cancel_timers(token);
        let Some(entry) = self.pit.get_mut(token) else {
            return;
        };
        let Some(expiry) = entry.last_in_record_expiry() else {
            return;
        };
        let id = self
            .scheduler
            .schedule(expiry.max(now), TimerEvent::Unsatisfy(token));
        entry.unsatisfy_timer = Some(id);
    }

    fn set_straggler_timer(
        &mut self,
        token: PitToken,
        satisfied: bool,
        data_freshness: Option<Duration>,
        now: Instant,
    ) {
        self.cancel_timers(token);
        let Some(entry) = self.pit.get_mut(token) else {
            return;
        };
        let id = self.scheduler.schedule(
            now + self.config.straggler_time(),
            TimerEvent::Straggler {
                token,
                satisfied,
                data_freshness,
            },
        );
        entry.straggler_timer = Some(id);
    }

    /// Records retired nonces of `entry`.
    ///
    /// Unsatisfied entries always record. Satisfied entries record only when
    /// the Interest wanted fresh Data and the Data stops being fresh before a
    /// Dead Nonce List entry would expire. `upstream` limits the insertion to
    /// that face's out-record; otherwise every out-record is recorded.
    fn insert_dead_nonce_list(
        dnl: &mut DeadNonceList,
        entry: &PitEntry,
        satisfied: bool,
        data_freshness: Option<Duration>,
        upstream: Option<FaceId>,
        now: Instant,
    ) {
        let needed = !satisfied
            || (entry.interest().must_be_fresh
                && data_freshness.map_or(false, |freshness| freshness < dnl.lifetime()));
        if !needed {
            return;
        }

        match upstream {
            Some(face) => {
                if let Some(record) = entry.out_record(face) {
                    dnl.add(entry.name(), record.last_nonce, now);
                }
            }
            None => {
                for record in entry.out_records() {
                    dnl.add(entry.name(), record.last_nonce, now);
                }
            }
        }
    }
}

impl std::fmt::Debug for Forwarder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Forwarder")
            .field("faces", &self.faces.len())
            .field("pit", &self.pit.len())
            .field("cs", &self.cs)
            .field("dnl", &self.dnl.len())
            .field("timers", &self.scheduler.len())
            .field("strategy", &self.strategy.name())
            .finish()
    }
}
