//! Forwarding strategy extension points.
//!
//! The forwarder calls a [`Strategy`] at four points of the pipelines. A
//! strategy reads the PIT entry and the FIB through its [`StrategyContext`]
//! and answers by queueing actions; the forwarder executes them through its
//! outgoing-Interest, outgoing-Nack and reject steps once the callback
//! returns.

use log::debug;
use rust_udcn_common::{
    ndn::{Data, Interest, Nack, NackReason},
    types::FaceId,
};
use std::time::Instant;

use crate::face::FaceTable;
use crate::fib::{FibLookup, NextHop};
use crate::pit::{PitEntry, PitToken};

/// Something a strategy asked the forwarder to do with a PIT entry.
#[derive(Debug, Clone, PartialEq)]
pub enum StrategyAction {
    SendInterest {
        token: PitToken,
        face: FaceId,
        interest: Interest,
    },
    SendNack {
        token: PitToken,
        face: FaceId,
        reason: NackReason,
    },
    Reject {
        token: PitToken,
    },
}

pub struct StrategyContext<'a> {
    token: PitToken,
    fib: &'a dyn FibLookup,
    faces: &'a FaceTable,
    now: Instant,
    actions: Vec<StrategyAction>,
}

impl<'a> StrategyContext<'a> {
    pub fn new(token: PitToken, fib: &'a dyn FibLookup, faces: &'a FaceTable, now: Instant) -> Self {
        Self {
            token,
            fib,
            faces,
            now,
            actions: Vec::new(),
        }
    }

    pub fn fib(&self) -> &dyn FibLookup {
        self.fib
    }

    pub fn faces(&self) -> &FaceTable {
        self.faces
    }

    pub fn now(&self) -> Instant {
        self.now
    }

    /// Forward `interest` to `face`.
    pub fn send_interest(&mut self, face: FaceId, interest: Interest) {
        self.actions.push(StrategyAction::SendInterest {
            token: self.token,
            face,
            interest,
        });
    }

    /// Answer the downstream on `face` with a Nack.
    pub fn send_nack(&mut self, face: FaceId, reason: NackReason) {
        self.actions.push(StrategyAction::SendNack {
            token: self.token,
            face,
            reason,
        });
    }

    /// Give up on the entry.
    pub fn reject(&mut self) {
        self.actions.push(StrategyAction::Reject { token: self.token });
    }

    pub fn into_actions(self) -> Vec<StrategyAction> {
        self.actions
    }
}

pub trait Strategy: Send {
    fn name(&self) -> &'static str;

    /// A new or refreshed Interest needs a forwarding decision.
    fn after_receive_interest(
        &mut self,
        ctx: &mut StrategyContext<'_>,
        in_face: FaceId,
        interest: &Interest,
        entry: &PitEntry,
    );

    /// `data` is about to satisfy the entry.
    fn before_satisfy_interest(
        &mut self,
        _ctx: &mut StrategyContext<'_>,
        _entry: &PitEntry,
        _in_face: FaceId,
        _data: &Data,
    ) {
    }

    /// The entry's unsatisfy timer fired.
    fn before_expire_pending_interest(&mut self, _ctx: &mut StrategyContext<'_>, _entry: &PitEntry) {}

    /// An upstream answered one of our out-records with `nack`.
    fn after_receive_nack(
        &mut self,
        ctx: &mut StrategyContext<'_>,
        in_face: FaceId,
        nack: &Nack,
        entry: &PitEntry,
    );
}

/// Sends every Interest to the cheapest usable next hop.
///
/// With no usable next hop the downstream gets a NoRoute Nack. A Nack from
/// upstream moves the request to the next untried hop; once every upstream
/// has said no, the least severe reason goes back downstream.
#[derive(Debug, Default)]
pub struct BestRouteStrategy;

impl BestRouteStrategy {
    pub fn new() -> Self {
        Self
    }

    fn eligible_hops(ctx: &StrategyContext<'_>, entry: &PitEntry, in_face: FaceId) -> Vec<NextHop> {
        ctx.fib()
            .longest_prefix_match(entry.name())
            .into_iter()
            .filter(|hop| hop.face != in_face)
            .filter(|hop| {
                ctx.faces().get(hop.face).map_or(false, |face| {
                    face.is_valid() && !face.violates_localhost(entry.name())
                })
            })
            .collect()
    }
}

impl Strategy for BestRouteStrategy {
    fn name(&self) -> &'static str {
        "best-route"
    }

    fn after_receive_interest(
        &mut self,
        ctx: &mut StrategyContext<'_>,
        in_face: FaceId,
        interest: &Interest,
        entry: &PitEntry,
    ) {
        match Self::eligible_hops(ctx, entry, in_face).first() {
            Some(hop) => ctx.send_interest(hop.face, interest.clone()),
            None => {
                debug!("best-route: no next hop for {} from {}", interest.name, in_face);
                ctx.send_nack(in_face, NackReason::NoRoute);
                ctx.reject();
            }
        }
    }

    fn after_receive_nack(
        &mut self,
        ctx: &mut StrategyContext<'_>,
        in_face: FaceId,
        nack: &Nack,
        entry: &PitEntry,
    ) {
        let Some(latest) = entry.in_records().iter().max_by_key(|r| r.sequence) else {
            return;
        };

        let untried = Self::eligible_hops(ctx, entry, latest.face)
            .into_iter()
            .find(|hop| hop.face != in_face && entry.out_record(hop.face).is_none());
        if let Some(hop) = untried {
            debug!("best-route: retrying {} via {} after {} Nack", entry.name(), hop.face, nack.reason);
            ctx.send_interest(hop.face, latest.interest.clone());
            return;
        }

        if entry.has_pending_out_records(ctx.now()) {
            return;
        }

        let reason = entry
            .out_records()
            .iter()
            .filter_map(|r| r.incoming_nack.as_ref().map(|n| n.reason))
            .fold(nack.reason, |least, reason| {
                if reason.is_less_severe(&least) {
                    reason
                } else {
                    least
                }
            });
        for record in entry.in_records() {
            ctx.send_nack(record.face, reason);
        }
        ctx.reject();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::face::ChannelSender;
    use crate::fib::Fib;
    use crate::pit::Pit;
    use rust_udcn_common::{
        ndn::Name,
        types::{FaceScope, LinkType},
    };

    struct Setup {
        faces: FaceTable,
        fib: Fib,
        pit: Pit,
        ids: Vec<FaceId>,
    }

    fn setup(n_faces: usize) -> Setup {
        let mut faces = FaceTable::new();
        let ids = (0..n_faces)
            .map(|_| {
                let (sender, _rx) = ChannelSender::pair();
                faces
                    .add(LinkType::PointToPoint, FaceScope::NonLocal, Box::new(sender))
                    .unwrap()
            })
            .collect();
        Setup {
            faces,
            fib: Fib::new(),
            pit: Pit::new(),
            ids,
        }
    }

    #[test]
    fn test_picks_cheapest_hop_other_than_downstream() {
        let mut s = setup(3);
        let prefix = Name::from_string("/p");
        s.fib.add_next_hop(&prefix, s.ids[0], 1);
        s.fib.add_next_hop(&prefix, s.ids[2], 5);
        s.fib.add_next_hop(&prefix, s.ids[1], 10);

        let interest = Interest::new(Name::from_string("/p/1")).with_nonce(1);
        let (token, _) = s.pit.insert(&interest);
        let now = Instant::now();
        s.pit
            .get_mut(token)
            .unwrap()
            .insert_or_update_in_record(s.ids[0], &interest, now, 1);

        let mut ctx = StrategyContext::new(token, &s.fib, &s.faces, now);
        BestRouteStrategy::new().after_receive_interest(&mut ctx, s.ids[0], &interest, s.pit.get(token).unwrap());

        assert_eq!(
            ctx.into_actions(),
            vec![StrategyAction::SendInterest { token, face: s.ids[2], interest }]
        );
    }

    #[test]
    fn test_no_route_nacks_and_rejects() {
        let s = setup(1);
        let mut pit = Pit::new();
        let interest = Interest::new(Name::from_string("/nowhere")).with_nonce(1);
        let (token, _) = pit.insert(&interest);
        let now = Instant::now();

        let mut ctx = StrategyContext::new(token, &s.fib, &s.faces, now);
        BestRouteStrategy::new().after_receive_interest(&mut ctx, s.ids[0], &interest, pit.get(token).unwrap());

        assert_eq!(
            ctx.into_actions(),
            vec![
                StrategyAction::SendNack { token, face: s.ids[0], reason: NackReason::NoRoute },
                StrategyAction::Reject { token },
            ]
        );
    }

    #[test]
    fn test_nack_retries_then_gives_up() {
        let mut s = setup(3);
        let (down, up1, up2) = (s.ids[0], s.ids[1], s.ids[2]);
        let prefix = Name::from_string("/p");
        s.fib.add_next_hop(&prefix, up1, 1);
        s.fib.add_next_hop(&prefix, up2, 2);

        let interest = Interest::new(Name::from_string("/p")).with_nonce(9);
        let (token, _) = s.pit.insert(&interest);
        let now = Instant::now();
        let entry = s.pit.get_mut(token).unwrap();
        entry.insert_or_update_in_record(down, &interest, now, 1);
        entry.insert_or_update_out_record(up1, &interest, now);
        let congestion = Nack::new(interest.clone(), NackReason::Congestion);
        entry.out_record_mut(up1).unwrap().incoming_nack = Some(congestion.clone());

        let mut ctx = StrategyContext::new(token, &s.fib, &s.faces, now);
        BestRouteStrategy::new().after_receive_nack(&mut ctx, up1, &congestion, s.pit.get(token).unwrap());
        assert_eq!(
            ctx.into_actions(),
            vec![StrategyAction::SendInterest { token, face: up2, interest: interest.clone() }]
        );

        let entry = s.pit.get_mut(token).unwrap();
        entry.insert_or_update_out_record(up2, &interest, now);
        let no_route = Nack::new(interest.clone(), NackReason::NoRoute);
        entry.out_record_mut(up2).unwrap().incoming_nack = Some(no_route.clone());

        let mut ctx = StrategyContext::new(token, &s.fib, &s.faces, now);
        BestRouteStrategy::new().after_receive_nack(&mut ctx, up2, &no_route, s.pit.get(token).unwrap());
        assert_eq!(
            ctx.into_actions(),
            vec![
                StrategyAction::SendNack { token, face: down, reason: NackReason::Congestion },
                StrategyAction::Reject { token },
            ]
        );
    }
}
