//! Async driver for the forwarder.
//!
//! Faces push [`FaceEvent`]s into one channel; the runtime task owns the
//! [`Forwarder`], handles one event at a time and sleeps until the next timer
//! deadline in between. Each [`ChannelFace`] is the application side of a
//! face: it injects packets and receives whatever the forwarder sends out.

use log::{debug, info};
use rust_udcn_common::{
    ndn::{Data, Interest, Nack},
    tags::Tags,
    types::{FaceId, FaceScope, LinkType},
    Result,
};
use tokio::sync::mpsc;
use tokio::time::{sleep_until, Instant as TokioInstant};

use crate::face::{ChannelSender, OutgoingPacket};
use crate::forwarder::Forwarder;

/// Events emitted by a face towards the forwarder
#[derive(Debug, Clone)]
pub enum FaceEvent {
    /// A new Interest was received
    InterestReceived(Interest, Tags),

    /// A new Data packet was received
    DataReceived(Data, Tags),

    /// A Nack was received
    NackReceived(Nack, Tags),

    /// The face was closed
    Closed,
}

/// Application end of a channel-backed face.
#[derive(Debug)]
pub struct ChannelFace {
    id: FaceId,
    events: mpsc::UnboundedSender<(FaceId, FaceEvent)>,
    outgoing: mpsc::UnboundedReceiver<OutgoingPacket>,
}

impl ChannelFace {
    pub fn id(&self) -> FaceId {
        self.id
    }

    /// Hands an Interest to the forwarder. False once the runtime is gone.
    pub fn send_interest(&self, interest: Interest, tags: Tags) -> bool {
        self.push(FaceEvent::InterestReceived(interest, tags))
    }

    pub fn send_data(&self, data: Data, tags: Tags) -> bool {
        self.push(FaceEvent::DataReceived(data, tags))
    }

    pub fn send_nack(&self, nack: Nack, tags: Tags) -> bool {
        self.push(FaceEvent::NackReceived(nack, tags))
    }

    /// Next packet the forwarder sent on this face.
    pub async fn recv(&mut self) -> Option<OutgoingPacket> {
        self.outgoing.recv().await
    }

    pub fn try_recv(&mut self) -> Option<OutgoingPacket> {
        self.outgoing.try_recv().ok()
    }

    /// Closes the face; the forwarder removes it and its PIT records.
    pub fn close(self) {
        debug!("[Face {}] Closing", self.id);
        self.push(FaceEvent::Closed);
    }

    fn push(&self, event: FaceEvent) -> bool {
        self.events.send((self.id, event)).is_ok()
    }
}

pub struct ForwarderRuntime {
    forwarder: Forwarder,
    events_tx: mpsc::UnboundedSender<(FaceId, FaceEvent)>,
    events_rx: mpsc::UnboundedReceiver<(FaceId, FaceEvent)>,
}

impl ForwarderRuntime {
    pub fn new(forwarder: Forwarder) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            forwarder,
            events_tx,
            events_rx,
        }
    }

    /// Registers a face whose traffic goes through in-memory channels.
    pub fn add_channel_face(&mut self, link_type: LinkType, scope: FaceScope) -> Result<ChannelFace> {
        let (sender, outgoing) = ChannelSender::pair();
        let id = self.forwarder.add_face(link_type, scope, Box::new(sender))?;
        Ok(ChannelFace {
            id,
            events: self.events_tx.clone(),
            outgoing,
        })
    }

    pub fn forwarder(&self) -> &Forwarder {
        &self.forwarder
    }

    pub fn forwarder_mut(&mut self) -> &mut Forwarder {
        &mut self.forwarder
    }

    /// Runs until every face handle has been dropped, then hands the
    /// forwarder back.
    pub async fn run(self) -> Forwarder {
        let Self {
            mut forwarder,
            events_tx,
            mut events_rx,
        } = self;
        drop(events_tx);

        info!("Forwarder runtime started");
        loop {
            let deadline = forwarder.next_deadline();
            tokio::select! {
                event = events_rx.recv() => {
                    let Some((face, event)) = event else {
                        break;
                    };
                    Self::dispatch(&mut forwarder, face, event);
                }
                _ = sleep_until(TokioInstant::from_std(deadline.unwrap_or_else(std::time::Instant::now))),
                    if deadline.is_some() => {}
            }
            forwarder.process_timers();
        }
        info!("Forwarder runtime stopped: all faces gone");
        forwarder
    }

    fn dispatch(forwarder: &mut Forwarder, face: FaceId, event: FaceEvent) {
        match event {
            FaceEvent::InterestReceived(interest, tags) => {
                forwarder.on_incoming_interest(face, interest, tags)
            }
            FaceEvent::DataReceived(data, tags) => forwarder.on_incoming_data(face, data, tags),
            FaceEvent::NackReceived(nack, tags) => forwarder.on_incoming_nack(face, nack, tags),
            FaceEvent::Closed => {
                forwarder.remove_face(face);
            }
        }
    }
}
