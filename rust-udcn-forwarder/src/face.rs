//! Face table and the send side of the face collaborator contract.
//!
//! A face is registered with its link type and trust scope plus a
//! [`FaceSender`] that performs the actual transmission. Sends are
//! fire-and-forget; an invalid face swallows them.

use log::{debug, trace};
use rust_udcn_common::{
    ndn::{Data, Interest, Name, Nack},
    tags::Tags,
    types::{FaceId, FaceScope, LinkType},
    Error, Result,
};
use std::collections::BTreeMap;
use tokio::sync::mpsc;

/// Transmission half of a face.
pub trait FaceSender: Send {
    fn send_interest(&mut self, interest: &Interest, tags: &Tags);
    fn send_data(&mut self, data: &Data, tags: &Tags);
    fn send_nack(&mut self, nack: &Nack, tags: &Tags);
}

/// A packet handed to a face for transmission.
#[derive(Debug, Clone, PartialEq)]
pub enum OutgoingPacket {
    Interest(Interest, Tags),
    Data(Data, Tags),
    Nack(Nack, Tags),
}

/// [`FaceSender`] that pushes every packet onto an unbounded channel.
#[derive(Debug, Clone)]
pub struct ChannelSender {
    tx: mpsc::UnboundedSender<OutgoingPacket>,
}

impl ChannelSender {
    pub fn new(tx: mpsc::UnboundedSender<OutgoingPacket>) -> Self {
        Self { tx }
    }

    /// Creates a sender together with the receiving end of its channel.
    pub fn pair() -> (Self, mpsc::UnboundedReceiver<OutgoingPacket>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(tx), rx)
    }

    fn push(&self, packet: OutgoingPacket) {
        if self.tx.send(packet).is_err() {
            trace!("Face channel closed, dropping outgoing packet");
        }
    }
}

impl FaceSender for ChannelSender {
    fn send_interest(&mut self, interest: &Interest, tags: &Tags) {
        self.push(OutgoingPacket::Interest(interest.clone(), *tags));
    }

    fn send_data(&mut self, data: &Data, tags: &Tags) {
        self.push(OutgoingPacket::Data(data.clone(), *tags));
    }

    fn send_nack(&mut self, nack: &Nack, tags: &Tags) {
        self.push(OutgoingPacket::Nack(nack.clone(), *tags));
    }
}

pub struct Face {
    id: FaceId,
    link_type: LinkType,
    scope: FaceScope,
    valid: bool,
    sender: Box<dyn FaceSender>,
}

impl Face {
    pub fn id(&self) -> FaceId {
        self.id
    }

    pub fn link_type(&self) -> LinkType {
        self.link_type
    }

    pub fn scope(&self) -> FaceScope {
        self.scope
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    pub fn is_shared_medium(&self) -> bool {
        self.link_type == LinkType::SharedMedium
    }

    /// A non-local face must never carry `/localhost` traffic.
    pub fn violates_localhost(&self, name: &Name) -> bool {
        self.scope == FaceScope::NonLocal && name.is_localhost()
    }

    pub fn send_interest(&mut self, interest: &Interest, tags: &Tags) {
        if !self.valid {
            debug!("[Face {}] invalid, not sending Interest {}", self.id, interest.name);
            return;
        }
        self.sender.send_interest(interest, tags);
    }

    pub fn send_data(&mut self, data: &Data, tags: &Tags) {
        if !self.valid {
            debug!("[Face {}] invalid, not sending Data {}", self.id, data.name);
            return;
        }
        self.sender.send_data(data, tags);
    }

    pub fn send_nack(&mut self, nack: &Nack, tags: &Tags) {
        if !self.valid {
            debug!("[Face {}] invalid, not sending Nack {}", self.id, nack.interest.name);
            return;
        }
        self.sender.send_nack(nack, tags);
    }
}

impl std::fmt::Debug for Face {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Face")
            .field("id", &self.id)
            .field("link_type", &self.link_type)
            .field("scope", &self.scope)
            .field("valid", &self.valid)
            .finish()
    }
}

#[derive(Debug)]
pub struct FaceTable {
    faces: BTreeMap<FaceId, Face>,
    last_id: u16,
}

impl FaceTable {
    pub fn new() -> Self {
        Self {
            faces: BTreeMap::new(),
            last_id: FaceId::FIRST_DYNAMIC.0 - 1,
        }
    }

    /// Registers a face and hands out its id. Ids are never reused.
    pub fn add(
        &mut self,
        link_type: LinkType,
        scope: FaceScope,
        sender: Box<dyn FaceSender>,
    ) -> Result<FaceId> {
        let next = self
            .last_id
            .checked_add(1)
            .ok_or_else(|| Error::Other("Face id space exhausted".into()))?;
        self.last_id = next;

        let id = FaceId(next);
        self.faces.insert(
            id,
            Face {
                id,
                link_type,
                scope,
                valid: true,
                sender,
            },
        );
        Ok(id)
    }

    pub fn remove(&mut self, id: FaceId) -> Option<Face> {
        self.faces.remove(&id)
    }

    pub fn get(&self, id: FaceId) -> Option<&Face> {
        self.faces.get(&id)
    }

    pub fn get_mut(&mut self, id: FaceId) -> Option<&mut Face> {
        self.faces.get_mut(&id)
    }

    pub fn contains(&self, id: FaceId) -> bool {
        self.faces.contains_key(&id)
    }

    /// Marks a face valid or invalid; sends to an invalid face are no-ops.
    pub fn set_valid(&mut self, id: FaceId, valid: bool) -> Result<()> {
        let face = self.faces.get_mut(&id).ok_or(Error::UnknownFace(id))?;
        face.valid = valid;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.faces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Face> {
        self.faces.values()
    }
}

impl Default for FaceTable {
    fn default() -> Self {
        Self::new()
    }
}
