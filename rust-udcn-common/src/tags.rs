//! Per-packet transport annotations.
//!
//! Packets are immutable values; everything a link layer or a pipeline wants
//! to say *about* a particular copy of a packet travels next to it in a
//! [`Tags`] value.

use crate::types::FaceId;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tags {
    /// Face the packet arrived on, or the content store pseudo face.
    pub incoming_face: Option<FaceId>,
    /// Explicit egress requested by a privileged local application.
    pub next_hop_face: Option<FaceId>,
    /// Number of hops the packet has travelled.
    pub hop_count: Option<u8>,
    /// Congestion mark set by an upstream link.
    pub congestion_mark: Option<u64>,
}

impl Tags {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_next_hop_face(mut self, face: FaceId) -> Self {
        self.next_hop_face = Some(face);
        self
    }

    pub fn with_hop_count(mut self, hop_count: u8) -> Self {
        self.hop_count = Some(hop_count);
        self
    }

    pub fn with_congestion_mark(mut self, mark: u64) -> Self {
        self.congestion_mark = Some(mark);
        self
    }

    /// Copy of these tags stamped with the face the packet arrived on.
    pub fn received_on(&self, face: FaceId) -> Self {
        Self {
            incoming_face: Some(face),
            ..*self
        }
    }

    /// Tags for a cached Data answering a request that carried `self`.
    ///
    /// Request-scoped transport metadata is carried over; hop count and the
    /// next-hop override do not apply to the response.
    pub fn for_cached_response(&self) -> Self {
        Self {
            incoming_face: Some(FaceId::CONTENT_STORE),
            next_hop_face: None,
            hop_count: None,
            congestion_mark: self.congestion_mark,
        }
    }
}
