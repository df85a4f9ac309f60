//! Common types shared between the forwarder and its face collaborators.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum number of entries in the content store.
pub const MAX_CS_ENTRIES: usize = 4096;

/// Unique identifier for a face.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(C)]
pub struct FaceId(pub u16);

impl FaceId {
    /// Never assigned to a real face; sends to it are dropped.
    pub const INVALID: FaceId = FaceId(0);

    /// Pseudo face reported as the origin of Data served from the content store.
    pub const CONTENT_STORE: FaceId = FaceId(254);

    /// First identifier handed out to a regular face.
    pub const FIRST_DYNAMIC: FaceId = FaceId(256);

    /// Whether this id belongs to the reserved range.
    pub fn is_reserved(&self) -> bool {
        self.0 < Self::FIRST_DYNAMIC.0
    }
}

impl fmt::Display for FaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FaceId({})", self.0)
    }
}

/// Link type of a face.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum LinkType {
    /// Exactly one peer on the other end of the link.
    PointToPoint = 0,
    /// Broadcast medium shared by several peers.
    SharedMedium = 1,
}

/// Trust scope of a face.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum FaceScope {
    /// Face to an application on the same node.
    Local = 0,
    /// Face to another node.
    NonLocal = 1,
}
