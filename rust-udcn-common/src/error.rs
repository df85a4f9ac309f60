//! Error types for the μDCN implementation.

use crate::types::FaceId;
use thiserror::Error;

/// All possible errors that can occur within the μDCN implementation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A packet failed structural validation of its forwarding fields.
    #[error("NDN packet error: {0}")]
    NdnPacket(String),

    /// The face is not present in the face table.
    #[error("Unknown face: {0}")]
    UnknownFace(FaceId),

    /// Other errors
    #[error("Other error: {0}")]
    Other(String),
}
