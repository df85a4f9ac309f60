//! µDCN forwarding plane.
//!
//! Facade over the workspace crates: packet types and counters live in
//! [`common`], the pipelines and their tables in [`forwarder`].

pub use rust_udcn_common as common;
pub use rust_udcn_forwarder as forwarder;

pub use rust_udcn_common::{
    ndn::{Data, Interest, Nack, NackReason, Name},
    tags::Tags,
    types::{FaceId, FaceScope, LinkType},
    Error, Result,
};
pub use rust_udcn_forwarder::{
    ChannelFace, FaceEvent, Forwarder, ForwarderConfig, ForwarderRuntime, SatisfyPolicy,
};
