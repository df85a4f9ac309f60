//! Forwarding plane for the micro Data-Centric Networking (μDCN) node.
//!
//! This crate implements the Interest, Data and Nack pipelines together with
//! the tables they drive: the PIT with its unsatisfy and straggler timers,
//! the content store with pluggable replacement, and the Dead Nonce List.
//! Routing, forwarding decisions and transmission are collaborators behind
//! the [`fib::FibLookup`], [`strategy::Strategy`] and [`face::FaceSender`]
//! traits.

pub mod clock;
pub mod config;
pub mod cs;
pub mod dead_nonce_list;
pub mod face;
pub mod fib;
pub mod forwarder;
pub mod pit;
pub mod runtime;
pub mod scheduler;
pub mod strategy;
pub mod unsolicited;

pub use config::{ForwarderConfig, SatisfyPolicy};
pub use forwarder::Forwarder;
pub use runtime::{ChannelFace, FaceEvent, ForwarderRuntime};

/// Version of the forwarder crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
