//! Common types and utilities for the micro Data-Centric Networking (μDCN) forwarder.
//! 
//! This crate provides the packet model, per-packet annotations, counters and
//! error types shared by the forwarding pipelines and their collaborators.

pub mod ndn;
pub mod tags;
pub mod tlv;
pub mod metrics;
pub mod types;
pub mod error;

/// Reexport of common types
pub use error::Error;
pub type Result<T> = std::result::Result<T, Error>;
