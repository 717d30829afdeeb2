//! Common types and utilities for the NFD management client.
//!
//! This crate provides the wire-level building blocks shared by the transport
//! and the management protocol: TLV primitives, names, Interest/Data packets
//! and face counters.

pub mod error;
pub mod metrics;
pub mod ndn;
pub mod tlv;

/// Reexport of common types
pub use error::Error;
pub type Result<T> = std::result::Result<T, Error>;
