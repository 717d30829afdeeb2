//! Client for the NFD management protocol.
//!
//! Control commands (face, route and strategy changes) are dispatched as
//! signed Interests and answered with a [`ControlResponse`]. Status datasets
//! (faces, FIB, RIB, strategy choices, forwarder status) are fetched as
//! segmented streams and decoded into typed records.
//!
//! ```no_run
//! # async fn run() -> ndn_mgmt::Result<()> {
//! use ndn_mgmt::{ClientOptions, DigestSha256Signer, Nfdc};
//! use std::sync::Arc;
//!
//! let nfdc = Nfdc::connect(ClientOptions::default())
//!     .await?
//!     .with_signer(Arc::new(DigestSha256Signer::new()));
//! for face in nfdc.get_face_list().await? {
//!     println!("{}", face);
//! }
//! # Ok(())
//! # }
//! ```

pub mod dataset;
pub mod error;
pub mod fetch;
pub mod nfdc;
pub mod ping;
pub mod types;

#[cfg(test)]
mod mock;

pub use error::{ManagementError, Result};
pub use fetch::RetryPolicy;
pub use nfdc::Nfdc;
pub use types::{ControlParameters, ControlResponse, TlvRecord};

/// Reexport of the wire-level and transport crates
pub use ndn_mgmt_common::ndn::{Data, Interest, Name, NameComponent};
pub use ndn_mgmt_transport::{
    ClientOptions, CommandSigner, DigestSha256Signer, FaceUri, StreamFace, Transport,
};
