//! Stream transport to a local NDN forwarder.
//!
//! This crate provides the pieces the management protocol needs from the
//! network: a face that expresses Interests over a Unix or TCP stream, the
//! signer that turns a command name into an authenticated command Interest,
//! and the options controlling both.

use async_trait::async_trait;
use ndn_mgmt_common::{
    ndn::{Data, Interest},
    Result,
};
use std::sync::Arc;

mod config;
mod face;
mod signer;

pub use config::{ClientOptions, FaceUri};
pub use face::StreamFace;
pub use signer::{CommandSigner, DigestSha256Signer};

/// Default NFD Unix socket
pub const DEFAULT_FACE_URI: &str = "unix:///run/nfd/nfd.sock";

/// Default NFD TCP port
pub const NFD_TCP_PORT: u16 = 6363;

/// Lifetime used for management Interests in milliseconds
pub const DEFAULT_INTEREST_LIFETIME_MS: u64 = 2000;

/// Attempts made per Interest before giving up
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Request/response primitive the management protocol is built on.
///
/// Implementations send one Interest and wait at most its lifetime for a
/// matching Data. An elapsed lifetime is reported as
/// [`Error::Timeout`](ndn_mgmt_common::Error::Timeout), a network Nack as
/// [`Error::Nack`](ndn_mgmt_common::Error::Nack).
#[async_trait]
pub trait Transport: Send + Sync {
    async fn express_interest(&self, interest: &Interest) -> Result<Data>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn express_interest(&self, interest: &Interest) -> Result<Data> {
        (**self).express_interest(interest).await
    }
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for &T {
    async fn express_interest(&self, interest: &Interest) -> Result<Data> {
        (**self).express_interest(interest).await
    }
}
