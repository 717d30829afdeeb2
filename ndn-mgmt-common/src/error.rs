//! Error types shared by the management client crates.

use thiserror::Error;

/// All possible errors raised below the management protocol layer.
#[derive(Error, Debug)]
pub enum Error {
    /// A TLV element is malformed: bad length, missing field, overrun.
    #[error("TLV error: {0}")]
    Tlv(String),

    /// A packet is structurally invalid (wrong outer type, bad name component).
    #[error("NDN packet error: {0}")]
    NdnPacket(String),

    /// The Interest lifetime elapsed without a matching Data.
    #[error("Interest timed out: {0}")]
    Timeout(String),

    /// The forwarder answered with a network NACK.
    #[error("Interest nacked: {name} (reason {reason})")]
    Nack { name: String, reason: u64 },

    /// The face or socket failed.
    #[error("transport error: {0}")]
    Transport(String),

    /// Invalid or missing client configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// A command Interest could not be signed.
    #[error("signing error: {0}")]
    Signing(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Other errors
    #[error("Other error: {0}")]
    Other(String),
}

impl Error {
    /// Returns true for errors caused by undecodable bytes.
    pub fn is_malformed(&self) -> bool {
        matches!(self, Error::Tlv(_) | Error::NdnPacket(_))
    }
}
