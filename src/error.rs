//! Error types for NFD management operations.

use ndn_mgmt_common::Error;
use thiserror::Error;

/// Errors surfaced by commands, dataset fetches and record decoding.
#[derive(Error, Debug)]
pub enum ManagementError {
    /// Bytes that do not decode as the expected record.
    #[error("malformed encoding: {0}")]
    Malformed(String),

    /// The dataset has no usable FinalBlockId.
    #[error("unbounded stream {name}: {reason}")]
    UnboundedStream { name: String, reason: String },

    /// A segment name does not follow `<prefix>/<version>/<segment>`.
    #[error("malformed segment stream: {0}")]
    MalformedStream(String),

    /// An Interest went unanswered on every attempt.
    #[error("request for {name} failed after {attempts} attempt(s): {reason}")]
    RequestFailed {
        name: String,
        attempts: u32,
        reason: String,
    },

    /// The forwarder answered with a non-200 status.
    #[error("command rejected with {status_code}: {status_text}")]
    Rejected {
        status_code: u64,
        status_text: String,
    },

    /// Missing or invalid client configuration, raised before any I/O.
    #[error("configuration error: {0}")]
    Config(String),

    #[error("no face found with URI {0}")]
    FaceNotFound(String),

    /// Any other failure of the face or signer.
    #[error(transparent)]
    Transport(Error),
}

impl From<Error> for ManagementError {
    fn from(e: Error) -> Self {
        match e {
            Error::Tlv(msg) | Error::NdnPacket(msg) => ManagementError::Malformed(msg),
            Error::Config(msg) => ManagementError::Config(msg),
            other => ManagementError::Transport(other),
        }
    }
}

impl ManagementError {
    /// The forwarder's status code, when the command was rejected.
    pub fn status_code(&self) -> Option<u64> {
        match self {
            ManagementError::Rejected { status_code, .. } => Some(*status_code),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ManagementError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_common_errors_are_classified() {
        assert!(matches!(
            ManagementError::from(Error::Tlv("short".into())),
            ManagementError::Malformed(_)
        ));
        assert!(matches!(
            ManagementError::from(Error::Config("no signer".into())),
            ManagementError::Config(_)
        ));
        assert!(matches!(
            ManagementError::from(Error::Timeout("/a".into())),
            ManagementError::Transport(Error::Timeout(_))
        ));
    }

    #[test]
    fn test_rejected_carries_status() {
        let e = ManagementError::Rejected {
            status_code: 404,
            status_text: "Not Found".into(),
        };
        assert_eq!(e.status_code(), Some(404));
        assert_eq!(e.to_string(), "command rejected with 404: Not Found");
    }
}
