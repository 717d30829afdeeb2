//! Configuration for the management client.
//!
//! Options come from built-in defaults, optionally overlaid by a config file
//! and `NDN_MGMT_*` environment variables.

use config::{Config, Environment, File};
use ndn_mgmt_common::{Error, Result};
use serde::{Deserialize, Serialize};
use std::{fmt, path::Path, path::PathBuf};

use crate::{
    DEFAULT_FACE_URI, DEFAULT_INTEREST_LIFETIME_MS, DEFAULT_MAX_ATTEMPTS, NFD_TCP_PORT,
};

/// Client configuration options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientOptions {
    /// Where the forwarder listens, `unix://<path>` or `tcp[4|6]://host[:port]`
    pub face_uri: String,

    /// Lifetime of every management Interest (in milliseconds)
    pub interest_lifetime_ms: u64,

    /// Attempts per Interest, retransmitting only after a timeout
    pub max_attempts: u32,

    /// Prefix under which management commands and datasets live
    pub command_prefix: String,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            face_uri: DEFAULT_FACE_URI.to_string(),
            interest_lifetime_ms: DEFAULT_INTEREST_LIFETIME_MS,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            command_prefix: "/localhost/nfd".to_string(),
        }
    }
}

impl ClientOptions {
    /// Load options, layering an optional file and the environment over the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }
        let settings = builder
            .add_source(Environment::with_prefix("NDN_MGMT"))
            .build()
            .map_err(|e| Error::Config(format!("Failed to load client options: {}", e)))?;

        let options: Self = settings
            .try_deserialize()
            .map_err(|e| Error::Config(format!("Invalid client options: {}", e)))?;
        options.validate()?;
        Ok(options)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_attempts == 0 {
            return Err(Error::Config("max_attempts must be at least 1".into()));
        }
        if self.interest_lifetime_ms == 0 {
            return Err(Error::Config("interest_lifetime_ms must be positive".into()));
        }
        if !self.command_prefix.starts_with('/') {
            return Err(Error::Config(format!(
                "command_prefix must be an absolute name: {}",
                self.command_prefix
            )));
        }
        self.face_uri().map(|_| ())
    }

    pub fn face_uri(&self) -> Result<FaceUri> {
        self.face_uri.parse()
    }
}

/// Parsed forwarder address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FaceUri {
    Unix(PathBuf),
    /// `host:port`
    Tcp(String),
}

impl std::str::FromStr for FaceUri {
    type Err = Error;

    fn from_str(uri: &str) -> Result<Self> {
        if let Some(path) = uri.strip_prefix("unix://") {
            if path.is_empty() {
                return Err(Error::Config(format!("Missing socket path in {}", uri)));
            }
            return Ok(FaceUri::Unix(PathBuf::from(path)));
        }

        let authority = ["tcp://", "tcp4://", "tcp6://"]
            .iter()
            .find_map(|scheme| uri.strip_prefix(scheme))
            .ok_or_else(|| Error::Config(format!("Unsupported face URI: {}", uri)))?;
        let authority = authority.trim_end_matches('/');
        if authority.is_empty() {
            return Err(Error::Config(format!("Missing host in {}", uri)));
        }

        let has_port = match authority.rfind(':') {
            // [v6]:port or host:port, but not a bare v6 literal
            Some(idx) => {
                (authority.starts_with('[') && authority[..idx].ends_with(']'))
                    || (!authority.starts_with('[') && authority.matches(':').count() == 1)
            }
            None => false,
        };
        if has_port {
            Ok(FaceUri::Tcp(authority.to_string()))
        } else {
            Ok(FaceUri::Tcp(format!("{}:{}", authority, NFD_TCP_PORT)))
        }
    }
}

impl fmt::Display for FaceUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FaceUri::Unix(path) => write!(f, "unix://{}", path.display()),
            FaceUri::Tcp(addr) => write!(f, "tcp://{}", addr),
        }
    }
}
