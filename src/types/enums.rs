//! Enumerated fields and their integer codes.
//!
//! Codes outside the known table decode to a `None`/`Unknown` variant so
//! newer forwarders stay readable.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::fmt;

// Encoded for a `None` variant; no defined value uses it, so it decodes back to `None`.
const NONE_CODE: u64 = 255;

/// Whether a face is local to the forwarder's host.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FaceScope {
    NonLocal,
    Local,
    #[default]
    None,
}

impl FaceScope {
    pub fn from_code(code: u64) -> Self {
        match code {
            0 => FaceScope::NonLocal,
            1 => FaceScope::Local,
            _ => FaceScope::None,
        }
    }

    pub fn code(self) -> u64 {
        match self {
            FaceScope::NonLocal => 0,
            FaceScope::Local => 1,
            FaceScope::None => NONE_CODE,
        }
    }
}

impl fmt::Display for FaceScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FaceScope::NonLocal => "NON_LOCAL",
            FaceScope::Local => "LOCAL",
            FaceScope::None => "NONE",
        })
    }
}

/// How long a face outlives its last use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FacePersistency {
    Persistent,
    OnDemand,
    Permanent,
    #[default]
    None,
}

impl FacePersistency {
    pub fn from_code(code: u64) -> Self {
        match code {
            0 => FacePersistency::Persistent,
            1 => FacePersistency::OnDemand,
            2 => FacePersistency::Permanent,
            _ => FacePersistency::None,
        }
    }

    pub fn code(self) -> u64 {
        match self {
            FacePersistency::Persistent => 0,
            FacePersistency::OnDemand => 1,
            FacePersistency::Permanent => 2,
            FacePersistency::None => NONE_CODE,
        }
    }
}

impl fmt::Display for FacePersistency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FacePersistency::Persistent => "PERSISTENT",
            FacePersistency::OnDemand => "ON_DEMAND",
            FacePersistency::Permanent => "PERMANENT",
            FacePersistency::None => "NONE",
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LinkType {
    PointToPoint,
    MultiAccess,
    AdHoc,
    #[default]
    None,
}

impl LinkType {
    pub fn from_code(code: u64) -> Self {
        match code {
            0 => LinkType::PointToPoint,
            1 => LinkType::MultiAccess,
            2 => LinkType::AdHoc,
            _ => LinkType::None,
        }
    }

    pub fn code(self) -> u64 {
        match self {
            LinkType::PointToPoint => 0,
            LinkType::MultiAccess => 1,
            LinkType::AdHoc => 2,
            LinkType::None => NONE_CODE,
        }
    }
}

impl fmt::Display for LinkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LinkType::PointToPoint => "POINT_TO_POINT",
            LinkType::MultiAccess => "MULTI_ACCESS",
            LinkType::AdHoc => "AD_HOC",
            LinkType::None => "NONE",
        })
    }
}

/// Who installed a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RouteOrigin {
    App,
    AutoReg,
    Client,
    AutoConf,
    Nlsr,
    PrefixAnn,
    Static,
    /// A code this client does not know, kept so it re-encodes unchanged
    Unknown(u64),
}

impl RouteOrigin {
    pub fn from_code(code: u64) -> Self {
        match code {
            0 => RouteOrigin::App,
            64 => RouteOrigin::AutoReg,
            65 => RouteOrigin::Client,
            66 => RouteOrigin::AutoConf,
            128 => RouteOrigin::Nlsr,
            129 => RouteOrigin::PrefixAnn,
            255 => RouteOrigin::Static,
            other => RouteOrigin::Unknown(other),
        }
    }

    pub fn code(self) -> u64 {
        match self {
            RouteOrigin::App => 0,
            RouteOrigin::AutoReg => 64,
            RouteOrigin::Client => 65,
            RouteOrigin::AutoConf => 66,
            RouteOrigin::Nlsr => 128,
            RouteOrigin::PrefixAnn => 129,
            RouteOrigin::Static => 255,
            RouteOrigin::Unknown(code) => code,
        }
    }
}

/// Per-packet fields a local face can turn on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LocalControlFeature {
    IncomingFaceId,
    NextHopFaceId,
    CachingPolicy,
}

impl LocalControlFeature {
    pub fn from_code(code: u64) -> Option<Self> {
        match code {
            1 => Some(LocalControlFeature::IncomingFaceId),
            2 => Some(LocalControlFeature::NextHopFaceId),
            3 => Some(LocalControlFeature::CachingPolicy),
            _ => None,
        }
    }

    pub fn code(self) -> u64 {
        match self {
            LocalControlFeature::IncomingFaceId => 1,
            LocalControlFeature::NextHopFaceId => 2,
            LocalControlFeature::CachingPolicy => 3,
        }
    }
}

bitflags! {
    /// Route inheritance flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct RouteFlags: u64 {
        /// Descendant prefixes also use this route.
        const CHILD_INHERIT = 1;
        /// Longer prefixes do not see routes registered above this one.
        const CAPTURE       = 2;
    }
}

bitflags! {
    /// Face property flags reported in FaceStatus.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct FaceFlags: u64 {
        const LOCAL_FIELDS_ENABLED       = 1;
        const LP_RELIABILITY_ENABLED     = 2;
        const CONGESTION_MARKING_ENABLED = 4;
    }
}

/// Well-known forwarding strategy names.
pub mod strategies {
    pub const BEST_ROUTE: &str = "/localhost/nfd/strategy/best-route";
    pub const BROADCAST: &str = "/localhost/nfd/strategy/broadcast";
    pub const CLIENT_CONTROL: &str = "/localhost/nfd/strategy/client-control";
    pub const NCC: &str = "/localhost/nfd/strategy/ncc";
    pub const MULTICAST: &str = "/localhost/nfd/strategy/multicast";
}
