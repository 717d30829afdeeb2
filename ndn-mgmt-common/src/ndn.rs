//! NDN packet types and structures.
//!
//! This module provides names, Interest and Data packets and the NDNLPv2
//! wrapper the forwarder uses to deliver Nacks to local applications.

use crate::error::Error;
use crate::tlv::{self, TlvDecoder, TlvEncoder};
use bytes::Bytes;
use log::{debug, trace};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Default Interest lifetime in milliseconds.
pub const DEFAULT_INTEREST_LIFETIME_MS: u64 = 4000;

/// Maximum size of an NDN packet.
pub const MAX_NDN_PACKET_SIZE: usize = 8800;

/// Signature type codes carried in SignatureInfo.
pub mod signature_type {
    pub const DIGEST_SHA256: u64 = 0;
    pub const SHA256_WITH_RSA: u64 = 1;
    pub const SHA256_WITH_ECDSA: u64 = 3;
    pub const HMAC_WITH_SHA256: u64 = 4;
}

// Legacy naming-convention markers.
const SEGMENT_MARKER: u8 = 0x00;
const VERSION_MARKER: u8 = 0xFD;

/// Represents an NDN name component.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NameComponent {
    tlv_type: u64,
    value: Bytes,
}

impl NameComponent {
    /// Creates a new generic name component from a byte slice.
    pub fn new(bytes: impl Into<Bytes>) -> Self {
        Self::typed(tlv::TLV_COMPONENT, bytes)
    }

    /// Creates a component of an arbitrary component type.
    pub fn typed(tlv_type: u64, bytes: impl Into<Bytes>) -> Self {
        Self {
            tlv_type,
            value: bytes.into(),
        }
    }

    /// Generic component whose value is a NonNegativeInteger.
    pub fn from_number(number: u64) -> Self {
        Self::new(non_negative_integer_bytes(number))
    }

    pub fn from_segment(segment: u64) -> Self {
        Self::typed(tlv::TLV_SEGMENT_COMPONENT, non_negative_integer_bytes(segment))
    }

    pub fn from_version(version: u64) -> Self {
        Self::typed(tlv::TLV_VERSION_COMPONENT, non_negative_integer_bytes(version))
    }

    pub fn tlv_type(&self) -> u64 {
        self.tlv_type
    }

    /// Returns the component value as bytes.
    pub fn as_bytes(&self) -> &Bytes {
        &self.value
    }

    /// Interpret the value as a NonNegativeInteger.
    pub fn to_number(&self) -> Result<u64, Error> {
        parse_non_negative_integer(&self.value)
    }

    /// Segment number, from a typed segment component or a legacy 0x00 marker.
    pub fn to_segment(&self) -> Result<u64, Error> {
        self.to_marked_number(tlv::TLV_SEGMENT_COMPONENT, SEGMENT_MARKER)
            .map_err(|_| Error::NdnPacket(format!("Component {} is not a segment number", self)))
    }

    /// Version number, from a typed version component or a legacy 0xFD marker.
    pub fn to_version(&self) -> Result<u64, Error> {
        self.to_marked_number(tlv::TLV_VERSION_COMPONENT, VERSION_MARKER)
            .map_err(|_| Error::NdnPacket(format!("Component {} is not a version number", self)))
    }

    pub fn is_segment(&self) -> bool {
        self.to_segment().is_ok()
    }

    pub fn is_version(&self) -> bool {
        self.to_version().is_ok()
    }

    fn to_marked_number(&self, typed: u64, marker: u8) -> Result<u64, Error> {
        if self.tlv_type == typed {
            return parse_non_negative_integer(&self.value);
        }
        match self.value.split_first() {
            Some((&first, rest)) if self.tlv_type == tlv::TLV_COMPONENT && first == marker => {
                parse_non_negative_integer(rest)
            }
            _ => Err(Error::NdnPacket("unmarked component".into())),
        }
    }

    /// Encodes this component (backward).
    pub fn encode(&self, encoder: &mut TlvEncoder) {
        encoder.write_blob_tlv(self.tlv_type, &self.value);
    }

    /// Decodes one component of any type.
    pub fn decode(decoder: &mut TlvDecoder<'_>) -> Result<Self, Error> {
        let (tlv_type, value) = decoder.read_element()?;
        if tlv_type == tlv::TLV_NAME || tlv_type == 0 || tlv_type > 0xFFFF {
            return Err(Error::NdnPacket(format!(
                "Invalid name component TLV type {}",
                tlv_type
            )));
        }
        Ok(Self::typed(tlv_type, Bytes::copy_from_slice(value)))
    }

    fn parse_uri(text: &str) -> Result<Self, Error> {
        if let Some(number) = text.strip_prefix("seg=") {
            return parse_decimal(number).map(Self::from_segment);
        }
        if let Some(number) = text.strip_prefix("v=") {
            return parse_decimal(number).map(Self::from_version);
        }
        if let Some(hex) = text.strip_prefix("sha256digest=") {
            return decode_hex(hex).map(|digest| Self::typed(tlv::TLV_IMPLICIT_SHA256_DIGEST, digest));
        }

        let mut value = percent_decode(text)?;
        if !value.is_empty() && value.iter().all(|&b| b == b'.') {
            if value.len() < 3 {
                return Err(Error::NdnPacket(format!("Illegal name component '{}'", text)));
            }
            value.drain(..3);
        }
        Ok(Self::new(value))
    }
}

impl fmt::Display for NameComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.tlv_type {
            tlv::TLV_SEGMENT_COMPONENT => match self.to_number() {
                Ok(n) => return write!(f, "seg={}", n),
                Err(_) => {}
            },
            tlv::TLV_VERSION_COMPONENT => match self.to_number() {
                Ok(n) => return write!(f, "v={}", n),
                Err(_) => {}
            },
            tlv::TLV_IMPLICIT_SHA256_DIGEST => {
                write!(f, "sha256digest=")?;
                for &b in self.value.iter() {
                    write!(f, "{:02x}", b)?;
                }
                return Ok(());
            }
            tlv::TLV_COMPONENT => {}
            other => write!(f, "{}=", other)?,
        }

        if self.value.iter().all(|&b| b == b'.') {
            write!(f, "...")?;
        }
        for &b in self.value.iter() {
            if b.is_ascii_alphanumeric() || matches!(b, b'-' | b'.' | b'_' | b'~') {
                write!(f, "{}", b as char)?;
            } else {
                write!(f, "%{:02X}", b)?;
            }
        }
        Ok(())
    }
}

/// Represents an NDN name, which is a sequence of name components.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Name {
    components: Vec<NameComponent>,
}

impl Name {
    /// Creates a new empty NDN name.
    pub fn new() -> Self {
        Self {
            components: Vec::new(),
        }
    }

    /// Parses an NDN URI such as `/localhost/nfd/faces/list` or `ndn:/a/seg=3`.
    pub fn from_string(s: &str) -> Result<Self, Error> {
        let path = s.strip_prefix("ndn:").unwrap_or(s);
        let components = path
            .split('/')
            .filter(|comp| !comp.is_empty())
            .map(NameComponent::parse_uri)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { components })
    }

    /// Adds a component to the name.
    pub fn push(&mut self, component: NameComponent) -> &mut Self {
        self.components.push(component);
        self
    }

    /// Returns a copy of this name extended by `component`.
    pub fn append(mut self, component: NameComponent) -> Self {
        self.components.push(component);
        self
    }

    pub fn append_segment(self, segment: u64) -> Self {
        self.append(NameComponent::from_segment(segment))
    }

    pub fn append_version(self, version: u64) -> Self {
        self.append(NameComponent::from_version(version))
    }

    /// Returns the number of components in the name.
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Returns true if the name has no components.
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Returns an iterator over the name components.
    pub fn components(&self) -> impl Iterator<Item = &NameComponent> {
        self.components.iter()
    }

    /// Gets a component at the specified index.
    pub fn get(&self, index: usize) -> Option<&NameComponent> {
        self.components.get(index)
    }

    /// Gets a component counting from the end; `0` is the last one.
    pub fn get_from_end(&self, index: usize) -> Option<&NameComponent> {
        self.components.len().checked_sub(index + 1).and_then(|i| self.components.get(i))
    }

    /// Returns a prefix of this name with the specified length.
    pub fn prefix(&self, len: usize) -> Self {
        Self {
            components: self.components.iter().take(len).cloned().collect(),
        }
    }

    /// Checks if this name is a prefix of another name.
    pub fn is_prefix_of(&self, other: &Self) -> bool {
        self.len() <= other.len()
            && self
                .components
                .iter()
                .zip(other.components.iter())
                .all(|(a, b)| a == b)
    }

    /// Encodes this name (backward), components last-to-first.
    pub fn encode(&self, encoder: &mut TlvEncoder) {
        encoder.write_nested(tlv::TLV_NAME, |enc| {
            for component in self.components.iter().rev() {
                component.encode(enc);
            }
        });
    }

    /// Decodes a name element.
    pub fn decode(decoder: &mut TlvDecoder<'_>) -> Result<Self, Error> {
        let end = decoder.read_nested_tlvs_start(tlv::TLV_NAME)?;
        let mut components = Vec::new();
        while decoder.offset() < end {
            components.push(NameComponent::decode(decoder)?);
        }
        if decoder.offset() != end {
            return Err(Error::Tlv("Name component overruns the Name element".into()));
        }
        Ok(Self { components })
    }

    pub fn wire_encode(&self) -> Bytes {
        let mut encoder = TlvEncoder::new();
        self.encode(&mut encoder);
        encoder.finish()
    }

    pub fn wire_decode(input: &[u8]) -> Result<Self, Error> {
        let mut decoder = TlvDecoder::new(input);
        let name = Self::decode(&mut decoder)?;
        decoder.finish_nested_tlvs(input.len())?;
        Ok(name)
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.components.is_empty() {
            return write!(f, "/");
        }

        for component in &self.components {
            write!(f, "/{}", component)?;
        }

        Ok(())
    }
}

impl FromStr for Name {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_string(s)
    }
}

/// Represents an NDN Interest packet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interest {
    /// The name requested in the Interest.
    pub name: Name,

    /// A nonce value to prevent looping.
    pub nonce: u32,

    /// Interest lifetime in milliseconds.
    pub lifetime_ms: u64,

    /// Hop limit (similar to IP TTL).
    pub hop_limit: Option<u8>,

    /// Whether a Data whose name merely starts with `name` can satisfy it.
    pub can_be_prefix: bool,

    /// Whether cached Data must still be fresh.
    pub must_be_fresh: bool,
}

impl Interest {
    /// Creates a new Interest packet with a random nonce.
    pub fn new(name: Name) -> Self {
        Self {
            name,
            nonce: rand::random(),
            lifetime_ms: DEFAULT_INTEREST_LIFETIME_MS,
            hop_limit: None,
            can_be_prefix: false,
            must_be_fresh: false,
        }
    }

    /// Sets the Interest lifetime.
    pub fn with_lifetime(mut self, lifetime_ms: u64) -> Self {
        self.lifetime_ms = lifetime_ms;
        self
    }

    /// Sets the nonce value.
    pub fn with_nonce(mut self, nonce: u32) -> Self {
        self.nonce = nonce;
        self
    }

    /// Sets the can_be_prefix flag.
    pub fn with_can_be_prefix(mut self, can_be_prefix: bool) -> Self {
        self.can_be_prefix = can_be_prefix;
        self
    }

    /// Sets the must_be_fresh flag.
    pub fn with_must_be_fresh(mut self, must_be_fresh: bool) -> Self {
        self.must_be_fresh = must_be_fresh;
        self
    }

    pub fn with_hop_limit(mut self, hop_limit: u8) -> Self {
        self.hop_limit = Some(hop_limit);
        self
    }

    /// Replace the nonce, as required when an Interest is retransmitted.
    pub fn refresh_nonce(&mut self) {
        self.nonce = rand::random();
    }

    pub fn lifetime(&self) -> Duration {
        Duration::from_millis(self.lifetime_ms)
    }

    /// Whether `data` satisfies this Interest.
    pub fn matches_data(&self, data: &Data) -> bool {
        if self.can_be_prefix {
            self.name.is_prefix_of(&data.name)
        } else {
            self.name == data.name
        }
    }

    pub fn wire_encode(&self) -> Bytes {
        let mut encoder = TlvEncoder::new();
        encoder.write_nested(tlv::TLV_INTEREST, |enc| {
            if let Some(hop_limit) = self.hop_limit {
                enc.write_blob_tlv(tlv::TLV_HOP_LIMIT, &[hop_limit]);
            }
            if self.lifetime_ms != DEFAULT_INTEREST_LIFETIME_MS {
                enc.write_non_negative_integer_tlv(tlv::TLV_INTEREST_LIFETIME, self.lifetime_ms);
            }
            enc.write_blob_tlv(tlv::TLV_NONCE, &self.nonce.to_be_bytes());
            if self.must_be_fresh {
                enc.write_empty_tlv(tlv::TLV_MUST_BE_FRESH);
            }
            if self.can_be_prefix {
                enc.write_empty_tlv(tlv::TLV_CAN_BE_PREFIX);
            }
            self.name.encode(enc);
        });
        encoder.finish()
    }

    pub fn wire_decode(input: &[u8]) -> Result<Self, Error> {
        let mut decoder = TlvDecoder::new(input);
        let end = decoder.read_nested_tlvs_start(tlv::TLV_INTEREST)?;

        let name = Name::decode(&mut decoder)?;
        let can_be_prefix = decoder.read_boolean_tlv(tlv::TLV_CAN_BE_PREFIX, end)?;
        let must_be_fresh = decoder.read_boolean_tlv(tlv::TLV_MUST_BE_FRESH, end)?;
        let nonce = match decoder.read_optional_blob_tlv(tlv::TLV_NONCE, end)? {
            Some(bytes) => {
                let bytes: [u8; 4] = bytes
                    .try_into()
                    .map_err(|_| Error::NdnPacket("Nonce must be 4 bytes".into()))?;
                u32::from_be_bytes(bytes)
            }
            None => 0,
        };
        let lifetime_ms = decoder
            .read_optional_non_negative_integer_tlv(tlv::TLV_INTEREST_LIFETIME, end)?
            .unwrap_or(DEFAULT_INTEREST_LIFETIME_MS);
        let hop_limit = match decoder.read_optional_blob_tlv(tlv::TLV_HOP_LIMIT, end)? {
            Some([hop]) => Some(*hop),
            Some(_) => return Err(Error::NdnPacket("HopLimit must be 1 byte".into())),
            None => None,
        };
        // ApplicationParameters and anything after it are not interpreted here.
        while decoder.offset() < end {
            decoder.read_element()?;
        }
        decoder.finish_nested_tlvs(end)?;
        decoder.finish_nested_tlvs(input.len())?;

        Ok(Self {
            name,
            nonce,
            lifetime_ms,
            hop_limit,
            can_be_prefix,
            must_be_fresh,
        })
    }
}

/// MetaInfo block of a Data packet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetaInfo {
    pub content_type: Option<u64>,
    pub freshness_period_ms: Option<u64>,
    /// Last segment of a bounded segmented stream.
    pub final_block_id: Option<NameComponent>,
}

impl MetaInfo {
    fn encode(&self, encoder: &mut TlvEncoder) {
        encoder.write_nested(tlv::TLV_META_INFO, |enc| {
            if let Some(final_block_id) = &self.final_block_id {
                enc.write_nested(tlv::TLV_FINAL_BLOCK_ID, |enc| final_block_id.encode(enc));
            }
            enc.write_optional_non_negative_integer_tlv(
                tlv::TLV_FRESHNESS_PERIOD,
                self.freshness_period_ms,
            );
            enc.write_optional_non_negative_integer_tlv(tlv::TLV_CONTENT_TYPE, self.content_type);
        });
    }

    fn decode(decoder: &mut TlvDecoder<'_>) -> Result<Self, Error> {
        let end = decoder.read_nested_tlvs_start(tlv::TLV_META_INFO)?;
        let content_type = decoder.read_optional_non_negative_integer_tlv(tlv::TLV_CONTENT_TYPE, end)?;
        let freshness_period_ms =
            decoder.read_optional_non_negative_integer_tlv(tlv::TLV_FRESHNESS_PERIOD, end)?;
        let final_block_id = if decoder.peek_type(tlv::TLV_FINAL_BLOCK_ID, end) {
            let inner_end = decoder.read_nested_tlvs_start(tlv::TLV_FINAL_BLOCK_ID)?;
            let component = NameComponent::decode(decoder)?;
            decoder.finish_nested_tlvs(inner_end)?;
            Some(component)
        } else {
            None
        };
        decoder.finish_nested_tlvs(end)?;
        Ok(Self {
            content_type,
            freshness_period_ms,
            final_block_id,
        })
    }
}

/// KeyLocator of a signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyLocator {
    Name(Name),
    KeyDigest(Bytes),
}

impl KeyLocator {
    fn encode(&self, encoder: &mut TlvEncoder) {
        encoder.write_nested(tlv::TLV_KEY_LOCATOR, |enc| match self {
            KeyLocator::Name(name) => name.encode(enc),
            KeyLocator::KeyDigest(digest) => enc.write_blob_tlv(tlv::TLV_KEY_DIGEST, digest),
        });
    }

    fn decode(decoder: &mut TlvDecoder<'_>) -> Result<Self, Error> {
        let end = decoder.read_nested_tlvs_start(tlv::TLV_KEY_LOCATOR)?;
        let locator = if decoder.peek_type(tlv::TLV_NAME, end) {
            KeyLocator::Name(Name::decode(decoder)?)
        } else {
            KeyLocator::KeyDigest(Bytes::copy_from_slice(
                decoder.read_blob_tlv(tlv::TLV_KEY_DIGEST)?,
            ))
        };
        decoder.finish_nested_tlvs(end)?;
        Ok(locator)
    }
}

/// SignatureInfo block of a Data packet or signed command Interest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureInfo {
    pub signature_type: u64,
    pub key_locator: Option<KeyLocator>,
}

impl Default for SignatureInfo {
    fn default() -> Self {
        Self {
            signature_type: signature_type::DIGEST_SHA256,
            key_locator: None,
        }
    }
}

impl SignatureInfo {
    pub fn encode(&self, encoder: &mut TlvEncoder) {
        encoder.write_nested(tlv::TLV_SIGNATURE_INFO, |enc| {
            if let Some(key_locator) = &self.key_locator {
                key_locator.encode(enc);
            }
            enc.write_non_negative_integer_tlv(tlv::TLV_SIGNATURE_TYPE, self.signature_type);
        });
    }

    pub fn wire_encode(&self) -> Bytes {
        let mut encoder = TlvEncoder::new();
        self.encode(&mut encoder);
        encoder.finish()
    }

    pub fn decode(decoder: &mut TlvDecoder<'_>) -> Result<Self, Error> {
        let end = decoder.read_nested_tlvs_start(tlv::TLV_SIGNATURE_INFO)?;
        let signature_type = decoder.read_non_negative_integer_tlv(tlv::TLV_SIGNATURE_TYPE)?;
        let key_locator = if decoder.peek_type(tlv::TLV_KEY_LOCATOR, end) {
            Some(KeyLocator::decode(decoder)?)
        } else {
            None
        };
        decoder.finish_nested_tlvs(end)?;
        Ok(Self {
            signature_type,
            key_locator,
        })
    }
}

/// Represents an NDN Data packet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Data {
    /// The name of the Data packet.
    pub name: Name,

    pub meta_info: MetaInfo,

    /// The content of the Data packet.
    pub content: Bytes,

    pub signature_info: SignatureInfo,

    pub signature_value: Bytes,
}

impl Data {
    /// Creates a new Data packet with an empty DigestSha256 placeholder signature.
    pub fn new(name: Name, content: impl Into<Bytes>) -> Self {
        Self {
            name,
            meta_info: MetaInfo::default(),
            content: content.into(),
            signature_info: SignatureInfo::default(),
            signature_value: Bytes::from_static(&[0u8; 32]),
        }
    }

    pub fn with_final_block_id(mut self, final_block_id: NameComponent) -> Self {
        self.meta_info.final_block_id = Some(final_block_id);
        self
    }

    pub fn with_freshness_period(mut self, freshness_period_ms: u64) -> Self {
        self.meta_info.freshness_period_ms = Some(freshness_period_ms);
        self
    }

    pub fn with_signature_info(mut self, signature_info: SignatureInfo) -> Self {
        self.signature_info = signature_info;
        self
    }

    pub fn final_block_id(&self) -> Option<&NameComponent> {
        self.meta_info.final_block_id.as_ref()
    }

    pub fn wire_encode(&self) -> Bytes {
        let mut encoder = TlvEncoder::new();
        encoder.write_nested(tlv::TLV_DATA, |enc| {
            enc.write_blob_tlv(tlv::TLV_SIGNATURE_VALUE, &self.signature_value);
            self.signature_info.encode(enc);
            enc.write_blob_tlv(tlv::TLV_CONTENT, &self.content);
            self.meta_info.encode(enc);
            self.name.encode(enc);
        });
        encoder.finish()
    }

    pub fn wire_decode(input: &[u8]) -> Result<Self, Error> {
        let mut decoder = TlvDecoder::new(input);
        let end = decoder.read_nested_tlvs_start(tlv::TLV_DATA)?;

        let name = Name::decode(&mut decoder)?;
        let meta_info = if decoder.peek_type(tlv::TLV_META_INFO, end) {
            MetaInfo::decode(&mut decoder)?
        } else {
            MetaInfo::default()
        };
        let content = decoder
            .read_optional_blob_tlv(tlv::TLV_CONTENT, end)?
            .map(Bytes::copy_from_slice)
            .unwrap_or_default();
        let signature_info = SignatureInfo::decode(&mut decoder)?;
        let signature_value = Bytes::copy_from_slice(decoder.read_blob_tlv(tlv::TLV_SIGNATURE_VALUE)?);
        decoder.finish_nested_tlvs(end)?;
        decoder.finish_nested_tlvs(input.len())?;

        Ok(Self {
            name,
            meta_info,
            content,
            signature_info,
            signature_value,
        })
    }
}

/// A packet received from the forwarder.
#[derive(Debug, Clone)]
pub enum Packet {
    Interest(Interest),
    Data(Data),
    /// A network Nack for the enclosed Interest.
    Nack { interest: Interest, reason: u64 },
}

impl Packet {
    /// Decode a bare Interest/Data, or unwrap an NDNLPv2 LpPacket.
    pub fn wire_decode(input: &[u8]) -> Result<Self, Error> {
        let mut decoder = TlvDecoder::new(input);
        match decoder.read_var_number()? {
            tlv::TLV_INTEREST => Ok(Packet::Interest(Interest::wire_decode(input)?)),
            tlv::TLV_DATA => Ok(Packet::Data(Data::wire_decode(input)?)),
            tlv::TLV_LP_PACKET => Self::decode_lp_packet(input),
            other => Err(Error::NdnPacket(format!("Unknown packet type: {}", other))),
        }
    }

    fn decode_lp_packet(input: &[u8]) -> Result<Self, Error> {
        let mut decoder = TlvDecoder::new(input);
        let end = decoder.read_nested_tlvs_start(tlv::TLV_LP_PACKET)?;
        let mut nack_reason = None;
        let mut fragment = None;
        while decoder.offset() < end {
            let (tlv_type, value) = decoder.read_element()?;
            match tlv_type {
                tlv::TLV_LP_NACK => {
                    let mut inner = TlvDecoder::new(value);
                    let reason = inner
                        .read_optional_non_negative_integer_tlv(tlv::TLV_LP_NACK_REASON, value.len())?
                        .unwrap_or(0);
                    nack_reason = Some(reason);
                }
                tlv::TLV_LP_FRAGMENT => fragment = Some(value),
                other => trace!("Ignoring LpPacket header field {}", other),
            }
        }
        decoder.finish_nested_tlvs(end)?;

        let fragment = fragment.ok_or_else(|| Error::NdnPacket("LpPacket without fragment".into()))?;
        match (Self::wire_decode(fragment)?, nack_reason) {
            (Packet::Interest(interest), Some(reason)) => {
                debug!("Unwrapped Nack for {}, reason {}", interest.name, reason);
                Ok(Packet::Nack { interest, reason })
            }
            (packet, _) => Ok(packet),
        }
    }
}

/// The outcome of expressing an Interest.
#[derive(Debug, Clone)]
pub enum InterestResult {
    /// Matching Data arrived.
    Data(Data),

    /// The forwarder returned a Nack with this reason code.
    Nack(u64),

    /// The face went away before an answer arrived.
    NetworkError(String),
}

/* ---------------------------------------------------------------- *
 * Helpers
 * ---------------------------------------------------------------- */

fn non_negative_integer_bytes(value: u64) -> Bytes {
    let mut encoder = TlvEncoder::new();
    encoder.write_non_negative_integer(value);
    encoder.finish()
}

fn parse_non_negative_integer(bytes: &[u8]) -> Result<u64, Error> {
    let mut decoder = TlvDecoder::new(bytes);
    decoder.read_non_negative_integer(bytes.len())
}

fn parse_decimal(text: &str) -> Result<u64, Error> {
    text.parse()
        .map_err(|_| Error::NdnPacket(format!("Invalid number in name component: {}", text)))
}

fn decode_hex(text: &str) -> Result<Vec<u8>, Error> {
    if text.len() % 2 != 0 {
        return Err(Error::NdnPacket(format!("Odd-length hex string: {}", text)));
    }
    (0..text.len())
        .step_by(2)
        .map(|i| {
            u8::from_str_radix(&text[i..i + 2], 16)
                .map_err(|_| Error::NdnPacket(format!("Invalid hex string: {}", text)))
        })
        .collect()
}

fn percent_decode(text: &str) -> Result<Vec<u8>, Error> {
    let bytes = text.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = text
                .get(i + 1..i + 3)
                .ok_or_else(|| Error::NdnPacket(format!("Truncated escape in '{}'", text)))?;
            let byte = u8::from_str_radix(hex, 16)
                .map_err(|_| Error::NdnPacket(format!("Invalid escape in '{}'", text)))?;
            out.push(byte);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    Ok(out)
}
