//! Management records and their TLV encodings.
//!
//! Type codes are scoped to the dataset they appear in: FaceStatus, FibEntry,
//! RibEntry and StrategyChoice all use 128 as their outer type, so the caller
//! must know which record it is decoding.

use bytes::Bytes;
use ndn_mgmt_common::{
    tlv::{TlvDecoder, TlvEncoder},
    Error, Result,
};

mod channel_status;
mod control_parameters;
mod control_response;
mod enums;
mod face_status;
mod fib_entry;
mod forwarder_status;
mod rib_entry;
mod strategy_choice;

pub use channel_status::ChannelStatus;
pub use control_parameters::ControlParameters;
pub use control_response::ControlResponse;
pub use enums::{
    strategies, FaceFlags, FacePersistency, FaceScope, LinkType, LocalControlFeature, RouteFlags,
    RouteOrigin,
};
pub use face_status::FaceStatus;
pub use fib_entry::{FibEntry, NextHopRecord};
pub use forwarder_status::ForwarderStatus;
pub use rib_entry::{RibEntry, Route};
pub use strategy_choice::StrategyChoice;

/// TLV type codes of the management protocol.
pub mod tlv_type {
    // ControlParameters
    pub const CONTROL_PARAMETERS: u64 = 104;
    pub const FACE_ID: u64 = 105;
    pub const COST: u64 = 106;
    pub const STRATEGY: u64 = 107;
    pub const FLAGS: u64 = 108;
    pub const EXPIRATION_PERIOD: u64 = 109;
    pub const LOCAL_CONTROL_FEATURE: u64 = 110;
    pub const ORIGIN: u64 = 111;
    pub const URI: u64 = 114;

    // ControlResponse
    pub const CONTROL_RESPONSE: u64 = 101;
    pub const STATUS_CODE: u64 = 102;
    pub const STATUS_TEXT: u64 = 103;

    // ForwarderStatus
    pub const NFD_VERSION: u64 = 128;
    pub const START_TIMESTAMP: u64 = 129;
    pub const CURRENT_TIMESTAMP: u64 = 130;
    pub const N_NAME_TREE_ENTRIES: u64 = 131;
    pub const N_FIB_ENTRIES: u64 = 132;
    pub const N_PIT_ENTRIES: u64 = 133;
    pub const N_MEASUREMENTS_ENTRIES: u64 = 134;
    pub const N_CS_ENTRIES: u64 = 135;

    // Face management
    pub const FACE_STATUS: u64 = 128;
    pub const LOCAL_URI: u64 = 129;
    pub const CHANNEL_STATUS: u64 = 130;
    pub const FACE_SCOPE: u64 = 132;
    pub const FACE_PERSISTENCY: u64 = 133;
    pub const LINK_TYPE: u64 = 134;
    pub const BASE_CONGESTION_MARKING_INTERVAL: u64 = 135;
    pub const DEFAULT_CONGESTION_THRESHOLD: u64 = 136;
    pub const MTU: u64 = 137;
    pub const N_IN_INTERESTS: u64 = 144;
    pub const N_IN_DATA: u64 = 145;
    pub const N_OUT_INTERESTS: u64 = 146;
    pub const N_OUT_DATA: u64 = 147;
    pub const N_IN_BYTES: u64 = 148;
    pub const N_OUT_BYTES: u64 = 149;
    pub const N_IN_NACKS: u64 = 151;
    pub const N_OUT_NACKS: u64 = 152;

    // FIB management
    pub const FIB_ENTRY: u64 = 128;
    pub const NEXT_HOP_RECORD: u64 = 129;

    // RIB management
    pub const RIB_ENTRY: u64 = 128;
    pub const ROUTE: u64 = 129;

    // Strategy choice management
    pub const STRATEGY_CHOICE: u64 = 128;
}

/// A record with a TLV encoding.
pub trait TlvRecord: Sized {
    /// Encode into `encoder`, which grows toward the front.
    fn encode(&self, encoder: &mut TlvEncoder);

    /// Decode one record starting at the decoder's offset.
    fn decode(decoder: &mut TlvDecoder<'_>) -> Result<Self>;

    fn wire_encode(&self) -> Bytes {
        let mut encoder = TlvEncoder::new();
        self.encode(&mut encoder);
        encoder.finish()
    }

    /// Decode a buffer holding exactly one record.
    fn wire_decode(input: &[u8]) -> Result<Self> {
        let mut decoder = TlvDecoder::new(input);
        let record = Self::decode(&mut decoder)?;
        if decoder.offset() != input.len() {
            return Err(Error::Tlv(format!(
                "{} trailing bytes after record",
                input.len() - decoder.offset()
            )));
        }
        Ok(record)
    }
}

/// Decode consecutive sub-records of type `tlv_type` that start before `end`.
pub(crate) fn decode_repeated<T: TlvRecord>(
    decoder: &mut TlvDecoder<'_>,
    tlv_type: u64,
    end: usize,
) -> Result<Vec<T>> {
    let mut records = Vec::new();
    while decoder.peek_type(tlv_type, end) {
        records.push(T::decode(decoder)?);
    }
    Ok(records)
}

pub(crate) fn read_optional_string(
    decoder: &mut TlvDecoder<'_>,
    tlv_type: u64,
    end: usize,
) -> Result<Option<String>> {
    if decoder.peek_type(tlv_type, end) {
        decoder.read_string_tlv(tlv_type).map(Some)
    } else {
        Ok(None)
    }
}
