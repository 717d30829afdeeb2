//! Status dataset decoding.
//!
//! A dataset payload is the concatenation of every segment's content: a plain
//! sequence of encoded records with no framing of its own.

use log::trace;
use ndn_mgmt_common::{tlv::TlvDecoder, Result};

use crate::types::TlvRecord;

/// Decode every record in `payload`, in wire order.
///
/// Fails if any record is malformed or the final one runs past the end of
/// the payload; a dataset either decodes exactly or not at all.
pub fn decode_all<T: TlvRecord>(payload: &[u8]) -> Result<Vec<T>> {
    let mut decoder = TlvDecoder::new(payload);
    let mut records = Vec::new();

    while decoder.offset() < payload.len() {
        records.push(T::decode(&mut decoder)?);
    }

    trace!(
        "Decoded {} {} record(s) from {} bytes",
        records.len(),
        std::any::type_name::<T>(),
        payload.len()
    );
    Ok(records)
}
