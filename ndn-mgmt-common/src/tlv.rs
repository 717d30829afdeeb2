//! TLV (Type‑Length‑Value) encoding and decoding utilities.
//!
//! This module provides the NDN-TLV primitives used by every packet and
//! management record: VAR-NUMBER type/length fields, NonNegativeInteger
//! values, a backward-writing [`TlvEncoder`] and a bounded [`TlvDecoder`].

use crate::error::Error;
use bytes::{Buf, BufMut, Bytes, BytesMut};

/* ---------------------------------------------------------------- *
 * TLV type constants (packet format v0.3)
 * ---------------------------------------------------------------- */

pub const TLV_IMPLICIT_SHA256_DIGEST: u64 = 0x01;
pub const TLV_PARAMETERS_SHA256_DIGEST: u64 = 0x02;
pub const TLV_INTEREST: u64 = 0x05;
pub const TLV_DATA: u64 = 0x06;
pub const TLV_NAME: u64 = 0x07;
pub const TLV_COMPONENT: u64 = 0x08;
pub const TLV_NONCE: u64 = 0x0A;
pub const TLV_INTEREST_LIFETIME: u64 = 0x0C;
pub const TLV_MUST_BE_FRESH: u64 = 0x12;
pub const TLV_META_INFO: u64 = 0x14;
pub const TLV_CONTENT: u64 = 0x15;
pub const TLV_SIGNATURE_INFO: u64 = 0x16;
pub const TLV_SIGNATURE_VALUE: u64 = 0x17;
pub const TLV_CONTENT_TYPE: u64 = 0x18;
pub const TLV_FRESHNESS_PERIOD: u64 = 0x19;
pub const TLV_FINAL_BLOCK_ID: u64 = 0x1A;
pub const TLV_SIGNATURE_TYPE: u64 = 0x1B;
pub const TLV_KEY_LOCATOR: u64 = 0x1C;
pub const TLV_KEY_DIGEST: u64 = 0x1D;
pub const TLV_CAN_BE_PREFIX: u64 = 0x21;
pub const TLV_HOP_LIMIT: u64 = 0x22;
pub const TLV_APPLICATION_PARAMETERS: u64 = 0x24;
pub const TLV_SEGMENT_COMPONENT: u64 = 0x32;
pub const TLV_VERSION_COMPONENT: u64 = 0x36;

// NDNLPv2
pub const TLV_LP_PACKET: u64 = 0x64;
pub const TLV_LP_FRAGMENT: u64 = 0x50;
pub const TLV_LP_NACK: u64 = 0x0320;
pub const TLV_LP_NACK_REASON: u64 = 0x0321;

/// Returns true if an unrecognised element of this type must abort decoding.
pub fn is_critical(tlv_type: u64) -> bool {
    tlv_type <= 31 || tlv_type % 2 == 1
}

/* ---------------------------------------------------------------- *
 * Sizes
 * ---------------------------------------------------------------- */

/// Number of bytes a VAR-NUMBER occupies.
///
/// * `< 253`  → 1 byte
/// * `≤ 65 535`  → marker 253 + 2 bytes
/// * `≤ 2³² − 1` → marker 254 + 4 bytes
/// * otherwise → marker 255 + 8 bytes
pub fn var_number_size(value: u64) -> usize {
    if value < 253 {
        1
    } else if value <= 0xFFFF {
        3
    } else if value <= 0xFFFF_FFFF {
        5
    } else {
        9
    }
}

/// Number of bytes the minimal NonNegativeInteger encoding of `value` takes.
pub fn non_negative_integer_size(value: u64) -> usize {
    if value <= 0xFF {
        1
    } else if value <= 0xFFFF {
        2
    } else if value <= 0xFFFF_FFFF {
        4
    } else {
        8
    }
}

/* ---------------------------------------------------------------- *
 * Forward helpers
 * ---------------------------------------------------------------- */

/// Append a VAR-NUMBER to `buf`.
pub fn encode_var_number(value: u64, buf: &mut BytesMut) {
    if value < 253 {
        buf.put_u8(value as u8);
    } else if value <= 0xFFFF {
        buf.put_u8(253);
        buf.put_u16(value as u16);
    } else if value <= 0xFFFF_FFFF {
        buf.put_u8(254);
        buf.put_u32(value as u32);
    } else {
        buf.put_u8(255);
        buf.put_u64(value);
    }
}

/// Decode a VAR-NUMBER from `buf`.
pub fn decode_var_number(buf: &mut impl Buf) -> Result<u64, Error> {
    if !buf.has_remaining() {
        return Err(Error::Tlv("Buffer underflow when decoding VAR-NUMBER".into()));
    }

    let first_byte = buf.get_u8();
    let width = match first_byte {
        0..=252 => return Ok(first_byte as u64),
        253 => 2,
        254 => 4,
        255 => 8,
    };
    if buf.remaining() < width {
        return Err(Error::Tlv(format!(
            "Buffer underflow when decoding {}-byte VAR-NUMBER",
            width
        )));
    }
    Ok(match width {
        2 => buf.get_u16() as u64,
        4 => buf.get_u32() as u64,
        _ => buf.get_u64(),
    })
}

/// Size of the complete TLV element at the start of `input`, or `None` if
/// the bytes collected so far do not hold the whole element yet.
pub fn element_size(input: &[u8]) -> Option<usize> {
    let mut cursor = input;
    decode_var_number(&mut cursor).ok()?;
    let length = decode_var_number(&mut cursor).ok()? as usize;
    let header = input.len() - cursor.len();
    let total = header.checked_add(length)?;
    if total <= input.len() {
        Some(total)
    } else {
        None
    }
}

/* ---------------------------------------------------------------- *
 * TLV element wrapper
 * ---------------------------------------------------------------- */

/// A generic TLV element consisting of *type*, *length* and *value*.
#[derive(Debug, Clone, PartialEq)]
pub struct TlvElement {
    pub tlv_type: u64,
    pub value: Bytes,
}

impl TlvElement {
    /// Create a new wrapper from raw parts.
    pub fn new(tlv_type: u64, value: impl Into<Bytes>) -> Self {
        Self {
            tlv_type,
            value: value.into(),
        }
    }

    /// Total number of bytes when this element is encoded.
    pub fn len(&self) -> usize {
        let vlen = self.value.len();
        var_number_size(self.tlv_type) + var_number_size(vlen as u64) + vlen
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    /// Encode this element into `buf`.
    pub fn encode(&self, buf: &mut BytesMut) {
        encode_var_number(self.tlv_type, buf);
        encode_var_number(self.value.len() as u64, buf);
        buf.extend_from_slice(&self.value);
    }

    /// Decode a single element from `buf` **in‑place**.
    pub fn decode(buf: &mut impl Buf) -> Result<Self, Error> {
        let tlv_type = decode_var_number(buf)?;
        let length = decode_var_number(buf)? as usize;

        if buf.remaining() < length {
            return Err(Error::Tlv(format!(
                "Buffer underflow: TLV value requires {} bytes but only {} available",
                length,
                buf.remaining()
            )));
        }

        let value = buf.copy_to_bytes(length);
        Ok(Self { tlv_type, value })
    }
}

/* ---------------------------------------------------------------- *
 * Backward encoder
 * ---------------------------------------------------------------- */

/// Encoder that grows toward the front of the output.
///
/// Fields are written last-to-first: a composite writes its children, then
/// prepends its own type and length once the children's size is known.
#[derive(Debug, Default, Clone)]
pub struct TlvEncoder {
    // Output bytes in reverse order.
    reversed: Vec<u8>,
}

impl TlvEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of bytes written so far.
    pub fn len(&self) -> usize {
        self.reversed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reversed.is_empty()
    }

    /// Prepend raw bytes.
    pub fn prepend(&mut self, bytes: &[u8]) {
        self.reversed.extend(bytes.iter().rev());
    }

    pub fn write_var_number(&mut self, value: u64) {
        if value < 253 {
            self.reversed.push(value as u8);
        } else if value <= 0xFFFF {
            self.prepend(&(value as u16).to_be_bytes());
            self.reversed.push(253);
        } else if value <= 0xFFFF_FFFF {
            self.prepend(&(value as u32).to_be_bytes());
            self.reversed.push(254);
        } else {
            self.prepend(&value.to_be_bytes());
            self.reversed.push(255);
        }
    }

    pub fn write_type_and_length(&mut self, tlv_type: u64, length: usize) {
        self.write_var_number(length as u64);
        self.write_var_number(tlv_type);
    }

    /// Prepend the minimal NonNegativeInteger encoding of `value` (no header).
    pub fn write_non_negative_integer(&mut self, value: u64) {
        match non_negative_integer_size(value) {
            1 => self.reversed.push(value as u8),
            2 => self.prepend(&(value as u16).to_be_bytes()),
            4 => self.prepend(&(value as u32).to_be_bytes()),
            _ => self.prepend(&value.to_be_bytes()),
        }
    }

    pub fn write_non_negative_integer_tlv(&mut self, tlv_type: u64, value: u64) {
        let save = self.len();
        self.write_non_negative_integer(value);
        self.write_type_and_length(tlv_type, self.len() - save);
    }

    /// Write the element only when a value is present.
    pub fn write_optional_non_negative_integer_tlv(&mut self, tlv_type: u64, value: Option<u64>) {
        if let Some(value) = value {
            self.write_non_negative_integer_tlv(tlv_type, value);
        }
    }

    pub fn write_blob_tlv(&mut self, tlv_type: u64, value: &[u8]) {
        self.prepend(value);
        self.write_type_and_length(tlv_type, value.len());
    }

    pub fn write_optional_blob_tlv(&mut self, tlv_type: u64, value: Option<&[u8]>) {
        if let Some(value) = value {
            self.write_blob_tlv(tlv_type, value);
        }
    }

    /// Write a zero-length element, used for boolean flags.
    pub fn write_empty_tlv(&mut self, tlv_type: u64) {
        self.write_type_and_length(tlv_type, 0);
    }

    /// Run `children` and wrap whatever it wrote in a `tlv_type` header.
    pub fn write_nested<F>(&mut self, tlv_type: u64, children: F)
    where
        F: FnOnce(&mut Self),
    {
        let save = self.len();
        children(self);
        self.write_type_and_length(tlv_type, self.len() - save);
    }

    /// Consume the encoder and return the bytes in wire order.
    pub fn finish(self) -> Bytes {
        let mut out = self.reversed;
        out.reverse();
        Bytes::from(out)
    }
}

/* ---------------------------------------------------------------- *
 * Bounded decoder
 * ---------------------------------------------------------------- */

/// Cursor over an encoded buffer that reads fields in forward order.
///
/// Nested structures are bracketed by [`read_nested_tlvs_start`], which
/// returns the end offset of the element, and [`finish_nested_tlvs`], which
/// verifies the element was consumed exactly.
///
/// [`read_nested_tlvs_start`]: TlvDecoder::read_nested_tlvs_start
/// [`finish_nested_tlvs`]: TlvDecoder::finish_nested_tlvs
#[derive(Debug, Clone)]
pub struct TlvDecoder<'a> {
    input: &'a [u8],
    offset: usize,
}

impl<'a> TlvDecoder<'a> {
    pub fn new(input: &'a [u8]) -> Self {
        Self { input, offset: 0 }
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn input_len(&self) -> usize {
        self.input.len()
    }

    pub fn remaining(&self) -> usize {
        self.input.len() - self.offset
    }

    pub fn read_var_number(&mut self) -> Result<u64, Error> {
        let mut cursor = &self.input[self.offset..];
        let before = cursor.len();
        let value = decode_var_number(&mut cursor)?;
        self.offset += before - cursor.len();
        Ok(value)
    }

    fn peek_var_number(&self) -> Option<u64> {
        let mut cursor = &self.input[self.offset..];
        decode_var_number(&mut cursor).ok()
    }

    /// True if the next element has type `expected` and starts before `end`.
    pub fn peek_type(&self, expected: u64, end: usize) -> bool {
        self.offset < end && self.peek_var_number() == Some(expected)
    }

    /// Read a type/length header, checking the type and that the value fits.
    pub fn read_type_and_length(&mut self, expected: u64) -> Result<usize, Error> {
        let tlv_type = self.read_var_number()?;
        if tlv_type != expected {
            return Err(Error::Tlv(format!(
                "Expected TLV type {}, got {} at offset {}",
                expected, tlv_type, self.offset
            )));
        }
        let length = self.read_var_number()? as usize;
        if length > self.remaining() {
            return Err(Error::Tlv(format!(
                "TLV type {} declares {} bytes but only {} remain",
                tlv_type,
                length,
                self.remaining()
            )));
        }
        Ok(length)
    }

    /// Enter a nested element and return the offset where it ends.
    pub fn read_nested_tlvs_start(&mut self, expected: u64) -> Result<usize, Error> {
        let length = self.read_type_and_length(expected)?;
        Ok(self.offset + length)
    }

    /// Leave a nested element.
    ///
    /// Trailing non-critical elements are skipped; anything else that keeps
    /// the offset from landing exactly on `end` is an error.
    pub fn finish_nested_tlvs(&mut self, end: usize) -> Result<(), Error> {
        while self.offset < end {
            let tlv_type = self.read_var_number()?;
            if is_critical(tlv_type) {
                return Err(Error::Tlv(format!(
                    "Unrecognized critical TLV type {} before end of element",
                    tlv_type
                )));
            }
            let length = self.read_var_number()? as usize;
            if length > end.saturating_sub(self.offset) {
                return Err(Error::Tlv(format!(
                    "TLV type {} overruns its enclosing element",
                    tlv_type
                )));
            }
            self.offset += length;
        }
        if self.offset != end {
            return Err(Error::Tlv(format!(
                "TLV length mismatch: consumed up to {} but element ends at {}",
                self.offset, end
            )));
        }
        Ok(())
    }

    /// Decode a NonNegativeInteger value of `length` bytes.
    pub fn read_non_negative_integer(&mut self, length: usize) -> Result<u64, Error> {
        if length > self.remaining() {
            return Err(Error::Tlv("Buffer underflow when decoding NonNegativeInteger".into()));
        }
        let mut bytes = &self.input[self.offset..self.offset + length];
        let value = match length {
            1 => bytes.get_u8() as u64,
            2 => bytes.get_u16() as u64,
            4 => bytes.get_u32() as u64,
            8 => bytes.get_u64(),
            _ => {
                return Err(Error::Tlv(format!(
                    "Invalid NonNegativeInteger length {}",
                    length
                )))
            }
        };
        self.offset += length;
        Ok(value)
    }

    pub fn read_non_negative_integer_tlv(&mut self, tlv_type: u64) -> Result<u64, Error> {
        let length = self.read_type_and_length(tlv_type)?;
        self.read_non_negative_integer(length)
    }

    pub fn read_optional_non_negative_integer_tlv(
        &mut self,
        tlv_type: u64,
        end: usize,
    ) -> Result<Option<u64>, Error> {
        if self.peek_type(tlv_type, end) {
            self.read_non_negative_integer_tlv(tlv_type).map(Some)
        } else {
            Ok(None)
        }
    }

    pub fn read_blob_tlv(&mut self, tlv_type: u64) -> Result<&'a [u8], Error> {
        let length = self.read_type_and_length(tlv_type)?;
        let value = &self.input[self.offset..self.offset + length];
        self.offset += length;
        Ok(value)
    }

    pub fn read_optional_blob_tlv(
        &mut self,
        tlv_type: u64,
        end: usize,
    ) -> Result<Option<&'a [u8]>, Error> {
        if self.peek_type(tlv_type, end) {
            self.read_blob_tlv(tlv_type).map(Some)
        } else {
            Ok(None)
        }
    }

    /// Read a UTF-8 string element.
    pub fn read_string_tlv(&mut self, tlv_type: u64) -> Result<String, Error> {
        let value = self.read_blob_tlv(tlv_type)?;
        String::from_utf8(value.to_vec())
            .map_err(|e| Error::Tlv(format!("TLV type {} is not valid UTF-8: {}", tlv_type, e)))
    }

    /// Read a zero-length flag element if present.
    pub fn read_boolean_tlv(&mut self, tlv_type: u64, end: usize) -> Result<bool, Error> {
        if self.peek_type(tlv_type, end) {
            self.read_blob_tlv(tlv_type)?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Read whatever element comes next.
    pub fn read_element(&mut self) -> Result<(u64, &'a [u8]), Error> {
        let tlv_type = self.read_var_number()?;
        let length = self.read_var_number()? as usize;
        if length > self.remaining() {
            return Err(Error::Tlv(format!(
                "TLV type {} declares {} bytes but only {} remain",
                tlv_type,
                length,
                self.remaining()
            )));
        }
        let value = &self.input[self.offset..self.offset + length];
        self.offset += length;
        Ok((tlv_type, value))
    }
}
