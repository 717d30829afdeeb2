use ndn_mgmt_common::{
    tlv::{TlvDecoder, TlvEncoder},
    Result,
};
use serde::{Deserialize, Serialize};

use super::{tlv_type, TlvRecord};

/// The `status/general` dataset.
///
/// Unlike the other records this has no outer TLV: the dataset content is
/// the bare field sequence, so decoding consumes the whole input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForwarderStatus {
    pub nfd_version: String,
    /// Milliseconds since the epoch
    pub start_timestamp: u64,
    pub current_timestamp: u64,
    pub n_name_tree_entries: u64,
    pub n_fib_entries: u64,
    pub n_pit_entries: u64,
    pub n_measurements_entries: u64,
    pub n_cs_entries: u64,
    pub n_in_interests: u64,
    pub n_in_data: u64,
    pub n_in_nacks: u64,
    pub n_out_interests: u64,
    pub n_out_data: u64,
    pub n_out_nacks: u64,
}

impl TlvRecord for ForwarderStatus {
    fn encode(&self, encoder: &mut TlvEncoder) {
        encoder.write_non_negative_integer_tlv(tlv_type::N_OUT_NACKS, self.n_out_nacks);
        encoder.write_non_negative_integer_tlv(tlv_type::N_OUT_DATA, self.n_out_data);
        encoder.write_non_negative_integer_tlv(tlv_type::N_OUT_INTERESTS, self.n_out_interests);
        encoder.write_non_negative_integer_tlv(tlv_type::N_IN_NACKS, self.n_in_nacks);
        encoder.write_non_negative_integer_tlv(tlv_type::N_IN_DATA, self.n_in_data);
        encoder.write_non_negative_integer_tlv(tlv_type::N_IN_INTERESTS, self.n_in_interests);
        encoder.write_non_negative_integer_tlv(tlv_type::N_CS_ENTRIES, self.n_cs_entries);
        encoder.write_non_negative_integer_tlv(
            tlv_type::N_MEASUREMENTS_ENTRIES,
            self.n_measurements_entries,
        );
        encoder.write_non_negative_integer_tlv(tlv_type::N_PIT_ENTRIES, self.n_pit_entries);
        encoder.write_non_negative_integer_tlv(tlv_type::N_FIB_ENTRIES, self.n_fib_entries);
        encoder.write_non_negative_integer_tlv(
            tlv_type::N_NAME_TREE_ENTRIES,
            self.n_name_tree_entries,
        );
        encoder.write_non_negative_integer_tlv(tlv_type::CURRENT_TIMESTAMP, self.current_timestamp);
        encoder.write_non_negative_integer_tlv(tlv_type::START_TIMESTAMP, self.start_timestamp);
        encoder.write_blob_tlv(tlv_type::NFD_VERSION, self.nfd_version.as_bytes());
    }

    fn decode(decoder: &mut TlvDecoder<'_>) -> Result<Self> {
        let end = decoder.input_len();
        let status = Self {
            nfd_version: decoder.read_string_tlv(tlv_type::NFD_VERSION)?,
            start_timestamp: decoder.read_non_negative_integer_tlv(tlv_type::START_TIMESTAMP)?,
            current_timestamp: decoder.read_non_negative_integer_tlv(tlv_type::CURRENT_TIMESTAMP)?,
            n_name_tree_entries: decoder
                .read_non_negative_integer_tlv(tlv_type::N_NAME_TREE_ENTRIES)?,
            n_fib_entries: decoder.read_non_negative_integer_tlv(tlv_type::N_FIB_ENTRIES)?,
            n_pit_entries: decoder.read_non_negative_integer_tlv(tlv_type::N_PIT_ENTRIES)?,
            n_measurements_entries: decoder
                .read_non_negative_integer_tlv(tlv_type::N_MEASUREMENTS_ENTRIES)?,
            n_cs_entries: decoder.read_non_negative_integer_tlv(tlv_type::N_CS_ENTRIES)?,
            n_in_interests: decoder.read_non_negative_integer_tlv(tlv_type::N_IN_INTERESTS)?,
            n_in_data: decoder.read_non_negative_integer_tlv(tlv_type::N_IN_DATA)?,
            n_in_nacks: decoder.read_non_negative_integer_tlv(tlv_type::N_IN_NACKS)?,
            n_out_interests: decoder.read_non_negative_integer_tlv(tlv_type::N_OUT_INTERESTS)?,
            n_out_data: decoder.read_non_negative_integer_tlv(tlv_type::N_OUT_DATA)?,
            n_out_nacks: decoder.read_non_negative_integer_tlv(tlv_type::N_OUT_NACKS)?,
        };
        decoder.finish_nested_tlvs(end)?;
        Ok(status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FORWARDER_STATUS: &[u8] = &[
        0x80, 0x11, b'0', b'.', b'2', b'.', b'0', b'-', b'6', b'5', b'-', b'g', b'7', b'5', b'a',
        b'b', b'6', b'b', b'7', 0x81, 0x08, 0x00, 0x00, 0x00, 0x57, 0x5b, 0x42, 0xa6, 0x2d, 0x82,
        0x08, 0x00, 0x00, 0x00, 0xce, 0x50, 0x36, 0xd7, 0x20, 0x83, 0x04, 0x6e, 0x43, 0xe4, 0x78,
        0x84, 0x04, 0x25, 0x0e, 0xfe, 0xe4, 0x85, 0x04, 0x1c, 0xbc, 0xb7, 0x4d, 0x86, 0x04, 0x69,
        0x9a, 0x61, 0xf2, 0x87, 0x04, 0x4b, 0x65, 0xe3, 0xf0, 0x90, 0x04, 0x24, 0x86, 0xc3, 0x5f,
        0x91, 0x04, 0x6d, 0xe2, 0xbc, 0xf2, 0x97, 0x02, 0x04, 0xd2, 0x92, 0x04, 0x38, 0xc0, 0x92,
        0x3d, 0x93, 0x04, 0x08, 0x3c, 0xbf, 0x2a, 0x98, 0x02, 0x10, 0xe1,
    ];

    fn reference() -> ForwarderStatus {
        ForwarderStatus {
            nfd_version: "0.2.0-65-g75ab6b7".into(),
            start_timestamp: 375_193_249_325,
            current_timestamp: 886_109_034_272,
            n_name_tree_entries: 1_849_943_160,
            n_fib_entries: 621_739_748,
            n_pit_entries: 482_129_741,
            n_measurements_entries: 1_771_725_298,
            n_cs_entries: 1_264_968_688,
            n_in_interests: 612_811_615,
            n_in_data: 1_843_576_050,
            n_in_nacks: 1234,
            n_out_interests: 952_144_445,
            n_out_data: 138_198_826,
            n_out_nacks: 4321,
        }
    }

    #[test]
    fn test_encode_matches_reference() {
        assert_eq!(&reference().wire_encode()[..], FORWARDER_STATUS);
    }

    #[test]
    fn test_decode_reference() {
        assert_eq!(ForwarderStatus::wire_decode(FORWARDER_STATUS).unwrap(), reference());
    }

    #[test]
    fn test_missing_counter_is_rejected() {
        // Drop NOutNacks
        let short = &FORWARDER_STATUS[..FORWARDER_STATUS.len() - 4];
        assert!(ForwarderStatus::wire_decode(short).is_err());
    }

    #[test]
    fn test_trailing_non_critical_field_is_skipped() {
        let mut wire = FORWARDER_STATUS.to_vec();
        wire.extend_from_slice(&[0xfd, 0x01, 0x00, 0x01, 0x00]);
        assert_eq!(ForwarderStatus::wire_decode(&wire).unwrap(), reference());
    }
}
