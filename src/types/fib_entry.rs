use ndn_mgmt_common::{
    ndn::Name,
    tlv::{TlvDecoder, TlvEncoder},
    Result,
};
use serde::{Deserialize, Serialize};

use super::{decode_repeated, tlv_type, TlvRecord};

/// A face the FIB forwards to, with its cost.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NextHopRecord {
    pub face_id: u64,
    pub cost: u64,
}

impl NextHopRecord {
    pub fn new(face_id: u64, cost: u64) -> Self {
        Self { face_id, cost }
    }
}

impl TlvRecord for NextHopRecord {
    fn encode(&self, encoder: &mut TlvEncoder) {
        encoder.write_nested(tlv_type::NEXT_HOP_RECORD, |enc| {
            enc.write_non_negative_integer_tlv(tlv_type::COST, self.cost);
            enc.write_non_negative_integer_tlv(tlv_type::FACE_ID, self.face_id);
        });
    }

    fn decode(decoder: &mut TlvDecoder<'_>) -> Result<Self> {
        let end = decoder.read_nested_tlvs_start(tlv_type::NEXT_HOP_RECORD)?;
        let face_id = decoder.read_non_negative_integer_tlv(tlv_type::FACE_ID)?;
        let cost = decoder.read_non_negative_integer_tlv(tlv_type::COST)?;
        decoder.finish_nested_tlvs(end)?;
        Ok(Self { face_id, cost })
    }
}

/// One entry of the `fib/list` dataset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FibEntry {
    pub prefix: Name,
    pub next_hop_records: Vec<NextHopRecord>,
}

impl FibEntry {
    pub fn new(prefix: Name) -> Self {
        Self {
            prefix,
            next_hop_records: Vec::new(),
        }
    }

    pub fn with_next_hop(mut self, record: NextHopRecord) -> Self {
        self.next_hop_records.push(record);
        self
    }
}

impl TlvRecord for FibEntry {
    fn encode(&self, encoder: &mut TlvEncoder) {
        encoder.write_nested(tlv_type::FIB_ENTRY, |enc| {
            for record in self.next_hop_records.iter().rev() {
                record.encode(enc);
            }
            self.prefix.encode(enc);
        });
    }

    fn decode(decoder: &mut TlvDecoder<'_>) -> Result<Self> {
        let end = decoder.read_nested_tlvs_start(tlv_type::FIB_ENTRY)?;
        let prefix = Name::decode(decoder)?;
        let next_hop_records = decode_repeated(decoder, tlv_type::NEXT_HOP_RECORD, end)?;
        decoder.finish_nested_tlvs(end)?;
        Ok(Self {
            prefix,
            next_hop_records,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NEXT_HOP: &[u8] = &[0x81, 0x06, 0x69, 0x01, 0x0a, 0x6a, 0x01, 0xc8];

    const FIB_ENTRY_NO_HOPS: &[u8] = &[
        0x80, 0x15, 0x07, 0x13, 0x08, 0x04, b't', b'h', b'i', b's', 0x08, 0x02, b'i', b's', 0x08,
        0x01, b'a', 0x08, 0x04, b't', b'e', b's', b't',
    ];

    const FIB_ENTRY_FOUR_HOPS: &[u8] = &[
        0x80, 0x38, 0x07, 0x13, 0x08, 0x04, b't', b'h', b'i', b's', 0x08, 0x02, b'i', b's', 0x08,
        0x01, b'a', 0x08, 0x04, b't', b'e', b's', b't', 0x81, 0x06, 0x69, 0x01, 0x0a, 0x6a, 0x01,
        0xc8, 0x81, 0x07, 0x69, 0x01, 0x14, 0x6a, 0x02, 0x01, 0x2c, 0x81, 0x07, 0x69, 0x01, 0x1e,
        0x6a, 0x02, 0x01, 0x90, 0x81, 0x07, 0x69, 0x01, 0x28, 0x6a, 0x02, 0x01, 0xf4,
    ];

    fn prefix() -> Name {
        Name::from_string("/this/is/a/test").unwrap()
    }

    #[test]
    fn test_next_hop_record() {
        let record = NextHopRecord::new(10, 200);
        assert_eq!(&record.wire_encode()[..], NEXT_HOP);
        assert_eq!(NextHopRecord::wire_decode(NEXT_HOP).unwrap(), record);
    }

    #[test]
    fn test_fib_entry_without_next_hops() {
        let entry = FibEntry::new(prefix());
        assert_eq!(&entry.wire_encode()[..], FIB_ENTRY_NO_HOPS);

        let decoded = FibEntry::wire_decode(FIB_ENTRY_NO_HOPS).unwrap();
        assert_eq!(decoded.prefix, prefix());
        assert!(decoded.next_hop_records.is_empty());
    }

    #[test]
    fn test_fib_entry_with_next_hops() {
        let entry = [(10, 200), (20, 300), (30, 400), (40, 500)]
            .into_iter()
            .fold(FibEntry::new(prefix()), |entry, (face_id, cost)| {
                entry.with_next_hop(NextHopRecord::new(face_id, cost))
            });
        assert_eq!(&entry.wire_encode()[..], FIB_ENTRY_FOUR_HOPS);

        let decoded = FibEntry::wire_decode(FIB_ENTRY_FOUR_HOPS).unwrap();
        let hops: Vec<(u64, u64)> = decoded
            .next_hop_records
            .iter()
            .map(|r| (r.face_id, r.cost))
            .collect();
        assert_eq!(hops, vec![(10, 200), (20, 300), (30, 400), (40, 500)]);
    }

    #[test]
    fn test_truncated_entry_is_rejected() {
        let short = &FIB_ENTRY_FOUR_HOPS[..FIB_ENTRY_FOUR_HOPS.len() - 1];
        assert!(FibEntry::wire_decode(short).is_err());

        // Outer length says one byte more than the children provide
        let mut overlong = FIB_ENTRY_NO_HOPS.to_vec();
        overlong[1] += 1;
        overlong.push(0x08);
        assert!(FibEntry::wire_decode(&overlong).is_err());
    }
}
