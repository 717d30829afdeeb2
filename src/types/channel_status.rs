use ndn_mgmt_common::{
    tlv::{TlvDecoder, TlvEncoder},
    Result,
};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::{tlv_type, TlvRecord};

/// One entry of the `faces/channels` dataset: a listening endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelStatus {
    pub local_uri: String,
}

impl ChannelStatus {
    pub fn new(local_uri: impl Into<String>) -> Self {
        Self {
            local_uri: local_uri.into(),
        }
    }
}

impl TlvRecord for ChannelStatus {
    fn encode(&self, encoder: &mut TlvEncoder) {
        encoder.write_nested(tlv_type::CHANNEL_STATUS, |enc| {
            enc.write_blob_tlv(tlv_type::LOCAL_URI, self.local_uri.as_bytes());
        });
    }

    fn decode(decoder: &mut TlvDecoder<'_>) -> Result<Self> {
        let end = decoder.read_nested_tlvs_start(tlv_type::CHANNEL_STATUS)?;
        let local_uri = decoder.read_string_tlv(tlv_type::LOCAL_URI)?;
        decoder.finish_nested_tlvs(end)?;
        Ok(Self { local_uri })
    }
}

impl fmt::Display for ChannelStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ChannelStatus({})", self.local_uri)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHANNEL_STATUS: &[u8] = &[
        0x82, 0x14, 0x81, 0x12, b'u', b'd', b'p', b'4', b':', b'/', b'/', b'1', b'9', b'2', b'.',
        b'1', b'6', b'8', b'.', b'2', b'.', b'1',
    ];

    #[test]
    fn test_encode_matches_reference() {
        let channel = ChannelStatus::new("udp4://192.168.2.1");
        assert_eq!(&channel.wire_encode()[..], CHANNEL_STATUS);
    }

    #[test]
    fn test_decode_reference() {
        let channel = ChannelStatus::wire_decode(CHANNEL_STATUS).unwrap();
        assert_eq!(channel.local_uri, "udp4://192.168.2.1");
        assert_eq!(channel.to_string(), "ChannelStatus(udp4://192.168.2.1)");
    }

    #[test]
    fn test_truncated_channel_status_is_rejected() {
        let short = &CHANNEL_STATUS[..CHANNEL_STATUS.len() - 1];
        assert!(ChannelStatus::wire_decode(short).is_err());
    }

    #[test]
    fn test_wrong_outer_type_is_rejected() {
        let mut wire = CHANNEL_STATUS.to_vec();
        wire[0] = 0x80;
        assert!(ChannelStatus::wire_decode(&wire).is_err());
    }
}
