use ndn_mgmt_common::{
    tlv::{TlvDecoder, TlvEncoder},
    Result,
};
use serde::{Deserialize, Serialize};

use super::{decode_repeated, tlv_type, ControlParameters, TlvRecord};

/// Status code of a successful command.
pub const STATUS_OK: u64 = 200;

/// The forwarder's reply to a control command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlResponse {
    pub status_code: u64,
    pub status_text: String,
    pub body: Vec<ControlParameters>,
}

impl ControlResponse {
    pub fn new(status_code: u64, status_text: impl Into<String>) -> Self {
        Self {
            status_code,
            status_text: status_text.into(),
            body: Vec::new(),
        }
    }

    pub fn with_body(mut self, parameters: ControlParameters) -> Self {
        self.body.push(parameters);
        self
    }

    pub fn is_success(&self) -> bool {
        self.status_code == STATUS_OK
    }
}

impl TlvRecord for ControlResponse {
    fn encode(&self, encoder: &mut TlvEncoder) {
        encoder.write_nested(tlv_type::CONTROL_RESPONSE, |enc| {
            for parameters in self.body.iter().rev() {
                parameters.encode(enc);
            }
            enc.write_blob_tlv(tlv_type::STATUS_TEXT, self.status_text.as_bytes());
            enc.write_non_negative_integer_tlv(tlv_type::STATUS_CODE, self.status_code);
        });
    }

    fn decode(decoder: &mut TlvDecoder<'_>) -> Result<Self> {
        let end = decoder.read_nested_tlvs_start(tlv_type::CONTROL_RESPONSE)?;
        let status_code = decoder.read_non_negative_integer_tlv(tlv_type::STATUS_CODE)?;
        let status_text = decoder.read_string_tlv(tlv_type::STATUS_TEXT)?;
        let body = decode_repeated(decoder, tlv_type::CONTROL_PARAMETERS, end)?;
        decoder.finish_nested_tlvs(end)?;

        Ok(Self {
            status_code,
            status_text,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // 404 "Not Found" with one ControlParameters carrying FaceId 3
    const NOT_FOUND: &[u8] = &[
        0x65, 0x14, 0x66, 0x02, 0x01, 0x94, 0x67, 0x09, b'N', b'o', b't', b' ', b'F', b'o', b'u',
        b'n', b'd', 0x68, 0x03, 0x69, 0x01, 0x03,
    ];

    #[test]
    fn test_decode_rejection_with_body() {
        let response = ControlResponse::wire_decode(NOT_FOUND).unwrap();
        assert_eq!(response.status_code, 404);
        assert_eq!(response.status_text, "Not Found");
        assert_eq!(response.body.len(), 1);
        assert_eq!(response.body[0].face_id, Some(3));
        assert!(!response.is_success());
    }

    #[test]
    fn test_encode_matches_reference() {
        let response = ControlResponse::new(404, "Not Found")
            .with_body(ControlParameters::new().with_face_id(3));
        assert_eq!(&response.wire_encode()[..], NOT_FOUND);
    }

    #[test]
    fn test_body_order_is_preserved() {
        let response = ControlResponse::new(200, "OK")
            .with_body(ControlParameters::new().with_face_id(1))
            .with_body(ControlParameters::new().with_face_id(2));
        let decoded = ControlResponse::wire_decode(&response.wire_encode()).unwrap();
        assert_eq!(decoded, response);
        assert!(decoded.is_success());
    }

    #[test]
    fn test_missing_status_text_is_rejected() {
        let wire = [0x65, 0x04, 0x66, 0x02, 0x01, 0x94];
        assert!(ControlResponse::wire_decode(&wire).is_err());
    }

    #[test]
    fn test_truncation_is_rejected() {
        for cut in 1..NOT_FOUND.len() {
            assert!(ControlResponse::wire_decode(&NOT_FOUND[..cut]).is_err());
        }
    }
}
