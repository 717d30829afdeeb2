use ndn_mgmt_common::{
    ndn::Name,
    tlv::{TlvDecoder, TlvEncoder, TLV_NAME},
    Result,
};
use serde::{Deserialize, Serialize};

use super::{
    read_optional_string, tlv_type, LocalControlFeature, RouteFlags, RouteOrigin, TlvRecord,
};

/// Arguments of a control command, also echoed back in its response.
///
/// Every field is optional and omitted from the wire when `None`. An absent
/// `expiration_period` means the route never expires.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlParameters {
    pub name: Option<Name>,
    pub face_id: Option<u64>,
    pub uri: Option<String>,
    pub local_control_feature: Option<u64>,
    pub origin: Option<u64>,
    pub cost: Option<u64>,
    pub flags: Option<u64>,
    pub strategy: Option<Name>,
    /// Milliseconds
    pub expiration_period: Option<u64>,
}

impl ControlParameters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name(mut self, name: Name) -> Self {
        self.name = Some(name);
        self
    }

    pub fn with_face_id(mut self, face_id: u64) -> Self {
        self.face_id = Some(face_id);
        self
    }

    pub fn with_uri(mut self, uri: impl Into<String>) -> Self {
        self.uri = Some(uri.into());
        self
    }

    pub fn with_local_control_feature(mut self, feature: LocalControlFeature) -> Self {
        self.local_control_feature = Some(feature.code());
        self
    }

    pub fn with_origin(mut self, origin: RouteOrigin) -> Self {
        self.origin = Some(origin.code());
        self
    }

    pub fn with_cost(mut self, cost: u64) -> Self {
        self.cost = Some(cost);
        self
    }

    pub fn with_flags(mut self, flags: RouteFlags) -> Self {
        self.flags = Some(flags.bits());
        self
    }

    pub fn with_strategy(mut self, strategy: Name) -> Self {
        self.strategy = Some(strategy);
        self
    }

    pub fn with_expiration_period(mut self, expiration_period_ms: u64) -> Self {
        self.expiration_period = Some(expiration_period_ms);
        self
    }
}

impl TlvRecord for ControlParameters {
    fn encode(&self, encoder: &mut TlvEncoder) {
        encoder.write_nested(tlv_type::CONTROL_PARAMETERS, |enc| {
            enc.write_optional_non_negative_integer_tlv(
                tlv_type::EXPIRATION_PERIOD,
                self.expiration_period,
            );
            if let Some(strategy) = &self.strategy {
                enc.write_nested(tlv_type::STRATEGY, |enc| strategy.encode(enc));
            }
            enc.write_optional_non_negative_integer_tlv(tlv_type::FLAGS, self.flags);
            enc.write_optional_non_negative_integer_tlv(tlv_type::COST, self.cost);
            enc.write_optional_non_negative_integer_tlv(tlv_type::ORIGIN, self.origin);
            enc.write_optional_non_negative_integer_tlv(
                tlv_type::LOCAL_CONTROL_FEATURE,
                self.local_control_feature,
            );
            enc.write_optional_blob_tlv(tlv_type::URI, self.uri.as_deref().map(str::as_bytes));
            enc.write_optional_non_negative_integer_tlv(tlv_type::FACE_ID, self.face_id);
            if let Some(name) = &self.name {
                name.encode(enc);
            }
        });
    }

    fn decode(decoder: &mut TlvDecoder<'_>) -> Result<Self> {
        let end = decoder.read_nested_tlvs_start(tlv_type::CONTROL_PARAMETERS)?;

        let name = if decoder.peek_type(TLV_NAME, end) {
            Some(Name::decode(decoder)?)
        } else {
            None
        };
        let face_id = decoder.read_optional_non_negative_integer_tlv(tlv_type::FACE_ID, end)?;
        let uri = read_optional_string(decoder, tlv_type::URI, end)?;
        let local_control_feature =
            decoder.read_optional_non_negative_integer_tlv(tlv_type::LOCAL_CONTROL_FEATURE, end)?;
        let origin = decoder.read_optional_non_negative_integer_tlv(tlv_type::ORIGIN, end)?;
        let cost = decoder.read_optional_non_negative_integer_tlv(tlv_type::COST, end)?;
        let flags = decoder.read_optional_non_negative_integer_tlv(tlv_type::FLAGS, end)?;
        let strategy = if decoder.peek_type(tlv_type::STRATEGY, end) {
            let strategy_end = decoder.read_nested_tlvs_start(tlv_type::STRATEGY)?;
            let strategy = Name::decode(decoder)?;
            decoder.finish_nested_tlvs(strategy_end)?;
            Some(strategy)
        } else {
            None
        };
        let expiration_period =
            decoder.read_optional_non_negative_integer_tlv(tlv_type::EXPIRATION_PERIOD, end)?;

        decoder.finish_nested_tlvs(end)?;

        Ok(Self {
            name,
            face_id,
            uri,
            local_control_feature,
            origin,
            cost,
            flags,
            strategy,
            expiration_period,
        })
    }
}
