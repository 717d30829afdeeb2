use ndn_mgmt_common::{
    tlv::{TlvDecoder, TlvEncoder},
    Result,
};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::{tlv_type, FaceFlags, FacePersistency, FaceScope, LinkType, TlvRecord};

/// One entry of the `faces/list` dataset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaceStatus {
    pub face_id: u64,
    pub remote_uri: String,
    pub local_uri: String,
    /// Milliseconds until an on-demand face expires; `None` is infinite
    pub expiration_period: Option<u64>,
    pub face_scope: FaceScope,
    pub face_persistency: FacePersistency,
    pub link_type: LinkType,
    pub base_congestion_marking_interval: Option<u64>,
    pub default_congestion_threshold: Option<u64>,
    pub mtu: Option<u64>,
    pub n_in_interests: u64,
    pub n_in_data: u64,
    pub n_in_nacks: u64,
    pub n_out_interests: u64,
    pub n_out_data: u64,
    pub n_out_nacks: u64,
    pub n_in_bytes: u64,
    pub n_out_bytes: u64,
    pub flags: Option<u64>,
}

impl FaceStatus {
    pub fn has_expiration_period(&self) -> bool {
        self.expiration_period.is_some()
    }

    /// Known flag bits; unknown bits are dropped.
    pub fn face_flags(&self) -> FaceFlags {
        FaceFlags::from_bits_truncate(self.flags.unwrap_or(0))
    }
}

impl TlvRecord for FaceStatus {
    fn encode(&self, encoder: &mut TlvEncoder) {
        encoder.write_nested(tlv_type::FACE_STATUS, |enc| {
            enc.write_optional_non_negative_integer_tlv(tlv_type::FLAGS, self.flags);
            enc.write_non_negative_integer_tlv(tlv_type::N_OUT_BYTES, self.n_out_bytes);
            enc.write_non_negative_integer_tlv(tlv_type::N_IN_BYTES, self.n_in_bytes);
            enc.write_non_negative_integer_tlv(tlv_type::N_OUT_NACKS, self.n_out_nacks);
            enc.write_non_negative_integer_tlv(tlv_type::N_OUT_DATA, self.n_out_data);
            enc.write_non_negative_integer_tlv(tlv_type::N_OUT_INTERESTS, self.n_out_interests);
            enc.write_non_negative_integer_tlv(tlv_type::N_IN_NACKS, self.n_in_nacks);
            enc.write_non_negative_integer_tlv(tlv_type::N_IN_DATA, self.n_in_data);
            enc.write_non_negative_integer_tlv(tlv_type::N_IN_INTERESTS, self.n_in_interests);
            enc.write_optional_non_negative_integer_tlv(tlv_type::MTU, self.mtu);
            enc.write_optional_non_negative_integer_tlv(
                tlv_type::DEFAULT_CONGESTION_THRESHOLD,
                self.default_congestion_threshold,
            );
            enc.write_optional_non_negative_integer_tlv(
                tlv_type::BASE_CONGESTION_MARKING_INTERVAL,
                self.base_congestion_marking_interval,
            );
            enc.write_non_negative_integer_tlv(tlv_type::LINK_TYPE, self.link_type.code());
            enc.write_non_negative_integer_tlv(
                tlv_type::FACE_PERSISTENCY,
                self.face_persistency.code(),
            );
            enc.write_non_negative_integer_tlv(tlv_type::FACE_SCOPE, self.face_scope.code());
            enc.write_optional_non_negative_integer_tlv(
                tlv_type::EXPIRATION_PERIOD,
                self.expiration_period,
            );
            enc.write_blob_tlv(tlv_type::LOCAL_URI, self.local_uri.as_bytes());
            enc.write_blob_tlv(tlv_type::URI, self.remote_uri.as_bytes());
            enc.write_non_negative_integer_tlv(tlv_type::FACE_ID, self.face_id);
        });
    }

    fn decode(decoder: &mut TlvDecoder<'_>) -> Result<Self> {
        let end = decoder.read_nested_tlvs_start(tlv_type::FACE_STATUS)?;

        let face_id = decoder.read_non_negative_integer_tlv(tlv_type::FACE_ID)?;
        let remote_uri = decoder.read_string_tlv(tlv_type::URI)?;
        let local_uri = decoder.read_string_tlv(tlv_type::LOCAL_URI)?;
        let expiration_period =
            decoder.read_optional_non_negative_integer_tlv(tlv_type::EXPIRATION_PERIOD, end)?;
        let face_scope =
            FaceScope::from_code(decoder.read_non_negative_integer_tlv(tlv_type::FACE_SCOPE)?);
        let face_persistency = FacePersistency::from_code(
            decoder.read_non_negative_integer_tlv(tlv_type::FACE_PERSISTENCY)?,
        );
        let link_type =
            LinkType::from_code(decoder.read_non_negative_integer_tlv(tlv_type::LINK_TYPE)?);
        let base_congestion_marking_interval = decoder
            .read_optional_non_negative_integer_tlv(tlv_type::BASE_CONGESTION_MARKING_INTERVAL, end)?;
        let default_congestion_threshold = decoder
            .read_optional_non_negative_integer_tlv(tlv_type::DEFAULT_CONGESTION_THRESHOLD, end)?;
        let mtu = decoder.read_optional_non_negative_integer_tlv(tlv_type::MTU, end)?;

        let status = Self {
            face_id,
            remote_uri,
            local_uri,
            expiration_period,
            face_scope,
            face_persistency,
            link_type,
            base_congestion_marking_interval,
            default_congestion_threshold,
            mtu,
            n_in_interests: decoder.read_non_negative_integer_tlv(tlv_type::N_IN_INTERESTS)?,
            n_in_data: decoder.read_non_negative_integer_tlv(tlv_type::N_IN_DATA)?,
            n_in_nacks: decoder.read_non_negative_integer_tlv(tlv_type::N_IN_NACKS)?,
            n_out_interests: decoder.read_non_negative_integer_tlv(tlv_type::N_OUT_INTERESTS)?,
            n_out_data: decoder.read_non_negative_integer_tlv(tlv_type::N_OUT_DATA)?,
            n_out_nacks: decoder.read_non_negative_integer_tlv(tlv_type::N_OUT_NACKS)?,
            n_in_bytes: decoder.read_non_negative_integer_tlv(tlv_type::N_IN_BYTES)?,
            n_out_bytes: decoder.read_non_negative_integer_tlv(tlv_type::N_OUT_BYTES)?,
            flags: decoder.read_optional_non_negative_integer_tlv(tlv_type::FLAGS, end)?,
        };

        decoder.finish_nested_tlvs(end)?;
        Ok(status)
    }
}

impl fmt::Display for FaceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "FaceStatus(FaceID: {},", self.face_id)?;
        writeln!(f, "RemoteUri: {},", self.remote_uri)?;
        writeln!(f, "LocalUri: {},", self.local_uri)?;
        match self.expiration_period {
            Some(ms) => writeln!(f, "ExpirationPeriod: {} milliseconds,", ms)?,
            None => writeln!(f, "ExpirationPeriod: infinite,")?,
        }
        writeln!(f, "FaceScope: {},", self.face_scope)?;
        writeln!(f, "FacePersistency: {},", self.face_persistency)?;
        writeln!(f, "LinkType: {},", self.link_type)?;
        writeln!(
            f,
            "Counters: {{ Interests: {{in: {}, out: {}}},",
            self.n_in_interests, self.n_out_interests
        )?;
        writeln!(f, "            Data: {{in: {}, out: {}}},", self.n_in_data, self.n_out_data)?;
        writeln!(f, "            Nack: {{in: {}, out: {}}},", self.n_in_nacks, self.n_out_nacks)?;
        writeln!(
            f,
            "            bytes: {{in: {}, out: {}}} }}",
            self.n_in_bytes, self.n_out_bytes
        )?;
        write!(f, ")")
    }
}
