use ndn_mgmt_common::{
    ndn::Name,
    tlv::{TlvDecoder, TlvEncoder},
    Result,
};
use serde::{Deserialize, Serialize};

use super::{tlv_type, TlvRecord};

/// One entry of the `strategy-choice/list` dataset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategyChoice {
    pub name: Name,
    pub strategy: Name,
}

impl StrategyChoice {
    pub fn new(name: Name, strategy: Name) -> Self {
        Self { name, strategy }
    }
}

impl TlvRecord for StrategyChoice {
    fn encode(&self, encoder: &mut TlvEncoder) {
        encoder.write_nested(tlv_type::STRATEGY_CHOICE, |enc| {
            enc.write_nested(tlv_type::STRATEGY, |enc| self.strategy.encode(enc));
            self.name.encode(enc);
        });
    }

    fn decode(decoder: &mut TlvDecoder<'_>) -> Result<Self> {
        let end = decoder.read_nested_tlvs_start(tlv_type::STRATEGY_CHOICE)?;
        let name = Name::decode(decoder)?;
        let strategy_end = decoder.read_nested_tlvs_start(tlv_type::STRATEGY)?;
        let strategy = Name::decode(decoder)?;
        decoder.finish_nested_tlvs(strategy_end)?;
        decoder.finish_nested_tlvs(end)?;
        Ok(Self { name, strategy })
    }
}
