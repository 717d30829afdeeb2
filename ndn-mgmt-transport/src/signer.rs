//! Command Interest signing.
//!
//! A signed command Interest carries four extra name components after the
//! command parameters: a timestamp, a random value, the SignatureInfo and the
//! SignatureValue.

use bytes::{BufMut, BytesMut};
use ndn_mgmt_common::{
    ndn::{signature_type, Interest, Name, NameComponent, SignatureInfo},
    tlv::{self, TlvEncoder},
    Error, Result,
};
use sha2::{Digest, Sha256};
use std::{
    sync::Mutex,
    time::{SystemTime, UNIX_EPOCH},
};

/// Turns an unsigned command Interest into an authenticated one.
pub trait CommandSigner: Send + Sync {
    /// Appends the signature components to `interest`'s name.
    fn sign(&self, interest: Interest) -> Result<Interest>;
}

/// Signs commands with a bare SHA-256 digest, accepted by forwarders
/// configured to trust local DigestSha256 commands.
#[derive(Debug, Default)]
pub struct DigestSha256Signer {
    last_timestamp: Mutex<u64>,
}

impl DigestSha256Signer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Milliseconds since the epoch, strictly greater than the previous value.
    fn next_timestamp(&self) -> Result<u64> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| Error::Signing(format!("System clock before epoch: {}", e)))?
            .as_millis() as u64;

        let mut last = self
            .last_timestamp
            .lock()
            .map_err(|_| Error::Signing("Timestamp lock poisoned".into()))?;
        let timestamp = now.max(*last + 1);
        *last = timestamp;
        Ok(timestamp)
    }
}

impl CommandSigner for DigestSha256Signer {
    fn sign(&self, mut interest: Interest) -> Result<Interest> {
        let signature_info = SignatureInfo {
            signature_type: signature_type::DIGEST_SHA256,
            key_locator: None,
        };

        let mut name = interest.name.clone();
        name.push(NameComponent::from_number(self.next_timestamp()?))
            .push(NameComponent::from_number(rand::random()))
            .push(NameComponent::new(signature_info.wire_encode()));

        let digest = Sha256::digest(signed_portion(&name));
        let mut encoder = TlvEncoder::new();
        encoder.write_blob_tlv(tlv::TLV_SIGNATURE_VALUE, &digest);
        name.push(NameComponent::new(encoder.finish()));

        log::trace!("Signed command {}", name);
        interest.name = name;
        Ok(interest)
    }
}

/// The encoded components covered by the signature.
pub(crate) fn signed_portion(name: &Name) -> BytesMut {
    let mut buf = BytesMut::new();
    for component in name.components() {
        let mut encoder = TlvEncoder::new();
        component.encode(&mut encoder);
        buf.put_slice(&encoder.finish());
    }
    buf
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndn_mgmt_common::tlv::TlvDecoder;

    #[test]
    fn test_signed_name_layout() {
        let signer = DigestSha256Signer::new();
        let command = Name::from_string("/localhost/nfd/faces/create/params").unwrap();
        let signed = signer.sign(Interest::new(command.clone())).unwrap();

        assert_eq!(signed.name.len(), command.len() + 4);
        assert!(command.is_prefix_of(&signed.name));

        let signature_info = signed.name.get_from_end(1).unwrap();
        let mut decoder = TlvDecoder::new(signature_info.as_bytes());
        let info = SignatureInfo::decode(&mut decoder).unwrap();
        assert_eq!(info.signature_type, signature_type::DIGEST_SHA256);

        let value = signed.name.get_from_end(0).unwrap();
        let mut decoder = TlvDecoder::new(value.as_bytes());
        let digest = decoder.read_blob_tlv(tlv::TLV_SIGNATURE_VALUE).unwrap();
        let covered = signed.name.prefix(signed.name.len() - 1);
        assert_eq!(digest, Sha256::digest(signed_portion(&covered)).as_slice());
    }

    #[test]
    fn test_timestamps_strictly_increase() {
        let signer = DigestSha256Signer::new();
        let command = Name::from_string("/localhost/nfd/rib/register/x").unwrap();
        let stamps: Vec<u64> = (0..5)
            .map(|_| {
                let signed = signer.sign(Interest::new(command.clone())).unwrap();
                signed.name.get(command.len()).unwrap().to_number().unwrap()
            })
            .collect();
        assert!(stamps.windows(2).all(|w| w[0] < w[1]));
    }
}
