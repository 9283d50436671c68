//! 20-byte Ethereum-style addresses: the low 20 bytes of the Keccak-256 hash
//! of an uncompressed public key (sans the `0x04` prefix byte).

use k256::elliptic_curve::sec1::ToEncodedPoint;
use serde::{Deserialize, Serialize};
use sha3::{Digest, Keccak256};

use crate::error::{Error, Result};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct EthAddress([u8; 20]);

impl EthAddress {
    pub fn from_bytes(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// `address_to_bytes`: big-endian, 20 bytes.
    pub fn to_bytes(self) -> [u8; 20] {
        self.0
    }

    /// Low 20 bytes of `keccak256(uncompressed_pubkey[1..])`.
    pub fn from_verifying_key(verifying_key: &k256::ecdsa::VerifyingKey) -> Self {
        let encoded = verifying_key.to_encoded_point(false);
        debug_assert_eq!(encoded.as_bytes()[0], 0x04);
        let hash = Keccak256::digest(&encoded.as_bytes()[1..]);
        let mut out = [0u8; 20];
        out.copy_from_slice(&hash[12..]);
        Self(out)
    }

    /// `address_to_bytes` → 40-hex wire encoding, zero-padded.
    pub fn to_hex(self) -> String {
        hex::encode(self.0)
    }

    pub fn from_hex(s: &str) -> Result<Self> {
        let bytes = hex::decode(s).map_err(|e| Error::InvalidInput(e.to_string()))?;
        if bytes.len() != 20 {
            return Err(Error::InvalidInput(format!(
                "expected 20-byte address, got {} bytes",
                bytes.len()
            )));
        }
        let mut out = [0u8; 20];
        out.copy_from_slice(&bytes);
        Ok(Self(out))
    }
}

impl std::fmt::Display for EthAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_hex() {
        let addr = EthAddress::from_bytes([0x11; 20]);
        let parsed = EthAddress::from_hex(&addr.to_hex()).unwrap();
        assert_eq!(addr, parsed);
    }
}
