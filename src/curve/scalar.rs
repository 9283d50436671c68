//! Scalar field element: an integer in `[0, N)` where `N` is the secp256k1
//! group order, with serde support following the same SEC1-bytes newtype
//! pattern the teacher crate uses for `k256::Scalar` (`tofn::crypto_tools::k256_serde::Scalar`).

use crypto_bigint::ArrayEncoding;
use ecdsa::elliptic_curve::ops::Reduce;
use k256::elliptic_curve::Field;
use k256::U256;
use serde::{de, de::Visitor, Deserialize, Deserializer, Serialize, Serializer};
use zeroize::Zeroize;

use crate::error::{Error, Result};

/// An element of the secp256k1 scalar field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Zeroize)]
pub struct Scalar(k256::Scalar);

impl Scalar {
    pub fn zero() -> Self {
        Self(k256::Scalar::ZERO)
    }

    pub fn one() -> Self {
        Self(k256::Scalar::ONE)
    }

    /// Draw a coefficient uniformly from `[1, N)` using a cryptographic RNG,
    /// per spec.md §4.2's `random_polynomial` contract.
    pub fn random_nonzero(rng: &mut impl rand::RngCore) -> Self {
        loop {
            let s = k256::Scalar::random(&mut *rng);
            if s != k256::Scalar::ZERO {
                return Self(s);
            }
        }
    }

    /// Interpret `n` as a non-negative integer less than `2^{32}` and embed
    /// it into the scalar field (used to raise an address to the power `k`
    /// in the Pedersen-commitment evaluation of spec.md §4.4 KeyVerification).
    pub fn from_u32(n: u32) -> Self {
        Self(k256::Scalar::from(n))
    }

    /// Reduce a big-endian byte string of arbitrary length (e.g. a 20-byte
    /// Ethereum address) modulo the group order `N`.
    pub fn from_be_bytes_reduced(bytes: &[u8]) -> Self {
        let mut padded = [0u8; 32];
        let start = 32usize.saturating_sub(bytes.len());
        let take = bytes.len().min(32);
        padded[start..].copy_from_slice(&bytes[bytes.len() - take..]);
        Self(k256::Scalar::reduce(U256::from_be_byte_array(
            padded.into(),
        )))
    }

    /// Parse a scalar from 32 big-endian bytes, rejecting values `>= N`.
    pub fn from_be_bytes(bytes: &[u8; 32]) -> Result<Self> {
        let reduced = k256::Scalar::reduce(U256::from_be_byte_array((*bytes).into()));
        if reduced.to_bytes().as_slice() != bytes {
            return Err(Error::InvalidScalar);
        }
        Ok(Self(reduced))
    }

    /// `private_value_to_bytes`: 32-byte big-endian, zero-padded.
    pub fn to_be_bytes(self) -> [u8; 32] {
        let mut out = [0u8; 32];
        out.copy_from_slice(self.0.to_bytes().as_slice());
        out
    }

    pub fn to_hex(self) -> String {
        hex::encode(self.to_be_bytes())
    }

    pub fn from_hex(s: &str) -> Result<Self> {
        let bytes = hex::decode(s).map_err(|e| Error::InvalidInput(e.to_string()))?;
        if bytes.len() != 32 {
            return Err(Error::InvalidInput(format!(
                "expected 32-byte scalar, got {} bytes",
                bytes.len()
            )));
        }
        let mut arr = [0u8; 32];
        arr.copy_from_slice(&bytes);
        Self::from_be_bytes(&arr)
    }

    pub fn inner(&self) -> &k256::Scalar {
        &self.0
    }
}

impl From<k256::Scalar> for Scalar {
    fn from(s: k256::Scalar) -> Self {
        Self(s)
    }
}

impl std::ops::Add for Scalar {
    type Output = Scalar;
    fn add(self, rhs: Scalar) -> Scalar {
        Scalar(self.0 + rhs.0)
    }
}

impl std::ops::Mul for Scalar {
    type Output = Scalar;
    fn mul(self, rhs: Scalar) -> Scalar {
        Scalar(self.0 * rhs.0)
    }
}

/// `scalar_pow_mod_n`: exponentiation in the scalar field.
pub fn scalar_pow_mod_n(base: Scalar, exponent: u32) -> Scalar {
    let mut acc = Scalar::one();
    for _ in 0..exponent {
        acc = acc * base;
    }
    acc
}

impl Serialize for Scalar {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_bytes(&self.to_be_bytes())
    }
}

impl<'de> Deserialize<'de> for Scalar {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_bytes(ScalarVisitor)
    }
}

struct ScalarVisitor;

impl<'de> Visitor<'de> for ScalarVisitor {
    type Value = Scalar;

    fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
        formatter.write_str("32 big-endian bytes of a secp256k1 scalar")
    }

    fn visit_bytes<E>(self, v: &[u8]) -> std::result::Result<Self::Value, E>
    where
        E: de::Error,
    {
        if v.len() != 32 {
            return Err(E::custom(format!(
                "invalid scalar length; expected 32, got {}",
                v.len()
            )));
        }
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(v);
        Ok(Scalar(k256::Scalar::reduce(U256::from_be_byte_array(
            bytes.into(),
        ))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_bytes() {
        let s = Scalar::random_nonzero(&mut rand::thread_rng());
        let bytes = s.to_be_bytes();
        let parsed = Scalar::from_be_bytes(&bytes).unwrap();
        assert_eq!(s, parsed);
    }

    #[test]
    fn round_trip_hex() {
        let s = Scalar::random_nonzero(&mut rand::thread_rng());
        let parsed = Scalar::from_hex(&s.to_hex()).unwrap();
        assert_eq!(s, parsed);
    }

    #[test]
    fn address_reduction_is_deterministic() {
        let addr = [0xABu8; 20];
        let a = Scalar::from_be_bytes_reduced(&addr);
        let b = Scalar::from_be_bytes_reduced(&addr);
        assert_eq!(a, b);
    }

    #[test]
    fn pow_mod_n_matches_repeated_multiplication() {
        let base = Scalar::from_u32(7);
        let expected = base * base * base * base;
        assert_eq!(scalar_pow_mod_n(base, 4), expected);
        assert_eq!(scalar_pow_mod_n(base, 0), Scalar::one());
    }
}
