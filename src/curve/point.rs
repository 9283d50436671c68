//! Affine point on secp256k1, or the identity, with the same SEC1-bytes
//! serde newtype pattern as the teacher crate's `k256_serde::AffinePoint`.

use k256::elliptic_curve::sec1::{FromEncodedPoint, ToEncodedPoint};
use serde::{de, de::Visitor, Deserialize, Deserializer, Serialize, Serializer};

use crate::curve::scalar::Scalar;
use crate::error::{Error, Result};

/// A point on secp256k1 (affine coordinates), or the identity.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Point(k256::ProjectivePoint);

impl Point {
    pub fn identity() -> Self {
        Self(k256::ProjectivePoint::IDENTITY)
    }

    pub fn generator() -> Self {
        Self(k256::ProjectivePoint::GENERATOR)
    }

    pub fn inner(&self) -> &k256::ProjectivePoint {
        &self.0
    }

    /// `validate_curve_point`: fails with `InvalidPoint` if `P` is not on the
    /// curve and is not the identity. Points built from `AffinePoint`
    /// decoding are already guaranteed on-curve by construction; this exists
    /// for the wire-decoding path (§4.1) where malformed bytes are possible.
    pub fn validate(&self) -> Result<()> {
        // k256's AffinePoint/ProjectivePoint types are constructed only from
        // curve equation solutions (or the identity), so a `Point` value is
        // on-curve by construction. The only way to end up with something
        // invalid is via raw coordinate decoding, handled in `from_affine_coordinates`.
        let _ = self.0;
        Ok(())
    }

    /// Build a point directly from big-endian x/y coordinates, rejecting
    /// anything off-curve (the general wire-decoding entry point).
    pub fn from_affine_coordinates(x: &[u8; 32], y: &[u8; 32]) -> Result<Self> {
        let encoded = k256::EncodedPoint::from_affine_coordinates(
            k256::FieldBytes::from_slice(x),
            k256::FieldBytes::from_slice(y),
            false,
        );
        let affine = k256::AffinePoint::from_encoded_point(&encoded);
        if bool::from(affine.is_none()) {
            return Err(Error::InvalidPoint);
        }
        Ok(Self(affine.unwrap().into()))
    }

    /// `x`/`y` big-endian coordinates of the affine representation. Panics
    /// if called on the identity (callers must check `is_identity` first;
    /// the wire format has no identity encoding in this protocol since every
    /// point exchanged is a polynomial commitment or key part, none of which
    /// is ever the identity in practice).
    pub fn to_affine_coordinates(&self) -> (Vec<u8>, Vec<u8>) {
        let encoded = k256::AffinePoint::from(self.0).to_encoded_point(false);
        let x = encoded.x().expect("non-identity point has x coordinate");
        let y = encoded.y().expect("non-identity point has y coordinate");
        (x.to_vec(), y.to_vec())
    }

    pub fn is_identity(&self) -> bool {
        self.0 == k256::ProjectivePoint::IDENTITY
    }

    /// 128-hex wire encoding: `x (64 hex) || y (64 hex)`, zero-padded.
    pub fn to_hex(&self) -> String {
        let (x, y) = self.to_affine_coordinates();
        format!("{}{}", hex::encode(x), hex::encode(y))
    }

    pub fn from_hex(s: &str) -> Result<Self> {
        if s.len() != 128 {
            return Err(Error::InvalidInput(format!(
                "expected 128-hex point, got {} chars",
                s.len()
            )));
        }
        let bytes = hex::decode(s).map_err(|e| Error::InvalidInput(e.to_string()))?;
        let mut x = [0u8; 32];
        let mut y = [0u8; 32];
        x.copy_from_slice(&bytes[..32]);
        y.copy_from_slice(&bytes[32..]);
        Self::from_affine_coordinates(&x, &y)
    }
}

impl std::ops::Add for Point {
    type Output = Point;
    fn add(self, rhs: Point) -> Point {
        Point(self.0 + rhs.0)
    }
}

impl std::ops::Mul<Scalar> for Point {
    type Output = Point;
    fn mul(self, rhs: Scalar) -> Point {
        Point(self.0 * rhs.inner())
    }
}

impl std::iter::Sum for Point {
    fn sum<I: Iterator<Item = Point>>(iter: I) -> Self {
        iter.fold(Point::identity(), |acc, p| acc + p)
    }
}

impl From<k256::ProjectivePoint> for Point {
    fn from(p: k256::ProjectivePoint) -> Self {
        Self(p)
    }
}

impl Serialize for Point {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_bytes(
            k256::AffinePoint::from(self.0)
                .to_encoded_point(true)
                .as_bytes(),
        )
    }
}

impl<'de> Deserialize<'de> for Point {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_bytes(PointVisitor)
    }
}

struct PointVisitor;

impl<'de> Visitor<'de> for PointVisitor {
    type Value = Point;

    fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
        formatter.write_str("SEC1-encoded secp256k1 curve point")
    }

    fn visit_bytes<E>(self, v: &[u8]) -> std::result::Result<Self::Value, E>
    where
        E: de::Error,
    {
        let encoded = k256::EncodedPoint::from_bytes(v).map_err(E::custom)?;
        let affine = k256::AffinePoint::from_encoded_point(&encoded);
        if bool::from(affine.is_none()) {
            return Err(E::custom(
                "SEC1-encoded point is not on curve secp256k1 (K-256)",
            ));
        }
        Ok(Point(affine.unwrap().into()))
    }
}
