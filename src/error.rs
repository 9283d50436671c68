//! Crate-wide error taxonomy (spec.md §7).
//!
//! Per-peer recoverable variants ([`Error::InvalidInput`],
//! [`Error::SignatureMismatch`]) are logged and absorbed inside phase
//! handlers; they are never propagated out of [`crate::engine::ProtocolEngine::run_until_phase`].
//! The remaining variants are protocol-fatal and bubble up via `?`.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// A point is neither the identity nor on the secp256k1 curve.
    #[error("point is not on the secp256k1 curve")]
    InvalidPoint,

    /// A signature failed to parse or did not recover to a valid public key.
    #[error("signature could not be parsed or recovered")]
    InvalidSignature,

    /// A scalar was out of range (>= the group order N).
    #[error("scalar is out of range")]
    InvalidScalar,

    /// Malformed hex, wrong length, or otherwise unusable peer-supplied data.
    /// The offending datum is dropped; the phase continues.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The address recovered from a peer's signature did not match the
    /// address the peer claims.
    #[error("signature recovers to {recovered} but expected address {expected}")]
    SignatureMismatch { expected: String, recovered: String },

    /// Two polynomials passed to `pedersen_commit` differ in length. This is
    /// a programming bug, not a peer fault.
    #[error("length mismatch: poly1 has {poly1_len} coefficients, poly2 has {poly2_len}")]
    LengthMismatch { poly1_len: usize, poly2_len: usize },

    /// A datum the protocol requires to proceed (an `encryption_key_part` in
    /// KeyGeneration, or a `decryption_key_part` in KeyPublication) never
    /// arrived. Fatal for the session; the session is left at the
    /// pre-advance phase so a retry is possible.
    #[error("protocol error: {0}")]
    ProtocolError(String),

    /// The persistence backend failed. No partial phase advance is
    /// permitted when this occurs.
    #[error("storage error: {0}")]
    StorageError(String),
}
