//! Plain value types persisted by the [`super::backend::SessionStorage`]
//! backends: the session's protocol state, its per-peer participant
//! records, and recorded complaints. No ORM — grounded in the original
//! `ECDKG`/`ECDKGParticipant`/`ECDKGComplaint` model's fields, re-expressed
//! as serde-plain structs per spec.md §9's redesign guidance to drop the
//! SQLAlchemy layer entirely.

use serde::{Deserialize, Serialize};

use crate::curve::{EthAddress, Point, RecoverableSignature, Scalar};
use crate::poly::{CommitmentVec, Polynomial};

/// The six-phase DKG state machine (spec.md §4.4), plus the session's
/// initial `Uninitialized` state. Ordered: a session only ever advances
/// forward through these variants.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum Phase {
    Uninitialized = 0,
    KeyDistribution = 1,
    KeyVerification = 2,
    KeyCheck = 3,
    KeyGeneration = 4,
    KeyPublication = 5,
    Complete = 6,
}

impl Phase {
    pub const ALL: [Phase; 7] = [
        Phase::Uninitialized,
        Phase::KeyDistribution,
        Phase::KeyVerification,
        Phase::KeyCheck,
        Phase::KeyGeneration,
        Phase::KeyPublication,
        Phase::Complete,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Phase::Uninitialized => "uninitialized",
            Phase::KeyDistribution => "key_distribution",
            Phase::KeyVerification => "key_verification",
            Phase::KeyCheck => "key_check",
            Phase::KeyGeneration => "key_generation",
            Phase::KeyPublication => "key_publication",
            Phase::Complete => "complete",
        }
    }
}

/// A single DKG session, keyed by its decryption condition.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Session {
    pub decryption_condition: String,
    pub phase: Option<Phase>,
    pub threshold: Option<u32>,
    pub encryption_key: Option<Point>,
    pub decryption_key: Option<Scalar>,

    pub secret_poly1: Option<Polynomial>,
    pub secret_poly2: Option<Polynomial>,
    pub verification_points: Option<CommitmentVec>,
    pub encryption_key_part: Option<Point>,
}

impl Session {
    pub fn new(decryption_condition: String) -> Self {
        Self {
            decryption_condition,
            phase: Some(Phase::Uninitialized),
            ..Default::default()
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase.unwrap_or(Phase::Uninitialized)
    }
}

/// One counterparty's per-session record: the shares they sent us, the
/// verification points they published, and the key parts they contributed.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Participant {
    pub address: EthAddress,
    pub encryption_key_part: Option<Point>,
    pub decryption_key_part: Option<Scalar>,
    pub verification_points: Option<CommitmentVec>,
    pub secret_share1: Option<Scalar>,
    pub secret_share2: Option<Scalar>,
    pub shares_signature: Option<RecoverableSignature>,
}

impl Participant {
    pub fn new(address: EthAddress) -> Self {
        Self {
            address,
            ..Default::default()
        }
    }

    /// Whether we have both secret shares needed to check this participant's
    /// commitment (spec.md §4.4 KeyVerification).
    pub fn has_shares(&self) -> bool {
        self.secret_share1.is_some() && self.secret_share2.is_some()
    }
}

/// A recorded complaint: `complainer_address` found `participant`'s shares
/// did not match its published verification points. Recorded but never
/// resolved (spec.md §4.4 KeyCheck is a bookkeeping no-op by design — see
/// DESIGN.md).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Complaint {
    pub participant_address: EthAddress,
    pub complainer_address: EthAddress,
}
