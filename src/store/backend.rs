//! The [`SessionStorage`] trait: the persistence seam the protocol engine
//! runs against. Grounded in `chainflip-backend`'s `PersistentKeyDB`
//! (`engine/src/multisig/db/persistent.rs`) for the shape of an async,
//! crash-resumable key/value store sitting behind a small domain-specific
//! interface — generalized here to sessions/participants/complaints instead
//! of multisig key shares, and backed by `sled` rather than `rocksdb`
//! (see DESIGN.md for the swap rationale).

use async_trait::async_trait;

use crate::curve::EthAddress;
use crate::error::Result;
use crate::store::model::{Complaint, Participant, Session};

/// Durable (or in-memory) storage for DKG session state. Every method is
/// idempotent under the session's `decryption_condition` / participant
/// `address` keys, matching the `get_or_create_*` semantics of the
/// original model.
#[async_trait]
pub trait SessionStorage: Send + Sync {
    /// Fetch the session for `decryption_condition`, normalizing it first
    /// (spec.md §4.4 Uninitialized / §6), creating it at `Phase::Uninitialized`
    /// if it does not yet exist.
    async fn get_or_create_session(&self, decryption_condition: &str) -> Result<Session>;

    /// Persist `session`'s current state, keyed by its (already normalized)
    /// `decryption_condition`.
    async fn save_session(&self, session: &Session) -> Result<()>;

    /// Fetch the participant record for `address` within `decryption_condition`,
    /// creating an empty one if it does not yet exist.
    async fn get_or_create_participant(
        &self,
        decryption_condition: &str,
        address: EthAddress,
    ) -> Result<Participant>;

    async fn save_participant(
        &self,
        decryption_condition: &str,
        participant: &Participant,
    ) -> Result<()>;

    async fn list_participants(&self, decryption_condition: &str) -> Result<Vec<Participant>>;

    /// Record (idempotently) that `complainer_address` disputes
    /// `participant_address`'s shares.
    async fn get_or_create_complaint(
        &self,
        decryption_condition: &str,
        participant_address: EthAddress,
        complainer_address: EthAddress,
    ) -> Result<Complaint>;

    async fn list_complaints_against(
        &self,
        decryption_condition: &str,
        participant_address: EthAddress,
    ) -> Result<Vec<Complaint>>;
}

/// Lowercase, trim, and cap a decryption condition at
/// [`crate::constants::MAX_DECRYPTION_CONDITION_BYTES`] UTF-8 bytes, matching
/// `util.normalize_decryption_condition`'s contract.
pub fn normalize_decryption_condition(raw: &str) -> String {
    let trimmed = raw.trim().to_lowercase();
    let mut end = trimmed.len().min(crate::constants::MAX_DECRYPTION_CONDITION_BYTES);
    while end > 0 && !trimmed.is_char_boundary(end) {
        end -= 1;
    }
    trimmed[..end].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalization_trims_lowercases_and_caps_length() {
        let raw = "  MixedCase-Condition  ";
        assert_eq!(normalize_decryption_condition(raw), "mixedcase-condition");

        let long = "a".repeat(64);
        assert_eq!(
            normalize_decryption_condition(&long).len(),
            crate::constants::MAX_DECRYPTION_CONDITION_BYTES
        );
    }
}
