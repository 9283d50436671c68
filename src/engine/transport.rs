//! Collaborator interfaces the protocol engine runs against but does not
//! implement: peer-to-peer messaging (spec.md §1's "transport wire-up" is
//! explicitly out of scope) and the external oracle that observes a
//! decryption condition being satisfied. Grounded in the
//! `chainflip-backend` ceremony manager's preference for narrow,
//! async-trait collaborator seams over a monolithic network client.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::curve::{EthAddress, Point, RecoverableSignature, Scalar};
use crate::error::Result;
use crate::poly::CommitmentVec;

/// A peer's signed delivery of our two secret shares.
#[derive(Clone, Copy, Debug)]
pub struct SignedShares {
    pub share1: Scalar,
    pub share2: Scalar,
    pub signature: RecoverableSignature,
}

/// Broadcasts a single RPC call to every known peer and collects the
/// responses keyed by the responding peer's address, mirroring
/// `broadcast_jsonrpc_call_on_all_channels`. A peer absent from the
/// returned map is treated as having not responded.
#[async_trait]
pub trait Broadcaster: Send + Sync {
    /// The set of peers participating in this session (excluding this node).
    async fn list_peers(&self, decryption_condition: &str) -> Result<Vec<EthAddress>>;

    async fn get_signed_secret_shares(
        &self,
        decryption_condition: &str,
    ) -> Result<HashMap<EthAddress, SignedShares>>;

    async fn get_verification_points(
        &self,
        decryption_condition: &str,
    ) -> Result<HashMap<EthAddress, CommitmentVec>>;

    async fn get_complaints(
        &self,
        decryption_condition: &str,
    ) -> Result<HashMap<EthAddress, Vec<EthAddress>>>;

    async fn get_encryption_key_part(
        &self,
        decryption_condition: &str,
    ) -> Result<HashMap<EthAddress, Point>>;

    async fn get_decryption_key_part(
        &self,
        decryption_condition: &str,
    ) -> Result<HashMap<EthAddress, Scalar>>;
}

/// The external oracle deciding whether a decryption condition has been
/// satisfied (spec.md §1, §4.4 KeyPublication). Left abstract: what
/// "satisfied" means is application-specific and out of scope here.
#[async_trait]
pub trait ConditionWatcher: Send + Sync {
    async fn wait_until_satisfied(&self, decryption_condition: &str) -> Result<()>;
}
