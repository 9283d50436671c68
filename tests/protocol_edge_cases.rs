//! Failure-mode and edge-case coverage that doesn't need a full multi-node
//! network: wrong-signer rejection, detection of a mismatched share against
//! its published commitment, a missing `encryption_key_part` surfacing as a
//! fatal protocol error, and the threshold formula.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use k256::ecdsa::SigningKey;
use rand::rngs::OsRng;

use ecdkg_core::curve::{sign, EthAddress, Point, Scalar};
use ecdkg_core::engine::{
    Broadcaster, ConditionWatcher, EngineConfig, NodeIdentity, ProtocolEngine, SignedShares,
};
use ecdkg_core::error::{Error, Result};
use ecdkg_core::poly::CommitmentVec;
use ecdkg_core::store::{MemoryStore, Phase, SessionStorage};
// enable logs in tests
use tracing_test::traced_test;

struct StubBroadcaster {
    peers: Vec<EthAddress>,
    signed_shares: HashMap<EthAddress, SignedShares>,
    verification_points: HashMap<EthAddress, CommitmentVec>,
    encryption_key_parts: HashMap<EthAddress, Point>,
    decryption_key_parts: HashMap<EthAddress, Scalar>,
}

impl StubBroadcaster {
    fn empty(peers: Vec<EthAddress>) -> Self {
        Self {
            peers,
            signed_shares: HashMap::new(),
            verification_points: HashMap::new(),
            encryption_key_parts: HashMap::new(),
            decryption_key_parts: HashMap::new(),
        }
    }
}

#[async_trait]
impl Broadcaster for StubBroadcaster {
    async fn list_peers(&self, _decryption_condition: &str) -> Result<Vec<EthAddress>> {
        Ok(self.peers.clone())
    }

    async fn get_signed_secret_shares(
        &self,
        _decryption_condition: &str,
    ) -> Result<HashMap<EthAddress, SignedShares>> {
        Ok(self.signed_shares.clone())
    }

    async fn get_verification_points(
        &self,
        _decryption_condition: &str,
    ) -> Result<HashMap<EthAddress, CommitmentVec>> {
        Ok(self.verification_points.clone())
    }

    async fn get_complaints(
        &self,
        _decryption_condition: &str,
    ) -> Result<HashMap<EthAddress, Vec<EthAddress>>> {
        Ok(HashMap::new())
    }

    async fn get_encryption_key_part(
        &self,
        _decryption_condition: &str,
    ) -> Result<HashMap<EthAddress, Point>> {
        Ok(self.encryption_key_parts.clone())
    }

    async fn get_decryption_key_part(
        &self,
        _decryption_condition: &str,
    ) -> Result<HashMap<EthAddress, Scalar>> {
        Ok(self.decryption_key_parts.clone())
    }
}

struct AlwaysSatisfied;

#[async_trait]
impl ConditionWatcher for AlwaysSatisfied {
    async fn wait_until_satisfied(&self, _decryption_condition: &str) -> Result<()> {
        Ok(())
    }
}

fn random_identity() -> NodeIdentity {
    NodeIdentity::from_signing_key(SigningKey::random(&mut OsRng))
}

#[tokio::test]
#[traced_test]
async fn a_share_signed_by_the_wrong_key_is_rejected() {
    const CONDITION: &str = "wrong-signer";

    let identity = random_identity();
    let peer_address = EthAddress::from_bytes([0x77; 20]);

    // The peer's share payload is real, but signed by an unrelated key.
    let impostor_key = SigningKey::random(&mut OsRng);
    let share1 = Scalar::from_u32(1);
    let share2 = Scalar::from_u32(2);

    let msg_bytes =
        ecdkg_core::engine::wire::build_shares_message(CONDITION, identity.address, share1, share2);
    let signature = sign(&msg_bytes, &impostor_key).unwrap();

    let mut broadcaster = StubBroadcaster::empty(vec![peer_address]);
    broadcaster.signed_shares.insert(
        peer_address,
        SignedShares {
            share1,
            share2,
            signature,
        },
    );

    let store = Arc::new(MemoryStore::new());
    let engine = ProtocolEngine::new(
        store.clone(),
        Arc::new(broadcaster),
        Arc::new(AlwaysSatisfied),
        identity,
        EngineConfig::default(),
    );

    engine
        .run_until_phase(CONDITION, Phase::KeyVerification)
        .await
        .unwrap();

    let participants = store.list_participants(CONDITION).await.unwrap();
    let peer = participants
        .iter()
        .find(|p| p.address == peer_address)
        .unwrap();
    assert!(peer.secret_share1.is_none());
    assert!(peer.secret_share2.is_none());
}

#[tokio::test]
async fn a_share_that_does_not_match_its_commitment_is_complained_about() {
    const CONDITION: &str = "bad-share";

    let identity = random_identity();
    let peer_identity = random_identity();
    let peer_address = peer_identity.address;

    // A correctly-signed share for the wrong value: it won't satisfy the
    // peer's (empty) verification-points commitment.
    let share1 = Scalar::from_u32(99);
    let share2 = Scalar::from_u32(100);
    let msg_bytes =
        ecdkg_core::engine::wire::build_shares_message(CONDITION, identity.address, share1, share2);
    let signature = sign(&msg_bytes, peer_identity.signing_key()).unwrap();

    let mut broadcaster = StubBroadcaster::empty(vec![peer_address]);
    broadcaster.signed_shares.insert(
        peer_address,
        SignedShares {
            share1,
            share2,
            signature,
        },
    );
    // commitments to a *different* polynomial pair, so share1*G + share2*H
    // will not match commitments.eval(own_address).
    let poly1 = ecdkg_core::poly::Polynomial::random(2);
    let poly2 = ecdkg_core::poly::Polynomial::random(2);
    broadcaster.verification_points.insert(
        peer_address,
        ecdkg_core::poly::pedersen_commit(&poly1, &poly2).unwrap(),
    );

    let store = Arc::new(MemoryStore::new());
    let engine = ProtocolEngine::new(
        store.clone(),
        Arc::new(broadcaster),
        Arc::new(AlwaysSatisfied),
        identity.clone(),
        EngineConfig::default(),
    );

    engine
        .run_until_phase(CONDITION, Phase::KeyCheck)
        .await
        .unwrap();

    let complaints = store
        .list_complaints_against(CONDITION, peer_address)
        .await
        .unwrap();
    assert_eq!(complaints.len(), 1);
    assert_eq!(complaints[0].complainer_address, identity.address);
}

#[tokio::test]
async fn a_missing_encryption_key_part_is_a_fatal_protocol_error() {
    const CONDITION: &str = "missing-ekp";

    let identity = random_identity();
    let peer_address = EthAddress::from_bytes([0x11; 20]);

    // The peer never responds to get_encryption_key_part.
    let broadcaster = StubBroadcaster::empty(vec![peer_address]);

    let store = Arc::new(MemoryStore::new());
    let engine = ProtocolEngine::new(
        store,
        Arc::new(broadcaster),
        Arc::new(AlwaysSatisfied),
        identity,
        EngineConfig::default(),
    );

    let result = engine.run_until_phase(CONDITION, Phase::KeyPublication).await;
    assert!(matches!(result, Err(Error::ProtocolError(_))));
}

#[tokio::test]
async fn threshold_is_ceil_of_half_the_network_size() {
    const CONDITION: &str = "threshold-check";

    for (peer_count, expected_threshold) in [(0usize, 1u32), (1, 1), (2, 2), (3, 2), (4, 3)] {
        let identity = random_identity();
        let peers: Vec<EthAddress> = (0..peer_count)
            .map(|i| EthAddress::from_bytes([i as u8 + 1; 20]))
            .collect();
        let broadcaster = StubBroadcaster::empty(peers);

        let store = Arc::new(MemoryStore::new());
        let engine = ProtocolEngine::new(
            store.clone(),
            Arc::new(broadcaster),
            Arc::new(AlwaysSatisfied),
            identity,
            EngineConfig::default(),
        );

        engine
            .run_until_phase(CONDITION, Phase::KeyDistribution)
            .await
            .unwrap();

        let session = store.get_or_create_session(CONDITION).await.unwrap();
        assert_eq!(session.threshold, Some(expected_threshold));
    }
}
