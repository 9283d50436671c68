//! End-to-end coverage of the six-phase DKG across three in-process nodes,
//! wired together with in-memory test doubles for the `Broadcaster` and
//! `ConditionWatcher` collaborators.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use k256::ecdsa::SigningKey;
use rand::rngs::OsRng;
use tokio::sync::RwLock;

use ecdkg_core::curve::{EthAddress, Point, Scalar};
use ecdkg_core::engine::{
    Broadcaster, ConditionWatcher, EngineConfig, NodeIdentity, ProtocolEngine, SignedShares,
};
use ecdkg_core::error::Result;
use ecdkg_core::poly::CommitmentVec;
use ecdkg_core::store::{MemoryStore, Phase};

/// Routes every collaborator call to the real peer engines in the network,
/// so each node's protocol engine runs exactly as it would against a live
/// transport.
struct InProcessBroadcaster {
    self_address: EthAddress,
    peers: Arc<RwLock<HashMap<EthAddress, Arc<ProtocolEngine>>>>,
}

#[async_trait]
impl Broadcaster for InProcessBroadcaster {
    async fn list_peers(&self, _decryption_condition: &str) -> Result<Vec<EthAddress>> {
        Ok(self
            .peers
            .read()
            .await
            .keys()
            .copied()
            .filter(|&a| a != self.self_address)
            .collect())
    }

    async fn get_signed_secret_shares(
        &self,
        decryption_condition: &str,
    ) -> Result<HashMap<EthAddress, SignedShares>> {
        let mut out = HashMap::new();
        for (&addr, engine) in self.peers.read().await.iter() {
            if addr == self.self_address {
                continue;
            }
            let shares = engine
                .get_signed_secret_shares(decryption_condition, self.self_address)
                .await?;
            out.insert(addr, shares);
        }
        Ok(out)
    }

    async fn get_verification_points(
        &self,
        decryption_condition: &str,
    ) -> Result<HashMap<EthAddress, CommitmentVec>> {
        let mut out = HashMap::new();
        for (&addr, engine) in self.peers.read().await.iter() {
            if addr == self.self_address {
                continue;
            }
            out.insert(addr, engine.get_verification_points(decryption_condition).await?);
        }
        Ok(out)
    }

    async fn get_complaints(
        &self,
        decryption_condition: &str,
    ) -> Result<HashMap<EthAddress, Vec<EthAddress>>> {
        let mut out = HashMap::new();
        for (&addr, engine) in self.peers.read().await.iter() {
            if addr == self.self_address {
                continue;
            }
            out.insert(
                addr,
                engine
                    .get_complaints_by(decryption_condition, self.self_address)
                    .await?,
            );
        }
        Ok(out)
    }

    async fn get_encryption_key_part(
        &self,
        decryption_condition: &str,
    ) -> Result<HashMap<EthAddress, Point>> {
        let mut out = HashMap::new();
        for (&addr, engine) in self.peers.read().await.iter() {
            if addr == self.self_address {
                continue;
            }
            out.insert(addr, engine.get_encryption_key_part(decryption_condition).await?);
        }
        Ok(out)
    }

    async fn get_decryption_key_part(
        &self,
        decryption_condition: &str,
    ) -> Result<HashMap<EthAddress, Scalar>> {
        let mut out = HashMap::new();
        for (&addr, engine) in self.peers.read().await.iter() {
            if addr == self.self_address {
                continue;
            }
            out.insert(addr, engine.get_decryption_key_part(decryption_condition).await?);
        }
        Ok(out)
    }
}

/// The decryption condition is always immediately "satisfied" in tests.
struct AlwaysSatisfied;

#[async_trait]
impl ConditionWatcher for AlwaysSatisfied {
    async fn wait_until_satisfied(&self, _decryption_condition: &str) -> Result<()> {
        Ok(())
    }
}

fn build_node(
    peers: Arc<RwLock<HashMap<EthAddress, Arc<ProtocolEngine>>>>,
) -> (EthAddress, Arc<ProtocolEngine>) {
    let identity = NodeIdentity::from_signing_key(SigningKey::random(&mut OsRng));
    let address = identity.address;
    let broadcaster = Arc::new(InProcessBroadcaster {
        self_address: address,
        peers,
    });
    let engine = Arc::new(ProtocolEngine::new(
        Arc::new(MemoryStore::new()),
        broadcaster,
        Arc::new(AlwaysSatisfied),
        identity,
        EngineConfig::default(),
    ));
    (address, engine)
}

#[tokio::test]
async fn three_nodes_converge_on_the_same_key() {
    const CONDITION: &str = "order-42-delivered";

    let peers: Arc<RwLock<HashMap<EthAddress, Arc<ProtocolEngine>>>> =
        Arc::new(RwLock::new(HashMap::new()));

    let mut nodes = Vec::new();
    for _ in 0..3 {
        let (address, engine) = build_node(peers.clone());
        peers.write().await.insert(address, engine.clone());
        nodes.push(engine);
    }

    // Every node must generate its own polynomials before any node can ask
    // its peers for shares.
    for node in &nodes {
        node.run_until_phase(CONDITION, Phase::KeyDistribution)
            .await
            .unwrap();
    }

    let (r0, r1, r2) = tokio::join!(
        nodes[0].run_until_phase(CONDITION, Phase::Complete),
        nodes[1].run_until_phase(CONDITION, Phase::Complete),
        nodes[2].run_until_phase(CONDITION, Phase::Complete),
    );
    r0.unwrap();
    r1.unwrap();
    r2.unwrap();

    let messages = futures_join_all_state_messages(&nodes, CONDITION).await;

    let encryption_key = messages[0].encryption_key.clone();
    assert!(encryption_key.is_some());
    for msg in &messages {
        assert_eq!(msg.encryption_key, encryption_key);
        assert_eq!(msg.phase, "complete");
        assert_eq!(msg.threshold, Some(2));
    }
}

#[tokio::test]
async fn decryption_key_matches_encryption_key() {
    const CONDITION: &str = "order-7-delivered";

    let peers: Arc<RwLock<HashMap<EthAddress, Arc<ProtocolEngine>>>> =
        Arc::new(RwLock::new(HashMap::new()));

    let mut nodes = Vec::new();
    for _ in 0..3 {
        let (address, engine) = build_node(peers.clone());
        peers.write().await.insert(address, engine.clone());
        nodes.push(engine);
    }

    for node in &nodes {
        node.run_until_phase(CONDITION, Phase::KeyDistribution)
            .await
            .unwrap();
    }
    let (r0, r1, r2) = tokio::join!(
        nodes[0].run_until_phase(CONDITION, Phase::Complete),
        nodes[1].run_until_phase(CONDITION, Phase::Complete),
        nodes[2].run_until_phase(CONDITION, Phase::Complete),
    );
    r0.unwrap();
    r1.unwrap();
    r2.unwrap();

    let encryption_key = nodes[0].encryption_key(CONDITION).await.unwrap();
    let decryption_key = nodes[0].decryption_key(CONDITION).await.unwrap();

    assert_eq!(Point::generator() * decryption_key, encryption_key);

    // Every node reconstructs the same private key, despite each summing a
    // different set of peer contributions plus its own constant term.
    for node in &nodes[1..] {
        assert_eq!(node.decryption_key(CONDITION).await.unwrap(), decryption_key);
    }
}

async fn futures_join_all_state_messages(
    nodes: &[Arc<ProtocolEngine>],
    condition: &str,
) -> Vec<ecdkg_core::engine::StateMessage> {
    let mut out = Vec::with_capacity(nodes.len());
    for node in nodes {
        out.push(node.to_state_message(condition).await.unwrap());
    }
    out
}
