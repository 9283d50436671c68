//! The six-phase DKG state machine (spec.md §4.4), driven by
//! `run_until_phase` the way the original `ECDKG.run_until_phase` dispatches
//! to `handle_{phase}_phase` coroutines. Each phase handler reads the
//! session + its participants from the store, talks to peers through the
//! `Broadcaster` collaborator, and persists the result before advancing.

use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex};

use tracing::{info, warn};

use crate::curve::{h_generator, recover_address, sign, EthAddress, Point, Scalar};
use crate::engine::config::EngineConfig;
use crate::engine::identity::NodeIdentity;
use crate::engine::transport::{Broadcaster, ConditionWatcher, SignedShares};
use crate::engine::wire::build_shares_message;
use crate::error::{Error, Result};
use crate::poly::{pedersen_commit, CommitmentVec, Polynomial};
use crate::store::{Phase, SessionStorage};

/// Drives one or more DKG sessions to completion, coordinating with peers
/// through its `Broadcaster`/`ConditionWatcher` collaborators and persisting
/// state through its `SessionStorage` backend.
pub struct ProtocolEngine {
    store: Arc<dyn SessionStorage>,
    broadcaster: Arc<dyn Broadcaster>,
    condition_watcher: Arc<dyn ConditionWatcher>,
    identity: NodeIdentity,
    config: EngineConfig,
    /// Per-`decryption_condition` locks so concurrent callers can't race
    /// each other's phase transitions on the same session.
    session_locks: StdMutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl ProtocolEngine {
    pub fn new(
        store: Arc<dyn SessionStorage>,
        broadcaster: Arc<dyn Broadcaster>,
        condition_watcher: Arc<dyn ConditionWatcher>,
        identity: NodeIdentity,
        config: EngineConfig,
    ) -> Self {
        Self {
            store,
            broadcaster,
            condition_watcher,
            identity,
            config,
            session_locks: StdMutex::new(HashMap::new()),
        }
    }

    fn session_lock(&self, decryption_condition: &str) -> Arc<tokio::sync::Mutex<()>> {
        self.session_locks
            .lock()
            .unwrap()
            .entry(decryption_condition.to_string())
            .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
            .clone()
    }

    /// Bounds a single round of `Broadcaster` calls by
    /// `EngineConfig::coms_timeout` (spec.md §5/§6 `COMS_TIMEOUT`). A peer
    /// that doesn't answer within the window is treated exactly like one
    /// that never responded at all: silently absent from the returned map,
    /// handled by each phase's own missing-peer policy.
    async fn bounded<T>(
        &self,
        call: &str,
        fut: impl std::future::Future<Output = Result<HashMap<EthAddress, T>>>,
    ) -> Result<HashMap<EthAddress, T>> {
        match tokio::time::timeout(self.config.coms_timeout, fut).await {
            Ok(result) => result,
            Err(_) => {
                warn!(call, timeout = ?self.config.coms_timeout, "broadcast round timed out");
                Ok(HashMap::new())
            }
        }
    }

    /// Advance the session for `decryption_condition` through phase handlers
    /// until it reaches (or has already passed) `target_phase`.
    pub async fn run_until_phase(
        &self,
        decryption_condition: &str,
        target_phase: Phase,
    ) -> Result<()> {
        let lock = self.session_lock(decryption_condition);
        let _guard = lock.lock().await;

        loop {
            let session = self.store.get_or_create_session(decryption_condition).await?;
            if session.phase() >= target_phase {
                return Ok(());
            }

            info!(phase = session.phase().name(), "handling phase");
            match session.phase() {
                Phase::Uninitialized => self.handle_uninitialized_phase(decryption_condition).await?,
                Phase::KeyDistribution => {
                    self.handle_key_distribution_phase(decryption_condition).await?
                }
                Phase::KeyVerification => {
                    self.handle_key_verification_phase(decryption_condition).await?
                }
                Phase::KeyCheck => self.handle_key_check_phase(decryption_condition).await?,
                Phase::KeyGeneration => {
                    self.handle_key_generation_phase(decryption_condition).await?
                }
                Phase::KeyPublication => {
                    self.handle_key_publication_phase(decryption_condition).await?
                }
                Phase::Complete => unreachable!("loop exits once phase >= target_phase"),
            }
        }
    }

    async fn handle_uninitialized_phase(&self, decryption_condition: &str) -> Result<()> {
        let mut session = self.store.get_or_create_session(decryption_condition).await?;

        for addr in self.broadcaster.list_peers(decryption_condition).await? {
            self.store
                .get_or_create_participant(decryption_condition, addr)
                .await?;
        }
        let peer_count = self
            .store
            .list_participants(decryption_condition)
            .await?
            .len();
        let threshold = (self.config.threshold_factor * (peer_count as f64 + 1.0)).ceil() as u32;

        let spoly1 = Polynomial::random(threshold as usize);
        let spoly2 = Polynomial::random(threshold as usize);

        session.encryption_key_part = Some(Point::generator() * spoly1.constant_term());
        session.verification_points = Some(pedersen_commit(&spoly1, &spoly2)?);
        session.secret_poly1 = Some(spoly1);
        session.secret_poly2 = Some(spoly2);
        session.threshold = Some(threshold);
        session.phase = Some(Phase::KeyDistribution);

        self.store.save_session(&session).await?;
        Ok(())
    }

    async fn handle_key_distribution_phase(&self, decryption_condition: &str) -> Result<()> {
        let mut session = self.store.get_or_create_session(decryption_condition).await?;

        let signed_shares = self
            .bounded(
                "get_signed_secret_shares",
                self.broadcaster.get_signed_secret_shares(decryption_condition),
            )
            .await?;
        for mut participant in self.store.list_participants(decryption_condition).await? {
            let address = participant.address;
            let Some(shares) = signed_shares.get(&address) else {
                warn!(%address, "missing signed secret shares from peer");
                continue;
            };

            let msg = build_shares_message(
                decryption_condition,
                self.identity.address,
                shares.share1,
                shares.share2,
            );
            let recovered = match recover_address(&msg, &shares.signature) {
                Ok(recovered) => recovered,
                Err(_) => {
                    warn!(%address, "signature from peer could not be verified");
                    continue;
                }
            };
            if recovered != address {
                warn!(%address, %recovered, "recovered address does not match claimed sender");
                continue;
            }

            participant.secret_share1 = Some(shares.share1);
            participant.secret_share2 = Some(shares.share2);
            participant.shares_signature = Some(shares.signature);
            self.store
                .save_participant(decryption_condition, &participant)
                .await?;
        }

        let verification_points = self
            .bounded(
                "get_verification_points",
                self.broadcaster.get_verification_points(decryption_condition),
            )
            .await?;
        let threshold = session.threshold.map(|t| t as usize);
        for mut participant in self.store.list_participants(decryption_condition).await? {
            match verification_points.get(&participant.address) {
                Some(points) if threshold.is_some_and(|t| points.len() != t) => {
                    warn!(
                        address = %participant.address,
                        expected = ?threshold,
                        got = points.len(),
                        "verification_points length mismatch, dropping"
                    );
                }
                Some(points) => {
                    participant.verification_points = Some(points.clone());
                    self.store
                        .save_participant(decryption_condition, &participant)
                        .await?;
                }
                None => warn!(address = %participant.address, "missing verification_points from peer"),
            }
        }

        session.phase = Some(Phase::KeyVerification);
        self.store.save_session(&session).await?;
        Ok(())
    }

    async fn handle_key_verification_phase(&self, decryption_condition: &str) -> Result<()> {
        let mut session = self.store.get_or_create_session(decryption_condition).await?;
        let own_address_scalar = Scalar::from_be_bytes_reduced(&self.identity.address.to_bytes());

        for participant in self.store.list_participants(decryption_condition).await? {
            let checks_out = match (
                participant.secret_share1,
                participant.secret_share2,
                &participant.verification_points,
            ) {
                (Some(share1), Some(share2), Some(points)) => {
                    let lhs = (Point::generator() * share1) + (h_generator() * share2);
                    lhs == points.eval(own_address_scalar)
                }
                _ => false,
            };

            if !checks_out {
                warn!(address = %participant.address, "share does not match published commitment, recording complaint");
                self.store
                    .get_or_create_complaint(
                        decryption_condition,
                        participant.address,
                        self.identity.address,
                    )
                    .await?;
            }
        }

        session.phase = Some(Phase::KeyCheck);
        self.store.save_session(&session).await?;
        Ok(())
    }

    async fn handle_key_check_phase(&self, decryption_condition: &str) -> Result<()> {
        let mut session = self.store.get_or_create_session(decryption_condition).await?;

        let complaints = self
            .bounded("get_complaints", self.broadcaster.get_complaints(decryption_condition))
            .await?;
        for (&complainer, accused_list) in complaints.iter() {
            for &accused in accused_list {
                // Recorded, not resolved: this protocol has no complaint
                // response/slashing step.
                self.store
                    .get_or_create_complaint(decryption_condition, accused, complainer)
                    .await?;
            }
        }

        session.phase = Some(Phase::KeyGeneration);
        self.store.save_session(&session).await?;
        Ok(())
    }

    async fn handle_key_generation_phase(&self, decryption_condition: &str) -> Result<()> {
        let mut session = self.store.get_or_create_session(decryption_condition).await?;
        let encryption_key_parts = self
            .bounded(
                "get_encryption_key_part",
                self.broadcaster.get_encryption_key_part(decryption_condition),
            )
            .await?;

        let mut encryption_key = session.encryption_key_part.ok_or_else(|| {
            Error::ProtocolError("own encryption_key_part missing; uninitialized phase did not run".into())
        })?;

        for mut participant in self.store.list_participants(decryption_condition).await? {
            match encryption_key_parts.get(&participant.address) {
                Some(&part) => {
                    encryption_key = encryption_key + part;
                    participant.encryption_key_part = Some(part);
                    self.store
                        .save_participant(decryption_condition, &participant)
                        .await?;
                }
                None => {
                    return Err(Error::ProtocolError(format!(
                        "missing encryption_key_part from address {}",
                        participant.address
                    )));
                }
            }
        }

        session.encryption_key = Some(encryption_key);
        session.phase = Some(Phase::KeyPublication);
        self.store.save_session(&session).await?;
        Ok(())
    }

    async fn handle_key_publication_phase(&self, decryption_condition: &str) -> Result<()> {
        let mut session = self.store.get_or_create_session(decryption_condition).await?;
        self.condition_watcher
            .wait_until_satisfied(decryption_condition)
            .await?;

        let decryption_key_parts = self
            .bounded(
                "get_decryption_key_part",
                self.broadcaster.get_decryption_key_part(decryption_condition),
            )
            .await?;

        let mut decryption_key = session
            .secret_poly1
            .as_ref()
            .ok_or_else(|| {
                Error::ProtocolError("own secret_poly1 missing; uninitialized phase did not run".into())
            })?
            .constant_term();

        for mut participant in self.store.list_participants(decryption_condition).await? {
            match decryption_key_parts.get(&participant.address) {
                Some(&part) => {
                    decryption_key = decryption_key + part;
                    participant.decryption_key_part = Some(part);
                    self.store
                        .save_participant(decryption_condition, &participant)
                        .await?;
                }
                None => return Err(Error::ProtocolError("missing decryption key part!".into())),
            }
        }

        session.decryption_key = Some(decryption_key);
        session.phase = Some(Phase::Complete);
        self.store.save_session(&session).await?;
        Ok(())
    }

    /// Serve a peer's request for our signed shares, evaluating both secret
    /// polynomials at `requester`'s address and signing the result so the
    /// requester can authenticate it against our address.
    pub async fn get_signed_secret_shares(
        &self,
        decryption_condition: &str,
        requester: EthAddress,
    ) -> Result<SignedShares> {
        let session = self.store.get_or_create_session(decryption_condition).await?;
        let poly1 = session
            .secret_poly1
            .as_ref()
            .ok_or_else(|| Error::ProtocolError("polynomials not yet generated".into()))?;
        let poly2 = session
            .secret_poly2
            .as_ref()
            .ok_or_else(|| Error::ProtocolError("polynomials not yet generated".into()))?;

        let x = Scalar::from_be_bytes_reduced(&requester.to_bytes());
        let share1 = poly1.eval(x);
        let share2 = poly2.eval(x);

        let msg = build_shares_message(decryption_condition, requester, share1, share2);
        let signature = sign(&msg, self.identity.signing_key())?;

        Ok(SignedShares {
            share1,
            share2,
            signature,
        })
    }

    pub async fn get_verification_points(&self, decryption_condition: &str) -> Result<CommitmentVec> {
        let session = self.store.get_or_create_session(decryption_condition).await?;
        session
            .verification_points
            .ok_or_else(|| Error::ProtocolError("verification_points not yet generated".into()))
    }

    /// The addresses this node has lodged a complaint against, as seen by
    /// `complainer` (who is always this node itself, under the current
    /// one-complaint-per-verifier design).
    pub async fn get_complaints_by(
        &self,
        decryption_condition: &str,
        complainer: EthAddress,
    ) -> Result<Vec<EthAddress>> {
        let mut out = Vec::new();
        for participant in self.store.list_participants(decryption_condition).await? {
            let against = self
                .store
                .list_complaints_against(decryption_condition, participant.address)
                .await?;
            if against.iter().any(|c| c.complainer_address == complainer) {
                out.push(participant.address);
            }
        }
        Ok(out)
    }

    pub async fn get_encryption_key_part(&self, decryption_condition: &str) -> Result<Point> {
        let session = self.store.get_or_create_session(decryption_condition).await?;
        session
            .encryption_key_part
            .ok_or_else(|| Error::ProtocolError("encryption_key_part not yet generated".into()))
    }

    /// This node's contribution to the final, additively-combined
    /// decryption key: its own secret polynomial's constant term.
    pub async fn get_decryption_key_part(&self, decryption_condition: &str) -> Result<Scalar> {
        let session = self.store.get_or_create_session(decryption_condition).await?;
        Ok(session
            .secret_poly1
            .as_ref()
            .ok_or_else(|| Error::ProtocolError("polynomials not yet generated".into()))?
            .constant_term())
    }

    /// The additively-combined group public key, available once the session
    /// has reached `KeyGeneration` or later.
    pub async fn encryption_key(&self, decryption_condition: &str) -> Result<Point> {
        let session = self.store.get_or_create_session(decryption_condition).await?;
        session
            .encryption_key
            .ok_or_else(|| Error::ProtocolError("encryption_key not yet generated".into()))
    }

    /// This node's view of the additively-combined private key, available
    /// once the session has reached `Complete`.
    pub async fn decryption_key(&self, decryption_condition: &str) -> Result<Scalar> {
        let session = self.store.get_or_create_session(decryption_condition).await?;
        session
            .decryption_key
            .ok_or_else(|| Error::ProtocolError("decryption_key not yet generated".into()))
    }

    /// A JSON-friendly snapshot of this session, the way
    /// `ECDKG.to_state_message` renders session + participant state for
    /// status reporting. Always reports from this node's own perspective
    /// regardless of any caller-supplied address.
    pub async fn to_state_message(&self, decryption_condition: &str) -> Result<StateMessage> {
        let session = self.store.get_or_create_session(decryption_condition).await?;
        let mut participants = HashMap::new();
        for participant in self.store.list_participants(decryption_condition).await? {
            participants.insert(
                participant.address.to_hex(),
                ParticipantStateMessage {
                    encryption_key_part: participant.encryption_key_part.map(|p| p.to_hex()),
                    verification_points: participant
                        .verification_points
                        .map(|v| v.as_slice().iter().map(Point::to_hex).collect()),
                },
            );
        }

        Ok(StateMessage {
            address: self.identity.address.to_hex(),
            decryption_condition: session.decryption_condition.clone(),
            phase: session.phase().name(),
            threshold: session.threshold,
            participants,
            encryption_key: session.encryption_key.map(|p| p.to_hex()),
            encryption_key_part: session.encryption_key_part.map(|p| p.to_hex()),
            verification_points: session
                .verification_points
                .map(|v| v.as_slice().iter().map(Point::to_hex).collect()),
        })
    }
}

#[derive(Clone, Debug, serde::Serialize)]
pub struct ParticipantStateMessage {
    pub encryption_key_part: Option<String>,
    pub verification_points: Option<Vec<String>>,
}

#[derive(Clone, Debug, serde::Serialize)]
pub struct StateMessage {
    pub address: String,
    pub decryption_condition: String,
    pub phase: &'static str,
    pub threshold: Option<u32>,
    pub participants: HashMap<String, ParticipantStateMessage>,
    pub encryption_key: Option<String>,
    pub encryption_key_part: Option<String>,
    pub verification_points: Option<Vec<String>>,
}
