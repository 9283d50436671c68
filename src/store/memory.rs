//! An in-memory [`SessionStorage`] backend for tests and short-lived
//! processes, using `std::sync::RwLock`-guarded maps. No lock is ever held
//! across an `.await` point, so the plain blocking lock is sufficient and
//! cheaper than an async-aware one here.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::curve::EthAddress;
use crate::error::Result;
use crate::store::backend::{normalize_decryption_condition, SessionStorage};
use crate::store::model::{Complaint, Participant, Session};

#[derive(Default)]
pub struct MemoryStore {
    sessions: RwLock<HashMap<String, Session>>,
    participants: RwLock<HashMap<(String, EthAddress), Participant>>,
    complaints: RwLock<HashMap<(String, EthAddress, EthAddress), Complaint>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStorage for MemoryStore {
    async fn get_or_create_session(&self, decryption_condition: &str) -> Result<Session> {
        let key = normalize_decryption_condition(decryption_condition);
        if let Some(session) = self.sessions.read().unwrap().get(&key) {
            return Ok(session.clone());
        }
        let session = Session::new(key.clone());
        self.sessions.write().unwrap().insert(key, session.clone());
        Ok(session)
    }

    async fn save_session(&self, session: &Session) -> Result<()> {
        let key = normalize_decryption_condition(&session.decryption_condition);
        self.sessions.write().unwrap().insert(key, session.clone());
        Ok(())
    }

    async fn get_or_create_participant(
        &self,
        decryption_condition: &str,
        address: EthAddress,
    ) -> Result<Participant> {
        let key = (normalize_decryption_condition(decryption_condition), address);
        if let Some(p) = self.participants.read().unwrap().get(&key) {
            return Ok(p.clone());
        }
        let participant = Participant::new(address);
        self.participants
            .write()
            .unwrap()
            .insert(key, participant.clone());
        Ok(participant)
    }

    async fn save_participant(
        &self,
        decryption_condition: &str,
        participant: &Participant,
    ) -> Result<()> {
        let key = (
            normalize_decryption_condition(decryption_condition),
            participant.address,
        );
        self.participants
            .write()
            .unwrap()
            .insert(key, participant.clone());
        Ok(())
    }

    async fn list_participants(&self, decryption_condition: &str) -> Result<Vec<Participant>> {
        let key = normalize_decryption_condition(decryption_condition);
        Ok(self
            .participants
            .read()
            .unwrap()
            .iter()
            .filter(|((cond, _), _)| cond == &key)
            .map(|(_, p)| p.clone())
            .collect())
    }

    async fn get_or_create_complaint(
        &self,
        decryption_condition: &str,
        participant_address: EthAddress,
        complainer_address: EthAddress,
    ) -> Result<Complaint> {
        let key = (
            normalize_decryption_condition(decryption_condition),
            participant_address,
            complainer_address,
        );
        if let Some(c) = self.complaints.read().unwrap().get(&key) {
            return Ok(*c);
        }
        let complaint = Complaint {
            participant_address,
            complainer_address,
        };
        self.complaints.write().unwrap().insert(key, complaint);
        Ok(complaint)
    }

    async fn list_complaints_against(
        &self,
        decryption_condition: &str,
        participant_address: EthAddress,
    ) -> Result<Vec<Complaint>> {
        let cond = normalize_decryption_condition(decryption_condition);
        Ok(self
            .complaints
            .read()
            .unwrap()
            .iter()
            .filter(|((c, p, _), _)| c == &cond && *p == participant_address)
            .map(|(_, c)| *c)
            .collect())
    }
}
