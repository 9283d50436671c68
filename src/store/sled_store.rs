//! Crash-resumable [`SessionStorage`] backend on top of `sled`, the
//! pure-Rust embedded KV store (in the spirit of `chainflip-backend`'s
//! `PersistentKeyDB`, but without pulling in `rocksdb`'s C++ toolchain
//! dependency — see DESIGN.md).
//!
//! Keys are plain `:`-joined strings; values are `bincode`-encoded
//! [`Session`]/[`Participant`]/[`Complaint`] records. Each `put` flushes
//! before returning, so a crash can only ever be "before this write" or
//! "after it" — never partway through one record. The engine always saves
//! participant data before the session's `phase` field is advanced and
//! persisted, so a crash before the phase write simply replays the same
//! participant writes on retry; no cross-record batch is needed to preserve
//! that ordering.

use async_trait::async_trait;

use crate::curve::EthAddress;
use crate::error::{Error, Result};
use crate::store::backend::{normalize_decryption_condition, SessionStorage};
use crate::store::model::{Complaint, Participant, Session};

pub struct SledStore {
    db: sled::Db,
}

impl SledStore {
    pub fn open(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let db = sled::open(path).map_err(|e| Error::StorageError(e.to_string()))?;
        Ok(Self { db })
    }

    fn session_key(decryption_condition: &str) -> String {
        format!("session:{decryption_condition}")
    }

    fn participant_prefix(decryption_condition: &str) -> String {
        format!("participant:{decryption_condition}:")
    }

    fn participant_key(decryption_condition: &str, address: EthAddress) -> String {
        format!("{}{}", Self::participant_prefix(decryption_condition), address.to_hex())
    }

    fn complaint_prefix(decryption_condition: &str, participant_address: EthAddress) -> String {
        format!(
            "complaint:{}:{}:",
            decryption_condition,
            participant_address.to_hex()
        )
    }

    fn complaint_key(
        decryption_condition: &str,
        participant_address: EthAddress,
        complainer_address: EthAddress,
    ) -> String {
        format!(
            "{}{}",
            Self::complaint_prefix(decryption_condition, participant_address),
            complainer_address.to_hex()
        )
    }

    fn get<T: serde::de::DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.db.get(key).map_err(|e| Error::StorageError(e.to_string()))? {
            Some(bytes) => {
                let value = bincode::deserialize(&bytes).map_err(|e| Error::StorageError(e.to_string()))?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    fn put<T: serde::Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let bytes = bincode::serialize(value).map_err(|e| Error::StorageError(e.to_string()))?;
        self.db
            .insert(key, bytes)
            .map_err(|e| Error::StorageError(e.to_string()))?;
        self.db.flush().map_err(|e| Error::StorageError(e.to_string()))?;
        Ok(())
    }
}

#[async_trait]
impl SessionStorage for SledStore {
    async fn get_or_create_session(&self, decryption_condition: &str) -> Result<Session> {
        let key = normalize_decryption_condition(decryption_condition);
        let storage_key = Self::session_key(&key);
        if let Some(session) = self.get::<Session>(&storage_key)? {
            return Ok(session);
        }
        let session = Session::new(key);
        self.put(&storage_key, &session)?;
        Ok(session)
    }

    async fn save_session(&self, session: &Session) -> Result<()> {
        let key = normalize_decryption_condition(&session.decryption_condition);
        self.put(&Self::session_key(&key), session)
    }

    async fn get_or_create_participant(
        &self,
        decryption_condition: &str,
        address: EthAddress,
    ) -> Result<Participant> {
        let key = normalize_decryption_condition(decryption_condition);
        let storage_key = Self::participant_key(&key, address);
        if let Some(participant) = self.get::<Participant>(&storage_key)? {
            return Ok(participant);
        }
        let participant = Participant::new(address);
        self.put(&storage_key, &participant)?;
        Ok(participant)
    }

    async fn save_participant(
        &self,
        decryption_condition: &str,
        participant: &Participant,
    ) -> Result<()> {
        let key = normalize_decryption_condition(decryption_condition);
        self.put(&Self::participant_key(&key, participant.address), participant)
    }

    async fn list_participants(&self, decryption_condition: &str) -> Result<Vec<Participant>> {
        let key = normalize_decryption_condition(decryption_condition);
        let prefix = Self::participant_prefix(&key);
        let mut out = Vec::new();
        for entry in self.db.scan_prefix(prefix.as_bytes()) {
            let (_, bytes) = entry.map_err(|e| Error::StorageError(e.to_string()))?;
            out.push(bincode::deserialize(&bytes).map_err(|e| Error::StorageError(e.to_string()))?);
        }
        Ok(out)
    }

    async fn get_or_create_complaint(
        &self,
        decryption_condition: &str,
        participant_address: EthAddress,
        complainer_address: EthAddress,
    ) -> Result<Complaint> {
        let key = normalize_decryption_condition(decryption_condition);
        let storage_key = Self::complaint_key(&key, participant_address, complainer_address);
        if let Some(complaint) = self.get::<Complaint>(&storage_key)? {
            return Ok(complaint);
        }
        let complaint = Complaint {
            participant_address,
            complainer_address,
        };
        self.put(&storage_key, &complaint)?;
        Ok(complaint)
    }

    async fn list_complaints_against(
        &self,
        decryption_condition: &str,
        participant_address: EthAddress,
    ) -> Result<Vec<Complaint>> {
        let key = normalize_decryption_condition(decryption_condition);
        let prefix = Self::complaint_prefix(&key, participant_address);
        let mut out = Vec::new();
        for entry in self.db.scan_prefix(prefix.as_bytes()) {
            let (_, bytes) = entry.map_err(|e| Error::StorageError(e.to_string()))?;
            out.push(bincode::deserialize(&bytes).map_err(|e| Error::StorageError(e.to_string()))?);
        }
        Ok(out)
    }
}
