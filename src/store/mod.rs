//! Session Store (spec.md §4.3): persistence for DKG session, participant,
//! and complaint state, with pluggable in-memory and `sled`-backed drivers.

pub mod backend;
pub mod memory;
pub mod model;
pub mod sled_store;

pub use backend::{normalize_decryption_condition, SessionStorage};
pub use memory::MemoryStore;
pub use model::{Complaint, Participant, Phase, Session};
pub use sled_store::SledStore;
