//! Protocol Engine (spec.md §4.4): the phase state machine, its config and
//! node-identity plumbing, and the collaborator traits it runs against.

pub mod config;
pub mod identity;
pub mod protocol;
pub mod transport;
pub mod wire;

pub use config::EngineConfig;
pub use identity::NodeIdentity;
pub use protocol::{ParticipantStateMessage, ProtocolEngine, StateMessage};
pub use transport::{Broadcaster, ConditionWatcher, SignedShares};
