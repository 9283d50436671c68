//! Core protocol engine and cryptographic primitives for a Pedersen-style
//! threshold ECDKG (distributed key generation) service over secp256k1.

pub mod constants;
pub mod curve;
pub mod engine;
pub mod error;
pub mod poly;
pub mod store;

pub use error::{Error, Result};
