//! Protocol-wide constants: domain separation tags, the second Pedersen
//! generator, and default tunables.

/// Domain separator appended to the message a peer signs when delivering its
/// secret shares for a decryption condition, per the wire contract.
pub const SECRET_SHARES_TAG: &[u8] = b"SECRETSHARES";

/// Default timeout for a single round of `Broadcaster::broadcast`, per the
/// `COMS_TIMEOUT` collaborator contract.
pub const DEFAULT_COMS_TIMEOUT_SECS: u64 = 10;

/// `threshold = ceil(THRESHOLD_FACTOR * (n+1))` where n = peer count.
pub const THRESHOLD_FACTOR: f64 = 0.5;

/// Maximum length, in UTF-8 bytes, of a normalized `decryption_condition`.
pub const MAX_DECRYPTION_CONDITION_BYTES: usize = 32;

/// Big-endian x-coordinate of the second generator `H`. Every implementation
/// MUST use this exact point so that nodes interoperate.
pub const H_GENERATOR_X: [u8; 32] = [
    0xb2, 0x5b, 0x5e, 0xa8, 0xb8, 0xb2, 0x30, 0xe5, 0x57, 0x4f, 0xec, 0x01, 0x82, 0xe8, 0x09, 0xe3,
    0x45, 0x57, 0x01, 0x32, 0x39, 0x68, 0xc6, 0x02, 0xab, 0x56, 0xb4, 0x58, 0xd0, 0xba, 0x96, 0xbf,
];

/// Big-endian y-coordinate of the second generator `H`.
pub const H_GENERATOR_Y: [u8; 32] = [
    0x13, 0xed, 0xfe, 0x75, 0xe1, 0xc8, 0x8e, 0x03, 0x0e, 0xda, 0x22, 0x0f, 0xfc, 0x74, 0x80, 0x21,
    0x44, 0xae, 0xc6, 0x7c, 0x4e, 0x51, 0xcb, 0x49, 0x69, 0x9d, 0x44, 0x01, 0xc1, 0x22, 0xe1, 0x9c,
];

/// RPC method names consumed from the transport collaborator (spec.md §6).
pub mod rpc_methods {
    pub const GET_SIGNED_SECRET_SHARES: &str = "get_signed_secret_shares";
    pub const GET_VERIFICATION_POINTS: &str = "get_verification_points";
    pub const GET_COMPLAINTS: &str = "get_complaints";
    pub const GET_ENCRYPTION_KEY_PART: &str = "get_encryption_key_part";
    pub const GET_DECRYPTION_KEY_PART: &str = "get_decryption_key_part";
}
