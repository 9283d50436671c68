//! Message construction and rpc method naming for the transport
//! collaborator (spec.md §6): building the exact byte string a peer signs
//! when delivering secret shares, matching the original
//! `decryption_condition || address || b"SECRETSHARES" || share1 || share2`
//! layout byte for byte.

use crate::constants::SECRET_SHARES_TAG;
use crate::curve::{EthAddress, Scalar};

/// The message a peer signs (and the verifier reconstructs and checks
/// against the signature) when delivering `share1`/`share2` to
/// `recipient` for `decryption_condition`.
pub fn build_shares_message(
    decryption_condition: &str,
    recipient: EthAddress,
    share1: Scalar,
    share2: Scalar,
) -> Vec<u8> {
    let mut msg = Vec::with_capacity(
        decryption_condition.len() + 20 + SECRET_SHARES_TAG.len() + 32 + 32,
    );
    msg.extend_from_slice(decryption_condition.as_bytes());
    msg.extend_from_slice(&recipient.to_bytes());
    msg.extend_from_slice(SECRET_SHARES_TAG);
    msg.extend_from_slice(&share1.to_be_bytes());
    msg.extend_from_slice(&share2.to_be_bytes());
    msg
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_layout_is_condition_address_tag_share1_share2() {
        let cond = "abc";
        let addr = EthAddress::from_bytes([0x01; 20]);
        let s1 = Scalar::from_u32(1);
        let s2 = Scalar::from_u32(2);
        let msg = build_shares_message(cond, addr, s1, s2);

        assert_eq!(&msg[..3], b"abc");
        assert_eq!(&msg[3..23], &addr.to_bytes());
        assert_eq!(&msg[23..35], SECRET_SHARES_TAG);
        assert_eq!(&msg[35..67], &s1.to_be_bytes());
        assert_eq!(&msg[67..99], &s2.to_be_bytes());
    }
}
