//! This node's signing identity: the keypair used to sign outgoing secret
//! shares and the address peers verify those signatures against.

use k256::ecdsa::SigningKey;

use crate::curve::EthAddress;

#[derive(Clone)]
pub struct NodeIdentity {
    pub address: EthAddress,
    signing_key: SigningKey,
}

impl NodeIdentity {
    pub fn from_signing_key(signing_key: SigningKey) -> Self {
        let address = EthAddress::from_verifying_key(signing_key.verifying_key());
        Self {
            address,
            signing_key,
        }
    }

    pub fn signing_key(&self) -> &SigningKey {
        &self.signing_key
    }
}

impl std::fmt::Debug for NodeIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeIdentity")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::OsRng;

    #[test]
    fn address_is_derived_from_the_signing_key() {
        let key = SigningKey::random(&mut OsRng);
        let identity = NodeIdentity::from_signing_key(key.clone());
        assert_eq!(
            identity.address,
            EthAddress::from_verifying_key(key.verifying_key())
        );
    }
}
