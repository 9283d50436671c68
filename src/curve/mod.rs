//! Curve & Scalar Arithmetic (spec.md §4.1): secp256k1 point and scalar
//! operations, point (de)serialization, and domain-separated signing /
//! ECDSA recovery.

pub mod address;
pub mod point;
pub mod scalar;
pub mod signing;

pub use address::EthAddress;
pub use point::Point;
pub use scalar::{scalar_pow_mod_n, Scalar};
pub use signing::{hash_personal_message, recover_address, sign, RecoverableSignature};

/// The second, independently-chosen generator `H` (spec.md §3, §6), whose
/// discrete log base `G` is unknown. Loaded once and cached.
pub fn h_generator() -> Point {
    use std::sync::OnceLock;
    static H: OnceLock<Point> = OnceLock::new();
    *H.get_or_init(|| {
        Point::from_affine_coordinates(&crate::constants::H_GENERATOR_X, &crate::constants::H_GENERATOR_Y)
            .expect("H_GENERATOR_X/Y must decode to a valid secp256k1 point")
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn h_generator_is_on_curve_and_stable() {
        let h1 = h_generator();
        let h2 = h_generator();
        assert_eq!(h1, h2);
        assert!(!h1.is_identity());
    }
}
