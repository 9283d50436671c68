//! Polynomial & Commitment Kit (spec.md §4.2): random polynomial generation,
//! Horner evaluation mod `N`, and Pedersen commitments over the two
//! generators `G` and `H`.
//!
//! Grounded directly in `tofn::crypto_tools::vss::Vss`: the same
//! "coefficients low-order first" layout and the same
//! `k256::Scalar::random(rand::thread_rng())` coefficient draw, generalized
//! from VSS's single-generator commitment (`a·G`) to the Pedersen
//! two-generator commitment this protocol's share-verification equation
//! requires (`a·G + b·H`).

use crate::curve::{h_generator, Point, Scalar};
use crate::error::{Error, Result};

/// A polynomial over the scalar field, coefficients low-order first
/// (`poly[0]` is the constant term / the secret).
#[derive(Clone, Debug, zeroize::Zeroize, zeroize::ZeroizeOnDrop, serde::Serialize, serde::Deserialize)]
pub struct Polynomial(Vec<Scalar>);

impl Polynomial {
    /// `random_polynomial(degree_bound t) -> (scalar × t)`: each coefficient
    /// drawn uniformly from `[1, N)` using a cryptographic RNG, all `t`
    /// coefficients independent.
    pub fn random(t: usize) -> Self {
        let mut rng = rand::thread_rng();
        Self((0..t).map(|_| Scalar::random_nonzero(&mut rng)).collect())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn coefficients(&self) -> &[Scalar] {
        &self.0
    }

    /// The secret this polynomial commits to: `poly[0]`.
    pub fn constant_term(&self) -> Scalar {
        self.0[0]
    }

    /// `eval_poly(poly, x: Scalar) -> Scalar`: returns `Σ cₖ · xᵏ mod N`,
    /// evaluated via Horner's method (the contract is only the value).
    pub fn eval(&self, x: Scalar) -> Scalar {
        self.0
            .iter()
            .rev()
            .fold(Scalar::zero(), |acc, &coeff| acc * x + coeff)
    }
}

/// The Pedersen-commitment vector to a pair of polynomials:
/// `commitments[k] = poly1[k]·G + poly2[k]·H`.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CommitmentVec(Vec<Point>);

impl CommitmentVec {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[Point] {
        &self.0
    }

    pub fn from_points(points: Vec<Point>) -> Self {
        Self(points)
    }

    /// Evaluate the committed polynomial pair's Pedersen commitment at
    /// scalar `x` via Horner's method: `Σ_{k} commitments[k] · x^k`. This is
    /// the right-hand side of spec.md §4.4 KeyVerification's check equation.
    pub fn eval(&self, x: Scalar) -> Point {
        self.0
            .iter()
            .rev()
            .fold(Point::identity(), |acc, &commit| acc * x + commit)
    }
}

/// `pedersen_commit(poly1, poly2) -> (Point × t)`: fails with
/// `LengthMismatch` if the two polynomials differ in length; otherwise
/// returns the vector `(poly1[k]·G + poly2[k]·H)ₖ`.
pub fn pedersen_commit(poly1: &Polynomial, poly2: &Polynomial) -> Result<CommitmentVec> {
    if poly1.len() != poly2.len() {
        return Err(Error::LengthMismatch {
            poly1_len: poly1.len(),
            poly2_len: poly2.len(),
        });
    }
    let g = Point::generator();
    let h = h_generator();
    let commits = poly1
        .coefficients()
        .iter()
        .zip(poly2.coefficients().iter())
        .map(|(&a, &b)| (g * a) + (h * b))
        .collect();
    Ok(CommitmentVec(commits))
}
