//! # Baby Jubjub
//!
//! The twisted Edwards curve embedded in the BN254 scalar field, in the
//! parameterisation circomlib uses:
//!
//! ```text
//! 168700·x² + y² = 1 + 168696·x²·y²     over Fq = BN254 Fr
//! ```
//!
//! `ark-ed-on-bn254` ships the same curve rescaled to `a = 1`. The two are
//! isomorphic, but the rescaling changes every x-coordinate and therefore
//! the sign bit of the compressed encoding. Peers proving statements in
//! circom use the unscaled form, so we define our own `TECurveConfig` and
//! only borrow the field types from `ark-ed-on-bn254`.
//!
//! The full group has order `8·l`. All protocol arithmetic happens in the
//! prime-order subgroup generated by `Base8`, whose order `l` is the
//! modulus of [`Fr`].

use ark_ec::{
    models::CurveConfig,
    twisted_edwards::{Affine, MontCurveConfig, Projective, TECurveConfig},
    AffineRepr, CurveGroup,
};
use ark_ed_on_bn254::{Fq, Fr};
use ark_ff::{BigInteger, MontFp, PrimeField, UniformRand};
use num_bigint::BigUint;
use rand_core::{CryptoRng, RngCore};

use crate::smp::error::{Result, SmpError};

/// A point on Baby Jubjub in affine coordinates.
pub type Point = Affine<BabyJubConfig>;

/// A point on Baby Jubjub in extended projective coordinates. All group
/// arithmetic happens here; convert to [`Point`] only for encoding/hashing.
pub type PointProjective = Projective<BabyJubConfig>;

/// Curve parameters for circomlib's Baby Jubjub.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BabyJubConfig;

const GENERATOR_X: Fq =
    MontFp!("5299619240641551281634865583518297030282874472190772894086521144482721001553");
const GENERATOR_Y: Fq =
    MontFp!("16950150798460657717958625567821834550301663161624707787222815936182638968203");

impl CurveConfig for BabyJubConfig {
    type BaseField = Fq;
    type ScalarField = Fr;

    const COFACTOR: &'static [u64] = &[8];

    /// 8⁻¹ mod l
    const COFACTOR_INV: Fr =
        MontFp!("2394026564107420727433200628387514462817212225638746351800188703329891451411");
}

impl TECurveConfig for BabyJubConfig {
    const COEFF_A: Fq = MontFp!("168700");
    const COEFF_D: Fq = MontFp!("168696");

    /// `Base8`, the generator of the prime-order subgroup.
    const GENERATOR: Point = Point::new_unchecked(GENERATOR_X, GENERATOR_Y);

    type MontCurveConfig = BabyJubConfig;
}

impl MontCurveConfig for BabyJubConfig {
    // A = 2(a + d) / (a - d), B = 4 / (a - d)
    const COEFF_A: Fq = MontFp!("168698");
    const COEFF_B: Fq = MontFp!("1");

    type TECurveConfig = BabyJubConfig;
}

// ---------------------------------------------------------------------------
// Group Primitives
// ---------------------------------------------------------------------------

/// The fixed generator `Base8`.
pub fn generator() -> PointProjective {
    <BabyJubConfig as TECurveConfig>::GENERATOR.into_group()
}

/// The order `l` of the prime subgroup. Every exponent is reduced modulo
/// this value before use.
pub fn group_order() -> BigUint {
    Fr::MODULUS.into()
}

/// Raise `base` to `exponent` (scalar multiplication, in additive notation).
pub fn exponentiate(base: &PointProjective, exponent: &Fr) -> PointProjective {
    *base * exponent
}

/// `g^exponent` for the fixed generator.
pub fn exponentiate_generator(exponent: &Fr) -> PointProjective {
    exponentiate(&generator(), exponent)
}

/// True when `point` is on the curve and in the prime-order subgroup.
pub fn is_valid(point: &Point) -> bool {
    point.is_on_curve() && point.is_in_correct_subgroup_assuming_on_curve()
}

/// Check a group element received from the peer before it is used.
///
/// Rejects points outside the prime-order subgroup (small-subgroup
/// confinement) and the identity, which would make any exponent look
/// correct.
pub fn check_group_element(point: &Point, name: &str) -> Result<()> {
    if !is_valid(point) {
        return Err(SmpError::VerificationFailed(format!(
            "{name} is not in the prime-order subgroup"
        )));
    }
    if point.is_zero() {
        return Err(SmpError::VerificationFailed(format!("{name} is the identity")));
    }
    Ok(())
}

/// Draw a uniformly random exponent in `[0, l)`.
///
/// `rng` MUST be a cryptographically secure generator: the secrecy of
/// every SMP run rests on these exponents being unpredictable. The
/// `CryptoRng` bound catches the obvious mistakes at compile time, but no
/// unit test can tell a good CSPRNG from a bad one. Tests only show that
/// the output lands in range.
pub fn random_scalar<R: RngCore + CryptoRng + ?Sized>(rng: &mut R) -> Fr {
    Fr::rand(rng)
}

/// Reduce a base-field element into the scalar field.
pub fn base_to_scalar(value: &Fq) -> Fr {
    Fr::from_le_bytes_mod_order(&value.into_bigint().to_bytes_le())
}

/// Convert a projective point to affine, for encoding or hashing.
pub fn to_affine(point: &PointProjective) -> Point {
    point.into_affine()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use ark_ff::{One, Zero};
    use ark_std::rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn generator_is_valid() {
        let g = <BabyJubConfig as TECurveConfig>::GENERATOR;
        assert!(g.is_on_curve());
        assert!(is_valid(&g));
        assert!(check_group_element(&g, "Base8").is_ok());
    }

    #[test]
    fn generator_has_order_l() {
        let l_minus_one = -Fr::one();
        let almost = exponentiate_generator(&l_minus_one);
        assert!(!almost.is_zero());
        assert!((almost + generator()).is_zero());
    }

    #[test]
    fn group_order_matches_known_constant() {
        let expected: BigUint =
            "2736030358979909402780800718157159386076813972158567259200215660948447373041"
                .parse()
                .unwrap();
        assert_eq!(group_order(), expected);
    }

    #[test]
    fn circomlib_vector_is_on_curve() {
        // A point taken from circomlib's own test-suite.
        let x: Fq = MontFp!(
            "17777552123799933955779906779655732241715742912184938656739573121738514868268"
        );
        let y: Fq = MontFp!(
            "2626589144620713026669568689430873010625803728049924121243784502389097019475"
        );
        let p = Point::new_unchecked(x, y);
        assert!(p.is_on_curve());
        assert!(is_valid(&p));
    }

    #[test]
    fn identity_is_rejected_as_peer_element() {
        let identity = Point::zero();
        assert!(is_valid(&identity));
        let err = check_group_element(&identity, "g2a").unwrap_err();
        assert!(matches!(err, SmpError::VerificationFailed(_)));
    }

    #[test]
    fn low_order_point_is_rejected() {
        // (0, -1) has order 2.
        let p = Point::new_unchecked(Fq::zero(), -Fq::one());
        assert!(p.is_on_curve());
        assert!(!is_valid(&p));
        assert!(check_group_element(&p, "Pb").is_err());
    }

    #[test]
    fn exponentiation_is_a_homomorphism() {
        let mut rng = StdRng::seed_from_u64(7);
        let a = random_scalar(&mut rng);
        let b = random_scalar(&mut rng);
        let lhs = exponentiate_generator(&(a + b));
        let rhs = exponentiate_generator(&a) + exponentiate_generator(&b);
        assert_eq!(lhs, rhs);

        let nested = exponentiate(&exponentiate_generator(&a), &b);
        assert_eq!(nested, exponentiate_generator(&(a * b)));
    }

    #[test]
    fn random_scalars_are_in_range_and_distinct() {
        let mut rng = StdRng::seed_from_u64(99);
        let order = group_order();
        let mut seen = Vec::new();
        for _ in 0..32 {
            let s = random_scalar(&mut rng);
            let value: BigUint = s.into_bigint().into();
            assert!(value < order);
            assert!(!seen.contains(&s));
            seen.push(s);
        }
    }

    #[test]
    fn base_to_scalar_reduces() {
        // l < p, so l itself (as a base-field element) reduces to zero.
        let l_in_fq = Fq::from_le_bytes_mod_order(&Fr::MODULUS.to_bytes_le());
        assert!(base_to_scalar(&l_in_fq).is_zero());
        assert_eq!(base_to_scalar(&Fq::from(5u64)), Fr::from(5u64));
    }
}
