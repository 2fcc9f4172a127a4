use crate::poly_commit::errors::PolyComSchemeError;
use ark_bn254::{Bn254, Fr, G1Affine, G1Projective, G2Affine, G2Projective};
use ark_ec::{pairing::Pairing, AffineRepr, CurveGroup, Group, VariableBaseMSM};
use ark_poly::univariate::DensePolynomial;
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use ark_std::{
    rand::{CryptoRng, RngCore},
    vec,
    vec::Vec,
    UniformRand,
};

/// The part of a KZG structured reference string needed to check openings.
#[derive(Debug, Clone, PartialEq, Eq, CanonicalSerialize, CanonicalDeserialize)]
pub struct KZGVerifierParams {
    /// The generator `[1]₁`.
    pub g1: G1Affine,
    /// The generator `[1]₂`.
    pub g2: G2Affine,
    /// The toxic-waste power `[τ]₂`.
    pub tau_g2: G2Affine,
}

impl KZGVerifierParams {
    /// Return true if `e(lhs, [1]₂) == e(rhs, [τ]₂)`.
    pub fn check_pairing(&self, lhs: &G1Affine, rhs: &G1Affine) -> bool {
        Bn254::pairing(*lhs, self.g2) == Bn254::pairing(*rhs, self.tau_g2)
    }
}

/// KZG commitment scheme over BN254.
#[derive(Debug, Clone, CanonicalSerialize, CanonicalDeserialize)]
pub struct KZGCommitmentScheme {
    /// public parameter about G1.
    pub public_parameter_group_1: Vec<G1Affine>,
    /// public parameter about G2.
    pub public_parameter_group_2: Vec<G2Affine>,
}

impl KZGCommitmentScheme {
    /// Create a new instance of a KZG polynomial commitment scheme.
    /// `max_degree` - max degree of the polynomial,
    /// `prng` - pseudo-random generator.
    pub fn new<R: CryptoRng + RngCore>(max_degree: usize, prng: &mut R) -> KZGCommitmentScheme {
        let s = Fr::rand(prng);

        let mut public_parameter_group_1 = Vec::with_capacity(max_degree + 1);
        let mut elem_g1 = G1Projective::generator();
        for _ in 0..=max_degree {
            public_parameter_group_1.push(elem_g1);
            elem_g1 *= s;
        }

        let elem_g2 = G2Projective::generator();
        let public_parameter_group_2 = vec![elem_g2, elem_g2 * s];

        KZGCommitmentScheme {
            public_parameter_group_1: G1Projective::normalize_batch(&public_parameter_group_1),
            public_parameter_group_2: G2Projective::normalize_batch(&public_parameter_group_2),
        }
    }

    /// The maximal degree of a polynomial this scheme can commit to.
    pub fn max_degree(&self) -> usize {
        self.public_parameter_group_1.len() - 1
    }

    /// Commit to a polynomial given by its coefficients.
    pub fn commit(&self, polynomial: &DensePolynomial<Fr>) -> Result<G1Affine, PolyComSchemeError> {
        let coefs = &polynomial.coeffs;
        if coefs.len() > self.public_parameter_group_1.len() {
            return Err(PolyComSchemeError::DegreeError);
        }
        if coefs.is_empty() {
            return Ok(G1Affine::zero());
        }
        let commitment =
            G1Projective::msm_unchecked(&self.public_parameter_group_1[..coefs.len()], coefs);
        Ok(commitment.into_affine())
    }

    /// Keep only the parameters used to check openings.
    pub fn shrink_to_verifier_only(&self) -> KZGVerifierParams {
        KZGVerifierParams {
            g1: self.public_parameter_group_1[0],
            g2: self.public_parameter_group_2[0],
            tau_g2: self.public_parameter_group_2[1],
        }
    }
}
