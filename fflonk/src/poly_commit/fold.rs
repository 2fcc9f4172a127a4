//! fflonk folding: a pack of `k` polynomials `f_0, …, f_{k-1}` is committed as
//! `G(X) = Σ X^i f_i(X^t)` where `t` is [`fold_order`]`(k)`. Opening `G` on the
//! `t` points `x·μ^j`, `μ` of order `t`, is equivalent to opening every `f_i` at `x^t`.
use crate::poly_commit::{
    errors::PolyComSchemeError,
    kzg_poly_com::KZGVerifierParams,
    shplonk::{self, ShplonkProof},
};
use ark_bn254::{Fr, G1Affine};
use ark_ff::{FftField, Field, PrimeField};
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use ark_std::vec::Vec;
use digest::Digest;
use num_bigint::BigUint;
use num_integer::Integer;

#[cfg(any(test, feature = "prover"))]
use {
    crate::poly_commit::kzg_poly_com::KZGCommitmentScheme,
    ark_poly::{univariate::DensePolynomial, DenseUVPolynomial, Polynomial},
    ark_std::{vec, Zero},
};

type Result<T, E = PolyComSchemeError> = core::result::Result<T, E>;

/// A batched opening of folded packs.
#[derive(Debug, Clone, Default, PartialEq, Eq, CanonicalSerialize, CanonicalDeserialize)]
pub struct FoldedOpeningProof {
    /// The SHPLONK proof on the expanded point sets.
    pub shplonk: ShplonkProof,
    /// For every pack, the claimed values `f_i(x^t)` in pack order.
    pub claimed_values: Vec<Vec<Fr>>,
}

fn field_order_minus_one() -> BigUint {
    BigUint::from(Fr::MODULUS) - 1u32
}

/// The smallest divisor of `r − 1` that is at least `nb_polys`.
pub fn fold_order(nb_polys: usize) -> usize {
    let r_minus_one = field_order_minus_one();
    let mut t = nb_polys.max(1);
    while !r_minus_one.is_multiple_of(&BigUint::from(t)) {
        t += 1;
    }
    t
}

/// A primitive `t`-th root of unity, `t` dividing `r − 1`.
pub fn root_of_unity(t: usize) -> Fr {
    let exponent = field_order_minus_one() / BigUint::from(t);
    Fr::GENERATOR.pow(exponent.to_u64_digits())
}

/// The `t` points `x·μ^j` and the values of the folded polynomial there,
/// given the values `f_i(x^t)`.
fn expand_opening_set(x: &Fr, values: &[Fr]) -> (Vec<Fr>, Vec<Fr>) {
    let t = fold_order(values.len());
    let mu = root_of_unity(t);
    let mut points = Vec::with_capacity(t);
    let mut folded = Vec::with_capacity(t);
    let mut y = *x;
    for _ in 0..t {
        points.push(y);
        // G(y) = Σ y^i f_i(y^t), and y^t = x^t
        let mut acc = Fr::from(0u64);
        for v in values.iter().rev() {
            acc = acc * y + v;
        }
        folded.push(acc);
        y *= mu;
    }
    (points, folded)
}

/// Verify that `digests[j]` is the fold of a pack whose members take
/// `proof.claimed_values[j]` at `points[j]^t`.
pub fn batch_verify<K: Digest>(
    vk: &KZGVerifierParams,
    proof: &FoldedOpeningProof,
    digests: &[G1Affine],
    points: &[Fr],
) -> Result<()> {
    if digests.len() != proof.claimed_values.len() || digests.len() != points.len() {
        return Err(PolyComSchemeError::InvalidOpeningInput);
    }
    if proof.claimed_values.iter().any(|v| v.is_empty()) {
        return Err(PolyComSchemeError::InvalidOpeningInput);
    }

    let (expanded_points, expanded_values): (Vec<_>, Vec<_>) = points
        .iter()
        .zip(&proof.claimed_values)
        .map(|(x, values)| expand_opening_set(x, values))
        .unzip();

    shplonk::batch_verify::<K>(
        vk,
        &proof.shplonk,
        digests,
        &expanded_points,
        &expanded_values,
    )
}

/// Interleave `polys` with stride `t`, the `i`-th polynomial landing on the
/// coefficients `≡ offset + i (mod t)`.
#[cfg(any(test, feature = "prover"))]
pub fn entangle(
    polys: &[DensePolynomial<Fr>],
    t: usize,
    offset: usize,
) -> Result<DensePolynomial<Fr>> {
    if offset + polys.len() > t {
        return Err(PolyComSchemeError::InvalidOpeningInput);
    }
    let max_len = polys.iter().map(|p| p.coeffs.len()).max().unwrap_or(0);
    let mut coeffs = vec![Fr::zero(); max_len * t];
    for (i, poly) in polys.iter().enumerate() {
        for (k, c) in poly.coeffs.iter().enumerate() {
            coeffs[k * t + offset + i] = *c;
        }
    }
    Ok(DensePolynomial::from_coefficients_vec(coeffs))
}

/// Fold a whole pack.
#[cfg(any(test, feature = "prover"))]
pub fn fold(polys: &[DensePolynomial<Fr>]) -> Result<DensePolynomial<Fr>> {
    entangle(polys, fold_order(polys.len()), 0)
}

/// Open every pack at its point. `digests[j]` must be the commitment to the fold of `packs[j]`.
#[cfg(any(test, feature = "prover"))]
pub fn batch_open<K: Digest>(
    pcs: &KZGCommitmentScheme,
    packs: &[Vec<DensePolynomial<Fr>>],
    digests: &[G1Affine],
    points: &[Fr],
) -> Result<FoldedOpeningProof> {
    if packs.len() != digests.len() || packs.len() != points.len() {
        return Err(PolyComSchemeError::InvalidOpeningInput);
    }

    let mut claimed_values = Vec::with_capacity(packs.len());
    let mut folded = Vec::with_capacity(packs.len());
    let mut expanded_points = Vec::with_capacity(packs.len());
    for (pack, x) in packs.iter().zip(points) {
        if pack.is_empty() {
            return Err(PolyComSchemeError::InvalidOpeningInput);
        }
        let t = fold_order(pack.len());
        let x_t = x.pow([t as u64]);
        let values: Vec<Fr> = pack.iter().map(|f| f.evaluate(&x_t)).collect();
        expanded_points.push(expand_opening_set(x, &values).0);
        claimed_values.push(values);
        folded.push(fold(pack)?);
    }

    let shplonk = shplonk::batch_open::<K>(pcs, &folded, digests, &expanded_points)?;
    Ok(FoldedOpeningProof {
        shplonk,
        claimed_values,
    })
}
