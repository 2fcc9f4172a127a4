//! Multi-point batch opening of KZG commitments (SHPLONK, BDFG20).
//!
//! Every polynomial `f_i` is opened on its own set of points `S_i`. With
//! `T = ∪ S_i`, `r_i` the interpolant of the claimed values over `S_i` and
//! `Z_S` the vanishing polynomial of `S`, the prover sends
//! `W = [(Σ γ^i Z_{T∖S_i}(f_i − r_i)) / Z_T]` and, at the challenge `z`,
//! `W' = [L / (X − z)]` where
//! `L = Σ γ^i Z_{T∖S_i}(z)(f_i − r_i(z)) − Z_T(z)(W's polynomial)`.
use crate::{
    poly_commit::{errors::PolyComSchemeError, kzg_poly_com::KZGVerifierParams},
    transcript::Transcript,
    utils::{scalar_from_hash, to_bytes},
};
use ark_bn254::{Fr, G1Affine, G1Projective};
use ark_ec::CurveGroup;
use ark_ff::{batch_inversion, One, Zero};
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use ark_std::vec::Vec;
use digest::Digest;

#[cfg(any(test, feature = "prover"))]
use {
    crate::poly_commit::kzg_poly_com::KZGCommitmentScheme,
    ark_ff::Field,
    ark_poly::{
        univariate::{DenseOrSparsePolynomial, DensePolynomial},
        DenseUVPolynomial, Polynomial,
    },
};

type Result<T, E = PolyComSchemeError> = core::result::Result<T, E>;

const GAMMA: &str = "gamma";
const Z: &str = "z";

/// A SHPLONK opening proof.
#[derive(Debug, Clone, Default, PartialEq, Eq, CanonicalSerialize, CanonicalDeserialize)]
pub struct ShplonkProof {
    /// Commitment to the batched quotient by `Z_T`.
    pub w: G1Affine,
    /// Commitment to the linearized quotient by `X − z`.
    pub w_prime: G1Affine,
}

fn check_opening_input(digests: usize, points: &[Vec<Fr>], values: &[Vec<Fr>]) -> Result<()> {
    if digests != points.len() || digests != values.len() || digests == 0 {
        return Err(PolyComSchemeError::InvalidOpeningInput);
    }
    for (s, v) in points.iter().zip(values) {
        if s.is_empty() || s.len() != v.len() {
            return Err(PolyComSchemeError::InvalidOpeningInput);
        }
    }
    Ok(())
}

/// Derive the batching challenge `γ` from the points and digests.
fn derive_gamma<K: Digest>(
    transcript: &mut Transcript<K>,
    digests: &[G1Affine],
    points: &[Vec<Fr>],
) -> Result<Fr> {
    for point in points.iter().flatten() {
        transcript.bind(GAMMA, &to_bytes(point)?)?;
    }
    for digest in digests {
        transcript.bind(GAMMA, &to_bytes(digest)?)?;
    }
    Ok(scalar_from_hash(&transcript.compute_challenge(GAMMA)?))
}

fn derive_z<K: Digest>(transcript: &mut Transcript<K>, w: &G1Affine) -> Result<Fr> {
    transcript.bind(Z, &to_bytes(w)?)?;
    Ok(scalar_from_hash(&transcript.compute_challenge(Z)?))
}

/// Evaluate at `x` the polynomial of degree `< points.len()` that takes `values` on `points`.
pub(crate) fn interpolate_at(points: &[Fr], values: &[Fr], x: &Fr) -> Result<Fr> {
    if let Some(k) = points.iter().position(|p| p == x) {
        return Ok(values[k]);
    }

    // L_k(x) = Z_S(x) / ((x - s_k) Π_{m≠k} (s_k - s_m))
    let mut weights: Vec<Fr> = points
        .iter()
        .enumerate()
        .map(|(k, s_k)| {
            points
                .iter()
                .enumerate()
                .filter(|(m, _)| *m != k)
                .map(|(_, s_m)| *s_k - s_m)
                .product::<Fr>()
                * (*x - s_k)
        })
        .collect();
    if weights.iter().any(|w| w.is_zero()) {
        return Err(PolyComSchemeError::DivisionByZero);
    }
    batch_inversion(&mut weights);

    let z_s: Fr = points.iter().map(|s| *x - s).product();
    let sum: Fr = weights.iter().zip(values).map(|(w, v)| *w * v).sum();
    Ok(z_s * sum)
}

/// `Z_{T∖S_i}(z)` for every `i`, and `Z_T(z)`.
fn eval_vanishing_complements(points: &[Vec<Fr>], z: &Fr) -> (Vec<Fr>, Fr) {
    let z_s: Vec<Fr> = points
        .iter()
        .map(|s| s.iter().map(|p| *z - p).product())
        .collect();
    let z_t: Fr = z_s.iter().product();
    let complements = (0..z_s.len())
        .map(|i| {
            z_s.iter()
                .enumerate()
                .filter(|(j, _)| *j != i)
                .map(|(_, v)| *v)
                .product()
        })
        .collect();
    (complements, z_t)
}

/// Verify that each digest opens to `values[i]` on `points[i]`.
///
/// `K` is the hash function of the opening transcript.
pub fn batch_verify<K: Digest>(
    vk: &KZGVerifierParams,
    proof: &ShplonkProof,
    digests: &[G1Affine],
    points: &[Vec<Fr>],
    values: &[Vec<Fr>],
) -> Result<()> {
    check_opening_input(digests.len(), points, values)?;

    let mut transcript = Transcript::<K>::new(&[GAMMA, Z]);
    let gamma = derive_gamma(&mut transcript, digests, points)?;
    let z = derive_z(&mut transcript, &proof.w)?;

    let (complements, z_t) = eval_vanishing_complements(points, &z);

    // F = Σ γ^i Z_{T∖S_i}(z)([f_i] − r_i(z)[1]) − Z_T(z)W
    let mut f = G1Projective::zero();
    let mut constant = Fr::zero();
    let mut gamma_i = Fr::one();
    for (((digest, s), v), complement) in digests.iter().zip(points).zip(values).zip(&complements)
    {
        let scalar = gamma_i * complement;
        f += *digest * scalar;
        constant += scalar * interpolate_at(s, v, &z)?;
        gamma_i *= gamma;
    }
    f -= vk.g1 * constant;
    f -= proof.w * z_t;

    // e(F + z·W', [1]₂) == e(W', [τ]₂)
    let lhs = (f + proof.w_prime * z).into_affine();
    if vk.check_pairing(&lhs, &proof.w_prime) {
        Ok(())
    } else {
        Err(PolyComSchemeError::PCSVerifyEvalError)
    }
}

/// The monic polynomial vanishing exactly on `points`.
#[cfg(any(test, feature = "prover"))]
pub(crate) fn vanishing_poly(points: &[Fr]) -> DensePolynomial<Fr> {
    DensePolynomial::from_coefficients_vec(shift_product(points))
}

/// Coefficients of Π (X − p), lowest degree first.
#[cfg(any(test, feature = "prover"))]
fn shift_product(points: &[Fr]) -> Vec<Fr> {
    let mut coeffs = ark_std::vec![Fr::one()];
    for p in points {
        let mut next = ark_std::vec![Fr::zero(); coeffs.len() + 1];
        for (k, c) in coeffs.iter().enumerate() {
            next[k + 1] += c;
            next[k] -= *p * c;
        }
        coeffs = next;
    }
    coeffs
}

/// `acc += s·poly` on raw coefficients, left untrimmed.
#[cfg(any(test, feature = "prover"))]
fn add_scaled(acc: &mut Vec<Fr>, poly: &DensePolynomial<Fr>, s: &Fr) {
    if acc.len() < poly.coeffs.len() {
        acc.resize(poly.coeffs.len(), Fr::zero());
    }
    for (a, c) in acc.iter_mut().zip(&poly.coeffs) {
        *a += *c * s;
    }
}

/// The interpolant of `values` over `points`.
#[cfg(any(test, feature = "prover"))]
pub(crate) fn interpolate(points: &[Fr], values: &[Fr]) -> Result<DensePolynomial<Fr>> {
    let mut result = Vec::with_capacity(points.len());
    for (k, (s_k, v_k)) in points.iter().zip(values).enumerate() {
        let others: Vec<Fr> = points
            .iter()
            .enumerate()
            .filter(|(m, _)| *m != k)
            .map(|(_, s)| *s)
            .collect();
        let denominator: Fr = others.iter().map(|s| *s_k - s).product();
        let inv = denominator
            .inverse()
            .ok_or(PolyComSchemeError::DivisionByZero)?;
        let basis = DensePolynomial::from_coefficients_vec(shift_product(&others));
        add_scaled(&mut result, &basis, &(*v_k * inv));
    }
    // the top coefficients cancel when the values come from a lower degree polynomial
    Ok(DensePolynomial::from_coefficients_vec(result))
}

/// Divide exactly, failing if the remainder is not zero.
#[cfg(any(test, feature = "prover"))]
fn divide_exact(
    dividend: &DensePolynomial<Fr>,
    divisor: &DensePolynomial<Fr>,
) -> Result<DensePolynomial<Fr>> {
    let (q, r) = DenseOrSparsePolynomial::from(dividend)
        .divide_with_q_and_r(&DenseOrSparsePolynomial::from(divisor))
        .ok_or(PolyComSchemeError::DivisionByZero)?;
    if !r.is_zero() {
        return Err(PolyComSchemeError::PCSProveEvalError);
    }
    Ok(q)
}

/// Open each polynomial on its set of points, proving the evaluations it takes there.
#[cfg(any(test, feature = "prover"))]
pub fn batch_open<K: Digest>(
    pcs: &KZGCommitmentScheme,
    polys: &[DensePolynomial<Fr>],
    digests: &[G1Affine],
    points: &[Vec<Fr>],
) -> Result<ShplonkProof> {
    let values: Vec<Vec<Fr>> = polys
        .iter()
        .zip(points)
        .map(|(f, s)| s.iter().map(|p| f.evaluate(p)).collect())
        .collect();
    if polys.len() != digests.len() {
        return Err(PolyComSchemeError::InvalidOpeningInput);
    }
    check_opening_input(digests.len(), points, &values)?;

    let mut transcript = Transcript::<K>::new(&[GAMMA, Z]);
    let gamma = derive_gamma(&mut transcript, digests, points)?;

    let all_points: Vec<Fr> = points.iter().flatten().copied().collect();
    let z_t = vanishing_poly(&all_points);
    let complement = |i: usize| -> DensePolynomial<Fr> {
        let others: Vec<Fr> = points
            .iter()
            .enumerate()
            .filter(|(j, _)| *j != i)
            .flat_map(|(_, s)| s.iter().copied())
            .collect();
        vanishing_poly(&others)
    };

    let interpolants = points
        .iter()
        .zip(&values)
        .map(|(s, v)| interpolate(s, v))
        .collect::<Result<Vec<_>>>()?;

    // W = [Σ γ^i Z_{T∖S_i}(f_i − r_i) / Z_T]
    let mut f = Vec::new();
    let mut gamma_i = Fr::one();
    for (i, (poly, r)) in polys.iter().zip(&interpolants).enumerate() {
        let mut diff = poly.coeffs.clone();
        add_scaled(&mut diff, r, &-Fr::one());
        let term = &complement(i) * &DensePolynomial::from_coefficients_vec(diff);
        add_scaled(&mut f, &term, &gamma_i);
        gamma_i *= gamma;
    }
    let f = DensePolynomial::from_coefficients_vec(f);
    let q = divide_exact(&f, &z_t)?;
    let w = pcs.commit(&q)?;

    let z = derive_z(&mut transcript, &w)?;

    // L = Σ γ^i Z_{T∖S_i}(z)(f_i − r_i(z)) − Z_T(z) q
    let mut l = Vec::new();
    add_scaled(&mut l, &q, &(-z_t.evaluate(&z)));
    let mut gamma_i = Fr::one();
    for (i, (poly, r)) in polys.iter().zip(&interpolants).enumerate() {
        let scalar = gamma_i * complement(i).evaluate(&z);
        add_scaled(&mut l, poly, &scalar);
        // the constant r_i(z) is subtracted from f_i
        if l.is_empty() {
            l.push(Fr::zero());
        }
        l[0] -= scalar * r.evaluate(&z);
        gamma_i *= gamma;
    }
    let l = DensePolynomial::from_coefficients_vec(l);
    let divisor = DensePolynomial::from_coefficients_vec(ark_std::vec![-z, Fr::one()]);
    let w_prime = pcs.commit(&divide_exact(&l, &divisor)?)?;

    Ok(ShplonkProof { w, w_prime })
}

#[cfg(test)]
mod test {
    use super::{batch_open, batch_verify, interpolate, interpolate_at, vanishing_poly};
    use crate::poly_commit::{errors::PolyComSchemeError, kzg_poly_com::KZGCommitmentScheme};
    use ark_bn254::Fr;
    use ark_poly::{univariate::DensePolynomial, DenseUVPolynomial, Polynomial};
    use ark_std::{rand::SeedableRng, UniformRand};
    use rand_chacha::ChaChaRng;
    use sha2::Sha256;

    #[test]
    fn test_interpolation() {
        let mut prng = ChaChaRng::from_seed([0u8; 32]);
        let poly = DensePolynomial::<Fr>::rand(3, &mut prng);
        let points: Vec<Fr> = (0..4).map(|_| Fr::rand(&mut prng)).collect();
        let values: Vec<Fr> = points.iter().map(|p| poly.evaluate(p)).collect();

        assert_eq!(interpolate(&points, &values).unwrap(), poly);
        let x = Fr::rand(&mut prng);
        assert_eq!(interpolate_at(&points, &values, &x).unwrap(), poly.evaluate(&x));
        assert_eq!(interpolate_at(&points, &values, &points[2]).unwrap(), values[2]);

        let repeated = [points[0], points[0]];
        assert_eq!(
            interpolate_at(&repeated, &values[..2], &x),
            Err(PolyComSchemeError::DivisionByZero)
        );

        let z = vanishing_poly(&points);
        assert_eq!(z.degree(), 4);
        assert!(points.iter().all(|p| z.evaluate(p) == Fr::from(0u64)));
    }

    #[test]
    fn test_batch_open_and_verify() {
        let mut prng = ChaChaRng::from_seed([0u8; 32]);
        let pcs = KZGCommitmentScheme::new(32, &mut prng);
        let vk = pcs.shrink_to_verifier_only();

        let polys: Vec<DensePolynomial<Fr>> = (0..3)
            .map(|d| DensePolynomial::rand(10 + d, &mut prng))
            .collect();
        let digests: Vec<_> = polys.iter().map(|p| pcs.commit(p).unwrap()).collect();
        let points: Vec<Vec<Fr>> = (1..=3)
            .map(|n| (0..n).map(|_| Fr::rand(&mut prng)).collect())
            .collect();
        let values: Vec<Vec<Fr>> = polys
            .iter()
            .zip(&points)
            .map(|(f, s)| s.iter().map(|p| f.evaluate(p)).collect())
            .collect();

        let proof = batch_open::<Sha256>(&pcs, &polys, &digests, &points).unwrap();
        assert!(batch_verify::<Sha256>(&vk, &proof, &digests, &points, &values).is_ok());

        let mut wrong_values = values.clone();
        wrong_values[1][0] += Fr::from(1u64);
        assert_eq!(
            batch_verify::<Sha256>(&vk, &proof, &digests, &points, &wrong_values),
            Err(PolyComSchemeError::PCSVerifyEvalError)
        );

        let mut wrong_digests = digests.clone();
        wrong_digests.swap(0, 2);
        assert!(batch_verify::<Sha256>(&vk, &proof, &wrong_digests, &points, &values).is_err());

        assert_eq!(
            batch_verify::<Sha256>(&vk, &proof, &digests[..2], &points, &values),
            Err(PolyComSchemeError::InvalidOpeningInput)
        );
    }

    #[test]
    fn test_low_degree_polynomials() {
        let mut prng = ChaChaRng::from_seed([2u8; 32]);
        let poly = DensePolynomial::<Fr>::rand(2, &mut prng);
        let points: Vec<Fr> = (0..6).map(|_| Fr::rand(&mut prng)).collect();
        let values: Vec<Fr> = points.iter().map(|p| poly.evaluate(p)).collect();
        let interpolant = interpolate(&points, &values).unwrap();
        assert_eq!(interpolant.degree(), 2);
        assert_eq!(interpolant, poly);

        // polynomials opened on more points than their degree
        let pcs = KZGCommitmentScheme::new(32, &mut prng);
        let vk = pcs.shrink_to_verifier_only();
        let polys = vec![
            poly,
            DensePolynomial::from_coefficients_vec(vec![Fr::from(7u64)]),
            DensePolynomial::rand(9, &mut prng),
        ];
        let digests: Vec<_> = polys.iter().map(|p| pcs.commit(p).unwrap()).collect();
        let points: Vec<Vec<Fr>> = vec![
            points,
            (0..3).map(|_| Fr::rand(&mut prng)).collect(),
            (0..2).map(|_| Fr::rand(&mut prng)).collect(),
        ];
        let values: Vec<Vec<Fr>> = polys
            .iter()
            .zip(&points)
            .map(|(f, s)| s.iter().map(|p| f.evaluate(p)).collect())
            .collect();

        let proof = batch_open::<Sha256>(&pcs, &polys, &digests, &points).unwrap();
        assert!(batch_verify::<Sha256>(&vk, &proof, &digests, &points, &values).is_ok());
    }
}
