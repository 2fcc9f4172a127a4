use crate::{
    errors::{PlonkError, Result},
    plonk::{
        config::{hash_commitment, FieldHasher},
        indexer::{
            nb_entangled_polys, FflonkProof, FflonkVerifierParams, NB_SETUP_POLYS, SETUP_QK,
            SETUP_QL, SETUP_QM, SETUP_QO, SETUP_QR, SETUP_S1,
        },
    },
    utils::to_bytes,
};
use ark_bn254::{Fr, G1Affine, G1Projective};
use ark_ec::CurveGroup;
use ark_ff::{batch_inversion, Field, One, Zero};
use ark_std::vec::Vec;

#[cfg(any(test, feature = "prover"))]
use {
    crate::plonk::indexer::FflonkProverParams,
    ark_ff::FftField,
    ark_poly::{
        univariate::DensePolynomial, DenseUVPolynomial, EvaluationDomain, Radix2EvaluationDomain,
    },
    ark_std::{
        rand::{CryptoRng, RngCore},
        vec, UniformRand,
    },
};

/// The challenges of the fflonk protocol, in derivation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FflonkChallenges {
    pub(crate) gamma: Fr,
    pub(crate) beta: Fr,
    pub(crate) alpha: Fr,
    pub(crate) zeta: Fr,
}

/// The claimed values of the primary pack at ξ.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProofEvaluations {
    /// ql(ξ).
    pub ql: Fr,
    /// qr(ξ).
    pub qr: Fr,
    /// qm(ξ).
    pub qm: Fr,
    /// qo(ξ).
    pub qo: Fr,
    /// qk(ξ), without the public inputs.
    pub qk: Fr,
    /// s1(ξ), s2(ξ), s3(ξ).
    pub s: [Fr; 3],
    /// The custom-gate selectors at ξ.
    pub qcp: Vec<Fr>,
    /// l(ξ).
    pub l: Fr,
    /// r(ξ).
    pub r: Fr,
    /// o(ξ).
    pub o: Fr,
    /// z(ξ).
    pub z: Fr,
    /// h1(ξ), h2(ξ), h3(ξ).
    pub h: [Fr; 3],
    /// The custom-gate witnesses at ξ.
    pub bsb: Vec<Fr>,
    /// z(ξω).
    pub z_omega: Fr,
}

impl ProofEvaluations {
    /// Name the claimed values: the primary pack first, then `[z(ξω)]`.
    pub fn decode(claimed_values: &[Vec<Fr>], nb_custom_gates: usize) -> Result<Self> {
        let (primary, shifted) = match claimed_values {
            [primary, shifted] => (primary, shifted),
            _ => return Err(PlonkError::ClaimedValuesLayout),
        };
        if primary.len() != nb_entangled_polys(nb_custom_gates) || shifted.len() != 1 {
            return Err(PlonkError::ClaimedValuesLayout);
        }

        let c = nb_custom_gates;
        let prover = NB_SETUP_POLYS + c;
        Ok(Self {
            ql: primary[SETUP_QL],
            qr: primary[SETUP_QR],
            qm: primary[SETUP_QM],
            qo: primary[SETUP_QO],
            qk: primary[SETUP_QK],
            s: [
                primary[SETUP_S1],
                primary[SETUP_S1 + 1],
                primary[SETUP_S1 + 2],
            ],
            qcp: primary[NB_SETUP_POLYS..prover].to_vec(),
            l: primary[prover],
            r: primary[prover + 1],
            o: primary[prover + 2],
            z: primary[prover + 3],
            h: [primary[prover + 4], primary[prover + 5], primary[prover + 6]],
            bsb: primary[prover + 7..].to_vec(),
            z_omega: shifted[0],
        })
    }
}

/// The vanishing polynomial, the first Lagrange polynomial and the public-input
/// polynomial, evaluated at ξ.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct LagrangeTerms {
    pub(crate) zh: Fr,
    pub(crate) lagrange_one: Fr,
    pub(crate) pi: Fr,
}

/// Compute `ξ^n − 1`, `L_1(ξ)` and
/// `pi(ξ) = Σ_i w_i L_i(ξ) + Σ_j H(bsb_j) L_{nb_public + k_j}(ξ)` with
/// `L_i(X) = ω^i/n · (X^n − 1)/(X − ω^i)`. All the denominators are inverted at once.
pub(crate) fn eval_pi_poly<H: FieldHasher>(
    verifier_params: &FflonkVerifierParams,
    public_inputs: &[Fr],
    cm_bsb_entangled_vec: &[G1Affine],
    xi: &Fr,
    hasher: &mut H,
) -> Result<LagrangeTerms> {
    let nb_public = verifier_params.nb_public_variables;
    let omega = verifier_params.generator;
    let zh = xi.pow([verifier_params.size]) - Fr::one();

    // ω^i for every public row, then for every commitment row
    let mut roots = Vec::with_capacity(nb_public + cm_bsb_entangled_vec.len());
    let mut acc = Fr::one();
    for _ in 0..nb_public {
        roots.push(acc);
        acc *= omega;
    }
    for index in &verifier_params.commitment_constraint_indices {
        roots.push(omega.pow([(nb_public + index) as u64]));
    }

    let mut denominators: Vec<Fr> = Vec::with_capacity(roots.len() + 1);
    denominators.push(*xi - Fr::one());
    denominators.extend(roots.iter().map(|root| *xi - root));
    if denominators.iter().any(|d| d.is_zero()) {
        return Err(PlonkError::DivisionByZero);
    }
    batch_inversion(&mut denominators);

    let scale = zh * verifier_params.size_inv;
    let lagrange_one = scale * denominators[0];

    let mut pi = Fr::zero();
    for ((root, den_inv), value) in roots.iter().zip(&denominators[1..]).zip(public_inputs) {
        pi += *root * den_inv * value;
    }
    for ((root, den_inv), cm) in roots[nb_public..]
        .iter()
        .zip(&denominators[1 + nb_public..])
        .zip(cm_bsb_entangled_vec)
    {
        let hashed = hash_commitment(hasher, &to_bytes(cm)?)?;
        pi += *root * den_inv * hashed;
    }

    Ok(LagrangeTerms {
        zh,
        lagrange_one,
        pi: pi * scale,
    })
}

/// Check that the gate, permutation and boundary identity, folded with α,
/// equals `Z_H(ξ)·h(ξ)`.
pub(crate) fn check_algebraic_relation(
    verifier_params: &FflonkVerifierParams,
    evals: &ProofEvaluations,
    challenges: &FflonkChallenges,
    xi: &Fr,
    terms: &LagrangeTerms,
) -> Result<()> {
    let FflonkChallenges {
        gamma, beta, alpha, ..
    } = challenges;

    // ql·l + qr·r + qm·l·r + qo·o + qk + pi + Σ qcp·bsb
    let mut gates = evals.ql * evals.l
        + evals.qr * evals.r
        + evals.qm * evals.l * evals.r
        + evals.qo * evals.o
        + evals.qk
        + terms.pi;
    for (qcp, bsb) in evals.qcp.iter().zip(&evals.bsb) {
        gates += *qcp * bsb;
    }

    let u = verifier_params.coset_shift;
    let wires = [evals.l, evals.r, evals.o];
    let ids = [*xi, u * xi, u * u * xi];
    let mut sigma_prod = evals.z_omega;
    let mut id_prod = evals.z;
    for i in 0..3 {
        sigma_prod *= wires[i] + *beta * evals.s[i] + gamma;
        id_prod *= wires[i] + *beta * ids[i] + gamma;
    }
    let perm = sigma_prod - id_prod;

    let boundary = (evals.z - Fr::one()) * terms.lagrange_one;

    let lhs = (boundary * alpha + perm) * alpha + gates;

    let xi_n_plus_two = xi.pow([verifier_params.size + 2]);
    let quotient = evals.h[0] + xi_n_plus_two * (evals.h[1] + xi_n_plus_two * evals.h[2]);
    let rhs = terms.zh * quotient;

    if lhs == rhs {
        Ok(())
    } else {
        Err(PlonkError::AlgebraicRelation)
    }
}

/// The digest of the primary pack: the group sum of its entangled commitments.
pub(crate) fn fold_digests(verifier_params: &FflonkVerifierParams, proof: &FflonkProof) -> G1Affine {
    let mut digest = G1Projective::from(verifier_params.cm_qpublic);
    digest += proof.cm_lro_entangled;
    digest += proof.cm_z_entangled;
    digest += proof.cm_h_entangled;
    for cm in &proof.cm_bsb_entangled_vec {
        digest += cm;
    }
    digest.into_affine()
}

/// Add a random degree `num_hide_points` polynomial times `X^n − 1` to
/// `polynomial`, keeping its values on the domain of size `n`.
#[cfg(any(test, feature = "prover"))]
pub(crate) fn hide_polynomial<R: CryptoRng + RngCore>(
    prng: &mut R,
    polynomial: &DensePolynomial<Fr>,
    num_hide_points: usize,
    n: usize,
) -> DensePolynomial<Fr> {
    let mut coeffs = polynomial.coeffs.clone();
    coeffs.resize(n + num_hide_points + 1, Fr::zero());
    for i in 0..num_hide_points + 1 {
        let blind = Fr::rand(prng);
        coeffs[i] -= blind;
        coeffs[n + i] += blind;
    }
    DensePolynomial::from_coefficients_vec(coeffs)
}

/// Evaluate `poly` on `shift·D`.
#[cfg(any(test, feature = "prover"))]
pub(crate) fn coset_fft(
    domain: &Radix2EvaluationDomain<Fr>,
    poly: &DensePolynomial<Fr>,
    shift: &Fr,
) -> Vec<Fr> {
    let mut coeffs = poly.coeffs.clone();
    let mut power = Fr::one();
    for c in coeffs.iter_mut() {
        *c *= power;
        power *= shift;
    }
    domain.fft(&coeffs)
}

/// Interpolate the values taken on `shift·D`.
#[cfg(any(test, feature = "prover"))]
pub(crate) fn coset_ifft(
    domain: &Radix2EvaluationDomain<Fr>,
    evals: &[Fr],
    shift: &Fr,
) -> Result<DensePolynomial<Fr>> {
    let shift_inv = shift.inverse().ok_or(PlonkError::DivisionByZero)?;
    let mut coeffs = domain.ifft(evals);
    let mut power = Fr::one();
    for c in coeffs.iter_mut() {
        *c *= power;
        power *= shift_inv;
    }
    Ok(DensePolynomial::from_coefficients_vec(coeffs))
}

/// Build the z polynomial from
/// `z(ω^{k+1}) = z(ω^k) Π_c (w_c(ω^k) + β·u^c·ω^k + γ) / (w_c(ω^k) + β·s_c(ω^k) + γ)`
/// and `z(1) = 1`. `wires` holds the values of l, r, o on the domain.
#[cfg(any(test, feature = "prover"))]
pub(crate) fn z_poly(
    prover_params: &FflonkProverParams,
    wires: &[Vec<Fr>],
    beta: &Fr,
    gamma: &Fr,
) -> Result<DensePolynomial<Fr>> {
    let domain = &prover_params.domain;
    let n = domain.size();
    let u = prover_params.verifier_params.coset_shift;
    let k = [Fr::one(), u, u * u];

    let mut numerators = vec![Fr::one(); n];
    let mut denominators = vec![Fr::one(); n];
    for (row, x) in domain.elements().enumerate() {
        for c in 0..3 {
            let w = wires[c][row];
            numerators[row] *= w + *beta * k[c] * x + gamma;
            denominators[row] *= w + *beta * prover_params.perm_values[c * n + row] + gamma;
        }
    }
    if denominators.iter().any(|d| d.is_zero()) {
        return Err(PlonkError::DivisionByZero);
    }
    batch_inversion(&mut denominators);

    let mut z_evals = Vec::with_capacity(n);
    let mut prev = Fr::one();
    z_evals.push(prev);
    for row in 0..n - 1 {
        prev *= numerators[row] * denominators[row];
        z_evals.push(prev);
    }
    Ok(DensePolynomial::from_coefficients_vec(domain.ifft(&z_evals)))
}

/// The polynomials a proof is made of, besides the preprocessed ones.
#[cfg(any(test, feature = "prover"))]
pub(crate) struct WitnessPolys<'a> {
    pub(crate) wires: &'a [DensePolynomial<Fr>],
    pub(crate) z: &'a DensePolynomial<Fr>,
    pub(crate) bsb: &'a [DensePolynomial<Fr>],
    pub(crate) pi: &'a DensePolynomial<Fr>,
}

/// Compute the quotient `h = (gates + α·perm + α²·(z − 1)L_1) / (X^n − 1)` on a
/// coset of a domain eight times larger.
#[cfg(any(test, feature = "prover"))]
pub(crate) fn t_poly(
    prover_params: &FflonkProverParams,
    polys: &WitnessPolys,
    challenges: &FflonkChallenges,
) -> Result<DensePolynomial<Fr>> {
    let n = prover_params.domain.size();
    let m = 8 * n;
    let domain_m = Radix2EvaluationDomain::<Fr>::new(m)
        .filter(|d| d.size() == m)
        .ok_or(PlonkError::GroupNotFound(m))?;
    let shift = Fr::GENERATOR;
    let u = prover_params.verifier_params.coset_shift;
    let FflonkChallenges {
        gamma, beta, alpha, ..
    } = challenges;

    let evals = |p: &DensePolynomial<Fr>| coset_fft(&domain_m, p, &shift);
    let q: Vec<Vec<Fr>> = prover_params.q_polys.iter().map(evals).collect();
    let s: Vec<Vec<Fr>> = prover_params.s_polys.iter().map(evals).collect();
    let qcp: Vec<Vec<Fr>> = prover_params.qcp_polys.iter().map(evals).collect();
    let w: Vec<Vec<Fr>> = polys.wires.iter().map(evals).collect();
    let bsb: Vec<Vec<Fr>> = polys.bsb.iter().map(evals).collect();
    let z = evals(polys.z);
    let pi = evals(polys.pi);

    // X^n − 1 and X − 1 on the coset
    let points: Vec<Fr> = domain_m.elements().map(|e| e * shift).collect();
    let mut zh_inv: Vec<Fr> = points.iter().map(|x| x.pow([n as u64]) - Fr::one()).collect();
    let mut x_minus_one: Vec<Fr> = points.iter().map(|x| *x - Fr::one()).collect();
    if zh_inv.iter().chain(&x_minus_one).any(|v| v.is_zero()) {
        return Err(PlonkError::DivisionByZero);
    }
    let zh = zh_inv.clone();
    batch_inversion(&mut zh_inv);
    batch_inversion(&mut x_minus_one);

    let n_inv = prover_params.verifier_params.size_inv;
    let step = m / n;
    let mut t_evals = Vec::with_capacity(m);
    for j in 0..m {
        let x = points[j];
        let (l, r, o) = (w[0][j], w[1][j], w[2][j]);

        let mut gates =
            q[0][j] * l + q[1][j] * r + q[2][j] * l * r + q[3][j] * o + q[4][j] + pi[j];
        for (qcp_i, bsb_i) in qcp.iter().zip(&bsb) {
            gates += qcp_i[j] * bsb_i[j];
        }

        let z_omega = z[(j + step) % m];
        let perm = (l + *beta * s[0][j] + gamma)
            * (r + *beta * s[1][j] + gamma)
            * (o + *beta * s[2][j] + gamma)
            * z_omega
            - (l + *beta * x + gamma)
                * (r + *beta * u * x + gamma)
                * (o + *beta * u * u * x + gamma)
                * z[j];

        let lagrange_one = zh[j] * n_inv * x_minus_one[j];
        let boundary = (z[j] - Fr::one()) * lagrange_one;

        let numerator = (boundary * alpha + perm) * alpha + gates;
        t_evals.push(numerator * zh_inv[j]);
    }

    let t = coset_ifft(&domain_m, &t_evals, &shift)?;
    if t.coeffs.len() > 3 * (n + 2) {
        return Err(PlonkError::ProofErrorInvalidWitness);
    }
    Ok(t)
}

/// Split `t` into three pieces of `n + 2` coefficients.
#[cfg(any(test, feature = "prover"))]
pub(crate) fn split_t_poly(t: &DensePolynomial<Fr>, n: usize) -> Vec<DensePolynomial<Fr>> {
    let mut coeffs = t.coeffs.clone();
    coeffs.resize(3 * (n + 2), Fr::zero());
    coeffs
        .chunks(n + 2)
        .map(|chunk| DensePolynomial::from_coefficients_slice(chunk))
        .collect()
}

#[cfg(test)]
mod test {
    use super::{coset_fft, coset_ifft, eval_pi_poly, hide_polynomial, ProofEvaluations};
    use crate::{
        errors::PlonkError,
        plonk::{
            config::{hash_commitment, DomainHasher},
            constraint_system::FflonkCS,
            indexer::{indexer, FflonkVerifierParams},
        },
        poly_commit::kzg_poly_com::KZGCommitmentScheme,
        utils::to_bytes,
    };
    use ark_bn254::{Fr, G1Affine};
    use ark_ec::AffineRepr;
    use ark_ff::{FftField, One};
    use ark_poly::{
        univariate::DensePolynomial, DenseUVPolynomial, EvaluationDomain, Polynomial,
        Radix2EvaluationDomain,
    };
    use ark_std::{rand::SeedableRng, UniformRand};
    use rand_chacha::ChaChaRng;

    fn verifier_params(nb_public: usize, with_commitment: bool) -> FflonkVerifierParams {
        let mut cs = FflonkCS::new();
        let vars: Vec<_> = (0..nb_public)
            .map(|i| cs.new_variable(Fr::from(i as u64)))
            .collect();
        for v in &vars {
            cs.prepare_pi_variable(*v);
        }
        let a = cs.new_variable(Fr::from(2u64));
        let b = cs.mul(a, a);
        if with_commitment {
            let _ = cs.commit_variables(&[b]);
        }
        cs.pad();
        let mut prng = ChaChaRng::from_seed([0u8; 32]);
        let pcs = KZGCommitmentScheme::new(512, &mut prng);
        indexer(&cs, &pcs).unwrap().verifier_params
    }

    #[test]
    fn test_lagrange_terms_match_domain() {
        let vk = verifier_params(3, true);
        let domain = Radix2EvaluationDomain::<Fr>::new(vk.size as usize).unwrap();
        let mut prng = ChaChaRng::from_seed([1u8; 32]);
        let xi = Fr::rand(&mut prng);
        let public_inputs = vec![Fr::from(5u64), Fr::from(7u64), Fr::from(11u64)];
        let bsb = vec![(G1Affine::generator() * Fr::from(3u64)).into()];

        let mut hasher = DomainHasher::default();
        let terms = eval_pi_poly(&vk, &public_inputs, &bsb, &xi, &mut hasher).unwrap();

        let lagrange = domain.evaluate_all_lagrange_coefficients(xi);
        assert_eq!(terms.zh, domain.evaluate_vanishing_polynomial(xi));
        assert_eq!(terms.lagrange_one, lagrange[0]);

        let hashed = hash_commitment(&mut hasher, &to_bytes(&bsb[0]).unwrap()).unwrap();
        let mut expected: Fr = public_inputs
            .iter()
            .zip(&lagrange)
            .map(|(w, l)| *w * l)
            .sum();
        expected += hashed * lagrange[3 + vk.commitment_constraint_indices[0]];
        assert_eq!(terms.pi, expected);
    }

    #[test]
    fn test_evaluation_point_on_domain() {
        let vk = verifier_params(2, false);
        let mut hasher = DomainHasher::default();
        for xi in [Fr::one(), vk.generator] {
            assert_eq!(
                eval_pi_poly(&vk, &[Fr::one(), Fr::one()], &[], &xi, &mut hasher),
                Err(PlonkError::DivisionByZero)
            );
        }
    }

    #[test]
    fn test_decode_claimed_values() {
        let primary: Vec<Fr> = (0..17u64).map(Fr::from).collect();
        let evals =
            ProofEvaluations::decode(&[primary.clone(), vec![Fr::from(99u64)]], 1).unwrap();
        assert_eq!(evals.ql, Fr::from(0u64));
        assert_eq!(evals.s[2], Fr::from(7u64));
        assert_eq!(evals.qcp, vec![Fr::from(8u64)]);
        assert_eq!(evals.l, Fr::from(9u64));
        assert_eq!(evals.z, Fr::from(12u64));
        assert_eq!(evals.h[2], Fr::from(15u64));
        assert_eq!(evals.bsb, vec![Fr::from(16u64)]);
        assert_eq!(evals.z_omega, Fr::from(99u64));

        assert_eq!(
            ProofEvaluations::decode(&[primary.clone(), vec![Fr::one()]], 0),
            Err(PlonkError::ClaimedValuesLayout)
        );
        assert_eq!(
            ProofEvaluations::decode(&[primary], 1),
            Err(PlonkError::ClaimedValuesLayout)
        );
    }

    #[test]
    fn test_coset_fft_and_hiding() {
        let mut prng = ChaChaRng::from_seed([0u8; 32]);
        let domain = Radix2EvaluationDomain::<Fr>::new(16).unwrap();
        let poly = DensePolynomial::<Fr>::rand(9, &mut prng);
        let shift = Fr::GENERATOR;
        let evals = coset_fft(&domain, &poly, &shift);
        let x = domain.element(3) * shift;
        assert_eq!(evals[3], poly.evaluate(&x));
        assert_eq!(coset_ifft(&domain, &evals, &shift).unwrap(), poly);

        let small = Radix2EvaluationDomain::<Fr>::new(8).unwrap();
        let values = DensePolynomial::<Fr>::rand(7, &mut prng);
        let hidden = hide_polynomial(&mut prng, &values, 2, 8);
        assert_eq!(hidden.degree(), 10);
        for x in small.elements() {
            assert_eq!(hidden.evaluate(&x), values.evaluate(&x));
        }
        assert_ne!(hidden.evaluate(&shift), values.evaluate(&shift));
    }
}
