use crate::{
    errors::{PlonkError, Result},
    poly_commit::{
        fold::{fold_order, FoldedOpeningProof},
        kzg_poly_com::KZGVerifierParams,
    },
};
use ark_bn254::{Fr, G1Affine};
use ark_ff::{Field, One};
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use ark_std::vec::Vec;

#[cfg(any(test, feature = "prover"))]
use {
    crate::{
        plonk::constraint_system::{FflonkCS, N_SELECTORS, N_WIRES_PER_GATE},
        poly_commit::{fold::entangle, kzg_poly_com::KZGCommitmentScheme},
    },
    ark_ff::FftField,
    ark_poly::{
        univariate::DensePolynomial, DenseUVPolynomial, EvaluationDomain, Radix2EvaluationDomain,
    },
    ark_std::{end_timer, start_timer, vec},
};

/// Offset of `ql` in the primary pack.
pub const SETUP_QL: usize = 0;
/// Offset of `qr` in the primary pack.
pub const SETUP_QR: usize = 1;
/// Offset of `qm` in the primary pack.
pub const SETUP_QM: usize = 2;
/// Offset of `qo` in the primary pack.
pub const SETUP_QO: usize = 3;
/// Offset of `qk` in the primary pack.
pub const SETUP_QK: usize = 4;
/// Offset of `s1` in the primary pack, followed by `s2` and `s3`.
pub const SETUP_S1: usize = 5;
/// The number of preprocessed polynomials preceding the custom-gate selectors.
pub const NB_SETUP_POLYS: usize = 8;
/// The number of prover polynomials `l, r, o, z, h1, h2, h3`, which follow the custom-gate
/// selectors and precede the custom-gate witnesses.
pub const NB_PROVER_POLYS: usize = 7;

/// The number of polynomials of the primary pack with `nb_custom_gates` custom gates.
pub fn nb_entangled_polys(nb_custom_gates: usize) -> usize {
    NB_SETUP_POLYS + NB_PROVER_POLYS + 2 * nb_custom_gates
}

/// fflonk verifier parameters.
#[derive(Debug, Clone, PartialEq, Eq, CanonicalSerialize, CanonicalDeserialize)]
pub struct FflonkVerifierParams {
    /// The size `n` of the evaluation domain.
    pub size: u64,
    /// The inverse of `n`.
    pub size_inv: Fr,
    /// The generator `ω` of the evaluation domain.
    pub generator: Fr,
    /// The number of public inputs.
    pub nb_public_variables: usize,
    /// The coset shift `u`: the second and third wires use the cosets `u·H` and `u²·H`.
    pub coset_shift: Fr,
    /// The commitments of s1, s2, s3.
    pub cm_s_vec: Vec<G1Affine>,
    /// The commitment of ql.
    pub cm_ql: G1Affine,
    /// The commitment of qr.
    pub cm_qr: G1Affine,
    /// The commitment of qm.
    pub cm_qm: G1Affine,
    /// The commitment of qo.
    pub cm_qo: G1Affine,
    /// The commitment of qk, without the public inputs.
    pub cm_qk_incomplete: G1Affine,
    /// The commitments of the custom-gate selectors.
    pub cm_qcp_vec: Vec<G1Affine>,
    /// For every custom gate, the gate index (public rows excluded) of its hash.
    pub commitment_constraint_indices: Vec<usize>,
    /// The commitment of the fold of all the preprocessed polynomials.
    pub cm_qpublic: G1Affine,
    /// The KZG verifier key.
    pub kzg: KZGVerifierParams,
}

impl FflonkVerifierParams {
    /// The number of custom gates.
    pub fn nb_custom_gates(&self) -> usize {
        self.commitment_constraint_indices.len()
    }

    /// The number of polynomials of the primary pack.
    pub fn nb_entangled_polys(&self) -> usize {
        nb_entangled_polys(self.nb_custom_gates())
    }

    /// The fold order of the primary pack.
    pub fn fold_order(&self) -> usize {
        fold_order(self.nb_entangled_polys())
    }

    /// Check the key is internally consistent.
    pub fn check_layout(&self) -> Result<()> {
        let n = self.size;
        if !n.is_power_of_two()
            || self.cm_s_vec.len() != 3
            || self.cm_qcp_vec.len() != self.commitment_constraint_indices.len()
            || self.size_inv * Fr::from(n) != Fr::one()
        {
            return Err(PlonkError::VerifyingKeyLayout);
        }

        // ω must have order exactly n
        if self.generator.pow([n]) != Fr::one()
            || (n > 1 && self.generator.pow([n / 2]) == Fr::one())
        {
            return Err(PlonkError::VerifyingKeyLayout);
        }

        // the public inputs and the custom-gate hashes must fit in the domain
        let nb_public = self.nb_public_variables as u64;
        if nb_public > n
            || self
                .commitment_constraint_indices
                .iter()
                .any(|&index| nb_public + index as u64 >= n)
        {
            return Err(PlonkError::VerifyingKeyLayout);
        }
        Ok(())
    }
}

/// The data structure of a fflonk proof.
#[derive(Debug, Clone, PartialEq, Eq, CanonicalSerialize, CanonicalDeserialize)]
pub struct FflonkProof {
    /// The commitment of l, r, o entangled at their offsets of the primary pack.
    pub cm_lro_entangled: G1Affine,
    /// The commitment of z.
    pub cm_z: G1Affine,
    /// The commitment of z entangled at its offset of the primary pack.
    pub cm_z_entangled: G1Affine,
    /// The commitment of h1, h2, h3 entangled at their offsets of the primary pack.
    pub cm_h_entangled: G1Affine,
    /// The commitments of the custom-gate witnesses, entangled.
    pub cm_bsb_entangled_vec: Vec<G1Affine>,
    /// The batched opening of the primary pack at ζ and of z at ξω.
    pub batch_opening_proof: FoldedOpeningProof,
}

/// fflonk prover parameters.
#[cfg(any(test, feature = "prover"))]
#[derive(Debug, Clone)]
pub struct FflonkProverParams {
    /// The evaluation domain.
    pub domain: Radix2EvaluationDomain<Fr>,
    /// The polynomials of the selectors ql, qr, qm, qo, qk.
    pub q_polys: Vec<DensePolynomial<Fr>>,
    /// The polynomials of s1, s2, s3.
    pub s_polys: Vec<DensePolynomial<Fr>>,
    /// The polynomials of the custom-gate selectors.
    pub qcp_polys: Vec<DensePolynomial<Fr>>,
    /// The values of s1, s2, s3 on the domain, concatenated.
    pub perm_values: Vec<Fr>,
    /// The fflonk verifier parameters.
    pub verifier_params: FflonkVerifierParams,
}

#[cfg(any(test, feature = "prover"))]
impl FflonkProverParams {
    /// Return a reference of verifier parameters.
    pub fn get_verifier_params_ref(&self) -> &FflonkVerifierParams {
        &self.verifier_params
    }

    /// The preprocessed polynomials in primary-pack order.
    pub(crate) fn setup_polys(&self) -> Vec<DensePolynomial<Fr>> {
        let mut polys = self.q_polys.clone();
        polys.extend(self.s_polys.iter().cloned());
        polys.extend(self.qcp_polys.iter().cloned());
        polys
    }
}

/// Encode the permutation value, from an index to a group element.
#[cfg(any(test, feature = "prover"))]
pub fn encode_perm_to_group(group: &[Fr], perm: &[usize], k: &[Fr]) -> Vec<Fr> {
    let n = group.len();
    perm.iter().map(|pi| k[pi / n] * group[pi % n]).collect()
}

/// Run the fflonk indexer. The constraint system must be padded.
#[cfg(any(test, feature = "prover"))]
pub fn indexer(cs: &FflonkCS, pcs: &KZGCommitmentScheme) -> Result<FflonkProverParams> {
    let indexer_time = start_timer!(|| "Fflonk::Indexer");

    let n = cs.size();
    let domain = Radix2EvaluationDomain::<Fr>::new(n)
        .filter(|d| d.size() == n)
        .ok_or(PlonkError::GroupNotFound(n))?;
    let group: Vec<Fr> = domain.elements().collect();

    let coset_shift = Fr::GENERATOR;
    let k = vec![Fr::from(1u64), coset_shift, coset_shift.square()];
    let perm = cs.compute_permutation();
    let perm_values = encode_perm_to_group(&group, &perm, &k);

    let q_polys: Vec<DensePolynomial<Fr>> = (0..N_SELECTORS)
        .map(|i| DensePolynomial::from_coefficients_vec(domain.ifft(&cs.selector_column(i))))
        .collect();
    let s_polys: Vec<DensePolynomial<Fr>> = (0..N_WIRES_PER_GATE)
        .map(|i| DensePolynomial::from_coefficients_vec(domain.ifft(&perm_values[i * n..(i + 1) * n])))
        .collect();
    let qcp_polys: Vec<DensePolynomial<Fr>> = (0..cs.commitment_gates.len())
        .map(|j| {
            DensePolynomial::from_coefficients_vec(domain.ifft(&cs.commitment_selector_column(j)))
        })
        .collect();

    let commit = |p: &DensePolynomial<Fr>| pcs.commit(p).map_err(|_| PlonkError::SetupError);
    let cm_q_vec = q_polys.iter().map(commit).collect::<Result<Vec<_>>>()?;
    let cm_s_vec = s_polys.iter().map(commit).collect::<Result<Vec<_>>>()?;
    let cm_qcp_vec = qcp_polys.iter().map(commit).collect::<Result<Vec<_>>>()?;

    let mut verifier_params = FflonkVerifierParams {
        size: n as u64,
        size_inv: domain.size_inv,
        generator: domain.group_gen,
        nb_public_variables: cs.num_public_inputs(),
        coset_shift,
        cm_s_vec,
        cm_ql: cm_q_vec[0],
        cm_qr: cm_q_vec[1],
        cm_qm: cm_q_vec[2],
        cm_qo: cm_q_vec[3],
        cm_qk_incomplete: cm_q_vec[4],
        cm_qcp_vec,
        commitment_constraint_indices: cs.commitment_constraint_indices(),
        cm_qpublic: G1Affine::default(),
        kzg: pcs.shrink_to_verifier_only(),
    };

    let mut prover_params = FflonkProverParams {
        domain,
        q_polys,
        s_polys,
        qcp_polys,
        perm_values,
        verifier_params: verifier_params.clone(),
    };

    let t = verifier_params.fold_order();
    let folded = entangle(&prover_params.setup_polys(), t, 0)?;
    verifier_params.cm_qpublic = commit(&folded)?;
    prover_params.verifier_params = verifier_params;

    end_timer!(indexer_time);
    Ok(prover_params)
}

#[cfg(test)]
mod test {
    use crate::{
        errors::PlonkError,
        plonk::{
            constraint_system::FflonkCS,
            indexer::{indexer, nb_entangled_polys, SETUP_S1},
        },
        poly_commit::{fold::entangle, kzg_poly_com::KZGCommitmentScheme},
    };
    use ark_bn254::Fr;
    use ark_ff::{Field, One};
    use ark_poly::Polynomial;
    use ark_std::rand::SeedableRng;
    use rand_chacha::ChaChaRng;

    #[test]
    fn test_indexer() {
        let mut cs = FflonkCS::new();
        let a = cs.new_variable(Fr::from(3u64));
        cs.prepare_pi_variable(a);
        let b = cs.mul(a, a);
        let _ = cs.commit_variables(&[b]);
        cs.pad();

        let mut prng = ChaChaRng::from_seed([0u8; 32]);
        let pcs = KZGCommitmentScheme::new(256, &mut prng);
        let params = indexer(&cs, &pcs).unwrap();
        let vk = params.get_verifier_params_ref();
        assert!(vk.check_layout().is_ok());
        assert_eq!(vk.size, 4);
        assert_eq!(vk.nb_public_variables, 1);
        assert_eq!(vk.commitment_constraint_indices, vec![2]);
        assert_eq!(vk.nb_entangled_polys(), nb_entangled_polys(1));
        assert_eq!(vk.fold_order(), 18);

        // ql is −1 on the public row
        assert_eq!(params.q_polys[0].evaluate(&Fr::one()), -Fr::one());
        // s1 maps the public row to the next occurrence of `a`
        let omega = vk.generator;
        assert_eq!(params.s_polys[0].evaluate(&Fr::one()), omega);
        assert_eq!(
            params.setup_polys()[SETUP_S1].evaluate(&omega),
            vk.coset_shift * omega
        );
        assert_eq!(omega.pow([4u64]), Fr::one());

        let folded = entangle(&params.setup_polys(), 18, 0).unwrap();
        assert_eq!(pcs.commit(&folded).unwrap(), vk.cm_qpublic);
    }

    #[test]
    fn test_check_layout() {
        let mut cs = FflonkCS::new();
        let a = cs.new_variable(Fr::from(3u64));
        cs.prepare_pi_variable(a);
        let b = cs.mul(a, a);
        let _ = cs.commit_variables(&[b]);
        cs.pad();

        let mut prng = ChaChaRng::from_seed([0u8; 32]);
        let pcs = KZGCommitmentScheme::new(256, &mut prng);
        let params = indexer(&cs, &pcs).unwrap();
        let vk = params.get_verifier_params_ref();
        assert!(vk.check_layout().is_ok());

        // a size which is not a power of two
        let mut bad = vk.clone();
        bad.size = 6;
        bad.size_inv = Fr::from(6u64).inverse().unwrap();
        assert_eq!(bad.check_layout(), Err(PlonkError::VerifyingKeyLayout));

        // ω² has order 2 only
        let mut bad = vk.clone();
        bad.generator = vk.generator.square();
        assert_eq!(bad.check_layout(), Err(PlonkError::VerifyingKeyLayout));

        let mut bad = vk.clone();
        bad.generator = Fr::from(2u64);
        assert_eq!(bad.check_layout(), Err(PlonkError::VerifyingKeyLayout));

        // the hash row 1 + 3 is out of the domain
        let mut bad = vk.clone();
        bad.commitment_constraint_indices[0] = 3;
        assert_eq!(bad.check_layout(), Err(PlonkError::VerifyingKeyLayout));

        let mut bad = vk.clone();
        bad.nb_public_variables = 5;
        assert_eq!(bad.check_layout(), Err(PlonkError::VerifyingKeyLayout));

        let mut bad = vk.clone();
        bad.size = 0;
        assert_eq!(bad.check_layout(), Err(PlonkError::VerifyingKeyLayout));
    }
}
