use crate::{
    errors::{PlonkError, Result},
    plonk::{
        config::{hash_commitment, FieldHasher, VerifierConfig},
        constraint_system::{FflonkCS, N_WIRES_PER_GATE},
        helpers::{
            fold_digests, hide_polynomial, split_t_poly, t_poly, z_poly, FflonkChallenges,
            WitnessPolys,
        },
        indexer::{FflonkProof, FflonkProverParams, NB_PROVER_POLYS, NB_SETUP_POLYS},
        transcript::{
            bind_public_data, derive_randomness, transcript_init_plonk, ALPHA, BETA, GAMMA, ZETA,
        },
    },
    poly_commit::{
        fold::{self, entangle, FoldedOpeningProof},
        kzg_poly_com::KZGCommitmentScheme,
    },
    utils::to_bytes,
};
use ark_bn254::{Fr, G1Affine};
use ark_ff::{Field, Zero};
use ark_poly::{univariate::DensePolynomial, DenseUVPolynomial, EvaluationDomain};
use ark_std::{
    end_timer,
    rand::{CryptoRng, RngCore},
    start_timer, vec,
    vec::Vec,
};
use digest::Digest;

/// fflonk prover: it produces a proof that `witness` satisfies the constraint system `cs`.
///
/// The values of the commitment hashes in `witness` are ignored: they are computed here
/// from the commitments to the custom-gate witnesses. The verifier must use the same `config`.
pub fn prover<R, C, K, H>(
    prng: &mut R,
    config: &mut VerifierConfig<C, K, H>,
    pcs: &KZGCommitmentScheme,
    cs: &FflonkCS,
    prover_params: &FflonkProverParams,
    witness: &[Fr],
) -> Result<FflonkProof>
where
    R: CryptoRng + RngCore,
    C: Digest,
    K: Digest,
    H: FieldHasher,
{
    let prover_time = start_timer!(|| "Fflonk::Prover");

    let verifier_params = prover_params.get_verifier_params_ref();
    let domain = &prover_params.domain;
    let n = domain.size();
    if cs.size() != n || cs.commitment_gates.len() != verifier_params.nb_custom_gates() {
        return Err(PlonkError::FuncParamsError);
    }
    if witness.len() != cs.num_vars {
        return Err(PlonkError::InvalidWitnessLength);
    }

    let nb_public = cs.num_public_inputs();
    let nb_custom_gates = cs.commitment_gates.len();
    let t = verifier_params.fold_order();
    let lro_offset = NB_SETUP_POLYS + nb_custom_gates;
    let bsb_offset = lro_offset + NB_PROVER_POLYS;

    let commit = |p: &DensePolynomial<Fr>| pcs.commit(p).map_err(|_| PlonkError::CommitmentError);
    let mut w = witness.to_vec();

    // 1. commit to the custom-gate witnesses and fill in the commitment hashes.
    let bsb_time = start_timer!(|| "Commit to the custom-gate witnesses");
    let mut bsb_polys = Vec::with_capacity(nb_custom_gates);
    let mut cm_bsb_entangled_vec = Vec::with_capacity(nb_custom_gates);
    let mut hashes = Vec::with_capacity(nb_custom_gates);
    for (j, gate) in cs.commitment_gates.iter().enumerate() {
        let mut values = vec![Fr::zero(); n];
        for &row in &gate.committed_gates {
            values[nb_public + row] = w[cs.wiring[0][row]];
        }
        let poly = DensePolynomial::from_coefficients_vec(domain.ifft(&values));
        let poly = hide_polynomial(prng, &poly, 1, n);
        let cm = commit(&entangle(&[poly.clone()], t, bsb_offset + j)?)?;
        let hash = hash_commitment(&mut config.hash_to_field, &to_bytes(&cm)?)?;
        w[gate.output_var] = hash;

        bsb_polys.push(poly);
        cm_bsb_entangled_vec.push(cm);
        hashes.push(hash);
    }
    end_timer!(bsb_time);

    cs.verify_witness(&w)?;
    let public_inputs = cs.public_inputs(&w);

    // 2. commit to l, r, o.
    let wires_time = start_timer!(|| "Commit to the wires");
    let wire_values: Vec<Vec<Fr>> = (0..N_WIRES_PER_GATE)
        .map(|i| cs.wire_column(i).iter().map(|&var| w[var]).collect())
        .collect();
    let mut wire_polys = Vec::with_capacity(N_WIRES_PER_GATE);
    for values in wire_values.iter() {
        let poly = DensePolynomial::from_coefficients_vec(domain.ifft(values));
        wire_polys.push(hide_polynomial(prng, &poly, 1, n));
    }
    let cm_lro_entangled = commit(&entangle(&wire_polys, t, lro_offset)?)?;
    end_timer!(wires_time);

    let mut transcript = transcript_init_plonk::<C>();
    bind_public_data(&mut transcript, verifier_params, &public_inputs)?;
    let gamma = derive_randomness(&mut transcript, GAMMA, &[&cm_lro_entangled])?;
    let beta = derive_randomness(&mut transcript, BETA, &[])?;

    // 3. commit to the permutation accumulator z, alone and entangled.
    let z_time = start_timer!(|| "Commit to z");
    let z = z_poly(prover_params, &wire_values, &beta, &gamma)?;
    let z = hide_polynomial(prng, &z, 2, n);
    let cm_z = commit(&z)?;
    let cm_z_entangled = commit(&entangle(&[z.clone()], t, lro_offset + 3)?)?;
    end_timer!(z_time);

    let mut alpha_bindings: Vec<&G1Affine> = cm_bsb_entangled_vec.iter().collect();
    alpha_bindings.push(&cm_z_entangled);
    let alpha = derive_randomness(&mut transcript, ALPHA, &alpha_bindings)?;

    // 4. compute the quotient and commit to its three pieces.
    let t_time = start_timer!(|| "Compute the quotient");
    let mut pi_values = vec![Fr::zero(); n];
    pi_values[..nb_public].copy_from_slice(&public_inputs);
    for (index, hash) in cs.commitment_constraint_indices().iter().zip(&hashes) {
        pi_values[nb_public + index] = *hash;
    }
    let pi = DensePolynomial::from_coefficients_vec(domain.ifft(&pi_values));

    let mut challenges = FflonkChallenges {
        gamma,
        beta,
        alpha,
        zeta: Fr::zero(),
    };
    let polys = WitnessPolys {
        wires: &wire_polys,
        z: &z,
        bsb: &bsb_polys,
        pi: &pi,
    };
    let quotient = t_poly(prover_params, &polys, &challenges)?;
    let h_polys = split_t_poly(&quotient, n);
    let cm_h_entangled = commit(&entangle(&h_polys, t, lro_offset + 4)?)?;
    end_timer!(t_time);

    challenges.zeta = derive_randomness(&mut transcript, ZETA, &[&cm_h_entangled])?;

    // 5. open the primary pack at ζ and z at ξω.
    let open_time = start_timer!(|| "Batch opening");
    let xi = challenges.zeta.pow([t as u64]);
    let mut primary = prover_params.setup_polys();
    primary.extend(wire_polys);
    primary.push(z.clone());
    primary.extend(h_polys);
    primary.extend(bsb_polys);

    let mut proof = FflonkProof {
        cm_lro_entangled,
        cm_z,
        cm_z_entangled,
        cm_h_entangled,
        cm_bsb_entangled_vec,
        batch_opening_proof: FoldedOpeningProof::default(),
    };
    let digests = [fold_digests(verifier_params, &proof), cm_z];
    let points = [challenges.zeta, xi * verifier_params.generator];
    proof.batch_opening_proof =
        fold::batch_open::<K>(pcs, &[primary, vec![z]], &digests, &points)?;
    end_timer!(open_time);

    end_timer!(prover_time);
    Ok(proof)
}
