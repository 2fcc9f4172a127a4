use crate::{
    errors::{PlonkError, Result},
    plonk::{
        config::{FieldHasher, VerifierConfig},
        helpers::{
            check_algebraic_relation, eval_pi_poly, fold_digests, FflonkChallenges,
            ProofEvaluations,
        },
        indexer::{FflonkProof, FflonkVerifierParams},
        transcript::{
            bind_public_data, derive_randomness, transcript_init_plonk, ALPHA, BETA, GAMMA, ZETA,
        },
    },
    poly_commit::{errors::PolyComSchemeError, fold},
};
use ark_bn254::Fr;
use ark_ff::Field;
use ark_std::{end_timer, start_timer};
use digest::Digest;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Derive gamma, beta, alpha and zeta from the verifying key, the public inputs
/// and the commitments of the proof.
pub(crate) fn compute_challenges<C: Digest>(
    verifier_params: &FflonkVerifierParams,
    public_inputs: &[Fr],
    proof: &FflonkProof,
) -> Result<FflonkChallenges> {
    let mut transcript = transcript_init_plonk::<C>();
    bind_public_data(&mut transcript, verifier_params, public_inputs)?;

    let gamma = derive_randomness(&mut transcript, GAMMA, &[&proof.cm_lro_entangled])?;
    let beta = derive_randomness(&mut transcript, BETA, &[])?;

    let mut alpha_bindings: Vec<_> = proof.cm_bsb_entangled_vec.iter().collect();
    alpha_bindings.push(&proof.cm_z_entangled);
    let alpha = derive_randomness(&mut transcript, ALPHA, &alpha_bindings)?;

    let zeta = derive_randomness(&mut transcript, ZETA, &[&proof.cm_h_entangled])?;

    Ok(FflonkChallenges {
        gamma,
        beta,
        alpha,
        zeta,
    })
}

/// Verify a proof.
///
/// Malformed inputs are reported before any challenge is derived. An invalid
/// proof is reported by an error for which [`PlonkError::is_rejection`] holds.
pub fn verifier<C: Digest, K: Digest, H: FieldHasher>(
    config: &mut VerifierConfig<C, K, H>,
    verifier_params: &FflonkVerifierParams,
    public_inputs: &[Fr],
    proof: &FflonkProof,
) -> Result<()> {
    let verifier_time = start_timer!(|| "Fflonk::Verifier");

    if public_inputs.len() != verifier_params.nb_public_variables {
        return Err(PlonkError::InvalidWitnessLength);
    }
    verifier_params.check_layout()?;
    let nb_custom_gates = verifier_params.nb_custom_gates();
    if proof.cm_bsb_entangled_vec.len() != nb_custom_gates {
        return Err(PlonkError::ClaimedValuesLayout);
    }
    let evals =
        ProofEvaluations::decode(&proof.batch_opening_proof.claimed_values, nb_custom_gates)?;

    // 1. compute all challenges such as gamma, beta, alpha and zeta.
    let challenges = compute_challenges::<C>(verifier_params, public_inputs, proof)?;

    // 2. the polynomials of the primary pack are evaluated at ξ = ζ^t.
    let t = verifier_params.fold_order();
    let xi = challenges.zeta.pow([t as u64]);

    // 3. compute Z_h(ξ), L_1(ξ) and PI(ξ).
    let terms = eval_pi_poly(
        verifier_params,
        public_inputs,
        &proof.cm_bsb_entangled_vec,
        &xi,
        &mut config.hash_to_field,
    )?;

    // 4. check the algebraic relation at ξ.
    check_algebraic_relation(verifier_params, &evals, &challenges, &xi, &terms)?;

    // 5. check the opening of the primary pack at ζ and of z at ξω.
    let digests = [fold_digests(verifier_params, proof), proof.cm_z];
    let points = [challenges.zeta, xi * verifier_params.generator];
    let res = fold::batch_verify::<K>(
        &verifier_params.kzg,
        &proof.batch_opening_proof,
        &digests,
        &points,
    )
    .map_err(|e| match e {
        PolyComSchemeError::PCSVerifyEvalError => PlonkError::OpeningVerification,
        e => PlonkError::PolyCom(e),
    });

    end_timer!(verifier_time);
    res
}

/// Verify several proofs against the same verifying key, each with a fresh configuration.
/// Return the first failure.
pub fn batch_verifier<C, K, H, F>(
    new_config: F,
    verifier_params: &FflonkVerifierParams,
    instances: &[(&[Fr], &FflonkProof)],
) -> Result<()>
where
    C: Digest,
    K: Digest,
    H: FieldHasher,
    F: Fn() -> VerifierConfig<C, K, H> + Sync,
{
    #[cfg(feature = "parallel")]
    let iter = instances.par_iter();
    #[cfg(not(feature = "parallel"))]
    let mut iter = instances.iter();

    iter.try_for_each(|(public_inputs, proof)| {
        verifier(&mut new_config(), verifier_params, public_inputs, proof)
    })
}
