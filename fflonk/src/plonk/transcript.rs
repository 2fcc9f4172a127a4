use crate::{
    errors::Result,
    plonk::indexer::FflonkVerifierParams,
    transcript::Transcript,
    utils::{scalar_from_hash, to_bytes},
};
use ark_bn254::{Fr, G1Affine};
use digest::Digest;

pub(crate) const GAMMA: &str = "gamma";
pub(crate) const BETA: &str = "beta";
pub(crate) const ALPHA: &str = "alpha";
pub(crate) const ZETA: &str = "zeta";

/// Initialize the transcript of a fflonk proof.
pub(crate) fn transcript_init_plonk<D: Digest>() -> Transcript<D> {
    Transcript::new(&[GAMMA, BETA, ALPHA, ZETA])
}

/// Bind the verifying key commitments and the public inputs to `gamma`:
/// s1, s2, s3, ql, qr, qm, qo, qk, the custom-gate selectors, then the public inputs.
pub(crate) fn bind_public_data<D: Digest>(
    transcript: &mut Transcript<D>,
    params: &FflonkVerifierParams,
    public_inputs: &[Fr],
) -> Result<()> {
    for cm in params.cm_s_vec.iter() {
        transcript.bind(GAMMA, &to_bytes(cm)?)?;
    }
    for cm in [
        &params.cm_ql,
        &params.cm_qr,
        &params.cm_qm,
        &params.cm_qo,
        &params.cm_qk_incomplete,
    ] {
        transcript.bind(GAMMA, &to_bytes(cm)?)?;
    }
    for cm in params.cm_qcp_vec.iter() {
        transcript.bind(GAMMA, &to_bytes(cm)?)?;
    }
    for value in public_inputs.iter() {
        transcript.bind(GAMMA, &to_bytes(value)?)?;
    }
    Ok(())
}

/// Bind `points` to the challenge `label` and return the challenge as a scalar.
pub(crate) fn derive_randomness<D: Digest>(
    transcript: &mut Transcript<D>,
    label: &str,
    points: &[&G1Affine],
) -> Result<Fr> {
    for point in points {
        transcript.bind(label, &to_bytes(*point)?)?;
    }
    let bytes = transcript.compute_challenge(label)?;
    Ok(scalar_from_hash(&bytes))
}

#[cfg(test)]
mod test {
    use super::{
        bind_public_data, derive_randomness, transcript_init_plonk, ALPHA, BETA, GAMMA,
    };
    use crate::{
        errors::PlonkError,
        plonk::{constraint_system::FflonkCS, indexer::indexer},
        poly_commit::kzg_poly_com::KZGCommitmentScheme,
        transcript::TranscriptError,
        utils::to_bytes,
    };
    use ark_bn254::{Fr, G1Affine};
    use ark_ec::AffineRepr;
    use ark_std::rand::SeedableRng;
    use rand_chacha::ChaChaRng;
    use sha2::Sha256;

    #[test]
    fn test_gamma_depends_on_binding_order() {
        let mut cs = FflonkCS::new();
        let a = cs.new_variable(Fr::from(3u64));
        cs.prepare_pi_variable(a);
        let _ = cs.mul(a, a);
        cs.pad();
        let mut prng = ChaChaRng::from_seed([0u8; 32]);
        let pcs = KZGCommitmentScheme::new(128, &mut prng);
        let vk = indexer(&cs, &pcs).unwrap().verifier_params;
        let lro = G1Affine::generator();
        let public_inputs = [Fr::from(3u64)];

        let mut transcript = transcript_init_plonk::<Sha256>();
        bind_public_data(&mut transcript, &vk, &public_inputs).unwrap();
        let gamma = derive_randomness(&mut transcript, GAMMA, &[&lro]).unwrap();

        // same data, qr and ql swapped
        let mut transcript = transcript_init_plonk::<Sha256>();
        for cm in vk.cm_s_vec.iter() {
            transcript.bind(GAMMA, &to_bytes(cm).unwrap()).unwrap();
        }
        for cm in [&vk.cm_qr, &vk.cm_ql, &vk.cm_qm, &vk.cm_qo, &vk.cm_qk_incomplete] {
            transcript.bind(GAMMA, &to_bytes(cm).unwrap()).unwrap();
        }
        transcript
            .bind(GAMMA, &to_bytes(&public_inputs[0]).unwrap())
            .unwrap();
        let swapped = derive_randomness(&mut transcript, GAMMA, &[&lro]).unwrap();
        assert_ne!(gamma, swapped);

        // a different public input changes gamma too
        let mut transcript = transcript_init_plonk::<Sha256>();
        bind_public_data(&mut transcript, &vk, &[Fr::from(4u64)]).unwrap();
        let other = derive_randomness(&mut transcript, GAMMA, &[&lro]).unwrap();
        assert_ne!(gamma, other);

        // and the derivation is deterministic
        let mut transcript = transcript_init_plonk::<Sha256>();
        bind_public_data(&mut transcript, &vk, &public_inputs).unwrap();
        assert_eq!(
            derive_randomness(&mut transcript, GAMMA, &[&lro]).unwrap(),
            gamma
        );
    }

    #[test]
    fn test_challenges_in_order() {
        let mut transcript = transcript_init_plonk::<Sha256>();
        assert_eq!(
            derive_randomness(&mut transcript, ALPHA, &[]),
            Err(PlonkError::Transcript(
                TranscriptError::PreviousChallengeNotComputed(ALPHA.into())
            ))
        );
        derive_randomness(&mut transcript, GAMMA, &[]).unwrap();
        derive_randomness(&mut transcript, BETA, &[]).unwrap();
        assert!(derive_randomness(&mut transcript, ALPHA, &[]).is_ok());
        assert_eq!(
            derive_randomness(&mut transcript, "delta", &[]),
            Err(PlonkError::Transcript(TranscriptError::UnknownChallenge(
                "delta".into()
            )))
        );
    }
}
