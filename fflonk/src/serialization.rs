//! serde support for the proof and the verifying key: the arkworks compressed
//! encoding, as raw bytes or as URL-safe base64 for human-readable formats.
use crate::{
    plonk::indexer::{FflonkProof, FflonkVerifierParams},
    utils::{b64dec, b64enc},
};
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use ark_std::{fmt, vec::Vec};
use serde::de::{SeqAccess, Visitor};

pub(crate) struct BytesVisitor;

impl<'de> Visitor<'de> for BytesVisitor {
    type Value = Vec<u8>;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a canonically encoded object")
    }

    fn visit_seq<V>(self, mut seq: V) -> Result<Vec<u8>, V::Error>
    where
        V: SeqAccess<'de>,
    {
        let mut vec: Vec<u8> = Vec::new();
        while let Some(x) = seq.next_element()? {
            vec.push(x);
        }
        Ok(vec)
    }

    fn visit_bytes<E>(self, v: &[u8]) -> Result<Vec<u8>, E> {
        Ok(v.to_vec())
    }

    fn visit_byte_buf<E>(self, v: Vec<u8>) -> Result<Vec<u8>, E> {
        Ok(v)
    }

    fn visit_str<E>(self, v: &str) -> Result<Vec<u8>, E>
    where
        E: serde::de::Error,
    {
        b64dec(v).map_err(serde::de::Error::custom)
    }
}

macro_rules! serialize_deserialize {
    ($t:ident) => {
        impl serde::Serialize for $t {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: serde::Serializer,
            {
                let mut bytes = Vec::with_capacity(self.compressed_size());
                self.serialize_compressed(&mut bytes)
                    .map_err(serde::ser::Error::custom)?;
                if serializer.is_human_readable() {
                    serializer.serialize_str(&b64enc(&bytes))
                } else {
                    serializer.serialize_bytes(&bytes)
                }
            }
        }

        impl<'de> serde::Deserialize<'de> for $t {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let bytes = if deserializer.is_human_readable() {
                    deserializer.deserialize_str(BytesVisitor)?
                } else {
                    deserializer.deserialize_bytes(BytesVisitor)?
                };
                $t::deserialize_compressed(bytes.as_slice()).map_err(serde::de::Error::custom)
            }
        }
    };
}

serialize_deserialize!(FflonkProof);
serialize_deserialize!(FflonkVerifierParams);

#[cfg(test)]
mod test {
    use crate::{
        plonk::{
            config::VerifierConfig,
            constraint_system::FflonkCS,
            indexer::{indexer, FflonkProof, FflonkVerifierParams},
            prover::prover,
            verifier::verifier,
        },
        poly_commit::kzg_poly_com::KZGCommitmentScheme,
    };
    use ark_bn254::Fr;
    use ark_std::rand::SeedableRng;
    use rand_chacha::ChaChaRng;

    #[test]
    fn test_serialized_proof_still_verifies() {
        let mut prng = ChaChaRng::from_seed([0u8; 32]);
        let pcs = KZGCommitmentScheme::new(1024, &mut prng);
        let mut cs = FflonkCS::new();
        let a = cs.new_variable(Fr::from(6u64));
        cs.prepare_pi_variable(a);
        let b = cs.mul(a, a);
        let _ = cs.commit_variables(&[b]);
        cs.pad();
        let params = indexer(&cs, &pcs).unwrap();

        let mut config: VerifierConfig = VerifierConfig::default();
        let proof = prover(&mut prng, &mut config, &pcs, &cs, &params, &cs.witness).unwrap();

        let json = serde_json::to_string(&proof).unwrap();
        let proof_json: FflonkProof = serde_json::from_str(&json).unwrap();
        assert_eq!(proof_json, proof);

        let bytes = bincode::serialize(&params.verifier_params).unwrap();
        let vk: FflonkVerifierParams = bincode::deserialize(&bytes).unwrap();
        assert_eq!(vk, params.verifier_params);

        assert!(verifier(&mut config, &vk, &[Fr::from(6u64)], &proof_json).is_ok());

        // a truncated encoding is rejected
        let short = &json[..json.len() / 2];
        assert!(serde_json::from_str::<FflonkProof>(&format!("{}\"", short)).is_err());
    }
}
