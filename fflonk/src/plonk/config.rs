use crate::{
    errors::{PlonkError, Result},
    utils::FR_BYTES,
};
use ark_bn254::Fr;
use ark_ff::{
    field_hashers::{DefaultFieldHasher, HashToField},
    BigInteger, PrimeField,
};
use ark_std::{marker::PhantomData, vec::Vec};
use digest::Digest;
use sha2::Sha256;

/// The domain separation tag of the custom-gate commitment hash.
pub const BSB22_DOMAIN_TAG: &[u8] = b"BSB22-Plonk";

/// A hash function whose output is reduced to a scalar, used to turn the
/// custom-gate commitments into public-input contributions.
pub trait FieldHasher {
    /// Absorb bytes.
    fn write(&mut self, bytes: &[u8]);
    /// The digest of everything absorbed since the last reset.
    fn sum(&self) -> Result<Vec<u8>>;
    /// Forget everything absorbed.
    fn reset(&mut self);
    /// The digest size in bytes.
    fn size(&self) -> usize;
}

/// Hash-to-field with a domain separation tag (RFC 9380 `expand_message_xmd` over SHA-256).
/// The digest is the big-endian encoding of the resulting scalar.
#[derive(Debug, Clone)]
pub struct DomainHasher {
    domain: Vec<u8>,
    buffer: Vec<u8>,
}

impl DomainHasher {
    /// Create a hasher with the domain separation tag `domain`.
    pub fn new(domain: &[u8]) -> Self {
        Self {
            domain: domain.to_vec(),
            buffer: Vec::new(),
        }
    }
}

impl Default for DomainHasher {
    fn default() -> Self {
        Self::new(BSB22_DOMAIN_TAG)
    }
}

impl FieldHasher for DomainHasher {
    fn write(&mut self, bytes: &[u8]) {
        self.buffer.extend_from_slice(bytes);
    }

    fn sum(&self) -> Result<Vec<u8>> {
        let hasher = <DefaultFieldHasher<Sha256> as HashToField<Fr>>::new(&self.domain);
        let elem: Vec<Fr> = hasher.hash_to_field(&self.buffer, 1);
        elem.first()
            .map(|e| e.into_bigint().to_bytes_be())
            .ok_or_else(|| PlonkError::Hash("hash to field returned no element".into()))
    }

    fn reset(&mut self) {
        self.buffer.clear();
    }

    fn size(&self) -> usize {
        FR_BYTES
    }
}

/// Adapts a plain [`Digest`] to a [`FieldHasher`].
#[derive(Debug, Clone, Default)]
pub struct DigestHasher<D: Digest> {
    hasher: D,
}

impl<D: Digest> FieldHasher for DigestHasher<D>
where
    D: Clone,
{
    fn write(&mut self, bytes: &[u8]) {
        self.hasher.update(bytes);
    }

    fn sum(&self) -> Result<Vec<u8>> {
        Ok(self.hasher.clone().finalize().to_vec())
    }

    fn reset(&mut self) {
        self.hasher = D::new();
    }

    fn size(&self) -> usize {
        <D as Digest>::output_size()
    }
}

/// The hash functions a proof is checked with.
///
/// `C` drives the Fiat-Shamir challenges `gamma, beta, alpha, zeta`, `K`
/// drives the challenges of the batched opening, and `hash_to_field` maps the
/// custom-gate commitments to scalars. The prover must use the same choices.
#[derive(Debug, Clone)]
pub struct VerifierConfig<C = Sha256, K = Sha256, H = DomainHasher> {
    /// The hash of the custom-gate commitments.
    pub hash_to_field: H,
    hashes: PhantomData<(C, K)>,
}

impl<C: Digest, K: Digest, H: FieldHasher> VerifierConfig<C, K, H> {
    /// Create a configuration with the given commitment hasher.
    pub fn new(hash_to_field: H) -> Self {
        Self {
            hash_to_field,
            hashes: PhantomData,
        }
    }
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self::new(DomainHasher::default())
    }
}

/// Map a custom-gate commitment (already encoded) to a scalar, resetting the hasher afterwards.
pub(crate) fn hash_commitment<H: FieldHasher>(hasher: &mut H, bytes: &[u8]) -> Result<Fr> {
    hasher.write(bytes);
    let digest = hasher.sum();
    hasher.reset();
    let digest = digest?;
    let len = FR_BYTES.min(hasher.size()).min(digest.len());
    Ok(Fr::from_be_bytes_mod_order(&digest[..len]))
}
