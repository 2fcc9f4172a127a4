use ark_bn254::Fr;
use ark_ff::PrimeField;
use ark_serialize::{CanonicalSerialize, SerializationError};
use ark_std::{string::String, vec::Vec};
use base64::{
    alphabet::URL_SAFE,
    engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig},
    Engine,
};

/// The number of bytes of a serialized scalar.
pub const FR_BYTES: usize = 32;

const BASE64_PADDING_CONFIG: GeneralPurposeConfig =
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent);

const BASE64_ENGINE: GeneralPurpose = GeneralPurpose::new(&URL_SAFE, BASE64_PADDING_CONFIG);

/// Convert the input into the base64 encoding
pub fn b64enc<T: ?Sized + AsRef<[u8]>>(input: &T) -> String {
    BASE64_ENGINE.encode(input)
}

/// Reconstruct from the base64 encoding
pub fn b64dec<T: ?Sized + AsRef<[u8]>>(input: &T) -> Result<Vec<u8>, SerializationError> {
    BASE64_ENGINE
        .decode(input)
        .map_err(|_| SerializationError::InvalidData)
}

/// Encode an element the way it is bound to the transcripts: arkworks uncompressed form.
pub fn to_bytes<T: CanonicalSerialize>(t: &T) -> Result<Vec<u8>, SerializationError> {
    let mut bytes = Vec::with_capacity(t.uncompressed_size());
    t.serialize_uncompressed(&mut bytes)?;
    Ok(bytes)
}

/// Interpret a hash output as a big-endian integer reduced modulo the scalar field order.
pub fn scalar_from_hash(bytes: &[u8]) -> Fr {
    Fr::from_be_bytes_mod_order(bytes)
}
