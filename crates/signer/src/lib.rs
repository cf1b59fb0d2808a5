// Part of this code was adapted from ethers-rs and is distributed under their
// licenss:
// - https://github.com/gakonst/ethers-rs/blob/cba6f071aedafb766e82e4c2f469ed5e4638337d/LICENSE-APACHE
// - https://github.com/gakonst/ethers-rs/blob/cba6f071aedafb766e82e4c2f469ed5e4638337d/LICENSE-MIT
// For the original context see: https://github.com/gakonst/ethers-rs/blob/cba6f071aedafb766e82e4c2f469ed5e4638337d/ethers-core/src/types/signature.rs

//! secp256k1 signing primitives
//!
//! Produces recoverable ECDSA signatures over 32-byte hashes and recovers the
//! signing public key from them. Every signature is checked against the
//! public key of its secret key before it is handed out.

mod recoverable;
mod unmarshalled;
pub mod utils;

use ethtx_primitives::Address;
pub use k256::{SecretKey, elliptic_curve::zeroize::Zeroizing};
use k256::{
    FieldBytes, PublicKey,
    elliptic_curve::{sec1::ToEncodedPoint, subtle::ConstantTimeEq},
};
use sha3::{Digest, Keccak256};

pub use self::{
    recoverable::{
        MAX_SIGNING_ATTEMPTS, RecoverableSignature, recover_address, recover_public_key,
        sign_for_recovery, sign_personal_message,
    },
    unmarshalled::UnmarshalledSignature,
};

/// Number of bytes in a secret key.
pub const SECRET_KEY_LENGTH: usize = 32;

/// An uncompressed SEC1 public key: `0x04 || x || y`.
pub type UncompressedPublicKey = [u8; 65];

/// An error involving a signature.
#[derive(Debug, thiserror::Error)]
pub enum SignatureError {
    /// Invalid length, ECDSA secp256k1 signatures with recovery are 65 bytes
    #[error("invalid signature length, got {0}, expected 65")]
    InvalidLength(usize),
    /// Invalid recovery ID.
    #[error("invalid recovery ID: {0}")]
    InvalidRecoveryId(u8),
    /// Invalid secret key length.
    #[error("Expected 32 byte secret key, got {0} bytes")]
    InvalidSecretKeyLength(usize),
    /// The secret key is zero or not below the curve order.
    #[error("Secret key is outside of the valid secp256k1 range")]
    InvalidSecretKey,
    /// When parsing a secret key from string to hex
    #[error("Invalid hex")]
    InvalidSecretKeyHex,
    /// ECDSA error
    #[error(transparent)]
    ECDSAError(#[from] k256::ecdsa::signature::Error),
    /// Error in recovering public key from signature
    #[error("Public key recovery error")]
    RecoveryError,
    /// None of the signing attempts produced a signature that recovers to the
    /// signer's public key.
    #[error("No valid signature was produced after {0} attempts")]
    SigningAttemptsExhausted(usize),
}

/// Converts a [`PublicKey`] to an [`Address`].
pub fn public_key_to_address(public_key: PublicKey) -> Address {
    public_to_address(&uncompressed_public_key(&public_key))
}

/// Converts an uncompressed public key to an [`Address`].
pub fn public_to_address(public_key: &UncompressedPublicKey) -> Address {
    // First byte is header value
    let (_header, coordinates) = public_key.split_at(1);
    let hash = Keccak256::digest(coordinates);
    // Only take the lower 160 bits of the hash
    let (_upper, lower) = hash.split_at(12);
    Address::from_slice(lower)
}

/// Parses a secret key from its 32-byte big-endian representation.
pub fn secret_key_from_bytes(secret_key: &[u8]) -> Result<SecretKey, SignatureError> {
    if secret_key.len() != SECRET_KEY_LENGTH {
        return Err(SignatureError::InvalidSecretKeyLength(secret_key.len()));
    }

    SecretKey::from_slice(secret_key).map_err(|_error| SignatureError::InvalidSecretKey)
}

/// Returns whether the bytes are a valid secp256k1 secret key.
pub fn verify_private_key(secret_key: &[u8]) -> bool {
    secret_key_from_bytes(secret_key).is_ok()
}

/// Derives the uncompressed public key of a secret key.
pub fn private_to_public(secret_key: &[u8]) -> Result<UncompressedPublicKey, SignatureError> {
    let secret_key = secret_key_from_bytes(secret_key)?;
    Ok(uncompressed_public_key(&secret_key.public_key()))
}

/// Generates a random secret key using the operating system's randomness.
pub fn generate_secret_key() -> SecretKey {
    SecretKey::random(&mut rand::rngs::OsRng)
}

/// Compares two byte slices in constant time.
///
/// Slices of different lengths are never equal.
pub fn constant_time_eq(lhs: &[u8], rhs: &[u8]) -> bool {
    lhs.ct_eq(rhs).into()
}

fn uncompressed_public_key(public_key: &PublicKey) -> UncompressedPublicKey {
    let encoded = public_key.to_encoded_point(/* compress = */ false);
    encoded
        .as_bytes()
        .try_into()
        .expect("uncompressed public key is 65 bytes")
}

/// It's dangerous to represent secret keys as native string types, because the
/// native string types have debug, display and serialization implementations
/// that can result in the secrets accidentally leaking to logs. It's marked as
/// deprecated, because it should be only created in exactly one place in the
/// production code.
#[deprecated]
pub struct DangerousSecretKeyStr<'a>(pub &'a str);

// It's marked as deprecated to be thoughtful abouts its usage.
#[allow(deprecated)]
/// Converts a hex string to a secret key.
pub fn secret_key_from_str(
    secret_key: DangerousSecretKeyStr<'_>,
) -> Result<SecretKey, SignatureError> {
    #[allow(deprecated)]
    let str_key = secret_key.0;
    let str_key = str_key.strip_prefix("0x").unwrap_or(str_key);
    // Hex error can leak character, so use opaque one.
    let secret_key = hex::decode(str_key).map_err(|_err| SignatureError::InvalidSecretKeyHex)?;
    let secret_key = FieldBytes::from_exact_iter(secret_key.iter().copied())
        .ok_or(SignatureError::InvalidSecretKeyLength(secret_key.len()))?;

    SecretKey::from_bytes(&secret_key).map_err(|_error| SignatureError::InvalidSecretKey)
}
