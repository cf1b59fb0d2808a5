use ethtx_primitives::{Address, B256};
use k256::ecdsa::{
    RecoveryId, Signature, SigningKey, VerifyingKey,
    signature::hazmat::{PrehashSigner, RandomizedPrehashSigner},
};

use crate::{
    SignatureError, UncompressedPublicKey, UnmarshalledSignature, constant_time_eq,
    public_to_address, secret_key_from_bytes, uncompressed_public_key, utils::hash_message,
};

/// Maximum number of attempts to produce a signature that recovers to the
/// signer's public key.
pub const MAX_SIGNING_ATTEMPTS: usize = 1024;

/// A low-s ECDSA signature with recovery ID.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RecoverableSignature {
    signature: Signature,
    recovery_id: RecoveryId,
}

impl RecoverableSignature {
    /// Constructs a new instance, normalizing the signature to its low-s form.
    pub fn new(signature: Signature, recovery_id: RecoveryId) -> Self {
        match signature.normalize_s() {
            // Negating `s` mirrors the nonce point, which flips its Y parity.
            Some(signature) => Self {
                signature,
                recovery_id: RecoveryId::new(!recovery_id.is_y_odd(), recovery_id.is_x_reduced()),
            },
            None => Self {
                signature,
                recovery_id,
            },
        }
    }

    /// Returns the underlying ECDSA signature.
    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// Returns the bare recovery ID.
    pub fn recovery_id(&self) -> u8 {
        self.recovery_id.to_byte()
    }

    /// Serializes the signature as `r || s || v` with `v = 27 + recovery_id`.
    pub fn serialize(&self) -> [u8; 65] {
        let mut serialized = self.unmarshal().marshal();
        serialized[64] += 27;
        serialized
    }

    /// Splits the signature into its bare recovery ID and `r` and `s` values.
    pub fn unmarshal(&self) -> UnmarshalledSignature {
        let (r, s) = self.signature.split_bytes();

        UnmarshalledSignature {
            v: self.recovery_id(),
            r: B256::from_slice(&r),
            s: B256::from_slice(&s),
        }
    }

    /// Recovers the public key that produced the signature over `hash`.
    pub fn recover_public_key(&self, hash: &B256) -> Result<UncompressedPublicKey, SignatureError> {
        let verifying_key =
            VerifyingKey::recover_from_prehash(hash.as_slice(), &self.signature, self.recovery_id)?;

        Ok(uncompressed_public_key(&verifying_key.into()))
    }
}

/// Signs `hash` with the secret key, producing a recoverable signature.
///
/// Signatures are deterministic (RFC 6979), unless `use_extra_entropy` is set,
/// in which case fresh randomness is mixed into every attempt. Each attempt is
/// checked by recovering its public key and comparing it in constant time with
/// the secret key's public key. After [`MAX_SIGNING_ATTEMPTS`] failed checks,
/// [`SignatureError::SigningAttemptsExhausted`] is returned.
#[cfg_attr(feature = "tracing", tracing::instrument(skip_all))]
pub fn sign_for_recovery(
    hash: &B256,
    secret_key: &[u8],
    use_extra_entropy: bool,
) -> Result<RecoverableSignature, SignatureError> {
    let secret_key = secret_key_from_bytes(secret_key)?;
    let expected_public_key = uncompressed_public_key(&secret_key.public_key());
    let signing_key = SigningKey::from(&secret_key);

    for attempt in 1..=MAX_SIGNING_ATTEMPTS {
        let signature = sign_prehash(&signing_key, hash, use_extra_entropy)?;

        match signature.recover_public_key(hash) {
            Ok(public_key) if constant_time_eq(&public_key, &expected_public_key) => {
                return Ok(signature);
            }
            Ok(_public_key) => {
                log::warn!("Signing attempt {attempt} recovered a different public key");
            }
            Err(error) => {
                log::warn!("Signing attempt {attempt} produced an unrecoverable signature: {error}");
            }
        }
    }

    Err(SignatureError::SigningAttemptsExhausted(MAX_SIGNING_ATTEMPTS))
}

fn sign_prehash(
    signing_key: &SigningKey,
    hash: &B256,
    use_extra_entropy: bool,
) -> Result<RecoverableSignature, SignatureError> {
    let (signature, recovery_id) = if use_extra_entropy {
        let signature = RandomizedPrehashSigner::<Signature>::sign_prehash_with_rng(
            signing_key,
            &mut rand::rngs::OsRng,
            hash.as_slice(),
        )?;
        let recovery_id = RecoveryId::trial_recovery_from_prehash(
            signing_key.verifying_key(),
            hash.as_slice(),
            &signature,
        )?;

        (signature, recovery_id)
    } else {
        PrehashSigner::<(Signature, RecoveryId)>::sign_prehash(signing_key, hash.as_slice())?
    };

    Ok(RecoverableSignature::new(signature, recovery_id))
}

/// Recovers the public key that produced a 65-byte `r || s || v` signature
/// over `hash`.
///
/// The `v` byte may be a bare recovery ID or carry one of the offsets 27, 31
/// or 35.
pub fn recover_public_key(
    hash: &B256,
    signature: &[u8],
) -> Result<UncompressedPublicKey, SignatureError> {
    UnmarshalledSignature::from_bytes(signature)?.recover_public_key(hash)
}

/// Recovers the address that produced a 65-byte `r || s || v` signature over
/// `hash`.
pub fn recover_address(hash: &B256, signature: &[u8]) -> Result<Address, SignatureError> {
    recover_public_key(hash, signature).map(|public_key| public_to_address(&public_key))
}

/// Signs an EIP-191 personal message, returning `r || s || v` with
/// `v = 27 + recovery_id`.
pub fn sign_personal_message(
    message: impl AsRef<[u8]>,
    secret_key: &[u8],
    use_extra_entropy: bool,
) -> Result<[u8; 65], SignatureError> {
    let hash = hash_message(message);
    sign_for_recovery(&hash, secret_key, use_extra_entropy).map(|signature| signature.serialize())
}
