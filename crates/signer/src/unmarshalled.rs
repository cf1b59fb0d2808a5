use core::fmt;

use ethtx_primitives::{B256, hex};
use k256::ecdsa::{RecoveryId, Signature, VerifyingKey};

use crate::{SignatureError, UncompressedPublicKey, uncompressed_public_key};

/// A signature split into its bare recovery ID and `r` and `s` values.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct UnmarshalledSignature {
    /// Bare recovery ID
    pub v: u8,
    /// R value
    pub r: B256,
    /// S value
    pub s: B256,
}

impl UnmarshalledSignature {
    /// Parses a 65-byte `r || s || v` signature.
    ///
    /// The `v` byte is normalized to a bare recovery ID. It may already be
    /// bare (0-3) or be offset by 27, 31 or 35.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SignatureError> {
        let bytes: &[u8; 65] = bytes
            .try_into()
            .map_err(|_error| SignatureError::InvalidLength(bytes.len()))?;

        let (r, remainder) = bytes.split_at(32);
        let (s, _v) = remainder.split_at(32);

        Ok(Self {
            v: normalize_recovery_id(bytes[64])?,
            r: B256::from_slice(r),
            s: B256::from_slice(s),
        })
    }

    /// Serializes the signature as `r || s || v` with a bare recovery ID.
    pub fn marshal(&self) -> [u8; 65] {
        let mut bytes = [0u8; 65];

        let (r, remainder) = bytes.split_at_mut(32);
        r.copy_from_slice(self.r.as_slice());

        let (s, v) = remainder.split_at_mut(32);
        s.copy_from_slice(self.s.as_slice());
        v.fill(self.v);

        bytes
    }

    /// Recovers the public key that produced the signature over `hash`.
    pub fn recover_public_key(&self, hash: &B256) -> Result<UncompressedPublicKey, SignatureError> {
        let recovery_id =
            RecoveryId::from_byte(self.v).ok_or(SignatureError::InvalidRecoveryId(self.v))?;
        let signature = Signature::from_scalars(self.r.0, self.s.0)?;

        let verifying_key =
            VerifyingKey::recover_from_prehash(hash.as_slice(), &signature, recovery_id)
                .map_err(|_error| SignatureError::RecoveryError)?;

        Ok(uncompressed_public_key(&verifying_key.into()))
    }
}

impl fmt::Display for UnmarshalledSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode_prefixed(self.marshal()))
    }
}

fn normalize_recovery_id(v: u8) -> Result<u8, SignatureError> {
    match v {
        0..=3 => Ok(v),
        27..=30 => Ok(v - 27),
        31..=34 => Ok(v - 31),
        35..=38 => Ok(v - 35),
        _ => Err(SignatureError::InvalidRecoveryId(v)),
    }
}
