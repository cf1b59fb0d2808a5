//! Signing with keys held by a keystore.

use ethtx_primitives::Address;
use ethtx_signer::{SignatureError, Zeroizing, sign_personal_message};

use crate::{SignError, Transaction};

/// Trait for a store of secret keys.
pub trait Keystore {
    /// The keystore's error type
    type Error;

    /// Returns the addresses of the accounts in the keystore.
    fn addresses(&self) -> Vec<Address>;

    /// Unlocks the secret key of the account.
    fn secret_key(
        &self,
        account: &Address,
        password: &str,
    ) -> Result<Zeroizing<Vec<u8>>, Self::Error>;
}

/// An error that occurred while signing with a keystore.
#[derive(Debug, thiserror::Error)]
pub enum KeystoreSignError<KeystoreErrorT> {
    /// The keystore failed to unlock the secret key.
    #[error(transparent)]
    Keystore(KeystoreErrorT),
    /// Signing failed.
    #[error(transparent)]
    Sign(#[from] SignError),
}

/// Signs the transaction with the secret key of the keystore account.
pub fn sign_with_keystore<KeystoreT: Keystore>(
    transaction: &mut Transaction,
    keystore: &KeystoreT,
    account: &Address,
    password: &str,
    use_extra_entropy: bool,
) -> Result<(), KeystoreSignError<KeystoreT::Error>> {
    let secret_key = keystore
        .secret_key(account, password)
        .map_err(KeystoreSignError::Keystore)?;

    transaction.sign(&secret_key, use_extra_entropy)?;
    Ok(())
}

/// Signs an EIP-191 personal message with the secret key of the keystore
/// account, returning `r || s || v` with `v = 27 + recovery_id`.
pub fn sign_personal_message_with_keystore<KeystoreT: Keystore>(
    message: impl AsRef<[u8]>,
    keystore: &KeystoreT,
    account: &Address,
    password: &str,
    use_extra_entropy: bool,
) -> Result<[u8; 65], KeystoreSignError<KeystoreT::Error>> {
    let secret_key = keystore
        .secret_key(account, password)
        .map_err(KeystoreSignError::Keystore)?;

    sign_personal_message(message, &secret_key, use_extra_entropy)
        .map_err(|error: SignatureError| SignError::from(error).into())
}
