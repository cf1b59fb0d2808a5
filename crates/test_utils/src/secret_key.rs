use ethtx_primitives::Address;
#[allow(deprecated)]
// This is test code, it's ok to use `DangerousSecretKeyStr`
use ethtx_signer::{DangerousSecretKeyStr, public_key_to_address};
pub use ethtx_signer::{SECRET_KEY_LENGTH, SecretKey, SignatureError};

/// Secret keys of the default development accounts of `hardhat node`.
pub const SECRET_KEYS: [&str; 3] = [
    "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80",
    "0x59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d",
    "0x5de4111afa1a4b94908f83103eb1f1706367c2e68ca870fc3fb9a804cdab365a",
];

/// Converts a hex string to a secret key.
pub fn secret_key_from_str(secret_key: &str) -> Result<SecretKey, SignatureError> {
    // This is test code, it's ok to use `DangerousSecretKeyStr`
    #[allow(deprecated)]
    ethtx_signer::secret_key_from_str(DangerousSecretKeyStr(secret_key))
}

/// Converts a hex string to the raw bytes of a secret key.
pub fn secret_key_bytes(secret_key: &str) -> Result<[u8; SECRET_KEY_LENGTH], SignatureError> {
    let secret_key = secret_key_from_str(secret_key)?;
    Ok(secret_key.to_bytes().into())
}

/// Converts a secret key in a hex string format to an address.
///
/// Note that this function is in `ethtx_test_utils` to restrict opportunities
/// for misuse. In production code there should be only one place where secret
/// keys are parsed from string to avoid potential leakage into logs and error
/// messages.
///
/// # Examples
///
/// ```
/// use ethtx_test_utils::secret_key::secret_key_to_address;
///
/// let secret_key = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
///
/// let address = secret_key_to_address(secret_key).unwrap();
/// ```
pub fn secret_key_to_address(secret_key: &str) -> Result<Address, SignatureError> {
    let secret_key = secret_key_from_str(secret_key)?;
    Ok(public_key_to_address(secret_key.public_key()))
}

/// Converts a secret key to a 0x-prefixed hex string.
pub fn secret_key_to_str(secret_key: &SecretKey) -> String {
    hex::encode_prefixed(secret_key.to_bytes())
}
