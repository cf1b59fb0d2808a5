use ethtx_signer::SignatureError;

use crate::{TransactionType, UnknownTransactionType};

/// An error that occurred while decoding a transaction from its raw bytes.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// The input is empty.
    #[error("Transaction bytes are empty")]
    EmptyInput,
    /// The type byte is reserved by EIP-2718.
    #[error("Transaction type 0xff is reserved")]
    ReservedType,
    /// The type byte doesn't match any supported transaction type.
    #[error("Unknown transaction type: {0:#04x}")]
    UnknownType(u8),
    /// The type byte doesn't match the decoded transaction type.
    #[error("Expected type byte of {expected} transaction, found {found:#04x}")]
    TypeMismatch {
        /// The expected transaction type
        expected: TransactionType,
        /// The found type byte
        found: u8,
    },
    /// The recipient is neither an address nor empty.
    #[error("Recipient must be 20 bytes or empty, got {0} bytes")]
    InvalidRecipientLength(usize),
    /// RLP error
    #[error(transparent)]
    Rlp(#[from] alloy_rlp::Error),
}

/// An error that occurred while converting a structured transaction.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ConversionError {
    /// A required field is missing.
    #[error("Missing required field: {0}")]
    MissingField(&'static str),
    /// The transaction type isn't supported.
    #[error(transparent)]
    UnknownType(#[from] UnknownTransactionType),
    /// The `type` field doesn't match the target transaction type.
    #[error("Expected {expected} transaction, found {found}")]
    TypeMismatch {
        /// The expected transaction type
        expected: TransactionType,
        /// The found transaction type
        found: TransactionType,
    },
}

/// An error that occurred while signing a transaction.
#[derive(Debug, thiserror::Error)]
pub enum SignError {
    /// No signature recovered to the account of the secret key.
    #[error("Signature does not recover to the signing account")]
    InvalidAccount,
    /// The signing primitive failed.
    #[error(transparent)]
    Signature(#[from] SignatureError),
}
