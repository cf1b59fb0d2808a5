//! Ethereum transaction envelopes
//!
//! Legacy (optionally EIP-155 bound), EIP-2930 and EIP-1559 transactions:
//! their wire and JSON representations, signing, sender recovery and
//! migration between types.

/// Envelope variants and their common interface
pub mod envelope;
mod error;
/// Construction of envelopes from raw bytes, JSON or parts
pub mod factory;
mod keystore;
mod metadata;
mod options;
mod provider;
mod request;
/// Node-shaped JSON types
pub mod rpc;
mod transaction;
mod r#type;
mod utils;

pub use self::{
    envelope::{Envelope, EnvelopeParts},
    error::{ConversionError, DecodeError, SignError},
    keystore::{Keystore, KeystoreSignError, sign_personal_message_with_keystore, sign_with_keystore},
    metadata::TransactionMetadata,
    options::{FeePolicy, GasLimitPolicy, GasPricePolicy, NoncePolicy, Policy, TransactionOptions},
    provider::{BlockTag, Provider, ResolveError},
    r#type::{EncodeType, TransactionType, UnknownTransactionType},
    request::{JsonRpcRequest, RequestIdCounter, Version, send_raw_transaction_request},
    transaction::Transaction,
};
