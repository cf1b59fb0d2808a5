//! Primitive Ethereum types shared by all `ethtx` crates.

pub use alloy_primitives::{
    Address, B256, Bytes, ChainId, TxKind, U64, U256, address, b256, bytes, hex, keccak256,
};

/// Number of bytes in an address.
pub const ADDRESS_LENGTH: usize = 20;

/// Number of bytes in a storage key or hash.
pub const WORD_LENGTH: usize = 32;
