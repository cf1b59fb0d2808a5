use core::fmt;

use ethtx_primitives::U64;

/// The type of transaction.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TransactionType {
    /// Untyped transaction, never written as a type byte
    Legacy = 0,
    /// EIP-2930 access list transaction
    Eip2930 = 1,
    /// EIP-1559 dynamic fee transaction
    Eip1559 = 2,
}

impl TransactionType {
    /// Returns the EIP-2718 type byte, if the transaction type has one.
    pub const fn type_byte(self) -> Option<u8> {
        match self {
            TransactionType::Legacy => None,
            TransactionType::Eip2930 | TransactionType::Eip1559 => Some(self as u8),
        }
    }
}

impl From<TransactionType> for u8 {
    fn from(value: TransactionType) -> Self {
        value as u8
    }
}

impl From<TransactionType> for u64 {
    fn from(value: TransactionType) -> Self {
        u64::from(value as u8)
    }
}

/// Error for an unknown transaction type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[error("Unknown transaction type: {0}")]
pub struct UnknownTransactionType(pub u64);

impl TryFrom<u64> for TransactionType {
    type Error = UnknownTransactionType;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(TransactionType::Legacy),
            1 => Ok(TransactionType::Eip2930),
            2 => Ok(TransactionType::Eip1559),
            value => Err(UnknownTransactionType(value)),
        }
    }
}

impl TryFrom<u8> for TransactionType {
    type Error = UnknownTransactionType;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::try_from(u64::from(value))
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionType::Legacy => f.write_str("Legacy"),
            TransactionType::Eip2930 => f.write_str("EIP-2930"),
            TransactionType::Eip1559 => f.write_str("EIP-1559"),
        }
    }
}

impl serde::Serialize for TransactionType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        U64::from(u64::from(*self)).serialize(serializer)
    }
}

impl<'de> serde::Deserialize<'de> for TransactionType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = U64::deserialize(deserializer)?;
        Self::try_from(value.to::<u64>()).map_err(serde::de::Error::custom)
    }
}

/// The purpose of an encoding.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EncodeType {
    /// The transmitted form, including the signature
    Transaction,
    /// The signing pre-image, excluding the signature
    Signature,
}
