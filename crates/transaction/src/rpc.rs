//! Node-shaped JSON representations of transactions.

use ethtx_eip2930::AccessList;
use ethtx_primitives::{Address, B256, Bytes, TxKind, U64, U256};

use crate::{ConversionError, TransactionType};

/// The `to` field of a JSON transaction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Recipient {
    /// The field is absent.
    #[default]
    Missing,
    /// Contract creation: `null`, `"0x"` or `"0x0"`
    Create,
    /// Call to an address
    Call(Address),
}

impl<'de> serde::Deserialize<'de> for Recipient {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = Option::<String>::deserialize(deserializer)?;
        match value.as_deref() {
            None | Some("0x" | "0x0") => Ok(Recipient::Create),
            Some(address) => address
                .parse::<Address>()
                .map(Recipient::Call)
                .map_err(serde::de::Error::custom),
        }
    }
}

/// RPC transaction, as returned by nodes or written by hand.
///
/// All fields are optional during deserialization. Conversion into an
/// envelope checks which of them are required.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// integer of the transaction type, 0x0 for legacy transactions, 0x1 for
    /// access list types, 0x2 for dynamic fees
    #[serde(rename = "type")]
    pub transaction_type: Option<U64>,
    /// chain ID
    pub chain_id: Option<U256>,
    /// the number of transactions made by the sender prior to this one
    pub nonce: Option<U256>,
    /// address of the receiver
    #[serde(default)]
    pub to: Recipient,
    /// value transferred in Wei
    pub value: Option<U256>,
    /// gas provided by the sender
    pub gas: Option<U256>,
    /// alias of `gas`
    pub gas_limit: Option<U256>,
    /// gas price provided by the sender in Wei
    pub gas_price: Option<U256>,
    /// max fee per gas
    pub max_fee_per_gas: Option<U256>,
    /// max priority fee per gas
    pub max_priority_fee_per_gas: Option<U256>,
    /// access list
    pub access_list: Option<AccessList>,
    /// the data sent along with the transaction
    pub input: Option<Bytes>,
    /// alias of `input`
    pub data: Option<Bytes>,
    /// ECDSA recovery id
    pub v: Option<U256>,
    /// ECDSA signature r
    pub r: Option<U256>,
    /// ECDSA signature s
    pub s: Option<U256>,
    /// address of the sender
    pub from: Option<Address>,
    /// hash of the block where this transaction was in
    pub block_hash: Option<B256>,
    /// block number where this transaction was in
    pub block_number: Option<U256>,
    /// integer of the transactions index position in the block
    pub transaction_index: Option<U256>,
    /// hash of the transaction
    #[serde(alias = "transactionHash")]
    pub hash: Option<B256>,
}

/// Fields shared by all transaction types.
pub(crate) struct CommonFields {
    pub nonce: U256,
    pub kind: TxKind,
    pub value: U256,
    pub input: Bytes,
    pub gas_limit: U256,
    pub v: U256,
    pub r: U256,
    pub s: U256,
}

impl Transaction {
    /// Returns the transaction type, defaulting to legacy when absent.
    pub fn transaction_type(&self) -> Result<TransactionType, ConversionError> {
        self.transaction_type.map_or(Ok(TransactionType::Legacy), |value| {
            TransactionType::try_from(value.to::<u64>()).map_err(ConversionError::from)
        })
    }

    /// Checks that the `type` field, if present, matches the expected type.
    pub(crate) fn expect_type(&self, expected: TransactionType) -> Result<(), ConversionError> {
        let found = self.transaction_type()?;
        if found == expected {
            Ok(())
        } else {
            Err(ConversionError::TypeMismatch { expected, found })
        }
    }

    pub(crate) fn common_fields(&self) -> Result<CommonFields, ConversionError> {
        let kind = match self.to {
            Recipient::Missing => return Err(ConversionError::MissingField("to")),
            Recipient::Create => TxKind::Create,
            Recipient::Call(address) => TxKind::Call(address),
        };

        let input = self
            .input
            .as_ref()
            .or(self.data.as_ref())
            .cloned()
            .ok_or(ConversionError::MissingField("data"))?;

        Ok(CommonFields {
            nonce: required(self.nonce, "nonce")?,
            kind,
            value: required(self.value, "value")?,
            input,
            gas_limit: self.gas.or(self.gas_limit).unwrap_or_default(),
            v: required(self.v, "v")?,
            r: required(self.r, "r")?,
            s: required(self.s, "s")?,
        })
    }
}

pub(crate) fn required<T>(value: Option<T>, field: &'static str) -> Result<T, ConversionError> {
    value.ok_or(ConversionError::MissingField(field))
}

/// RPC transaction request, as sent to `eth_sendTransaction` or
/// `eth_estimateGas`.
///
/// Zero-valued fee fields, empty access lists and the chain ID of legacy
/// transactions are omitted.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRequest {
    /// transaction type
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub transaction_type: Option<TransactionType>,
    /// chain ID
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chain_id: Option<U256>,
    /// nonce
    pub nonce: U256,
    /// sender address
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<Address>,
    /// recipient address, absent for contract creation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<Address>,
    /// transferred value
    pub value: U256,
    /// transaction data
    pub data: Bytes,
    /// gas limit
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gas: Option<U256>,
    /// gas price
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gas_price: Option<U256>,
    /// max fee per gas
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_fee_per_gas: Option<U256>,
    /// max priority fee per gas
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_priority_fee_per_gas: Option<U256>,
    /// access list
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_list: Option<AccessList>,
}
