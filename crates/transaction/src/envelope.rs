mod eip1559;
mod eip2930;
mod legacy;

use ethtx_eip2930::AccessList;
use ethtx_primitives::{B256, Bytes, TxKind, U256};
use ethtx_signer::UnmarshalledSignature;

pub use self::{eip1559::Eip1559, eip2930::Eip2930, legacy::Legacy};
use crate::{EncodeType, TransactionType};

/// Dispatches an expression over every variant of an [`Envelope`].
macro_rules! match_envelope {
    ($envelope:expr, $transaction:ident => $body:expr) => {
        match $envelope {
            Envelope::Legacy($transaction) => $body,
            Envelope::Eip2930($transaction) => $body,
            Envelope::Eip1559($transaction) => $body,
        }
    };
}

/// A transaction envelope of any supported type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Envelope {
    /// Untyped transaction
    Legacy(Legacy),
    /// EIP-2930 access list transaction
    Eip2930(Eip2930),
    /// EIP-1559 dynamic fee transaction
    Eip1559(Eip1559),
}

/// The fields needed to construct an unsigned envelope of any type.
///
/// Fee fields that the target type does not carry are ignored.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EnvelopeParts {
    /// Chain ID. Legacy envelopes without one are not bound to a chain.
    pub chain_id: Option<U256>,
    pub nonce: U256,
    pub kind: TxKind,
    pub value: U256,
    pub input: Bytes,
    pub gas_limit: U256,
    pub gas_price: Option<U256>,
    pub max_fee_per_gas: Option<U256>,
    pub max_priority_fee_per_gas: Option<U256>,
    pub access_list: AccessList,
}

impl Envelope {
    /// Constructs an unsigned envelope of the provided type.
    pub fn from_parts(transaction_type: TransactionType, parts: EnvelopeParts) -> Self {
        let unsigned_v = U256::from(1);

        match transaction_type {
            TransactionType::Legacy => Envelope::Legacy(Legacy {
                nonce: parts.nonce,
                gas_price: parts
                    .gas_price
                    .or(parts.max_fee_per_gas)
                    .unwrap_or_default(),
                gas_limit: parts.gas_limit,
                kind: parts.kind,
                value: parts.value,
                input: parts.input,
                v: unsigned_v,
                r: U256::ZERO,
                s: U256::ZERO,
                explicit_chain_id: parts.chain_id,
            }),
            TransactionType::Eip2930 => Envelope::Eip2930(Eip2930 {
                chain_id: parts.chain_id.unwrap_or_default(),
                nonce: parts.nonce,
                gas_price: parts
                    .gas_price
                    .or(parts.max_fee_per_gas)
                    .unwrap_or_default(),
                gas_limit: parts.gas_limit,
                kind: parts.kind,
                value: parts.value,
                input: parts.input,
                access_list: parts.access_list,
                v: unsigned_v,
                r: U256::ZERO,
                s: U256::ZERO,
            }),
            TransactionType::Eip1559 => Envelope::Eip1559(Eip1559 {
                chain_id: parts.chain_id.unwrap_or_default(),
                nonce: parts.nonce,
                max_priority_fee_per_gas: parts.max_priority_fee_per_gas.unwrap_or_default(),
                max_fee_per_gas: parts
                    .max_fee_per_gas
                    .or(parts.gas_price)
                    .unwrap_or_default(),
                gas_limit: parts.gas_limit,
                kind: parts.kind,
                value: parts.value,
                input: parts.input,
                access_list: parts.access_list,
                v: unsigned_v,
                r: U256::ZERO,
                s: U256::ZERO,
            }),
        }
    }

    /// Returns the fields of the envelope, without its signature.
    pub fn parts(&self) -> EnvelopeParts {
        EnvelopeParts {
            chain_id: self.chain_id(),
            nonce: *self.nonce(),
            kind: *self.kind(),
            value: *self.value(),
            input: self.input().clone(),
            gas_limit: *self.gas_limit(),
            gas_price: self.gas_price(),
            max_fee_per_gas: self.max_fee_per_gas(),
            max_priority_fee_per_gas: self.max_priority_fee_per_gas(),
            access_list: self.access_list().cloned().unwrap_or_default(),
        }
    }

    /// Returns the type of the envelope.
    pub fn transaction_type(&self) -> TransactionType {
        match self {
            Envelope::Legacy(_) => TransactionType::Legacy,
            Envelope::Eip2930(_) => TransactionType::Eip2930,
            Envelope::Eip1559(_) => TransactionType::Eip1559,
        }
    }

    /// Encodes the envelope for the provided purpose.
    pub fn encode(&self, encode_type: EncodeType) -> Bytes {
        let mut out = Vec::new();
        match_envelope!(self, transaction => transaction.encode(encode_type, &mut out));
        out.into()
    }

    /// Returns the hash of the signing pre-image.
    pub fn signature_hash(&self) -> B256 {
        ethtx_primitives::keccak256(self.encode(EncodeType::Signature))
    }

    /// Returns the chain ID the envelope is bound to, if any.
    pub fn chain_id(&self) -> Option<U256> {
        match self {
            Envelope::Legacy(transaction) => transaction.chain_id(),
            Envelope::Eip2930(transaction) => Some(transaction.chain_id),
            Envelope::Eip1559(transaction) => Some(transaction.chain_id),
        }
    }

    /// Sets the chain ID. For a legacy envelope, `None` or zero unbinds it
    /// unless `v` still encodes a chain ID.
    pub fn set_chain_id(&mut self, chain_id: Option<U256>) {
        match self {
            Envelope::Legacy(transaction) => transaction.explicit_chain_id = chain_id,
            Envelope::Eip2930(transaction) => transaction.chain_id = chain_id.unwrap_or_default(),
            Envelope::Eip1559(transaction) => transaction.chain_id = chain_id.unwrap_or_default(),
        }
    }

    pub fn nonce(&self) -> &U256 {
        match_envelope!(self, transaction => &transaction.nonce)
    }

    pub fn set_nonce(&mut self, nonce: U256) {
        match_envelope!(self, transaction => transaction.nonce = nonce);
    }

    pub fn kind(&self) -> &TxKind {
        match_envelope!(self, transaction => &transaction.kind)
    }

    pub fn set_kind(&mut self, kind: TxKind) {
        match_envelope!(self, transaction => transaction.kind = kind);
    }

    pub fn value(&self) -> &U256 {
        match_envelope!(self, transaction => &transaction.value)
    }

    pub fn set_value(&mut self, value: U256) {
        match_envelope!(self, transaction => transaction.value = value);
    }

    pub fn input(&self) -> &Bytes {
        match_envelope!(self, transaction => &transaction.input)
    }

    pub fn set_input(&mut self, input: Bytes) {
        match_envelope!(self, transaction => transaction.input = input);
    }

    pub fn gas_limit(&self) -> &U256 {
        match_envelope!(self, transaction => &transaction.gas_limit)
    }

    pub fn set_gas_limit(&mut self, gas_limit: U256) {
        match_envelope!(self, transaction => transaction.gas_limit = gas_limit);
    }

    /// Returns the gas price, for envelopes that have one.
    pub fn gas_price(&self) -> Option<U256> {
        match self {
            Envelope::Legacy(transaction) => Some(transaction.gas_price),
            Envelope::Eip2930(transaction) => Some(transaction.gas_price),
            Envelope::Eip1559(_) => None,
        }
    }

    /// Sets the gas price. Ignored for EIP-1559 envelopes.
    pub fn set_gas_price(&mut self, gas_price: U256) {
        match self {
            Envelope::Legacy(transaction) => transaction.gas_price = gas_price,
            Envelope::Eip2930(transaction) => transaction.gas_price = gas_price,
            Envelope::Eip1559(_) => (),
        }
    }

    /// Returns the max fee per gas of an EIP-1559 envelope.
    pub fn max_fee_per_gas(&self) -> Option<U256> {
        match self {
            Envelope::Eip1559(transaction) => Some(transaction.max_fee_per_gas),
            Envelope::Legacy(_) | Envelope::Eip2930(_) => None,
        }
    }

    /// Sets the max fee per gas. Ignored for envelopes other than EIP-1559.
    pub fn set_max_fee_per_gas(&mut self, max_fee_per_gas: U256) {
        if let Envelope::Eip1559(transaction) = self {
            transaction.max_fee_per_gas = max_fee_per_gas;
        }
    }

    /// Returns the max priority fee per gas of an EIP-1559 envelope.
    pub fn max_priority_fee_per_gas(&self) -> Option<U256> {
        match self {
            Envelope::Eip1559(transaction) => Some(transaction.max_priority_fee_per_gas),
            Envelope::Legacy(_) | Envelope::Eip2930(_) => None,
        }
    }

    /// Sets the max priority fee per gas. Ignored for envelopes other than
    /// EIP-1559.
    pub fn set_max_priority_fee_per_gas(&mut self, max_priority_fee_per_gas: U256) {
        if let Envelope::Eip1559(transaction) = self {
            transaction.max_priority_fee_per_gas = max_priority_fee_per_gas;
        }
    }

    /// Returns the access list of a typed envelope.
    pub fn access_list(&self) -> Option<&AccessList> {
        match self {
            Envelope::Legacy(_) => None,
            Envelope::Eip2930(transaction) => Some(&transaction.access_list),
            Envelope::Eip1559(transaction) => Some(&transaction.access_list),
        }
    }

    /// Sets the access list. Ignored for legacy envelopes.
    pub fn set_access_list(&mut self, access_list: AccessList) {
        match self {
            Envelope::Legacy(_) => (),
            Envelope::Eip2930(transaction) => transaction.access_list = access_list,
            Envelope::Eip1559(transaction) => transaction.access_list = access_list,
        }
    }

    pub fn v(&self) -> &U256 {
        match_envelope!(self, transaction => &transaction.v)
    }

    pub fn r(&self) -> &U256 {
        match_envelope!(self, transaction => &transaction.r)
    }

    pub fn s(&self) -> &U256 {
        match_envelope!(self, transaction => &transaction.s)
    }

    /// Returns whether the envelope carries a signature.
    pub fn is_signed(&self) -> bool {
        match_envelope!(self, transaction => transaction.is_signed())
    }

    /// Returns the signature with a bare recovery ID, if there is a valid one.
    pub fn unmarshalled_signature(&self) -> Option<UnmarshalledSignature> {
        match_envelope!(self, transaction => transaction.unmarshalled_signature())
    }

    /// Applies a signature, encoding `v` for the envelope's type.
    pub fn set_unmarshalled_signature(&mut self, signature: &UnmarshalledSignature) {
        match_envelope!(self, transaction => transaction.set_unmarshalled_signature(signature));
    }

    /// Clears the signature.
    pub fn clear_signature(&mut self) {
        match_envelope!(self, transaction => transaction.clear_signature());
    }
}

impl From<Legacy> for Envelope {
    fn from(transaction: Legacy) -> Self {
        Self::Legacy(transaction)
    }
}

impl From<Eip2930> for Envelope {
    fn from(transaction: Eip2930) -> Self {
        Self::Eip2930(transaction)
    }
}

impl From<Eip1559> for Envelope {
    fn from(transaction: Eip1559) -> Self {
        Self::Eip1559(transaction)
    }
}

/// Returns the signature of a typed envelope, which must have a bare recovery
/// ID as `v`.
fn typed_signature(is_signed: bool, v: U256, r: U256, s: U256) -> Option<UnmarshalledSignature> {
    if !is_signed || v > U256::from(1) {
        return None;
    }

    Some(UnmarshalledSignature {
        v: u8::from(v == U256::from(1)),
        r: B256::from(r.to_be_bytes::<32>()),
        s: B256::from(s.to_be_bytes::<32>()),
    })
}

/// Returns the `(v, r, s)` values of a typed envelope.
fn typed_v(signature: &UnmarshalledSignature) -> (U256, U256, U256) {
    (
        U256::from(signature.v),
        U256::from_be_bytes(signature.r.0),
        U256::from_be_bytes(signature.s.0),
    )
}
