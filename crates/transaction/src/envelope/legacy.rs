use alloy_rlp::{BufMut, Encodable};
use ethtx_primitives::{B256, Bytes, TxKind, U256};
use ethtx_signer::UnmarshalledSignature;

use crate::{ConversionError, DecodeError, EncodeType, TransactionType, rpc, utils::decode_kind};

const PRE_EIP155_V_OFFSET: u64 = 27;
const EIP155_V_OFFSET: u64 = 35;

/// An untyped transaction, optionally bound to a chain ID through EIP-155.
#[derive(Clone, Debug, Eq)]
pub struct Legacy {
    // The order of these fields determines encoding order.
    pub nonce: U256,
    pub gas_price: U256,
    pub gas_limit: U256,
    pub kind: TxKind,
    pub value: U256,
    pub input: Bytes,
    pub v: U256,
    pub r: U256,
    pub s: U256,
    /// Chain ID set before signing. It has no field on the wire.
    pub explicit_chain_id: Option<U256>,
}

impl Legacy {
    /// Returns the chain ID the transaction is bound to.
    ///
    /// A non-zero explicit chain ID takes precedence over the one inferred
    /// from `v`.
    pub fn chain_id(&self) -> Option<U256> {
        self.explicit_chain_id
            .filter(|chain_id| !chain_id.is_zero())
            .or_else(|| self.inferred_chain_id())
    }

    /// Infers the chain ID from `v`, following EIP-155.
    pub fn inferred_chain_id(&self) -> Option<U256> {
        let offset = U256::from(EIP155_V_OFFSET);
        (self.v >= offset).then(|| (self.v - offset) / U256::from(2))
    }

    /// Returns whether the transaction carries a signature.
    pub fn is_signed(&self) -> bool {
        !(self.r.is_zero() && self.s.is_zero())
    }

    /// RLP-encodes the transaction for the provided purpose.
    pub fn encode(&self, encode_type: EncodeType, out: &mut dyn BufMut) {
        match encode_type {
            EncodeType::Transaction => ethtx_rlp::encode_fields(
                &[
                    &self.nonce,
                    &self.gas_price,
                    &self.gas_limit,
                    &self.kind,
                    &self.value,
                    &self.input,
                    &self.v,
                    &self.r,
                    &self.s,
                ],
                out,
            ),
            EncodeType::Signature => {
                let mut fields: Vec<&dyn Encodable> = vec![
                    &self.nonce,
                    &self.gas_price,
                    &self.gas_limit,
                    &self.kind,
                    &self.value,
                    &self.input,
                ];

                let chain_id = self.chain_id();
                if let Some(chain_id) = &chain_id {
                    fields.extend([chain_id as &dyn Encodable, &U256::ZERO, &U256::ZERO]);
                }

                ethtx_rlp::encode_fields(&fields, out);
            }
        }
    }

    /// Decodes an RLP-encoded legacy transaction.
    pub fn decode(raw: &[u8]) -> Result<Self, DecodeError> {
        let [nonce, gas_price, gas_limit, to, value, input, v, r, s] =
            ethtx_rlp::decode(raw)?.into_fields()?;

        Ok(Self {
            nonce: nonce.to_u256()?,
            gas_price: gas_price.to_u256()?,
            gas_limit: gas_limit.to_u256()?,
            kind: decode_kind(&to)?,
            value: value.to_u256()?,
            input: input.into_bytes()?,
            v: v.to_u256()?,
            r: r.to_u256()?,
            s: s.to_u256()?,
            explicit_chain_id: None,
        })
    }

    /// Returns the signature with a bare recovery ID, if the transaction is
    /// signed and `v` is a valid pre- or post-EIP-155 value.
    pub fn unmarshalled_signature(&self) -> Option<UnmarshalledSignature> {
        if !self.is_signed() {
            return None;
        }

        let offset = if self.v == U256::from(PRE_EIP155_V_OFFSET)
            || self.v == U256::from(PRE_EIP155_V_OFFSET + 1)
        {
            PRE_EIP155_V_OFFSET
        } else if self.v >= U256::from(EIP155_V_OFFSET) {
            EIP155_V_OFFSET
        } else {
            return None;
        };

        let recovery_id = (self.v - U256::from(offset)) % U256::from(2);

        Some(UnmarshalledSignature {
            v: u8::from(recovery_id == U256::from(1)),
            r: B256::from(self.r.to_be_bytes::<32>()),
            s: B256::from(self.s.to_be_bytes::<32>()),
        })
    }

    /// Applies a signature, encoding the recovery ID and chain ID into `v`.
    pub fn set_unmarshalled_signature(&mut self, signature: &UnmarshalledSignature) {
        // Resolved before `v` changes, as `v` may be what binds the chain ID.
        let chain_id = self.chain_id();
        let recovery_id = U256::from(signature.v);

        self.v = match chain_id {
            Some(chain_id) => chain_id
                .saturating_mul(U256::from(2))
                .saturating_add(U256::from(EIP155_V_OFFSET) + recovery_id),
            None => U256::from(PRE_EIP155_V_OFFSET) + recovery_id,
        };
        self.r = U256::from_be_bytes(signature.r.0);
        self.s = U256::from_be_bytes(signature.s.0);
    }

    /// Clears the signature, keeping the chain ID bound.
    pub fn clear_signature(&mut self) {
        if self.explicit_chain_id.is_none() {
            self.explicit_chain_id = self.inferred_chain_id();
        }

        self.v = U256::from(1);
        self.r = U256::ZERO;
        self.s = U256::ZERO;
    }
}

impl PartialEq for Legacy {
    fn eq(&self, other: &Self) -> bool {
        self.nonce == other.nonce
            && self.gas_price == other.gas_price
            && self.gas_limit == other.gas_limit
            && self.kind == other.kind
            && self.value == other.value
            && self.input == other.input
            && self.v == other.v
            && self.r == other.r
            && self.s == other.s
            && self.chain_id() == other.chain_id()
    }
}

impl TryFrom<rpc::Transaction> for Legacy {
    type Error = ConversionError;

    fn try_from(value: rpc::Transaction) -> Result<Self, Self::Error> {
        value.expect_type(TransactionType::Legacy)?;
        let common = value.common_fields()?;

        Ok(Self {
            nonce: common.nonce,
            gas_price: value.gas_price.unwrap_or_default(),
            gas_limit: common.gas_limit,
            kind: common.kind,
            value: common.value,
            input: common.input,
            v: common.v,
            r: common.r,
            s: common.s,
            explicit_chain_id: value.chain_id,
        })
    }
}
