use alloy_rlp::BufMut;
use ethtx_eip2930::AccessList;
use ethtx_primitives::{Bytes, TxKind, U256};
use ethtx_signer::UnmarshalledSignature;

use super::{typed_signature, typed_v};
use crate::{
    ConversionError, DecodeError, EncodeType, TransactionType, rpc,
    utils::{decode_kind, enveloped, strip_type_byte},
};

/// An EIP-1559 dynamic fee transaction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Eip1559 {
    // The order of these fields determines encoding order.
    pub chain_id: U256,
    pub nonce: U256,
    pub max_priority_fee_per_gas: U256,
    pub max_fee_per_gas: U256,
    pub gas_limit: U256,
    pub kind: TxKind,
    pub value: U256,
    pub input: Bytes,
    pub access_list: AccessList,
    pub v: U256,
    pub r: U256,
    pub s: U256,
}

impl Eip1559 {
    /// The type identifier for an EIP-1559 transaction.
    pub const TYPE: u8 = TransactionType::Eip1559 as u8;

    /// Returns whether the transaction carries a signature.
    pub fn is_signed(&self) -> bool {
        !(self.r.is_zero() && self.s.is_zero())
    }

    /// Encodes the transaction for the provided purpose, prefixed by its type
    /// byte.
    pub fn encode(&self, encode_type: EncodeType, out: &mut dyn BufMut) {
        match encode_type {
            EncodeType::Transaction => enveloped(
                Self::TYPE,
                &[
                    &self.chain_id,
                    &self.nonce,
                    &self.max_priority_fee_per_gas,
                    &self.max_fee_per_gas,
                    &self.gas_limit,
                    &self.kind,
                    &self.value,
                    &self.input,
                    &self.access_list,
                    &self.v,
                    &self.r,
                    &self.s,
                ],
                out,
            ),
            EncodeType::Signature => enveloped(
                Self::TYPE,
                &[
                    &self.chain_id,
                    &self.nonce,
                    &self.max_priority_fee_per_gas,
                    &self.max_fee_per_gas,
                    &self.gas_limit,
                    &self.kind,
                    &self.value,
                    &self.input,
                    &self.access_list,
                ],
                out,
            ),
        }
    }

    /// Decodes a type-prefixed EIP-1559 transaction.
    pub fn decode(raw: &[u8]) -> Result<Self, DecodeError> {
        let payload = strip_type_byte(raw, TransactionType::Eip1559)?;
        let [
            chain_id,
            nonce,
            max_priority_fee_per_gas,
            max_fee_per_gas,
            gas_limit,
            to,
            value,
            input,
            access_list,
            v,
            r,
            s,
        ] = ethtx_rlp::decode(payload)?.into_fields()?;

        Ok(Self {
            chain_id: chain_id.to_u256()?,
            nonce: nonce.to_u256()?,
            max_priority_fee_per_gas: max_priority_fee_per_gas.to_u256()?,
            max_fee_per_gas: max_fee_per_gas.to_u256()?,
            gas_limit: gas_limit.to_u256()?,
            kind: decode_kind(&to)?,
            value: value.to_u256()?,
            input: input.into_bytes()?,
            access_list: AccessList::from_rlp(access_list)?,
            v: v.to_u256()?,
            r: r.to_u256()?,
            s: s.to_u256()?,
        })
    }

    /// Returns the signature, if the transaction is signed and `v` is a bare
    /// recovery ID.
    pub fn unmarshalled_signature(&self) -> Option<UnmarshalledSignature> {
        typed_signature(self.is_signed(), self.v, self.r, self.s)
    }

    /// Applies a signature. `v` is the bare recovery ID.
    pub fn set_unmarshalled_signature(&mut self, signature: &UnmarshalledSignature) {
        (self.v, self.r, self.s) = typed_v(signature);
    }

    /// Clears the signature.
    pub fn clear_signature(&mut self) {
        self.v = U256::from(1);
        self.r = U256::ZERO;
        self.s = U256::ZERO;
    }
}

impl TryFrom<rpc::Transaction> for Eip1559 {
    type Error = ConversionError;

    fn try_from(value: rpc::Transaction) -> Result<Self, Self::Error> {
        value.expect_type(TransactionType::Eip1559)?;
        let common = value.common_fields()?;

        Ok(Self {
            chain_id: rpc::required(value.chain_id, "chainId")?,
            nonce: common.nonce,
            max_priority_fee_per_gas: value.max_priority_fee_per_gas.unwrap_or_default(),
            max_fee_per_gas: value.max_fee_per_gas.unwrap_or_default(),
            gas_limit: common.gas_limit,
            kind: common.kind,
            value: common.value,
            input: common.input,
            access_list: value.access_list.unwrap_or_default(),
            v: common.v,
            r: common.r,
            s: common.s,
        })
    }
}
