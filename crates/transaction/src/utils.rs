use alloy_rlp::{BufMut, Encodable};
use ethtx_primitives::{ADDRESS_LENGTH, Address, TxKind};
use ethtx_rlp::Item;

use crate::{DecodeError, TransactionType};

/// RLP-encodes the provided fields as a list and prepends it with the provided
/// ID.
pub fn enveloped(id: u8, fields: &[&dyn Encodable], out: &mut dyn BufMut) {
    out.put_u8(id);
    ethtx_rlp::encode_fields(fields, out);
}

/// Strips the type byte of a typed transaction, checking that it matches.
pub fn strip_type_byte(raw: &[u8], expected: TransactionType) -> Result<&[u8], DecodeError> {
    let (&found, payload) = raw.split_first().ok_or(DecodeError::EmptyInput)?;

    if Some(found) == expected.type_byte() {
        Ok(payload)
    } else {
        Err(DecodeError::TypeMismatch { expected, found })
    }
}

/// Converts the `to` field: 20 bytes for a call, empty for contract creation.
pub fn decode_kind(item: &Item) -> Result<TxKind, DecodeError> {
    let bytes = item.as_bytes()?;
    match bytes.len() {
        0 => Ok(TxKind::Create),
        ADDRESS_LENGTH => Ok(TxKind::Call(Address::from_slice(bytes))),
        length => Err(DecodeError::InvalidRecipientLength(length)),
    }
}
