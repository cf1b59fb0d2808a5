//! Recursive Length Prefix (RLP) codec
//!
//! Encoding of byte strings and lists follows the canonical Ethereum rules.
//! Decoding produces an [`Item`] tree, which callers then map onto their
//! fixed-arity field lists.

mod item;

pub use alloy_rlp::{BufMut, EMPTY_LIST_CODE, EMPTY_STRING_CODE, Encodable, Error, Header, Result};

pub use self::item::{Item, MAX_DEPTH, decode, decode_prefix};

/// RLP-encodes a byte string.
///
/// A single byte below `0x80` is its own encoding. Every other string,
/// including the empty string, is prefixed with a string header.
pub fn encode_bytes(bytes: &[u8], out: &mut dyn BufMut) {
    match bytes {
        [byte] if *byte < EMPTY_STRING_CODE => out.put_u8(*byte),
        _ => {
            Header {
                list: false,
                payload_length: bytes.len(),
            }
            .encode(out);
            out.put_slice(bytes);
        }
    }
}

/// Returns the length of the RLP encoding of a byte string.
pub fn bytes_length(bytes: &[u8]) -> usize {
    match bytes {
        [byte] if *byte < EMPTY_STRING_CODE => 1,
        _ => alloy_rlp::length_of_length(bytes.len()) + bytes.len(),
    }
}

/// Concatenates already RLP-encoded items and prefixes them with a list
/// header.
pub fn encode_list<T: AsRef<[u8]>>(encoded_items: &[T], out: &mut dyn BufMut) {
    let payload_length = encoded_items.iter().map(|item| item.as_ref().len()).sum();
    Header {
        list: true,
        payload_length,
    }
    .encode(out);

    for item in encoded_items {
        out.put_slice(item.as_ref());
    }
}

/// RLP-encodes a heterogeneous field list.
pub fn encode_fields(fields: &[&dyn Encodable], out: &mut dyn BufMut) {
    Header {
        list: true,
        payload_length: fields_payload_length(fields),
    }
    .encode(out);

    for field in fields {
        field.encode(out);
    }
}

/// Returns the length of the RLP encoding of a heterogeneous field list.
pub fn fields_length(fields: &[&dyn Encodable]) -> usize {
    let payload_length = fields_payload_length(fields);
    alloy_rlp::length_of_length(payload_length) + payload_length
}

fn fields_payload_length(fields: &[&dyn Encodable]) -> usize {
    fields.iter().map(|field| field.length()).sum()
}
