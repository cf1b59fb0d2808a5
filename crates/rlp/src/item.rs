use alloy_rlp::{BufMut, Encodable, Error, Header, Result};
use ethtx_primitives::{Bytes, U256};

/// Maximum nesting depth accepted by [`decode`].
pub const MAX_DEPTH: usize = 128;

/// A decoded RLP item: either a byte string or a list of items.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Item {
    /// Byte string
    Bytes(Bytes),
    /// List of items
    List(Vec<Item>),
}

impl Item {
    /// Returns the byte string, if the item is one.
    pub fn as_bytes(&self) -> Result<&Bytes> {
        match self {
            Item::Bytes(bytes) => Ok(bytes),
            Item::List(_) => Err(Error::UnexpectedList),
        }
    }

    /// Converts the item into its byte string, if it is one.
    pub fn into_bytes(self) -> Result<Bytes> {
        match self {
            Item::Bytes(bytes) => Ok(bytes),
            Item::List(_) => Err(Error::UnexpectedList),
        }
    }

    /// Converts the item into its list, if it is one.
    pub fn into_list(self) -> Result<Vec<Item>> {
        match self {
            Item::Bytes(_) => Err(Error::UnexpectedString),
            Item::List(items) => Ok(items),
        }
    }

    /// Converts the item into a list of exactly `N` items.
    pub fn into_fields<const N: usize>(self) -> Result<[Item; N]> {
        let items = self.into_list()?;
        let got = items.len();

        <[Item; N]>::try_from(items).map_err(|_items| Error::ListLengthMismatch { expected: N, got })
    }

    /// Interprets the byte string as a canonical big-endian unsigned integer.
    pub fn to_u256(&self) -> Result<U256> {
        let bytes = self.as_bytes()?;
        match bytes.first() {
            None => Ok(U256::ZERO),
            Some(0) => Err(Error::LeadingZero),
            Some(_) => U256::try_from_be_slice(bytes).ok_or(Error::Overflow),
        }
    }
}

impl Encodable for Item {
    fn encode(&self, out: &mut dyn BufMut) {
        match self {
            Item::Bytes(bytes) => crate::encode_bytes(bytes, out),
            Item::List(items) => {
                Header {
                    list: true,
                    payload_length: list_payload_length(items),
                }
                .encode(out);

                for item in items {
                    item.encode(out);
                }
            }
        }
    }

    fn length(&self) -> usize {
        match self {
            Item::Bytes(bytes) => crate::bytes_length(bytes),
            Item::List(items) => {
                let payload_length = list_payload_length(items);
                alloy_rlp::length_of_length(payload_length) + payload_length
            }
        }
    }
}

impl From<Bytes> for Item {
    fn from(value: Bytes) -> Self {
        Item::Bytes(value)
    }
}

impl From<Vec<Item>> for Item {
    fn from(value: Vec<Item>) -> Self {
        Item::List(value)
    }
}

fn list_payload_length(items: &[Item]) -> usize {
    items.iter().map(Encodable::length).sum()
}

/// Decodes a single item that must span the entire input.
pub fn decode(bytes: &[u8]) -> Result<Item> {
    let mut buf = bytes;
    let item = decode_prefix(&mut buf)?;

    if buf.is_empty() {
        Ok(item)
    } else {
        Err(Error::Custom("trailing bytes after RLP item"))
    }
}

/// Decodes the first item of the buffer and advances past it.
pub fn decode_prefix(buf: &mut &[u8]) -> Result<Item> {
    decode_at_depth(buf, 0)
}

fn decode_at_depth(buf: &mut &[u8], depth: usize) -> Result<Item> {
    if depth >= MAX_DEPTH {
        return Err(Error::Custom("maximum RLP nesting depth exceeded"));
    }

    // For a single byte below 0x80 the header does not advance the buffer, so
    // the payload is the byte itself.
    let header = Header::decode(buf)?;
    let (mut payload, rest) = buf
        .split_at_checked(header.payload_length)
        .ok_or(Error::InputTooShort)?;
    *buf = rest;

    if header.list {
        let mut items = Vec::new();
        while !payload.is_empty() {
            items.push(decode_at_depth(&mut payload, depth + 1)?);
        }

        Ok(Item::List(items))
    } else {
        Ok(Item::Bytes(Bytes::copy_from_slice(payload)))
    }
}
