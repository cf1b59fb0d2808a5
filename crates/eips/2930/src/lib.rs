//! Types related to EIP-2930.

use alloy_rlp::{Error, RlpEncodable, RlpEncodableWrapper};
use ethtx_primitives::{ADDRESS_LENGTH, Address, B256, WORD_LENGTH};
use ethtx_rlp::Item;

/// An access list entry: an address and the storage slots the transaction
/// intends to touch in its account.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, RlpEncodable, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessListItem {
    // The order of these fields determines encoding order.
    /// Accessed address
    pub address: Address,
    /// Accessed storage keys
    pub storage_keys: Vec<B256>,
}

impl AccessListItem {
    /// Converts a decoded `[address, [storage_key, ...]]` item.
    ///
    /// The address must be exactly 20 bytes and every storage key exactly 32
    /// bytes.
    pub fn from_rlp(item: Item) -> Result<Self, Error> {
        let [address, storage_keys] = item.into_fields()?;

        let address = address.into_bytes()?;
        if address.len() != ADDRESS_LENGTH {
            return Err(Error::Custom("access list address must be 20 bytes"));
        }

        let storage_keys = storage_keys
            .into_list()?
            .into_iter()
            .map(|key| {
                let key = key.into_bytes()?;
                if key.len() == WORD_LENGTH {
                    Ok(B256::from_slice(&key))
                } else {
                    Err(Error::Custom("access list storage key must be 32 bytes"))
                }
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            address: Address::from_slice(&address),
            storage_keys,
        })
    }
}

/// Access list
// NB: Need to use `RlpEncodableWrapper` else we get an extra [] in the output
#[derive(
    Clone, Debug, Default, PartialEq, Eq, Hash, RlpEncodableWrapper, serde::Deserialize, serde::Serialize,
)]
#[serde(transparent)]
pub struct AccessList(pub Vec<AccessListItem>);

impl AccessList {
    /// Converts a decoded list of `[address, [storage_key, ...]]` items.
    pub fn from_rlp(item: Item) -> Result<Self, Error> {
        item.into_list()?
            .into_iter()
            .map(AccessListItem::from_rlp)
            .collect::<Result<Vec<_>, _>>()
            .map(AccessList)
    }

    /// Returns whether the access list has no entries.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<AccessListItem>> for AccessList {
    fn from(src: Vec<AccessListItem>) -> AccessList {
        AccessList(src)
    }
}

impl From<AccessList> for Vec<AccessListItem> {
    fn from(src: AccessList) -> Vec<AccessListItem> {
        src.0
    }
}
