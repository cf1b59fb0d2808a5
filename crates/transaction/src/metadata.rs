use ethtx_primitives::{B256, U256};

use crate::rpc;

/// Node-provided information about a mined or pending transaction, which is
/// not part of the transaction itself.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TransactionMetadata {
    /// Hash of the block that includes the transaction
    pub block_hash: Option<B256>,
    /// Number of the block that includes the transaction
    pub block_number: Option<U256>,
    /// Index of the transaction within its block
    pub transaction_index: Option<U256>,
    /// Hash reported by the node
    pub transaction_hash: Option<B256>,
    /// Effective gas price reported by the node
    pub gas_price: Option<U256>,
}

impl TransactionMetadata {
    /// Extracts the metadata from a JSON transaction. Returns `None` when the
    /// node provided none of it.
    pub fn from_rpc(transaction: &rpc::Transaction) -> Option<Self> {
        let metadata = Self {
            block_hash: transaction.block_hash,
            block_number: transaction.block_number,
            transaction_index: transaction.transaction_index,
            transaction_hash: transaction.hash,
            gas_price: transaction.gas_price,
        };

        let has_location = metadata.block_hash.is_some()
            || metadata.block_number.is_some()
            || metadata.transaction_index.is_some()
            || metadata.transaction_hash.is_some();

        has_location.then_some(metadata)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn captures_node_fields() -> anyhow::Result<()> {
        let transaction: rpc::Transaction = serde_json::from_str(
            r#"{
                "blockHash": "0x1111111111111111111111111111111111111111111111111111111111111111",
                "blockNumber": "0x10",
                "transactionIndex": "0x2",
                "hash": "0x2222222222222222222222222222222222222222222222222222222222222222",
                "gasPrice": "0x3b9aca00"
            }"#,
        )?;

        let metadata = TransactionMetadata::from_rpc(&transaction).expect("metadata is present");
        assert_eq!(metadata.block_hash, Some(B256::repeat_byte(0x11)));
        assert_eq!(metadata.block_number, Some(U256::from(16)));
        assert_eq!(metadata.transaction_index, Some(U256::from(2)));
        assert_eq!(metadata.transaction_hash, Some(B256::repeat_byte(0x22)));
        assert_eq!(metadata.gas_price, Some(U256::from(1_000_000_000u64)));

        Ok(())
    }

    #[test]
    fn absent_without_location() {
        let transaction = rpc::Transaction {
            gas_price: Some(U256::from(1)),
            ..rpc::Transaction::default()
        };

        assert_eq!(TransactionMetadata::from_rpc(&transaction), None);
    }
}
