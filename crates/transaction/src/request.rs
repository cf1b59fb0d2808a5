//! JSON-RPC request bodies for submitting transactions.

use core::sync::atomic::{AtomicU64, Ordering};

use ethtx_primitives::Bytes;

use crate::{EncodeType, Transaction};

/// Produces increasing JSON-RPC request IDs, starting at 1.
///
/// Can be shared by reference across threads.
#[derive(Debug)]
pub struct RequestIdCounter {
    next_id: AtomicU64,
}

impl RequestIdCounter {
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
        }
    }

    /// Returns the next request ID.
    pub fn next_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }
}

impl Default for RequestIdCounter {
    fn default() -> Self {
        Self::new()
    }
}

/// JSON-RPC protocol version
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
pub enum Version {
    #[serde(rename = "2.0")]
    V2_0,
}

/// A JSON-RPC request.
#[derive(Clone, Debug, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
pub struct JsonRpcRequest<ParamsT> {
    #[serde(rename = "jsonrpc")]
    pub version: Version,
    pub id: u64,
    pub method: String,
    pub params: ParamsT,
}

/// Builds an `eth_sendRawTransaction` request for the transaction.
pub fn send_raw_transaction_request(
    transaction: &Transaction,
    counter: &RequestIdCounter,
) -> JsonRpcRequest<[Bytes; 1]> {
    JsonRpcRequest {
        version: Version::V2_0,
        id: counter.next_id(),
        method: "eth_sendRawTransaction".to_string(),
        params: [transaction.encode(EncodeType::Transaction)],
    }
}
