use core::fmt;

use ethtx_eip2930::AccessList;
use ethtx_primitives::{Address, B256, Bytes, TxKind, U256};
use ethtx_signer::{
    MAX_SIGNING_ATTEMPTS, UncompressedPublicKey, constant_time_eq, private_to_public,
    public_to_address, sign_for_recovery,
};

use crate::{
    ConversionError, DecodeError, EncodeType, SignError, TransactionMetadata, TransactionType,
    envelope::{Envelope, EnvelopeParts},
    factory, rpc,
};

/// A transaction of any supported type.
///
/// The sender is never stored. It is recovered from the signature on demand.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transaction {
    envelope: Envelope,
    metadata: Option<TransactionMetadata>,
    from: Option<Address>,
}

impl Transaction {
    /// Constructs an unsigned transaction of the provided type.
    pub fn new(transaction_type: TransactionType, parts: EnvelopeParts) -> Self {
        Self::from(factory::from_parts(transaction_type, parts))
    }

    /// Decodes a transaction from its raw bytes.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all))]
    pub fn decode(raw: &[u8]) -> Result<Self, DecodeError> {
        factory::from_raw(raw).map(Self::from)
    }

    /// Parses a node-shaped JSON transaction, capturing its metadata.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Returns the envelope.
    pub fn envelope(&self) -> &Envelope {
        &self.envelope
    }

    /// Returns the node-provided metadata, if the transaction was parsed from
    /// a node response.
    pub fn metadata(&self) -> Option<&TransactionMetadata> {
        self.metadata.as_ref()
    }

    /// Returns the explicitly set sender address.
    ///
    /// This is used to resolve the nonce before signing. For the address that
    /// signed the transaction, see [`Transaction::sender`].
    pub fn from_address(&self) -> Option<&Address> {
        self.from.as_ref()
    }

    pub fn set_from_address(&mut self, from: Option<Address>) {
        self.from = from;
    }

    pub fn transaction_type(&self) -> TransactionType {
        self.envelope.transaction_type()
    }

    pub fn chain_id(&self) -> Option<U256> {
        self.envelope.chain_id()
    }

    pub fn set_chain_id(&mut self, chain_id: Option<U256>) {
        self.envelope.set_chain_id(chain_id);
    }

    pub fn nonce(&self) -> &U256 {
        self.envelope.nonce()
    }

    pub fn set_nonce(&mut self, nonce: U256) {
        self.envelope.set_nonce(nonce);
    }

    pub fn kind(&self) -> &TxKind {
        self.envelope.kind()
    }

    pub fn set_kind(&mut self, kind: TxKind) {
        self.envelope.set_kind(kind);
    }

    /// Returns the recipient, or `None` for contract creation.
    pub fn to(&self) -> Option<&Address> {
        match self.envelope.kind() {
            TxKind::Call(address) => Some(address),
            TxKind::Create => None,
        }
    }

    pub fn value(&self) -> &U256 {
        self.envelope.value()
    }

    pub fn set_value(&mut self, value: U256) {
        self.envelope.set_value(value);
    }

    pub fn input(&self) -> &Bytes {
        self.envelope.input()
    }

    pub fn set_input(&mut self, input: Bytes) {
        self.envelope.set_input(input);
    }

    pub fn gas_limit(&self) -> &U256 {
        self.envelope.gas_limit()
    }

    pub fn set_gas_limit(&mut self, gas_limit: U256) {
        self.envelope.set_gas_limit(gas_limit);
    }

    pub fn gas_price(&self) -> Option<U256> {
        self.envelope.gas_price()
    }

    pub fn set_gas_price(&mut self, gas_price: U256) {
        self.envelope.set_gas_price(gas_price);
    }

    pub fn max_fee_per_gas(&self) -> Option<U256> {
        self.envelope.max_fee_per_gas()
    }

    pub fn set_max_fee_per_gas(&mut self, max_fee_per_gas: U256) {
        self.envelope.set_max_fee_per_gas(max_fee_per_gas);
    }

    pub fn max_priority_fee_per_gas(&self) -> Option<U256> {
        self.envelope.max_priority_fee_per_gas()
    }

    pub fn set_max_priority_fee_per_gas(&mut self, max_priority_fee_per_gas: U256) {
        self.envelope
            .set_max_priority_fee_per_gas(max_priority_fee_per_gas);
    }

    pub fn access_list(&self) -> Option<&AccessList> {
        self.envelope.access_list()
    }

    pub fn set_access_list(&mut self, access_list: AccessList) {
        self.envelope.set_access_list(access_list);
    }

    pub fn v(&self) -> &U256 {
        self.envelope.v()
    }

    pub fn r(&self) -> &U256 {
        self.envelope.r()
    }

    pub fn s(&self) -> &U256 {
        self.envelope.s()
    }

    /// Returns whether the transaction carries a signature.
    pub fn is_signed(&self) -> bool {
        self.envelope.is_signed()
    }

    /// Encodes the transaction for the provided purpose.
    pub fn encode(&self, encode_type: EncodeType) -> Bytes {
        self.envelope.encode(encode_type)
    }

    /// Returns the transaction hash.
    pub fn hash(&self) -> B256 {
        ethtx_primitives::keccak256(self.encode(EncodeType::Transaction))
    }

    /// Returns the hash that is signed.
    pub fn hash_for_signature(&self) -> B256 {
        self.envelope.signature_hash()
    }

    /// Signs the transaction.
    ///
    /// Each attempt applies a fresh signature and checks, in constant time,
    /// that the public key recovered from the transaction matches the secret
    /// key's. After [`MAX_SIGNING_ATTEMPTS`] failed checks the signature is
    /// cleared and [`SignError::InvalidAccount`] is returned.
    ///
    /// Signing cannot be cancelled. Callers that need a timeout should sign
    /// on a worker thread.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all))]
    pub fn sign(&mut self, secret_key: &[u8], use_extra_entropy: bool) -> Result<(), SignError> {
        let expected_public_key = private_to_public(secret_key)?;

        for attempt in 1..=MAX_SIGNING_ATTEMPTS {
            let hash = self.hash_for_signature();
            let signature = sign_for_recovery(&hash, secret_key, use_extra_entropy)?;
            self.envelope
                .set_unmarshalled_signature(&signature.unmarshal());

            if self
                .recover_public_key()
                .is_some_and(|public_key| constant_time_eq(&public_key, &expected_public_key))
            {
                log::trace!("Signed transaction after {attempt} attempt(s)");
                return Ok(());
            }

            log::warn!("Signing attempt {attempt} does not recover to the signing account");
        }

        self.envelope.clear_signature();
        Err(SignError::InvalidAccount)
    }

    /// Removes the signature.
    pub fn unsign(&mut self) {
        self.envelope.clear_signature();
    }

    /// Converts the transaction to another type.
    ///
    /// Converting to the same type does nothing. Otherwise the result is
    /// unsigned and carries over the common fields and the fees that are
    /// meaningful for the new type.
    pub fn migrate(&mut self, transaction_type: TransactionType) {
        if self.transaction_type() == transaction_type {
            return;
        }

        log::debug!(
            "Migrating {} transaction to {transaction_type}",
            self.transaction_type()
        );
        self.envelope = factory::from_parts(transaction_type, self.envelope.parts());
    }

    /// Recovers the public key of the signer.
    pub fn recover_public_key(&self) -> Option<UncompressedPublicKey> {
        let signature = self.envelope.unmarshalled_signature()?;

        signature
            .recover_public_key(&self.hash_for_signature())
            .ok()
    }

    /// Recovers the address of the signer.
    pub fn sender(&self) -> Option<Address> {
        self.recover_public_key()
            .map(|public_key| public_to_address(&public_key))
    }

    /// Returns the transaction as an RPC request object.
    pub fn to_request(&self) -> rpc::TransactionRequest {
        let non_zero = |value: U256| (!value.is_zero()).then_some(value);
        let is_typed = self.transaction_type() != TransactionType::Legacy;

        rpc::TransactionRequest {
            transaction_type: is_typed.then(|| self.transaction_type()),
            chain_id: if is_typed {
                self.chain_id().and_then(non_zero)
            } else {
                None
            },
            nonce: *self.nonce(),
            from: self.from,
            to: self.to().copied(),
            value: *self.value(),
            data: self.input().clone(),
            gas: non_zero(*self.gas_limit()),
            gas_price: self.gas_price().and_then(non_zero),
            max_fee_per_gas: self.max_fee_per_gas().and_then(non_zero),
            max_priority_fee_per_gas: self.max_priority_fee_per_gas().and_then(non_zero),
            access_list: self
                .access_list()
                .filter(|access_list| !access_list.is_empty())
                .cloned(),
        }
    }
}

impl From<Envelope> for Transaction {
    fn from(envelope: Envelope) -> Self {
        Self {
            envelope,
            metadata: None,
            from: None,
        }
    }
}

impl TryFrom<rpc::Transaction> for Transaction {
    type Error = ConversionError;

    fn try_from(value: rpc::Transaction) -> Result<Self, Self::Error> {
        let metadata = TransactionMetadata::from_rpc(&value);
        let from = value.from;
        let envelope = factory::from_rpc(value)?;

        Ok(Self {
            envelope,
            metadata,
            from,
        })
    }
}

impl<'de> serde::Deserialize<'de> for Transaction {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = rpc::Transaction::deserialize(deserializer)?;
        Self::try_from(value).map_err(serde::de::Error::custom)
    }
}

impl serde::Serialize for Transaction {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.to_request().serialize(serializer)
    }
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Transaction")?;
        writeln!(f, "type: {}", self.transaction_type())?;
        match self.chain_id() {
            Some(chain_id) => writeln!(f, "chainID: {chain_id}")?,
            None => writeln!(f, "chainID: none")?,
        }
        writeln!(f, "nonce: {}", self.nonce())?;
        match self.to() {
            Some(to) => writeln!(f, "to: {to}")?,
            None => writeln!(f, "to: contract creation")?,
        }
        writeln!(f, "value: {}", self.value())?;
        writeln!(f, "data: {}", self.input())?;
        writeln!(f, "gasLimit: {}", self.gas_limit())?;
        if let Some(gas_price) = self.gas_price() {
            writeln!(f, "gasPrice: {gas_price}")?;
        }
        if let Some(max_fee_per_gas) = self.max_fee_per_gas() {
            writeln!(f, "maxFeePerGas: {max_fee_per_gas}")?;
        }
        if let Some(max_priority_fee_per_gas) = self.max_priority_fee_per_gas() {
            writeln!(f, "maxPriorityFeePerGas: {max_priority_fee_per_gas}")?;
        }
        if let Some(access_list) = self.access_list() {
            writeln!(f, "accessList: {} entries", access_list.0.len())?;
        }
        writeln!(f, "v: {}", self.v())?;
        writeln!(f, "r: {}", self.r())?;
        writeln!(f, "s: {}", self.s())?;
        match self.sender() {
            Some(sender) => writeln!(f, "from: {sender}")?,
            None => writeln!(f, "from: unknown")?,
        }
        writeln!(f, "hash: {}", self.hash())
    }
}
