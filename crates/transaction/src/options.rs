//! Caller-provided transaction options, as found in configuration files.

use ethtx_eip2930::AccessList;
use ethtx_primitives::{Address, TxKind, U256};

use crate::{Transaction, TransactionType};

/// How to determine a fee before sending a transaction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Policy {
    /// Ask the provider
    #[default]
    Automatic,
    /// Use the provided value
    Manual(U256),
}

impl Policy {
    /// Returns the value, if it was specified manually.
    pub fn manual(&self) -> Option<U256> {
        match self {
            Policy::Automatic => None,
            Policy::Manual(value) => Some(*value),
        }
    }
}

pub type FeePolicy = Policy;

/// How to determine the gas limit before sending a transaction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub enum GasLimitPolicy {
    /// Use the provider's estimate
    #[default]
    Automatic,
    /// Use the provided value
    Manual(U256),
    /// Use the provider's estimate, but no less than the provided value
    Limited(U256),
    /// Use the provider's estimate increased by the provided percentage
    WithMargin(u64),
}

impl GasLimitPolicy {
    /// Returns the value, if it was specified manually.
    pub fn manual(&self) -> Option<U256> {
        match self {
            GasLimitPolicy::Manual(value) => Some(*value),
            GasLimitPolicy::Automatic
            | GasLimitPolicy::Limited(_)
            | GasLimitPolicy::WithMargin(_) => None,
        }
    }

    /// Derives the gas limit from the provider's estimate.
    pub fn apply_to_estimate(&self, estimate: U256) -> U256 {
        match self {
            GasLimitPolicy::Automatic => estimate,
            GasLimitPolicy::Manual(value) => *value,
            GasLimitPolicy::Limited(limit) => estimate.max(*limit),
            GasLimitPolicy::WithMargin(percentage) => with_margin(estimate, *percentage),
        }
    }
}

/// How to determine the gas price before sending a transaction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub enum GasPricePolicy {
    /// Use the provider's suggestion
    #[default]
    Automatic,
    /// Use the provided value
    Manual(U256),
    /// Use the provider's suggestion increased by the provided percentage
    WithMargin(u64),
}

impl GasPricePolicy {
    /// Returns the value, if it was specified manually.
    pub fn manual(&self) -> Option<U256> {
        match self {
            GasPricePolicy::Manual(value) => Some(*value),
            GasPricePolicy::Automatic | GasPricePolicy::WithMargin(_) => None,
        }
    }

    /// Derives the gas price from the provider's suggestion.
    pub fn apply_to_suggestion(&self, suggestion: U256) -> U256 {
        match self {
            GasPricePolicy::Automatic => suggestion,
            GasPricePolicy::Manual(value) => *value,
            GasPricePolicy::WithMargin(percentage) => with_margin(suggestion, *percentage),
        }
    }
}

/// Increases the value by a percentage, rounding down and saturating at
/// `U256::MAX`.
fn with_margin(value: U256, percentage: u64) -> U256 {
    let margin = value.saturating_mul(U256::from(percentage)) / U256::from(100);
    value.saturating_add(margin)
}

/// How to determine the nonce before sending a transaction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub enum NoncePolicy {
    /// The sender's transaction count including pending transactions
    #[default]
    Pending,
    /// The sender's transaction count in the latest block
    Latest,
    /// Use the provided nonce
    Exact(U256),
}

/// Options that override fields of a transaction before it is sent.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TransactionOptions {
    /// The transaction type to migrate to
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub transaction_type: Option<TransactionType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<Address>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<Address>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chain_id: Option<U256>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<U256>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_list: Option<AccessList>,
    pub gas_limit: GasLimitPolicy,
    pub gas_price: GasPricePolicy,
    pub max_fee_per_gas: FeePolicy,
    pub max_priority_fee_per_gas: FeePolicy,
    pub nonce: NoncePolicy,
}

impl Transaction {
    /// Migrates the transaction to the requested type, then overrides every
    /// field that the options specify manually.
    ///
    /// Automatic policies are left for [`Transaction::resolve`].
    pub fn apply_options(&mut self, options: &TransactionOptions) {
        if let Some(transaction_type) = options.transaction_type {
            self.migrate(transaction_type);
        }

        if let Some(to) = options.to {
            self.set_kind(TxKind::Call(to));
        }
        if let Some(from) = options.from {
            self.set_from_address(Some(from));
        }
        if let Some(chain_id) = options.chain_id {
            self.set_chain_id(Some(chain_id));
        }
        if let Some(value) = options.value {
            self.set_value(value);
        }
        if let Some(access_list) = &options.access_list {
            self.set_access_list(access_list.clone());
        }

        if let Some(gas_limit) = options.gas_limit.manual() {
            self.set_gas_limit(gas_limit);
        }
        if let Some(gas_price) = options.gas_price.manual() {
            self.set_gas_price(gas_price);
        }
        if let Some(max_fee_per_gas) = options.max_fee_per_gas.manual() {
            self.set_max_fee_per_gas(max_fee_per_gas);
        }
        if let Some(max_priority_fee_per_gas) = options.max_priority_fee_per_gas.manual() {
            self.set_max_priority_fee_per_gas(max_priority_fee_per_gas);
        }
        if let NoncePolicy::Exact(nonce) = options.nonce {
            self.set_nonce(nonce);
        }
    }
}
