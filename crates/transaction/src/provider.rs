//! Resolution of automatic transaction options against a node.

use auto_impl::auto_impl;
use ethtx_primitives::{Address, U256};

use crate::{NoncePolicy, Transaction, TransactionOptions, TransactionType};

/// A block to query state at.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockTag {
    Earliest,
    #[default]
    Latest,
    Pending,
}

/// Trait for querying the values that automatic policies resolve to.
#[auto_impl(&, Box, Arc)]
pub trait Provider {
    /// The provider's error type
    type Error;

    /// Estimates the gas the transaction needs.
    fn estimate_gas(&self, transaction: &Transaction, block: BlockTag)
    -> Result<U256, Self::Error>;

    /// Returns the suggested gas price for transactions without EIP-1559 fees.
    fn gas_price(&self) -> Result<U256, Self::Error>;

    /// Returns the suggested max fee per gas.
    fn max_fee_per_gas(&self) -> Result<U256, Self::Error>;

    /// Returns the suggested max priority fee per gas.
    fn max_priority_fee_per_gas(&self) -> Result<U256, Self::Error>;

    /// Returns the number of transactions sent by the address.
    fn transaction_count(&self, address: Address, block: BlockTag) -> Result<U256, Self::Error>;
}

/// An error that occurred while resolving transaction options.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError<ProviderErrorT> {
    /// The nonce must be queried, but neither `from` nor a signature
    /// identifies the sender.
    #[error("Cannot resolve the nonce without a sender")]
    MissingSender,
    /// The provider failed.
    #[error(transparent)]
    Provider(ProviderErrorT),
}

impl Transaction {
    /// Resolves the nonce, gas limit and fees using the provided policies.
    ///
    /// The nonce is resolved first, as gas estimation may depend on it. Fees
    /// are resolved for the fee fields of the transaction's type.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all))]
    pub fn resolve<ProviderT: Provider>(
        &mut self,
        provider: &ProviderT,
        options: &TransactionOptions,
    ) -> Result<(), ResolveError<ProviderT::Error>> {
        let nonce = match options.nonce {
            NoncePolicy::Exact(nonce) => nonce,
            NoncePolicy::Latest | NoncePolicy::Pending => {
                let sender = self
                    .from_address()
                    .copied()
                    .or_else(|| self.sender())
                    .ok_or(ResolveError::MissingSender)?;

                let block = if options.nonce == NoncePolicy::Latest {
                    BlockTag::Latest
                } else {
                    BlockTag::Pending
                };

                provider
                    .transaction_count(sender, block)
                    .map_err(ResolveError::Provider)?
            }
        };
        self.set_nonce(nonce);

        let gas_limit = match options.gas_limit.manual() {
            Some(gas_limit) => gas_limit,
            None => {
                let estimate = provider
                    .estimate_gas(self, BlockTag::Latest)
                    .map_err(ResolveError::Provider)?;

                options.gas_limit.apply_to_estimate(estimate)
            }
        };
        self.set_gas_limit(gas_limit);

        if self.transaction_type() == TransactionType::Eip1559 {
            let max_fee_per_gas = match options.max_fee_per_gas.manual() {
                Some(max_fee_per_gas) => max_fee_per_gas,
                None => provider.max_fee_per_gas().map_err(ResolveError::Provider)?,
            };
            self.set_max_fee_per_gas(max_fee_per_gas);

            let max_priority_fee_per_gas = match options.max_priority_fee_per_gas.manual() {
                Some(max_priority_fee_per_gas) => max_priority_fee_per_gas,
                None => provider
                    .max_priority_fee_per_gas()
                    .map_err(ResolveError::Provider)?,
            };
            self.set_max_priority_fee_per_gas(max_priority_fee_per_gas);
        } else {
            let gas_price = match options.gas_price.manual() {
                Some(gas_price) => gas_price,
                None => {
                    let suggestion = provider.gas_price().map_err(ResolveError::Provider)?;
                    options.gas_price.apply_to_suggestion(suggestion)
                }
            };
            self.set_gas_price(gas_price);
        }

        log::debug!(
            "Resolved {} transaction with nonce {nonce} and gas limit {gas_limit}",
            self.transaction_type()
        );

        Ok(())
    }
}
