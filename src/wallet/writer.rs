//! Signing contract handles for write actions
//!
//! Every method submits one transaction and waits for its receipt. A mined
//! transaction whose receipt reports failure is an error.

use alloy::contract::Error as ContractError;
use alloy::network::{Ethereum, ReceiptResponse};
use alloy::primitives::{Address, TxHash, U256};
use alloy::providers::{DynProvider, PendingTransactionBuilder};
use async_trait::async_trait;
use thiserror::Error;

use super::Asset;
use crate::config::ContractAddresses;
use crate::contracts::{IArubToken, IStableAsset, IStaking};

#[derive(Debug, Error)]
pub enum WriteError {
    #[error("{call} submission failed: {message}")]
    Submit { call: &'static str, message: String },

    #[error("{call} receipt unavailable: {message}")]
    Receipt { call: &'static str, message: String },

    #[error("{call} reverted in {tx}")]
    Reverted { call: &'static str, tx: TxHash },
}

/// Write surface of the token, stable-asset and staking contracts
#[async_trait]
pub trait ContractWriter: Send + Sync {
    /// ERC20 approve on the asset's contract
    async fn approve(&self, asset: Asset, spender: Address, amount: U256)
        -> Result<TxHash, WriteError>;

    /// Mint ARUB against a USDT amount
    async fn mint(&self, usdt_amount: U256) -> Result<TxHash, WriteError>;

    /// Burn ARUB back into USDT
    async fn burn(&self, token_amount: U256) -> Result<TxHash, WriteError>;

    async fn stake(&self, asset: Asset, amount: U256) -> Result<TxHash, WriteError>;

    /// Withdraw the whole stake of one asset
    async fn unstake(&self, asset: Asset) -> Result<TxHash, WriteError>;

    async fn claim_rewards(&self) -> Result<TxHash, WriteError>;

    /// Test USDT faucet
    async fn faucet(&self) -> Result<TxHash, WriteError>;
}

/// Contract writer over a wallet-enabled alloy provider
pub struct AlloyContractWriter {
    provider: DynProvider,
    contracts: ContractAddresses,
}

impl AlloyContractWriter {
    pub fn new(provider: DynProvider, contracts: ContractAddresses) -> Self {
        Self {
            provider,
            contracts,
        }
    }
}

async fn confirm(
    call: &'static str,
    sent: Result<PendingTransactionBuilder<Ethereum>, ContractError>,
) -> Result<TxHash, WriteError> {
    let pending = sent.map_err(|e| WriteError::Submit {
        call,
        message: e.to_string(),
    })?;

    tracing::debug!(call, tx = %pending.tx_hash(), "Transaction submitted, awaiting receipt");

    let receipt = pending.get_receipt().await.map_err(|e| WriteError::Receipt {
        call,
        message: e.to_string(),
    })?;

    let tx = receipt.transaction_hash();
    if !receipt.status() {
        return Err(WriteError::Reverted { call, tx });
    }

    tracing::info!(call, tx = %tx, "Transaction confirmed");
    Ok(tx)
}

#[async_trait]
impl ContractWriter for AlloyContractWriter {
    async fn approve(
        &self,
        asset: Asset,
        spender: Address,
        amount: U256,
    ) -> Result<TxHash, WriteError> {
        let sent = match asset {
            Asset::Usdt => {
                IStableAsset::new(self.contracts.usdt, &self.provider)
                    .approve(spender, amount)
                    .send()
                    .await
            }
            Asset::Arub => {
                IArubToken::new(self.contracts.arub, &self.provider)
                    .approve(spender, amount)
                    .send()
                    .await
            }
        };
        confirm("approve", sent).await
    }

    async fn mint(&self, usdt_amount: U256) -> Result<TxHash, WriteError> {
        let token = IArubToken::new(self.contracts.arub, &self.provider);
        confirm("mint", token.mint(usdt_amount).send().await).await
    }

    async fn burn(&self, token_amount: U256) -> Result<TxHash, WriteError> {
        let token = IArubToken::new(self.contracts.arub, &self.provider);
        confirm("burn", token.burn(token_amount).send().await).await
    }

    async fn stake(&self, asset: Asset, amount: U256) -> Result<TxHash, WriteError> {
        let staking = IStaking::new(self.contracts.staking, &self.provider);
        let token = self.contracts.asset(asset);
        confirm("stake", staking.stake(token, amount).send().await).await
    }

    async fn unstake(&self, asset: Asset) -> Result<TxHash, WriteError> {
        let staking = IStaking::new(self.contracts.staking, &self.provider);
        let token = self.contracts.asset(asset);
        confirm("unstake", staking.unstake(token).send().await).await
    }

    async fn claim_rewards(&self) -> Result<TxHash, WriteError> {
        let staking = IStaking::new(self.contracts.staking, &self.provider);
        confirm("claimRewards", staking.claimRewards().send().await).await
    }

    async fn faucet(&self) -> Result<TxHash, WriteError> {
        let usdt = IStableAsset::new(self.contracts.usdt, &self.provider);
        confirm("faucet", usdt.faucet().send().await).await
    }
}
