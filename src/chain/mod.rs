//! Read-only access to the token, stable-asset and staking contracts
//!
//! Every read is independently fallible so the aggregator can apply a
//! field-level fallback without losing the other fields.

mod rpc;

pub use rpc::RpcChainReader;

use alloy::primitives::Address;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReadError {
    #[error("No RPC endpoint reachable: {0}")]
    ProviderUnavailable(String),

    #[error("{call} failed: {message}")]
    Call { call: &'static str, message: String },
}

impl ReadError {
    pub(crate) fn call(call: &'static str, err: impl std::fmt::Display) -> Self {
        Self::Call {
            call,
            message: err.to_string(),
        }
    }
}

/// Per-user stake record, amounts in display units
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct StakeRecord {
    pub stable_amount: f64,
    pub token_amount: f64,
    /// Unix seconds of the latest stake, 0 if never staked
    pub staked_at: u64,
    /// Unix seconds of the latest reward claim
    pub last_claim_at: u64,
}

/// Chain reads consumed by the statistics aggregator and position refresh.
///
/// Amounts are returned in display units (raw value / 10^decimals).
#[async_trait]
pub trait ChainReader: Send + Sync {
    /// ARUB total supply
    async fn total_supply(&self) -> Result<f64, ReadError>;

    /// ARUB price in USDT as reported by the token contract
    async fn current_price(&self) -> Result<f64, ReadError>;

    /// Total USDT held by the staking contract
    async fn total_staked_stable(&self) -> Result<f64, ReadError>;

    /// Total ARUB held by the staking contract
    async fn total_staked_token(&self) -> Result<f64, ReadError>;

    /// Stake record for one account
    async fn user_stake(&self, account: Address) -> Result<StakeRecord, ReadError>;
}
