//! Write actions: buy, sell, stake, unstake, claim and faucet
//!
//! Every action needs a connected wallet and runs at most one at a time.
//! Approve-then-call sequences abort at the first failed phase.

mod audit;

pub use audit::{AuditEntry, AuditLog};

use alloy::primitives::{Address, TxHash, U256};
use serde::Serialize;
use std::time::Instant;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{info, warn};
use uuid::Uuid;

use crate::app::UserPosition;
use crate::config::ContractAddresses;
use crate::units::parse_amount;
use crate::wallet::{Asset, ContractWriter, WalletSession, WriteError};

/// Phase of a write sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Approve,
    Primary,
}

#[derive(Debug, Error)]
pub enum ActionError {
    #[error("Please connect your wallet first!")]
    NotConnected,

    /// Detail is for logs; the message is what the user sees
    #[error("Please enter a valid amount")]
    InvalidAmount(String),

    #[error("Another transaction is still in progress")]
    ActionInFlight,

    #[error("Transaction failed. Please try again.")]
    TransactionFailed {
        phase: Phase,
        #[source]
        source: WriteError,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase", tag = "action", content = "asset")]
pub enum ActionKind {
    Buy,
    Sell,
    Stake(Asset),
    Unstake(Asset),
    Claim,
    Faucet,
}

impl ActionKind {
    pub fn name(&self) -> &'static str {
        match self {
            ActionKind::Buy => "buy",
            ActionKind::Sell => "sell",
            ActionKind::Stake(_) => "stake",
            ActionKind::Unstake(_) => "unstake",
            ActionKind::Claim => "claim",
            ActionKind::Faucet => "faucet",
        }
    }

    pub fn asset(&self) -> Option<Asset> {
        match self {
            ActionKind::Stake(asset) | ActionKind::Unstake(asset) => Some(*asset),
            _ => None,
        }
    }

    /// Notice shown after a confirmed action
    pub fn success_message(&self) -> String {
        match self {
            ActionKind::Buy => "Successfully bought ARUB!".to_string(),
            ActionKind::Sell => "Successfully sold ARUB!".to_string(),
            ActionKind::Stake(asset) => format!("Successfully staked {}!", asset.symbol()),
            ActionKind::Unstake(asset) => format!("Successfully unstaked {}!", asset.symbol()),
            ActionKind::Claim => "Rewards claimed successfully!".to_string(),
            ActionKind::Faucet => "Test USDT received!".to_string(),
        }
    }
}

/// Result of a confirmed action
#[derive(Debug, Clone, Serialize)]
pub struct ActionOutcome {
    pub action_id: Uuid,
    pub kind: ActionKind,
    pub approve_tx: Option<TxHash>,
    pub tx: TxHash,
    /// Position after the action, when it could be read back
    pub position: Option<UserPosition>,
}

/// Runs write actions against the connected wallet's contracts
pub struct ActionHandlers {
    contracts: ContractAddresses,
    decimals: u8,
    in_flight: Mutex<()>,
    audit: Option<AuditLog>,
}

impl ActionHandlers {
    pub fn new(contracts: ContractAddresses, decimals: u8) -> Self {
        Self {
            contracts,
            decimals,
            in_flight: Mutex::new(()),
            audit: None,
        }
    }

    pub fn with_audit_log(mut self, audit: AuditLog) -> Self {
        self.audit = Some(audit);
        self
    }

    /// Approve USDT to the token contract, then mint
    pub async fn buy(&self, session: &WalletSession, amount: &str) -> Result<ActionOutcome, ActionError> {
        self.execute(session, ActionKind::Buy, Some(amount)).await
    }

    /// Burn ARUB back into USDT
    pub async fn sell(&self, session: &WalletSession, amount: &str) -> Result<ActionOutcome, ActionError> {
        self.execute(session, ActionKind::Sell, Some(amount)).await
    }

    /// Approve the asset to the staking contract, then stake
    pub async fn stake(
        &self,
        session: &WalletSession,
        asset: Asset,
        amount: &str,
    ) -> Result<ActionOutcome, ActionError> {
        self.execute(session, ActionKind::Stake(asset), Some(amount)).await
    }

    pub async fn unstake(&self, session: &WalletSession, asset: Asset) -> Result<ActionOutcome, ActionError> {
        self.execute(session, ActionKind::Unstake(asset), None).await
    }

    pub async fn claim(&self, session: &WalletSession) -> Result<ActionOutcome, ActionError> {
        self.execute(session, ActionKind::Claim, None).await
    }

    pub async fn faucet(&self, session: &WalletSession) -> Result<ActionOutcome, ActionError> {
        self.execute(session, ActionKind::Faucet, None).await
    }

    /// Spender and asset of the approve phase, if the action has one
    fn approval(&self, kind: ActionKind) -> Option<(Asset, Address)> {
        match kind {
            ActionKind::Buy => Some((Asset::Usdt, self.contracts.arub)),
            ActionKind::Stake(asset) => Some((asset, self.contracts.staking)),
            _ => None,
        }
    }

    async fn execute(
        &self,
        session: &WalletSession,
        kind: ActionKind,
        amount_text: Option<&str>,
    ) -> Result<ActionOutcome, ActionError> {
        let active = session.active().ok_or(ActionError::NotConnected)?;

        let amount = match amount_text {
            Some(text) => parse_amount(text, self.decimals)
                .map_err(|e| ActionError::InvalidAmount(e.to_string()))?,
            None => U256::ZERO,
        };

        let _guard = self
            .in_flight
            .try_lock()
            .map_err(|_| ActionError::ActionInFlight)?;

        let action_id = Uuid::new_v4();
        let started = Instant::now();
        let entry = AuditEntry::pending(
            action_id,
            kind.name(),
            kind.asset(),
            amount_text.map(|s| s.trim().to_string()),
            active.account().to_string(),
        );
        self.record(&entry).await;

        info!(
            action = kind.name(),
            account = %active.account(),
            amount = amount_text.unwrap_or("-"),
            %action_id,
            "Action started"
        );

        let result = self.submit(active.contracts(), kind, amount).await;
        let elapsed = started.elapsed().as_millis() as u64;

        match result {
            Ok((approve_tx, tx)) => {
                info!(action = kind.name(), tx = %tx, %action_id, "Action confirmed");
                self.record(&entry.completed(approve_tx.map(|t| t.to_string()), tx.to_string(), elapsed))
                    .await;
                Ok(ActionOutcome {
                    action_id,
                    kind,
                    approve_tx,
                    tx,
                    position: None,
                })
            }
            Err(e) => {
                let detail = match &e {
                    ActionError::TransactionFailed { source, .. } => source.to_string(),
                    other => other.to_string(),
                };
                warn!(action = kind.name(), error = %detail, %action_id, "Action failed");
                self.record(&entry.failed(detail, elapsed)).await;
                Err(e)
            }
        }
    }

    async fn submit(
        &self,
        writer: &dyn ContractWriter,
        kind: ActionKind,
        amount: U256,
    ) -> Result<(Option<TxHash>, TxHash), ActionError> {
        let approve_tx = match self.approval(kind) {
            Some((asset, spender)) => Some(
                writer
                    .approve(asset, spender, amount)
                    .await
                    .map_err(|source| ActionError::TransactionFailed {
                        phase: Phase::Approve,
                        source,
                    })?,
            ),
            None => None,
        };

        let primary = match kind {
            ActionKind::Buy => writer.mint(amount).await,
            ActionKind::Sell => writer.burn(amount).await,
            ActionKind::Stake(asset) => writer.stake(asset, amount).await,
            ActionKind::Unstake(asset) => writer.unstake(asset).await,
            ActionKind::Claim => writer.claim_rewards().await,
            ActionKind::Faucet => writer.faucet().await,
        };

        let tx = primary.map_err(|source| ActionError::TransactionFailed {
            phase: Phase::Primary,
            source,
        })?;
        Ok((approve_tx, tx))
    }

    async fn record(&self, entry: &AuditEntry) {
        if let Some(audit) = &self.audit {
            audit.record(entry).await;
        }
    }
}
