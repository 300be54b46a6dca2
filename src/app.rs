//! Dashboard application state
//!
//! Owns the aggregator, the rate fetcher, the wallet session and the action
//! handlers, and drives the periodic refresh.

use alloy::primitives::Address;
use chrono::Local;
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::actions::{ActionHandlers, ActionOutcome, AuditLog};
use crate::chain::{ChainReader, RpcChainReader, StakeRecord};
use crate::config::{Config, RpcConfig};
use crate::display::{render_demo, render_position, render_snapshot, DisplaySurface};
use crate::rate::ExchangeRateFetcher;
use crate::stats::StatsAggregator;
use crate::wallet::{Asset, SessionError, WalletKind, WalletProvider, WalletSession};
use crate::{Error, Result};

/// Flat reward estimate applied to staked ARUB
const REWARD_ESTIMATE_RATE: f64 = 0.08;

/// Connected account's staking position, display units
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct UserPosition {
    pub stable_staked: f64,
    pub token_staked: f64,
    /// Unix seconds
    pub staked_at: u64,
    pub last_claim_at: u64,
    pub estimated_rewards: f64,
}

impl From<StakeRecord> for UserPosition {
    fn from(record: StakeRecord) -> Self {
        Self {
            stable_staked: record.stable_amount,
            token_staked: record.token_amount,
            staked_at: record.staked_at,
            last_claim_at: record.last_claim_at,
            estimated_rewards: record.token_amount * REWARD_ESTIMATE_RATE,
        }
    }
}

/// Where the rendered statistics came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSource {
    Live,
    Demo,
    /// No chain data and demo rendering disabled; zeros were rendered
    Unavailable,
}

pub struct App {
    config: Config,
    rates: Arc<ExchangeRateFetcher>,
    reader: Option<Arc<dyn ChainReader>>,
    stats: Option<StatsAggregator>,
    session: WalletSession,
    actions: ActionHandlers,
}

impl App {
    /// Assemble from parts. A `None` reader renders demo data.
    pub fn new(
        config: Config,
        reader: Option<Arc<dyn ChainReader>>,
        rates: Arc<ExchangeRateFetcher>,
        wallet: Option<Arc<dyn WalletProvider>>,
    ) -> Self {
        let stats = reader.clone().map(|reader| {
            StatsAggregator::new(
                reader,
                rates.clone(),
                config.staking_tiers.clone(),
                config.pricing.base_price,
                Duration::from_millis(config.statistics.cache_ttl_ms),
            )
        });

        let mut actions = ActionHandlers::new(config.contracts, config.pricing.token_decimals);
        if let Some(path) = &config.audit_log_path {
            actions = actions.with_audit_log(AuditLog::new(path));
        }

        let session = WalletSession::new(wallet, config.network.clone(), config.contracts);

        Self {
            config,
            rates,
            reader,
            stats,
            session,
            actions,
        }
    }

    /// Connect the chain reader and the rate source described by `config`.
    ///
    /// An unreachable chain is not an error: the app runs on demo data.
    pub async fn from_config(
        config: Config,
        rpc: &RpcConfig,
        wallet: Option<Arc<dyn WalletProvider>>,
    ) -> Self {
        let reader = match RpcChainReader::connect(
            rpc,
            config.network.chain_id,
            config.contracts,
            config.pricing.token_decimals,
        )
        .await
        {
            Ok(reader) => Some(Arc::new(reader) as Arc<dyn ChainReader>),
            Err(e) => {
                warn!(error = %e, "Chain reader unavailable, statistics will use demo data");
                None
            }
        };

        let rates = Arc::new(ExchangeRateFetcher::from_config(&config.exchange_rate));
        Self::new(config, reader, rates, wallet)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn session(&self) -> &WalletSession {
        &self.session
    }

    pub fn rates(&self) -> &ExchangeRateFetcher {
        &self.rates
    }

    pub fn has_chain(&self) -> bool {
        self.reader.is_some()
    }

    /// Refresh the rate and render statistics, live when the chain has supply
    pub async fn refresh_statistics(&self, surface: &mut dyn DisplaySurface) -> DataSource {
        let rate = self.rates.get_rate().await;
        let now = Local::now();

        let snapshot = match &self.stats {
            Some(stats) => Some(stats.get_snapshot().await),
            None => None,
        };

        match snapshot {
            Some(snapshot) if snapshot.total_supply > 0.0 => {
                render_snapshot(surface, &snapshot, rate, self.rates.change_percent(), now);
                DataSource::Live
            }
            _ if self.config.statistics.show_demo_data => {
                debug!("No live supply, rendering demo statistics");
                render_demo(surface, &self.config.statistics.demo_values, now);
                DataSource::Demo
            }
            snapshot => {
                let snapshot = snapshot.unwrap_or_default();
                render_snapshot(surface, &snapshot, rate, self.rates.change_percent(), now);
                DataSource::Unavailable
            }
        }
    }

    /// Read and render the connected account's position
    pub async fn refresh_position(&self, surface: &mut dyn DisplaySurface) -> Option<UserPosition> {
        let account = self.session.account()?;
        let reader = self.reader.as_ref()?;

        match reader.user_stake(account).await {
            Ok(record) => {
                let position = UserPosition::from(record);
                render_position(surface, &position);
                Some(position)
            }
            Err(e) => {
                warn!(account = %account, error = %e, "Position read failed");
                None
            }
        }
    }

    /// Connect the wallet and render the new account's position
    pub async fn connect(
        &mut self,
        surface: &mut dyn DisplaySurface,
        kind: WalletKind,
    ) -> std::result::Result<Address, SessionError> {
        let account = self.session.connect(kind).await?;
        self.refresh_position(surface).await;
        Ok(account)
    }

    /// Reconnect an already authorized wallet, rendering its position
    pub async fn auto_connect(&mut self, surface: &mut dyn DisplaySurface) -> Option<Address> {
        let account = self.session.auto_connect().await?;
        self.refresh_position(surface).await;
        Some(account)
    }

    pub fn disconnect(&mut self) {
        self.session.disconnect();
    }

    pub async fn buy(&self, surface: &mut dyn DisplaySurface, amount: &str) -> Result<ActionOutcome> {
        let outcome = self.actions.buy(&self.session, amount).await?;
        Ok(self.after_action(surface, outcome).await)
    }

    pub async fn sell(&self, surface: &mut dyn DisplaySurface, amount: &str) -> Result<ActionOutcome> {
        let outcome = self.actions.sell(&self.session, amount).await?;
        Ok(self.after_action(surface, outcome).await)
    }

    pub async fn stake(
        &self,
        surface: &mut dyn DisplaySurface,
        asset: Asset,
        amount: &str,
    ) -> Result<ActionOutcome> {
        let outcome = self.actions.stake(&self.session, asset, amount).await?;
        Ok(self.after_action(surface, outcome).await)
    }

    pub async fn unstake(&self, surface: &mut dyn DisplaySurface, asset: Asset) -> Result<ActionOutcome> {
        let outcome = self.actions.unstake(&self.session, asset).await?;
        Ok(self.after_action(surface, outcome).await)
    }

    pub async fn claim(&self, surface: &mut dyn DisplaySurface) -> Result<ActionOutcome> {
        let outcome = self.actions.claim(&self.session).await?;
        Ok(self.after_action(surface, outcome).await)
    }

    pub async fn faucet(&self, surface: &mut dyn DisplaySurface) -> Result<ActionOutcome> {
        let outcome = self.actions.faucet(&self.session).await?;
        Ok(self.after_action(surface, outcome).await)
    }

    async fn after_action(&self, surface: &mut dyn DisplaySurface, mut outcome: ActionOutcome) -> ActionOutcome {
        self.refresh_statistics(surface).await;
        outcome.position = self.refresh_position(surface).await;
        outcome
    }

    /// Price used for trade previews: base price over the held rate
    pub fn quote_price(&self) -> f64 {
        self.config.pricing.base_price / self.rates.current()
    }

    /// ARUB received for a USDT amount
    pub fn quote_buy(&self, stable_amount: f64) -> Result<f64> {
        Ok(positive(stable_amount)? / self.quote_price())
    }

    /// USDT received for an ARUB amount
    pub fn quote_sell(&self, token_amount: f64) -> Result<f64> {
        Ok(positive(token_amount)? * self.quote_price())
    }

    /// Refresh on a fixed interval until Ctrl-C
    pub async fn run(&self, surface: &mut dyn DisplaySurface, interval: Duration) -> Result<()> {
        let shutdown = async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "Ctrl-C handler unavailable");
                std::future::pending::<()>().await;
            }
        };
        self.run_until(surface, interval, shutdown).await
    }

    /// Refresh on a fixed interval until `shutdown` completes
    pub async fn run_until(
        &self,
        surface: &mut dyn DisplaySurface,
        interval: Duration,
        shutdown: impl Future<Output = ()>,
    ) -> Result<()> {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        tokio::pin!(shutdown);

        info!(interval_ms = interval.as_millis() as u64, "Dashboard refresh loop started");
        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("Shutting down dashboard");
                    return Ok(());
                }
                _ = ticker.tick() => {
                    let source = self.refresh_statistics(surface).await;
                    self.refresh_position(surface).await;
                    surface.flush()?;
                    debug!(?source, "Dashboard refreshed");
                }
            }
        }
    }
}

fn positive(amount: f64) -> Result<f64> {
    if amount.is_finite() && amount > 0.0 {
        Ok(amount)
    } else {
        Err(Error::InvalidArgument(format!(
            "amount must be a positive number, got {}",
            amount
        )))
    }
}
