//! Statistics aggregation
//!
//! Combines chain reads and the exchange rate into a [`StatsSnapshot`]:
//! - Each read is independently fallible and falls back per field
//! - Derived values (TVL, market cap, APY tier) are recomputed from the reads
//! - The snapshot is cached for a fixed TTL and recomputed in full once stale

mod demo;
mod tiers;

pub use demo::DemoValues;
pub use tiers::{ApyTier, ApyTiers};

use futures::join;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::chain::{ChainReader, ReadError};
use crate::rate::ExchangeRateFetcher;

/// Days in the stakers estimate divisor
const STAKERS_TVL_DIVISOR: f64 = 365.0;

/// Aggregated on-chain statistics, amounts in display units
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub total_supply: f64,
    /// ARUB price in USDT
    pub current_price: f64,
    pub total_staked_stable: f64,
    pub total_staked_token: f64,
    /// staked_stable + staked_token * price
    pub tvl: f64,
    /// total_supply * price
    pub market_cap: f64,
    /// APY tier for the TVL, whole percent
    pub current_apy: u32,
    /// Approximation: all supply is assumed minted through buys
    pub total_bought: f64,
    /// Approximation: floor(tvl / 365), not a count of stake records
    pub stakers_count: u64,
}

impl StatsSnapshot {
    /// Derive a snapshot from the four base reads
    pub fn derive(
        total_supply: f64,
        current_price: f64,
        staked_stable: f64,
        staked_token: f64,
        tiers: &ApyTiers,
    ) -> Self {
        let total_supply = non_negative(total_supply);
        let current_price = non_negative(current_price);
        let total_staked_stable = non_negative(staked_stable);
        let total_staked_token = non_negative(staked_token);

        let tvl = total_staked_stable + total_staked_token * current_price;
        let market_cap = total_supply * current_price;

        Self {
            total_supply,
            current_price,
            total_staked_stable,
            total_staked_token,
            tvl,
            market_cap,
            current_apy: tiers.apy_for(tvl),
            total_bought: total_supply,
            stakers_count: (tvl / STAKERS_TVL_DIVISOR).floor() as u64,
        }
    }
}

fn non_negative(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

struct CachedSnapshot {
    snapshot: StatsSnapshot,
    captured_at: Instant,
}

/// Statistics aggregator with a short-lived snapshot cache
pub struct StatsAggregator {
    reader: Arc<dyn ChainReader>,
    rates: Arc<ExchangeRateFetcher>,
    tiers: ApyTiers,
    base_price: f64,
    ttl: Duration,
    cache: RwLock<Option<CachedSnapshot>>,
}

impl StatsAggregator {
    pub fn new(
        reader: Arc<dyn ChainReader>,
        rates: Arc<ExchangeRateFetcher>,
        tiers: ApyTiers,
        base_price: f64,
        ttl: Duration,
    ) -> Self {
        Self {
            reader,
            rates,
            tiers,
            base_price,
            ttl,
            cache: RwLock::new(None),
        }
    }

    /// Current snapshot, served from cache while fresh
    pub async fn get_snapshot(&self) -> StatsSnapshot {
        if let Some(cached) = self.fresh_snapshot().await {
            debug!("Using cached statistics");
            return cached;
        }

        let captured_at = Instant::now();
        let snapshot = self.collect().await;

        *self.cache.write().await = Some(CachedSnapshot {
            snapshot,
            captured_at,
        });

        info!(
            total_supply = snapshot.total_supply,
            price = snapshot.current_price,
            tvl = snapshot.tvl,
            apy = snapshot.current_apy,
            "Statistics collected"
        );
        snapshot
    }

    async fn fresh_snapshot(&self) -> Option<StatsSnapshot> {
        let cache = self.cache.read().await;
        cache
            .as_ref()
            .filter(|cached| cached.captured_at.elapsed() < self.ttl)
            .map(|cached| cached.snapshot)
    }

    async fn collect(&self) -> StatsSnapshot {
        let staked = async {
            let stable = self.reader.total_staked_stable().await?;
            let token = self.reader.total_staked_token().await?;
            Ok::<_, ReadError>((stable, token))
        };

        let (supply, price, staked) = join!(
            self.reader.total_supply(),
            self.reader.current_price(),
            staked
        );

        let total_supply = supply.unwrap_or_else(|e| {
            warn!(error = %e, "Total supply read failed, using 0");
            0.0
        });

        let current_price = price.unwrap_or_else(|e| {
            let derived = self.derived_price();
            warn!(error = %e, derived, "Price read failed, deriving from exchange rate");
            derived
        });

        let (staked_stable, staked_token) = staked.unwrap_or_else(|e| {
            warn!(error = %e, "Staking reads failed, using 0");
            (0.0, 0.0)
        });

        StatsSnapshot::derive(
            total_supply,
            current_price,
            staked_stable,
            staked_token,
            &self.tiers,
        )
    }

    /// Fallback price: base price over the held USDT/RUB rate
    pub fn derived_price(&self) -> f64 {
        self.base_price / self.rates.current()
    }
}
