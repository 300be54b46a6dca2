//! Demo values rendered when chain data is unavailable

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::display::{format_amount, format_usd, format_usd_whole, DisplayField};

/// Placeholder statistics. These are display values only and do not satisfy
/// the snapshot invariants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoValues {
    pub usdt_rub_rate: f64,
    pub rate_change: f64,
    pub arub_price: f64,
    pub total_bought: f64,
    pub total_staked_usdt: f64,
    pub total_staked_arub: f64,
    pub total_tvl: f64,
    pub total_supply: f64,
    pub stakers_count: u64,
    pub current_apy: u32,
    pub market_cap: f64,
    pub volume_24h: f64,
    pub transactions_24h: u64,
    pub unique_wallets: u64,
}

impl Default for DemoValues {
    fn default() -> Self {
        Self {
            usdt_rub_rate: 100.50,
            rate_change: 2.34,
            arub_price: 99.50,
            total_bought: 1_000.0,
            total_staked_usdt: 500.0,
            total_staked_arub: 750.0,
            total_tvl: 1_250.0,
            total_supply: 1_000.0,
            stakers_count: 3,
            current_apy: 8,
            market_cap: 99_500.0,
            volume_24h: 125.0,
            transactions_24h: 12,
            unique_wallets: 3,
        }
    }
}

impl DemoValues {
    /// The single fallback table, keyed by display field
    pub fn table(&self) -> BTreeMap<DisplayField, String> {
        use DisplayField::*;

        BTreeMap::from([
            (UsdtRubRate, format!("{:.2}", self.usdt_rub_rate)),
            (RateChange, crate::display::format_change(self.rate_change)),
            (ArubPrice, format_usd(self.arub_price)),
            (TotalBought, format_amount(self.total_bought)),
            (TotalStakedUsdt, format_amount(self.total_staked_usdt)),
            (TotalStakedArub, format_amount(self.total_staked_arub)),
            (TotalTvl, format_usd_whole(self.total_tvl)),
            (TotalSupply, format_amount(self.total_supply)),
            (StakersCount, self.stakers_count.to_string()),
            (CurrentApy, format!("{}%", self.current_apy)),
            (MarketCap, format_usd_whole(self.market_cap)),
            (Volume24h, format_usd_whole(self.volume_24h)),
            (Transactions24h, self.transactions_24h.to_string()),
            (UniqueWallets, self.unique_wallets.to_string()),
        ])
    }
}
