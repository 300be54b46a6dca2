//! TVL to APY tier table

use serde::{Deserialize, Serialize};

/// One APY breakpoint. A tier covers `min_usd <= tvl < max_usd`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApyTier {
    pub name: String,
    /// Annual percentage yield, in whole percent
    pub apy: u32,
    pub min_usd: f64,
    /// Exclusive upper bound; `None` for the open-ended top tier
    pub max_usd: Option<f64>,
}

impl ApyTier {
    fn new(name: &str, apy: u32, min_usd: f64, max_usd: Option<f64>) -> Self {
        Self {
            name: name.to_string(),
            apy,
            min_usd,
            max_usd,
        }
    }
}

/// Ordered tier table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<ApyTier>", into = "Vec<ApyTier>")]
pub struct ApyTiers(Vec<ApyTier>);

impl ApyTiers {
    /// Build a table, ordering tiers by their upper bound
    pub fn new(mut tiers: Vec<ApyTier>) -> Self {
        tiers.sort_by(|a, b| {
            let a = a.max_usd.unwrap_or(f64::INFINITY);
            let b = b.max_usd.unwrap_or(f64::INFINITY);
            a.total_cmp(&b)
        });
        Self(tiers)
    }

    /// Tier whose `[min_usd, max_usd)` range contains `tvl`
    pub fn tier_for(&self, tvl: f64) -> Option<&ApyTier> {
        self.0
            .iter()
            .find(|tier| tvl >= tier.min_usd && tier.max_usd.is_none_or(|max| tvl < max))
    }

    /// APY for a TVL, 0 when no tier matches (including gaps in the table)
    pub fn apy_for(&self, tvl: f64) -> u32 {
        self.tier_for(tvl).map(|tier| tier.apy).unwrap_or(0)
    }

    /// Tiers in ascending order of upper bound
    pub fn iter(&self) -> impl Iterator<Item = &ApyTier> {
        self.0.iter()
    }
}

impl Default for ApyTiers {
    fn default() -> Self {
        Self::new(vec![
            ApyTier::new("Bronze", 8, 0.0, Some(1_000.0)),
            ApyTier::new("Silver", 12, 1_000.0, Some(10_000.0)),
            ApyTier::new("Gold", 16, 10_000.0, Some(50_000.0)),
            ApyTier::new("Diamond", 24, 50_000.0, None),
        ])
    }
}

impl From<Vec<ApyTier>> for ApyTiers {
    fn from(tiers: Vec<ApyTier>) -> Self {
        Self::new(tiers)
    }
}

impl From<ApyTiers> for Vec<ApyTier> {
    fn from(tiers: ApyTiers) -> Self {
        tiers.0
    }
}
