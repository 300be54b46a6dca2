//! Configuration for the ARUB dashboard

pub mod rpc;

use alloy::primitives::{address, Address};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::stats::{ApyTier, ApyTiers, DemoValues};
use crate::wallet::Asset;
use crate::{Error, Result};

// Re-export RPC config
pub use rpc::RpcConfig;

/// Private key environment variable name
pub const PRIVATE_KEY_ENV: &str = "PRIVATE_KEY";

/// Sepolia chain id (`0xaa36a7`)
pub const SEPOLIA_CHAIN_ID: u64 = 11_155_111;

/// Deployed contract addresses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractAddresses {
    /// ARUB token (mint/burn against USDT)
    pub arub: Address,
    /// USDT test stable asset
    pub usdt: Address,
    /// Staking contract accepting either asset
    pub staking: Address,
}

impl ContractAddresses {
    /// Address of the ERC20 contract backing a stakeable asset
    pub fn asset(&self, asset: Asset) -> Address {
        match asset {
            Asset::Usdt => self.usdt,
            Asset::Arub => self.arub,
        }
    }
}

impl Default for ContractAddresses {
    fn default() -> Self {
        Self {
            arub: address!("e4A39E3D2C64C2D3a1d9c7C6B9eB63db55277b71"),
            usdt: address!("4e6175f449b04e20437b2A2AD8221884Bda38f39"),
            staking: address!("47B302F223ae94e9efcABc27DE19C0a2eC268Df3"),
        }
    }
}

/// Native currency metadata used when adding the network to a wallet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NativeCurrency {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
}

/// Target network definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    pub chain_id: u64,
    pub chain_name: String,
    /// Public RPC endpoints, primary first
    pub rpc_urls: Vec<String>,
    pub block_explorer_url: String,
    pub native_currency: NativeCurrency,
}

impl NetworkConfig {
    /// Chain id in the `0x`-prefixed form wallets expect
    pub fn chain_id_hex(&self) -> String {
        format!("{:#x}", self.chain_id)
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            chain_id: SEPOLIA_CHAIN_ID,
            chain_name: "Sepolia Testnet".to_string(),
            rpc_urls: vec![
                "https://ethereum-sepolia-rpc.publicnode.com".to_string(),
                "https://sepolia.infura.io/v3/9aa3d95b3bc440fa88ea12eaa4456161".to_string(),
                "https://rpc.sepolia.org".to_string(),
            ],
            block_explorer_url: "https://sepolia.etherscan.io/".to_string(),
            native_currency: NativeCurrency {
                name: "Sepolia ETH".to_string(),
                symbol: "ETH".to_string(),
                decimals: 18,
            },
        }
    }
}

/// Statistics refresh and fallback settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StatisticsConfig {
    /// Auto-refresh interval (milliseconds)
    pub update_interval_ms: u64,
    /// Snapshot cache lifetime (milliseconds)
    pub cache_ttl_ms: u64,
    /// Render demo values when chain data is unavailable
    pub show_demo_data: bool,
    /// Values rendered on the demo path
    pub demo_values: DemoValues,
}

impl Default for StatisticsConfig {
    fn default() -> Self {
        Self {
            update_interval_ms: 30_000, // 30 seconds
            cache_ttl_ms: 10_000,       // 10 seconds
            show_demo_data: true,
            demo_values: DemoValues::default(),
        }
    }
}

/// Price derivation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingConfig {
    /// ARUB price = base_price / USDT-RUB rate
    pub base_price: f64,
    /// Decimals shared by ARUB and USDT
    pub token_decimals: u8,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            base_price: 10_000.0,
            token_decimals: 6,
        }
    }
}

/// External fiat-rate endpoint settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExchangeRateConfig {
    pub enabled: bool,
    /// GET endpoint returning `{ "rates": { "<CURRENCY>": f64, ... } }`
    pub endpoint: String,
    /// Rate table key to read
    pub currency: String,
    /// Rate used until the first successful fetch
    pub fallback_rate: f64,
    /// Request timeout (milliseconds)
    pub timeout_ms: u64,
}

impl Default for ExchangeRateConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: "https://api.exchangerate-api.com/v4/latest/USD".to_string(),
            currency: "RUB".to_string(),
            fallback_rate: 100.0,
            timeout_ms: 10_000,
        }
    }
}

/// Main configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Contract addresses
    pub contracts: ContractAddresses,
    /// Target network
    pub network: NetworkConfig,
    /// Statistics refresh settings
    pub statistics: StatisticsConfig,
    /// Price derivation
    pub pricing: PricingConfig,
    /// TVL to APY tier table
    pub staking_tiers: ApyTiers,
    /// Fiat rate source
    pub exchange_rate: ExchangeRateConfig,
    /// Path to action audit log (JSONL)
    pub audit_log_path: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            contracts: ContractAddresses::default(),
            network: NetworkConfig::default(),
            statistics: StatisticsConfig::default(),
            pricing: PricingConfig::default(),
            staking_tiers: ApyTiers::default(),
            exchange_rate: ExchangeRateConfig::default(),
            audit_log_path: Some("actions.jsonl".to_string()),
        }
    }
}

impl Config {
    /// Load a JSON config file; missing sections take their defaults
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        let config: Config = serde_json::from_str(&content)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the aggregator cannot work with
    pub fn validate(&self) -> Result<()> {
        if !(self.pricing.base_price.is_finite() && self.pricing.base_price > 0.0) {
            return Err(Error::Config(format!(
                "pricing.base_price must be positive, got {}",
                self.pricing.base_price
            )));
        }
        if !(self.exchange_rate.fallback_rate.is_finite() && self.exchange_rate.fallback_rate > 0.0)
        {
            return Err(Error::Config(format!(
                "exchange_rate.fallback_rate must be positive, got {}",
                self.exchange_rate.fallback_rate
            )));
        }
        if self.network.rpc_urls.is_empty() {
            return Err(Error::Config("network.rpc_urls is empty".to_string()));
        }

        let mut below: Option<&ApyTier> = None;
        for tier in self.staking_tiers.iter() {
            if tier.max_usd.is_some_and(|max| max <= tier.min_usd) {
                return Err(Error::Config(format!(
                    "staking tier {} has an empty range",
                    tier.name
                )));
            }
            if below.is_some_and(|b| b.max_usd.is_none_or(|max| tier.min_usd < max)) {
                return Err(Error::Config(format!(
                    "staking tier {} overlaps the tier below it",
                    tier.name
                )));
            }
            below = Some(tier);
        }
        Ok(())
    }
}
