//! ARUB token dashboard
//!
//! Reads token and staking statistics from Sepolia, derives market figures
//! from them and renders the result to a display surface. A connected wallet
//! can buy, sell, stake, unstake and claim.
//!
//! # Degradation
//!
//! - Each chain read falls back independently (zero or derived price)
//! - No reachable RPC endpoint or zero supply renders the demo table
//! - A failed exchange-rate fetch keeps the last known rate
//!
//! # Security Model
//!
//! - Private keys never leave the wallet module
//! - Every write action is recorded in a JSONL audit log

pub mod actions;
pub mod app;
pub mod chain;
pub mod config;
pub mod contracts;
pub mod display;
pub mod rate;
pub mod stats;
pub mod units;
pub mod wallet;

mod error;

// Re-export commonly used types
pub use actions::{ActionError, ActionHandlers, ActionKind, ActionOutcome};
pub use app::{App, DataSource, UserPosition};
pub use chain::{ChainReader, ReadError, StakeRecord};
pub use config::{Config, RpcConfig, PRIVATE_KEY_ENV};
pub use display::{DisplayField, DisplaySurface, MemorySurface, TerminalSurface};
pub use error::{Error, Result};
pub use rate::{ExchangeRateFetcher, RateSource};
pub use stats::{StatsAggregator, StatsSnapshot};
pub use wallet::{Asset, SessionError, WalletKind, WalletProvider, WalletSession};
