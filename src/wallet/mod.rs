//! Wallet session and signing contracts
//!
//! The private key lives only inside [`SecureWallet`]. Everything else talks to
//! the wallet through the [`WalletProvider`] trait and to the contracts through
//! [`ContractWriter`].

mod session;
mod signer;
mod writer;

pub use session::{ActiveSession, ProviderError, SessionError, WalletProvider, WalletSession};
pub use signer::{ConnectPrompt, LocalKeyProvider, SecureWallet};
pub use writer::{AlloyContractWriter, ContractWriter, WriteError};

use serde::{Deserialize, Serialize};

/// Stakeable asset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Asset {
    Usdt,
    Arub,
}

impl Asset {
    pub fn symbol(&self) -> &'static str {
        match self {
            Asset::Usdt => "USDT",
            Asset::Arub => "ARUB",
        }
    }
}

/// Kind of wallet the user picked; carried for logging
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WalletKind {
    Injected,
    LocalKey,
    WalletConnect,
}

impl WalletKind {
    pub fn name(&self) -> &'static str {
        match self {
            WalletKind::Injected => "injected",
            WalletKind::LocalKey => "local_key",
            WalletKind::WalletConnect => "walletconnect",
        }
    }
}
