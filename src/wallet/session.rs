//! Wallet session: connect, network switch, contract binding

use alloy::primitives::Address;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

use super::{ContractWriter, WalletKind};
use crate::config::{ContractAddresses, NetworkConfig};

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("User rejected the request")]
    UserRejected,

    /// The wallet does not know the chain (EIP-3326 error 4902)
    #[error("Chain {0:#x} is not recognized by the wallet")]
    UnrecognizedChain(u64),

    #[error("Wallet request failed: {0}")]
    Request(String),
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("No wallet provider available. Please install a Web3 wallet or set PRIVATE_KEY.")]
    NoProvider,

    #[error("Wallet connection rejected by user")]
    UserRejected,

    #[error("Failed to connect wallet: {0}")]
    Provider(ProviderError),
}

impl From<ProviderError> for SessionError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::UserRejected => SessionError::UserRejected,
            other => SessionError::Provider(other),
        }
    }
}

/// An external wallet able to expose accounts and sign transactions
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Accounts already authorized, without prompting
    async fn accounts(&self) -> Result<Vec<Address>, ProviderError>;

    /// Ask the user to authorize account access
    async fn request_accounts(&self) -> Result<Vec<Address>, ProviderError>;

    async fn switch_chain(&self, chain_id: u64) -> Result<(), ProviderError>;

    /// Register a network definition with the wallet
    async fn add_chain(&self, network: &NetworkConfig) -> Result<(), ProviderError>;

    /// Signing-capable handles for the three contracts
    fn bind_contracts(
        &self,
        contracts: &ContractAddresses,
    ) -> Result<Arc<dyn ContractWriter>, ProviderError>;
}

/// A connected account together with its signing contracts
#[derive(Clone)]
pub struct ActiveSession {
    account: Address,
    kind: WalletKind,
    contracts: Arc<dyn ContractWriter>,
}

impl ActiveSession {
    pub fn account(&self) -> Address {
        self.account
    }

    pub fn kind(&self) -> WalletKind {
        self.kind
    }

    pub fn contracts(&self) -> &dyn ContractWriter {
        self.contracts.as_ref()
    }
}

/// Wallet session. Either fully connected or absent.
pub struct WalletSession {
    provider: Option<Arc<dyn WalletProvider>>,
    network: NetworkConfig,
    contracts: ContractAddresses,
    active: Option<ActiveSession>,
}

impl WalletSession {
    pub fn new(
        provider: Option<Arc<dyn WalletProvider>>,
        network: NetworkConfig,
        contracts: ContractAddresses,
    ) -> Self {
        Self {
            provider,
            network,
            contracts,
            active: None,
        }
    }

    pub fn active(&self) -> Option<&ActiveSession> {
        self.active.as_ref()
    }

    pub fn account(&self) -> Option<Address> {
        self.active.as_ref().map(|s| s.account)
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Connect the wallet, prompting the user.
    ///
    /// The network switch is best effort; contract binding happens after it
    /// so the handles target the switched chain.
    pub async fn connect(&mut self, kind: WalletKind) -> Result<Address, SessionError> {
        let provider = self.provider.clone().ok_or(SessionError::NoProvider)?;

        let accounts = provider.request_accounts().await?;
        let account = *accounts.first().ok_or(SessionError::UserRejected)?;

        self.ensure_network(provider.as_ref()).await;

        let contracts = provider.bind_contracts(&self.contracts)?;

        self.active = Some(ActiveSession {
            account,
            kind,
            contracts,
        });
        info!(account = %account, wallet = kind.name(), "Wallet connected");
        Ok(account)
    }

    /// Connect without prompting if the wallet already authorized an account
    pub async fn auto_connect(&mut self) -> Option<Address> {
        let provider = self.provider.clone()?;
        match provider.accounts().await {
            Ok(accounts) if !accounts.is_empty() => {}
            Ok(_) => return None,
            Err(e) => {
                warn!(error = %e, "Could not query authorized accounts");
                return None;
            }
        }

        match self.connect(WalletKind::Injected).await {
            Ok(account) => Some(account),
            Err(e) => {
                warn!(error = %e, "Auto-connect failed");
                None
            }
        }
    }

    pub fn disconnect(&mut self) {
        if let Some(session) = self.active.take() {
            info!(account = %session.account, "Wallet disconnected");
        }
    }

    async fn ensure_network(&self, provider: &dyn WalletProvider) {
        let chain_id = self.network.chain_id;
        match provider.switch_chain(chain_id).await {
            Ok(()) => {}
            Err(ProviderError::UnrecognizedChain(_)) => {
                info!(chain = %self.network.chain_id_hex(), "Adding network to wallet");
                let added = match provider.add_chain(&self.network).await {
                    Ok(()) => provider.switch_chain(chain_id).await,
                    Err(e) => Err(e),
                };
                if let Err(e) = added {
                    warn!(error = %e, chain = %self.network.chain_id_hex(), "Failed to add network");
                }
            }
            Err(e) => {
                warn!(error = %e, chain = %self.network.chain_id_hex(), "Failed to switch network");
            }
        }
    }
}
