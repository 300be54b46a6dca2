//! Local private-key wallet
//!
//! SECURITY: This is the ONLY place where private keys exist.
//! - Keys are held in alloy's PrivateKeySigner
//! - Keys are never serialized or logged

use alloy::network::EthereumWallet;
use alloy::primitives::Address;
use alloy::providers::{Provider, ProviderBuilder};
use alloy::signers::local::PrivateKeySigner;
use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

use super::{AlloyContractWriter, ContractWriter, ProviderError, WalletProvider};
use crate::config::{ContractAddresses, NetworkConfig};
use crate::{Error, Result};

/// Secure wallet that protects private keys
///
/// The private key is:
/// - Stored in alloy's PrivateKeySigner
/// - Never serialized (no Serialize impl)
/// - Only reachable through [`EthereumWallet`] signing
pub struct SecureWallet {
    address: Address,
    wallet: EthereumWallet,
}

impl SecureWallet {
    /// Create a wallet from a hex-encoded private key
    pub fn from_hex(key_hex: &str) -> Result<Self> {
        let key_hex = key_hex.trim();
        let key_hex = key_hex.strip_prefix("0x").unwrap_or(key_hex);

        let signer: PrivateKeySigner = key_hex
            .parse()
            .map_err(|e| Error::Wallet(format!("Invalid private key: {}", e)))?;

        let address = signer.address();
        Ok(Self {
            address,
            wallet: EthereumWallet::from(signer),
        })
    }

    pub fn from_secret(key: &SecretString) -> Result<Self> {
        Self::from_hex(key.expose_secret())
    }

    /// Get the public address (safe to share)
    pub fn address(&self) -> Address {
        self.address
    }

    /// Signing wallet for alloy providers
    pub fn wallet(&self) -> &EthereumWallet {
        &self.wallet
    }
}

// Implement Debug manually to avoid exposing the signer
impl std::fmt::Debug for SecureWallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecureWallet")
            .field("address", &self.address)
            .field("signer", &"[REDACTED]")
            .finish()
    }
}

/// Asks the user whether to expose an account to the dashboard
pub type ConnectPrompt = Arc<dyn Fn(Address) -> bool + Send + Sync>;

/// Wallet provider backed by a local key and a JSON-RPC endpoint.
///
/// Behaves like a browser wallet: the account is hidden until the user
/// approves the connection, and switching to a chain it was never told about
/// fails with [`ProviderError::UnrecognizedChain`].
pub struct LocalKeyProvider {
    wallet: SecureWallet,
    endpoint: url::Url,
    prompt: ConnectPrompt,
    authorized: AtomicBool,
    known_chains: RwLock<HashMap<u64, String>>,
    active_chain: AtomicU64,
}

impl LocalKeyProvider {
    /// `chain_id` is the chain served by `endpoint`; it starts out known and active.
    pub fn new(wallet: SecureWallet, endpoint: url::Url, chain_id: u64, prompt: ConnectPrompt) -> Self {
        let host = endpoint.host_str().unwrap_or("rpc").to_string();
        Self {
            wallet,
            endpoint,
            prompt,
            authorized: AtomicBool::new(false),
            known_chains: RwLock::new(HashMap::from([(chain_id, host)])),
            active_chain: AtomicU64::new(chain_id),
        }
    }

    /// Provider for a key signing against `endpoint`. Without a prompt the
    /// account counts as already approved, so auto-connect picks it up.
    pub fn for_endpoint(
        wallet: SecureWallet,
        endpoint: &str,
        chain_id: u64,
        prompt: Option<ConnectPrompt>,
    ) -> Result<Self> {
        let endpoint: url::Url = endpoint
            .parse()
            .map_err(|e| Error::Config(format!("invalid RPC URL: {}", e)))?;

        Ok(match prompt {
            Some(prompt) => Self::new(wallet, endpoint, chain_id, prompt),
            None => Self::new(wallet, endpoint, chain_id, Arc::new(|_| true)).pre_authorized(),
        })
    }

    /// Treat the account as already approved
    pub fn pre_authorized(self) -> Self {
        self.authorized.store(true, Ordering::SeqCst);
        self
    }

    pub fn address(&self) -> Address {
        self.wallet.address()
    }

    pub fn active_chain(&self) -> u64 {
        self.active_chain.load(Ordering::SeqCst)
    }
}

impl std::fmt::Debug for LocalKeyProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalKeyProvider")
            .field("wallet", &self.wallet)
            .field("endpoint", &self.endpoint.host_str())
            .field("active_chain", &self.active_chain())
            .finish()
    }
}

#[async_trait]
impl WalletProvider for LocalKeyProvider {
    async fn accounts(&self) -> std::result::Result<Vec<Address>, ProviderError> {
        if self.authorized.load(Ordering::SeqCst) {
            Ok(vec![self.wallet.address()])
        } else {
            Ok(Vec::new())
        }
    }

    async fn request_accounts(&self) -> std::result::Result<Vec<Address>, ProviderError> {
        if self.authorized.load(Ordering::SeqCst) {
            return Ok(vec![self.wallet.address()]);
        }

        let prompt = self.prompt.clone();
        let address = self.wallet.address();
        let approved = tokio::task::spawn_blocking(move || prompt(address))
            .await
            .map_err(|e| ProviderError::Request(format!("prompt failed: {}", e)))?;

        if !approved {
            debug!(account = %address, "Connection request declined");
            return Err(ProviderError::UserRejected);
        }

        self.authorized.store(true, Ordering::SeqCst);
        Ok(vec![address])
    }

    async fn switch_chain(&self, chain_id: u64) -> std::result::Result<(), ProviderError> {
        if !self.known_chains.read().await.contains_key(&chain_id) {
            return Err(ProviderError::UnrecognizedChain(chain_id));
        }
        self.active_chain.store(chain_id, Ordering::SeqCst);
        Ok(())
    }

    async fn add_chain(&self, network: &NetworkConfig) -> std::result::Result<(), ProviderError> {
        if network.rpc_urls.is_empty() {
            return Err(ProviderError::Request(format!(
                "network {} has no RPC URLs",
                network.chain_id_hex()
            )));
        }
        self.known_chains
            .write()
            .await
            .insert(network.chain_id, network.chain_name.clone());
        info!(chain = %network.chain_id_hex(), name = %network.chain_name, "Network added");
        Ok(())
    }

    fn bind_contracts(
        &self,
        contracts: &ContractAddresses,
    ) -> std::result::Result<Arc<dyn ContractWriter>, ProviderError> {
        let provider = ProviderBuilder::new()
            .wallet(self.wallet.wallet().clone())
            .connect_http(self.endpoint.clone())
            .erased();
        Ok(Arc::new(AlloyContractWriter::new(provider, *contracts)))
    }
}
