//! RPC endpoint configuration
//!
//! The chain reader tries endpoints in order: the first is the primary, the
//! rest are fallbacks. Sources, highest priority first:
//! 1. `SEPOLIA_RPC_URL` / `SEPOLIA_RPC_FALLBACK_URL`
//! 2. Provider API keys (`ALCHEMY_API_KEY`, `INFURA_API_KEY`) - builds URLs automatically
//! 3. The public endpoints listed in the network config
//!
//! # Examples
//!
//! ```bash
//! export SEPOLIA_RPC_URL="https://eth-sepolia.g.alchemy.com/v2/YOUR_KEY"
//! # or
//! export ALCHEMY_API_KEY="YOUR_KEY"
//! ```

use super::NetworkConfig;

/// Ordered list of JSON-RPC endpoints for the target chain
#[derive(Debug, Clone)]
pub struct RpcConfig {
    endpoints: Vec<String>,
}

/// Environment variable names
mod env_vars {
    pub const SEPOLIA_RPC_URL: &str = "SEPOLIA_RPC_URL";
    pub const SEPOLIA_RPC_FALLBACK_URL: &str = "SEPOLIA_RPC_FALLBACK_URL";

    pub const ALCHEMY_API_KEY: &str = "ALCHEMY_API_KEY";
    pub const INFURA_API_KEY: &str = "INFURA_API_KEY";
}

impl RpcConfig {
    /// Build the endpoint list from the process environment
    pub fn from_env(network: &NetworkConfig) -> Self {
        Self::from_lookup(network, |name| std::env::var(name).ok())
    }

    /// Build the endpoint list from an arbitrary variable lookup
    pub fn from_lookup(network: &NetworkConfig, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut endpoints = Vec::new();

        if let Some(url) = lookup(env_vars::SEPOLIA_RPC_URL) {
            tracing::debug!("Using SEPOLIA_RPC_URL as primary endpoint");
            endpoints.push(url);
        }
        if let Some(url) = lookup(env_vars::SEPOLIA_RPC_FALLBACK_URL) {
            tracing::debug!("Using SEPOLIA_RPC_FALLBACK_URL as fallback endpoint");
            endpoints.push(url);
        }

        if let Some(key) = lookup(env_vars::ALCHEMY_API_KEY) {
            tracing::info!("Adding Sepolia endpoint from ALCHEMY_API_KEY");
            endpoints.push(format!("https://eth-sepolia.g.alchemy.com/v2/{}", key));
        }
        if let Some(key) = lookup(env_vars::INFURA_API_KEY) {
            tracing::info!("Adding Sepolia endpoint from INFURA_API_KEY");
            endpoints.push(format!("https://sepolia.infura.io/v3/{}", key));
        }

        if endpoints.is_empty() {
            tracing::warn!("No RPC configured, using public Sepolia endpoints (rate limited)");
        }

        for url in &network.rpc_urls {
            if !endpoints.contains(url) {
                endpoints.push(url.clone());
            }
        }

        Self { endpoints }
    }

    /// Create with explicit endpoints, primary first
    pub fn with_urls(endpoints: Vec<String>) -> Self {
        Self { endpoints }
    }

    /// The primary endpoint
    pub fn primary(&self) -> Option<&str> {
        self.endpoints.first().map(|s| s.as_str())
    }

    /// All endpoints in the order they should be tried
    pub fn endpoints(&self) -> impl Iterator<Item = &str> {
        self.endpoints.iter().map(|s| s.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn public_endpoints_when_env_empty() {
        let network = NetworkConfig::default();
        let config = RpcConfig::from_lookup(&network, lookup_from(&[]));

        let endpoints: Vec<&str> = config.endpoints().collect();
        assert_eq!(endpoints.len(), network.rpc_urls.len());
        assert_eq!(config.primary(), Some(network.rpc_urls[0].as_str()));
    }

    #[test]
    fn explicit_urls_take_priority() {
        let network = NetworkConfig::default();
        let config = RpcConfig::from_lookup(
            &network,
            lookup_from(&[
                (env_vars::SEPOLIA_RPC_URL, "https://primary.rpc"),
                (env_vars::SEPOLIA_RPC_FALLBACK_URL, "https://secondary.rpc"),
            ]),
        );

        let endpoints: Vec<&str> = config.endpoints().collect();
        assert_eq!(endpoints[0], "https://primary.rpc");
        assert_eq!(endpoints[1], "https://secondary.rpc");
        // public endpoints still trail as last resort
        assert_eq!(endpoints.len(), 2 + network.rpc_urls.len());
    }

    #[test]
    fn api_key_builds_url() {
        let network = NetworkConfig::default();
        let config = RpcConfig::from_lookup(
            &network,
            lookup_from(&[(env_vars::ALCHEMY_API_KEY, "abc123")]),
        );

        assert_eq!(
            config.primary(),
            Some("https://eth-sepolia.g.alchemy.com/v2/abc123")
        );
    }

    #[test]
    fn duplicate_urls_are_skipped() {
        let network = NetworkConfig::default();
        let config = RpcConfig::from_lookup(
            &network,
            lookup_from(&[(env_vars::SEPOLIA_RPC_URL, network.rpc_urls[0].as_str())]),
        );

        assert_eq!(config.endpoints().count(), network.rpc_urls.len());
    }
}
