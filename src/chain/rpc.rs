//! JSON-RPC chain reader with primary/fallback endpoints

use alloy::primitives::Address;
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use async_trait::async_trait;
use std::future::Future;
use tracing::{debug, info, warn};

use super::{ChainReader, ReadError, StakeRecord};
use crate::config::{ContractAddresses, RpcConfig};
use crate::contracts::{IArubToken, IStaking};
use crate::units::to_display;

/// Chain reader backed by a public JSON-RPC endpoint
pub struct RpcChainReader {
    provider: DynProvider,
    contracts: ContractAddresses,
    decimals: u8,
}

impl RpcChainReader {
    /// Connect to the first endpoint that answers with the expected chain id.
    ///
    /// Fails with [`ReadError::ProviderUnavailable`] when every endpoint is
    /// unreachable or serves a different chain.
    pub async fn connect(
        rpc: &RpcConfig,
        chain_id: u64,
        contracts: ContractAddresses,
        decimals: u8,
    ) -> Result<Self, ReadError> {
        let provider = first_reachable(rpc.endpoints(), |endpoint| Self::open(endpoint, chain_id)).await?;
        Ok(Self {
            provider,
            contracts,
            decimals,
        })
    }

    async fn open(endpoint: &str, chain_id: u64) -> Result<DynProvider, String> {
        let url: url::Url = endpoint
            .parse()
            .map_err(|e| format!("invalid URL: {}", e))?;

        let provider = ProviderBuilder::new().connect_http(url).erased();

        let actual = provider
            .get_chain_id()
            .await
            .map_err(|e| e.to_string())?;
        if actual != chain_id {
            return Err(format!("serves chain {}, expected {}", actual, chain_id));
        }

        Ok(provider)
    }
}

/// Run `open` against each endpoint in order and keep the first success
async fn first_reachable<'a, T, F, Fut>(
    endpoints: impl IntoIterator<Item = &'a str>,
    mut open: F,
) -> Result<T, ReadError>
where
    F: FnMut(&'a str) -> Fut,
    Fut: Future<Output = Result<T, String>>,
{
    let mut failures = Vec::new();

    for endpoint in endpoints {
        let host = endpoint_host(endpoint);
        match open(endpoint).await {
            Ok(connection) => {
                info!(endpoint = %host, "Chain reader connected");
                return Ok(connection);
            }
            Err(e) => {
                warn!(endpoint = %host, error = %e, "RPC endpoint unavailable, trying next");
                failures.push(format!("{}: {}", host, e));
            }
        }
    }

    if failures.is_empty() {
        return Err(ReadError::ProviderUnavailable(
            "no endpoints configured".to_string(),
        ));
    }
    Err(ReadError::ProviderUnavailable(failures.join("; ")))
}

/// Host part of an endpoint, so API keys embedded in paths never reach the logs
fn endpoint_host(endpoint: &str) -> String {
    url::Url::parse(endpoint)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
        .unwrap_or_else(|| "<invalid url>".to_string())
}

#[async_trait]
impl ChainReader for RpcChainReader {
    async fn total_supply(&self) -> Result<f64, ReadError> {
        let token = IArubToken::new(self.contracts.arub, &self.provider);
        let raw = token
            .totalSupply()
            .call()
            .await
            .map_err(|e| ReadError::call("totalSupply", e))?;
        debug!(raw = %raw, "Fetched ARUB total supply");
        Ok(to_display(raw, self.decimals))
    }

    async fn current_price(&self) -> Result<f64, ReadError> {
        let token = IArubToken::new(self.contracts.arub, &self.provider);
        let raw = token
            .currentPrice()
            .call()
            .await
            .map_err(|e| ReadError::call("currentPrice", e))?;
        debug!(raw = %raw, "Fetched ARUB price");
        Ok(to_display(raw, self.decimals))
    }

    async fn total_staked_stable(&self) -> Result<f64, ReadError> {
        let staking = IStaking::new(self.contracts.staking, &self.provider);
        let raw = staking
            .totalStakedUSDT()
            .call()
            .await
            .map_err(|e| ReadError::call("totalStakedUSDT", e))?;
        Ok(to_display(raw, self.decimals))
    }

    async fn total_staked_token(&self) -> Result<f64, ReadError> {
        let staking = IStaking::new(self.contracts.staking, &self.provider);
        let raw = staking
            .totalStakedARUB()
            .call()
            .await
            .map_err(|e| ReadError::call("totalStakedARUB", e))?;
        Ok(to_display(raw, self.decimals))
    }

    async fn user_stake(&self, account: Address) -> Result<StakeRecord, ReadError> {
        let staking = IStaking::new(self.contracts.staking, &self.provider);
        let stakes = staking
            .userStakes(account)
            .call()
            .await
            .map_err(|e| ReadError::call("userStakes", e))?;

        Ok(StakeRecord {
            stable_amount: to_display(stakes.usdtAmount, self.decimals),
            token_amount: to_display(stakes.arubAmount, self.decimals),
            staked_at: u64::try_from(stakes.timestamp).unwrap_or(u64::MAX),
            last_claim_at: u64::try_from(stakes.lastClaimTime).unwrap_or(u64::MAX),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_host_strips_api_key() {
        assert_eq!(
            endpoint_host("https://sepolia.infura.io/v3/9aa3d95b3bc440fa88ea12eaa4456161"),
            "sepolia.infura.io"
        );
        assert_eq!(endpoint_host("not a url"), "<invalid url>");
    }

    #[tokio::test]
    async fn failing_primary_falls_back_in_order() {
        let attempts = std::sync::Mutex::new(Vec::new());
        let endpoints = [
            "https://primary.example/rpc",
            "https://fallback.example/rpc",
            "https://spare.example/rpc",
        ];

        let chosen = first_reachable(endpoints, |endpoint| {
            attempts.lock().unwrap().push(endpoint);
            async move {
                if endpoint.contains("primary") {
                    Err("connection refused".to_string())
                } else {
                    Ok(endpoint)
                }
            }
        })
        .await
        .unwrap();

        assert_eq!(chosen, "https://fallback.example/rpc");
        assert_eq!(
            *attempts.lock().unwrap(),
            vec!["https://primary.example/rpc", "https://fallback.example/rpc"]
        );
    }

    #[tokio::test]
    async fn every_failure_is_reported_by_host() {
        let endpoints = ["https://primary.example/v3/secret", "https://fallback.example"];

        let result = first_reachable(endpoints, |_| async { Err::<(), _>("timed out".to_string()) }).await;

        match result {
            Err(ReadError::ProviderUnavailable(msg)) => {
                assert_eq!(msg, "primary.example: timed out; fallback.example: timed out");
            }
            _ => panic!("expected ProviderUnavailable"),
        }
    }

    #[tokio::test]
    async fn connect_with_no_endpoints_is_unavailable() {
        let rpc = RpcConfig::with_urls(vec![]);
        let result = RpcChainReader::connect(&rpc, 11_155_111, ContractAddresses::default(), 6).await;
        assert!(matches!(result, Err(ReadError::ProviderUnavailable(_))));
    }

    #[tokio::test]
    async fn connect_with_invalid_urls_is_unavailable() {
        let rpc = RpcConfig::with_urls(vec!["::not-a-url::".to_string()]);
        let result = RpcChainReader::connect(&rpc, 11_155_111, ContractAddresses::default(), 6).await;
        match result {
            Err(ReadError::ProviderUnavailable(msg)) => assert!(msg.contains("invalid URL")),
            _ => panic!("expected ProviderUnavailable"),
        }
    }
}
