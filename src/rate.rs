//! USDT/RUB exchange rate fetcher
//!
//! Pulls the fiat rate from an external endpoint and keeps the last good value.
//! Failures never propagate: the held rate (initially the configured fallback)
//! is returned and the failure is logged.

use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::config::ExchangeRateConfig;

#[derive(Debug, Error)]
pub enum RateError {
    #[error("request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("rate table has no '{0}' entry")]
    MissingCurrency(String),

    #[error("rejected non-positive rate {0}")]
    InvalidRate(f64),
}

/// A source of the current fiat rate
#[async_trait]
pub trait RateSource: Send + Sync {
    async fn fetch_rate(&self) -> Result<f64, RateError>;
}

#[derive(Debug, Deserialize)]
struct RateTable {
    rates: HashMap<String, f64>,
}

/// Rate source reading one currency out of a JSON rate table
pub struct HttpRateSource {
    client: reqwest::Client,
    endpoint: String,
    currency: String,
}

impl HttpRateSource {
    pub fn new(config: &ExchangeRateConfig) -> Result<Self, RateError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()?;
        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            currency: config.currency.clone(),
        })
    }
}

#[async_trait]
impl RateSource for HttpRateSource {
    async fn fetch_rate(&self) -> Result<f64, RateError> {
        let table: RateTable = self
            .client
            .get(&self.endpoint)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        table
            .rates
            .get(&self.currency)
            .copied()
            .ok_or_else(|| RateError::MissingCurrency(self.currency.clone()))
    }
}

/// Holds the last known rate and refreshes it opportunistically
pub struct ExchangeRateFetcher {
    source: Option<Arc<dyn RateSource>>,
    /// f64 bits of the held rate
    rate: AtomicU64,
    /// f64 bits of the percent change at the last refresh
    change: AtomicU64,
    /// Set once a rate has come from the source; until then the held rate
    /// is the fallback and there is nothing to compare against
    fetched: AtomicBool,
}

impl ExchangeRateFetcher {
    /// Create a fetcher; `None` disables fetching and pins the fallback rate
    pub fn new(source: Option<Arc<dyn RateSource>>, fallback_rate: f64) -> Self {
        Self {
            source,
            rate: AtomicU64::new(fallback_rate.to_bits()),
            change: AtomicU64::new(0f64.to_bits()),
            fetched: AtomicBool::new(false),
        }
    }

    /// Build from config, falling back to a pinned rate if the HTTP client
    /// cannot be constructed
    pub fn from_config(config: &ExchangeRateConfig) -> Self {
        let source: Option<Arc<dyn RateSource>> = if config.enabled {
            match HttpRateSource::new(config) {
                Ok(source) => Some(Arc::new(source)),
                Err(e) => {
                    tracing::warn!(error = %e, "Exchange rate client unavailable, using fallback rate");
                    None
                }
            }
        } else {
            None
        };
        Self::new(source, config.fallback_rate)
    }

    /// Refresh from the source and return the held rate.
    ///
    /// On any failure the previous rate is kept and returned.
    pub async fn get_rate(&self) -> f64 {
        let Some(source) = &self.source else {
            return self.current();
        };

        let fetched = source.fetch_rate().await.and_then(|rate| {
            if rate.is_finite() && rate > 0.0 {
                Ok(rate)
            } else {
                Err(RateError::InvalidRate(rate))
            }
        });

        match fetched {
            Ok(rate) => {
                let previous = self.current();
                let change = if self.fetched.swap(true, Ordering::Relaxed) {
                    (rate - previous) / previous * 100.0
                } else {
                    0.0
                };
                self.rate.store(rate.to_bits(), Ordering::Relaxed);
                self.change.store(change.to_bits(), Ordering::Relaxed);
                tracing::info!(rate, change_percent = change, "Exchange rate updated");
                rate
            }
            Err(e) => {
                let rate = self.current();
                tracing::warn!(error = %e, rate, "Exchange rate fetch failed, keeping last rate");
                rate
            }
        }
    }

    /// The held rate without refreshing
    pub fn current(&self) -> f64 {
        f64::from_bits(self.rate.load(Ordering::Relaxed))
    }

    /// Percent change between the last two fetched rates, 0 until two
    /// fetches have succeeded
    pub fn change_percent(&self) -> f64 {
        f64::from_bits(self.change.load(Ordering::Relaxed))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Replays a scripted sequence of results
    pub(crate) struct ScriptedRates(Mutex<Vec<Result<f64, RateError>>>);

    impl ScriptedRates {
        pub(crate) fn new(mut script: Vec<Result<f64, RateError>>) -> Self {
            script.reverse();
            Self(Mutex::new(script))
        }
    }

    #[async_trait]
    impl RateSource for ScriptedRates {
        async fn fetch_rate(&self) -> Result<f64, RateError> {
            self.0
                .lock()
                .unwrap()
                .pop()
                .unwrap_or_else(|| Err(RateError::MissingCurrency("RUB".to_string())))
        }
    }

    #[tokio::test]
    async fn first_failure_returns_fallback() {
        let source = ScriptedRates::new(vec![Err(RateError::MissingCurrency("RUB".into()))]);
        let fetcher = ExchangeRateFetcher::new(Some(Arc::new(source)), 100.0);

        assert_eq!(fetcher.get_rate().await, 100.0);
        assert_eq!(fetcher.change_percent(), 0.0);
    }

    #[tokio::test]
    async fn failure_retains_last_good_rate() {
        let source = ScriptedRates::new(vec![
            Ok(92.5),
            Err(RateError::MissingCurrency("RUB".into())),
        ]);
        let fetcher = ExchangeRateFetcher::new(Some(Arc::new(source)), 100.0);

        assert_eq!(fetcher.get_rate().await, 92.5);
        assert_eq!(fetcher.get_rate().await, 92.5);
        assert_eq!(fetcher.current(), 92.5);
    }

    #[tokio::test]
    async fn rejects_non_positive_rates() {
        let source = ScriptedRates::new(vec![Ok(0.0), Ok(-3.0), Ok(f64::NAN)]);
        let fetcher = ExchangeRateFetcher::new(Some(Arc::new(source)), 100.0);

        for _ in 0..3 {
            assert_eq!(fetcher.get_rate().await, 100.0);
        }
    }

    #[tokio::test]
    async fn change_compares_consecutive_fetches() {
        let source = ScriptedRates::new(vec![Ok(80.0), Ok(88.0)]);
        let fetcher = ExchangeRateFetcher::new(Some(Arc::new(source)), 100.0);

        // The fallback is not a market rate, so the first fetch has no change
        assert_eq!(fetcher.get_rate().await, 80.0);
        assert_eq!(fetcher.change_percent(), 0.0);

        assert_eq!(fetcher.get_rate().await, 88.0);
        assert!((fetcher.change_percent() - 10.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn failed_first_fetch_does_not_count_as_fetched() {
        let source = ScriptedRates::new(vec![Err(RateError::MissingCurrency("RUB".into())), Ok(90.0)]);
        let fetcher = ExchangeRateFetcher::new(Some(Arc::new(source)), 100.0);

        fetcher.get_rate().await;
        assert_eq!(fetcher.get_rate().await, 90.0);
        assert_eq!(fetcher.change_percent(), 0.0);
    }

    #[test]
    fn disabled_fetcher_keeps_fallback() {
        let fetcher = ExchangeRateFetcher::from_config(&ExchangeRateConfig {
            enabled: false,
            ..ExchangeRateConfig::default()
        });
        assert_eq!(tokio_test::block_on(fetcher.get_rate()), 100.0);
        assert_eq!(fetcher.change_percent(), 0.0);
    }

    #[test]
    fn rate_table_parses_target_currency() {
        let body = r#"{"base":"USD","rates":{"EUR":0.92,"RUB":91.7}}"#;
        let table: RateTable = serde_json::from_str(body).unwrap();
        assert_eq!(table.rates.get("RUB"), Some(&91.7));
    }
}
