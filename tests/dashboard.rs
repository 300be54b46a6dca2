//! End-to-end dashboard flow against in-process mocks

use alloy::primitives::{address, Address, TxHash, B256, U256};
use arub_dashboard::chain::{ChainReader, ReadError, StakeRecord};
use arub_dashboard::config::{ContractAddresses, NetworkConfig};
use arub_dashboard::rate::{RateError, RateSource};
use arub_dashboard::wallet::{ContractWriter, ProviderError, WriteError};
use arub_dashboard::{
    ActionError, App, Asset, Config, DataSource, DisplayField, Error, ExchangeRateFetcher,
    MemorySurface, SessionError, WalletKind, WalletProvider,
};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

const ACCOUNT: Address = address!("4242424242424242424242424242424242424242");

/// Chain with settable supply; the price read always reverts
struct MockChain {
    supply: Mutex<f64>,
    staked: Mutex<StakeRecord>,
}

#[async_trait]
impl ChainReader for MockChain {
    async fn total_supply(&self) -> Result<f64, ReadError> {
        Ok(*self.supply.lock().unwrap())
    }

    async fn current_price(&self) -> Result<f64, ReadError> {
        Err(ReadError::Call {
            call: "currentPrice",
            message: "execution reverted".to_string(),
        })
    }

    async fn total_staked_stable(&self) -> Result<f64, ReadError> {
        Ok(2_000.0)
    }

    async fn total_staked_token(&self) -> Result<f64, ReadError> {
        Ok(100.0)
    }

    async fn user_stake(&self, account: Address) -> Result<StakeRecord, ReadError> {
        assert_eq!(account, ACCOUNT);
        Ok(*self.staked.lock().unwrap())
    }
}

struct FixedRate(f64);

#[async_trait]
impl RateSource for FixedRate {
    async fn fetch_rate(&self) -> Result<f64, RateError> {
        Ok(self.0)
    }
}

#[derive(Default)]
struct Ledger {
    calls: Mutex<Vec<&'static str>>,
    reject_approve: AtomicBool,
}

#[async_trait]
impl ContractWriter for Ledger {
    async fn approve(&self, _: Asset, _: Address, _: U256) -> Result<TxHash, WriteError> {
        self.calls.lock().unwrap().push("approve");
        if self.reject_approve.load(Ordering::SeqCst) {
            return Err(WriteError::Submit {
                call: "approve",
                message: "insufficient funds".to_string(),
            });
        }
        Ok(B256::repeat_byte(1))
    }

    async fn mint(&self, _: U256) -> Result<TxHash, WriteError> {
        self.calls.lock().unwrap().push("mint");
        Ok(B256::repeat_byte(2))
    }

    async fn burn(&self, _: U256) -> Result<TxHash, WriteError> {
        self.calls.lock().unwrap().push("burn");
        Ok(B256::repeat_byte(3))
    }

    async fn stake(&self, _: Asset, _: U256) -> Result<TxHash, WriteError> {
        self.calls.lock().unwrap().push("stake");
        Ok(B256::repeat_byte(4))
    }

    async fn unstake(&self, _: Asset) -> Result<TxHash, WriteError> {
        self.calls.lock().unwrap().push("unstake");
        Ok(B256::repeat_byte(5))
    }

    async fn claim_rewards(&self) -> Result<TxHash, WriteError> {
        self.calls.lock().unwrap().push("claimRewards");
        Ok(B256::repeat_byte(6))
    }

    async fn faucet(&self) -> Result<TxHash, WriteError> {
        self.calls.lock().unwrap().push("faucet");
        Ok(B256::repeat_byte(7))
    }
}

struct MockWallet {
    ledger: Arc<Ledger>,
    approve_connect: bool,
}

#[async_trait]
impl WalletProvider for MockWallet {
    async fn accounts(&self) -> Result<Vec<Address>, ProviderError> {
        Ok(Vec::new())
    }

    async fn request_accounts(&self) -> Result<Vec<Address>, ProviderError> {
        if self.approve_connect {
            Ok(vec![ACCOUNT])
        } else {
            Err(ProviderError::UserRejected)
        }
    }

    async fn switch_chain(&self, chain_id: u64) -> Result<(), ProviderError> {
        Err(ProviderError::UnrecognizedChain(chain_id))
    }

    async fn add_chain(&self, _network: &NetworkConfig) -> Result<(), ProviderError> {
        Err(ProviderError::Request("add chain not supported".to_string()))
    }

    fn bind_contracts(
        &self,
        _contracts: &ContractAddresses,
    ) -> Result<Arc<dyn ContractWriter>, ProviderError> {
        let writer: Arc<dyn ContractWriter> = self.ledger.clone();
        Ok(writer)
    }
}

fn build(supply: f64, ledger: Arc<Ledger>, approve_connect: bool) -> App {
    let config = Config {
        audit_log_path: None,
        ..Config::default()
    };
    let chain: Arc<dyn ChainReader> = Arc::new(MockChain {
        supply: Mutex::new(supply),
        staked: Mutex::new(StakeRecord {
            stable_amount: 150.0,
            token_amount: 25.0,
            staked_at: 1_700_000_000,
            last_claim_at: 1_700_000_500,
        }),
    });
    let rates = Arc::new(ExchangeRateFetcher::new(Some(Arc::new(FixedRate(80.0))), 100.0));
    let wallet: Arc<dyn WalletProvider> = Arc::new(MockWallet {
        ledger,
        approve_connect,
    });
    App::new(config, Some(chain), rates, Some(wallet))
}

#[tokio::test]
async fn live_statistics_use_derived_price_when_price_read_fails() {
    let app = build(5_000.0, Arc::new(Ledger::default()), true);
    let mut surface = MemorySurface::new();

    let source = app.refresh_statistics(&mut surface).await;

    // Rate 80 was fetched before the snapshot: price = 10000 / 80
    assert_eq!(source, DataSource::Live);
    assert_eq!(surface.get(DisplayField::UsdtRubRate), Some("80.00"));
    // First fetched rate: nothing to compare against yet
    assert_eq!(surface.get(DisplayField::RateChange), Some("↑ 0.00%"));
    assert_eq!(surface.get(DisplayField::ArubPrice), Some("$125.00"));
    assert_eq!(surface.get(DisplayField::TotalTvl), Some("$14,500"));
    assert_eq!(surface.get(DisplayField::CurrentApy), Some("16%"));
    assert_eq!(surface.get(DisplayField::MarketCap), Some("$625,000"));
    assert_eq!(surface.get(DisplayField::StakersCount), Some("39"));
    assert_eq!(surface.get(DisplayField::Transactions24h), Some("140"));
}

#[tokio::test]
async fn surface_without_fields_is_skipped() {
    let app = build(5_000.0, Arc::new(Ledger::default()), true);
    let mut surface = MemorySurface::with_fields([DisplayField::ArubPrice, DisplayField::CurrentApy]);

    app.refresh_statistics(&mut surface).await;

    assert_eq!(surface.len(), 2);
    assert!(surface.get(DisplayField::MarketCap).is_none());
}

#[tokio::test]
async fn zero_supply_falls_back_to_demo() {
    let app = build(0.0, Arc::new(Ledger::default()), true);
    let mut surface = MemorySurface::new();

    assert_eq!(app.refresh_statistics(&mut surface).await, DataSource::Demo);
    assert_eq!(surface.get(DisplayField::TotalTvl), Some("$1,250"));
}

#[tokio::test]
async fn rejected_connect_blocks_actions() {
    let ledger = Arc::new(Ledger::default());
    let mut app = build(5_000.0, ledger.clone(), false);
    let mut surface = MemorySurface::new();

    let err = app.connect(&mut surface, WalletKind::Injected).await.unwrap_err();
    assert!(matches!(err, SessionError::UserRejected));
    assert!(surface.is_empty());

    let err = app.buy(&mut surface, "10").await.unwrap_err();
    assert!(matches!(err, Error::Action(ActionError::NotConnected)));
    assert!(ledger.calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn connect_then_stake_refreshes_position() {
    let ledger = Arc::new(Ledger::default());
    let mut app = build(5_000.0, ledger.clone(), true);
    let mut surface = MemorySurface::new();

    // Network switch and add both fail; the session is still established
    let account = app.connect(&mut surface, WalletKind::Injected).await.unwrap();
    assert_eq!(account, ACCOUNT);
    assert_eq!(surface.get(DisplayField::UserStaked), Some("150.00 USDT + 25.00 ARUB"));

    let outcome = app.stake(&mut surface, Asset::Arub, "12.5").await.unwrap();

    assert_eq!(*ledger.calls.lock().unwrap(), vec!["approve", "stake"]);
    assert_eq!(outcome.approve_tx, Some(B256::repeat_byte(1)));
    assert_eq!(outcome.tx, B256::repeat_byte(4));

    let position = outcome.position.unwrap();
    assert_eq!(position.token_staked, 25.0);
    assert!((position.estimated_rewards - 2.0).abs() < 1e-9);
    assert_eq!(surface.get(DisplayField::UserRewards), Some("2.00 ARUB"));
}

#[tokio::test]
async fn failed_approve_aborts_buy() {
    let ledger = Arc::new(Ledger::default());
    ledger.reject_approve.store(true, Ordering::SeqCst);
    let mut app = build(5_000.0, ledger.clone(), true);
    app.connect(&mut MemorySurface::new(), WalletKind::Injected).await.unwrap();
    let mut surface = MemorySurface::new();

    let err = app.buy(&mut surface, "10").await.unwrap_err();

    assert_eq!(err.to_string(), "Transaction failed. Please try again.");
    assert_eq!(*ledger.calls.lock().unwrap(), vec!["approve"]);
    assert!(surface.is_empty());
}

#[tokio::test]
async fn disconnect_drops_session() {
    let mut app = build(5_000.0, Arc::new(Ledger::default()), true);
    let mut surface = MemorySurface::new();
    app.connect(&mut surface, WalletKind::WalletConnect).await.unwrap();
    assert!(app.session().is_active());

    app.disconnect();
    let mut surface = MemorySurface::new();
    assert!(app.refresh_position(&mut surface).await.is_none());
}
