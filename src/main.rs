//! ARUB dashboard CLI
//!
//! Command-line interface for the ARUB statistics dashboard and wallet actions.

use arub_dashboard::config::PRIVATE_KEY_ENV;
use arub_dashboard::wallet::{ConnectPrompt, LocalKeyProvider, SecureWallet};
use arub_dashboard::{
    ActionOutcome, App, Asset, Config, DisplaySurface, Error, MemorySurface, Result, RpcConfig,
    TerminalSurface, WalletKind, WalletProvider,
};
use clap::{Parser, Subcommand, ValueEnum};
use secrecy::SecretString;
use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "arub-dash")]
#[command(about = "ARUB token statistics dashboard")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to config file (JSON)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    log_json: bool,

    /// Approve the wallet connection prompt without asking
    #[arg(short = 'y', long, global = true)]
    yes: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Show token and staking statistics once
    Stats {
        /// Print fields as JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Refresh statistics periodically until Ctrl-C
    Watch {
        /// Refresh interval in seconds (defaults to the configured interval)
        #[arg(short, long)]
        interval: Option<u64>,
    },

    /// Preview a trade at the current price
    Quote {
        #[arg(value_enum)]
        side: QuoteSide,

        /// Amount in USDT (buy) or ARUB (sell)
        amount: f64,
    },

    /// Show the connected account's staking position
    Position,

    /// Buy ARUB with USDT
    Buy {
        /// USDT amount
        amount: String,
    },

    /// Sell ARUB for USDT
    Sell {
        /// ARUB amount
        amount: String,
    },

    /// Stake USDT or ARUB
    Stake {
        #[arg(value_enum)]
        asset: Asset,
        amount: String,
    },

    /// Withdraw the whole stake of one asset
    Unstake {
        #[arg(value_enum)]
        asset: Asset,
    },

    /// Claim staking rewards
    Claim,

    /// Request test USDT from the faucet
    Faucet,

    /// Show current configuration
    Config,
}

impl Commands {
    /// Commands that fail without a connected wallet
    fn needs_wallet(&self) -> bool {
        !matches!(
            self,
            Commands::Stats { .. } | Commands::Watch { .. } | Commands::Quote { .. } | Commands::Config
        )
    }

    /// Commands that read PRIVATE_KEY; `watch` uses it when already authorized
    fn loads_wallet(&self) -> bool {
        self.needs_wallet() || matches!(self, Commands::Watch { .. })
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum QuoteSide {
    Buy,
    Sell,
}

#[tokio::main]
async fn main() {
    // Load .env file if present (ignore if not found)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_logging(cli.verbose, cli.log_json);

    if let Err(e) = run(cli).await {
        tracing::error!(error = %e, "Command failed");
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool, json: bool) {
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(json.then(|| fmt::layer().json().with_writer(std::io::stderr)))
        .with((!json).then(|| fmt::layer().with_writer(std::io::stderr)))
        .with(filter)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };

    if let Commands::Config = cli.command {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    let rpc = RpcConfig::from_env(&config.network);
    let needs_wallet = cli.command.needs_wallet();
    let wallet = if cli.command.loads_wallet() {
        load_wallet(&config, &rpc, cli.yes)?
    } else {
        None
    };

    let mut app = App::from_config(config, &rpc, wallet).await;
    let mut terminal = TerminalSurface::stdout("ARUB dashboard");

    if needs_wallet {
        let account = app.connect(&mut terminal, WalletKind::LocalKey).await?;
        tracing::info!(account = %account, "Using wallet account");
    }

    match cli.command {
        Commands::Stats { json } => {
            if json {
                let mut surface = MemorySurface::new();
                let source = app.refresh_statistics(&mut surface).await;
                let out = serde_json::json!({
                    "source": source,
                    "fields": surface.to_json(),
                });
                println!("{}", serde_json::to_string_pretty(&out)?);
            } else {
                app.refresh_statistics(&mut terminal).await;
                terminal.flush()?;
            }
        }
        Commands::Watch { interval } => {
            let interval = interval
                .map(Duration::from_secs)
                .unwrap_or_else(|| Duration::from_millis(app.config().statistics.update_interval_ms));
            if interval.is_zero() {
                return Err(Error::InvalidArgument("interval must be positive".to_string()));
            }
            app.auto_connect(&mut terminal).await;
            app.run(&mut terminal, interval).await?;
        }
        Commands::Quote { side, amount } => {
            let price = app.quote_price();
            match side {
                QuoteSide::Buy => {
                    let tokens = app.quote_buy(amount)?;
                    println!("{} USDT -> {:.4} ARUB (price ${:.2})", amount, tokens, price);
                }
                QuoteSide::Sell => {
                    let stable = app.quote_sell(amount)?;
                    println!("{} ARUB -> {:.2} USDT (price ${:.2})", amount, stable, price);
                }
            }
        }
        Commands::Position => match app.refresh_position(&mut terminal).await {
            Some(_) => terminal.flush()?,
            None => println!("No position data available"),
        },
        Commands::Buy { amount } => {
            let outcome = app.buy(&mut terminal, &amount).await?;
            report(&mut terminal, &outcome)?;
        }
        Commands::Sell { amount } => {
            let outcome = app.sell(&mut terminal, &amount).await?;
            report(&mut terminal, &outcome)?;
        }
        Commands::Stake { asset, amount } => {
            let outcome = app.stake(&mut terminal, asset, &amount).await?;
            report(&mut terminal, &outcome)?;
        }
        Commands::Unstake { asset } => {
            let outcome = app.unstake(&mut terminal, asset).await?;
            report(&mut terminal, &outcome)?;
        }
        Commands::Claim => {
            let outcome = app.claim(&mut terminal).await?;
            report(&mut terminal, &outcome)?;
        }
        Commands::Faucet => {
            let outcome = app.faucet(&mut terminal).await?;
            report(&mut terminal, &outcome)?;
        }
        Commands::Config => {}
    }

    Ok(())
}

/// Build the local-key wallet if PRIVATE_KEY is set.
///
/// With `auto_approve` the account is exposed without a prompt, which is what
/// lets `watch` auto-connect.
fn load_wallet(config: &Config, rpc: &RpcConfig, auto_approve: bool) -> Result<Option<Arc<dyn WalletProvider>>> {
    let Ok(key) = std::env::var(PRIVATE_KEY_ENV) else {
        tracing::debug!("No {} set - wallet actions unavailable", PRIVATE_KEY_ENV);
        return Ok(None);
    };
    let key = SecretString::from(key);
    let wallet = SecureWallet::from_secret(&key)?;
    tracing::info!(address = %wallet.address(), "Loaded wallet from {}", PRIVATE_KEY_ENV);

    let endpoint = rpc
        .primary()
        .ok_or_else(|| Error::Config("no RPC endpoint for signing".to_string()))?;

    let prompt: Option<ConnectPrompt> = if auto_approve {
        None
    } else {
        Some(Arc::new(stdin_prompt))
    };

    let provider: Arc<dyn WalletProvider> = Arc::new(LocalKeyProvider::for_endpoint(
        wallet,
        endpoint,
        config.network.chain_id,
        prompt,
    )?);
    Ok(Some(provider))
}

fn stdin_prompt(account: alloy::primitives::Address) -> bool {
    eprint!("Connect account {} to the ARUB dashboard? [y/N] ", account);
    let _ = std::io::stderr().flush();

    let mut answer = String::new();
    if std::io::stdin().lock().read_line(&mut answer).is_err() {
        return false;
    }
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

fn report(terminal: &mut TerminalSurface, outcome: &ActionOutcome) -> Result<()> {
    println!("{}", outcome.kind.success_message());
    if let Some(approve) = outcome.approve_tx {
        println!("  approve: {}", approve);
    }
    println!("  tx:      {}", outcome.tx);
    terminal.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn command(args: &[&str]) -> Commands {
        Cli::parse_from(std::iter::once("arub-dash").chain(args.iter().copied())).command
    }

    #[test]
    fn read_only_commands_skip_the_key() {
        for args in [&["stats"][..], &["stats", "--json"], &["quote", "buy", "10"], &["config"]] {
            let command = command(args);
            assert!(!command.loads_wallet(), "{:?} should not load the wallet", args);
            assert!(!command.needs_wallet());
        }
    }

    #[test]
    fn watch_loads_key_without_requiring_it() {
        let command = command(&["watch", "--interval", "5"]);
        assert!(command.loads_wallet());
        assert!(!command.needs_wallet());
    }

    #[test]
    fn write_commands_require_wallet() {
        for args in [&["buy", "10"][..], &["stake", "usdt", "5"], &["unstake", "arub"], &["claim"], &["position"]] {
            let command = command(args);
            assert!(command.loads_wallet());
            assert!(command.needs_wallet(), "{:?} should need the wallet", args);
        }
    }
}
