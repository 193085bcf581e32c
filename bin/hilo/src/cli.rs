//! Module for the CLI.

use alloy_primitives::Address;
use anyhow::{anyhow, bail, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use hilo_engine::{JwtSecret, DEFAULT_CALL_TIMEOUT};
use hilo_primitives::SEQUENCER_FEE_VAULT_ADDRESS;
use hilo_replay::{ReplayConfig, DEFAULT_POLL_INTERVAL};
use reqwest::Url;
use std::{
    path::{Path, PathBuf},
    str::FromStr,
    time::Duration,
};
use tracing::Level;

/// Prefunded development keys matching the accounts unlocked on a local
/// test chain.
const POOL_KEY: &str = "8166f546bab6da521a8369cab06c5d2b9e46670292d85c875ee9ec20e84ffb61";
const ATTRIBUTES_KEY: &str = "c526ee95bf44d8fc405a158bb884d9d1238d99f0612e9f33d006bb0789009aaa";
const DEPOSIT_KEY: &str = "a267530f49f8280200edf313ee7af6b827f2a8bce2897751d06a843f644967b1";

/// Main CLI
#[derive(Parser, Clone, Debug)]
#[command(author, version, about, long_about = None)]
pub(crate) struct Cli {
    /// Verbosity level (0-4)
    #[arg(long, short, help = "Verbosity level (0-4)", action = ArgAction::Count)]
    pub v: u8,
    /// The subcommand to run.
    #[clap(subcommand)]
    pub subcommand: HiloSubcommand,
}

/// Subcommands for the CLI.
#[derive(Debug, Clone, Subcommand)]
pub(crate) enum HiloSubcommand {
    /// Replay legacy blocks onto the target chain continuously.
    Run(ReplayArgs),
    /// Replay the next legacy block and exit.
    Once(ReplayArgs),
    /// Seal a block of demo deposits through the block production path.
    Deposit(DepositArgs),
}

/// Connection flags shared by every subcommand.
#[derive(Debug, Clone, Args)]
pub(crate) struct ReplayArgs {
    /// JSON-RPC endpoint of the legacy chain replica.
    #[clap(
        long,
        visible_alias = "legacy",
        default_value = "https://replica.goerli.boba.network",
        env
    )]
    pub legacy_endpoint: Url,
    /// Public JSON-RPC endpoint of the target chain node.
    #[clap(long, visible_alias = "target", default_value = "http://127.0.0.1:9545", env)]
    pub target_endpoint: Url,
    /// Authenticated engine endpoint of the target chain node.
    #[clap(long, visible_alias = "engine", default_value = "http://localhost:8551", env)]
    pub engine_endpoint: String,
    /// Path to the hex encoded 32 byte JWT secret for the engine endpoint.
    #[clap(long, visible_alias = "jwt", default_value = "./static/test-jwt-secret.txt", env)]
    pub jwt_secret: PathBuf,
    /// Account credited with fees on produced blocks.
    #[clap(long, value_parser = parse_address, default_value_t = SEQUENCER_FEE_VAULT_ADDRESS, env)]
    pub fee_recipient: Address,
    /// Seconds between polls for a new legacy block.
    #[clap(long, default_value_t = DEFAULT_POLL_INTERVAL.as_secs(), env)]
    pub poll_interval: u64,
    /// Seconds allowed for a single engine call.
    #[clap(long, default_value_t = DEFAULT_CALL_TIMEOUT.as_secs(), env)]
    pub call_timeout: u64,
}

impl ReplayArgs {
    /// Loads the JWT secret and assembles the replay configuration.
    pub fn config(&self) -> Result<ReplayConfig> {
        if self.poll_interval == 0 {
            bail!("poll interval must be at least one second");
        }
        if self.call_timeout == 0 {
            bail!("call timeout must be at least one second");
        }
        Ok(ReplayConfig {
            legacy_endpoint: self.legacy_endpoint.clone(),
            target_endpoint: self.target_endpoint.clone(),
            engine_endpoint: self.engine_endpoint.clone(),
            jwt_secret: read_jwt_secret(&self.jwt_secret)?,
            fee_recipient: self.fee_recipient,
            poll_interval: Duration::from_secs(self.poll_interval),
            call_timeout: Duration::from_secs(self.call_timeout),
        })
    }
}

/// Flags for the deposit demo.
#[derive(Debug, Clone, Args)]
pub(crate) struct DepositArgs {
    /// Connection flags shared with the replay subcommands.
    #[clap(flatten)]
    pub replay: ReplayArgs,
    /// Hex encoded key signing the transaction submitted to the pool.
    #[clap(long, default_value = POOL_KEY, env)]
    pub pool_key: String,
    /// Hex encoded key signing the transaction carried in the attributes.
    #[clap(long, default_value = ATTRIBUTES_KEY, env)]
    pub attributes_key: String,
    /// Hex encoded key of the account credited by both deposits.
    #[clap(long, default_value = DEPOSIT_KEY, env)]
    pub deposit_key: String,
    /// Wei of native currency minted to the deposit account.
    #[clap(long, default_value_t = 1_000_000_000, env)]
    pub mint_eth: u128,
    /// Bridged tokens minted to the deposit account.
    #[clap(long, default_value_t = 1_000_000_000, env)]
    pub mint_token: u128,
}

impl Cli {
    /// Initializes telemtry for the application.
    pub fn init_telemetry(self) -> Result<Self> {
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(match self.v {
                0 => Level::ERROR,
                1 => Level::WARN,
                2 => Level::INFO,
                3 => Level::DEBUG,
                _ => Level::TRACE,
            })
            .finish();
        tracing::subscriber::set_global_default(subscriber).map_err(|e| anyhow!(e))?;
        Ok(self)
    }

    /// Parse the CLI arguments and run the command
    pub async fn run(&self) -> Result<()> {
        match &self.subcommand {
            HiloSubcommand::Run(args) => crate::run::replay(args.config()?).await,
            HiloSubcommand::Once(args) => crate::once::replay_once(args.config()?).await,
            HiloSubcommand::Deposit(args) => crate::deposit::demo(args).await,
        }
    }
}

/// Parses an [Address] from a command line string.
pub(crate) fn parse_address(s: &str) -> Result<Address, String> {
    Address::from_str(s).map_err(|_| format!("Invalid address value: {}", s))
}

/// Reads a hex encoded 32 byte JWT secret from `path`.
pub(crate) fn read_jwt_secret(path: &Path) -> Result<JwtSecret> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow!("Failed to read JWT secret at {}: {}", path.display(), e))?;
    JwtSecret::from_hex(raw.trim()).map_err(|e| anyhow!(e))
}
