//! Configuration for Yield Keeper
//!
//! CLI arguments and environment variable handling using clap.

use clap::Parser;
use std::net::SocketAddr;

/// Network passphrases, per the Stellar network registry
const TESTNET_PASSPHRASE: &str = "Test SDF Network ; September 2015";
const PUBLIC_PASSPHRASE: &str = "Public Global Stellar Network ; September 2015";

/// Yield Keeper - scheduled harvest keeper for Soroban yield distribution
#[derive(Parser, Debug, Clone)]
#[command(name = "yield-keeper")]
#[command(about = "Scheduled harvest keeper for Soroban yield distribution")]
pub struct Args {
    /// Network selection (TESTNET or PUBLIC)
    #[arg(long, env = "NETWORK", default_value = "TESTNET")]
    pub network: String,

    /// Soroban RPC endpoint
    #[arg(long, env = "SOROBAN_RPC_URL", default_value = "https://soroban-testnet.stellar.org")]
    pub rpc_url: String,

    /// Hex-encoded 32-byte ed25519 seed for the keeper wallet (required)
    #[arg(long, env = "WALLET_SECRET_SEED", hide_env_values = true)]
    pub wallet_secret_seed: Option<String>,

    /// Contract id of the yield distributor (eligibility + distribution info)
    #[arg(long, env = "YIELD_DISTRIBUTOR_ID")]
    pub yield_distributor_id: Option<String>,

    /// Contract id of the lending yield controller (harvest stages)
    #[arg(long, env = "YIELD_CONTROLLER_ID")]
    pub yield_controller_id: Option<String>,

    /// Lending protocol the harvest targets (e.g. "BLEND")
    #[arg(long, env = "PROTOCOL", default_value = "BLEND")]
    pub protocol: String,

    /// Asset the harvest targets (contract id or asset code)
    #[arg(long, env = "ASSET", default_value = "USDC")]
    pub asset: String,

    /// Seconds between scheduler ticks
    #[arg(long, env = "HARVEST_INTERVAL_SECS", default_value = "30")]
    pub harvest_interval_secs: u64,

    /// Run the three-stage harvest/recompound/finalize pipeline.
    /// When false, falls back to the single claim_yield call.
    #[arg(long, env = "STAGED_HARVEST", default_value = "true")]
    pub staged_harvest: bool,

    /// Maximum restore-and-resimulate attempts per stage
    #[arg(long, env = "MAX_RESTORE_RETRIES", default_value = "3")]
    pub max_restore_retries: u32,

    /// RPC request timeout in milliseconds
    #[arg(long, env = "REQUEST_TIMEOUT_MS", default_value = "30000")]
    pub request_timeout_ms: u64,

    /// Base fee in stroops for submitted transactions
    #[arg(long, env = "BASE_FEE", default_value = "100000")]
    pub base_fee: u64,

    /// Address to listen on for the HTTP status/trigger API
    #[arg(long, env = "LISTEN", default_value = "0.0.0.0:3001")]
    pub listen: SocketAddr,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

impl Args {
    /// Network passphrase for the configured network
    pub fn network_passphrase(&self) -> &'static str {
        if self.network.eq_ignore_ascii_case("PUBLIC") {
            PUBLIC_PASSPHRASE
        } else {
            TESTNET_PASSPHRASE
        }
    }

    /// Get the wallet seed, failing if not configured
    pub fn wallet_seed(&self) -> Result<&str, String> {
        self.wallet_secret_seed
            .as_deref()
            .ok_or_else(|| "WALLET_SECRET_SEED is required".to_string())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.wallet_secret_seed.is_none() {
            return Err("WALLET_SECRET_SEED is required".to_string());
        }

        if self.yield_distributor_id.is_none() || self.yield_controller_id.is_none() {
            return Err("YIELD_DISTRIBUTOR_ID and YIELD_CONTROLLER_ID are required".to_string());
        }

        if !self.network.eq_ignore_ascii_case("TESTNET")
            && !self.network.eq_ignore_ascii_case("PUBLIC")
        {
            return Err(format!("Unknown network '{}'", self.network));
        }

        if self.harvest_interval_secs == 0 {
            return Err("HARVEST_INTERVAL_SECS must be greater than zero".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_args() -> Vec<&'static str> {
        vec![
            "yield-keeper",
            "--wallet-secret-seed",
            "9d61b19deffd5a60ba844af492ec2cc44449c5697b326919703bac031cae7f60",
            "--yield-distributor-id",
            "CAAB7XXE6IEGP7J6XHDYBQD4KLV355Y3VRJ2ILW4WQ362NKTRXNLYTLF",
            "--yield-controller-id",
            "CCKVEGGN3DFXHA7SAYLQAO2EHIMAVHT3UBPHQWPWQBDJNERO76JWS7UF",
        ]
    }

    #[test]
    fn test_defaults_validate() {
        let args = Args::parse_from(base_args());
        assert!(args.validate().is_ok());
        assert_eq!(args.harvest_interval_secs, 30);
        assert!(args.staged_harvest);
        assert_eq!(args.network_passphrase(), TESTNET_PASSPHRASE);
    }

    #[test]
    fn test_missing_contracts_rejected() {
        let args = Args::parse_from([
            "yield-keeper",
            "--wallet-secret-seed",
            "9d61b19deffd5a60ba844af492ec2cc44449c5697b326919703bac031cae7f60",
        ]);
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_public_network_passphrase() {
        let mut argv = base_args();
        argv.extend(["--network", "PUBLIC"]);
        let args = Args::parse_from(argv);
        assert_eq!(args.network_passphrase(), PUBLIC_PASSPHRASE);
    }

    #[test]
    fn test_unknown_network_rejected() {
        let mut argv = base_args();
        argv.extend(["--network", "FUTURENET"]);
        let args = Args::parse_from(argv);
        assert!(args.validate().is_err());
    }
}
