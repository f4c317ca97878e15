//! Yield Keeper - scheduled harvest keeper for Soroban yield distribution

use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use yield_keeper::{
    config::Args,
    harvest::{spawn_scheduler_task, EligibilityChecker, HarvestPipeline, HarvestScheduler},
    server::{self, AppState},
    stellar::{ContractGateway, RpcGateway},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file if present
    let _ = dotenvy::dotenv();

    let args = Args::parse();

    let log_level = args.log_level.clone();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("yield_keeper={},info", log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = args.validate() {
        error!("Configuration error: {}", e);
        std::process::exit(1);
    }

    let gateway = match RpcGateway::from_args(&args) {
        Ok(gw) => gw,
        Err(e) => {
            error!("Failed to initialize Soroban gateway: {}", e);
            std::process::exit(1);
        }
    };
    let wallet = gateway.wallet_public_key();

    // Contract ids are present after validate()
    let distributor_id = args.yield_distributor_id.clone().unwrap_or_default();
    let controller_id = args.yield_controller_id.clone().unwrap_or_default();

    info!("======================================");
    info!("  Yield Keeper");
    info!("======================================");
    info!("Network: {}", args.network.to_uppercase());
    info!("RPC: {}", args.rpc_url);
    info!("Wallet: {}", wallet);
    info!("Distributor: {}", distributor_id);
    info!("Controller: {}", controller_id);
    info!("Protocol/Asset: {}/{}", args.protocol, args.asset);
    info!(
        "Harvest: every {}s ({})",
        args.harvest_interval_secs,
        if args.staged_harvest { "staged" } else { "single-call" }
    );
    info!("Listen: {}", args.listen);
    info!("======================================");

    let gateway: Arc<dyn ContractGateway> = Arc::new(gateway);

    let checker = Arc::new(EligibilityChecker::new(
        Arc::clone(&gateway),
        distributor_id,
    ));
    let pipeline = HarvestPipeline::new(
        Arc::clone(&gateway),
        controller_id,
        args.protocol.clone(),
        args.asset.clone(),
        args.staged_harvest,
        args.max_restore_retries,
    );
    let scheduler = Arc::new(HarvestScheduler::new(
        Arc::clone(&checker),
        pipeline,
        Duration::from_secs(args.harvest_interval_secs),
    ));

    let _scheduler_task = spawn_scheduler_task(Arc::clone(&scheduler));

    let state = Arc::new(AppState::new(args, scheduler, checker));
    server::run(state).await?;

    Ok(())
}
