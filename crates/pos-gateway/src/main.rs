use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use dotenv::dotenv;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use application::{PosGateway, SettleConfig};
use domain::CommandCall;
use infrastructure::config::GatewayConfig;
use infrastructure::drivers::SimulatedPosDevice;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to config directory (optional)
    #[arg(long, default_value = "config")]
    config_dir: String,

    /// Override cutter support on the simulated device
    #[arg(long)]
    cutter: Option<bool>,

    /// Start the simulated device with the paper tray empty
    #[arg(long)]
    paper_out: bool,
}

async fn run() -> Result<()> {
    dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "info,application=debug,infrastructure=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("POS gateway starting");

    let args = Args::parse();

    let mut config = GatewayConfig::load(&args.config_dir)?;
    if let Some(cutter) = args.cutter {
        config.device.supports_cutter = cutter;
    }
    if args.paper_out {
        config.device.paper_out = true;
    }
    info!(model = %config.device.model, cutter = config.device.supports_cutter, "Configuration loaded");

    let device = SimulatedPosDevice::from_config(&config.device);
    let settle = SettleConfig {
        poll_interval: Duration::from_millis(config.settle.poll_interval_ms),
        timeout: Duration::from_millis(config.settle.timeout_ms),
    };

    let cancel_token = CancellationToken::new();
    let (gateway, worker_handle) = PosGateway::start(Box::new(device), settle, cancel_token.clone());

    info!("Reading commands from stdin, one JSON object per line");
    info!(r#"Example: {{"command":"initializeDevice"}}"#);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Ctrl-C received, shutting down");
                break;
            }
            line = lines.next_line() => {
                let Some(line) = line? else {
                    info!("Input closed, shutting down");
                    break;
                };
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                let call: CommandCall = match serde_json::from_str(line) {
                    Ok(call) => call,
                    Err(e) => {
                        warn!(error = %e, "Not a valid command line");
                        let reply = serde_json::json!({
                            "error": { "code": "INVALID_ARGUMENT", "message": e.to_string() }
                        });
                        println!("{}", reply);
                        continue;
                    }
                };
                let outcome = gateway.call(call).await;
                println!("{}", outcome.to_json());
            }
        }
    }

    cancel_token.cancel();
    let _ = worker_handle.await;
    info!("POS gateway stopped");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    run().await
}
