//! tikwm-proxy - HTTP gateway for the tikwm API
//!
//! Serves posts, feed pages and profiles over plain HTTP through one shared,
//! throttled client.

use anyhow::Context;
use clap::Parser;
use owo_colors::OwoColorize;
use std::process::ExitCode;
use std::time::Duration;
use tikwm_api_client::config::DEFAULT_URL;
use tikwm_api_client::{ClientConfig, TikwmClient};
use tikwm_proxy::{app, listen_addr, run, DEFAULT_LISTEN, DEFAULT_PREFIX};
use tikwm_telemetry::TelemetryConfig;
use tokio::net::TcpListener;

/// HTTP gateway for the tikwm API
#[derive(Parser, Debug)]
#[command(name = "tikwm-proxy")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Route prefix for every operation
    #[arg(long, env = "TIKWM_PROXY_PREFIX", default_value = DEFAULT_PREFIX)]
    prefix: String,

    /// Address to listen on (`:port` binds every interface)
    #[arg(long, env = "TIKWM_PROXY_LISTEN", default_value = DEFAULT_LISTEN)]
    listen: String,

    /// Upstream endpoint, tried in the order given (defaults to the public API)
    #[arg(long = "upstream", value_name = "URL")]
    upstreams: Vec<String>,

    /// Minimum spacing between upstream calls in milliseconds (0 disables)
    #[arg(long, value_name = "MS")]
    min_interval_ms: Option<u64>,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Emit JSON log lines
    #[arg(long)]
    json_logs: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let telemetry = TelemetryConfig::default()
        .with_log_level(cli.log_level.clone())
        .with_json(cli.json_logs);
    if let Err(e) = tikwm_telemetry::init_with_config(&telemetry) {
        eprintln!("{} {}", "Error:".red().bold(), e);
        return ExitCode::FAILURE;
    }

    match serve(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {:#}", "Error:".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

async fn serve(cli: Cli) -> anyhow::Result<()> {
    let config = client_config(&cli)?;
    let client = TikwmClient::with_config(config).context("Failed to build tikwm client")?;

    let addr = listen_addr(&cli.listen);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    tracing::info!(
        listen = %addr,
        prefix = %cli.prefix,
        upstreams = ?client.endpoints(),
        throttled = client.is_throttled(),
        "tikwm proxy started"
    );

    run(listener, app(client, &cli.prefix))
        .await
        .context("Server error")
}

/// The gateway never forwards to itself: `TIKWM_PROXY_URL` is not read and the
/// upstream list is the public API unless given explicitly.
fn client_config(cli: &Cli) -> anyhow::Result<ClientConfig> {
    let mut config = ClientConfig::default()
        .with_env_tuning()
        .context("Invalid client configuration")?;

    config = if cli.upstreams.is_empty() {
        config.with_endpoints([DEFAULT_URL])
    } else {
        config.with_endpoints(cli.upstreams.iter().cloned())
    };

    config = match cli.min_interval_ms {
        Some(0) => config.without_throttle(),
        Some(ms) => config.with_min_interval(Duration::from_millis(ms)),
        None => config,
    };

    config.validate()?;
    Ok(config)
}
