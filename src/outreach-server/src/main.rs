//! Outreach server: campaign funnel metrics, dashboard charts and
//! follow-up scheduling views over LinkedIn outreach data.
//!
//! Main entry point that loads configuration and starts the HTTP API.

use chrono::Utc;
use clap::Parser;
use outreach_api::ApiServer;
use outreach_core::config::AppConfig;
use outreach_management::{ManagementState, OutreachStore, ReportingDefaults};
use std::sync::Arc;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "outreach-server")]
#[command(about = "Campaign metrics and follow-up scheduling API for LinkedIn outreach")]
#[command(version)]
struct Cli {
    /// Node identifier (overrides config)
    #[arg(long, env = "OUTREACH__NODE_ID")]
    node_id: Option<String>,

    /// HTTP port (overrides config)
    #[arg(long, env = "OUTREACH__API__HTTP_PORT")]
    http_port: Option<u16>,

    /// Default IANA timezone for chart bucketing (overrides config)
    #[arg(long)]
    timezone: Option<String>,

    /// Start with an empty store instead of demo campaigns
    #[arg(long, default_value_t = false)]
    no_demo_data: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "outreach_server=info,outreach_management=info,outreach_api=info,tower_http=info"
                    .into()
            }),
        )
        .json()
        .init();

    let cli = Cli::parse();

    info!("Outreach server starting up");

    // Load configuration
    let mut config = AppConfig::load().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Failed to load config, using defaults");
        AppConfig::default()
    });

    // Apply CLI overrides
    if let Some(node_id) = cli.node_id {
        config.node_id = node_id;
    }
    if let Some(port) = cli.http_port {
        config.api.http_port = port;
    }
    if let Some(tz) = cli.timezone {
        config.reporting.default_timezone = tz;
    }
    if cli.no_demo_data {
        config.store.seed_demo_data = false;
    }

    config.validate()?;

    info!(
        node_id = %config.node_id,
        http_port = config.api.http_port,
        timezone = %config.reporting.default_timezone,
        time_range = %config.reporting.default_time_range,
        "Configuration loaded"
    );

    let store = if config.store.seed_demo_data {
        OutreachStore::with_demo_data(Utc::now())
    } else {
        OutreachStore::new()
    };

    let management = ManagementState {
        store: Arc::new(store),
        reporting: ReportingDefaults {
            timezone: config.reporting.timezone()?,
            time_range: config.reporting.time_range()?,
        },
    };

    let api_server = ApiServer::new(config.clone(), management);

    // Start metrics exporter
    if let Err(e) = api_server.start_metrics().await {
        error!(error = %e, "Failed to start metrics exporter");
    }

    info!("Outreach server is ready to serve traffic");

    // Start HTTP server (blocks until shutdown)
    api_server.start_http().await?;

    Ok(())
}
