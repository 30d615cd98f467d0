//! Planet server
//!
//! Hosts the planet registry: restores or seeds it at startup, runs periodic
//! maintenance and autosave, and streams registry changes to WebSocket
//! observers.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

mod config;
mod context;
mod loader;

use config::{ServerConfig, DEFAULT_CONFIG_PATH};
use context::ServerContext;

#[derive(Parser)]
#[command(name = "planet-server")]
#[command(about = "Planet lifecycle host", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "PLANET_CONFIG", default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Overrides the configured listen address
    #[arg(short, long, env = "PLANET_LISTEN_ADDR")]
    listen: Option<String>,

    /// Overrides the configured log level
    #[arg(long, env = "PLANET_LOG_LEVEL")]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let existed = cli.config.exists();
    let mut config = ServerConfig::load_or_create(&cli.config)?;
    if let Some(listen) = cli.listen {
        config.listen_addr = listen;
    }

    let level = cli.log_level.unwrap_or_else(|| config.log_level.clone());
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    if existed {
        info!(path = %cli.config.display(), "configuration loaded");
    } else {
        info!(path = %cli.config.display(), "no configuration found, wrote defaults");
    }

    let ctx = Arc::new(ServerContext::build(config)?);
    let startup = ctx.restore_or_bootstrap()?;
    info!(?startup, "registry ready");

    run(ctx).await
}

async fn run(ctx: Arc<ServerContext>) -> Result<()> {
    let listener = TcpListener::bind(&ctx.config.listen_addr)
        .await
        .with_context(|| format!("cannot listen on {}", ctx.config.listen_addr))?;
    info!(addr = %ctx.config.listen_addr, "accepting observers");

    let mut maintenance = interval(ctx.config.maintenance_interval());
    maintenance.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut autosave = interval(ctx.config.autosave_interval());
    autosave.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            accepted = listener.accept() => match accepted {
                Ok((stream, addr)) => {
                    info!(%addr, "observer connecting");
                    let ctx = ctx.clone();
                    tokio::spawn(async move {
                        if let Err(err) =
                            planet_protocol::ws::serve_observer(stream, &ctx.transport, &ctx.sync).await
                        {
                            warn!(%addr, error = %err, "observer connection ended with error");
                        }
                    });
                }
                Err(err) => warn!(error = %err, "accept failed"),
            },

            _ = maintenance.tick() => {
                if let Err(err) = ctx.maintenance_tick().await {
                    error!(error = %format!("{err:#}"), "maintenance tick failed");
                }
            }

            _ = autosave.tick() => {
                if let Err(err) = ctx.autosave() {
                    error!(error = %format!("{err:#}"), "autosave failed");
                }
            }

            signal = &mut shutdown => {
                if let Err(err) = signal {
                    warn!(error = %err, "signal listener failed");
                }
                info!("shutting down");
                ctx.save()?;
                return Ok(());
            }
        }
    }
}
