//! Facilitator entry point.
//!
//! Binary name: `tjsim`. Parses CLI arguments, initializes tracing, picks
//! the upstream (live Watson pass-throughs or canned simulator responses),
//! and serves the relay API.

mod http;
mod state;
mod upstream;

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use clap::{ArgAction, Parser};
use tracing_subscriber::EnvFilter;

use state::AppState;
use upstream::{BoxUpstream, CannedUpstream, WatsonUpstream};

#[derive(Parser)]
#[command(name = "tjsim", about = "Facilitator server for the TJBot simulator")]
struct Cli {
    /// Address to bind.
    #[arg(long, default_value = "127.0.0.1")]
    bind: IpAddr,

    /// Port to listen on.
    #[arg(long, default_value_t = 3000)]
    port: u16,

    /// Directory holding the simulator page assets.
    #[arg(long)]
    public_dir: Option<PathBuf>,

    /// Serve canned vendor responses instead of calling the hosted
    /// services; no accounts needed.
    #[arg(long)]
    simulate: bool,

    /// Increase log verbosity (-v, -vv).
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Only log errors.
    #[arg(short, long)]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "info",
        1 => "info,tjsim=debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    let upstream = if cli.simulate {
        BoxUpstream::new(CannedUpstream)
    } else {
        BoxUpstream::new(WatsonUpstream::new())
    };
    let state = AppState::new(upstream);
    let router = http::router::build_router(state, cli.public_dir.as_deref());

    let addr = SocketAddr::new(cli.bind, cli.port);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, simulate = cli.simulate, "facilitator listening");
    axum::serve(listener, router).await?;

    Ok(())
}
