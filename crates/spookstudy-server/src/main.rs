//! spookstudy server — the HTTP entry point.

use std::path::PathBuf;
use std::process;

use clap::Parser;
use tracing::info;

use spookstudy_providers::load_config_from;

mod error;
mod routes;
mod state;

#[derive(Parser)]
#[command(name = "spookstudy-server", version, about = "Halloween-themed study story and quiz server")]
struct Cli {
    /// Port to listen on
    #[arg(long, default_value = "3001")]
    port: u16,

    /// Directory for flat-file storage
    #[arg(long, default_value = "./spookstudy-data")]
    data_dir: PathBuf,

    /// Config file path
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("spookstudy=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = load_config_from(cli.config.as_deref())?;
    let state = state::AppState::new(&cli.data_dir, &config).await?;

    // One sweep at startup; expired stories are also dropped lazily on read.
    let expired = state.stories.cleanup_expired().await?;
    if expired > 0 {
        info!(expired, "removed expired stories");
    }

    let app = routes::router(state);
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", cli.port)).await?;
    info!(port = cli.port, data_dir = %cli.data_dir.display(), "spookstudy server listening");
    axum::serve(listener, app).await?;
    Ok(())
}
