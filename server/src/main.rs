use anyhow::Result;
use axum::Router;
use clap::Parser;
use dms_core::AnalysisConfig;
use dms_server::{build_app, ServerConfig};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
struct Args {
    /// Data directory (database and uploaded files)
    #[arg(long, default_value = "./data")]
    data_dir: String,
    /// Host to bind
    #[arg(long, default_value = "0.0.0.0")]
    host: String,
    /// Port to bind
    #[arg(long, default_value_t = 8080)]
    port: u16,
    /// Optional JSON analysis config
    #[arg(long)]
    config: Option<String>,
    /// Seconds allowed for processing one uploaded document
    #[arg(long, default_value_t = 120)]
    process_timeout_secs: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let args = Args::parse();

    let analysis = match &args.config {
        Some(path) => AnalysisConfig::from_file(path)?,
        None => AnalysisConfig::default(),
    }
    .with_env_overrides();
    let config = ServerConfig {
        data_dir: args.data_dir.clone(),
        analysis,
        process_timeout: Duration::from_secs(args.process_timeout_secs),
    };
    let app: Router = build_app(config)?;

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, data_dir = %args.data_dir, "server listening");
    axum::serve(listener, app).await?;
    Ok(())
}
