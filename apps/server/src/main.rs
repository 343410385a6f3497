//! resolvekit HTTP server.
//!
//! Serves structured complaint documents and SEO settings from the local
//! libSQL store:
//! - `GET|POST|DELETE /structured-complaints/entity/:id`
//! - `POST /structured-complaints/entity/:id/bundle`
//! - `GET|POST /seo`, `DELETE /seo/:id`

mod error;
mod handlers;
mod routes;
mod state;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};
use resolvekit_shared::{load_config, load_config_from, validate_config};
use tracing::info;

use state::AppState;

#[derive(Parser)]
#[command(name = "resolvekit-server", version, about = "Serve structured complaint documents over HTTP.")]
struct Args {
    /// Config file (defaults to ~/.resolvekit/resolvekit.toml).
    #[arg(long, env = "RESOLVEKIT_CONFIG")]
    config: Option<PathBuf>,

    /// Bind host (overrides `[server] host`).
    #[arg(long)]
    host: Option<String>,

    /// Bind port (overrides `[server] port`).
    #[arg(short, long)]
    port: Option<u16>,

    /// Database file (overrides `[storage] db_path`).
    #[arg(long)]
    db: Option<String>,

    /// Log format: text (default) or json.
    #[arg(long, default_value = "text")]
    log_format: LogFormat,

    /// Verbosity level (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Clone, Debug, clap::ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

fn init_tracing(args: &Args) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match args.verbose {
        0 => "resolvekit=info,tower_http=info",
        1 => "resolvekit=debug,tower_http=debug",
        _ => "resolvekit=trace,tower_http=trace",
    };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match args.log_format {
        LogFormat::Text => fmt().with_env_filter(env_filter).with_target(false).init(),
        LogFormat::Json => fmt().json().with_env_filter(env_filter).init(),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let args = Args::parse();
    init_tracing(&args);

    let mut config = match &args.config {
        Some(path) => load_config_from(path)?,
        None => load_config()?,
    };
    if let Some(host) = &args.host {
        config.server.host = host.clone();
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(db) = &args.db {
        config.storage.db_path = db.clone();
    }
    validate_config(&config)?;

    let state = Arc::new(AppState::new(&config).await?);
    let app = routes::router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .wrap_err_with(|| format!("cannot bind {addr}"))?;
    info!("listening on http://{addr}");

    axum::serve(listener, app).await?;
    Ok(())
}
