//! Demo server.
//!
//! Serves a `home` controller through the default
//! `/{controller}/{action}/{id}` route plus static files under `/static/`.
//! Pass `--config app.toml` to use routes and paths from a file.

use clap::Parser;
use serde_json::json;
use std::path::PathBuf;
use tokio::net::TcpListener;

use trellis::config::{load_config, AppConfig};
use trellis::middleware::RequestLogMiddleware;
use trellis::observability::{logging, metrics};
use trellis::{Application, HttpServer};

#[derive(Parser)]
#[command(name = "trellis")]
#[command(about = "Run the trellis demo application", long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => AppConfig::default(),
    };

    if let Err(err) = logging::init_logging(&config.log) {
        eprintln!("logging already initialized: {err}");
    }
    tracing::info!("trellis v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        bind_address = %config.server.bind_address,
        root_dir = %config.paths.root_dir.display(),
        routes = config.routes.len(),
        debug = config.debug,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr)?,
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let bind_address = config.server.bind_address.clone();
    let mut app = Application::from_config(config)?;
    if app.routes_mut().is_empty() {
        app.routes_mut().add_static("static", "/static/(.*)")?;
        app.routes_mut().map(
            "default",
            "/{controller}/{action}/{id}",
            [("controller", "home"), ("action", "index"), ("id", "0")]
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            [("id".to_string(), r"\d+".to_string())].into_iter().collect(),
        )?;
    }

    app.middleware(RequestLogMiddleware);
    app.controller("home")
        .get("index", |ctx| Ok(ctx.html("<h1>trellis</h1><p>It works.</p>")))?
        .get("about", |ctx| {
            let id = ctx.get("id").unwrap_or("0").to_string();
            Ok(ctx.json(&json!({ "name": "trellis", "id": id })))
        })?
        .post("echo", |ctx| {
            let message = ctx.get("message").unwrap_or_default().to_string();
            Ok(ctx.raw(message))
        })?;

    let handler = app.build()?;

    let listener = TcpListener::bind(&bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    HttpServer::new(handler).run(listener).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
