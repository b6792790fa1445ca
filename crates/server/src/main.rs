mod agent;
mod error;
mod routes;
mod state;

use anyhow::Context;
use axum::{
    Router,
    routing::{get, post},
};
use clap::Parser;
use std::path::PathBuf;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use oibridge_runtime_config::{BridgeConfig, CONFIG_FILE_NAME};
use state::AppState;

#[derive(Debug, Parser)]
#[command(name = "oibridge-server", version, about = "Stream agent sessions to a browser UI")]
struct Args {
    /// Address to bind (overrides `server.host`)
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on (overrides `server.port`)
    #[arg(long)]
    port: Option<u16>,

    /// Verbose logging, including every classified chunk
    #[arg(long)]
    debug: bool,

    /// Configuration file
    #[arg(long, default_value = CONFIG_FILE_NAME)]
    config: PathBuf,

    /// JSONL transcript of agent chunks to replay for each chat
    #[arg(long)]
    replay: Option<PathBuf>,
}

fn init_tracing(debug: bool) {
    let default_filter = if debug {
        "oibridge_server=debug,oibridge_stream=debug,oibridge_classifier=trace,tower_http=debug"
    } else {
        "oibridge_server=info,oibridge_stream=info,tower_http=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .init();
}

fn build_router(state: AppState, web_dir: Option<&PathBuf>) -> Router {
    let api = Router::new()
        .route("/health", get(routes::health::health))
        .route("/chat", post(routes::chat::chat))
        .route("/history", get(routes::history::history))
        .route("/reset", post(routes::reset::reset))
        .route("/reset_from_index", post(routes::reset::reset_from_index))
        .route(
            "/settings",
            get(routes::settings::get_settings).post(routes::settings::update_settings),
        );

    let mut app = Router::new().nest("/api", api);

    if let Some(dir) = web_dir.filter(|d| d.exists()) {
        tracing::info!("serving static files from {}", dir.display());
        let index_html = dir.join("index.html");
        app = app.fallback_service(ServeDir::new(dir).fallback(ServeFile::new(index_html)));
    }

    app.layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
                .expose_headers(Any),
        )
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(args.debug);

    let mut config = BridgeConfig::load(&args.config)
        .with_context(|| format!("load config from {}", args.config.display()))?;
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(replay) = args.replay {
        config.stream.replay_path = Some(replay);
    }

    match config.stream.replay_path.as_deref() {
        Some(path) => tracing::info!("replaying agent transcript {}", path.display()),
        None => tracing::warn!("no agent transcript configured; chats get a canned reply"),
    }
    tracing::info!(
        model = %config.agent.resolved_model(),
        offline = config.agent.offline(),
        "agent settings loaded"
    );

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let web_dir = config.server.web_dir.clone();
    let app = build_router(AppState::new(config), web_dir.as_ref());

    tracing::info!("starting server at http://{addr}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("bind {addr}"))?;
    axum::serve(listener, app).await?;

    Ok(())
}
