//! matte-server: HTTP frontend for chroma-key background removal.
//!
//! Responsibilities:
//! - Parsing server options (bind address, directories, render strategy).
//! - Verifying at startup that ffmpeg and ffprobe are available; their
//!   absence is fatal.
//! - Routing the remove-background endpoints and serving output artifacts.
//!
//! All heavy lifting happens in matte-core on the blocking pool; the
//! async runtime only shuttles bytes and sequences requests.

mod download;
mod error;
mod handlers;
mod request;

use anyhow::Context;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use clap::{Parser, ValueEnum};
use matte_core::{check_dependency, CoreConfig, ResultRenderStrategy};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

/// Upper bound for fetching a remote input video.
const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(300);

/// Headroom over the video size cap for multipart framing overhead.
const BODY_LIMIT: usize = request::MAX_VIDEO_BYTES + 64 * 1024;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "matte: chroma-key background removal service"
)]
struct ServerArgs {
    /// Address to bind the HTTP server to
    #[arg(long, default_value = "0.0.0.0:8080", env = "MATTE_BIND")]
    bind: SocketAddr,

    /// Directory generated videos are written to and served from
    #[arg(long, default_value = "outputs", env = "MATTE_OUTPUT_DIR")]
    output_dir: PathBuf,

    /// Directory for staged inputs and sampled frames (defaults to the output directory)
    #[arg(long, env = "MATTE_TEMP_DIR")]
    temp_dir: Option<PathBuf>,

    /// How the result pass renders the keyed-out region
    #[arg(long, value_enum, default_value_t = RenderStrategyArg::OverlayBlack)]
    result_render: RenderStrategyArg,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum RenderStrategyArg {
    /// Composite the keyed frame onto an opaque black background
    OverlayBlack,
    /// Key directly to an alpha-bearing pixel format
    AlphaDirect,
}

impl From<RenderStrategyArg> for ResultRenderStrategy {
    fn from(arg: RenderStrategyArg) -> Self {
        match arg {
            RenderStrategyArg::OverlayBlack => ResultRenderStrategy::OverlayBlack,
            RenderStrategyArg::AlphaDirect => ResultRenderStrategy::AlphaDirect,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = ServerArgs::parse();

    // ffmpeg and ffprobe are hard requirements; refuse to start without them.
    for tool in ["ffmpeg", "ffprobe"] {
        check_dependency(tool).with_context(|| format!("{tool} is required but unavailable"))?;
    }

    let mut config = CoreConfig::new(args.output_dir);
    config.temp_dir = args.temp_dir;
    config.result_render = args.result_render.into();
    config.validate().context("invalid configuration")?;

    let output_dir = config.output_dir.clone();
    let state = handlers::AppState {
        config: Arc::new(config),
        http: reqwest::Client::builder()
            .timeout(DOWNLOAD_TIMEOUT)
            .build()
            .context("failed to build HTTP client")?,
    };

    let app = Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .route(
            "/api/v1/video/remove-background",
            post(handlers::remove_background_multipart),
        )
        .route(
            "/api/v1/video/remove-background-json",
            post(handlers::remove_background_json),
        )
        .nest_service("/outputs", ServeDir::new(&output_dir))
        .layer(DefaultBodyLimit::max(BODY_LIMIT))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    tracing::info!("matte-server listening on http://{}", args.bind);
    let listener = tokio::net::TcpListener::bind(args.bind)
        .await
        .with_context(|| format!("failed to bind {}", args.bind))?;
    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
