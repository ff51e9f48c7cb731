use std::env;
use std::sync::Arc;

use anyhow::Result;
use metersum::process::{Layout, OutputMode};
use metersum::server::{routes, AppContext};
use metersum::store::{OutputStore, WallClock};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(env).init();
    info!("startup");

    // ─── 2) configuration ────────────────────────────────────────────
    let port: u16 = env::var("PORT")
        .unwrap_or_else(|_| "8080".to_string())
        .parse()
        .unwrap_or(8080);
    let output_dir = env::var("OUTPUT_DIR").unwrap_or_else(|_| "output".to_string());
    let mode: OutputMode = env::var("OUTPUT_MODE")
        .unwrap_or_else(|_| "per-device".to_string())
        .parse()?;

    let ctx = Arc::new(AppContext {
        layout: Layout::default(),
        mode,
        store: OutputStore::new(&output_dir, Box::new(WallClock::default()))?,
    });

    // ─── 3) serve ────────────────────────────────────────────────────
    info!(port, %output_dir, ?mode, "server starting");
    info!("upload form: http://localhost:{}/", port);
    info!("upload endpoint: POST http://localhost:{}/upload", port);

    warp::serve(routes(ctx)).run(([0, 0, 0, 0], port)).await;

    Ok(())
}
