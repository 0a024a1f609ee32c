use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;

use tunehall::layout::SiteLayout;
use tunehall::library::LoftyExtractor;
use tunehall::{logging, runtime};

/// Personal media server: scans a music folder, generates a static library
/// site and serves it.
#[derive(Parser, Debug)]
#[command(name = "tunehall")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the configuration file (TOML).
    #[arg(short, long, value_name = "FILE", env = "TUNEHALL_CONFIG_PATH")]
    config: Option<PathBuf>,

    /// Log level for console output when RUST_LOG is unset.
    #[arg(short, long, default_value = "info", env = "TUNEHALL_LOG_LEVEL")]
    log_level: String,

    /// Bind port (overrides config file).
    #[arg(short, long, env = "TUNEHALL_PORT")]
    port: Option<u16>,

    /// Directory the site lives in (overrides config file).
    #[arg(short = 'd', long, value_name = "DIR", env = "TUNEHALL_BASE_DIR")]
    base_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut settings = runtime::load_settings(args.config.as_deref());
    if let Some(port) = args.port {
        settings.server.port = port;
    }
    if let Some(base_dir) = args.base_dir {
        settings.site.base_dir = base_dir;
    }

    let layout = SiteLayout::new(&settings.site, &settings.library);
    let _access_log = logging::init(&args.log_level, layout.resolve(&layout.log_file))
        .context("Failed to initialize logging")?;

    tracing::info!("tunehall v{}", env!("CARGO_PKG_VERSION"));

    let library = settings.library.clone();
    let layout = tokio::task::spawn_blocking(move || {
        runtime::ingest(&layout, &library, &LoftyExtractor);
        layout
    })
    .await
    .context("Library ingestion panicked")?;

    runtime::serve(Arc::new(layout), &settings.server)
        .await
        .context("HTTP server failed")?;

    Ok(())
}
