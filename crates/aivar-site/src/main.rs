//! AIVAR site driver - main entry point.
//!
//! Loads the site configuration, builds the row navigator and replays an
//! input script from a file or stdin, printing one JSON snapshot per record.
//! Frame records are also measured against the scene frame rate threshold.

use std::fs::File;
use std::io::{self, BufReader};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;

use aivar_core::{SiteConfig, StaticRows};
use aivar_nav::RowNavigator;
use aivar_session::FrameRateMonitor;
use aivar_site::{Replayer, SiteError};

#[derive(Parser)]
#[command(name = "aivar")]
#[command(about = "Replay input events against the AIVAR row navigation")]
struct Cli {
    /// Config file (defaults to the platform config directory)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Initial viewport width in pixels
    #[arg(long, default_value_t = 1280)]
    width: u32,

    /// JSON-lines input script; reads stdin when omitted
    script: Option<PathBuf>,
}

fn run(cli: Cli) -> Result<usize, SiteError> {
    let config = SiteConfig::load(cli.config.as_deref())?;
    tracing::info!("Config loaded (origin {})", config.origin);

    let navigator = RowNavigator::new(
        &config.navigation,
        config.features.animations,
        Arc::new(StaticRows::new()),
        cli.width,
    );
    // Script time starts with the scene already loaded.
    let monitor = FrameRateMonitor::new(&config.scene, Duration::ZERO);
    let mut replayer = Replayer::new(navigator).with_frame_monitor(monitor);

    let stdout = io::stdout().lock();
    match cli.script {
        Some(path) => {
            tracing::info!("Replaying {}", path.display());
            let file = File::open(&path)?;
            replayer.run(BufReader::new(file), stdout)
        }
        None => replayer.run(io::stdin().lock(), stdout),
    }
}

fn main() {
    // Logs go to stderr so stdout stays valid JSON lines.
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    tracing::info!("AIVAR driver starting...");

    if let Err(e) = run(Cli::parse()) {
        tracing::error!("Replay failed: {}", e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
