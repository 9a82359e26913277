//! meshview: textured OBJ viewer with two-point distance measurement.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use meshview::{run_viewer, ViewerConfig};

#[derive(Parser)]
#[command(name = "meshview")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// JSON configuration file
    #[arg(long, short)]
    config: Option<PathBuf>,

    /// OBJ mesh to load (overrides the configuration)
    #[arg(long, short)]
    model: Option<PathBuf>,

    /// Texture image to apply (overrides the configuration)
    #[arg(long, short)]
    texture: Option<PathBuf>,

    /// Window title
    #[arg(long)]
    title: Option<String>,

    /// Suppress all log output
    #[arg(long, short)]
    quiet: bool,

    /// Increase output verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(long, short, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_tracing(verbose: u8, quiet: bool) {
    if quiet {
        return;
    }

    // RUST_LOG wins over -v flags.
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        let level = match verbose {
            0 => "warn",
            1 => "meshview=info",
            2 => "meshview=debug",
            _ => "trace",
        };
        EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .with(filter)
        .init();
}

fn build_config(cli: &Cli) -> Result<ViewerConfig> {
    let mut cfg = match &cli.config {
        Some(path) => ViewerConfig::from_json_file(path)
            .with_context(|| format!("loading configuration {}", path.display()))?,
        None => ViewerConfig::default(),
    };
    if let Some(model) = &cli.model {
        cfg.assets.model = model.clone();
    }
    if let Some(texture) = &cli.texture {
        cfg.assets.texture = texture.clone();
    }
    if let Some(title) = &cli.title {
        cfg.title = title.clone();
    }
    Ok(cfg)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    let cfg = build_config(&cli)?;
    tracing::info!(
        model = %cfg.assets.model.display(),
        texture = %cfg.assets.texture.display(),
        "Starting viewer"
    );

    run_viewer(cfg).map_err(|e| anyhow::anyhow!("viewer exited with an error: {e}"))
}
