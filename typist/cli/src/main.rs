//! Typist - Terminal runner for the Hive hero banner
//!
//! Drives the typing engine and prints the banner line in place, so the
//! animation (typos, corrections, backgrounds) can be watched without a
//! browser. Logs go to stderr; stdout carries only the banner.
//!
//! # Usage
//!
//! ```bash
//! # Cycle through the default words forever
//! typist
//!
//! # Reproducible typos, stop after three words
//! typist --seed 42 --cycles 3
//!
//! # No image search, fallback backgrounds only
//! typist --offline
//!
//! # Type a showcase card's captions
//! typist showcase "이타적인 집단" "Explore the app"
//!
//! # Verbose logging
//! RUST_LOG=typist_core=debug typist
//! ```
//!
//! # Environment Variables
//!
//! - `TYPIST_CONFIG`: Configuration file path
//! - `PEXELS_API_KEY` / `TYPIST_PEXELS_API_KEY`: Image search key
//! - `TYPIST_*_MS`, `TYPIST_TYPO_PROBABILITY`: Timing overrides
//! - `RUST_LOG`: Log filter (overrides `--log-level`)

use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{error, info, warn};

use typist_core::{
    config::{load_config_from_path, default_config_path},
    AssetResolver, CaptionChain, ConfigOverrides, EngineState, PexelsSearch, TypingEngine,
    TypistConfigFile,
};

/// Typist - Hive hero banner typing animation
#[derive(Parser, Debug)]
#[command(name = "typist")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short = 'c', long, env = "TYPIST_CONFIG", value_name = "FILE")]
    config: Option<PathBuf>,

    /// Seed for typo rolls and background picks
    #[arg(long)]
    seed: Option<u64>,

    /// Chance of a typo per character (0.0-1.0)
    #[arg(long, value_name = "P")]
    typo_probability: Option<f64>,

    /// Delay between typed characters
    #[arg(long, value_name = "MS")]
    typing_interval_ms: Option<u64>,

    /// Stop after this many words
    #[arg(long, value_name = "N")]
    cycles: Option<u64>,

    /// Skip image search and use fallback backgrounds
    #[arg(long)]
    offline: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short = 'l', long, env = "TYPIST_LOG_LEVEL", default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Type a title and description the way showcase cards do
    Showcase {
        /// Card title (typed first)
        title: String,
        /// Card description (typed once the title is done)
        description: String,
    },
}

impl Args {
    fn overrides(&self) -> ConfigOverrides {
        let mut overrides = ConfigOverrides::new().with_offline(self.offline);
        if let Some(seed) = self.seed {
            overrides = overrides.with_seed(seed);
        }
        if let Some(p) = self.typo_probability {
            overrides = overrides.with_typo_probability(p);
        }
        if let Some(ms) = self.typing_interval_ms {
            overrides = overrides.with_typing_interval_ms(ms);
        }
        overrides
    }
}

/// Initialize logging to stderr with the specified level
fn init_logging(level: &str) -> Result<()> {
    let filter = match tracing_subscriber::EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => tracing_subscriber::EnvFilter::try_new(format!("typist={level},typist_core={level}"))
            .with_context(|| format!("Invalid log level: {level}"))?,
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(io::stderr)
        .init();

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args.log_level)?;

    let config_path = args.config.clone().or_else(default_config_path);
    let mut config =
        load_config_from_path(config_path).context("Failed to load configuration")?;
    args.overrides().apply(&mut config);
    config.validate().context("Invalid command-line option")?;

    info!(
        source = %config.source(),
        items = config.items.len(),
        seed = ?config.seed,
        "Configuration loaded"
    );

    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    match args.command {
        Some(Command::Showcase { title, description }) => {
            run_showcase(&title, &description, &mut rng).await
        }
        None => run_banner(config, rng, args.cycles).await,
    }
}

/// Run the hero banner until `cycles` words are done or a signal arrives
async fn run_banner(config: TypistConfigFile, mut rng: StdRng, cycles: Option<u64>) -> Result<()> {
    if !config.search.has_api_key() {
        warn!("No Pexels API key configured, backgrounds will use fallback images");
    }

    let search = PexelsSearch::new(config.search.clone())
        .context("Failed to build image search client")?;
    let resolver = AssetResolver::with_rng(
        Arc::new(search),
        config.fallback.clone(),
        StdRng::seed_from_u64(rng.gen()),
    );
    let handle = TypingEngine::spawn(
        config.items.clone(),
        config.timings.clone(),
        Arc::new(resolver),
        rng,
    );

    let mut state = handle.subscribe();
    let mut stdout = io::stdout();
    let mut background: Option<String> = None;

    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        let snapshot = state.borrow_and_update().clone();
        render_banner(&mut stdout, &snapshot)?;

        let url = snapshot.asset.as_ref().map(|a| a.url.clone());
        if url.is_some() && url != background {
            info!(word = %snapshot.display_text, url = ?url, "Background shown");
        }
        background = url;

        if cycles.is_some_and(|n| snapshot.completed_cycles >= n) {
            info!(cycles = snapshot.completed_cycles, "Cycle limit reached");
            break;
        }

        tokio::select! {
            changed = state.changed() => {
                if changed.is_err() {
                    error!("Typing engine stopped unexpectedly");
                    break;
                }
            }
            () = &mut shutdown => break,
        }
    }

    writeln!(stdout)?;
    handle.shutdown().await;
    Ok(())
}

/// Type one showcase card's captions
async fn run_showcase(title: &str, description: &str, rng: &mut StdRng) -> Result<()> {
    let mut chain = CaptionChain::title_and_description(title, description);
    let mut stdout = io::stdout();
    let mut result = Ok(());

    chain
        .play(rng, |chain| {
            if result.is_ok() {
                result = render_captions(&mut stdout, chain);
            }
        })
        .await;
    result?;

    writeln!(stdout)?;
    Ok(())
}

fn render_banner(out: &mut impl Write, state: &EngineState) -> io::Result<()> {
    let cursor = if state.is_typing || state.is_done { "|" } else { " " };
    let background = match &state.asset {
        Some(asset) if state.shows_background() => format!("  [{}]", asset.url),
        Some(_) => "  [fading]".to_string(),
        None => String::new(),
    };
    write!(
        out,
        "\r\x1b[2KWhere {}{cursor} Thrives.{background}",
        state.display_text
    )?;
    out.flush()
}

fn render_captions(out: &mut impl Write, chain: &CaptionChain) -> io::Result<()> {
    write!(
        out,
        "\r\x1b[2K{}  {}",
        chain.display_text(0),
        chain.display_text(1)
    )?;
    out.flush()
}

/// Resolve on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received Ctrl+C, shutting down"),
        () = terminate => info!("Received SIGTERM, shutting down"),
    }
}
