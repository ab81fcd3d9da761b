//! deskpilot: desktop screen analyzer with model-suggested actions.

mod interactive;
mod render;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{eyre, WrapErr};
use dp_core::actions::{
    ActionError, ActionExecutor, AutoConfirmer, Confirmer, DeclineConfirmer, InputDriver,
    XdotoolDriver,
};
use dp_core::capture::ScreenCapture;
use dp_core::config::{load_config, AppConfig};
use dp_core::extract::TesseractExtractor;
use dp_core::infer::OpenAiClient;
use dp_core::orchestrator::{run_loop, CycleOptions, Orchestrator};
use dp_core::store::CycleStore;
use dp_protocol::{ActionSpec, Op};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "deskpilot", version, about = "Desktop screen analyzer with model-suggested actions")]
struct Cli {
    /// Path of the TOML configuration file.
    #[arg(long, global = true, default_value = "deskpilot.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run analysis cycles (interactive F9/Esc mode by default).
    Run {
        /// Run exactly one cycle, then exit.
        #[arg(long)]
        once: bool,

        /// Print the finalized cycle as JSON (with --once).
        #[arg(long)]
        json: bool,

        /// Run a cycle every N seconds instead of waiting for F9.
        #[arg(long, value_name = "SECS")]
        interval: Option<u64>,

        /// Execute recommended actions without per-action confirmation.
        #[arg(long)]
        auto_execute: bool,
    },

    /// Serve the read-only cycle viewer.
    Serve {
        /// Bind address; overrides the configured viewer_addr.
        #[arg(long)]
        addr: Option<SocketAddr>,
    },
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli.config).wrap_err("configuration is invalid")?;

    match cli.command {
        Command::Run {
            once,
            json,
            interval,
            auto_execute,
        } => run(config, once, json, interval, auto_execute).await,
        Command::Serve { addr } => serve(config, addr).await,
    }
}

async fn run(
    mut config: AppConfig,
    once: bool,
    json: bool,
    interval: Option<u64>,
    auto_execute: bool,
) -> color_eyre::Result<()> {
    config.require_api_key().wrap_err("configuration is invalid")?;
    if auto_execute {
        config.auto_execute = true;
    }
    if interval.is_some() {
        config.interval_secs = interval;
    }

    let interactive = !once && config.interval_secs.is_none();
    let session = interactive.then(interactive::KeySession::start).transpose()?;

    let (events_tx, events_rx) = tokio::sync::mpsc::channel(256);
    let render_handle = tokio::spawn(render::render_events(events_rx));

    let confirmer: Arc<dyn Confirmer> = if config.auto_execute {
        Arc::new(AutoConfirmer)
    } else {
        match &session {
            Some(session) => Arc::new(session.confirmer()),
            // Without a terminal session nobody can answer the prompt;
            // actions get recorded as skipped rather than silently run.
            None => Arc::new(DeclineConfirmer),
        }
    };

    let orchestrator = Orchestrator::new(
        Arc::new(ScreenCapture::discover().map_err(|e| eyre!(e))?),
        Arc::new(
            TesseractExtractor::discover(&config.ocr_lang, config.ocr_confidence_threshold as f32)
                .map_err(|e| eyre!(e))?,
        ),
        Arc::new(
            OpenAiClient::new(&config.api_url, &config.api_key, &config.model)
                .map_err(|e| eyre!(e))?,
        ),
        ActionExecutor::new(input_driver(), confirmer),
        CycleStore::open(&config.store_path).map_err(|e| eyre!(e))?,
        CycleOptions::from_config(&config),
        events_tx,
    );

    let result = drive(orchestrator, session, once, json, &config).await;
    // The orchestrator (and with it the event sender) is gone once drive
    // returns, so the render task drains and exits on its own.
    let _ = render_handle.await;
    result
}

async fn drive(
    mut orchestrator: Orchestrator,
    session: Option<interactive::KeySession>,
    once: bool,
    json: bool,
    config: &AppConfig,
) -> color_eyre::Result<()> {
    if once {
        let cycle = orchestrator.run_cycle().await.map_err(|e| eyre!(e))?;
        if json {
            println!("{}", serde_json::to_string_pretty(&cycle)?);
        }
        return Ok(());
    }

    let (ops_tx, ops_rx) = tokio::sync::mpsc::channel(16);

    match session {
        Some(session) => {
            println!("Press F9 to run an analysis cycle, Esc to exit.");
            if !config.auto_execute {
                println!("Actions wait for F10 to execute; Esc declines.");
            }
            session.route_ops(ops_tx);
            run_loop(orchestrator, ops_rx, None)
                .await
                .map_err(|e| eyre!(e))?;
        }
        None => {
            let period = config
                .interval_secs
                .ok_or_else(|| eyre!("timer mode requires interval_secs"))?;
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    let _ = ops_tx.send(Op::Shutdown).await;
                }
            });
            run_loop(orchestrator, ops_rx, Some(Duration::from_secs(period)))
                .await
                .map_err(|e| eyre!(e))?;
        }
    }

    Ok(())
}

/// The input driver, or a stand-in that records every attempt as failed
/// when no input tool is installed. Missing input synthesis should not
/// block analysis-only use.
fn input_driver() -> Arc<dyn InputDriver> {
    match XdotoolDriver::discover() {
        Ok(driver) => Arc::new(driver),
        Err(error) => {
            warn!(error = %error, "input synthesis unavailable; actions will be recorded as failed");
            Arc::new(UnavailableDriver)
        }
    }
}

struct UnavailableDriver;

#[async_trait::async_trait]
impl InputDriver for UnavailableDriver {
    async fn apply(&self, _action: &ActionSpec) -> Result<(), ActionError> {
        Err(ActionError::NoBackend("no input tool installed".to_string()))
    }
}

async fn serve(config: AppConfig, addr: Option<SocketAddr>) -> color_eyre::Result<()> {
    let addr = addr.unwrap_or(config.viewer_addr);
    let store = CycleStore::open(&config.store_path).map_err(|e| eyre!(e))?;
    println!("Viewer listening on http://{addr}/");
    dp_core::server::serve(store, addr).await.map_err(|e| eyre!(e))
}
