use anyhow::{Context, Result};
use clap::Parser;
use corpus_booth::{
    create_router, AppState, CaptureDeviceFactory, CaptureSource, Config, DirectorySink,
    FileLedgerStore, ScriptCorpus, SessionConfig, SessionOrchestrator,
};
use std::path::PathBuf;
use tracing::info;

/// Guided voice-recording tool for building speech corpora.
#[derive(Parser, Debug)]
#[command(name = "corpus-booth", version)]
struct Cli {
    /// Configuration profile to load (without extension).
    #[arg(long, default_value = "config/corpus-booth")]
    config: String,

    /// Capture from an encoded audio file instead of the configured device.
    #[arg(long)]
    input_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let cfg = Config::load(&cli.config)?;

    info!("{} starting", cfg.service.name);

    let corpus = ScriptCorpus::load(&cfg.corpus.script_path)?;

    let source = match cli.input_file {
        Some(path) => CaptureSource::File(path),
        None => cfg.capture_source()?,
    };
    let device = CaptureDeviceFactory::create(source)?;

    let sink = DirectorySink::new(&cfg.export.output_dir)?;
    let store = FileLedgerStore::new(&cfg.export.ledger_dir)?;

    let orchestrator = SessionOrchestrator::new(
        SessionConfig::default(),
        corpus,
        device,
        Box::new(sink),
        Box::new(store),
    )?;

    let state = AppState::new(orchestrator);
    let app = create_router(state);

    let addr = format!("{}:{}", cfg.service.http.bind, cfg.service.http.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("HTTP control surface listening on {}", addr);

    axum::serve(listener, app)
        .await
        .context("HTTP server exited")?;

    Ok(())
}
