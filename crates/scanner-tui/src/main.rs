mod action;
mod app;
mod app_state;
mod audio;
mod component;
mod components;
mod connection;
mod emitter;
mod registry;
mod style;
mod synchronizer;
mod telemetry;
mod theme;
mod widgets;

use std::path::PathBuf;

use clap::Parser;
use scanner_proto::config::Config;
use tokio::sync::mpsc;

#[derive(Parser, Debug)]
#[command(
    name = "scanner",
    version,
    about = "Terminal client for a live trunked-radio scanner"
)]
struct Cli {
    /// Back end websocket URL, e.g. ws://10.0.0.2:8001/
    #[arg(long, value_name = "URL")]
    url: Option<String>,

    /// Don't play audio
    #[arg(long)]
    mute: bool,

    /// Config file to use instead of the default location
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let data_dir = scanner_proto::platform::data_dir();
    std::fs::create_dir_all(&data_dir)?;
    let log_path = data_dir.join("scanner.log");

    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)?;

    // Allow RUST_LOG override; websocket internals are noisy at debug.
    let log_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "debug,tungstenite=warn,tokio_tungstenite=warn".to_string());
    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_env_filter(log_filter.as_str())
        .with_ansi(false)
        .init();

    // Print log path to stderr so the operator can tail it immediately.
    eprintln!("scanner log: {}", log_path.display());

    tracing::info!("scanner starting…");

    // ── Load config ──────────────────────────────────────────────────────────
    let loaded = match &cli.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    };
    let config = loaded.unwrap_or_else(|e| {
        tracing::warn!("config unreadable, using defaults: {:#}", e);
        Config::default()
    });
    let url = cli.url.clone().unwrap_or_else(|| config.server.url());

    // ── Audio ────────────────────────────────────────────────────────────────
    let (sink, audio_status) = audio::open_sink(&config.audio, cli.mute);

    // ── Connection (back end → App) ──────────────────────────────────────────
    let (conn_tx, conn_rx) = mpsc::channel::<connection::ConnectionEvent>(1024);
    let transport = connection::spawn(url.clone(), conn_tx);

    // ── Run TUI ──────────────────────────────────────────────────────────────
    let sync = synchronizer::Synchronizer::init(Box::new(transport), sink);
    let state = app_state::AppState::new(sync, url, audio_status, config.ui.show_keys_bar);
    app::App::new(state).run(conn_rx).await?;

    Ok(())
}
