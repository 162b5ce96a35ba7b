mod app;
mod handler;
#[cfg(test)]
mod test_support;
mod tui;
mod ui;

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::mpsc::Receiver;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use clap::Parser;
use neo_core::ChatSession;
use neo_core::models::error_store::{ErrorEntry, ErrorStore};
use neo_core::models::notifications::NotificationStore;
use neo_core::models::session_event::SessionEventReceiver;
use neo_core::repositories::{
    InMemorySettingsRepository, SettingsJsonRepository, SettingsRepository,
};
use neo_core::services::{ErrorCollectorLayer, reply_producer_for, speech_capture_for};
use neo_core::settings::{AppConfig, ConfigError, ReplyMode, SessionStore};
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use app::App;

/// Entries kept by the error store
const ERROR_STORE_CAPACITY: usize = 100;

#[derive(Parser, Debug)]
#[command(name = "neo", version, about = "Ask Neo, a chat assistant for the terminal")]
struct Cli {
    /// Config file (default: <config_dir>/neo/config.json)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the simulated reply delay
    #[arg(long)]
    reply_delay_ms: Option<u64>,

    /// Answer by echoing the message instead of the silent stub
    #[arg(long)]
    echo: bool,

    /// Log filter, e.g. "debug" or "neo_core=trace" (overrides RUST_LOG)
    #[arg(long)]
    log_level: Option<String>,

    /// Keep login and theme in memory only
    #[arg(long)]
    ephemeral: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let error_rx = init_tracing(cli.log_level.as_deref());

    info!("Starting Neo");

    let mut config = resolve_config(cli.config.clone(), AppConfig::default_path())?;
    if let Some(delay) = cli.reply_delay_ms {
        config.reply_delay_ms = delay;
    }
    if cli.echo {
        config.reply_mode = ReplyMode::Echo;
    }

    let notifications = NotificationStore::new(config.notification_ttl(), config.max_notifications);
    let (session, session_rx) = ChatSession::new(
        reply_producer_for(&config),
        speech_capture_for(&config),
        notifications.clone(),
    );
    let settings = SessionStore::init(settings_repository(cli.ephemeral)).await;

    let mut app = App::new(
        config,
        session,
        settings,
        notifications,
        ErrorStore::new(ERROR_STORE_CAPACITY),
        Some(error_rx),
    );

    tui::install_panic_hook();
    let mut terminal = tui::init().context("Failed to initialize terminal")?;
    let result = run(&mut terminal, &mut app, session_rx).await;
    tui::restore().context("Failed to restore terminal")?;

    if let Err(e) = app.into_settings().teardown().await {
        error!(error = ?e, "Failed to save session settings on exit");
    }
    info!("Neo stopped");

    result
}

async fn run(
    terminal: &mut tui::Tui,
    app: &mut App,
    mut session_rx: SessionEventReceiver,
) -> Result<()> {
    let mut events = tui::EventHandler::new();

    loop {
        terminal.draw(|frame| ui::render(app, frame))?;
        if app.should_quit {
            break;
        }

        tokio::select! {
            Some(event) = events.next() => handler::handle_event(app, event).await?,
            Some(event) = session_rx.recv() => app.handle_session_event(event),
            else => break,
        }
    }

    Ok(())
}

/// An explicit `--config` must load. The default location falls back to
/// built-in defaults when it is missing or unreadable.
fn resolve_config(
    explicit: Option<PathBuf>,
    default_path: Result<PathBuf, ConfigError>,
) -> Result<AppConfig> {
    if let Some(path) = explicit {
        return AppConfig::load_from(&path)
            .with_context(|| format!("Failed to load config from {}", path.display()));
    }

    let path = match default_path {
        Ok(path) => path,
        Err(e) => {
            warn!(error = %e, "No config location, using default config");
            return Ok(AppConfig::default());
        }
    };
    match AppConfig::load_from(&path) {
        Ok(config) => Ok(config),
        Err(e) => {
            warn!(error = %e, "Failed to load config, using default config");
            Ok(AppConfig::default())
        }
    }
}

fn settings_repository(ephemeral: bool) -> Arc<dyn SettingsRepository> {
    if ephemeral {
        return Arc::new(InMemorySettingsRepository::new());
    }
    match SettingsJsonRepository::new() {
        Ok(repo) => Arc::new(repo),
        Err(e) => {
            warn!(error = ?e, "Settings file unavailable, keeping settings in memory");
            Arc::new(InMemorySettingsRepository::new())
        }
    }
}

/// Logs go to `<data_dir>/neo/neo.log` since the terminal belongs to the UI.
/// Warnings and errors are also collected for the status bar.
fn init_tracing(log_level: Option<&str>) -> Receiver<ErrorEntry> {
    let filter = match log_level {
        Some(directives) => EnvFilter::new(directives),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };

    let writer: Box<dyn Write + Send> = match open_log_file() {
        Ok(file) => Box::new(file),
        Err(_) => Box::new(io::sink()),
    };
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_ansi(false)
        .with_writer(Mutex::new(writer));

    let (error_layer, error_rx) = ErrorCollectorLayer::new();

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .with(error_layer)
        .init();

    error_rx
}

fn open_log_file() -> io::Result<fs::File> {
    let dir = dirs::data_dir()
        .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no data directory"))?
        .join("neo");
    fs::create_dir_all(&dir)?;
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join("neo.log"))
}
