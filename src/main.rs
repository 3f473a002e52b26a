mod api;
mod app;
mod config;
mod logging;
mod polling;
mod routes;
mod settings;
mod storage;
mod ui;
mod views;

#[cfg(test)]
mod test_support;

use std::io;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::{
    cursor::{Hide, Show},
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::mpsc;

use api::{ApiClient, AuthContext};
use app::{App, AppEvent};
use config::{Config, EnvConfig};
use routes::Route;
use storage::{KeyValueStore, MemoryStore, SqliteStore};

fn main() -> Result<()> {
    let config = Config::load_or_default("config.toml")?;
    let env_config = EnvConfig::load()?;

    logging::init(&config.logging)?;
    tracing::info!("🚀 Polybot dashboard starting...");

    let runtime = tokio::runtime::Runtime::new().context("Failed to start tokio runtime")?;
    // Views spawn their polling tasks from the UI thread.
    let _guard = runtime.enter();

    let store: Arc<dyn KeyValueStore> = if config.storage.in_memory {
        Arc::new(MemoryStore::new())
    } else {
        let path = env_config
            .storage_path
            .clone()
            .unwrap_or_else(|| config.storage.path.clone());
        tracing::info!("Opening token store: {}", path);
        Arc::new(SqliteStore::new(&path)?)
    };

    let (events_tx, events_rx) = mpsc::unbounded_channel();
    let unauthorized_tx = events_tx.clone();
    let auth = Arc::new(AuthContext::new(
        store,
        config.storage.token_key.clone(),
        Arc::new(move || {
            let _ = unauthorized_tx.send(AppEvent::Unauthorized);
        }),
    ));
    if let Some(token) = &env_config.api_token {
        auth.set_token(token)?;
        tracing::info!("API token seeded from environment");
    }

    let base_url = config.api_base_url(&env_config);
    tracing::info!("API base URL: {} ({:?})", base_url, env_config.environment);
    let timeout = config.api.request_timeout_secs.map(Duration::from_secs);
    let client = Arc::new(ApiClient::new(&base_url, auth, timeout)?);

    let start = config
        .ui
        .start_route
        .as_deref()
        .map(|path| Route::parse(path, &config.ui.base_path))
        .unwrap_or(Route::Dashboard);
    let tick_rate = Duration::from_millis(config.ui.tick_rate_ms);
    let mut app = App::new(client, config, events_tx, events_rx, start);

    // Setup terminal; the guard restores it on every exit path from here on.
    let guard = TerminalGuard::enter()?;
    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app, tick_rate);

    drop(terminal);
    drop(guard);
    drop(app);
    tracing::info!("Shutting down...");

    if let Err(e) = &result {
        tracing::error!("UI loop failed: {:#}", e);
    }
    result
}

/// Raw mode plus alternate screen, undone on drop.
struct TerminalGuard;

impl TerminalGuard {
    fn enter() -> Result<Self> {
        enable_raw_mode().context("Failed to enable raw mode")?;
        let guard = TerminalGuard;
        execute!(io::stdout(), EnterAlternateScreen, Hide)?;
        Ok(guard)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        if let Err(e) = disable_raw_mode() {
            tracing::warn!("Failed to disable raw mode: {}", e);
        }
        if let Err(e) = execute!(io::stdout(), LeaveAlternateScreen, Show) {
            tracing::warn!("Failed to leave alternate screen: {}", e);
        }
    }
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    tick_rate: Duration,
) -> Result<()> {
    loop {
        app.tick(Instant::now());
        terminal.draw(|frame| ui::draw(frame, app))?;

        if event::poll(tick_rate)? {
            if let Event::Key(key) = event::read()? {
                app.handle_key(key);
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}
