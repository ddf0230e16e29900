use std::sync::Arc;

use anyhow::{Context, Result};
use gemchat_core::config::{redact_endpoint, ENDPOINT_ENV};
use gemchat_core::{Config, GeminiClient};
use tracing::{debug, info, warn};

mod app;
mod handler;
mod logging;
mod tui;
mod ui;

use app::App;
use tui::{EventHandler, Tui};

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env is fine; the endpoint may come from the shell or the config file
    let dotenv = dotenvy::dotenv();

    let config_dir = Config::config_dir()?;
    let log_file = logging::log_path(std::env::var(logging::LOG_FILE_ENV).ok(), &config_dir);
    logging::init_logging(&log_file)?;
    if let Err(e) = dotenv {
        debug!("No .env file loaded: {}", e);
    }

    let config_path = Config::config_path()?;
    let config = Config::load_from(&config_path).unwrap_or_else(|e| {
        warn!(error = %e, path = %config_path.display(), "ignoring unreadable config file");
        Config::new()
    });

    let endpoint = config
        .resolve_endpoint(std::env::var(ENDPOINT_ENV).ok())
        .with_context(|| format!("config file: {}", config_path.display()))?;
    let client = GeminiClient::with_timeout(&endpoint, config.request_timeout())?;
    info!(
        endpoint = %redact_endpoint(&endpoint),
        timeout_secs = config.request_timeout().as_secs(),
        "starting gemchat"
    );

    let mut app = App::new(Arc::new(client));

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let result = run(&mut terminal, &mut app).await;
    tui::restore()?;

    if app.has_pending() {
        warn!("quit with a request still in flight");
    }
    info!(exchanges = app.session.history().len(), "session ended");
    result
}

async fn run(terminal: &mut Tui, app: &mut App) -> Result<()> {
    let mut events = EventHandler::new();

    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        if let Some(event) = events.next().await {
            handler::handle_event(app, event)?;
        }

        // The tick keeps this loop turning while a request is in flight
        app.poll_pending().await;
    }

    Ok(())
}
