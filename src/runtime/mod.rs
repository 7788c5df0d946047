use std::time::Duration;

use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode};
use ratatui::{Terminal, backend::CrosstermBackend};
use tokio::task::LocalSet;
use tracing::warn;

use crate::app::App;
use crate::config;
use crate::logging;

mod event_loop;
mod keys;
mod settings;
mod startup;

#[cfg(test)]
mod tests;

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let (settings, fallback) = settings::load_settings();

    let _log_guard = match logging::init(&settings.log) {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("vibe: logging disabled: {e}");
            None
        }
    };
    if let Some(msg) = fallback {
        warn!("{msg}");
    }

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let local = LocalSet::new();

    local.block_on(&rt, session(&settings))
}

async fn session(settings: &config::Settings) -> Result<(), Box<dyn std::error::Error>> {
    let (services, status) = startup::build_services(settings)?;
    let app = App::new(
        settings.ui.header_text.clone(),
        Duration::from_millis(settings.ui.notice_ms),
    );
    let (mut state, events) = event_loop::EventLoopState::new(app, services, settings);

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let run_result = event_loop::run(&mut terminal, &mut state, events, status).await;

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    run_result
}
