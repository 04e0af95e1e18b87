//! Terminal UI for haulquote that generates quotes for a request file and browses them.

mod app;
mod config;
mod files;
mod input;
mod telemetry;
mod ui;

use std::{io, sync::Arc, time::Duration as StdDuration};

use anyhow::Result;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event as CEvent},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use haulquote_core::{plugin::FeeRegistry, service::QuoteService};
use haulquote_provider_remote as remote;
use haulquote_provider_texas as texas;
use ratatui::{Terminal, backend::CrosstermBackend};
use reqwest::Client;
use tracing::info;

use crate::app::App;
use crate::config::AppConfig;
use crate::input::Action;

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    // Fee providers: built-in Texas tables, then remote states (which win on overlap)
    let mut plugins = vec![texas::plugin()];
    if let Some(remote_config) = &config.remote {
        let client = Client::builder().user_agent("haulquote/0.1").build()?;
        plugins.extend(remote::plugins(
            &client,
            &remote_config.base_url,
            &remote_config.states,
        ));
    }
    let registry = Arc::new(FeeRegistry::new(plugins));
    let service = Arc::new(QuoteService::new(registry));
    info!(states = service.states().len(), "fee providers registered");

    let mut app = App::new(service, config);
    app.reload().await;

    // Terminal init
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run(&mut terminal, app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    res
}

async fn run(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, mut app: App) -> Result<()> {
    loop {
        terminal.draw(|frame| ui::draw(frame, &app))?;

        // Poll for input (non-blocking, small timeout to keep CPU low)
        if event::poll(StdDuration::from_millis(100))?
            && let CEvent::Key(key) = event::read()?
        {
            match input::handle_key_event(key, &mut app) {
                Action::Quit => break,
                Action::None => {}
                Action::Reload => {
                    app.is_loading = true;
                    app.error_message = None;
                    terminal.draw(|frame| ui::draw(frame, &app))?;

                    app.reload().await;
                    app.is_loading = false;
                }
            }
        }
    }

    Ok(())
}
