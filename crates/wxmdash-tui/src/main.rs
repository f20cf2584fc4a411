//! Terminal dashboard for WeatherXM Pro station data.

mod app;
mod services;
mod ui;

use std::io;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::event::{self, Event};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;

use wxmdash_core::{init_logging, Config};

use crate::app::App;

fn main() -> Result<()> {
    let (config, _validation) = Config::load_validated()?;
    init_logging(&config.config_dir)?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;

    let mut app = App::new(config, runtime.handle().clone())?;

    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("Failed to enter alternate screen")?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("Failed to build terminal")?;

    let result = run(&mut terminal, &mut app);

    // Restore the terminal even when the loop failed.
    disable_raw_mode().context("Failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("Failed to leave alternate screen")?;
    terminal.show_cursor().context("Failed to restore cursor")?;

    result
}

fn run(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    let tick = Duration::from_millis(app.config.ui.tick_ms);

    loop {
        app.drain_messages();
        terminal.draw(|frame| ui::draw(frame, app))?;

        if event::poll(tick).context("Failed to poll terminal events")? {
            if let Event::Key(key) = event::read().context("Failed to read terminal event")? {
                app.handle_key(key);
            }
        } else {
            app.on_tick();
        }

        if app.should_quit {
            tracing::info!("Shutting down");
            return Ok(());
        }
    }
}
