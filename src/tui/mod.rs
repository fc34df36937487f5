// TUI module - Terminal User Interface
//
// This module manages the terminal UI using ratatui. It handles:
// - Terminal initialization and cleanup
// - The frame loop (keyboard input, timer ticks, refresh requests)
// - Rendering the browser each frame

pub mod app;
pub mod scroll;
pub mod toast;
pub mod ui;

use anyhow::{Context, Result};
use app::App;
use crossterm::{
    event::{self, Event, KeyEvent, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::time::Duration;

/// How long one frame waits for a key before redrawing
const INPUT_POLL: Duration = Duration::from_millis(30);

/// Redraw cadence when nothing is happening (toast expiry, refresh pickup)
const TICK: Duration = Duration::from_millis(200);

/// Run the TUI
///
/// Sets up the terminal, runs the frame loop until the user quits, and
/// restores the terminal even if the loop failed.
pub async fn run_tui(mut app: App) -> Result<()> {
    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("Failed to setup terminal")?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;

    // First load; an empty or failing store still gets a usable screen
    let _ = app.reload();

    let result = run_event_loop(&mut terminal, &mut app).await;

    disable_raw_mode().context("Failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("Failed to restore terminal")?;
    terminal.show_cursor().context("Failed to show cursor")?;

    result
}

/// Frame loop
///
/// Each iteration picks up a pending refresh, draws, then waits for either a
/// key or the next tick.
async fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    let mut tick_interval = tokio::time::interval(TICK);

    loop {
        app.on_frame();

        terminal
            .draw(|f| ui::draw(f, app))
            .context("Failed to draw terminal")?;

        tokio::select! {
            _ = async {
                if event::poll(INPUT_POLL).unwrap_or(false) {
                    match event::read() {
                        Ok(Event::Key(key_event)) => handle_key_event(app, key_event),
                        Ok(_) => {}
                        Err(e) => tracing::debug!("Failed to read terminal event: {}", e),
                    }
                }
            } => {}

            _ = tick_interval.tick() => {}
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

/// Forward key presses to the app; unbound keys are ignored
fn handle_key_event(app: &mut App, key_event: KeyEvent) {
    // Windows reports both press and release
    if key_event.kind != KeyEventKind::Press {
        return;
    }

    if let Err(e) = app.handle_key(key_event) {
        tracing::trace!("Ignored key: {}", e);
    }
}
