use color_eyre::Result;
use crossterm::event::{self, Event, KeyEventKind};
use tokio::sync::mpsc::error::TryRecvError;
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{debug, warn};

use crate::app::{handle_input, App};
use crate::terminal::Tui;
use crate::ui;
use monsoon_radial_tui::loader::LoadEvent;

/// Run the main application event loop
pub fn run(
    terminal: &mut Tui,
    app: &mut App,
    mut loads: UnboundedReceiver<LoadEvent>,
) -> Result<()> {
    // Configure event poll timeout (ms)
    const EVENT_POLL_TIMEOUT: u64 = 50;

    let mut loaders_done = false;

    loop {
        // Chart data arrives from the loader tasks
        while !loaders_done {
            match loads.try_recv() {
                Ok(load) => {
                    debug!(chart = load.chart, ok = load.result.is_ok(), "chart load finished");
                    app.on_loaded(load);
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => loaders_done = true,
            }
        }

        // Update animations and playback timers
        app.update();

        if let Err(e) = terminal.draw(|f| ui::ui(app, f)) {
            app.teardown();
            return Err(color_eyre::eyre::eyre!("Terminal draw error: {e}"));
        }

        if matches!(
            event::poll(std::time::Duration::from_millis(EVENT_POLL_TIMEOUT)),
            Ok(true)
        ) {
            match event::read() {
                Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                    handle_input(app, key.code);
                    if !app.running {
                        break;
                    }
                }
                Ok(Event::FocusLost) => app.set_focus(false),
                Ok(Event::FocusGained) => app.set_focus(true),
                Ok(Event::Resize(width, height)) => {
                    debug!(width, height, "terminal resized");
                }
                Ok(_) => {}
                Err(e) => warn!("event read failed: {e}"),
            }
        }
    }

    app.teardown();
    Ok(())
}
