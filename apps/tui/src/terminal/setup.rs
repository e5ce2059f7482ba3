use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use crossterm::{
    cursor,
    event::{DisableFocusChange, EnableFocusChange},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{stdout, Stdout, Write};
use tracing::{debug, warn};

pub type Tui = Terminal<CrosstermBackend<Stdout>>;

/// Terminal modes entered by [`setup_terminal`], undone by [`restore_terminal`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TerminalModes {
    raw: bool,
    alternate_screen: bool,
    focus_events: bool,
}

/// Enters raw mode and the alternate screen. On failure every mode entered
/// so far is left again before the error is returned.
pub fn setup_terminal() -> Result<(Tui, TerminalModes)> {
    let mut modes = TerminalModes::default();
    match enter(&mut modes) {
        Ok(terminal) => Ok((terminal, modes)),
        Err(e) => {
            restore_terminal(modes);
            Err(e)
        }
    }
}

fn enter(modes: &mut TerminalModes) -> Result<Tui> {
    let (width, height) = crossterm::terminal::size().unwrap_or((80, 24));

    enable_raw_mode().wrap_err("Failed to enable raw mode")?;
    modes.raw = true;

    execute!(stdout(), EnterAlternateScreen).wrap_err("Failed to enter alternate screen")?;
    modes.alternate_screen = true;

    // Focus events pause the animation clock; without them it keeps running.
    match execute!(stdout(), EnableFocusChange) {
        Ok(()) => modes.focus_events = true,
        Err(e) => warn!("Focus reporting unavailable: {e}"),
    }

    let mut terminal =
        Terminal::new(CrosstermBackend::new(stdout())).wrap_err("Failed to create terminal")?;

    if let Err(e) = terminal.clear() {
        warn!("Failed to clear terminal: {e}");
    }
    if let Err(e) = terminal.hide_cursor() {
        warn!("Failed to hide cursor: {e}");
    }

    debug!(width, height, "terminal ready");
    Ok(terminal)
}

/// Leaves the given modes in reverse order. Errors are logged, never returned,
/// so restoring always runs to the end.
pub fn restore_terminal(modes: TerminalModes) {
    let mut out = stdout();

    if let Err(e) = execute!(out, cursor::Show) {
        warn!("Failed to show cursor: {e}");
    }

    if modes.focus_events {
        let _ = execute!(out, DisableFocusChange);
    }

    if modes.alternate_screen {
        if let Err(e) = execute!(out, LeaveAlternateScreen) {
            warn!("Failed to leave alternate screen: {e}");
        }
    }

    if modes.raw {
        if let Err(e) = disable_raw_mode() {
            warn!("Failed to disable raw mode: {e}");
        }
    }

    // Leave the shell prompt on a fresh line
    let _ = execute!(out, cursor::MoveToNextLine(1));
    let _ = out.flush();

    debug!(?modes, "terminal restored");
}
