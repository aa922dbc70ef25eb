use std::{
    io::{self, stdout, Stdout},
    ops::{Deref, DerefMut},
    panic,
    sync::Once,
};

use crossterm::{
    cursor, execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

static PANIC_HOOK: Once = Once::new();

/// The dashboard's hold on the terminal
///
/// Entering switches to the alternate screen in raw mode with the cursor hidden. The terminal is
/// handed back when the session is dropped, so a draw error propagated with `?` or a panic on the
/// training side of the dashboard never leaves the shell in raw mode.
pub struct Session {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    active: bool,
}

impl Session {
    pub fn enter() -> io::Result<Self> {
        PANIC_HOOK.call_once(|| {
            let hook = panic::take_hook();
            panic::set_hook(Box::new(move |info| {
                let _ = leave();
                hook(info);
            }));
        });

        execute!(stdout(), EnterAlternateScreen, cursor::Hide)?;
        enable_raw_mode()?;
        Ok(Self {
            terminal: Terminal::new(CrosstermBackend::new(stdout()))?,
            active: true,
        })
    }

    /// Give the terminal back, reporting any error the implicit drop would swallow
    pub fn exit(mut self) -> io::Result<()> {
        self.active = false;
        leave()
    }
}

fn leave() -> io::Result<()> {
    disable_raw_mode()?;
    execute!(stdout(), LeaveAlternateScreen, cursor::Show)
}

impl Deref for Session {
    type Target = Terminal<CrosstermBackend<Stdout>>;

    fn deref(&self) -> &Self::Target {
        &self.terminal
    }
}

impl DerefMut for Session {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.terminal
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if self.active {
            let _ = leave();
        }
    }
}
