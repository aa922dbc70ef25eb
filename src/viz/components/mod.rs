mod log;
mod plot;

use crossterm::event::{Event, KeyCode, KeyEventKind};
use ratatui::widgets::WidgetRef;

pub use self::log::Logs;
pub use plot::Plots;

/// A widget that can react to terminal events
pub trait Component: WidgetRef {
    /// **Returns** whether the event was consumed
    fn handle_ui_event(&mut self, event: &Event) -> bool;
}

/// The key code of a key press event, if `event` is one
pub(super) fn key_press(event: &Event) -> Option<KeyCode> {
    match event {
        Event::Key(key) if key.kind == KeyEventKind::Press => Some(key.code),
        _ => None,
    }
}
